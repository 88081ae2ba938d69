// ==========================================
// 空间货舱储位管理系统 - 应用装配
// ==========================================
// 职责: 打开数据库、初始化 schema、装配仓储/引擎/API
// 共享状态: 单一 SQLite 连接(Mutex 序列化) + 柜级锁注册表
// ==========================================

use crate::api::{
    CargoApi, ContainerLockRegistry, ImportApi, PlacementApi, RetrievalApi, SimulationApi,
    WasteApi,
};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::{ArrangementExporter, ContainerImporter, ItemImporter};
use crate::repository::{
    ActionLogRepository, ContainerRepository, ItemRepository, PlacementRepository,
    SimStateRepository,
};
use anyhow::Context;
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// AppState - 应用状态
// ==========================================
pub struct AppState {
    pub cargo_api: CargoApi,
    pub placement_api: PlacementApi,
    pub retrieval_api: RetrievalApi,
    pub waste_api: WasteApi,
    pub simulation_api: SimulationApi,
    pub import_api: ImportApi,
}

impl AppState {
    /// 打开(或创建)数据库并装配全部组件
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let conn = open_sqlite_connection(db_path)
            .with_context(|| format!("无法打开数据库: {}", db_path))?;
        init_schema(&conn).context("schema 初始化失败")?;
        let conn = Arc::new(Mutex::new(conn));

        // 仓储层(共享同一连接)
        let item_repo = Arc::new(ItemRepository::new(conn.clone()));
        let container_repo = Arc::new(ContainerRepository::new(conn.clone()));
        let placement_repo = Arc::new(PlacementRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));
        let sim_state_repo = Arc::new(SimStateRepository::new(conn.clone()));

        // 配置与并发纪律
        let config = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| anyhow::anyhow!("配置管理器初始化失败: {}", e))?,
        );
        let locks = Arc::new(ContainerLockRegistry::new());

        // API 层
        let cargo_api = CargoApi::new(
            item_repo.clone(),
            container_repo.clone(),
            placement_repo.clone(),
            action_log_repo.clone(),
            config.clone(),
            locks.clone(),
        );
        let placement_api = PlacementApi::new(
            item_repo.clone(),
            container_repo.clone(),
            placement_repo.clone(),
            action_log_repo.clone(),
            config.clone(),
            locks.clone(),
        );
        let retrieval_api = RetrievalApi::new(
            item_repo.clone(),
            container_repo.clone(),
            placement_repo.clone(),
            action_log_repo.clone(),
            locks.clone(),
        );
        let waste_api = WasteApi::new(
            item_repo.clone(),
            container_repo.clone(),
            placement_repo.clone(),
            action_log_repo.clone(),
            sim_state_repo.clone(),
            locks.clone(),
        );
        let simulation_api = SimulationApi::new(
            item_repo.clone(),
            sim_state_repo.clone(),
            action_log_repo.clone(),
            locks.clone(),
        );
        let import_api = ImportApi::new(
            ItemImporter::new(item_repo.clone()),
            ContainerImporter::new(container_repo.clone()),
            ArrangementExporter::new(item_repo.clone(), placement_repo.clone()),
            action_log_repo.clone(),
        );

        info!(db_path, "应用状态装配完成");
        Ok(Self {
            cargo_api,
            placement_api,
            retrieval_api,
            waste_api,
            simulation_api,
            import_api,
        })
    }
}

/// 默认数据库路径: <数据目录>/cargo-stowage/stowage.db,取不到数据目录时落当前目录
pub fn get_default_db_path() -> String {
    match dirs::data_dir() {
        Some(dir) => {
            let app_dir = dir.join("cargo-stowage");
            if let Err(e) = std::fs::create_dir_all(&app_dir) {
                tracing::warn!("无法创建数据目录 {}: {}", app_dir.display(), e);
                return "stowage.db".to_string();
            }
            app_dir.join("stowage.db").display().to_string()
        }
        None => "stowage.db".to_string(),
    }
}
