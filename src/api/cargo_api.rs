// ==========================================
// 空间货舱储位管理系统 - 货物/货柜 API
// ==========================================
// 职责: 货物与货柜的增删查 + 操作日志查询
// 红线: 校验在任何状态变更之前完成;批量新增单事务生效
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::{append_log_best_effort, ContainerLockRegistry};
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType, LogQueryFilter};
use crate::domain::container::{Container, ContainerSpec};
use crate::domain::item::{Item, ItemSpec};
use crate::repository::{
    ActionLogRepository, ContainerRepository, ItemRepository, PlacementRepository,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

// ==========================================
// CargoApi - 货物/货柜 API
// ==========================================
pub struct CargoApi {
    item_repo: Arc<ItemRepository>,
    container_repo: Arc<ContainerRepository>,
    placement_repo: Arc<PlacementRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<ConfigManager>,
    locks: Arc<ContainerLockRegistry>,
}

impl CargoApi {
    pub fn new(
        item_repo: Arc<ItemRepository>,
        container_repo: Arc<ContainerRepository>,
        placement_repo: Arc<PlacementRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<ConfigManager>,
        locks: Arc<ContainerLockRegistry>,
    ) -> Self {
        Self {
            item_repo,
            container_repo,
            placement_repo,
            action_log_repo,
            config,
            locks,
        }
    }

    // ==========================================
    // 新增接口
    // ==========================================

    /// 批量新增货物
    ///
    /// 全部校验通过后单事务写入;任一校验失败则整批拒绝
    ///
    /// # 返回
    /// - Ok(ids): 新增的货物标识列表
    pub fn add_items(&self, specs: Vec<ItemSpec>, actor: &str) -> ApiResult<Vec<String>> {
        // 校验先行: 字段合法性 + 批内去重 + 与存量冲突
        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate()
                .map_err(|msg| ApiError::InvalidArgument(format!("itemId={}: {}", spec.item_id, msg)))?;
            if !seen.insert(spec.item_id.clone()) {
                return Err(ApiError::Conflict(format!("批内 itemId 重复: {}", spec.item_id)));
            }
            if self.item_repo.exists(&spec.item_id)? {
                return Err(ApiError::Conflict(format!("itemId 已存在: {}", spec.item_id)));
            }
        }

        let now = Utc::now();
        let items: Vec<Item> = specs.into_iter().map(|s| s.into_item(now)).collect();
        self.item_repo.insert_batch(&items)?;

        let ids: Vec<String> = items.iter().map(|i| i.item_id.clone()).collect();
        info!(count = ids.len(), "货物新增完成");
        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::AddItem, actor, now.naive_utc())
                .with_details(&serde_json::json!({ "itemIds": ids })),
        );
        Ok(ids)
    }

    /// 批量新增货柜
    ///
    /// # 返回
    /// - `Err(Conflict)`: containerId 重复(批内或与存量)
    pub fn add_containers(&self, specs: Vec<ContainerSpec>, actor: &str) -> ApiResult<Vec<String>> {
        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate().map_err(|msg| {
                ApiError::InvalidArgument(format!("containerId={}: {}", spec.container_id, msg))
            })?;
            if !seen.insert(spec.container_id.clone()) {
                return Err(ApiError::Conflict(format!(
                    "批内 containerId 重复: {}",
                    spec.container_id
                )));
            }
            if self.container_repo.exists(&spec.container_id)? {
                return Err(ApiError::Conflict(format!(
                    "containerId 已存在: {}",
                    spec.container_id
                )));
            }
        }

        let now = Utc::now();
        let containers: Vec<Container> = specs.into_iter().map(|s| s.into_container(now)).collect();
        self.container_repo.insert_batch(&containers)?;

        let ids: Vec<String> = containers.iter().map(|c| c.container_id.clone()).collect();
        info!(count = ids.len(), "货柜新增完成");
        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::AddContainer, actor, now.naive_utc())
                .with_details(&serde_json::json!({ "containerIds": ids })),
        );
        Ok(ids)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 全量货物
    pub fn list_items(&self) -> ApiResult<Vec<Item>> {
        Ok(self.item_repo.list()?)
    }

    /// 按标识查询货物
    pub fn get_item(&self, item_id: &str) -> ApiResult<Item> {
        self.item_repo
            .get(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Item(id={})不存在", item_id)))
    }

    /// 全量货柜
    pub fn list_containers(&self) -> ApiResult<Vec<Container>> {
        Ok(self.container_repo.list()?)
    }

    /// 条件查询操作日志
    pub fn query_logs(&self, filter: &LogQueryFilter) -> ApiResult<Vec<ActionLog>> {
        let limit = self
            .config
            .log_query_limit()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        Ok(self.action_log_repo.query(filter, limit)?)
    }

    // ==========================================
    // 删除接口
    // ==========================================

    /// 删除货物(放置记录级联销毁)
    pub fn delete_item(&self, item_id: &str, actor: &str) -> ApiResult<()> {
        let placement = self.placement_repo.get_by_item(item_id)?;

        // 有放置时持柜锁删除,保证占位集合读写互斥
        if let Some(ref p) = placement {
            let lock = self.locks.container_lock(&p.container_id)?;
            let _guard = lock
                .lock()
                .map_err(|e| ApiError::InternalError(format!("货柜锁损坏: {}", e)))?;
            self.item_repo.delete(item_id)?;
        } else {
            self.item_repo.delete(item_id)?;
        }

        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::DeleteItem, actor, Utc::now().naive_utc())
                .with_item(item_id),
        );
        Ok(())
    }

    /// 删除货柜(柜内仍有放置时拒绝)
    pub fn delete_container(&self, container_id: &str, actor: &str) -> ApiResult<()> {
        if !self.container_repo.exists(container_id)? {
            return Err(ApiError::NotFound(format!(
                "Container(id={})不存在",
                container_id
            )));
        }

        let lock = self.locks.container_lock(container_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| ApiError::InternalError(format!("货柜锁损坏: {}", e)))?;

        let occupants = self.placement_repo.count_by_container(container_id)?;
        if occupants > 0 {
            return Err(ApiError::Conflict(format!(
                "货柜 {} 内仍有 {} 条放置,不允许删除",
                container_id, occupants
            )));
        }
        self.container_repo.delete(container_id)?;

        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::DeleteContainer, actor, Utc::now().naive_utc())
                .with_container(container_id),
        );
        Ok(())
    }
}
