// ==========================================
// 空间货舱储位管理系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 货物装载决策支持系统
// ==========================================

use cargo_stowage::app::{get_default_db_path, AppState};

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    cargo_stowage::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", cargo_stowage::APP_NAME);
    tracing::info!("系统版本: {}", cargo_stowage::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径(可用环境变量覆盖)
    let db_path = std::env::var("STOWAGE_DB_PATH").unwrap_or_else(|_| get_default_db_path());
    tracing::info!("使用数据库: {}", db_path);

    // 装配应用状态
    let state = AppState::new(&db_path)?;

    // 启动自检: 输出库存概况
    let items = state.cargo_api.list_items()?;
    let containers = state.cargo_api.list_containers()?;
    let clock = state.simulation_api.current_date()?;
    tracing::info!(
        items = items.len(),
        containers = containers.len(),
        clock = %clock,
        "库存概况"
    );

    let waste = state.waste_api.identify_waste()?;
    if !waste.is_empty() {
        tracing::warn!(count = waste.len(), "存在待回收的废弃货物");
    }

    tracing::info!("就绪");
    Ok(())
}
