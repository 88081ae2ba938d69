// ==========================================
// 空间货舱储位管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 货物装载决策支持系统
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施(连接初始化/PRAGMA 统一)
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Container, ContainerSpec, Coordinates, Dimensions, Item, ItemSpec, Placement, Position,
    RetrievalAction, RetrievalStep, ReturnManifest, WasteReason, WasteRecord,
};

// 引擎
pub use engine::{
    PlacementPlan, PlacementPlanner, PlannerLimits, RetrievalPlanner, SimulationOutcome,
    SimulationRequest, SpatialIndex, TimeSimulator, WasteEngine,
};

// API
pub use api::{
    ApiError, ApiResult, CargoApi, ImportApi, PlacementApi, RetrievalApi, SimulationApi, WasteApi,
};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "空间货舱储位管理系统";
