// ==========================================
// 空间货舱储位管理系统 - API 层
// ==========================================
// 职责: 对外业务接口(校验 -> 引擎 -> 落库 -> 日志)
// 红线: 校验在任何状态变更之前完成
// 红线: 日志追加尽力而为,失败不回滚业务操作
// ==========================================

pub mod cargo_api;
pub mod error;
pub mod import_api;
pub mod placement_api;
pub mod retrieval_api;
pub mod simulation_api;
pub mod waste_api;

pub use cargo_api::CargoApi;
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use placement_api::PlacementApi;
pub use retrieval_api::RetrievalApi;
pub use simulation_api::SimulationApi;
pub use waste_api::WasteApi;

use crate::domain::action_log::ActionLog;
use crate::repository::ActionLogRepository;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

// ==========================================
// ContainerLockRegistry - 货柜级互斥锁注册表
// ==========================================
// 并发纪律:
// - 每个变更操作持有其涉及货柜的全部锁,读-改-写期间互斥
// - 多柜操作按柜号升序取锁,避免死锁
// - 时钟另有独立锁,由时间推进接口持有
pub struct ContainerLockRegistry {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    clock: Arc<Mutex<()>>,
}

impl Default for ContainerLockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerLockRegistry {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            clock: Arc::new(Mutex::new(())),
        }
    }

    /// 取得单个货柜的锁对象
    pub fn container_lock(&self, container_id: &str) -> ApiResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| ApiError::InternalError(format!("锁注册表损坏: {}", e)))?;
        Ok(locks
            .entry(container_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// 取得多个货柜的锁对象(已按柜号升序去重)
    pub fn container_locks(&self, container_ids: &[String]) -> ApiResult<Vec<Arc<Mutex<()>>>> {
        let mut ids: Vec<&String> = container_ids.iter().collect();
        ids.sort();
        ids.dedup();
        ids.iter()
            .map(|id| self.container_lock(id.as_str()))
            .collect()
    }

    /// 时钟锁
    pub fn clock_lock(&self) -> Arc<Mutex<()>> {
        self.clock.clone()
    }
}

/// 按序锁定一组锁对象,返回守卫集合(守卫存活期间互斥)
pub(crate) fn guard_all(locks: &[Arc<Mutex<()>>]) -> ApiResult<Vec<MutexGuard<'_, ()>>> {
    locks
        .iter()
        .map(|l| {
            l.lock()
                .map_err(|e| ApiError::InternalError(format!("货柜锁损坏: {}", e)))
        })
        .collect()
}

/// 尽力而为地追加操作日志: 失败只告警,不影响业务结果
pub(crate) fn append_log_best_effort(repo: &ActionLogRepository, log: ActionLog) {
    if let Err(e) = repo.insert(&log) {
        warn!(action_type = %log.action_type, "日志追加失败(业务操作不回滚): {}", e);
    }
}
