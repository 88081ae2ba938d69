// ==========================================
// 空间货舱储位管理系统 - 时间推进 API
// ==========================================
// 职责: 持时钟锁推进共享时钟,原子提交 usage 变更
// 红线: 时钟单调;推进失败时状态保持不变
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::{append_log_best_effort, ContainerLockRegistry};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::engine::simulation::{SimulationOutcome, SimulationRequest, TimeSimulator};
use crate::repository::{ActionLogRepository, ItemRepository, SimStateRepository};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// SimulationApi - 时间推进 API
// ==========================================
pub struct SimulationApi {
    item_repo: Arc<ItemRepository>,
    sim_state_repo: Arc<SimStateRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    locks: Arc<ContainerLockRegistry>,
}

impl SimulationApi {
    pub fn new(
        item_repo: Arc<ItemRepository>,
        sim_state_repo: Arc<SimStateRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        locks: Arc<ContainerLockRegistry>,
    ) -> Self {
        Self {
            item_repo,
            sim_state_repo,
            action_log_repo,
            locks,
        }
    }

    /// 当前仿真日期
    pub fn current_date(&self) -> ApiResult<NaiveDate> {
        Ok(self.sim_state_repo.current_date()?)
    }

    /// 推进时钟
    ///
    /// numOfDays 与 toDate 二选一;目标日期不得早于当前日期。
    /// 新日期与当日 usage 变更单事务提交。
    #[instrument(skip(self, request))]
    pub fn advance_time(&self, request: &SimulationRequest) -> ApiResult<SimulationOutcome> {
        // 时钟锁: 读时钟 -> 计算 -> 提交 期间互斥
        let clock = self.locks.clock_lock();
        let _guard = clock
            .lock()
            .map_err(|e| ApiError::InternalError(format!("时钟锁损坏: {}", e)))?;

        let current_date = self.sim_state_repo.current_date()?;
        let items = self.item_repo.list()?;

        // 未知货物不阻断推进,仅告警
        for used_id in &request.items_used_today {
            if !items.iter().any(|i| &i.item_id == used_id) {
                warn!(item_id = %used_id, "itemsUsedToday 中的货物不存在,已跳过");
            }
        }

        let outcome = TimeSimulator::advance(&items, current_date, request)
            .map_err(|e| ApiError::InvalidArgument(e.to_string()))?;

        self.sim_state_repo
            .commit_advance(outcome.new_date, &outcome.usage_updates)?;

        info!(
            new_date = %outcome.new_date,
            used = outcome.items_used.len(),
            depleted = outcome.items_depleted_today.len(),
            expired = outcome.items_expired.len(),
            "时间推进完成"
        );
        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::Simulation, "system", chrono::Utc::now().naive_utc())
                .with_details(&serde_json::json!({
                    "newDate": outcome.new_date,
                    "itemsUsed": outcome.items_used.len(),
                    "itemsDepletedToday": outcome.items_depleted_today.len(),
                    "itemsExpired": outcome.items_expired.len(),
                })),
        );
        Ok(outcome)
    }
}
