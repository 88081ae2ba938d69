// ==========================================
// 空间货舱储位管理系统 - 废弃回收 API
// ==========================================
// 职责: 废弃识别、回收方案构建、完成下坞
// 舱单生命周期: build_return_plan 生成并挂起,complete_undocking 消费
// 红线: 下坞移除(货物 + 放置)单事务生效
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::{append_log_best_effort, guard_all, ContainerLockRegistry};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::placement::RetrievalStep;
use crate::domain::waste::{ReturnManifest, WasteRecord};
use crate::engine::waste::WasteEngine;
use crate::repository::{
    ActionLogRepository, ContainerRepository, ItemRepository, PlacementRepository,
    SimStateRepository,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

// ==========================================
// ReturnPlanRequest - 回收方案请求
// ==========================================
// undocking_date 保留字符串形态,解析失败报 InvalidArgument
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnPlanRequest {
    pub undocking_container_id: String,
    pub undocking_date: String,
    #[serde(default)]
    pub max_weight: Option<f64>,
}

// ==========================================
// ReturnPlanResponse - 回收方案结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnPlanResponse {
    pub return_manifest: ReturnManifest,
    pub retrieval_steps: Vec<RetrievalStep>,
}

// ==========================================
// WasteApi - 废弃回收 API
// ==========================================
pub struct WasteApi {
    item_repo: Arc<ItemRepository>,
    container_repo: Arc<ContainerRepository>,
    placement_repo: Arc<PlacementRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    sim_state_repo: Arc<SimStateRepository>,
    locks: Arc<ContainerLockRegistry>,
    // 挂起的回收舱单(按下坞柜号索引);舱单是临时对象,不持久化
    pending_manifests: Mutex<HashMap<String, ReturnManifest>>,
}

impl WasteApi {
    pub fn new(
        item_repo: Arc<ItemRepository>,
        container_repo: Arc<ContainerRepository>,
        placement_repo: Arc<PlacementRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        sim_state_repo: Arc<SimStateRepository>,
        locks: Arc<ContainerLockRegistry>,
    ) -> Self {
        Self {
            item_repo,
            container_repo,
            placement_repo,
            action_log_repo,
            sim_state_repo,
            locks,
            pending_manifests: Mutex::new(HashMap::new()),
        }
    }

    // ==========================================
    // 识别接口
    // ==========================================

    /// 按当前仿真日期识别全部废弃货物
    pub fn identify_waste(&self) -> ApiResult<Vec<WasteRecord>> {
        let reference_date = self.sim_state_repo.current_date()?;
        let items = self.item_repo.list()?;
        let placements = self.placement_repo.list()?;
        Ok(WasteEngine::identify(&items, &placements, reference_date))
    }

    // ==========================================
    // 回收方案接口
    // ==========================================

    /// 构建回收方案并挂起舱单
    ///
    /// 选择口径: (优先级升序, 过期日期升序, 货物号升序)贪心装入,
    /// 超出载重的条目跳过 — 背包问题的近似解,不保证总体积最优。
    ///
    /// # 返回
    /// - `Err(NotFound)`: 下坞货柜不存在
    /// - `Err(InvalidArgument)`: 日期不可解析 / 载重非法
    /// - `Err(CapacityExceeded)`: 存在可回收废弃货物但一件也装不下
    /// - Ok: 尽力而为的部分方案(装不完不算失败)
    #[instrument(skip(self, request), fields(container_id = %request.undocking_container_id))]
    pub fn build_return_plan(&self, request: &ReturnPlanRequest) -> ApiResult<ReturnPlanResponse> {
        if !self
            .container_repo
            .exists(&request.undocking_container_id)?
        {
            return Err(ApiError::NotFound(format!(
                "Container(id={})不存在",
                request.undocking_container_id
            )));
        }
        let undocking_date = NaiveDate::parse_from_str(&request.undocking_date, "%Y-%m-%d")
            .map_err(|e| {
                ApiError::InvalidArgument(format!(
                    "undockingDate '{}' 不可解析(期望 YYYY-MM-DD): {}",
                    request.undocking_date, e
                ))
            })?;
        if let Some(w) = request.max_weight {
            if !w.is_finite() || w < 0.0 {
                return Err(ApiError::InvalidArgument(format!(
                    "maxWeight 必须为非负数: {}",
                    w
                )));
            }
        }

        let items = self.item_repo.list()?;
        let containers = self.container_repo.list()?;
        let placements = self.placement_repo.list()?;

        let plan = WasteEngine::build_return_plan(
            &items,
            &containers,
            &placements,
            &request.undocking_container_id,
            undocking_date,
            request.max_weight,
        );

        // 有可回收废弃货物却一件未选中: 载重上限过紧
        if plan.manifest.return_items.is_empty() {
            let candidates_exist = items.iter().any(|i| {
                i.is_waste(undocking_date)
                    && placements.iter().any(|p| p.item_id == i.item_id)
            });
            if candidates_exist {
                return Err(ApiError::CapacityExceeded(format!(
                    "载重上限 {:?} 下没有任何废弃货物可装入",
                    request.max_weight
                )));
            }
        }

        // 挂起舱单,等待 complete_undocking 消费(覆盖同柜旧舱单)
        self.pending_manifests
            .lock()
            .map_err(|e| ApiError::InternalError(format!("舱单表损坏: {}", e)))?
            .insert(request.undocking_container_id.clone(), plan.manifest.clone());

        info!(
            selected = plan.manifest.return_items.len(),
            total_weight = plan.manifest.total_weight,
            "回收方案已生成"
        );
        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::ReturnPlan, "system", chrono::Utc::now().naive_utc())
                .with_container(&request.undocking_container_id)
                .with_details(&plan.manifest),
        );

        Ok(ReturnPlanResponse {
            return_manifest: plan.manifest,
            retrieval_steps: plan.retrieval_steps,
        })
    }

    // ==========================================
    // 下坞完成接口
    // ==========================================

    /// 完成下坞: 移除舱单内全部货物(货物 + 放置单事务销毁)并记录日志
    ///
    /// # 返回
    /// - Ok(removed): 实际移除的货物数量
    /// - `Err(NotFound)`: 该货柜没有挂起的回收舱单
    #[instrument(skip(self))]
    pub fn complete_undocking(
        &self,
        undocking_container_id: &str,
        actor: &str,
        timestamp: NaiveDateTime,
    ) -> ApiResult<usize> {
        // 读取挂起舱单;移除推迟到全部操作成功之后,失败路径保持可重试
        let manifest = self
            .pending_manifests
            .lock()
            .map_err(|e| ApiError::InternalError(format!("舱单表损坏: {}", e)))?
            .get(undocking_container_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "货柜 {} 没有挂起的回收舱单",
                    undocking_container_id
                ))
            })?;

        let item_ids = manifest.item_ids();

        // 涉及柜号: 选中货物当前所在的全部货柜
        let mut involved: Vec<String> = Vec::new();
        for item_id in &item_ids {
            if let Some(p) = self.placement_repo.get_by_item(item_id)? {
                involved.push(p.container_id);
            }
        }
        let locks = self.locks.container_locks(&involved)?;
        let _guards = guard_all(&locks)?;

        let removed = self.item_repo.delete_batch(&item_ids)?;

        // 舱单已消费
        self.pending_manifests
            .lock()
            .map_err(|e| ApiError::InternalError(format!("舱单表损坏: {}", e)))?
            .remove(undocking_container_id);

        info!(removed, container_id = undocking_container_id, "下坞完成");
        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::Undocking, actor, timestamp)
                .with_container(undocking_container_id)
                .with_details(&serde_json::json!({
                    "itemsRemoved": removed,
                    "itemIds": item_ids,
                })),
        );
        Ok(removed)
    }
}
