// ==========================================
// 空间货舱储位管理系统 - 装载 API
// ==========================================
// 职责: 装载方案规划与提交、人工放置确认
// 红线: 规划本身无副作用;方案提交(含腾挪)单事务生效
// 并发纪律: 腾挪可能触及任意货柜,提交期间按柜号升序持有全部涉及柜锁
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::{append_log_best_effort, guard_all, ContainerLockRegistry};
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::item::Item;
use crate::domain::placement::Placement;
use crate::domain::types::Position;
use crate::engine::placement::{PlacementPlan, PlacementPlanner};
use crate::engine::spatial::SpatialIndex;
use crate::repository::{
    ActionLogRepository, ContainerRepository, ItemRepository, PlacementRepository,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// ConfirmPlacementRequest - 放置确认请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPlacementRequest {
    pub item_id: String,
    pub container_id: String,
    pub position: Position,
    pub user_id: String,
    pub timestamp: NaiveDateTime,
}

// ==========================================
// PlacementApi - 装载 API
// ==========================================
pub struct PlacementApi {
    item_repo: Arc<ItemRepository>,
    container_repo: Arc<ContainerRepository>,
    placement_repo: Arc<PlacementRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<ConfigManager>,
    locks: Arc<ContainerLockRegistry>,
}

impl PlacementApi {
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

    fn load_item(&self, item_id: &str) -> ApiResult<Item> {
        self.item_repo
            .get(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Item(id={})不存在", item_id)))
    }

    fn items_by_id(&self) -> ApiResult<HashMap<String, Item>> {
        Ok(self
            .item_repo
            .list()?
            .into_iter()
            .map(|i| (i.item_id.clone(), i))
            .collect())
    }

    /// 在当前快照上计算装载方案(纯规划,不落库)
    fn compute_plan(&self, item: &Item) -> ApiResult<PlacementPlan> {
        let containers = self.container_repo.list()?;
        if containers.is_empty() {
            return Err(ApiError::NoCapacity("当前没有任何货柜".to_string()));
        }
        let placements = self.placement_repo.list()?;
        let items = self.items_by_id()?;
        let limits = self
            .config
            .planner_limits()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        PlacementPlanner::new(limits)
            .plan(item, &containers, &placements, &items)
            .ok_or_else(|| {
                ApiError::NoCapacity(format!(
                    "货物 {} ({}) 在所有货柜中均无法落位",
                    item.item_id,
                    item.footprint()
                ))
            })
    }

    // ==========================================
    // 规划接口
    // ==========================================

    /// 计算装载方案(可重复查询,无副作用)
    ///
    /// # 返回
    /// - Ok(plan): 目标落位 + 所需腾挪(含旧/新位置)
    /// - `Err(NotFound)` / `Err(NoCapacity)`
    #[instrument(skip(self))]
    pub fn plan_placement(&self, item_id: &str) -> ApiResult<PlacementPlan> {
        let item = self.load_item(item_id)?;
        self.compute_plan(&item)
    }

    /// 规划并提交装载方案
    ///
    /// 提交期间持有方案涉及的全部货柜锁;方案整体单事务落库
    #[instrument(skip(self))]
    pub fn place_item(
        &self,
        item_id: &str,
        actor: &str,
        timestamp: NaiveDateTime,
    ) -> ApiResult<PlacementPlan> {
        let item = self.load_item(item_id)?;
        let plan = self.compute_plan(&item)?;

        // 涉及柜号集合: 目标柜 + 腾挪源/目的柜
        let mut involved: Vec<String> = vec![plan.container_id.clone()];
        for re in &plan.rearrangements {
            involved.push(re.from_container_id.clone());
            involved.push(re.to_container_id.clone());
        }
        let locks = self.locks.container_locks(&involved)?;
        let _guards = guard_all(&locks)?;

        // 持锁后基于最新状态复核方案,并发修改导致失效时拒绝提交
        self.verify_plan(&plan)?;
        self.placement_repo.commit_plan(&plan)?;

        info!(
            item_id = %plan.item_id,
            container_id = %plan.container_id,
            rearrangements = plan.rearrangements.len(),
            "装载方案已提交"
        );
        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::Placement, actor, timestamp)
                .with_item(&plan.item_id)
                .with_container(&plan.container_id)
                .with_details(&plan),
        );
        for re in &plan.rearrangements {
            append_log_best_effort(
                &self.action_log_repo,
                ActionLog::new(ActionType::Rearrangement, actor, timestamp)
                    .with_item(&re.item_id)
                    .with_container(&re.to_container_id)
                    .with_details(re),
            );
        }
        Ok(plan)
    }

    /// 检查存量放置的占位不变量(界内 + 互不重叠)
    ///
    /// 存量状态已经破坏说明出现了程序缺陷,以 InvariantViolation 显式上抛,
    /// 绝不混同于普通校验失败
    fn check_store_invariants(
        containers: &[crate::domain::container::Container],
        placements: &[Placement],
    ) -> ApiResult<()> {
        for container in containers {
            let index = SpatialIndex::from_placements(container, placements);
            for occupant in index.occupants() {
                if !index.in_bounds(&occupant.position) {
                    return Err(ApiError::InvariantViolation(format!(
                        "货物 {} 的存量放置超出货柜 {} 包络",
                        occupant.item_id, container.container_id
                    )));
                }
                if let Some(conflict) =
                    index.first_conflict(&occupant.position, Some(occupant.item_id.as_str()))
                {
                    return Err(ApiError::InvariantViolation(format!(
                        "货物 {} 与 {} 的存量放置在货柜 {} 中重叠",
                        occupant.item_id, conflict.item_id, container.container_id
                    )));
                }
            }
        }
        Ok(())
    }

    /// 持锁状态下复核方案仍然可行(无重叠、无越界)
    fn verify_plan(&self, plan: &PlacementPlan) -> ApiResult<()> {
        let containers = self.container_repo.list()?;
        let placements = self.placement_repo.list()?;

        // 存量状态本身必须健康
        Self::check_store_invariants(&containers, &placements)?;

        // 应用方案后的放置集合
        let mut after: Vec<Placement> = placements
            .iter()
            .filter(|p| {
                p.item_id != plan.item_id
                    && !plan.rearrangements.iter().any(|re| re.item_id == p.item_id)
            })
            .cloned()
            .collect();
        for re in &plan.rearrangements {
            after.push(Placement::new(&re.item_id, &re.to_container_id, re.to_position));
        }
        after.push(Placement::new(&plan.item_id, &plan.container_id, plan.position));

        for container in &containers {
            let index = SpatialIndex::from_placements(container, &after);
            for occupant in index.occupants() {
                if !index.in_bounds(&occupant.position) {
                    return Err(ApiError::NoCapacity(format!(
                        "方案复核失败: 货物 {} 在货柜 {} 中越界",
                        occupant.item_id, container.container_id
                    )));
                }
                if let Some(conflict) =
                    index.first_conflict(&occupant.position, Some(occupant.item_id.as_str()))
                {
                    return Err(ApiError::NoCapacity(format!(
                        "方案复核失败: 货物 {} 与 {} 在货柜 {} 中重叠",
                        occupant.item_id, conflict.item_id, container.container_id
                    )));
                }
            }
        }
        Ok(())
    }

    // ==========================================
    // 放置确认接口
    // ==========================================

    /// 确认人工指定的放置位置
    ///
    /// 校验: 货物/货柜存在、放置盒与货物体积一致、界内、不与现有放置重叠
    #[instrument(skip(self, request), fields(item_id = %request.item_id))]
    pub fn confirm_placement(&self, request: &ConfirmPlacementRequest) -> ApiResult<()> {
        let item = self.load_item(&request.item_id)?;
        let container = self
            .container_repo
            .get(&request.container_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Container(id={})不存在", request.container_id))
            })?;

        if !request.position.is_well_formed() {
            return Err(ApiError::InvalidPosition(format!(
                "放置盒坐标非法: {}",
                request.position
            )));
        }
        if request.position.extent() != item.footprint() {
            return Err(ApiError::InvalidPosition(format!(
                "放置盒尺寸 {} 与货物体积 {} 不一致",
                request.position.extent(),
                item.footprint()
            )));
        }

        // 柜级互斥: 校验与写入之间不允许他人改动占位集合
        let lock = self.locks.container_lock(&container.container_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| ApiError::InternalError(format!("货柜锁损坏: {}", e)))?;

        let placements = self.placement_repo.list()?;
        let index = SpatialIndex::from_placements(&container, &placements);
        if !index.in_bounds(&request.position) {
            return Err(ApiError::InvalidPosition(format!(
                "放置盒 {} 超出货柜 {} 包络 {}",
                request.position,
                container.container_id,
                container.dimensions()
            )));
        }
        if let Some(conflict) = index.first_conflict(&request.position, Some(request.item_id.as_str())) {
            return Err(ApiError::InvalidPosition(format!(
                "放置盒 {} 与货物 {} 的现有放置重叠",
                request.position, conflict.item_id
            )));
        }

        self.placement_repo.upsert(&Placement::new(
            &request.item_id,
            &container.container_id,
            request.position,
        ))?;

        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::Placement, &request.user_id, request.timestamp)
                .with_item(&request.item_id)
                .with_container(&container.container_id)
                .with_details(&request.position),
        );
        Ok(())
    }
}
