// ==========================================
// 空间货舱储位管理系统 - 检索/取用 API
// ==========================================
// 职责: 货物搜索、取用步骤规划、取用确认
// 红线: 规划可重复查询无副作用;确认才减扣次数并销毁放置
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::{append_log_best_effort, ContainerLockRegistry};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::item::Item;
use crate::domain::placement::RetrievalStep;
use crate::domain::types::Position;
use crate::engine::retrieval::RetrievalPlanner;
use crate::repository::{
    ActionLogRepository, ContainerRepository, ItemRepository, PlacementRepository,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// SearchResult - 搜索结果
// ==========================================
// 查无此物是正常结果(found=false),不作为错误返回
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub found: bool,
    pub item: Option<FoundItem>,
    pub retrieval_steps: Vec<RetrievalStep>,
}

// ==========================================
// FoundItem - 搜索命中的货物视图
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundItem {
    pub item_id: String,
    pub name: String,
    pub container_id: Option<String>, // 未放置则为空
    pub zone: Option<String>,         // 所在货柜的实际区域
    pub position: Option<Position>,
}

// ==========================================
// RetrievalConfirmation - 取用确认结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfirmation {
    pub item_id: String,
    pub remaining_uses: Option<i32>, // 无 = 不限次
}

// ==========================================
// RetrievalApi - 检索/取用 API
// ==========================================
pub struct RetrievalApi {
    item_repo: Arc<ItemRepository>,
    container_repo: Arc<ContainerRepository>,
    placement_repo: Arc<PlacementRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    locks: Arc<ContainerLockRegistry>,
}

impl RetrievalApi {
    pub fn new(
        item_repo: Arc<ItemRepository>,
        container_repo: Arc<ContainerRepository>,
        placement_repo: Arc<PlacementRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        locks: Arc<ContainerLockRegistry>,
    ) -> Self {
        Self {
            item_repo,
            container_repo,
            placement_repo,
            action_log_repo,
            locks,
        }
    }

    fn items_by_id(&self) -> ApiResult<HashMap<String, Item>> {
        Ok(self
            .item_repo
            .list()?
            .into_iter()
            .map(|i| (i.item_id.clone(), i))
            .collect())
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按 itemId 或名称搜索货物,返回当前位置与取用步骤
    ///
    /// # 参数
    /// 两个参数必须至少提供其一,否则 `InvalidArgument`
    pub fn search(
        &self,
        item_id: Option<&str>,
        item_name: Option<&str>,
    ) -> ApiResult<SearchResult> {
        let item = match (item_id, item_name) {
            (None, None) => {
                return Err(ApiError::InvalidArgument(
                    "itemId 与 itemName 必须提供其一".to_string(),
                ))
            }
            (Some(id), _) => self.item_repo.get(id)?,
            (None, Some(name)) => self.item_repo.get_by_name(name)?,
        };

        let Some(item) = item else {
            return Ok(SearchResult {
                found: false,
                item: None,
                retrieval_steps: Vec::new(),
            });
        };

        let placement = self.placement_repo.get_by_item(&item.item_id)?;
        let containers = self.container_repo.list()?;
        let zone = placement.as_ref().and_then(|p| {
            containers
                .iter()
                .find(|c| c.container_id == p.container_id)
                .map(|c| c.zone.clone())
        });

        let steps = if placement.is_some() {
            let placements = self.placement_repo.list()?;
            RetrievalPlanner::plan(&item.item_id, &self.items_by_id()?, &containers, &placements)
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(SearchResult {
            found: true,
            item: Some(FoundItem {
                item_id: item.item_id.clone(),
                name: item.name.clone(),
                container_id: placement.as_ref().map(|p| p.container_id.clone()),
                zone,
                position: placement.as_ref().map(|p| p.position),
            }),
            retrieval_steps: steps,
        })
    }

    /// 计算取用步骤(可重复查询,无副作用)
    ///
    /// # 返回
    /// - `Err(NotFound)`: 货物不存在或无有效放置
    #[instrument(skip(self))]
    pub fn plan_retrieval(&self, item_id: &str) -> ApiResult<Vec<RetrievalStep>> {
        if self.item_repo.get(item_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Item(id={})不存在", item_id)));
        }
        let containers = self.container_repo.list()?;
        let placements = self.placement_repo.list()?;
        RetrievalPlanner::plan(item_id, &self.items_by_id()?, &containers, &placements)
            .ok_or_else(|| ApiError::NotFound(format!("货物 {} 没有有效放置", item_id)))
    }

    // ==========================================
    // 取用确认接口
    // ==========================================

    /// 确认取用: 减扣剩余次数(0 处截断),销毁该货物的放置
    ///
    /// usage 变更与放置删除单事务生效
    #[instrument(skip(self))]
    pub fn confirm_retrieval(
        &self,
        item_id: &str,
        actor: &str,
        timestamp: NaiveDateTime,
    ) -> ApiResult<RetrievalConfirmation> {
        let item = self
            .item_repo
            .get(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Item(id={})不存在", item_id)))?;
        let placement = self.placement_repo.get_by_item(item_id)?;

        let new_usage = item.usage_limit.map(|n| (n - 1).max(0));

        match placement {
            Some(ref p) => {
                // 柜级互斥下移除占位
                let lock = self.locks.container_lock(&p.container_id)?;
                let _guard = lock
                    .lock()
                    .map_err(|e| ApiError::InternalError(format!("货柜锁损坏: {}", e)))?;
                self.item_repo.apply_retrieval(item_id, new_usage, true)?;
            }
            None => {
                self.item_repo.apply_retrieval(item_id, new_usage, false)?;
            }
        }

        info!(item_id, remaining = ?new_usage, "取用确认完成");
        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::Retrieval, actor, timestamp)
                .with_item(item_id)
                .with_details(&serde_json::json!({
                    "remainingUses": new_usage,
                    "containerId": placement.as_ref().map(|p| p.container_id.clone()),
                })),
        );

        Ok(RetrievalConfirmation {
            item_id: item_id.to_string(),
            remaining_uses: new_usage,
        })
    }
}
