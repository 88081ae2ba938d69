// ==========================================
// 空间货舱储位管理系统 - 取用规划引擎
// ==========================================
// 职责: 计算取出目标货物所需的有序操作步骤
// 红线: 规划本身无副作用,可重复查询;取用确认是独立的变更操作
// 步骤口径: 先挪开靠取用面的遮挡(深度升序),最后取出目标
// ==========================================

use crate::domain::container::Container;
use crate::domain::item::Item;
use crate::domain::placement::{Placement, RetrievalStep};
use crate::engine::spatial::SpatialIndex;
use std::collections::HashMap;

// ==========================================
// RetrievalPlanner - 取用规划引擎
// ==========================================
pub struct RetrievalPlanner;

impl RetrievalPlanner {
    /// 为目标货物计算取用步骤
    ///
    /// # 参数
    /// - `item_id`: 目标货物
    /// - `items`: 货物主数据(按 item_id 索引,用于步骤中的货物名称)
    /// - `containers`: 全部货柜
    /// - `placements`: 当前全部放置
    ///
    /// # 返回
    /// - `Some(steps)`: 遮挡 move 步骤(深度升序) + 末尾 retrieve 步骤
    /// - `None`: 目标货物无有效放置
    pub fn plan(
        item_id: &str,
        items: &HashMap<String, Item>,
        containers: &[Container],
        placements: &[Placement],
    ) -> Option<Vec<RetrievalStep>> {
        let placement = placements.iter().find(|p| p.item_id == item_id)?;
        let container = containers
            .iter()
            .find(|c| c.container_id == placement.container_id)?;

        let index = SpatialIndex::from_placements(container, placements);
        let blockers = index.obstructions(item_id, &placement.position);

        let mut steps = Vec::with_capacity(blockers.len() + 1);
        for (i, blocker) in blockers.iter().enumerate() {
            let name = items
                .get(&blocker.item_id)
                .map(|it| it.name.as_str())
                .unwrap_or("");
            steps.push(RetrievalStep::movement(i + 1, &blocker.item_id, name));
        }
        let target_name = items.get(item_id).map(|it| it.name.as_str()).unwrap_or("");
        steps.push(RetrievalStep::retrieval(steps.len() + 1, item_id, target_name));
        Some(steps)
    }
}
