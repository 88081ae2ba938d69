// ==========================================
// 空间货舱储位管理系统 - 装载规划引擎
// ==========================================
// 职责: 为新货物选择货柜与柜内位置,必要时腾挪低优先级货物
// 红线: 不直接写库,只产出全量装载方案,由接口层原子提交
// 红线: 相同输入状态必须产出相同方案(确定性)
// 腾挪深度约束: 被腾挪货物只允许直接落位,不得触发二次腾挪
// ==========================================

use crate::domain::container::Container;
use crate::domain::item::Item;
use crate::domain::placement::Placement;
use crate::domain::types::Position;
use crate::engine::spatial::SpatialIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

// ==========================================
// PlannerLimits - 规划参数
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct PlannerLimits {
    /// 单次规划允许腾挪的货物数量上限
    pub max_displaced: usize,
}

impl Default for PlannerLimits {
    fn default() -> Self {
        Self { max_displaced: 8 }
    }
}

// ==========================================
// Rearrangement - 腾挪记录
// ==========================================
// 旧位置与新位置一并输出,用于审计日志
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rearrangement {
    pub item_id: String,
    pub from_container_id: String,
    pub from_position: Position,
    pub to_container_id: String,
    pub to_position: Position,
}

// ==========================================
// PlacementPlan - 装载方案
// ==========================================
// 方案 = 目标货物落位 + 全部腾挪;要么整体提交,要么整体放弃
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementPlan {
    pub item_id: String,
    pub container_id: String,
    pub position: Position,
    pub rearrangements: Vec<Rearrangement>,
}

// ==========================================
// PlacementPlanner - 装载规划引擎
// ==========================================
pub struct PlacementPlanner {
    limits: PlannerLimits,
}

impl PlacementPlanner {
    pub fn new(limits: PlannerLimits) -> Self {
        Self { limits }
    }

    /// 为货物规划落位
    ///
    /// 算法:
    /// 1. 货柜排序: 偏好区域在前,区域内按剩余体积升序(最佳适配),再按柜号
    /// 2. 逐柜做开角点首适应扫描,命中即产出无腾挪方案
    /// 3. 全部直接落位失败后,逐柜尝试腾挪: 按优先级升序移出比目标
    ///    低优先级的货物直至可放,被移出货物逐件在其他货柜直接落位
    ///
    /// # 参数
    /// - `item`: 待放置货物
    /// - `containers`: 全部货柜
    /// - `placements`: 当前全部放置(目标货物自身的历史放置会被忽略)
    /// - `items`: 货物主数据(按 item_id 索引,用于读取被腾挪货物属性)
    ///
    /// # 返回
    /// - `Some(PlacementPlan)`: 可行方案
    /// - `None`: 无容量(含腾挪在内均无法落位)
    pub fn plan(
        &self,
        item: &Item,
        containers: &[Container],
        placements: &[Placement],
        items: &HashMap<String, Item>,
    ) -> Option<PlacementPlan> {
        let footprint = item.footprint();
        if !footprint.is_valid() || containers.is_empty() {
            return None;
        }

        // 目标货物若已有放置,规划时视同不在柜内
        let effective: Vec<Placement> = placements
            .iter()
            .filter(|p| p.item_id != item.item_id)
            .cloned()
            .collect();

        // BTreeMap 保证遍历顺序稳定
        let mut indexes: BTreeMap<String, SpatialIndex> = BTreeMap::new();
        for c in containers {
            indexes.insert(c.container_id.clone(), SpatialIndex::from_placements(c, &effective));
        }

        // === 阶段 1: 直接落位 ===
        for c in Self::rank_containers(&item.preferred_zone, containers, &indexes, None) {
            if let Some(pos) = indexes[&c.container_id].find_position(footprint) {
                return Some(PlacementPlan {
                    item_id: item.item_id.clone(),
                    container_id: c.container_id.clone(),
                    position: pos,
                    rearrangements: Vec::new(),
                });
            }
        }

        // === 阶段 2: 腾挪落位 ===
        for c in Self::rank_containers(&item.preferred_zone, containers, &indexes, None) {
            if let Some(plan) = self.try_rearrange_into(item, c, containers, &indexes, items) {
                debug!(
                    item_id = %item.item_id,
                    container_id = %plan.container_id,
                    displaced = plan.rearrangements.len(),
                    "腾挪方案命中"
                );
                return Some(plan);
            }
        }

        None
    }

    /// 货柜排序: 偏好区域优先,剩余体积升序(最佳适配),柜号升序兜底
    fn rank_containers<'a>(
        preferred_zone: &str,
        containers: &'a [Container],
        indexes: &BTreeMap<String, SpatialIndex>,
        exclude: Option<&str>,
    ) -> Vec<&'a Container> {
        let mut ranked: Vec<&Container> = containers
            .iter()
            .filter(|c| exclude != Some(c.container_id.as_str()))
            .collect();
        ranked.sort_by_key(|c| {
            (
                c.zone != preferred_zone,
                indexes
                    .get(&c.container_id)
                    .map(|i| i.leftover_volume())
                    .unwrap_or(i64::MAX),
                c.container_id.clone(),
            )
        });
        ranked
    }

    /// 在指定货柜内腾挪低优先级货物以容纳目标货物
    ///
    /// 被腾挪货物仅做直接落位(不递归腾挪),全部安置成功才返回方案
    fn try_rearrange_into(
        &self,
        item: &Item,
        target_container: &Container,
        containers: &[Container],
        pristine: &BTreeMap<String, SpatialIndex>,
        items: &HashMap<String, Item>,
    ) -> Option<PlacementPlan> {
        let footprint = item.footprint();
        let mut working = pristine.clone();

        // 可移出候选: 优先级严格低于目标货物,按(优先级升序, 货物号)排序
        let mut removable: Vec<(i32, String, Position)> = working[&target_container.container_id]
            .occupants()
            .iter()
            .filter_map(|o| {
                let occupant_item = items.get(&o.item_id)?;
                (occupant_item.priority < item.priority).then(|| {
                    (occupant_item.priority, o.item_id.clone(), o.position)
                })
            })
            .collect();
        removable.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        // 逐件移出直至目标可放
        let mut displaced: Vec<(String, Position)> = Vec::new();
        let mut queue = removable.into_iter();
        let target_pos = loop {
            if let Some(pos) = working
                .get(&target_container.container_id)
                .and_then(|idx| idx.find_position(footprint))
            {
                break pos;
            }
            let (_, next_id, next_pos) = queue.next()?;
            if displaced.len() == self.limits.max_displaced {
                return None;
            }
            working
                .get_mut(&target_container.container_id)
                .and_then(|idx| idx.remove(&next_id))?;
            displaced.push((next_id, next_pos));
        };

        // 被腾挪货物逐件直接落位(排除腾挪中的货柜)
        let mut rearrangements = Vec::new();
        for (displaced_id, old_pos) in &displaced {
            let displaced_item = items.get(displaced_id)?;
            let mut relocated = false;
            for rc in Self::rank_containers(
                &displaced_item.preferred_zone,
                containers,
                &working,
                Some(target_container.container_id.as_str()),
            ) {
                let candidate = working
                    .get(&rc.container_id)
                    .and_then(|idx| idx.find_position(displaced_item.footprint()));
                if let Some(new_pos) = candidate {
                    let Some(idx) = working.get_mut(&rc.container_id) else {
                        return None;
                    };
                    idx.insert(displaced_id, new_pos);
                    rearrangements.push(Rearrangement {
                        item_id: displaced_id.clone(),
                        from_container_id: target_container.container_id.clone(),
                        from_position: *old_pos,
                        to_container_id: rc.container_id.clone(),
                        to_position: new_pos,
                    });
                    relocated = true;
                    break;
                }
            }
            if !relocated {
                // 任一被腾挪货物无处安置,整个方案作废
                return None;
            }
        }

        Some(PlacementPlan {
            item_id: item.item_id.clone(),
            container_id: target_container.container_id.clone(),
            position: target_pos,
            rearrangements,
        })
    }
}
