// ==========================================
// 空间货舱储位管理系统 - 废弃回收引擎
// ==========================================
// 职责: 废弃判定 + 容量/载重受限的回收方案构建
// 选择口径: 按(优先级升序, 过期日期升序, 货物号升序)贪心装入,
//           超出载重上限的条目跳过后继续向下选 —
//           这是有界背包的贪心近似,不保证最优
// ==========================================

use crate::domain::container::Container;
use crate::domain::item::Item;
use crate::domain::placement::{Placement, RetrievalStep};
use crate::domain::waste::{ReturnItem, ReturnManifest, WasteRecord};
use crate::engine::retrieval::RetrievalPlanner;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// ReturnPlan - 回收方案(舱单 + 取出步骤)
// ==========================================
#[derive(Debug, Clone)]
pub struct ReturnPlan {
    pub manifest: ReturnManifest,
    pub retrieval_steps: Vec<RetrievalStep>,
}

// ==========================================
// WasteEngine - 废弃回收引擎
// ==========================================
pub struct WasteEngine;

impl WasteEngine {
    /// 按参考日期识别全部废弃货物
    ///
    /// 过期优先于用尽;未放置的废弃货物同样列出(位置字段为空)
    pub fn identify(
        items: &[Item],
        placements: &[Placement],
        reference_date: NaiveDate,
    ) -> Vec<WasteRecord> {
        let mut records: Vec<WasteRecord> = items
            .iter()
            .filter_map(|item| {
                let reason = item.waste_reason(reference_date)?;
                let placement = placements.iter().find(|p| p.item_id == item.item_id);
                Some(WasteRecord {
                    item_id: item.item_id.clone(),
                    name: item.name.clone(),
                    reason,
                    container_id: placement.map(|p| p.container_id.clone()),
                    position: placement.map(|p| p.position),
                })
            })
            .collect();
        records.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        records
    }

    /// 构建回收方案
    ///
    /// 仅有有效放置的废弃货物可被选中(必须能从货柜中物理取出);
    /// 载重上限存在时,方案总质量不得超过上限。
    ///
    /// # 参数
    /// - `undocking_container_id`: 下坞货柜
    /// - `undocking_date`: 下坞日期(废弃判定的参考日期)
    /// - `max_weight`: 载重上限(kg,可选)
    ///
    /// # 返回
    /// - `Some(ReturnPlan)`: 至少选中一件货物的方案
    /// - `None`: 存在废弃货物但一件也装不下(或无可取出的废弃货物)
    ///   (无任何废弃货物时返回空方案 Some,由调用方区分)
    pub fn build_return_plan(
        items: &[Item],
        containers: &[Container],
        placements: &[Placement],
        undocking_container_id: &str,
        undocking_date: NaiveDate,
        max_weight: Option<f64>,
    ) -> ReturnPlan {
        // 候选: 按下坞日期判定为废弃、且有有效放置的货物
        let mut candidates: Vec<&Item> = items
            .iter()
            .filter(|item| {
                item.is_waste(undocking_date)
                    && placements.iter().any(|p| p.item_id == item.item_id)
            })
            .collect();

        // 贪心顺序: 业务优先级低的先回收,其次先过期,货物号兜底
        candidates.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| {
                    a.expiry_date
                        .unwrap_or(NaiveDate::MAX)
                        .cmp(&b.expiry_date.unwrap_or(NaiveDate::MAX))
                })
                .then_with(|| a.item_id.cmp(&b.item_id))
        });

        let mut manifest = ReturnManifest::empty(undocking_container_id, undocking_date);
        let mut selected: Vec<&Item> = Vec::new();
        for item in candidates {
            if let Some(limit) = max_weight {
                if manifest.total_weight + item.mass > limit {
                    // 超限跳过,继续尝试更轻的后续候选
                    debug!(item_id = %item.item_id, "超出载重上限,跳过");
                    continue;
                }
            }
            let Some(reason) = item.waste_reason(undocking_date) else {
                continue;
            };
            manifest.push(ReturnItem {
                item_id: item.item_id.clone(),
                name: item.name.clone(),
                reason,
                mass: item.mass,
                volume: item.volume(),
                expiry_date: item.expiry_date,
            });
            selected.push(item);
        }

        // 按选中顺序串接各货物的取出步骤,全局重排序号
        let items_by_id: HashMap<String, Item> = items
            .iter()
            .map(|i| (i.item_id.clone(), i.clone()))
            .collect();
        let mut steps: Vec<RetrievalStep> = Vec::new();
        for item in &selected {
            if let Some(item_steps) =
                RetrievalPlanner::plan(&item.item_id, &items_by_id, containers, placements)
            {
                for mut step in item_steps {
                    step.step = steps.len() + 1;
                    steps.push(step);
                }
            }
        }

        ReturnPlan {
            manifest,
            retrieval_steps: steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Coordinates, Position, WasteReason};
    use chrono::Utc;

    fn item(id: &str, priority: i32, expiry: Option<NaiveDate>, uses: Option<i32>, mass: f64) -> Item {
        Item {
            item_id: id.to_string(),
            name: format!("Item {}", id),
            width: 10,
            depth: 10,
            height: 10,
            mass,
            priority,
            expiry_date: expiry,
            usage_limit: uses,
            preferred_zone: "ZoneA".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn container(id: &str) -> Container {
        Container {
            container_id: id.to_string(),
            zone: "ZoneA".to_string(),
            width: 100,
            depth: 100,
            height: 100,
            created_at: Utc::now(),
        }
    }

    fn place(item_id: &str, container_id: &str, depth: i32) -> Placement {
        Placement::new(
            item_id,
            container_id,
            Position::new(
                Coordinates::new(0, depth, 0),
                Coordinates::new(10, depth + 10, 10),
            ),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_identify_expired() {
        let items = vec![
            item("expired", 1, Some(date(2025, 1, 1)), None, 1.0),
            item("fresh", 1, Some(date(2026, 1, 1)), None, 1.0),
            item("depleted", 1, None, Some(0), 1.0),
        ];
        let placements = vec![place("expired", "C1", 0)];

        let records = WasteEngine::identify(&items, &placements, date(2025, 2, 1));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].item_id, "depleted");
        assert_eq!(records[0].reason, WasteReason::OutOfUses);
        assert!(records[0].container_id.is_none());
        assert_eq!(records[1].item_id, "expired");
        assert_eq!(records[1].reason, WasteReason::Expired);
        assert_eq!(records[1].container_id.as_deref(), Some("C1"));
    }

    #[test]
    fn test_return_plan_weight_bound() {
        // 全部过期,优先级相同,过期日期相同: 按货物号贪心
        let items = vec![
            item("item001", 1, Some(date(2025, 1, 1)), None, 60.0),
            item("item002", 1, Some(date(2025, 1, 1)), None, 60.0),
            item("item003", 1, Some(date(2025, 1, 1)), None, 30.0),
        ];
        let containers = vec![container("C1")];
        let placements = vec![
            place("item001", "C1", 0),
            place("item002", "C1", 20),
            place("item003", "C1", 40),
        ];

        let plan = WasteEngine::build_return_plan(
            &items,
            &containers,
            &placements,
            "C_return",
            date(2025, 4, 1),
            Some(100.0),
        );
        // item001 装入(60), item002 超限跳过, item003 装入(90)
        assert_eq!(plan.manifest.item_ids(), vec!["item001", "item003"]);
        assert!(plan.manifest.total_weight <= 100.0);
    }

    #[test]
    fn test_return_plan_priority_order() {
        let items = vec![
            item("item_hi", 10, Some(date(2025, 1, 1)), None, 1.0),
            item("item_lo", 1, Some(date(2025, 2, 1)), None, 1.0),
        ];
        let containers = vec![container("C1")];
        let placements = vec![place("item_hi", "C1", 0), place("item_lo", "C1", 20)];

        let plan = WasteEngine::build_return_plan(
            &items,
            &containers,
            &placements,
            "C_return",
            date(2025, 4, 1),
            None,
        );
        // 低优先级先回收
        assert_eq!(plan.manifest.item_ids(), vec!["item_lo", "item_hi"]);
    }

    #[test]
    fn test_return_plan_steps_renumbered() {
        let items = vec![
            item("waste_a", 1, Some(date(2025, 1, 1)), None, 1.0),
            item("waste_b", 1, Some(date(2025, 1, 2)), None, 1.0),
            item("blocker", 5, None, None, 1.0),
        ];
        let containers = vec![container("C1")];
        // waste_b 前方有遮挡
        let placements = vec![
            place("waste_a", "C1", 0),
            place("blocker", "C1", 20),
            place("waste_b", "C1", 40),
        ];

        let plan = WasteEngine::build_return_plan(
            &items,
            &containers,
            &placements,
            "C_return",
            date(2025, 4, 1),
            None,
        );
        // waste_a: [retrieve]; waste_b: [move waste_a?, move blocker, retrieve]
        let step_nos: Vec<usize> = plan.retrieval_steps.iter().map(|s| s.step).collect();
        let expected: Vec<usize> = (1..=plan.retrieval_steps.len()).collect();
        assert_eq!(step_nos, expected);
        // 末步为目标取出
        assert_eq!(
            plan.retrieval_steps.last().unwrap().item_id,
            "waste_b".to_string()
        );
    }

    #[test]
    fn test_return_plan_unplaced_waste_not_selected() {
        let items = vec![item("floating", 1, Some(date(2025, 1, 1)), None, 1.0)];
        let containers = vec![container("C1")];

        let plan = WasteEngine::build_return_plan(
            &items,
            &containers,
            &[],
            "C_return",
            date(2025, 4, 1),
            None,
        );
        assert!(plan.manifest.return_items.is_empty());
        assert!(plan.retrieval_steps.is_empty());
    }
}
