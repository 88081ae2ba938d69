// ==========================================
// 空间货舱储位管理系统 - 时间推进引擎
// ==========================================
// 职责: 推进共享时钟,派生当日使用/耗尽/过期状态
// 红线: 时钟单调,不允许回拨
// 红线: usage_limit 减扣在 0 处截断,永不为负
// 输入: 货物快照 + 当前日期 + 推进请求
// 输出: 纯计算结果(新日期 + 状态变化),由接口层原子提交
// ==========================================

use crate::domain::item::Item;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ==========================================
// SimulationError - 推进请求校验错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("numOfDays 与 toDate 必须二选一提供")]
    MissingTarget,

    #[error("numOfDays 与 toDate 不能同时提供")]
    ConflictingTarget,

    #[error("numOfDays 不能为负: {0}")]
    NegativeDays(i64),

    #[error("目标日期早于当前日期: to={to}, current={current}")]
    BackwardDate { to: NaiveDate, current: NaiveDate },
}

// ==========================================
// SimulationRequest - 时间推进请求
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub num_of_days: Option<i64>,       // 推进天数
    pub to_date: Option<NaiveDate>,     // 推进到指定日期
    #[serde(default)]
    pub items_used_today: Vec<String>,  // 当日被使用的货物
}

// ==========================================
// UsedItem - 当日使用记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedItem {
    pub item_id: String,
    pub name: String,
    pub remaining_uses: Option<i32>, // 无 = 不限次
}

// ==========================================
// ItemRef - 货物引用(过期/耗尽列表条目)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub item_id: String,
    pub name: String,
}

// ==========================================
// SimulationOutcome - 推进结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub new_date: NaiveDate,
    pub items_used: Vec<UsedItem>,
    pub items_expired: Vec<ItemRef>,
    pub items_depleted_today: Vec<ItemRef>,

    /// 待提交的 usage_limit 变更(item_id -> 新值),与时钟一并原子落库
    #[serde(skip)]
    pub usage_updates: Vec<(String, i32)>,
}

// ==========================================
// TimeSimulator - 时间推进引擎
// ==========================================
pub struct TimeSimulator;

impl TimeSimulator {
    /// 校验请求并计算新日期
    ///
    /// numOfDays 与 toDate 必须且只能提供其一;
    /// 目标日期不得早于当前日期(时钟单调)。
    pub fn resolve_new_date(
        current_date: NaiveDate,
        request: &SimulationRequest,
    ) -> Result<NaiveDate, SimulationError> {
        match (request.num_of_days, request.to_date) {
            (Some(_), Some(_)) => Err(SimulationError::ConflictingTarget),
            (None, None) => Err(SimulationError::MissingTarget),
            (Some(days), None) => {
                if days < 0 {
                    return Err(SimulationError::NegativeDays(days));
                }
                Ok(current_date + Duration::days(days))
            }
            (None, Some(to)) => {
                if to < current_date {
                    return Err(SimulationError::BackwardDate {
                        to,
                        current: current_date,
                    });
                }
                Ok(to)
            }
        }
    }

    /// 推进时钟并派生状态变化
    ///
    /// 步骤:
    /// 1. 校验并计算新日期
    /// 2. 对 items_used_today 逐一减扣 usage_limit(0 处截断)
    /// 3. itemsDepletedToday = 本次调用中从 >0 变为 0 的货物
    ///    (调用前已为 0 的不重复报告)
    /// 4. itemsExpired = 过期日期早于新日期的全量货物
    ///
    /// # 返回
    /// 结果含待提交的 usage 变更清单,由调用方与新日期一并原子落库
    pub fn advance(
        items: &[Item],
        current_date: NaiveDate,
        request: &SimulationRequest,
    ) -> Result<SimulationOutcome, SimulationError> {
        let new_date = Self::resolve_new_date(current_date, request)?;

        let by_id: HashMap<&str, &Item> = items
            .iter()
            .map(|i| (i.item_id.as_str(), i))
            .collect();

        // 同一货物在列表中出现多次时逐次减扣
        let mut remaining: HashMap<String, Option<i32>> = HashMap::new();
        let mut items_used = Vec::new();
        let mut items_depleted_today = Vec::new();
        for used_id in &request.items_used_today {
            let Some(item) = by_id.get(used_id.as_str()) else {
                // 未知货物不阻断推进,由调用方记录告警
                continue;
            };
            let current = remaining
                .entry(item.item_id.clone())
                .or_insert(item.usage_limit);
            if let Some(before) = *current {
                let after = (before - 1).max(0);
                *current = Some(after);
                if before > 0 && after == 0 {
                    items_depleted_today.push(ItemRef {
                        item_id: item.item_id.clone(),
                        name: item.name.clone(),
                    });
                }
            }
            items_used.push(UsedItem {
                item_id: item.item_id.clone(),
                name: item.name.clone(),
                remaining_uses: *current,
            });
        }

        // 过期判定针对全量货物,与当日使用无关
        let mut items_expired: Vec<ItemRef> = items
            .iter()
            .filter(|i| i.expiry_date.map(|d| d < new_date).unwrap_or(false))
            .map(|i| ItemRef {
                item_id: i.item_id.clone(),
                name: i.name.clone(),
            })
            .collect();
        items_expired.sort_by(|a, b| a.item_id.cmp(&b.item_id));

        let mut usage_updates: Vec<(String, i32)> = remaining
            .into_iter()
            .filter_map(|(id, v)| v.map(|n| (id, n)))
            .collect();
        usage_updates.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(SimulationOutcome {
            new_date,
            items_used,
            items_expired,
            items_depleted_today,
            usage_updates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: &str, uses: Option<i32>, expiry: Option<NaiveDate>) -> Item {
        Item {
            item_id: id.to_string(),
            name: format!("Item {}", id),
            width: 1,
            depth: 1,
            height: 1,
            mass: 1.0,
            priority: 1,
            expiry_date: expiry,
            usage_limit: uses,
            preferred_zone: "ZoneA".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn req(days: Option<i64>, to: Option<NaiveDate>, used: &[&str]) -> SimulationRequest {
        SimulationRequest {
            num_of_days: days,
            to_date: to,
            items_used_today: used.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_resolve_requires_exactly_one_target() {
        let today = date(2025, 3, 1);
        assert_eq!(
            TimeSimulator::resolve_new_date(today, &req(None, None, &[])),
            Err(SimulationError::MissingTarget)
        );
        assert_eq!(
            TimeSimulator::resolve_new_date(today, &req(Some(1), Some(today), &[])),
            Err(SimulationError::ConflictingTarget)
        );
        assert_eq!(
            TimeSimulator::resolve_new_date(today, &req(Some(3), None, &[])),
            Ok(date(2025, 3, 4))
        );
    }

    #[test]
    fn test_resolve_rejects_backward_date() {
        let today = date(2025, 3, 1);
        let earlier = date(2025, 2, 1);
        assert_eq!(
            TimeSimulator::resolve_new_date(today, &req(None, Some(earlier), &[])),
            Err(SimulationError::BackwardDate {
                to: earlier,
                current: today
            })
        );
        // 同日允许(单调不减)
        assert_eq!(
            TimeSimulator::resolve_new_date(today, &req(None, Some(today), &[])),
            Ok(today)
        );
    }

    #[test]
    fn test_advance_depletion_precision() {
        let items = vec![item("item001", Some(1), None)];
        let today = date(2025, 3, 1);

        // 第一次使用: 1 -> 0,进入 itemsDepletedToday
        let outcome =
            TimeSimulator::advance(&items, today, &req(Some(1), None, &["item001"])).unwrap();
        assert_eq!(outcome.items_used.len(), 1);
        assert_eq!(outcome.items_used[0].remaining_uses, Some(0));
        assert_eq!(outcome.items_depleted_today.len(), 1);
        assert_eq!(outcome.usage_updates, vec![("item001".to_string(), 0)]);

        // 已为 0 的货物再次使用: 保持 0,不再进入 itemsDepletedToday
        let items_after = vec![item("item001", Some(0), None)];
        let outcome =
            TimeSimulator::advance(&items_after, today, &req(Some(1), None, &["item001"])).unwrap();
        assert_eq!(outcome.items_used[0].remaining_uses, Some(0));
        assert!(outcome.items_depleted_today.is_empty());
    }

    #[test]
    fn test_advance_unlimited_item_untouched() {
        let items = vec![item("item001", None, None)];
        let today = date(2025, 3, 1);
        let outcome =
            TimeSimulator::advance(&items, today, &req(Some(1), None, &["item001"])).unwrap();
        assert_eq!(outcome.items_used[0].remaining_uses, None);
        assert!(outcome.usage_updates.is_empty());
    }

    #[test]
    fn test_advance_expiry_against_new_date() {
        let items = vec![
            item("expires_soon", None, Some(date(2025, 3, 3))),
            item("expires_later", None, Some(date(2025, 4, 1))),
        ];
        let today = date(2025, 3, 1);

        // 推进 5 天: 3/6 > 3/3,expires_soon 过期
        let outcome = TimeSimulator::advance(&items, today, &req(Some(5), None, &[])).unwrap();
        assert_eq!(outcome.new_date, date(2025, 3, 6));
        assert_eq!(outcome.items_expired.len(), 1);
        assert_eq!(outcome.items_expired[0].item_id, "expires_soon");
    }

    #[test]
    fn test_advance_repeated_use_same_call() {
        let items = vec![item("item001", Some(2), None)];
        let today = date(2025, 3, 1);
        let outcome = TimeSimulator::advance(
            &items,
            today,
            &req(Some(1), None, &["item001", "item001", "item001"]),
        )
        .unwrap();
        // 三次使用逐次减扣: 2 -> 1 -> 0 -> 0(截断)
        let uses: Vec<Option<i32>> = outcome
            .items_used
            .iter()
            .map(|u| u.remaining_uses)
            .collect();
        assert_eq!(uses, vec![Some(1), Some(0), Some(0)]);
        // 耗尽仅报告一次
        assert_eq!(outcome.items_depleted_today.len(), 1);
        assert_eq!(outcome.usage_updates, vec![("item001".to_string(), 0)]);
    }

    #[test]
    fn test_advance_unknown_item_skipped() {
        let items = vec![item("item001", Some(5), None)];
        let today = date(2025, 3, 1);
        let outcome =
            TimeSimulator::advance(&items, today, &req(Some(1), None, &["ghost"])).unwrap();
        assert!(outcome.items_used.is_empty());
        assert!(outcome.usage_updates.is_empty());
    }
}
