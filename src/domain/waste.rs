// ==========================================
// 空间货舱储位管理系统 - 废弃回收领域模型
// ==========================================
// WasteRecord 为派生视图,不独立持久化
// ReturnManifest 按回收请求临时构建
// ==========================================

use crate::domain::types::{Position, WasteReason};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// WasteRecord - 废弃货物记录(派生)
// ==========================================
// 判定口径: expiry_date < 参考日期 => Expired;
//           usage_limit == 0       => OutOfUses(过期优先)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteRecord {
    pub item_id: String,
    pub name: String,
    pub reason: WasteReason,
    pub container_id: Option<String>, // 当前所在货柜(未放置则为空)
    pub position: Option<Position>,   // 当前放置盒(未放置则为空)
}

// ==========================================
// ReturnItem - 回收清单条目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub item_id: String,
    pub name: String,
    pub reason: WasteReason,
    pub mass: f64,                      // 质量(kg)
    pub volume: i64,                    // 体积(立方坐标单位)
    pub expiry_date: Option<NaiveDate>, // 过期日期(用尽类货物为空)
}

// ==========================================
// ReturnManifest - 回收舱单
// ==========================================
// 临时对象: 每次回收规划请求构建一份,完成下坞后失效
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnManifest {
    pub undocking_container_id: String, // 下坞货柜
    pub undocking_date: NaiveDate,      // 下坞日期
    pub return_items: Vec<ReturnItem>,  // 选中货物
    pub total_volume: i64,              // 体积合计
    pub total_weight: f64,              // 质量合计(kg)
}

impl ReturnManifest {
    /// 构造空舱单
    pub fn empty(undocking_container_id: &str, undocking_date: NaiveDate) -> Self {
        Self {
            undocking_container_id: undocking_container_id.to_string(),
            undocking_date,
            return_items: Vec::new(),
            total_volume: 0,
            total_weight: 0.0,
        }
    }

    /// 追加一个回收条目并累计体积/质量
    pub fn push(&mut self, entry: ReturnItem) {
        self.total_volume += entry.volume;
        self.total_weight += entry.mass;
        self.return_items.push(entry);
    }

    /// 选中货物的标识列表
    pub fn item_ids(&self) -> Vec<String> {
        self.return_items
            .iter()
            .map(|e| e.item_id.clone())
            .collect()
    }
}
