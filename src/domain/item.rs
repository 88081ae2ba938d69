// ==========================================
// 空间货舱储位管理系统 - 货物领域模型
// ==========================================
// 用途: 导入层/接口层写入,引擎层读取
// 对齐: items 表
// ==========================================

use crate::domain::types::{Dimensions, WasteReason};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Item - 货物主数据
// ==========================================
// 红线: usage_limit 仅由取用确认与时间推进修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    // ===== 主键 =====
    pub item_id: String, // 货物唯一标识

    // ===== 基础信息 =====
    pub name: String, // 货物名称

    // ===== 体积维度(固定朝向,不支持旋转) =====
    pub width: i32,  // 宽
    pub depth: i32,  // 深
    pub height: i32, // 高

    // ===== 物理属性 =====
    pub mass: f64, // 质量(kg,>= 0)

    // ===== 取用优先级(数值越大越优先) =====
    pub priority: i32,

    // ===== 生命周期 =====
    pub expiry_date: Option<NaiveDate>, // 过期日期(无 = 不过期)
    pub usage_limit: Option<i32>,       // 剩余可用次数(无 = 不限次)

    // ===== 储位偏好 =====
    pub preferred_zone: String, // 偏好区域标签

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

impl Item {
    /// 货物的三维体积尺寸
    pub fn footprint(&self) -> Dimensions {
        Dimensions::new(self.width, self.depth, self.height)
    }

    /// 体积(立方坐标单位)
    pub fn volume(&self) -> i64 {
        self.footprint().volume()
    }

    /// 相对给定日期判定废弃原因
    ///
    /// # 返回
    /// - `Some(Expired)`: 过期日期早于参考日期(过期优先)
    /// - `Some(OutOfUses)`: 使用次数已为 0
    /// - `None`: 非废弃
    pub fn waste_reason(&self, reference_date: NaiveDate) -> Option<WasteReason> {
        if let Some(expiry) = self.expiry_date {
            if expiry < reference_date {
                return Some(WasteReason::Expired);
            }
        }
        match self.usage_limit {
            Some(0) => Some(WasteReason::OutOfUses),
            _ => None,
        }
    }

    /// 是否为废弃货物
    pub fn is_waste(&self, reference_date: NaiveDate) -> bool {
        self.waste_reason(reference_date).is_some()
    }
}

// ==========================================
// ItemSpec - 新建/导入货物的输入
// ==========================================
// 序列化对齐外部载荷(camelCase)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSpec {
    pub item_id: String,
    pub name: String,
    pub width: i32,
    pub depth: i32,
    pub height: i32,
    pub mass: f64,
    pub priority: i32,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    pub preferred_zone: String,
}

impl ItemSpec {
    /// 校验输入字段,返回首个违规描述
    pub fn validate(&self) -> Result<(), String> {
        if self.item_id.trim().is_empty() {
            return Err("itemId 不能为空".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("name 不能为空".to_string());
        }
        if self.width <= 0 || self.depth <= 0 || self.height <= 0 {
            return Err(format!(
                "体积尺寸必须为正整数: {}x{}x{}",
                self.width, self.depth, self.height
            ));
        }
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(format!("mass 必须为非负数: {}", self.mass));
        }
        if let Some(limit) = self.usage_limit {
            if limit < 0 {
                return Err(format!("usageLimit 不能为负: {}", limit));
            }
        }
        if self.preferred_zone.trim().is_empty() {
            return Err("preferredZone 不能为空".to_string());
        }
        Ok(())
    }

    /// 转换为领域实体(打审计时间戳)
    pub fn into_item(self, now: DateTime<Utc>) -> Item {
        Item {
            item_id: self.item_id,
            name: self.name,
            width: self.width,
            depth: self.depth,
            height: self.height,
            mass: self.mass,
            priority: self.priority,
            expiry_date: self.expiry_date,
            usage_limit: self.usage_limit,
            preferred_zone: self.preferred_zone,
            created_at: now,
            updated_at: now,
        }
    }
}
