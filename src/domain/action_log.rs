// ==========================================
// 空间货舱储位管理系统 - 操作日志领域模型
// ==========================================
// 红线: 所有状态变更操作之后追加日志
// 红线: 日志追加失败不得回滚业务操作(尽力而为)
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    // ===== 主键 =====
    pub action_id: String, // 日志ID(UUID)

    // ===== 操作信息 =====
    pub action_type: String,      // 操作类型(存储为字符串)
    pub action_ts: NaiveDateTime, // 操作时间戳
    pub actor: String,            // 操作人

    // ===== 关联实体 =====
    pub item_id: Option<String>,      // 关联货物(可选)
    pub container_id: Option<String>, // 关联货柜(可选)

    // ===== 操作负载 =====
    pub details_json: Option<JsonValue>, // 操作参数/结果 (JSON)
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    AddItem,       // 新增货物
    AddContainer,  // 新增货柜
    Import,        // 批量导入
    Placement,     // 放置确认
    Rearrangement, // 重排(腾挪)
    Retrieval,     // 取用确认
    ReturnPlan,    // 生成回收方案
    Undocking,     // 完成下坞
    Simulation,    // 时间推进
    DeleteItem,    // 删除货物
    DeleteContainer, // 删除货柜
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::AddItem => "AddItem",
            ActionType::AddContainer => "AddContainer",
            ActionType::Import => "Import",
            ActionType::Placement => "Placement",
            ActionType::Rearrangement => "Rearrangement",
            ActionType::Retrieval => "Retrieval",
            ActionType::ReturnPlan => "ReturnPlan",
            ActionType::Undocking => "Undocking",
            ActionType::Simulation => "Simulation",
            ActionType::DeleteItem => "DeleteItem",
            ActionType::DeleteContainer => "DeleteContainer",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "AddItem" => Some(ActionType::AddItem),
            "AddContainer" => Some(ActionType::AddContainer),
            "Import" => Some(ActionType::Import),
            "Placement" => Some(ActionType::Placement),
            "Rearrangement" => Some(ActionType::Rearrangement),
            "Retrieval" => Some(ActionType::Retrieval),
            "ReturnPlan" => Some(ActionType::ReturnPlan),
            "Undocking" => Some(ActionType::Undocking),
            "Simulation" => Some(ActionType::Simulation),
            "DeleteItem" => Some(ActionType::DeleteItem),
            "DeleteContainer" => Some(ActionType::DeleteContainer),
            _ => None,
        }
    }
}

// ==========================================
// ActionLog 辅助方法
// ==========================================
impl ActionLog {
    /// 创建新的操作日志
    ///
    /// # 参数
    /// - `action_type`: 操作类型
    /// - `actor`: 操作人
    /// - `action_ts`: 操作时间戳
    pub fn new(action_type: ActionType, actor: &str, action_ts: NaiveDateTime) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts,
            actor: actor.to_string(),
            item_id: None,
            container_id: None,
            details_json: None,
        }
    }

    /// 关联货物
    pub fn with_item(mut self, item_id: &str) -> Self {
        self.item_id = Some(item_id.to_string());
        self
    }

    /// 关联货柜
    pub fn with_container(mut self, container_id: &str) -> Self {
        self.container_id = Some(container_id.to_string());
        self
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_details<T: Serialize>(mut self, details: &T) -> Self {
        self.details_json = serde_json::to_value(details).ok();
        self
    }
}

// ==========================================
// LogQueryFilter - 日志查询条件
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQueryFilter {
    pub start_date: Option<chrono::NaiveDate>, // 起始日期(含)
    pub end_date: Option<chrono::NaiveDate>,   // 结束日期(含)
    pub item_id: Option<String>,
    pub actor: Option<String>,
    pub action_type: Option<String>,
}
