// ==========================================
// 空间货舱储位管理系统 - 放置领域模型
// ==========================================
// 红线: 一个货物同一时刻至多一条有效放置
// 红线: 放置盒必须完全落在货柜包络内,且与同柜其余放置互不重叠
// 对齐: placements 表
// ==========================================

use crate::domain::types::{Position, RetrievalAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Placement - 货物放置记录
// ==========================================
// 创建: 放置确认 / 装载方案提交
// 销毁: 取用确认 / 废弃回收完成
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    pub item_id: String,      // 货物标识(一物一位)
    pub container_id: String, // 所在货柜
    pub position: Position,   // 柜内放置盒
    pub updated_at: DateTime<Utc>,
}

impl Placement {
    pub fn new(item_id: &str, container_id: &str, position: Position) -> Self {
        Self {
            item_id: item_id.to_string(),
            container_id: container_id.to_string(),
            position,
            updated_at: Utc::now(),
        }
    }
}

// ==========================================
// RetrievalStep - 取用步骤
// ==========================================
// 临时对象: 按请求计算,不持久化为领域状态
// 序列化对齐外部载荷: {step, action, itemId, itemName}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalStep {
    pub step: usize,             // 步骤序号(从 1 起)
    pub action: RetrievalAction, // move / retrieve
    pub item_id: String,
    pub item_name: String,
}

impl RetrievalStep {
    pub fn movement(step: usize, item_id: &str, item_name: &str) -> Self {
        Self {
            step,
            action: RetrievalAction::Move,
            item_id: item_id.to_string(),
            item_name: item_name.to_string(),
        }
    }

    pub fn retrieval(step: usize, item_id: &str, item_name: &str) -> Self {
        Self {
            step,
            action: RetrievalAction::Retrieve,
            item_id: item_id.to_string(),
            item_name: item_name.to_string(),
        }
    }
}
