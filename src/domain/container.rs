// ==========================================
// 空间货舱储位管理系统 - 货柜领域模型
// ==========================================
// 红线: 货柜创建后尺寸不可变,仅在无放置时允许删除
// 对齐: containers 表
// ==========================================

use crate::domain::types::Dimensions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Container - 货柜
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    // ===== 主键 =====
    pub container_id: String, // 货柜唯一标识

    // ===== 区域归属 =====
    pub zone: String, // 所属区域标签

    // ===== 包络尺寸 =====
    pub width: i32,
    pub depth: i32,
    pub height: i32,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
}

impl Container {
    /// 货柜包络尺寸
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.depth, self.height)
    }

    /// 货柜总容积
    pub fn volume(&self) -> i64 {
        self.dimensions().volume()
    }
}

// ==========================================
// ContainerSpec - 新建/导入货柜的输入
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub container_id: String,
    pub zone: String,
    pub width: i32,
    pub depth: i32,
    pub height: i32,
}

impl ContainerSpec {
    /// 校验输入字段,返回首个违规描述
    pub fn validate(&self) -> Result<(), String> {
        if self.container_id.trim().is_empty() {
            return Err("containerId 不能为空".to_string());
        }
        if self.zone.trim().is_empty() {
            return Err("zone 不能为空".to_string());
        }
        if self.width <= 0 || self.depth <= 0 || self.height <= 0 {
            return Err(format!(
                "包络尺寸必须为正整数: {}x{}x{}",
                self.width, self.depth, self.height
            ));
        }
        Ok(())
    }

    /// 转换为领域实体
    pub fn into_container(self, now: DateTime<Utc>) -> Container {
        Container {
            container_id: self.container_id,
            zone: self.zone,
            width: self.width,
            depth: self.depth,
            height: self.height,
            created_at: now,
        }
    }
}
