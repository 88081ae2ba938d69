// ==========================================
// 空间货舱储位管理系统 - 领域类型定义
// ==========================================
// 坐标系约定: 宽(width) × 深(depth) × 高(height)
// 取用面约定: depth = 0 平面为货柜开口
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Coordinates - 货柜内坐标点
// ==========================================
// 红线: 分量一律为非负整数,不做浮点运算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub width: i32,  // 宽方向分量
    pub depth: i32,  // 深方向分量(0 = 取用面)
    pub height: i32, // 高方向分量
}

impl Coordinates {
    pub fn new(width: i32, depth: i32, height: i32) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    /// 原点 (0, 0, 0)
    pub fn origin() -> Self {
        Self::new(0, 0, 0)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.width, self.depth, self.height)
    }
}

// ==========================================
// Dimensions - 三维尺寸
// ==========================================
// 用途: 货物体积(footprint)与货柜包络尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: i32,
    pub depth: i32,
    pub height: i32,
}

impl Dimensions {
    pub fn new(width: i32, depth: i32, height: i32) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    /// 三个分量是否均为正
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.depth > 0 && self.height > 0
    }

    /// 体积(单位: 立方坐标单位)
    pub fn volume(&self) -> i64 {
        self.width as i64 * self.depth as i64 * self.height as i64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.depth, self.height)
    }
}

// ==========================================
// Position - 轴对齐放置盒
// ==========================================
// 红线: end = start + footprint,各分量单调不减
// 序列化对齐外部载荷: startCoordinates / endCoordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub start_coordinates: Coordinates,
    pub end_coordinates: Coordinates,
}

impl Position {
    pub fn new(start: Coordinates, end: Coordinates) -> Self {
        Self {
            start_coordinates: start,
            end_coordinates: end,
        }
    }

    /// 由起点与体积尺寸构造放置盒
    pub fn from_origin(start: Coordinates, footprint: Dimensions) -> Self {
        Self {
            start_coordinates: start,
            end_coordinates: Coordinates::new(
                start.width + footprint.width,
                start.depth + footprint.depth,
                start.height + footprint.height,
            ),
        }
    }

    /// 各分量是否满足 start <= end 且 start 非负
    pub fn is_well_formed(&self) -> bool {
        let s = &self.start_coordinates;
        let e = &self.end_coordinates;
        s.width >= 0
            && s.depth >= 0
            && s.height >= 0
            && s.width <= e.width
            && s.depth <= e.depth
            && s.height <= e.height
    }

    /// 放置盒的三维尺寸
    pub fn extent(&self) -> Dimensions {
        Dimensions::new(
            self.end_coordinates.width - self.start_coordinates.width,
            self.end_coordinates.depth - self.start_coordinates.depth,
            self.end_coordinates.height - self.start_coordinates.height,
        )
    }

    /// 放置盒体积
    pub fn volume(&self) -> i64 {
        self.extent().volume()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.start_coordinates, self.end_coordinates)
    }
}

// ==========================================
// WasteReason - 废弃原因
// ==========================================
// 判定: 过期优先于用尽(两者同时成立时报告 Expired)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WasteReason {
    Expired,   // 已过期
    OutOfUses, // 使用次数用尽
}

impl WasteReason {
    /// 转换为对外载荷字符串(与历史接口一致)
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteReason::Expired => "Expired",
            WasteReason::OutOfUses => "Out of Uses",
        }
    }
}

impl fmt::Display for WasteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// RetrievalAction - 取用步骤动作
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalAction {
    Move,     // 挪开遮挡货物
    Retrieve, // 取出目标货物
}

impl RetrievalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalAction::Move => "move",
            RetrievalAction::Retrieve => "retrieve",
        }
    }
}

impl fmt::Display for RetrievalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
