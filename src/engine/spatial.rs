// ==========================================
// 空间货舱储位管理系统 - 货柜占位索引
// ==========================================
// 职责: 单货柜维度回答"放置盒是否可放"与"取用路径上有哪些遮挡"
// 红线: 放置盒完全落在货柜包络内(越界即拒绝)
// 红线: 同柜任意两个放置盒内部不相交(允许面贴合)
// 输入: 货柜包络 + 当前放置集合快照
// 输出: 纯计算结果,不触碰持久层
// ==========================================

use crate::domain::container::Container;
use crate::domain::placement::Placement;
use crate::domain::types::{Coordinates, Dimensions, Position};

// ==========================================
// Occupant - 索引内的占位条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupant {
    pub item_id: String,
    pub position: Position,
}

// ==========================================
// SpatialIndex - 单货柜占位索引
// ==========================================
// 占位数量为小规模(单柜数十件),逐一扫描即可
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    dims: Dimensions,
    occupants: Vec<Occupant>,
}

impl SpatialIndex {
    /// 创建空索引
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            occupants: Vec::new(),
        }
    }

    /// 由货柜与放置集合构建索引(仅纳入该柜的放置)
    pub fn from_placements(container: &Container, placements: &[Placement]) -> Self {
        let mut index = Self::new(container.dimensions());
        for p in placements {
            if p.container_id == container.container_id {
                index.occupants.push(Occupant {
                    item_id: p.item_id.clone(),
                    position: p.position,
                });
            }
        }
        // 条目顺序与输入无关,保证后续扫描确定性
        index.occupants.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        index
    }

    /// 货柜包络尺寸
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// 当前占位条目
    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    /// 两个放置盒的内部是否相交(面贴合不算重叠)
    ///
    /// 半开区间口径: [start, end) 三轴同时相交才算重叠
    pub fn boxes_overlap(a: &Position, b: &Position) -> bool {
        a.start_coordinates.width < b.end_coordinates.width
            && b.start_coordinates.width < a.end_coordinates.width
            && a.start_coordinates.depth < b.end_coordinates.depth
            && b.start_coordinates.depth < a.end_coordinates.depth
            && a.start_coordinates.height < b.end_coordinates.height
            && b.start_coordinates.height < a.end_coordinates.height
    }

    /// 放置盒是否完全落在货柜包络内
    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.is_well_formed()
            && pos.end_coordinates.width <= self.dims.width
            && pos.end_coordinates.depth <= self.dims.depth
            && pos.end_coordinates.height <= self.dims.height
    }

    /// 放置盒与现有占位的首个冲突(排除指定货物自身)
    pub fn first_conflict(&self, pos: &Position, exclude_item: Option<&str>) -> Option<&Occupant> {
        self.occupants.iter().find(|o| {
            exclude_item != Some(o.item_id.as_str()) && Self::boxes_overlap(&o.position, pos)
        })
    }

    /// 放置盒是否可放: 在界内且与所有现有占位不重叠
    pub fn fits(&self, pos: &Position) -> bool {
        self.in_bounds(pos) && self.first_conflict(pos, None).is_none()
    }

    /// 插入占位(调用方保证已通过 fits 校验)
    pub fn insert(&mut self, item_id: &str, pos: Position) {
        self.occupants.push(Occupant {
            item_id: item_id.to_string(),
            position: pos,
        });
        self.occupants.sort_by(|a, b| a.item_id.cmp(&b.item_id));
    }

    /// 移除占位,返回被移除条目
    pub fn remove(&mut self, item_id: &str) -> Option<Occupant> {
        let idx = self.occupants.iter().position(|o| o.item_id == item_id)?;
        Some(self.occupants.remove(idx))
    }

    /// 已占体积合计
    pub fn occupied_volume(&self) -> i64 {
        self.occupants.iter().map(|o| o.position.volume()).sum()
    }

    /// 剩余体积 = 包络容积 - 已占体积
    pub fn leftover_volume(&self) -> i64 {
        self.dims.volume() - self.occupied_volume()
    }

    /// 取用面与目标之间的遮挡占位
    ///
    /// 口径: 深度区间与 [0, target.start.depth] 有内部交集的其他占位,
    /// 即 start.depth 严格小于目标前沿的条目;不要求宽/高方向重叠
    /// (机械臂沿取用轴作业,侧向错开的前排货物同样挡路)。
    ///
    /// # 返回
    /// 按 start.depth 升序、再按 item_id 升序的确定性列表
    pub fn obstructions(&self, target_item: &str, target: &Position) -> Vec<&Occupant> {
        let mut blockers: Vec<&Occupant> = self
            .occupants
            .iter()
            .filter(|o| {
                o.item_id != target_item
                    && o.position.start_coordinates.depth < target.start_coordinates.depth
            })
            .collect();
        blockers.sort_by(|a, b| {
            a.position
                .start_coordinates
                .depth
                .cmp(&b.position.start_coordinates.depth)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        blockers
    }

    /// 候选放置起点: 货柜原点 + 现有占位产生的开角点
    ///
    /// 排序口径(确定性): 高度优先,其次深度,最后宽度,全部升序 —
    /// 先贴底、再贴取用面、最后靠左。
    fn candidate_origins(&self) -> Vec<Coordinates> {
        let mut candidates = vec![Coordinates::origin()];
        for o in &self.occupants {
            let s = o.position.start_coordinates;
            let e = o.position.end_coordinates;
            candidates.push(Coordinates::new(e.width, s.depth, s.height));
            candidates.push(Coordinates::new(s.width, e.depth, s.height));
            candidates.push(Coordinates::new(s.width, s.depth, e.height));
        }
        candidates.sort_by(|a, b| {
            a.height
                .cmp(&b.height)
                .then_with(|| a.depth.cmp(&b.depth))
                .then_with(|| a.width.cmp(&b.width))
        });
        candidates.dedup();
        candidates
    }

    /// 首适应扫描: 在候选起点中寻找首个可放位置
    ///
    /// # 返回
    /// - `Some(Position)`: 首个通过 fits 校验的放置盒
    /// - `None`: 当前占位下无可放位置
    pub fn find_position(&self, footprint: Dimensions) -> Option<Position> {
        if !footprint.is_valid() {
            return None;
        }
        for origin in self.candidate_origins() {
            let pos = Position::from_origin(origin, footprint);
            if self.fits(&pos) {
                return Some(pos);
            }
        }
        None
    }
}
