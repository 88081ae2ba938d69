// ==========================================
// 空间货舱储位管理系统 - 引擎层
// ==========================================
// 红线: 引擎只做纯计算,读取快照、产出结果,不触碰持久层
// ==========================================

pub mod placement;
pub mod retrieval;
pub mod simulation;
pub mod spatial;
pub mod waste;

pub use placement::{PlacementPlan, PlacementPlanner, PlannerLimits, Rearrangement};
pub use retrieval::RetrievalPlanner;
pub use simulation::{
    ItemRef, SimulationError, SimulationOutcome, SimulationRequest, TimeSimulator, UsedItem,
};
pub use spatial::{Occupant, SpatialIndex};
pub use waste::{ReturnPlan, WasteEngine};
