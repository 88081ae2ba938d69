// ==========================================
// 空间货舱储位管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 约定: 日期存储为 %Y-%m-%d,时间戳存储为 %Y-%m-%d %H:%M:%S
// ==========================================

pub mod action_log_repo;
pub mod container_repo;
pub mod error;
pub mod item_repo;
pub mod placement_repo;
pub mod sim_state_repo;

pub use action_log_repo::ActionLogRepository;
pub use container_repo::ContainerRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use item_repo::ItemRepository;
pub use placement_repo::PlacementRepository;
pub use sim_state_repo::SimStateRepository;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// 日期 -> 存储字符串
pub(crate) fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// 存储字符串 -> 日期
pub(crate) fn parse_date(s: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| RepositoryError::FieldValueError {
        field: "date".to_string(),
        message: format!("无法解析日期 '{}': {}", s, e),
    })
}

/// 时间戳 -> 存储字符串
pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 存储字符串 -> UTC 时间戳
pub(crate) fn parse_ts(s: &str) -> RepositoryResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| RepositoryError::FieldValueError {
            field: "timestamp".to_string(),
            message: format!("无法解析时间戳 '{}': {}", s, e),
        })
}
