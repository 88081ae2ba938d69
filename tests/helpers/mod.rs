// ==========================================
// 测试辅助 - 集成测试共享设施
// ==========================================
// 职责: 临时数据库 + 应用状态装配 + 测试数据构建器
// ==========================================

#![allow(dead_code)]

pub mod test_data_builder;

use cargo_stowage::app::AppState;
use chrono::NaiveDateTime;
use tempfile::NamedTempFile;

/// 创建临时数据库上的应用状态
///
/// # 返回
/// - NamedTempFile: 临时数据库文件(需要保持存活)
/// - AppState: 装配完成的应用状态
pub fn create_test_state() -> (NamedTempFile, AppState) {
    cargo_stowage::logging::init_test();

    let temp_file = NamedTempFile::new().expect("无法创建临时数据库文件");
    let db_path = temp_file.path().to_str().unwrap().to_string();
    let state = AppState::new(&db_path).expect("无法初始化AppState");

    (temp_file, state)
}

/// 测试用固定操作时间戳
pub fn test_ts() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2025-03-15 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}
