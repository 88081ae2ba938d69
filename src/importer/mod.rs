// ==========================================
// 空间货舱储位管理系统 - 导入层
// ==========================================
// 管道: 文件解析 -> 字段转换 -> 校验 -> 落库
// 红线: 行级失败逐行报告,不中断整批
// ==========================================

pub mod arrangement_export;
pub mod container_importer;
pub mod error;
pub mod file_parser;
pub mod item_importer;

pub use arrangement_export::ArrangementExporter;
pub use container_importer::ContainerImporter;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, FileParser};
pub use item_importer::{ImportSummary, ItemImporter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// RowError - 行级导入错误
// ==========================================
// 带原始行数据回传,便于人工修正后重新导入
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    pub row_number: usize,            // 原始文件行号(表头为第 1 行)
    pub row: HashMap<String, String>, // 原始行数据
    pub message: String,              // 失败原因
}

// ==========================================
// 字段转换辅助函数
// ==========================================

/// 必填字段: 缺失或空白即行级失败
pub(crate) fn parse_required(row: &HashMap<String, String>, key: &str) -> Result<String, String> {
    match row.get(key) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(format!("缺失必填字段: {}", key)),
    }
}

/// 可选日期字段: 空白视为无,格式错误即行级失败
pub(crate) fn parse_optional_date(
    row: &HashMap<String, String>,
    key: &str,
) -> Result<Option<NaiveDate>, String> {
    match row.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| format!("{} 日期转换失败 '{}': {}", key, raw, e)),
    }
}

/// 可选整数字段: 空白视为无,格式错误即行级失败
pub(crate) fn parse_optional_i32(
    row: &HashMap<String, String>,
    key: &str,
) -> Result<Option<i32>, String> {
    match row.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|e| format!("{} 类型转换失败 '{}': {}", key, raw, e)),
    }
}
