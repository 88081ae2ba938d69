// ==========================================
// 空间货舱储位管理系统 - 货物批量导入
// ==========================================
// 红线: 行级类型转换失败只跳过该行并逐行报告,不中断整批导入
// 管道: 文件解析 -> 字段转换 -> 校验 -> 落库
// ==========================================

use crate::domain::item::ItemSpec;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, FileParser};
use crate::importer::{parse_optional_date, parse_optional_i32, parse_required, RowError};
use crate::repository::{ItemRepository, RepositoryError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// ImportSummary - 导入结果汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,       // 成功导入行数
    pub skipped: usize,        // 跳过行数
    pub errors: Vec<RowError>, // 行级错误明细
}

// ==========================================
// ItemImporter - 货物导入器
// ==========================================
pub struct ItemImporter {
    item_repo: Arc<ItemRepository>,
}

impl ItemImporter {
    pub fn new(item_repo: Arc<ItemRepository>) -> Self {
        Self { item_repo }
    }

    /// 从 CSV 文件批量导入货物
    ///
    /// 表头: itemId,name,width,depth,height,mass,priority,
    ///       expiryDate,usageLimit,preferredZone
    pub fn import_file(&self, path: &Path) -> ImportResult<ImportSummary> {
        let rows = CsvParser.parse_to_raw_records(path)?;
        let mut summary = ImportSummary {
            imported: 0,
            skipped: 0,
            errors: Vec::new(),
        };

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 2; // 表头占第 1 行
            match Self::convert_row(row) {
                Ok(spec) => match self.item_repo.insert(&spec.into_item(Utc::now())) {
                    Ok(()) => summary.imported += 1,
                    // 主键冲突按行级错误处理,整批继续
                    Err(RepositoryError::UniqueConstraintViolation(msg)) => {
                        warn!(row_number, "导入行主键冲突: {}", msg);
                        summary.skipped += 1;
                        summary.errors.push(RowError {
                            row_number,
                            row: row.clone(),
                            message: format!("itemId 已存在: {}", msg),
                        });
                    }
                    Err(e) => return Err(ImportError::Repository(e)),
                },
                Err(message) => {
                    summary.skipped += 1;
                    summary.errors.push(RowError {
                        row_number,
                        row: row.clone(),
                        message,
                    });
                }
            }
        }

        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "货物导入完成"
        );
        Ok(summary)
    }

    /// 单行字段转换 + 校验
    fn convert_row(row: &HashMap<String, String>) -> Result<ItemSpec, String> {
        let spec = ItemSpec {
            item_id: parse_required(row, "itemId")?,
            name: parse_required(row, "name")?,
            width: parse_required(row, "width")?
                .parse::<i32>()
                .map_err(|e| format!("width 类型转换失败: {}", e))?,
            depth: parse_required(row, "depth")?
                .parse::<i32>()
                .map_err(|e| format!("depth 类型转换失败: {}", e))?,
            height: parse_required(row, "height")?
                .parse::<i32>()
                .map_err(|e| format!("height 类型转换失败: {}", e))?,
            mass: parse_required(row, "mass")?
                .parse::<f64>()
                .map_err(|e| format!("mass 类型转换失败: {}", e))?,
            priority: parse_required(row, "priority")?
                .parse::<i32>()
                .map_err(|e| format!("priority 类型转换失败: {}", e))?,
            expiry_date: parse_optional_date(row, "expiryDate")?,
            usage_limit: parse_optional_i32(row, "usageLimit")?,
            preferred_zone: parse_required(row, "preferredZone")?,
        };
        spec.validate()?;
        Ok(spec)
    }
}
