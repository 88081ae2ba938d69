// ==========================================
// 空间货舱储位管理系统 - 货柜批量导入
// ==========================================
// 红线: 行级类型转换失败只跳过该行并逐行报告,不中断整批导入
// ==========================================

use crate::domain::container::ContainerSpec;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, FileParser};
use crate::importer::item_importer::ImportSummary;
use crate::importer::{parse_required, RowError};
use crate::repository::{ContainerRepository, RepositoryError};
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// ContainerImporter - 货柜导入器
// ==========================================
pub struct ContainerImporter {
    container_repo: Arc<ContainerRepository>,
}

impl ContainerImporter {
    pub fn new(container_repo: Arc<ContainerRepository>) -> Self {
        Self { container_repo }
    }

    /// 从 CSV 文件批量导入货柜
    ///
    /// 表头: containerId,zone,width,depth,height
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
                Ok(spec) => match self.container_repo.insert(&spec.into_container(Utc::now())) {
                    Ok(()) => summary.imported += 1,
                    Err(RepositoryError::UniqueConstraintViolation(msg)) => {
                        warn!(row_number, "导入行主键冲突: {}", msg);
                        summary.skipped += 1;
                        summary.errors.push(RowError {
                            row_number,
                            row: row.clone(),
                            message: format!("containerId 已存在: {}", msg),
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
            "货柜导入完成"
        );
        Ok(summary)
    }

    /// 单行字段转换 + 校验
    fn convert_row(row: &HashMap<String, String>) -> Result<ContainerSpec, String> {
        let spec = ContainerSpec {
            container_id: parse_required(row, "containerId")?,
            zone: parse_required(row, "zone")?,
            width: parse_required(row, "width")?
                .parse::<i32>()
                .map_err(|e| format!("width 类型转换失败: {}", e))?,
            depth: parse_required(row, "depth")?
                .parse::<i32>()
                .map_err(|e| format!("depth 类型转换失败: {}", e))?,
            height: parse_required(row, "height")?
                .parse::<i32>()
                .map_err(|e| format!("height 类型转换失败: {}", e))?,
        };
        spec.validate()?;
        Ok(spec)
    }
}
