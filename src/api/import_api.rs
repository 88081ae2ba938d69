// ==========================================
// 空间货舱储位管理系统 - 导入/导出 API
// ==========================================
// 职责: CSV 批量导入货物/货柜、布局导出
// 红线: 行级失败逐行报告,不中断整批;导入动作记录日志
// ==========================================

use crate::api::error::ApiResult;
use crate::api::append_log_best_effort;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::importer::{ArrangementExporter, ContainerImporter, ImportSummary, ItemImporter};
use crate::repository::ActionLogRepository;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// ImportApi - 导入/导出 API
// ==========================================
pub struct ImportApi {
    item_importer: ItemImporter,
    container_importer: ContainerImporter,
    exporter: ArrangementExporter,
    action_log_repo: Arc<ActionLogRepository>,
}

impl ImportApi {
    pub fn new(
        item_importer: ItemImporter,
        container_importer: ContainerImporter,
        exporter: ArrangementExporter,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            item_importer,
            container_importer,
            exporter,
            action_log_repo,
        }
    }

    /// 从 CSV 批量导入货物
    #[instrument(skip(self))]
    pub fn import_items(&self, path: &Path, actor: &str) -> ApiResult<ImportSummary> {
        let summary = self.item_importer.import_file(path)?;
        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::Import, actor, Utc::now().naive_utc()).with_details(
                &serde_json::json!({
                    "kind": "items",
                    "imported": summary.imported,
                    "skipped": summary.skipped,
                }),
            ),
        );
        Ok(summary)
    }

    /// 从 CSV 批量导入货柜
    #[instrument(skip(self))]
    pub fn import_containers(&self, path: &Path, actor: &str) -> ApiResult<ImportSummary> {
        let summary = self.container_importer.import_file(path)?;
        append_log_best_effort(
            &self.action_log_repo,
            ActionLog::new(ActionType::Import, actor, Utc::now().naive_utc()).with_details(
                &serde_json::json!({
                    "kind": "containers",
                    "imported": summary.imported,
                    "skipped": summary.skipped,
                }),
            ),
        );
        Ok(summary)
    }

    /// 导出当前布局到 CSV
    ///
    /// # 返回
    /// - Ok(rows): 写出的数据行数
    #[instrument(skip(self))]
    pub fn export_arrangement(&self, path: &Path) -> ApiResult<usize> {
        Ok(self.exporter.export_file(path)?)
    }
}
