// ==========================================
// 空间货舱储位管理系统 - 布局导出
// ==========================================
// 输出: 当前全部货物的布局 CSV
// 列: ItemID,ContainerID,StartCoordinates,EndCoordinates
// 未放置货物以 N/A 占位
// ==========================================

use crate::importer::error::ImportResult;
use crate::repository::{ItemRepository, PlacementRepository};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

// ==========================================
// ArrangementExporter - 布局导出器
// ==========================================
pub struct ArrangementExporter {
    item_repo: Arc<ItemRepository>,
    placement_repo: Arc<PlacementRepository>,
}

impl ArrangementExporter {
    pub fn new(item_repo: Arc<ItemRepository>, placement_repo: Arc<PlacementRepository>) -> Self {
        Self {
            item_repo,
            placement_repo,
        }
    }

    /// 导出当前布局到 CSV 文件
    ///
    /// # 返回
    /// - Ok(rows): 写出的数据行数(不含表头)
    pub fn export_file(&self, path: &Path) -> ImportResult<usize> {
        let items = self.item_repo.list()?;
        let placements: HashMap<String, _> = self
            .placement_repo
            .list()?
            .into_iter()
            .map(|p| (p.item_id.clone(), p))
            .collect();

        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["ItemID", "ContainerID", "StartCoordinates", "EndCoordinates"])?;

        let mut rows = 0;
        for item in &items {
            match placements.get(&item.item_id) {
                Some(p) => writer.write_record([
                    item.item_id.as_str(),
                    p.container_id.as_str(),
                    &p.position.start_coordinates.to_string(),
                    &p.position.end_coordinates.to_string(),
                ])?,
                None => writer.write_record([item.item_id.as_str(), "N/A", "N/A", "N/A"])?,
            }
            rows += 1;
        }
        writer.flush()?;

        info!(rows, path = %path.display(), "布局导出完成");
        Ok(rows)
    }
}
