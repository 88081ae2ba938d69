// ==========================================
// 空间货舱储位管理系统 - 放置仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 红线: 装载方案(目标落位 + 腾挪)必须单事务提交
// ==========================================

use crate::domain::placement::Placement;
use crate::domain::types::{Coordinates, Position};
use crate::engine::placement::PlacementPlan;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::fmt_ts;
use chrono::Utc;
use rusqlite::{params, Connection, Row, Transaction};
use std::sync::{Arc, Mutex};

// ==========================================
// PlacementRepository - 放置仓储
// ==========================================
pub struct PlacementRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlacementRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RepositoryResult<Placement>> {
        let item_id: String = row.get("item_id")?;
        let container_id: String = row.get("container_id")?;
        let start = Coordinates::new(
            row.get("start_width")?,
            row.get("start_depth")?,
            row.get("start_height")?,
        );
        let end = Coordinates::new(
            row.get("end_width")?,
            row.get("end_depth")?,
            row.get("end_height")?,
        );
        let updated_raw: String = row.get("updated_at")?;

        Ok(crate::repository::parse_ts(&updated_raw).map(|updated_at| Placement {
            item_id,
            container_id,
            position: Position::new(start, end),
            updated_at,
        }))
    }

    fn upsert_in_tx(tx: &Transaction<'_>, placement: &Placement) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO placements (
                item_id, container_id,
                start_width, start_depth, start_height,
                end_width, end_depth, end_height, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(item_id) DO UPDATE SET
                container_id = excluded.container_id,
                start_width  = excluded.start_width,
                start_depth  = excluded.start_depth,
                start_height = excluded.start_height,
                end_width    = excluded.end_width,
                end_depth    = excluded.end_depth,
                end_height   = excluded.end_height,
                updated_at   = excluded.updated_at
            "#,
            params![
                placement.item_id,
                placement.container_id,
                placement.position.start_coordinates.width,
                placement.position.start_coordinates.depth,
                placement.position.start_coordinates.height,
                placement.position.end_coordinates.width,
                placement.position.end_coordinates.depth,
                placement.position.end_coordinates.height,
                fmt_ts(placement.updated_at),
            ],
        )?;
        Ok(())
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 写入或替换单条放置(一物一位)
    pub fn upsert(&self, placement: &Placement) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Self::upsert_in_tx(&tx, placement)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 单事务提交装载方案: 目标落位 + 全部腾挪一并生效
    ///
    /// # 返回
    /// - Ok(rows): 写入的放置条数
    pub fn commit_plan(&self, plan: &PlacementPlan) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let now = Utc::now();
        let mut rows = 0;
        for re in &plan.rearrangements {
            let moved = Placement {
                item_id: re.item_id.clone(),
                container_id: re.to_container_id.clone(),
                position: re.to_position,
                updated_at: now,
            };
            Self::upsert_in_tx(&tx, &moved)?;
            rows += 1;
        }
        let target = Placement {
            item_id: plan.item_id.clone(),
            container_id: plan.container_id.clone(),
            position: plan.position,
            updated_at: now,
        };
        Self::upsert_in_tx(&tx, &target)?;
        rows += 1;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(rows)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按货物查询当前放置
    pub fn get_by_item(&self, item_id: &str) -> RepositoryResult<Option<Placement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT * FROM placements WHERE item_id = ?1")?;
        let mut rows = stmt.query_map(params![item_id], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row??)),
            None => Ok(None),
        }
    }

    /// 全量放置(item_id 升序)
    pub fn list(&self) -> RepositoryResult<Vec<Placement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT * FROM placements ORDER BY item_id")?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut placements = Vec::new();
        for row in rows {
            placements.push(row??);
        }
        Ok(placements)
    }

    /// 指定货柜内的放置数量
    pub fn count_by_container(&self, container_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM placements WHERE container_id = ?1",
            params![container_id],
            |r| r.get(0),
        )?;
        Ok(count)
    }
}
