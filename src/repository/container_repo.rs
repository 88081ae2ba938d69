// ==========================================
// 空间货舱储位管理系统 - 货柜仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::container::Container;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_ts, parse_ts};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ContainerRepository - 货柜仓储
// ==========================================
pub struct ContainerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ContainerRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RepositoryResult<Container>> {
        let container_id: String = row.get("container_id")?;
        let zone: String = row.get("zone")?;
        let width: i32 = row.get("width")?;
        let depth: i32 = row.get("depth")?;
        let height: i32 = row.get("height")?;
        let created_raw: String = row.get("created_at")?;

        Ok(parse_ts(&created_raw).map(|created_at| Container {
            container_id,
            zone,
            width,
            depth,
            height,
            created_at,
        }))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入货柜
    ///
    /// # 返回
    /// - `Err(UniqueConstraintViolation)`: container_id 已存在
    pub fn insert(&self, container: &Container) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO containers (
                container_id, zone, width, depth, height, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                container.container_id,
                container.zone,
                container.width,
                container.depth,
                container.height,
                fmt_ts(container.created_at),
            ],
        )?;
        Ok(())
    }

    /// 批量插入货柜(单事务,全部成功或全部失败)
    pub fn insert_batch(&self, containers: &[Container]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        for container in containers {
            tx.execute(
                r#"
                INSERT INTO containers (
                    container_id, zone, width, depth, height, created_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
                params![
                    container.container_id,
                    container.zone,
                    container.width,
                    container.depth,
                    container.height,
                    fmt_ts(container.created_at),
                ],
            )?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(containers.len())
    }

    /// 删除货柜(调用方保证柜内无放置)
    pub fn delete(&self, container_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM containers WHERE container_id = ?1",
            params![container_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Container".to_string(),
                id: container_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 container_id 查询
    pub fn get(&self, container_id: &str) -> RepositoryResult<Option<Container>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT * FROM containers WHERE container_id = ?1")?;
        let mut rows = stmt.query_map(params![container_id], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row??)),
            None => Ok(None),
        }
    }

    /// 全量货柜(container_id 升序)
    pub fn list(&self) -> RepositoryResult<Vec<Container>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT * FROM containers ORDER BY container_id")?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut containers = Vec::new();
        for row in rows {
            containers.push(row??);
        }
        Ok(containers)
    }

    /// 是否存在
    pub fn exists(&self, container_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM containers WHERE container_id = ?1",
            params![container_id],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }
}
