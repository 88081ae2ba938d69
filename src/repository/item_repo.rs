// ==========================================
// 空间货舱储位管理系统 - 货物仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::item::Item;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_ts, parse_date, parse_ts};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ItemRepository - 货物仓储
// ==========================================
pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RepositoryResult<Item>> {
        let expiry_raw: Option<String> = row.get("expiry_date")?;
        let created_raw: String = row.get("created_at")?;
        let updated_raw: String = row.get("updated_at")?;

        let item_id: String = row.get("item_id")?;
        let name: String = row.get("name")?;
        let width: i32 = row.get("width")?;
        let depth: i32 = row.get("depth")?;
        let height: i32 = row.get("height")?;
        let mass: f64 = row.get("mass")?;
        let priority: i32 = row.get("priority")?;
        let usage_limit: Option<i32> = row.get("usage_limit")?;
        let preferred_zone: String = row.get("preferred_zone")?;

        // 日期解析失败作为仓储错误上抛,不静默吞掉
        Ok((|| {
            let expiry_date = match expiry_raw {
                Some(ref s) => Some(parse_date(s)?),
                None => None,
            };
            Ok(Item {
                item_id,
                name,
                width,
                depth,
                height,
                mass,
                priority,
                expiry_date,
                usage_limit,
                preferred_zone,
                created_at: parse_ts(&created_raw)?,
                updated_at: parse_ts(&updated_raw)?,
            })
        })())
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入货物
    ///
    /// # 返回
    /// - `Err(UniqueConstraintViolation)`: item_id 已存在
    pub fn insert(&self, item: &Item) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO items (
                item_id, name, width, depth, height, mass, priority,
                expiry_date, usage_limit, preferred_zone, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                item.item_id,
                item.name,
                item.width,
                item.depth,
                item.height,
                item.mass,
                item.priority,
                item.expiry_date.map(fmt_date),
                item.usage_limit,
                item.preferred_zone,
                fmt_ts(item.created_at),
                fmt_ts(item.updated_at),
            ],
        )?;
        Ok(())
    }

    /// 批量插入货物(单事务,全部成功或全部失败)
    pub fn insert_batch(&self, items: &[Item]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        for item in items {
            tx.execute(
                r#"
                INSERT INTO items (
                    item_id, name, width, depth, height, mass, priority,
                    expiry_date, usage_limit, preferred_zone, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    item.item_id,
                    item.name,
                    item.width,
                    item.depth,
                    item.height,
                    item.mass,
                    item.priority,
                    item.expiry_date.map(fmt_date),
                    item.usage_limit,
                    item.preferred_zone,
                    fmt_ts(item.created_at),
                    fmt_ts(item.updated_at),
                ],
            )?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(items.len())
    }

    /// 取用确认落库: usage 变更与放置删除单事务生效
    ///
    /// # 参数
    /// - `new_usage_limit`: Some(n) 时更新剩余次数;None 表示不限次,不更新
    /// - `remove_placement`: 是否同时删除该货物的放置
    pub fn apply_retrieval(
        &self,
        item_id: &str,
        new_usage_limit: Option<i32>,
        remove_placement: bool,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        if let Some(limit) = new_usage_limit {
            tx.execute(
                "UPDATE items SET usage_limit = ?1, updated_at = ?2 WHERE item_id = ?3",
                params![limit, fmt_ts(chrono::Utc::now()), item_id],
            )?;
        }
        if remove_placement {
            tx.execute(
                "DELETE FROM placements WHERE item_id = ?1",
                params![item_id],
            )?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 删除货物(放置记录随外键级联删除)
    pub fn delete(&self, item_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM items WHERE item_id = ?1", params![item_id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Item".to_string(),
                id: item_id.to_string(),
            });
        }
        Ok(())
    }

    /// 批量删除货物及其放置(单事务,全部成功或全部失败)
    ///
    /// 用途: 完成下坞时移除回收舱单中的全部货物
    pub fn delete_batch(&self, item_ids: &[String]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let mut removed = 0;
        for item_id in item_ids {
            removed += tx.execute("DELETE FROM items WHERE item_id = ?1", params![item_id])?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(removed)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 item_id 查询
    pub fn get(&self, item_id: &str) -> RepositoryResult<Option<Item>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT * FROM items WHERE item_id = ?1")?;
        let mut rows = stmt.query_map(params![item_id], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row??)),
            None => Ok(None),
        }
    }

    /// 按名称查询(重名时取 item_id 最小者,保证确定性)
    pub fn get_by_name(&self, name: &str) -> RepositoryResult<Option<Item>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT * FROM items WHERE name = ?1 ORDER BY item_id LIMIT 1")?;
        let mut rows = stmt.query_map(params![name], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row??)),
            None => Ok(None),
        }
    }

    /// 全量货物(item_id 升序)
    pub fn list(&self) -> RepositoryResult<Vec<Item>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT * FROM items ORDER BY item_id")?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row??);
        }
        Ok(items)
    }

    /// 是否存在
    pub fn exists(&self, item_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM items WHERE item_id = ?1",
            params![item_id],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }
}
