// ==========================================
// 空间货舱储位管理系统 - 仿真时钟仓储
// ==========================================
// 红线: 时钟推进与当日 usage 变更必须单事务提交
// sim_state 为单行表(id 恒为 1)
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{fmt_date, fmt_ts, parse_date};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// SimStateRepository - 仿真时钟仓储
// ==========================================
pub struct SimStateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SimStateRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取当前仿真日期
    pub fn current_date(&self) -> RepositoryResult<NaiveDate> {
        let conn = self.get_conn()?;
        let raw: String =
            conn.query_row("SELECT clock_date FROM sim_state WHERE id = 1", [], |r| {
                r.get(0)
            })?;
        parse_date(&raw)
    }

    /// 单事务提交时间推进: 新日期 + 当日 usage 变更一并生效
    ///
    /// # 参数
    /// - `new_date`: 推进后的仿真日期
    /// - `usage_updates`: (item_id, 新 usage_limit) 列表
    pub fn commit_advance(
        &self,
        new_date: NaiveDate,
        usage_updates: &[(String, i32)],
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let now = fmt_ts(Utc::now());
        for (item_id, usage_limit) in usage_updates {
            tx.execute(
                "UPDATE items SET usage_limit = ?1, updated_at = ?2 WHERE item_id = ?3",
                params![usage_limit, now, item_id],
            )?;
        }
        tx.execute(
            "UPDATE sim_state SET clock_date = ?1 WHERE id = 1",
            params![fmt_date(new_date)],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}
