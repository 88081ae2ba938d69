// ==========================================
// 空间货舱储位管理系统 - 操作日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 红线: 日志为追加式,不提供更新/删除
// ==========================================

use crate::domain::action_log::{ActionLog, LogQueryFilter};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params_from_iter, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ActionLogRepository - 操作日志仓储
// ==========================================
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RepositoryResult<ActionLog>> {
        let action_id: String = row.get("action_id")?;
        let action_type: String = row.get("action_type")?;
        let ts_raw: String = row.get("action_ts")?;
        let actor: String = row.get("actor")?;
        let item_id: Option<String> = row.get("item_id")?;
        let container_id: Option<String> = row.get("container_id")?;
        let details_raw: Option<String> = row.get("details_json")?;

        Ok((|| {
            let action_ts = chrono::NaiveDateTime::parse_from_str(&ts_raw, "%Y-%m-%d %H:%M:%S")
                .map_err(|e| RepositoryError::FieldValueError {
                    field: "action_ts".to_string(),
                    message: format!("无法解析时间戳 '{}': {}", ts_raw, e),
                })?;
            let details_json = match details_raw {
                Some(ref s) => Some(serde_json::from_str(s).map_err(|e| {
                    RepositoryError::FieldValueError {
                        field: "details_json".to_string(),
                        message: e.to_string(),
                    }
                })?),
                None => None,
            };
            Ok(ActionLog {
                action_id,
                action_type,
                action_ts,
                actor,
                item_id,
                container_id,
                details_json,
            })
        })())
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 追加操作日志
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO action_log (
                action_id, action_type, action_ts, actor,
                item_id, container_id, details_json
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                log.action_id,
                log.action_type,
                log.action_ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                log.actor,
                log.item_id,
                log.container_id,
                log.details_json.as_ref().map(|v| v.to_string()),
            ],
        )?;
        Ok(log.action_id.clone())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 条件查询日志(action_ts 升序)
    ///
    /// # 参数
    /// - `filter`: 日期范围/货物/操作人/操作类型过滤(字段均可选)
    /// - `limit`: 返回条数上限
    pub fn query(&self, filter: &LogQueryFilter, limit: i64) -> RepositoryResult<Vec<ActionLog>> {
        let mut sql = String::from("SELECT * FROM action_log WHERE 1=1");
        let mut args: Vec<String> = Vec::new();

        if let Some(start) = filter.start_date {
            sql.push_str(" AND action_ts >= ?");
            args.push(format!("{} 00:00:00", start.format("%Y-%m-%d")));
        }
        if let Some(end) = filter.end_date {
            sql.push_str(" AND action_ts <= ?");
            args.push(format!("{} 23:59:59", end.format("%Y-%m-%d")));
        }
        if let Some(ref item_id) = filter.item_id {
            sql.push_str(" AND item_id = ?");
            args.push(item_id.clone());
        }
        if let Some(ref actor) = filter.actor {
            sql.push_str(" AND actor = ?");
            args.push(actor.clone());
        }
        if let Some(ref action_type) = filter.action_type {
            sql.push_str(" AND action_type = ?");
            args.push(action_type.clone());
        }
        // limit 为整数,直接拼入 SQL(占位符绑定会以 TEXT 形式传入)
        sql.push_str(&format!(" ORDER BY action_ts, action_id LIMIT {}", limit.max(0)));

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), Self::map_row)?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row??);
        }
        Ok(logs)
    }
}
