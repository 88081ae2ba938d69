// ==========================================
// 空间货舱储位管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value),缺省值内置于代码
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::placement::PlannerLimits;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键与缺省值
// ==========================================

/// 单次装载规划允许腾挪的货物数量上限
pub const KEY_PLACEMENT_MAX_DISPLACED: &str = "placement.max_displaced";
pub const DEFAULT_PLACEMENT_MAX_DISPLACED: i64 = 8;

/// 日志查询返回条数上限
pub const KEY_LOG_QUERY_LIMIT: &str = "log.query_limit";
pub const DEFAULT_LOG_QUERY_LIMIT: i64 = 500;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 为保证连接行为一致,会对传入连接再次应用统一 PRAGMA(幂等)。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在(使用缺省值)
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值(覆盖旧值)
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取整数配置(解析失败回落缺省值)
    fn get_i64(&self, key: &str, default: i64) -> Result<i64, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(default))
    }

    // ==========================================
    // 类型化读取接口
    // ==========================================

    /// 装载规划参数
    pub fn planner_limits(&self) -> Result<PlannerLimits, Box<dyn Error>> {
        let max_displaced =
            self.get_i64(KEY_PLACEMENT_MAX_DISPLACED, DEFAULT_PLACEMENT_MAX_DISPLACED)?;
        Ok(PlannerLimits {
            max_displaced: max_displaced.max(0) as usize,
        })
    }

    /// 日志查询条数上限
    pub fn log_query_limit(&self) -> Result<i64, Box<dyn Error>> {
        self.get_i64(KEY_LOG_QUERY_LIMIT, DEFAULT_LOG_QUERY_LIMIT)
    }
}
