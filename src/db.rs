// ==========================================
// 空间货舱储位管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// - 统一建表入口,避免各仓储各自为政
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout(毫秒)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 新库的时钟初值(仅在 sim_state 为空时写入)
pub const CLOCK_EPOCH: &str = "2025-01-01";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema(幂等)
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            item_id        TEXT PRIMARY KEY,
            name           TEXT NOT NULL,
            width          INTEGER NOT NULL,
            depth          INTEGER NOT NULL,
            height         INTEGER NOT NULL,
            mass           REAL NOT NULL,
            priority       INTEGER NOT NULL,
            expiry_date    TEXT,
            usage_limit    INTEGER,
            preferred_zone TEXT NOT NULL,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS containers (
            container_id TEXT PRIMARY KEY,
            zone         TEXT NOT NULL,
            width        INTEGER NOT NULL,
            depth        INTEGER NOT NULL,
            height       INTEGER NOT NULL,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS placements (
            item_id      TEXT PRIMARY KEY REFERENCES items(item_id) ON DELETE CASCADE,
            container_id TEXT NOT NULL REFERENCES containers(container_id),
            start_width  INTEGER NOT NULL,
            start_depth  INTEGER NOT NULL,
            start_height INTEGER NOT NULL,
            end_width    INTEGER NOT NULL,
            end_depth    INTEGER NOT NULL,
            end_height   INTEGER NOT NULL,
            updated_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_placements_container
            ON placements(container_id);

        CREATE TABLE IF NOT EXISTS action_log (
            action_id    TEXT PRIMARY KEY,
            action_type  TEXT NOT NULL,
            action_ts    TEXT NOT NULL,
            actor        TEXT NOT NULL,
            item_id      TEXT,
            container_id TEXT,
            details_json TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_action_log_ts
            ON action_log(action_ts);

        CREATE TABLE IF NOT EXISTS sim_state (
            id           INTEGER PRIMARY KEY CHECK (id = 1),
            clock_date   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    // 新库播种时钟初值,已有时钟不覆盖
    conn.execute(
        "INSERT OR IGNORE INTO sim_state (id, clock_date) VALUES (1, ?1)",
        [CLOCK_EPOCH],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let clock: String = conn
            .query_row("SELECT clock_date FROM sim_state WHERE id = 1", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(clock, CLOCK_EPOCH);
    }
}
