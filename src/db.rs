// ==========================================
// 设备综合效率实时监测系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供主数据表的建表引导(服务自带 schema,无独立迁移目录)
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
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

/// 初始化主数据/审计表(幂等)
///
/// 表清单:
/// - machine_master: 机组主数据
/// - process_order: 生产工单
/// - downtime_record: 停机记录
/// - shift_model: 班次模型
/// - event_log: 操作审计
/// - config_kv: 引擎配置(key-value, scope_id='global')
/// - schema_version: 版本标记
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS machine_master (
            machine_code TEXT PRIMARY KEY,
            machine_name TEXT,
            area_code TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS process_order (
            order_id TEXT PRIMARY KEY,
            machine_code TEXT NOT NULL,
            planned_quantity REAL NOT NULL DEFAULT 0,
            target_performance REAL NOT NULL DEFAULT 0,
            starts_at TEXT NOT NULL,
            ends_at TEXT,
            status TEXT NOT NULL DEFAULT 'PLANNED'
        );
        CREATE INDEX IF NOT EXISTS idx_order_machine_status
            ON process_order(machine_code, status, starts_at);

        CREATE TABLE IF NOT EXISTS downtime_record (
            record_id TEXT PRIMARY KEY,
            machine_code TEXT NOT NULL,
            started_at TEXT NOT NULL,
            ended_at TEXT NOT NULL,
            reason_code TEXT NOT NULL,
            class TEXT NOT NULL
        );
        -- 停机聚合按机组+时间窗查询,保持这个索引
        CREATE INDEX IF NOT EXISTS idx_downtime_machine_time
            ON downtime_record(machine_code, started_at, ended_at);

        CREATE TABLE IF NOT EXISTS shift_model (
            shift_id TEXT PRIMARY KEY,
            scope TEXT NOT NULL,
            scope_code TEXT NOT NULL,
            weekday INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            break_minutes REAL NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_shift_weekday ON shift_model(weekday);

        CREATE TABLE IF NOT EXISTS event_log (
            log_id TEXT PRIMARY KEY,
            machine_code TEXT NOT NULL,
            action_type TEXT NOT NULL,
            payload TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_event_machine_ts
            ON event_log(machine_code, created_at);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    use rusqlite::OptionalExtension;

    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        // 再跑一次不报错
        init_schema(&conn).unwrap();

        assert_eq!(
            read_schema_version(&conn).unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }
}
