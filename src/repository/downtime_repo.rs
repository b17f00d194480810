// ==========================================
// 设备综合效率实时监测系统 - 停机记录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 同时实现引擎层 DowntimeStore trait(依赖倒置)
// ==========================================

use crate::domain::downtime::DowntimeRecord;
use crate::domain::types::DowntimeClass;
use crate::engine::downtime_aggregator::DowntimeStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_ts, parse_ts};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// DowntimeRecordRepository - 停机记录仓储
// ==========================================

/// 停机记录仓储
/// 职责: 管理 downtime_record 表的读写
pub struct DowntimeRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DowntimeRecordRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入停机记录
    ///
    /// # 约束
    /// - ended_at 必须晚于 started_at,否则报 ValidationError
    pub fn insert(&self, record: &DowntimeRecord) -> RepositoryResult<()> {
        if record.ended_at <= record.started_at {
            return Err(RepositoryError::ValidationError(format!(
                "停机记录时间倒挂: record_id={}, started_at={}, ended_at={}",
                record.record_id, record.started_at, record.ended_at
            )));
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO downtime_record
                (record_id, machine_code, started_at, ended_at, reason_code, class)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.record_id,
                record.machine_code,
                format_ts(record.started_at),
                format_ts(record.ended_at),
                record.reason_code,
                record.class.to_db_str(),
            ],
        )?;
        Ok(())
    }

    /// 查询与给定窗口有重叠的停机记录(按开始时间升序)
    ///
    /// 重叠判定: started_at < window_end AND ended_at > window_start
    pub fn find_overlapping(
        &self,
        machine_code: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<DowntimeRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT record_id, machine_code, started_at, ended_at, reason_code, class
            FROM downtime_record
            WHERE machine_code = ?1 AND started_at < ?2 AND ended_at > ?3
            ORDER BY started_at ASC, record_id ASC
            "#,
        )?;

        let rows = stmt.query_map(
            params![machine_code, format_ts(window_end), format_ts(window_start)],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )?;

        let mut records = Vec::new();
        for row in rows {
            let (record_id, machine_code, started, ended, reason_code, class_raw) = row?;
            let class = DowntimeClass::parse(&class_raw).ok_or_else(|| {
                RepositoryError::FieldValueError {
                    field: "class".to_string(),
                    message: format!("未识别的停机分类: {}", class_raw),
                }
            })?;
            records.push(DowntimeRecord {
                record_id,
                machine_code,
                started_at: parse_ts(&started)?,
                ended_at: parse_ts(&ended)?,
                reason_code,
                class,
            });
        }
        Ok(records)
    }

    /// 统计机组停机记录条数(导入汇总用)
    pub fn count_for_machine(&self, machine_code: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM downtime_record WHERE machine_code = ?1",
            params![machine_code],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// ==========================================
// DowntimeStore trait 实现(引擎层依赖倒置)
// ==========================================
impl DowntimeStore for DowntimeRecordRepository {
    fn find_overlapping(
        &self,
        machine_code: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<DowntimeRecord>, Box<dyn Error + Send + Sync>> {
        DowntimeRecordRepository::find_overlapping(self, machine_code, window_start, window_end)
            .map_err(|e| Box::new(e) as Box<dyn Error + Send + Sync>)
    }
}
