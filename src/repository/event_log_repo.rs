// ==========================================
// 设备综合效率实时监测系统 - 操作审计仓储
// ==========================================
// 职责: 记录 ingest / reset / recalc 操作流水,供追溯
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_ts, parse_ts};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// EventLogEntry - 审计流水条目
// ==========================================
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    pub log_id: String,             // 流水ID
    pub machine_code: String,       // 机组代码
    pub action_type: String,        // 操作类型(INGEST/RESET_ORDER/RECALC)
    pub payload: Option<String>,    // 操作明细(JSON,可解释性)
    pub created_at: DateTime<Utc>,  // 记录时间
}

// ==========================================
// EventLogRepository - 操作审计仓储
// ==========================================

/// 操作审计仓储
/// 职责: 管理 event_log 表的读写
pub struct EventLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EventLogRepository {
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

    /// 追加一条审计流水
    ///
    /// # 参数
    /// - machine_code: 机组代码
    /// - action_type: 操作类型
    /// - payload: 操作明细(JSON 字符串)
    ///
    /// # 返回
    /// - Ok(String): 新流水ID
    pub fn append(
        &self,
        machine_code: &str,
        action_type: &str,
        payload: Option<String>,
    ) -> RepositoryResult<String> {
        let log_id = Uuid::new_v4().to_string();
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO event_log (log_id, machine_code, action_type, payload, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                log_id,
                machine_code,
                action_type,
                payload,
                format_ts(Utc::now()),
            ],
        )?;
        Ok(log_id)
    }

    /// 查询机组最近的审计流水(按时间倒序)
    pub fn find_recent(
        &self,
        machine_code: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<EventLogEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT log_id, machine_code, action_type, payload, created_at
            FROM event_log
            WHERE machine_code = ?1
            ORDER BY created_at DESC, log_id DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![machine_code, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (log_id, machine_code, action_type, payload, created_raw) = row?;
            entries.push(EventLogEntry {
                log_id,
                machine_code,
                action_type,
                payload,
                created_at: parse_ts(&created_raw)?,
            });
        }
        Ok(entries)
    }
}
