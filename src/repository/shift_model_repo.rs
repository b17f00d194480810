// ==========================================
// 设备综合效率实时监测系统 - 班次模型仓储
// ==========================================
// 红线: Repository 不含业务逻辑(作用域优先级裁决在引擎层)
// 说明: 同时实现引擎层 ShiftModelStore trait(依赖倒置)
// ==========================================

use crate::domain::shift::ShiftModel;
use crate::domain::types::ShiftScope;
use crate::engine::shift_resolver::ShiftModelStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveTime;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 班次时刻统一存储格式
const TIME_FORMAT: &str = "%H:%M:%S";

// ==========================================
// ShiftModelRepository - 班次模型仓储
// ==========================================

/// 班次模型仓储
/// 职责: 管理 shift_model 表的读写
pub struct ShiftModelRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShiftModelRepository {
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

    /// 写入或更新班次模型
    pub fn upsert(&self, model: &ShiftModel) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shift_model
                (shift_id, scope, scope_code, weekday, start_time, end_time, break_minutes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(shift_id) DO UPDATE SET
                scope = excluded.scope,
                scope_code = excluded.scope_code,
                weekday = excluded.weekday,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                break_minutes = excluded.break_minutes
            "#,
            params![
                model.shift_id,
                model.scope.to_db_str(),
                model.scope_code,
                model.weekday as i64,
                model.start_time.format(TIME_FORMAT).to_string(),
                model.end_time.format(TIME_FORMAT).to_string(),
                model.break_minutes,
            ],
        )?;
        Ok(())
    }

    /// 查询某机组在某星期日可能适用的班次模型
    ///
    /// 过滤条件(纯查询,不做优先级裁决):
    /// - weekday 匹配
    /// - 机组级: scope_code = 机组代码
    /// - 区域级: scope_code = 机组所属区域(machine_master 联查)
    /// - 全厂级: 全部返回
    pub fn find_applicable(
        &self,
        machine_code: &str,
        weekday: u8,
    ) -> RepositoryResult<Vec<ShiftModel>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT shift_id, scope, scope_code, weekday, start_time, end_time, break_minutes
            FROM shift_model
            WHERE weekday = ?1
              AND (
                    (scope = 'MACHINE' AND scope_code = ?2)
                 OR (scope = 'AREA' AND scope_code = COALESCE(
                        (SELECT area_code FROM machine_master WHERE machine_code = ?2), ''))
                 OR scope = 'PLANT'
              )
            ORDER BY shift_id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![weekday as i64, machine_code], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, f64>(6)?,
            ))
        })?;

        let mut models = Vec::new();
        for row in rows {
            let (shift_id, scope_raw, scope_code, weekday_raw, start_raw, end_raw, break_minutes) =
                row?;
            models.push(ShiftModel {
                shift_id,
                scope: ShiftScope::parse(&scope_raw),
                scope_code,
                weekday: weekday_raw as u8,
                start_time: parse_time(&start_raw)?,
                end_time: parse_time(&end_raw)?,
                break_minutes,
            });
        }
        Ok(models)
    }
}

/// 解析班次时刻字符串
fn parse_time(s: &str) -> Result<NaiveTime, RepositoryError> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|e| RepositoryError::FieldValueError {
        field: "shift_time".to_string(),
        message: format!("无法解析班次时刻 '{}': {}", s, e),
    })
}

// ==========================================
// ShiftModelStore trait 实现(引擎层依赖倒置)
// ==========================================
impl ShiftModelStore for ShiftModelRepository {
    fn find_applicable(
        &self,
        machine_code: &str,
        weekday: u8,
    ) -> Result<Vec<ShiftModel>, Box<dyn Error + Send + Sync>> {
        ShiftModelRepository::find_applicable(self, machine_code, weekday)
            .map_err(|e| Box::new(e) as Box<dyn Error + Send + Sync>)
    }
}
