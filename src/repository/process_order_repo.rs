// ==========================================
// 设备综合效率实时监测系统 - 生产工单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::order::{OrderStatus, ProcessOrder};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_ts, parse_ts};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ProcessOrderRepository - 生产工单仓储
// ==========================================

/// 生产工单仓储
/// 职责: 管理 process_order 表的读写
pub struct ProcessOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProcessOrderRepository {
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

    /// 插入工单
    pub fn insert(&self, order: &ProcessOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO process_order
                (order_id, machine_code, planned_quantity, target_performance,
                 starts_at, ends_at, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                order.order_id,
                order.machine_code,
                order.planned_quantity,
                order.target_performance,
                format_ts(order.starts_at),
                order.ends_at.map(format_ts),
                order.status.to_db_str(),
            ],
        )?;
        Ok(())
    }

    /// 查询机组当前执行中的工单(按开始时间取最新一条)
    ///
    /// # 返回
    /// - Ok(Some(ProcessOrder)): 存在执行中工单
    /// - Ok(None): 无执行中工单
    pub fn find_active_for_machine(
        &self,
        machine_code: &str,
    ) -> RepositoryResult<Option<ProcessOrder>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT order_id, machine_code, planned_quantity, target_performance,
                       starts_at, ends_at, status
                FROM process_order
                WHERE machine_code = ?1 AND status = 'ACTIVE'
                ORDER BY starts_at DESC
                LIMIT 1
                "#,
                params![machine_code],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        match raw {
            None => Ok(None),
            Some((order_id, machine_code, planned_quantity, target_performance, starts, ends, status)) => {
                let starts_at = parse_ts(&starts)?;
                let ends_at = match ends {
                    Some(value) => Some(parse_ts(&value)?),
                    None => None,
                };
                Ok(Some(ProcessOrder {
                    order_id,
                    machine_code,
                    planned_quantity,
                    target_performance,
                    starts_at,
                    ends_at,
                    status: OrderStatus::parse(&status),
                }))
            }
        }
    }

    /// 将机组当前执行中的工单标记为已完成
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数(0 表示原本就没有执行中工单)
    pub fn complete_active_for_machine(&self, machine_code: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE process_order SET status = 'COMPLETED'
             WHERE machine_code = ?1 AND status = 'ACTIVE'",
            params![machine_code],
        )?;
        Ok(affected)
    }
}
