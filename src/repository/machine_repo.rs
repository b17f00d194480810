// ==========================================
// 设备综合效率实时监测系统 - 机组主数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::machine::MachineMaster;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// MachineMasterRepository - 机组主数据仓储
// ==========================================

/// 机组主数据仓储
/// 职责: 管理 machine_master 表的读写
pub struct MachineMasterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineMasterRepository {
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

    /// 写入或更新机组主数据
    pub fn upsert(&self, machine: &MachineMaster) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO machine_master (machine_code, machine_name, area_code)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(machine_code) DO UPDATE SET
                machine_name = excluded.machine_name,
                area_code = excluded.area_code
            "#,
            params![machine.machine_code, machine.machine_name, machine.area_code],
        )?;
        Ok(())
    }

    /// 按机组代码查询
    ///
    /// # 返回
    /// - Ok(Some(MachineMaster)): 找到机组
    /// - Ok(None): 未找到
    pub fn find_by_code(&self, machine_code: &str) -> RepositoryResult<Option<MachineMaster>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                "SELECT machine_code, machine_name, area_code
                 FROM machine_master WHERE machine_code = ?1",
                params![machine_code],
                |row| {
                    Ok(MachineMaster {
                        machine_code: row.get(0)?,
                        machine_name: row.get(1)?,
                        area_code: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// 查询机组所属区域代码
    pub fn find_area_code(&self, machine_code: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let result: Option<Option<String>> = conn
            .query_row(
                "SELECT area_code FROM machine_master WHERE machine_code = ?1",
                params![machine_code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result.flatten())
    }

    /// 列出全部机组(周期重算循环使用)
    pub fn list_all(&self) -> RepositoryResult<Vec<MachineMaster>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT machine_code, machine_name, area_code
             FROM machine_master ORDER BY machine_code",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(MachineMaster {
                machine_code: row.get(0)?,
                machine_name: row.get(1)?,
                area_code: row.get(2)?,
            })
        })?;

        let mut machines = Vec::new();
        for row in rows {
            machines.push(row?);
        }
        Ok(machines)
    }
}
