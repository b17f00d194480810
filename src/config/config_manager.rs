// ==========================================
// 设备综合效率实时监测系统 - 配置管理器
// ==========================================
// 职责: 引擎配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value, scope_id='global')
// 口径: 配置缺失或解析失败一律回退编译期默认值,不阻断引擎
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键与默认值
// ==========================================

/// 微停机阈值(分钟): 非计划停机短于该时长按微停机归组
pub const KEY_MICROSTOP_THRESHOLD_MINUTES: &str = "microstop_threshold_minutes";
pub const DEFAULT_MICROSTOP_THRESHOLD_MINUTES: f64 = 5.0;

/// 重算协作方耗时告警阈值(毫秒)
pub const KEY_RECALC_SLOW_WARN_MS: &str = "recalc_slow_warn_ms";
pub const DEFAULT_RECALC_SLOW_WARN_MS: u64 = 250;

/// 周期重算间隔(秒)
pub const KEY_RECALC_INTERVAL_SECS: &str = "recalc_interval_secs";
pub const DEFAULT_RECALC_INTERVAL_SECS: u64 = 60;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入配置值(scope_id='global',测试与运维用)
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 带默认值读取 f64 配置(缺失/解析失败回退默认值并告警)
    fn get_f64_or(&self, key: &str, default: f64) -> f64 {
        match self.get_config_value(key) {
            Ok(Some(raw)) => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => value,
                _ => {
                    tracing::warn!("配置 {} 取值非法: '{}', 回退默认值 {}", key, raw, default);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                tracing::warn!("配置 {} 读取失败: {}, 回退默认值 {}", key, e, default);
                default
            }
        }
    }

    /// 带默认值读取 u64 配置
    fn get_u64_or(&self, key: &str, default: u64) -> u64 {
        match self.get_config_value(key) {
            Ok(Some(raw)) => match raw.parse::<u64>() {
                Ok(value) => value,
                Err(_) => {
                    tracing::warn!("配置 {} 取值非法: '{}', 回退默认值 {}", key, raw, default);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                tracing::warn!("配置 {} 读取失败: {}, 回退默认值 {}", key, e, default);
                default
            }
        }
    }

    /// 微停机阈值(分钟)
    pub fn microstop_threshold_minutes(&self) -> f64 {
        self.get_f64_or(
            KEY_MICROSTOP_THRESHOLD_MINUTES,
            DEFAULT_MICROSTOP_THRESHOLD_MINUTES,
        )
    }

    /// 重算协作方耗时告警阈值(毫秒)
    pub fn recalc_slow_warn_ms(&self) -> u64 {
        self.get_u64_or(KEY_RECALC_SLOW_WARN_MS, DEFAULT_RECALC_SLOW_WARN_MS)
    }

    /// 周期重算间隔(秒)
    pub fn recalc_interval_secs(&self) -> u64 {
        self.get_u64_or(KEY_RECALC_INTERVAL_SECS, DEFAULT_RECALC_INTERVAL_SECS)
    }
}
