// ==========================================
// 设备综合效率实时监测系统 - 数据仓储层
// ==========================================
// 职责: 提供主数据/审计数据访问接口,屏蔽数据库细节
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod downtime_repo;
pub mod error;
pub mod event_log_repo;
pub mod machine_repo;
pub mod process_order_repo;
pub mod shift_model_repo;

// 重导出核心仓储
pub use downtime_repo::DowntimeRecordRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use event_log_repo::{EventLogEntry, EventLogRepository};
pub use machine_repo::MachineMasterRepository;
pub use process_order_repo::ProcessOrderRepository;
pub use shift_model_repo::ShiftModelRepository;

use chrono::{DateTime, NaiveDateTime, Utc};

/// 时间戳统一存储格式(UTC,秒精度,可按字符串比较)
pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 格式化时间戳为数据库存储字符串
pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format(TS_FORMAT).to_string()
}

/// 从数据库存储字符串解析时间戳
pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| RepositoryError::FieldValueError {
            field: "timestamp".to_string(),
            message: format!("无法解析时间戳 '{}': {}", s, e),
        })
}
