// ==========================================
// 设备综合效率实时监测系统 - 引擎层
// ==========================================
// 职责: 实现指标业务规则,不拼 SQL
// 红线: Engine 不拼 SQL, 退化输入必须按文档化默认值兜底
// ==========================================

pub mod buffer;
pub mod calculator;
pub mod downtime_aggregator;
pub mod error;
pub mod events;
pub mod shift_resolver;

// 重导出核心引擎
pub use buffer::{MachineMetricsBuffer, RecalcOutcome};
pub use calculator::{CalculationWarning, OeeCalculator, OeeComputation};
pub use downtime_aggregator::{DowntimeAggregator, DowntimeStore};
pub use error::{EngineError, EngineResult};
pub use events::{
    NoOpEventPublisher, OeeEvent, OeeEventPublisher, OeeEventType, OptionalEventPublisher,
};
pub use shift_resolver::{ShiftCalendarResolver, ShiftModelStore};
