// ==========================================
// 设备综合效率实时监测系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod downtime;
pub mod machine;
pub mod metrics;
pub mod order;
pub mod shift;
pub mod types;

// 重导出核心类型
pub use downtime::{DowntimeBreakdown, DowntimeRecord, ReasonTotal};
pub use machine::{MachineFactSet, MachineMaster};
pub use metrics::MetricSnapshot;
pub use order::{OrderStatus, ProcessOrder};
pub use shift::{ShiftModel, ShiftWindow};
pub use types::{DowntimeClass, FactField, OeeGrade, ShiftScope};
