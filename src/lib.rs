// ==========================================
// 设备综合效率实时监测系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 实时 OEE 指标引擎(每机组实时可用率/表现率/质量率)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 主数据访问
pub mod repository;

// 引擎层 - 指标业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 引擎配置
pub mod config;

// 数据库基础设施(连接初始化/PRAGMA 统一/schema 引导)
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 服务装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DowntimeClass, FactField, OeeGrade, ShiftScope};

// 领域实体
pub use domain::{
    DowntimeBreakdown, DowntimeRecord, MachineFactSet, MachineMaster, MetricSnapshot,
    ProcessOrder, ReasonTotal, ShiftModel, ShiftWindow,
};

// 引擎
pub use engine::{
    DowntimeAggregator, EngineError, MachineMetricsBuffer, OeeCalculator, RecalcOutcome,
    ShiftCalendarResolver,
};

// API
pub use api::{ApiError, MetricsApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设备综合效率实时监测系统";

// ==========================================
// 预编译检查
// ==========================================
