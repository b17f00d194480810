// ==========================================
// 设备综合效率实时监测系统 - 引擎层错误类型
// ==========================================
// 职责: 指标引擎的错误分类
// 口径: 所有错误信息必须包含显式原因(可解释性)
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 输入拒绝(状态不变) =====
    #[error("非法事实: field={field}, value={value}, 原因: {reason}")]
    InvalidFact {
        field: String,
        value: f64,
        reason: String,
    },

    #[error("非法时间窗: start={start}, end={end}")]
    InvalidWindow { start: String, end: String },

    // ===== 无数据(可恢复,调用方按"暂无数据"处理) =====
    #[error("未知机组: {0} (从未收到任何事实更新)")]
    UnknownMachine(String),

    #[error("机组 {0} 尚未计算过快照")]
    SnapshotNotFound(String),

    // ===== 协作方失败(可恢复,上一份快照仍然可读) =====
    #[error("指标计算暂不可用: {0}")]
    CalculationUnavailable(String),

    // ===== 并发基础设施 =====
    #[error("机组状态锁损坏: {0}")]
    LockPoisoned(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
