// ==========================================
// 设备综合效率实时监测系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换引擎/仓储错误为调用方友好的错误
// 口径: 所有错误信息必须包含显式原因(可解释性)
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入拒绝
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("非法时间窗: {0}")]
    InvalidWindow(String),

    // ==========================================
    // 无数据(调用方按"暂无数据"处理)
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("机组 {0} 暂无指标数据")]
    NoDataYet(String),

    // ==========================================
    // 可恢复失败
    // ==========================================
    /// 协作方失败,上一份快照仍然可读
    #[error("指标计算暂不可用: {0}")]
    CalculationUnavailable(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 EngineError 转换
// 目的: 保持错误分类语义(拒绝/无数据/可恢复)
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidFact { .. } => ApiError::InvalidInput(err.to_string()),
            EngineError::InvalidWindow { .. } => ApiError::InvalidWindow(err.to_string()),
            EngineError::UnknownMachine(machine) => {
                ApiError::NotFound(format!("机组 {} 从未收到任何事实更新", machine))
            }
            EngineError::SnapshotNotFound(machine) => ApiError::NoDataYet(machine),
            EngineError::CalculationUnavailable(reason) => {
                ApiError::CalculationUnavailable(reason)
            }
            EngineError::LockPoisoned(reason) => ApiError::InternalError(reason),
            EngineError::Other(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("field={}: {}", field, message))
            }
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_mapping() {
        let err: ApiError = EngineError::UnknownMachine("1".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = EngineError::SnapshotNotFound("1".to_string()).into();
        assert!(matches!(err, ApiError::NoDataYet(_)));

        let err: ApiError = EngineError::InvalidFact {
            field: "RUNTIME_MINUTES".to_string(),
            value: -1.0,
            reason: "负值".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let err: ApiError =
            EngineError::CalculationUnavailable("下游超时".to_string()).into();
        assert!(matches!(err, ApiError::CalculationUnavailable(_)));
    }
}
