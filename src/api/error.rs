// ==========================================
// POS现场运维系统 - API 层错误类型
// ==========================================
// 职责: 将导入层/仓储层错误转换为调用方可读的错误消息
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::StoreError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("文件导入失败: {0}")]
    ImportFailed(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 从导入层错误转换
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Store(e) => ApiError::DatabaseError(e.to_string()),
            ImportError::TooManyRows { .. }
            | ImportError::EmptyHeader
            | ImportError::CsvParseError(_)
            | ImportError::MappingIncomplete(_) => ApiError::ImportFailed(err.to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

// 从仓储层错误转换
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
