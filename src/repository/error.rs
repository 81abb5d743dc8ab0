// ==========================================
// POS现场运维系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("数据库连接失败: {0}")]
    ConnectionError(String),

    #[error("数据库查询失败: {0}")]
    QueryError(String),

    #[error("批量插入失败: {0}")]
    BatchInsertError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryError(err.to_string())
    }
}

/// Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;
