// ==========================================
// POS现场运维系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 口径: 阶段级错误立即阻断并单独上抛；
//       行级缺陷（校验/查找/重复）是收集值，永不作为 Err 传播
// ==========================================

use crate::domain::types::ImportStage;
use crate::repository::error::StoreError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件解析错误（致命，会话停在 upload）=====
    #[error("表头行缺失或为空")]
    EmptyHeader,

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("行数超限: {actual} 行（上限 {limit}）")]
    TooManyRows { actual: usize, limit: usize },

    // ===== 映射错误（门禁，阻断进入校验）=====
    #[error("列映射不完整，未绑定的必填字段: {0}")]
    MappingIncomplete(String),

    // ===== 阶段机错误（非法跳转是构造期错误）=====
    #[error("非法阶段转换: {from} → {to}")]
    StageTransition { from: ImportStage, to: ImportStage },

    // ===== 数据库错误 =====
    #[error(transparent)]
    Store(#[from] StoreError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportPipelineResult<T> = Result<T, ImportError>;
