// ==========================================
// POS现场运维系统 - 领域层
// ==========================================
// 职责: 导入管道的实体与类型定义
// ==========================================

pub mod record;
pub mod types;

pub use record::{
    ColumnMapping, ImportResult, RawRow, RowError, TransformedRecord, ValidationError,
};
pub use types::{EntityType, ImportStage, ReferenceType};
