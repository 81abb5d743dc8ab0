// ==========================================
// POS现场运维系统 - 字段契约层
// ==========================================
// 职责: 各实体的静态字段定义、校验规则与默认值
// 红线: 纯查表，无副作用，运行时不可变
// ==========================================

pub mod registry;
pub mod validators;

pub use registry::{EntitySchema, FieldDef, FieldKind, LookupBinding};
pub use validators::FieldRule;
