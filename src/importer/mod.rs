// ==========================================
// POS现场运维系统 - 导入层
// ==========================================
// 职责: 外部表格数据导入，生成内部领域记录
// 流程: 解析 → 列映射 → 校验 → 查找/去重 → 转换 → 分批提交
// ==========================================

// 模块声明
pub mod batch_committer;
pub mod column_mapper;
pub mod duplicate_checker;
pub mod error;
pub mod file_parser;
pub mod lookup_resolver;
pub mod row_transformer;
pub mod row_validator;
pub mod session;
pub mod template;

// 重导出核心类型
pub use batch_committer::{BatchCommitter, DEFAULT_BATCH_SIZE};
pub use column_mapper::ColumnMapper;
pub use duplicate_checker::DuplicateChecker;
pub use error::{ImportError, ImportPipelineResult};
pub use file_parser::{FileParser, ParsedFile};
pub use lookup_resolver::ResolvedLookups;
pub use row_transformer::RowTransformer;
pub use row_validator::{RowValidator, RowVerdict};
pub use session::{ImportSession, SessionSettings};
pub use template::{template_csv, template_file_name};
