// ==========================================
// POS现场运维系统 - 批量导入引擎
// ==========================================
// 职责: 将不可信的分隔符文件转换为已校验、已解析外键、
//       已去重的领域记录，并分批容错提交到记录存储
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 字段契约层 - 实体字段定义与校验规则
pub mod schema;

// 导入层 - 解析/映射/校验/转换/提交
pub mod importer;

// 数据仓储层 - 记录存储接口
pub mod repository;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntityType, ImportStage, ReferenceType};

// 领域实体
pub use domain::record::{
    ColumnMapping, ImportResult, RawRow, RowError, TransformedRecord, ValidationError,
};

// 字段契约
pub use schema::{EntitySchema, FieldDef, FieldKind, FieldRule, LookupBinding};

// 导入组件
pub use importer::{
    BatchCommitter, ColumnMapper, DuplicateChecker, FileParser, ImportError, ImportSession,
    ResolvedLookups, RowTransformer, RowValidator,
};

// 仓储接口
pub use repository::{RecordStore, SqliteRecordStore, StoreError};

// API
pub use api::ImportApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "POS现场运维系统";
