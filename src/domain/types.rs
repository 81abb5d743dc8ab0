// ==========================================
// POS现场运维系统 - 领域类型定义
// ==========================================
// 红线: 导入阶段为封闭枚举，非法跳转在转换表中集中拦截
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 可导入实体类型 (Entity Type)
// ==========================================
// 四类实体各自携带独立的字段契约（见 schema::registry）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Device,      // POS 终端设备
    ServiceCall, // 现场服务工单
    Engineer,    // 现场工程师
    Merchant,    // 商户/安装地点
}

impl EntityType {
    /// 全部实体类型（选择页枚举顺序）
    pub const ALL: [EntityType; 4] = [
        EntityType::Device,
        EntityType::ServiceCall,
        EntityType::Engineer,
        EntityType::Merchant,
    ];

    /// 落库目标表名
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityType::Device => "devices",
            EntityType::ServiceCall => "service_calls",
            EntityType::Engineer => "engineers",
            EntityType::Merchant => "merchants",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Device => write!(f, "devices"),
            EntityType::ServiceCall => write!(f, "calls"),
            EntityType::Engineer => write!(f, "engineers"),
            EntityType::Merchant => write!(f, "merchants"),
        }
    }
}

// ==========================================
// 参照数据类型 (Reference Type)
// ==========================================
// 用途: 查找解析（人类可读短码 → 内部标识）的参照集合标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Bank, // 银行短码（HDFC / ICICI / ...）
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceType::Bank => write!(f, "bank"),
        }
    }
}

// ==========================================
// 导入阶段 (Import Stage)
// ==========================================
// 严格单向: select-type → upload → map → validate → preview → commit → complete
// Validate 为纯计算阶段，不做停留；back 仅允许回退一格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportStage {
    SelectType,
    Upload,
    Map,
    Validate,
    Preview,
    Commit,
    Complete,
}

impl ImportStage {
    /// 前向邻接表（唯一合法的下一阶段）
    pub fn next(&self) -> Option<ImportStage> {
        match self {
            ImportStage::SelectType => Some(ImportStage::Upload),
            ImportStage::Upload => Some(ImportStage::Map),
            ImportStage::Map => Some(ImportStage::Validate),
            ImportStage::Validate => Some(ImportStage::Preview),
            ImportStage::Preview => Some(ImportStage::Commit),
            ImportStage::Commit => Some(ImportStage::Complete),
            ImportStage::Complete => None,
        }
    }

    /// 后向邻接表（back 动作的唯一目标；终态与起点不可回退）
    pub fn prev(&self) -> Option<ImportStage> {
        match self {
            ImportStage::SelectType => None,
            ImportStage::Upload => Some(ImportStage::SelectType),
            ImportStage::Map => Some(ImportStage::Upload),
            // Validate 不停留，回退语义挂在 Preview 上
            ImportStage::Validate => Some(ImportStage::Map),
            ImportStage::Preview => Some(ImportStage::Map),
            ImportStage::Commit => None, // 提交开始后不可回退
            ImportStage::Complete => None,
        }
    }

    /// 合法前向转换判定（集中校验，非法跳转是构造期错误而非运行时可能性）
    pub fn can_advance_to(&self, to: ImportStage) -> bool {
        self.next() == Some(to)
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStage::SelectType => write!(f, "select-type"),
            ImportStage::Upload => write!(f, "upload"),
            ImportStage::Map => write!(f, "map"),
            ImportStage::Validate => write!(f, "validate"),
            ImportStage::Preview => write!(f, "preview"),
            ImportStage::Commit => write!(f, "commit"),
            ImportStage::Complete => write!(f, "complete"),
        }
    }
}
