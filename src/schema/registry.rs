// ==========================================
// POS现场运维系统 - 实体字段契约表
// ==========================================
// 职责: 四类可导入实体的字段定义/唯一键/查找绑定/默认值
// 红线: 本表是校验器与模板导出的唯一事实来源
// ==========================================

use crate::domain::types::{EntityType, ReferenceType};
use crate::schema::validators::FieldRule;

// ==========================================
// FieldKind - 字段值类型（转换器据此做类型强转）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Bool,
}

// ==========================================
// FieldDef - 单字段定义
// ==========================================
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,        // 显示名（模板表头/错误列标签）
    pub key: &'static str,         // 契约 key（映射与落库字段名）
    pub kind: FieldKind,           // 值类型
    pub required: bool,            // 逐行必填
    pub description: &'static str, // 人类可读说明
    pub rule: Option<FieldRule>,   // 可选校验规则（只检非空值）
}

impl FieldDef {
    fn text(name: &'static str, key: &'static str, required: bool, description: &'static str) -> Self {
        Self {
            name,
            key,
            kind: FieldKind::Text,
            required,
            description,
            rule: None,
        }
    }

    fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rule = Some(rule);
        self
    }

    fn numeric(mut self) -> Self {
        self.kind = FieldKind::Number;
        self
    }
}

// ==========================================
// LookupBinding - 查找解析绑定
// ==========================================
// 语义: source_field 上的短码经参照集解析为内部标识，
//       写入 target_field 并剥离原始码字段。
//       required=true 时“有码但解析不到”为行级错误（结构性必需），
//       required=false 时静默丢弃；码缺失与否由逐行必填标志管。
#[derive(Debug, Clone)]
pub struct LookupBinding {
    pub source_field: &'static str, // 携带短码的契约字段
    pub reference: ReferenceType,   // 参照集
    pub target_field: &'static str, // 解析后写入的存储字段
    pub required: bool,             // 插入结构性必需
}

// ==========================================
// EntitySchema - 实体契约
// ==========================================
#[derive(Debug, Clone)]
pub struct EntitySchema {
    pub entity: EntityType,
    pub unique_key: &'static str, // 去重唯一键（单键，见 DESIGN.md 决策 1）
    pub fields: Vec<FieldDef>,
    pub lookup: Option<LookupBinding>,
    /// 源缺失时注入的默认值（字段, 值）
    pub defaults: &'static [(&'static str, &'static str)],
    /// 落库前统一小写的字段
    pub lowercase_fields: &'static [&'static str],
    /// 模板导出的示例行（与 fields 顺序一致）
    pub sample_row: &'static [&'static str],
}

impl EntitySchema {
    /// 按实体类型取字段契约（纯查表，无副作用）
    pub fn for_entity(entity: EntityType) -> EntitySchema {
        match entity {
            EntityType::Device => device_schema(),
            EntityType::ServiceCall => call_schema(),
            EntityType::Engineer => engineer_schema(),
            EntityType::Merchant => merchant_schema(),
        }
    }

    /// 按 key 查字段定义
    pub fn field(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// 必填字段子集
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.required)
    }

    /// 唯一键字段的显示名
    pub fn unique_key_label(&self) -> &'static str {
        self.field(self.unique_key).map(|f| f.name).unwrap_or(self.unique_key)
    }
}

// ==========================================
// devices - POS 终端设备
// ==========================================
fn device_schema() -> EntitySchema {
    EntitySchema {
        entity: EntityType::Device,
        unique_key: "serial_number",
        fields: vec![
            FieldDef::text("Serial Number", "serial_number", true, "Unique device serial number")
                .with_rule(FieldRule::pattern(r"^[A-Za-z0-9-]+$", "Invalid format")),
            FieldDef::text("TID", "tid", false, "Terminal ID"),
            FieldDef::text("Model", "model", true, "Device model (e.g., Ingenico ICT250)"),
            FieldDef::text("Brand", "brand", false, "Device brand (Ingenico, VeriFone, FUJIAN)"),
            FieldDef::text("Status", "status", false, "warehouse, issued, installed, faulty")
                .with_rule(FieldRule::one_of(
                    &["warehouse", "issued", "installed", "faulty"],
                    "Must be: warehouse, issued, installed, or faulty",
                )),
            FieldDef::text("Bank Code", "bank_code", false, "Bank code (HDFC, ICICI, AXIS, SBI, KOTAK)"),
            FieldDef::text("SIM Number", "sim_number", false, "SIM card number"),
            FieldDef::text("Firmware Version", "firmware_version", false, "Firmware version"),
        ],
        // 设备的银行归属取服务端导入口径: 有码但解析不到 → 行级错误
        lookup: Some(LookupBinding {
            source_field: "bank_code",
            reference: ReferenceType::Bank,
            target_field: "device_bank",
            required: true,
        }),
        defaults: &[("status", "warehouse")],
        lowercase_fields: &["status"],
        sample_row: &[
            "SN123456789", "TID001", "ICT250", "Ingenico", "warehouse", "HDFC", "9876543210", "1.0.0",
        ],
    }
}

// ==========================================
// calls - 现场服务工单
// ==========================================
fn call_schema() -> EntitySchema {
    EntitySchema {
        entity: EntityType::ServiceCall,
        unique_key: "call_number",
        fields: vec![
            FieldDef::text("Call Number", "call_number", true, "Unique call reference number"),
            FieldDef::text("Type", "type", true, "installation, maintenance, swap, repair")
                .with_rule(FieldRule::one_of(
                    &["installation", "maintenance", "swap", "repair"],
                    "Must be: installation, maintenance, swap, or repair",
                )),
            FieldDef::text("Priority", "priority", false, "low, medium, high, urgent")
                .with_rule(FieldRule::one_of(
                    &["low", "medium", "high", "urgent"],
                    "Must be: low, medium, high, or urgent",
                )),
            FieldDef::text("Client Name", "client_name", true, "Merchant/client name"),
            FieldDef::text("Client Phone", "client_phone", false, "Contact phone number"),
            FieldDef::text("Client Address", "client_address", false, "Full address"),
            FieldDef::text("Client City", "client_city", false, "City name"),
            FieldDef::text("Client State", "client_state", false, "State name"),
            FieldDef::text("Client Pincode", "client_pincode", false, "6-digit pincode")
                .with_rule(FieldRule::pattern(r"^\d{6}$", "Must be 6 digits")),
            FieldDef::text("MID", "mid", false, "15-digit Merchant ID")
                .with_rule(FieldRule::pattern(r"^\d{15}$", "Must be 15 digits")),
            FieldDef::text("TID", "tid", false, "Terminal ID"),
            FieldDef::text("Bank Code", "bank_code", false, "Bank code"),
            FieldDef::text("Remarks", "remarks", false, "Additional notes"),
        ],
        lookup: Some(LookupBinding {
            source_field: "bank_code",
            reference: ReferenceType::Bank,
            target_field: "client_bank",
            required: false,
        }),
        defaults: &[
            ("type", "installation"),
            ("priority", "medium"),
            ("status", "pending"),
        ],
        lowercase_fields: &["type", "priority"],
        sample_row: &[
            "CALL-001", "installation", "medium", "ABC Store", "9876543210", "123 Main St",
            "Mumbai", "Maharashtra", "400001", "123456789012345", "TID001", "HDFC",
            "New installation",
        ],
    }
}

// ==========================================
// engineers - 现场工程师
// ==========================================
fn engineer_schema() -> EntitySchema {
    EntitySchema {
        entity: EntityType::Engineer,
        unique_key: "employee_id",
        fields: vec![
            FieldDef::text("Employee ID", "employee_id", true, "Format: UDSPL#### (e.g., UDSPL0001)")
                .with_rule(FieldRule::pattern(
                    r"^[A-Z]{5}\d{4}$",
                    "Format must be UDSPL#### (e.g., UDSPL0001)",
                )),
            FieldDef::text("Full Name", "full_name", true, "Engineer full name"),
            FieldDef::text("Email", "email", true, "Email address")
                .with_rule(FieldRule::pattern(
                    r"^[^\s@]+@[^\s@]+\.[^\s@]+$",
                    "Invalid email format",
                )),
            FieldDef::text("Phone", "phone", true, "Phone number with country code"),
            FieldDef::text("City", "city", false, "City of operation"),
            FieldDef::text("State", "state", false, "State"),
            FieldDef::text("Region", "region", false, "Region name"),
        ],
        lookup: None,
        defaults: &[("role", "engineer"), ("status", "active")],
        lowercase_fields: &[],
        sample_row: &[
            "UDSPL0001", "John Doe", "john@example.com", "+919876543210", "Mumbai",
            "Maharashtra", "West",
        ],
    }
}

// ==========================================
// merchants - 商户/安装地点
// ==========================================
fn merchant_schema() -> EntitySchema {
    EntitySchema {
        entity: EntityType::Merchant,
        unique_key: "mid",
        fields: vec![
            FieldDef::text("Name", "name", true, "Merchant business name"),
            FieldDef::text("MID", "mid", true, "15-digit Merchant ID")
                .with_rule(FieldRule::pattern(r"^\d{15}$", "Must be 15 digits")),
            FieldDef::text("Phone", "phone", false, "Contact phone"),
            FieldDef::text("Email", "email", false, "Contact email"),
            FieldDef::text("Address", "address", false, "Full address"),
            FieldDef::text("City", "city", true, "City name"),
            FieldDef::text("State", "state", false, "State name"),
            FieldDef::text("Pincode", "pincode", false, "6-digit pincode")
                .with_rule(FieldRule::pattern(r"^\d{6}$", "Must be 6 digits")),
            FieldDef::text("Latitude", "latitude", false, "GPS latitude")
                .numeric()
                .with_rule(FieldRule::range(-90.0, 90.0, "Must be between -90 and 90")),
            FieldDef::text("Longitude", "longitude", false, "GPS longitude")
                .numeric()
                .with_rule(FieldRule::range(-180.0, 180.0, "Must be between -180 and 180")),
            FieldDef::text("Bank Code", "bank_code", false, "Associated bank"),
        ],
        lookup: Some(LookupBinding {
            source_field: "bank_code",
            reference: ReferenceType::Bank,
            target_field: "bank_id",
            required: false,
        }),
        defaults: &[],
        lowercase_fields: &[],
        sample_row: &[
            "ABC Store", "123456789012345", "9876543210", "abc@store.com", "123 Main St",
            "Mumbai", "Maharashtra", "400001", "19.0760", "72.8777", "HDFC",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_entities_have_schema() {
        for entity in EntityType::ALL {
            let schema = EntitySchema::for_entity(entity);
            assert!(!schema.fields.is_empty());
            // 唯一键必须出现在字段表中
            assert!(schema.field(schema.unique_key).is_some());
            // 示例行与字段一一对应
            assert_eq!(schema.sample_row.len(), schema.fields.len());
        }
    }

    #[test]
    fn test_device_required_subset() {
        let schema = EntitySchema::for_entity(EntityType::Device);
        let required: Vec<&str> = schema.required_fields().map(|f| f.key).collect();
        assert_eq!(required, vec!["serial_number", "model"]);
    }

    #[test]
    fn test_call_required_subset() {
        let schema = EntitySchema::for_entity(EntityType::ServiceCall);
        let required: Vec<&str> = schema.required_fields().map(|f| f.key).collect();
        assert_eq!(required, vec!["call_number", "type", "client_name"]);
    }

    #[test]
    fn test_merchant_required_subset() {
        let schema = EntitySchema::for_entity(EntityType::Merchant);
        let required: Vec<&str> = schema.required_fields().map(|f| f.key).collect();
        assert_eq!(required, vec!["name", "mid", "city"]);
    }

    #[test]
    fn test_sample_rows_pass_rules() {
        // 模板示例行必须自洽（每个字段值都通过自身规则）
        for entity in EntityType::ALL {
            let schema = EntitySchema::for_entity(entity);
            for (def, value) in schema.fields.iter().zip(schema.sample_row.iter()) {
                if value.is_empty() {
                    continue;
                }
                if let Some(rule) = &def.rule {
                    assert_eq!(
                        rule.check(value),
                        None,
                        "{} 示例值 {} 未通过 {} 规则",
                        entity,
                        value,
                        def.key
                    );
                }
            }
        }
    }
}
