// ==========================================
// POS现场运维系统 - 列映射器实现
// ==========================================
// 职责: 契约字段 → 源列 自动匹配 + 人工覆盖 + 完整性门禁
// 口径: 三级匹配严格按优先级，首个命中即停
// ==========================================

use crate::domain::record::ColumnMapping;
use crate::schema::registry::EntitySchema;

pub struct ColumnMapper {
    mappings: Vec<ColumnMapping>,
}

impl ColumnMapper {
    /// 对每个契约字段在表头列表上执行一次自动匹配
    ///
    /// # 匹配优先级
    /// 1. 双方小写并剥离下划线/空格后完全相等
    /// 2. 表头（小写）包含契约 key（下划线转空格、小写）
    /// 3. 显示名（小写）包含表头（小写）
    ///
    /// 同级内按表头源顺序取第一个；全部落空则留空待人工绑定
    pub fn auto_match(schema: &EntitySchema, headers: &[String]) -> Self {
        let mappings = schema
            .fields
            .iter()
            .map(|def| {
                let matched = Self::match_header(def.key, def.name, headers);
                ColumnMapping {
                    field_key: def.key.to_string(),
                    source_column: matched,
                    required: def.required,
                }
            })
            .collect();

        Self { mappings }
    }

    fn match_header(key: &str, name: &str, headers: &[String]) -> Option<String> {
        let key_squashed = squash(key);
        // 级别 1: 规整后完全相等
        if let Some(h) = headers.iter().find(|h| squash(h) == key_squashed) {
            return Some(h.clone());
        }

        // 级别 2: 表头包含 key（下划线转空格）
        let key_spaced = key.to_lowercase().replace('_', " ");
        if let Some(h) = headers
            .iter()
            .find(|h| h.to_lowercase().contains(&key_spaced))
        {
            return Some(h.clone());
        }

        // 级别 3: 显示名包含表头
        let name_lower = name.to_lowercase();
        if let Some(h) = headers
            .iter()
            .find(|h| !h.is_empty() && name_lower.contains(&h.to_lowercase()))
        {
            return Some(h.clone());
        }

        None
    }

    /// 人工覆盖某字段的绑定（含覆盖未命中的字段）
    ///
    /// # 参数
    /// - field_key: 契约字段 key
    /// - source_column: 新绑定的源列名（空串解除绑定）
    pub fn set_mapping(&mut self, field_key: &str, source_column: &str) {
        if let Some(mapping) = self.mappings.iter_mut().find(|m| m.field_key == field_key) {
            mapping.source_column = if source_column.is_empty() {
                None
            } else {
                Some(source_column.to_string())
            };
        }
    }

    /// 完整性门禁: 所有必填字段均已绑定非空源列
    pub fn complete(&self) -> bool {
        self.mappings
            .iter()
            .filter(|m| m.required)
            .all(|m| m.is_bound())
    }

    /// 未绑定的必填字段 key 列表（报错文案用）
    pub fn unbound_required(&self) -> Vec<String> {
        self.mappings
            .iter()
            .filter(|m| m.required && !m.is_bound())
            .map(|m| m.field_key.clone())
            .collect()
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        &self.mappings
    }

    pub fn into_mappings(self) -> Vec<ColumnMapping> {
        self.mappings
    }
}

/// 小写并剥离下划线/空格
fn squash(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| *c != '_' && *c != ' ')
        .collect()
}
