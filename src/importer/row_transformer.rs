// ==========================================
// POS现场运维系统 - 行转换器实现
// ==========================================
// 职责: 已通过校验的原始行 → 落库形态记录
// 流程: 拷贝映射字段(类型强转) → 小写规整 → 实体默认值
//       → 查找码替换为内部标识并剥离原始码
// 红线: 纯函数；可选字段缺失永不报错，唯一失败路径是
//       结构性必需查找未解析
// ==========================================

use crate::domain::record::{RawRow, TransformedRecord, ValidationError};
use crate::importer::lookup_resolver::ResolvedLookups;
use crate::domain::record::ColumnMapping;
use crate::schema::registry::{EntitySchema, FieldKind};
use serde_json::json;

pub struct RowTransformer;

impl RowTransformer {
    /// 转换单行
    ///
    /// # 返回
    /// - Ok(TransformedRecord): 落库就绪
    /// - Err(ValidationError): 结构性必需查找未解析（行排除出提交集）
    pub fn transform(
        &self,
        schema: &EntitySchema,
        mappings: &[ColumnMapping],
        lookups: &ResolvedLookups,
        row: &RawRow,
    ) -> Result<TransformedRecord, ValidationError> {
        let mut record = TransformedRecord::new(row.row_number);

        // 拷贝映射字段（带类型强转），空值直接省略
        for mapping in mappings {
            let Some(def) = schema.field(&mapping.field_key) else {
                continue;
            };
            let Some(col) = mapping.source_column.as_deref() else {
                continue;
            };
            let raw = row.get(col).trim();
            if raw.is_empty() {
                continue;
            }

            let value = match def.kind {
                FieldKind::Text => json!(raw),
                // 校验阶段已保证数值可解析；此处失败只会来自
                // 未配校验规则的数值字段，按省略处理
                FieldKind::Number => match raw.parse::<f64>() {
                    Ok(n) => json!(n),
                    Err(_) => continue,
                },
                // 布尔默认 true，仅大小写不敏感等于 "false" 时为假
                FieldKind::Bool => json!(!raw.eq_ignore_ascii_case("false")),
            };
            record.set(def.key, value);
        }

        // 小写规整（status/type/priority 等封闭码值）
        for field in schema.lowercase_fields {
            if let Some(v) = record.get_str(field).map(|s| s.to_lowercase()) {
                record.set(field, json!(v));
            }
        }

        // 实体默认值（仅源缺失时注入）
        for (field, value) in schema.defaults {
            if !record.fields.contains_key(*field) {
                record.set(field, json!(value));
            }
        }

        // 查找码替换
        if let Some(binding) = &schema.lookup {
            if let Some(code) = record.get_str(binding.source_field).map(str::to_string) {
                match lookups.resolve(binding.reference, &code) {
                    Some(id) => {
                        record.set(binding.target_field, json!(id));
                    }
                    None if binding.required => {
                        // 结构性必需: 有码但解析不到 → 行级错误
                        let label = schema
                            .field(binding.source_field)
                            .map(|f| f.name.to_string())
                            .unwrap_or_else(|| binding.source_field.to_string());
                        return Err(ValidationError {
                            row: row.row_number,
                            column: label,
                            value: code.clone(),
                            message: format!("Invalid bank code: {}", code),
                        });
                    }
                    None => {
                        // 可选引用解析不到 → 静默丢弃
                    }
                }
                // 原始码字段不落库
                record.fields.remove(binding.source_field);
            }
        }

        Ok(record)
    }
}
