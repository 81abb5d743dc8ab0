// ==========================================
// POS现场运维系统 - 行校验器实现
// ==========================================
// 职责: 逐行逐字段校验，收集全部错误
// 红线: 行内不短路，首个错误之后其余字段照常检查，
//       调用方需要完整错误清单
// ==========================================

use crate::domain::record::{ColumnMapping, RawRow, ValidationError};
use crate::schema::registry::EntitySchema;

pub struct RowValidator;

// ==========================================
// RowVerdict - 单行校验结论
// ==========================================
#[derive(Debug)]
pub struct RowVerdict {
    pub row_number: usize,
    pub errors: Vec<ValidationError>, // 空 = 行有效
}

impl RowVerdict {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl RowValidator {
    /// 校验一行的所有已绑定字段
    ///
    /// # 规则
    /// - 必填且解析值为空 → "Required field is empty"
    /// - 非空且字段带规则 → 对 trim 后的值执行规则
    ///
    /// 错误列标签使用字段显示名
    pub fn validate_row(
        &self,
        schema: &EntitySchema,
        mappings: &[ColumnMapping],
        row: &RawRow,
    ) -> RowVerdict {
        let mut errors = Vec::new();

        for mapping in mappings {
            let Some(def) = schema.field(&mapping.field_key) else {
                continue;
            };
            let value = mapping
                .source_column
                .as_deref()
                .map(|col| row.get(col).trim())
                .unwrap_or("");

            if mapping.required && value.is_empty() {
                errors.push(ValidationError {
                    row: row.row_number,
                    column: def.name.to_string(),
                    value: String::new(),
                    message: "Required field is empty".to_string(),
                });
                continue;
            }

            if value.is_empty() {
                continue;
            }

            if let Some(rule) = &def.rule {
                if let Some(message) = rule.check(value) {
                    errors.push(ValidationError {
                        row: row.row_number,
                        column: def.name.to_string(),
                        value: value.to_string(),
                        message,
                    });
                }
            }
        }

        RowVerdict {
            row_number: row.row_number,
            errors,
        }
    }

    /// 校验整批行（不中断；每行独立得出结论）
    pub fn validate_all(
        &self,
        schema: &EntitySchema,
        mappings: &[ColumnMapping],
        rows: &[RawRow],
    ) -> Vec<RowVerdict> {
        rows.iter()
            .map(|row| self.validate_row(schema, mappings, row))
            .collect()
    }
}
