// ==========================================
// POS现场运维系统 - 导入记录模型
// ==========================================
// 职责: 导入管道各阶段的中间产物与最终结果
// 生命周期: 仅在一次导入会话内
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ==========================================
// RawRow - 原始行记录
// ==========================================
// 用途: 解析器输出（列名 → 原始字符串），创建后不再修改
// 行号: 1 为表头，数据行从 2 起（与用户电子表格口径一致）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    pub row_number: usize,                // 源文件行号（报错定位用）
    pub values: HashMap<String, String>,  // 源列名 → 单元格原始值（已 trim）
}

impl RawRow {
    /// 按源列名取值（未映射/缺列视为空串）
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }
}

// ==========================================
// ColumnMapping - 列映射
// ==========================================
// 用途: 契约字段 → 源文件列 的绑定
// 生命周期: 解析时自动匹配生成，校验开始前可人工覆盖，之后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub field_key: String,             // 契约字段 key
    pub source_column: Option<String>, // 绑定的源列名（None = 未绑定）
    pub required: bool,                // 契约字段是否必填
}

impl ColumnMapping {
    pub fn is_bound(&self) -> bool {
        self.source_column
            .as_deref()
            .map(|c| !c.is_empty())
            .unwrap_or(false)
    }
}

// ==========================================
// ValidationError - 校验错误
// ==========================================
// 用途: 字段级/行级缺陷，只收集不中断；修正需重新上传文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: usize,      // 源文件行号
    pub column: String,  // 显示名（面向用户的列标签）
    pub value: String,   // 违规原始值
    pub message: String, // 人类可读错误
}

// ==========================================
// TransformedRecord - 落库形态记录
// ==========================================
// 用途: 通过校验的行经转换后的存储字段 → 类型化值
// 消费: 被批量提交器恰好消费一次
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformedRecord {
    pub row_number: usize,                          // 溯源行号
    pub fields: BTreeMap<String, serde_json::Value>, // 存储字段 → 值
}

impl TransformedRecord {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            fields: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, field: &str, value: serde_json::Value) {
        self.fields.insert(field.to_string(), value);
    }

    /// 读取字符串字段（非字符串/缺失返回 None）
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_str())
    }
}

// ==========================================
// RowError - 批次级错误
// ==========================================
// 说明: 存储拒绝整个批次时，错误只挂在批次首行行号上，
//       不归属到具体行（粒度取舍见 DESIGN.md）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,    // 批次首行的源文件行号
    pub error: String, // 存储返回的一条错误信息
}

// ==========================================
// ImportResult - 导入最终结果
// ==========================================
// 不变式: 非取消运行满足 success + failed == 提交记录总数
//        （重复键单独计数，不计入两者）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: usize,          // 成功落库行数
    pub failed: usize,           // 批次失败行数
    pub errors: Vec<RowError>,   // 批次级错误（按发生顺序）
    pub duplicates: Vec<String>, // 跳过的重复键
    pub cancelled: bool,         // 是否在批次间被协作取消
    pub completed_at: Option<DateTime<Utc>>, // 归档时间
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_row_missing_column_is_empty() {
        let mut values = HashMap::new();
        values.insert("Serial Number".to_string(), "SN001".to_string());
        let row = RawRow {
            row_number: 2,
            values,
        };
        assert_eq!(row.get("Serial Number"), "SN001");
        assert_eq!(row.get("Model"), "");
    }

    #[test]
    fn test_mapping_bound() {
        let mut mapping = ColumnMapping {
            field_key: "serial_number".to_string(),
            source_column: None,
            required: true,
        };
        assert!(!mapping.is_bound());

        mapping.source_column = Some("".to_string());
        assert!(!mapping.is_bound());

        mapping.source_column = Some("Serial Number".to_string());
        assert!(mapping.is_bound());
    }

    #[test]
    fn test_transformed_record_set_get() {
        let mut record = TransformedRecord::new(2);
        record.set("serial_number", json!("SN001"));
        record.set("latitude", json!(19.076));

        assert_eq!(record.get_str("serial_number"), Some("SN001"));
        assert_eq!(record.get_str("latitude"), None); // 非字符串
        assert_eq!(record.fields.len(), 2);
    }
}
