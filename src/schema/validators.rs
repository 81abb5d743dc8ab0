// ==========================================
// POS现场运维系统 - 字段校验规则
// ==========================================
// 职责: 类型化校验规则（模式/枚举/数值范围）
// 说明: 规则在契约表构造时编译，逐行校验零编译开销
// ==========================================

use regex::Regex;

// ==========================================
// FieldRule - 字段级校验规则
// ==========================================
// 约定: check 只看非空值；必填空值由校验器统一报
//       "Required field is empty"，不进入规则
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// 正则全匹配
    Pattern { regex: Regex, message: &'static str },
    /// 封闭枚举成员（大小写不敏感）
    OneOf {
        values: &'static [&'static str],
        message: &'static str,
    },
    /// 数值闭区间
    Range {
        min: f64,
        max: f64,
        message: &'static str,
    },
}

impl FieldRule {
    pub fn pattern(pattern: &str, message: &'static str) -> Self {
        // 契约表中的模式均为常量，编译失败属构造期程序错误
        FieldRule::Pattern {
            regex: Regex::new(pattern).expect("契约正则非法"),
            message,
        }
    }

    pub fn one_of(values: &'static [&'static str], message: &'static str) -> Self {
        FieldRule::OneOf { values, message }
    }

    pub fn range(min: f64, max: f64, message: &'static str) -> Self {
        FieldRule::Range { min, max, message }
    }

    /// 校验非空原始值
    ///
    /// # 返回
    /// - None: 通过
    /// - Some(message): 违规说明
    pub fn check(&self, value: &str) -> Option<String> {
        match self {
            FieldRule::Pattern { regex, message } => {
                if regex.is_match(value) {
                    None
                } else {
                    Some((*message).to_string())
                }
            }
            FieldRule::OneOf { values, message } => {
                let lower = value.to_lowercase();
                if values.iter().any(|v| *v == lower) {
                    None
                } else {
                    Some((*message).to_string())
                }
            }
            FieldRule::Range { min, max, message } => match value.parse::<f64>() {
                Ok(n) if n >= *min && n <= *max => None,
                _ => Some((*message).to_string()),
            },
        }
    }
}
