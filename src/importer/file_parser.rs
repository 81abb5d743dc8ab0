// ==========================================
// POS现场运维系统 - 文件解析器实现
// ==========================================
// 支持: UTF-8 逗号分隔文本，首行表头必须存在
// 口径: RFC4180 分词（引号字段/转义引号/引号内换行），
//       不做裸逗号切分
// ==========================================

use crate::domain::record::RawRow;
use crate::importer::error::{ImportError, ImportPipelineResult};
use csv::ReaderBuilder;
use std::collections::HashMap;

// ==========================================
// ParsedFile - 解析产物
// ==========================================
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub headers: Vec<String>, // 表头列名（已 trim，保持源顺序）
    pub rows: Vec<RawRow>,    // 数据行（行号从 2 起）
}

// ==========================================
// FileParser - CSV 解析器
// ==========================================
pub struct FileParser;

impl FileParser {
    /// 解析 CSV 文本为表头 + 原始行序列
    ///
    /// # 口径
    /// - 行 1 为表头；数据行号从 2 起（与电子表格一致）
    /// - 尾部空白行跳过
    /// - 行长不一致: 缺失的尾列按空串处理
    /// - 每个单元格 trim 前后空白
    ///
    /// # 返回
    /// - Ok(ParsedFile)
    /// - Err(EmptyHeader): 表头缺失/为空，会话不得前进
    pub fn parse(&self, content: &str) -> ImportPipelineResult<ParsedFile> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(content.as_bytes());

        // 读取表头
        let headers: Vec<String> = reader
            .headers()
            .map_err(|_| ImportError::EmptyHeader)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::EmptyHeader);
        }

        // 读取所有数据行
        // 行号取记录在源文件中的起始行（csv 会静默跳过全空行，
        // 枚举下标会漂移，不能用作行号）
        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);

            let mut values = HashMap::new();
            for (col_idx, header) in headers.iter().enumerate() {
                // 缺失的尾列按空串处理
                let value = record.get(col_idx).unwrap_or("").trim().to_string();
                values.insert(header.clone(), value);
            }

            // 跳过完全空白的行
            if values.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow { row_number, values });
        }

        Ok(ParsedFile { headers, rows })
    }
}
