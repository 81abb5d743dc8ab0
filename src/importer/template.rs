// ==========================================
// POS现场运维系统 - 导入模板导出
// ==========================================
// 职责: 生成各实体的模板 CSV（显示名表头 + 一条示例行）
// 说明: 只读便利功能，不属于导入阶段机
// ==========================================

use crate::domain::types::EntityType;
use crate::importer::error::{ImportError, ImportPipelineResult};
use crate::schema::registry::EntitySchema;
use csv::WriterBuilder;

/// 生成实体的导入模板 CSV 文本
///
/// # 往返性质
/// 模板重新上传后每一列都应自动映射成功
/// （表头即字段显示名，规整后与契约 key 相等）
pub fn template_csv(entity: EntityType) -> ImportPipelineResult<String> {
    let schema = EntitySchema::for_entity(entity);

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(schema.fields.iter().map(|f| f.name))?;
    writer.write_record(schema.sample_row.iter().copied())?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::InternalError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ImportError::InternalError(e.to_string()))
}

/// 模板下载文件名
pub fn template_file_name(entity: EntityType) -> String {
    format!("{}-import-template.csv", entity)
}
