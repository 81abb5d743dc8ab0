// ==========================================
// POS现场运维系统 - 导入 API
// ==========================================
// 职责: 一次性服务端导入（解析 → 自动映射 → 校验 →
//       查找/去重 → 转换 → 分批提交）与模板下载
// 说明: 交互式分步流程由调用方直接驱动 ImportSession；
//       本接口面向无人工确认环节的服务端批量入口
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{load_session_settings, ConfigManager, ImportConfigReader};
use crate::domain::record::{RowError, ValidationError};
use crate::domain::types::EntityType;
use crate::importer::session::ImportSession;
use crate::importer::template::{template_csv, template_file_name};
use crate::repository::sqlite_store::SqliteRecordStore;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// 导入 API 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 会话 ID（批次追溯用）
    pub session_id: String,
    /// 源文件总行数
    pub total_rows: usize,
    /// 通过校验进入提交的行数
    pub valid_rows: usize,
    /// 成功落库行数
    pub imported: usize,
    /// 批次失败行数
    pub failed: usize,
    /// 跳过的重复键
    pub duplicates: Vec<String>,
    /// 校验错误明细（截断后）
    pub validation_errors: Vec<ValidationError>,
    /// 截断掉的校验错误条数
    pub more_errors: usize,
    /// 批次级错误
    pub batch_errors: Vec<RowError>,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 模板下载产物
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateFile {
    pub file_name: String,
    pub content: String,
}

/// 导入 API
pub struct ImportApi {
    store: SqliteRecordStore,
    config: ConfigManager,
}

impl ImportApi {
    /// 创建 ImportApi 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let store = SqliteRecordStore::new(db_path)?;
        let config =
            ConfigManager::new(db_path).map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(Self { store, config })
    }

    /// 测试注入用: 直接给定存储与配置
    pub fn with_parts(store: SqliteRecordStore, config: ConfigManager) -> Self {
        Self { store, config }
    }

    /// 一次性导入文件内容
    ///
    /// # 参数
    /// - entity: 实体类型
    /// - content: CSV 文本
    /// - file_name: 源文件名（日志与追溯）
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 汇总统计 + 截断错误表
    /// - Err(ApiError): 解析失败/映射不完整/数据库错误
    pub async fn import_file(
        &self,
        entity: EntityType,
        content: &str,
        file_name: &str,
    ) -> ApiResult<ImportApiResponse> {
        let started = Instant::now();

        let settings = load_session_settings(&self.config)
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let mut session = ImportSession::new(settings);
        session.select_entity(entity)?;
        session.upload(content, file_name)?;

        // 服务端入口没有人工改绑环节: 自动映射必须一次完整
        session.validate_and_preview(&self.store).await?;

        let total_rows = session.total_rows();
        let valid_rows = session.valid_row_count();
        let (shown, more_errors) = session.error_preview();
        let validation_errors = shown.to_vec();

        let result = session.commit(&self.store).await?.clone();

        let elapsed_ms = started.elapsed().as_millis() as i64;
        info!(
            entity = %entity,
            file = file_name,
            imported = result.success,
            failed = result.failed,
            duplicates = result.duplicates.len(),
            elapsed_ms,
            "文件导入完成"
        );

        Ok(ImportApiResponse {
            session_id: session.session_id().to_string(),
            total_rows,
            valid_rows,
            imported: result.success,
            failed: result.failed,
            duplicates: result.duplicates,
            validation_errors,
            more_errors,
            batch_errors: result.errors,
            elapsed_ms,
        })
    }

    /// 下载实体导入模板
    pub fn download_template(&self, entity: EntityType) -> ApiResult<TemplateFile> {
        Ok(TemplateFile {
            file_name: template_file_name(entity),
            content: template_csv(entity)?,
        })
    }

    /// 当前生效的导入配置（调试/诊断用）
    pub async fn effective_batch_size(&self) -> ApiResult<usize> {
        self.config
            .get_batch_size()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }
}
