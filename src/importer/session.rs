// ==========================================
// POS现场运维系统 - 导入会话（阶段机 + 编排）
// ==========================================
// 阶段: select-type → upload → map → validate → preview → commit → complete
// 红线: 转换合法性由 ImportStage 邻接表集中裁决；
//       back 只回退一格并丢弃其后阶段的全部产物
// 流程: 解析 → 自动映射 → (人工确认) → 校验/查找/去重 → 转换
//       → 分批提交 → 结果归档
// ==========================================

use crate::domain::record::{
    ColumnMapping, ImportResult, RawRow, TransformedRecord, ValidationError,
};
use crate::domain::types::{EntityType, ImportStage};
use crate::importer::batch_committer::{BatchCommitter, DEFAULT_BATCH_SIZE};
use crate::importer::column_mapper::ColumnMapper;
use crate::importer::duplicate_checker::DuplicateChecker;
use crate::importer::error::{ImportError, ImportPipelineResult};
use crate::importer::file_parser::{FileParser, ParsedFile};
use crate::importer::lookup_resolver::ResolvedLookups;
use crate::importer::row_transformer::RowTransformer;
use crate::importer::row_validator::RowValidator;
use crate::repository::record_store::RecordStore;
use crate::schema::registry::EntitySchema;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// SessionSettings - 会话参数快照
// ==========================================
// 说明: 会话构造时从配置层取一次快照，运行期间不变
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub batch_size: usize,
    pub skip_duplicates: bool,
    pub error_display_cap: usize,
    pub max_import_rows: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            skip_duplicates: true,
            error_display_cap: 50,
            max_import_rows: 1_000,
        }
    }
}

// ==========================================
// ImportSession
// ==========================================
pub struct ImportSession {
    session_id: String,
    settings: SessionSettings,
    stage: ImportStage,

    // select-type 产物
    entity: Option<EntityType>,
    schema: Option<EntitySchema>,

    // upload 产物
    source_name: Option<String>,
    parsed: Option<ParsedFile>,

    // map 产物
    mapper: Option<ColumnMapper>,

    // validate 产物
    validation_errors: Vec<ValidationError>,
    valid_records: Vec<TransformedRecord>,
    duplicates: Vec<String>,

    // commit 产物
    result: Option<ImportResult>,
    progress: Arc<AtomicU8>,
    cancel: Arc<AtomicBool>,
}

impl ImportSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            settings,
            stage: ImportStage::SelectType,
            entity: None,
            schema: None,
            source_name: None,
            parsed: None,
            mapper: None,
            validation_errors: Vec::new(),
            valid_records: Vec::new(),
            duplicates: Vec::new(),
            result: None,
            progress: Arc::new(AtomicU8::new(0)),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    // ===== 观察接口（UI 消费）=====

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    pub fn entity(&self) -> Option<EntityType> {
        self.entity
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// 提交期间的实时进度（0-100）
    pub fn progress_percent(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    /// 终态结果（仅 complete 阶段可得）
    pub fn result(&self) -> Option<&ImportResult> {
        self.result.as_ref()
    }

    pub fn total_rows(&self) -> usize {
        self.parsed.as_ref().map(|p| p.rows.len()).unwrap_or(0)
    }

    pub fn valid_row_count(&self) -> usize {
        self.valid_records.len()
    }

    pub fn validation_error_count(&self) -> usize {
        self.validation_errors.len()
    }

    pub fn duplicate_keys(&self) -> &[String] {
        &self.duplicates
    }

    /// 截断的错误表: (前 cap 条, 其余条数)
    pub fn error_preview(&self) -> (&[ValidationError], usize) {
        let cap = self.settings.error_display_cap;
        let shown = self.validation_errors.len().min(cap);
        (
            &self.validation_errors[..shown],
            self.validation_errors.len() - shown,
        )
    }

    // ===== 阶段转换 =====

    /// 集中裁决前向转换（唯一改写 stage 的入口）
    fn advance(&mut self, to: ImportStage) -> ImportPipelineResult<()> {
        if !self.stage.can_advance_to(to) {
            return Err(ImportError::StageTransition {
                from: self.stage,
                to,
            });
        }
        debug!(session = %self.session_id, from = %self.stage, to = %to, "阶段转换");
        self.stage = to;
        Ok(())
    }

    /// 选择导入实体类型（select-type → upload）
    pub fn select_entity(&mut self, entity: EntityType) -> ImportPipelineResult<()> {
        self.advance(ImportStage::Upload)?;
        self.schema = Some(EntitySchema::for_entity(entity));
        self.entity = Some(entity);
        Ok(())
    }

    /// 上传并解析文件（upload → map），同时执行自动列匹配
    pub fn upload(&mut self, content: &str, file_name: &str) -> ImportPipelineResult<()> {
        if self.stage != ImportStage::Upload {
            return Err(ImportError::StageTransition {
                from: self.stage,
                to: ImportStage::Map,
            });
        }

        let parsed = FileParser.parse(content)?;
        if parsed.rows.len() > self.settings.max_import_rows {
            return Err(ImportError::TooManyRows {
                actual: parsed.rows.len(),
                limit: self.settings.max_import_rows,
            });
        }

        let schema = self.schema.as_ref().expect("upload 阶段必有契约");
        let mapper = ColumnMapper::auto_match(schema, &parsed.headers);

        info!(
            session = %self.session_id,
            file = file_name,
            rows = parsed.rows.len(),
            "文件解析完成"
        );

        self.advance(ImportStage::Map)?;
        self.source_name = Some(file_name.to_string());
        self.parsed = Some(parsed);
        self.mapper = Some(mapper);
        Ok(())
    }

    /// 人工覆盖列绑定（map 阶段内，校验开始前）
    pub fn set_mapping(&mut self, field_key: &str, source_column: &str) -> ImportPipelineResult<()> {
        if self.stage != ImportStage::Map {
            return Err(ImportError::StageTransition {
                from: self.stage,
                to: ImportStage::Map,
            });
        }
        self.mapper
            .as_mut()
            .expect("map 阶段必有映射器")
            .set_mapping(field_key, source_column);
        Ok(())
    }

    /// 映射完整性门禁
    pub fn mapping_complete(&self) -> bool {
        self.mapper.as_ref().map(|m| m.complete()).unwrap_or(false)
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        self.mapper.as_ref().map(|m| m.mappings()).unwrap_or(&[])
    }

    /// 校验 + 查找解析 + 去重 + 转换（map → validate → preview）
    ///
    /// # 口径
    /// - validate 是纯计算阶段，执行完即落在 preview，不做停留
    /// - 行内错误全量收集，永不中断后续行
    /// - 重复键按配置跳过（计数）或按校验错误处理
    #[instrument(skip(self, store), fields(session = %self.session_id))]
    pub async fn validate_and_preview(
        &mut self,
        store: &dyn RecordStore,
    ) -> ImportPipelineResult<()> {
        if self.stage != ImportStage::Map {
            return Err(ImportError::StageTransition {
                from: self.stage,
                to: ImportStage::Validate,
            });
        }
        let mapper = self.mapper.as_ref().expect("map 阶段必有映射器");
        if !mapper.complete() {
            return Err(ImportError::MappingIncomplete(
                mapper.unbound_required().join(", "),
            ));
        }

        let schema = self.schema.as_ref().expect("会话必有契约").clone();
        let mappings: Vec<ColumnMapping> = mapper.mappings().to_vec();

        // 会话级参照集与存量键各预载一次（显式注入，不走环境缓存）。
        // 预载失败时会话留在 map，可整体重试
        let mut lookups = ResolvedLookups::new();
        if let Some(binding) = &schema.lookup {
            lookups.preload(store, binding.reference).await?;
        }
        let mut dup_checker =
            DuplicateChecker::preload(store, schema.entity, schema.unique_key).await?;

        self.advance(ImportStage::Validate)?;

        let rows: &[RawRow] = self
            .parsed
            .as_ref()
            .map(|p| p.rows.as_slice())
            .unwrap_or(&[]);

        let validator = RowValidator;
        let transformer = RowTransformer;
        let mut errors: Vec<ValidationError> = Vec::new();
        let mut valid_records = Vec::new();
        let mut duplicates = Vec::new();

        for row in rows {
            // 字段校验（行内不短路）
            let verdict = validator.validate_row(&schema, &mappings, row);
            if !verdict.is_valid() {
                errors.extend(verdict.errors);
                continue;
            }

            // 唯一键去重（大小写不敏感，含同文件内重复）
            let key = mappings
                .iter()
                .find(|m| m.field_key == schema.unique_key)
                .and_then(|m| m.source_column.as_deref())
                .map(|col| row.get(col).trim().to_string())
                .unwrap_or_default();

            if !key.is_empty() && dup_checker.check_and_record(&key) {
                if self.settings.skip_duplicates {
                    duplicates.push(key);
                } else {
                    errors.push(ValidationError {
                        row: row.row_number,
                        column: schema.unique_key_label().to_string(),
                        value: key.clone(),
                        message: format!("Duplicate {}: {}", schema.unique_key_label(), key),
                    });
                }
                continue;
            }

            // 转换（唯一失败路径: 结构性必需查找未解析）
            match transformer.transform(&schema, &mappings, &lookups, row) {
                Ok(record) => valid_records.push(record),
                Err(lookup_error) => errors.push(lookup_error),
            }
        }

        info!(
            total = rows.len(),
            valid = valid_records.len(),
            errors = errors.len(),
            duplicates = duplicates.len(),
            "校验与转换完成"
        );

        self.validation_errors = errors;
        self.valid_records = valid_records;
        self.duplicates = duplicates;
        self.advance(ImportStage::Preview)?;
        Ok(())
    }

    /// 分批提交（preview → commit → complete）
    ///
    /// # 口径
    /// - 批间可观察进度、可协作取消
    /// - 提交一旦开始不可回退，只能跑完或被取消
    #[instrument(skip(self, store), fields(session = %self.session_id))]
    pub async fn commit(&mut self, store: &dyn RecordStore) -> ImportPipelineResult<&ImportResult> {
        self.advance(ImportStage::Commit)?;

        let entity = self.entity.expect("会话必有实体类型");
        // 提交器直接复用会话的进度/取消句柄: UI 在提交期间
        // 通过会话观察进度、发起取消
        let committer = BatchCommitter::with_handles(
            self.settings.batch_size,
            Arc::clone(&self.progress),
            Arc::clone(&self.cancel),
        );

        let mut result = ImportResult {
            duplicates: std::mem::take(&mut self.duplicates),
            ..ImportResult::default()
        };

        // 提交集被恰好消费一次
        let records = std::mem::take(&mut self.valid_records);
        committer.commit(store, entity, &records, &mut result).await;
        result.completed_at = Some(Utc::now());

        self.advance(ImportStage::Complete)?;
        info!(
            success = result.success,
            failed = result.failed,
            duplicates = result.duplicates.len(),
            cancelled = result.cancelled,
            "导入会话完成"
        );
        self.result = Some(result);
        Ok(self.result.as_ref().unwrap())
    }

    /// 请求协作取消（在下一个批间生效）
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// 取消句柄（UI 在 commit 独占会话期间持有）
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// 进度句柄（同上）
    pub fn progress_handle(&self) -> Arc<AtomicU8> {
        Arc::clone(&self.progress)
    }

    /// 回退一格，丢弃其后阶段的产物
    pub fn back(&mut self) -> ImportPipelineResult<()> {
        let Some(target) = self.stage.prev() else {
            return Err(ImportError::StageTransition {
                from: self.stage,
                to: self.stage,
            });
        };

        match target {
            ImportStage::SelectType => {
                // upload → select-type: 丢弃实体与解析产物
                self.entity = None;
                self.schema = None;
                self.discard_upload_artifacts();
            }
            ImportStage::Upload => {
                // map → upload: 丢弃映射与解析行
                self.discard_upload_artifacts();
            }
            ImportStage::Map => {
                // preview → map: 丢弃校验产物
                self.discard_validation_artifacts();
            }
            _ => {}
        }

        debug!(session = %self.session_id, from = %self.stage, to = %target, "阶段回退");
        self.stage = target;
        Ok(())
    }

    /// 重新开始: 清空全部会话数据，回到 select-type
    pub fn reset(&mut self) {
        let settings = self.settings.clone();
        *self = ImportSession::new(settings);
    }

    fn discard_upload_artifacts(&mut self) {
        self.source_name = None;
        self.parsed = None;
        self.mapper = None;
        self.discard_validation_artifacts();
    }

    fn discard_validation_artifacts(&mut self) {
        self.validation_errors.clear();
        self.valid_records.clear();
        self.duplicates.clear();
    }
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}
