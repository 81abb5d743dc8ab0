// ==========================================
// POS现场运维系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 实现者: ConfigManager（从 config_kv 表读取）
// ==========================================

use crate::importer::session::SessionSettings;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取批次大小
    ///
    /// # 默认值
    /// - 50
    async fn get_batch_size(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取重复键处理口径
    ///
    /// # 返回
    /// - true: 跳过并单独计数（默认）
    /// - false: 按校验错误处理
    async fn get_skip_duplicates(&self) -> Result<bool, Box<dyn Error>>;

    /// 获取错误表展示上限（超出部分只展示剩余条数）
    ///
    /// # 默认值
    /// - 50
    async fn get_error_display_cap(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取单次导入行数上限
    ///
    /// # 默认值
    /// - 1000
    async fn get_max_import_rows(&self) -> Result<usize, Box<dyn Error>>;
}

/// 从配置读取器组装会话参数快照
pub async fn load_session_settings(
    config: &dyn ImportConfigReader,
) -> Result<SessionSettings, Box<dyn Error>> {
    Ok(SessionSettings {
        batch_size: config.get_batch_size().await?,
        skip_duplicates: config.get_skip_duplicates().await?,
        error_display_cap: config.get_error_display_cap().await?,
        max_import_rows: config.get_max_import_rows().await?,
    })
}
