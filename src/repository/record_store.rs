// ==========================================
// POS现场运维系统 - 记录存储 Trait
// ==========================================
// 职责: 定义导入管道消费的存储接口（不包含实现）
// 实现者: SqliteRecordStore（rusqlite）；测试中可用内存桩
// ==========================================

use crate::domain::record::TransformedRecord;
use crate::domain::types::{EntityType, ReferenceType};
use crate::repository::error::StoreResult;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

// ==========================================
// RecordStore Trait
// ==========================================
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 读取实体已存在的全部唯一键值
    ///
    /// # 参数
    /// - entity: 实体类型
    /// - key_field: 唯一键字段名
    ///
    /// # 返回
    /// - Ok(HashSet<String>): 存量键集合（原样大小写）
    async fn find_existing(
        &self,
        entity: EntityType,
        key_field: &str,
    ) -> StoreResult<HashSet<String>>;

    /// 读取参照集（短码 → 内部标识）
    ///
    /// # 返回
    /// - Ok(HashMap): 键为小写短码
    async fn load_reference(
        &self,
        reference: ReferenceType,
    ) -> StoreResult<HashMap<String, String>>;

    /// 单批次批量插入（整批一个事务）
    ///
    /// # 返回
    /// - Ok(()): 整批落库
    /// - Err(BatchInsertError): 整批回滚，携带存储的一条错误信息
    async fn insert_batch(
        &self,
        entity: EntityType,
        records: &[TransformedRecord],
    ) -> StoreResult<()>;
}
