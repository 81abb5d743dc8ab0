// ==========================================
// POS现场运维系统 - 查找解析器实现
// ==========================================
// 职责: 人类可读短码 → 内部标识（会话内一次性预载）
// 红线: 参照集是显式注入的会话级值，不落在模块级可变缓存，
//       会话之间不可能观察到陈旧/串话的数据
// ==========================================

use crate::domain::types::ReferenceType;
use crate::repository::record_store::RecordStore;
use crate::repository::error::StoreError;
use std::collections::HashMap;

// ==========================================
// ResolvedLookups - 会话级参照集
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ResolvedLookups {
    // 参照类型 → (小写短码 → 内部标识)
    sets: HashMap<ReferenceType, HashMap<String, String>>,
}

impl ResolvedLookups {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从记录存储预载一个参照集（每会话一次，转换开始之前）
    pub async fn preload(
        &mut self,
        store: &dyn RecordStore,
        reference: ReferenceType,
    ) -> Result<(), StoreError> {
        let set = store.load_reference(reference).await?;
        self.sets.insert(reference, set);
        Ok(())
    }

    /// 测试注入用: 直接放入参照集
    pub fn insert_set(&mut self, reference: ReferenceType, set: HashMap<String, String>) {
        self.sets.insert(reference, set);
    }

    /// 解析短码（大小写不敏感精确匹配）
    ///
    /// # 返回
    /// - Some(id): 命中
    /// - None: 码不存在或参照集未预载
    pub fn resolve(&self, reference: ReferenceType, code: &str) -> Option<&str> {
        self.sets
            .get(&reference)?
            .get(&code.to_lowercase())
            .map(String::as_str)
    }
}
