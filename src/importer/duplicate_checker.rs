// ==========================================
// POS现场运维系统 - 重复检查器实现
// ==========================================
// 职责: 候选唯一键对已存在键集合的成员测试（大小写不敏感）
// 口径: 存量键每会话预载一次；同文件内的后续重复
//       与存量重复同样处理（见 DESIGN.md 决策 6）
// ==========================================

use crate::repository::error::StoreError;
use crate::repository::record_store::RecordStore;
use crate::domain::types::EntityType;
use std::collections::HashSet;

pub struct DuplicateChecker {
    // 小写化的已存在键（预载存量 + 本批已通过的键）
    seen: HashSet<String>,
}

impl DuplicateChecker {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// 从记录存储预载实体的全部存量唯一键（每会话一次）
    pub async fn preload(
        store: &dyn RecordStore,
        entity: EntityType,
        unique_key: &str,
    ) -> Result<Self, StoreError> {
        let existing = store.find_existing(entity, unique_key).await?;
        Ok(Self::with_existing(existing))
    }

    /// 测试注入用: 以给定存量键集合构造
    pub fn with_existing(existing: HashSet<String>) -> Self {
        Self {
            seen: existing.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// 候选键是否重复（大小写不敏感）
    ///
    /// 非重复的键会进入已见集合，使同文件内的
    /// 第二次及以后出现按重复处理
    pub fn check_and_record(&mut self, key: &str) -> bool {
        !self.seen.insert(key.to_lowercase())
    }
}

impl Default for DuplicateChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_key_is_duplicate() {
        let mut existing = HashSet::new();
        existing.insert("SN1".to_string());
        let mut checker = DuplicateChecker::with_existing(existing);

        assert!(checker.check_and_record("SN1"));
        assert!(checker.check_and_record("sn1")); // 大小写不敏感
        assert!(!checker.check_and_record("SN2"));
    }

    #[test]
    fn test_intra_file_duplicate() {
        let mut checker = DuplicateChecker::new();

        // 首次出现通过，之后按重复处理
        assert!(!checker.check_and_record("SN100"));
        assert!(checker.check_and_record("SN100"));
        assert!(checker.check_and_record("sn100"));
    }
}
