// ==========================================
// POS现场运维系统 - 记录存储 SQLite 实现
// ==========================================
// 口径: 每个批次一个事务；任一行失败整批回滚，
//       向上只返回存储的一条错误信息（粒度取舍见 DESIGN.md）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::record::TransformedRecord;
use crate::domain::types::{EntityType, ReferenceType};
use crate::repository::error::{StoreError, StoreResult};
use crate::repository::record_store::RecordStore;
use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteRecordStore
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// 打开数据库并创建存储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 测试注入用: 复用已有连接
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }
}

/// serde_json::Value → SQLite 值
fn to_sql_value(value: &serde_json::Value) -> SqlValue {
    match value {
        serde_json::Value::String(s) => SqlValue::Text(s.clone()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else {
                SqlValue::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::Bool(b) => SqlValue::Integer(*b as i64),
        serde_json::Value::Null => SqlValue::Null,
        // 复合值按 JSON 文本落库
        other => SqlValue::Text(other.to_string()),
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find_existing(
        &self,
        entity: EntityType,
        key_field: &str,
    ) -> StoreResult<HashSet<String>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT \"{}\" FROM \"{}\" WHERE \"{}\" IS NOT NULL",
            key_field,
            entity.table_name(),
            key_field
        );
        let mut stmt = conn.prepare(&sql)?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<String>, _>>()?;
        Ok(keys)
    }

    async fn load_reference(
        &self,
        reference: ReferenceType,
    ) -> StoreResult<HashMap<String, String>> {
        let conn = self.lock()?;
        let sql = match reference {
            ReferenceType::Bank => "SELECT code, id FROM banks",
        };
        let mut stmt = conn.prepare(sql)?;
        let set = stmt
            .query_map([], |row| {
                let code: String = row.get(0)?;
                let id: String = row.get(1)?;
                Ok((code.to_lowercase(), id))
            })?
            .collect::<Result<HashMap<String, String>, _>>()?;
        Ok(set)
    }

    async fn insert_batch(
        &self,
        entity: EntityType,
        records: &[TransformedRecord],
    ) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::BatchInsertError(e.to_string()))?;

        for record in records {
            // 列来自契约字段与查找目标字段，按记录动态组装
            let columns: Vec<&str> = record.fields.keys().map(String::as_str).collect();
            let placeholders: Vec<String> =
                (1..=columns.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "INSERT INTO \"{}\" ({}) VALUES ({})",
                entity.table_name(),
                columns
                    .iter()
                    .map(|c| format!("\"{}\"", c))
                    .collect::<Vec<_>>()
                    .join(", "),
                placeholders.join(", ")
            );

            let params: Vec<SqlValue> = record.fields.values().map(to_sql_value).collect();
            tx.execute(&sql, rusqlite::params_from_iter(params))
                .map_err(|e| StoreError::BatchInsertError(e.to_string()))?;
            // 失败时 tx 随 ? 丢弃 → 整批回滚
        }

        tx.commit()
            .map_err(|e| StoreError::BatchInsertError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn memory_store() -> SqliteRecordStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE banks (id TEXT PRIMARY KEY, code TEXT NOT NULL, name TEXT);
            INSERT INTO banks (id, code, name) VALUES ('bank-1', 'HDFC', 'HDFC Bank');
            INSERT INTO banks (id, code, name) VALUES ('bank-2', 'ICICI', 'ICICI Bank');
            CREATE TABLE devices (
                serial_number TEXT NOT NULL UNIQUE,
                tid TEXT,
                model TEXT NOT NULL,
                brand TEXT,
                status TEXT,
                device_bank TEXT,
                sim_number TEXT,
                firmware_version TEXT
            );
            "#,
        )
        .unwrap();
        SqliteRecordStore::with_connection(conn)
    }

    fn device_record(row: usize, serial: &str) -> TransformedRecord {
        let mut record = TransformedRecord::new(row);
        record.set("serial_number", json!(serial));
        record.set("model", json!("ICT250"));
        record.set("status", json!("warehouse"));
        record
    }

    #[tokio::test]
    async fn test_load_reference_lowercased() {
        let store = memory_store();
        let banks = store.load_reference(ReferenceType::Bank).await.unwrap();
        assert_eq!(banks.get("hdfc"), Some(&"bank-1".to_string()));
        assert_eq!(banks.get("icici"), Some(&"bank-2".to_string()));
    }

    #[tokio::test]
    async fn test_insert_batch_and_find_existing() {
        let store = memory_store();
        let records = vec![device_record(2, "SN001"), device_record(3, "SN002")];

        store
            .insert_batch(EntityType::Device, &records)
            .await
            .unwrap();

        let existing = store
            .find_existing(EntityType::Device, "serial_number")
            .await
            .unwrap();
        assert_eq!(existing.len(), 2);
        assert!(existing.contains("SN001"));
    }

    #[tokio::test]
    async fn test_insert_batch_rolls_back_whole_chunk() {
        let store = memory_store();
        store
            .insert_batch(EntityType::Device, &[device_record(2, "SN001")])
            .await
            .unwrap();

        // 批内第二行违反唯一约束 → 整批回滚
        let batch = vec![device_record(3, "SN100"), device_record(4, "SN001")];
        let err = store.insert_batch(EntityType::Device, &batch).await;
        assert!(matches!(err, Err(StoreError::BatchInsertError(_))));

        let existing = store
            .find_existing(EntityType::Device, "serial_number")
            .await
            .unwrap();
        // SN100 不应落库
        assert!(!existing.contains("SN100"));
        assert_eq!(existing.len(), 1);
    }
}
