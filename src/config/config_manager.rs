// ==========================================
// POS现场运维系统 - 配置管理器实现
// ==========================================
// 职责: 从 config_kv 表读取导入配置，缺失键回落默认值
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ===== 默认值 =====
const DEFAULT_BATCH_SIZE: usize = 50;
const DEFAULT_SKIP_DUPLICATES: bool = true;
const DEFAULT_ERROR_DISPLAY_CAP: usize = 50;
const DEFAULT_MAX_IMPORT_ROWS: usize = 1_000;

pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建配置管理器
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
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

    /// 读取单个配置键（表/键缺失都返回 None）
    fn read_key(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("数据库锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional();

        match value {
            Ok(v) => Ok(v),
            // config_kv 表不存在视为未配置
            Err(rusqlite::Error::SqliteFailure(_, Some(msg))) if msg.contains("no such table") => {
                Ok(None)
            }
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取并解析，失败回落默认值
    fn read_parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>> {
        match self.read_key(key)? {
            None => Ok(default),
            Some(raw) => match raw.parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key = key, value = %raw, "配置值格式非法，回落默认值");
                    Ok(default)
                }
            },
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_batch_size(&self) -> Result<usize, Box<dyn Error>> {
        let v = self.read_parsed("import.batch_size", DEFAULT_BATCH_SIZE)?;
        Ok(v.max(1))
    }

    async fn get_skip_duplicates(&self) -> Result<bool, Box<dyn Error>> {
        self.read_parsed("import.skip_duplicates", DEFAULT_SKIP_DUPLICATES)
    }

    async fn get_error_display_cap(&self) -> Result<usize, Box<dyn Error>> {
        self.read_parsed("import.error_display_cap", DEFAULT_ERROR_DISPLAY_CAP)
    }

    async fn get_max_import_rows(&self) -> Result<usize, Box<dyn Error>> {
        self.read_parsed("import.max_import_rows", DEFAULT_MAX_IMPORT_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::import_config_trait::load_session_settings;

    fn manager_with_kv(pairs: &[(&str, &str)]) -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE config_kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        )
        .unwrap();
        for (k, v) in pairs {
            conn.execute("INSERT INTO config_kv (key, value) VALUES (?1, ?2)", [k, v])
                .unwrap();
        }
        ConfigManager::with_connection(conn)
    }

    #[tokio::test]
    async fn test_defaults_when_missing() {
        let manager = manager_with_kv(&[]);
        assert_eq!(manager.get_batch_size().await.unwrap(), 50);
        assert!(manager.get_skip_duplicates().await.unwrap());
        assert_eq!(manager.get_error_display_cap().await.unwrap(), 50);
        assert_eq!(manager.get_max_import_rows().await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_configured_values() {
        let manager = manager_with_kv(&[
            ("import.batch_size", "25"),
            ("import.skip_duplicates", "false"),
        ]);
        assert_eq!(manager.get_batch_size().await.unwrap(), 25);
        assert!(!manager.get_skip_duplicates().await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_value_falls_back() {
        let manager = manager_with_kv(&[("import.batch_size", "not-a-number")]);
        assert_eq!(manager.get_batch_size().await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_missing_table_falls_back() {
        let conn = Connection::open_in_memory().unwrap();
        let manager = ConfigManager::with_connection(conn);
        assert_eq!(manager.get_batch_size().await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_load_session_settings() {
        let manager = manager_with_kv(&[("import.batch_size", "10")]);
        let settings = load_session_settings(&manager).await.unwrap();
        assert_eq!(settings.batch_size, 10);
        assert!(settings.skip_duplicates);
    }
}
