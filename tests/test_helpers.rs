// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use rusqlite::Connection;
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 初始化数据库 schema
fn init_schema(conn: &Connection) -> Result<(), Box<dyn Error>> {
    // 创建 config_kv 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    // 创建 banks 参照表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS banks (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT
        )
        "#,
        [],
    )?;

    // 创建 devices 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS devices (
            serial_number TEXT NOT NULL UNIQUE,
            tid TEXT,
            model TEXT NOT NULL,
            brand TEXT,
            status TEXT NOT NULL DEFAULT 'warehouse',
            device_bank TEXT REFERENCES banks(id),
            sim_number TEXT,
            firmware_version TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    // 创建 service_calls 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS service_calls (
            call_number TEXT NOT NULL UNIQUE,
            type TEXT NOT NULL,
            priority TEXT,
            status TEXT,
            client_name TEXT NOT NULL,
            client_phone TEXT,
            client_address TEXT,
            client_city TEXT,
            client_state TEXT,
            client_pincode TEXT,
            mid TEXT,
            tid TEXT,
            client_bank TEXT REFERENCES banks(id),
            remarks TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    // 创建 engineers 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS engineers (
            employee_id TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            city TEXT,
            state TEXT,
            region TEXT,
            role TEXT NOT NULL DEFAULT 'engineer',
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    // 创建 merchants 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS merchants (
            name TEXT NOT NULL,
            mid TEXT NOT NULL UNIQUE,
            phone TEXT,
            email TEXT,
            address TEXT,
            city TEXT NOT NULL,
            state TEXT,
            pincode TEXT,
            latitude REAL,
            longitude REAL,
            bank_id TEXT REFERENCES banks(id),
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    // 预置银行参照数据
    conn.execute_batch(
        r#"
        INSERT OR IGNORE INTO banks (id, code, name) VALUES ('bank-hdfc', 'HDFC', 'HDFC Bank');
        INSERT OR IGNORE INTO banks (id, code, name) VALUES ('bank-icici', 'ICICI', 'ICICI Bank');
        INSERT OR IGNORE INTO banks (id, code, name) VALUES ('bank-axis', 'AXIS', 'Axis Bank');
        INSERT OR IGNORE INTO banks (id, code, name) VALUES ('bank-sbi', 'SBI', 'State Bank of India');
        "#,
    )?;

    Ok(())
}

/// 写入配置键
#[allow(dead_code)]
pub fn set_config(db_path: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

/// 统计表行数
#[allow(dead_code)]
pub fn count_rows(db_path: &str, table: &str) -> Result<i64, Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    let count =
        conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| {
            row.get(0)
        })?;
    Ok(count)
}

/// 生成 N 行合法设备 CSV（含表头）
#[allow(dead_code)]
pub fn device_csv(rows: usize) -> String {
    let mut csv = String::from("Serial Number,Model,Status,Bank Code\n");
    for i in 0..rows {
        csv.push_str(&format!("SN{:05},ICT250,warehouse,HDFC\n", i));
    }
    csv
}
