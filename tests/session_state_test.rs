// ==========================================
// POS现场运维系统 - 导入会话阶段机测试
// ==========================================
// 覆盖: 非法跳转拦截、回退丢弃语义、重置、协作取消
// ==========================================

mod test_helpers;

use fieldops_import::domain::types::{EntityType, ImportStage};
use fieldops_import::importer::error::ImportError;
use fieldops_import::importer::session::{ImportSession, SessionSettings};
use fieldops_import::repository::sqlite_store::SqliteRecordStore;

fn setup_store() -> (tempfile::NamedTempFile, SqliteRecordStore) {
    let (temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let store = SqliteRecordStore::new(&db_path).expect("创建存储失败");
    (temp_file, store)
}

const DEVICE_CSV: &str = "Serial Number,Model\nSN001,ICT250\nSN002,ICT220\n";

// ==========================================
// 非法跳转
// ==========================================

#[tokio::test]
async fn test_commit_before_preview_rejected() {
    let (_tmp, store) = setup_store();
    let mut session = ImportSession::new(SessionSettings::default());

    let err = session.commit(&store).await.unwrap_err();
    assert!(matches!(
        err,
        ImportError::StageTransition {
            from: ImportStage::SelectType,
            ..
        }
    ));
}

#[test]
fn test_upload_before_select_rejected() {
    let mut session = ImportSession::new(SessionSettings::default());
    let err = session.upload(DEVICE_CSV, "a.csv").unwrap_err();
    assert!(matches!(err, ImportError::StageTransition { .. }));
}

#[tokio::test]
async fn test_validate_requires_map_stage() {
    let (_tmp, store) = setup_store();
    let mut session = ImportSession::new(SessionSettings::default());
    session.select_entity(EntityType::Device).unwrap();

    // upload 阶段直接触发校验 → 拒绝
    let err = session.validate_and_preview(&store).await.unwrap_err();
    assert!(matches!(err, ImportError::StageTransition { .. }));
}

#[tokio::test]
async fn test_mapping_gate_blocks_validation() {
    let (_tmp, store) = setup_store();
    let mut session = ImportSession::new(SessionSettings::default());
    session.select_entity(EntityType::Device).unwrap();
    // Model 列缺失 → serial_number 可映射但 model 不行
    session
        .upload("Serial Number,Other\nSN001,x\n", "a.csv")
        .unwrap();

    assert!(!session.mapping_complete());
    let err = session.validate_and_preview(&store).await.unwrap_err();
    match err {
        ImportError::MappingIncomplete(fields) => assert!(fields.contains("model")),
        other => panic!("期望 MappingIncomplete，实际 {:?}", other),
    }

    // 人工补绑后门禁放行
    session.set_mapping("model", "Other").unwrap();
    assert!(session.mapping_complete());
    session.validate_and_preview(&store).await.unwrap();
    assert_eq!(session.stage(), ImportStage::Preview);
}

#[test]
fn test_header_missing_keeps_session_at_upload() {
    let mut session = ImportSession::new(SessionSettings::default());
    session.select_entity(EntityType::Device).unwrap();

    let err = session.upload("", "empty.csv").unwrap_err();
    assert!(matches!(err, ImportError::EmptyHeader));
    assert_eq!(session.stage(), ImportStage::Upload);
}

#[test]
fn test_row_limit_enforced_at_upload() {
    let settings = SessionSettings {
        max_import_rows: 2,
        ..SessionSettings::default()
    };
    let mut session = ImportSession::new(settings);
    session.select_entity(EntityType::Device).unwrap();

    let err = session
        .upload("Serial Number,Model\nA,1\nB,2\nC,3\n", "big.csv")
        .unwrap_err();
    assert!(matches!(
        err,
        ImportError::TooManyRows {
            actual: 3,
            limit: 2
        }
    ));
    assert_eq!(session.stage(), ImportStage::Upload);
}

// ==========================================
// 回退与重置
// ==========================================

#[tokio::test]
async fn test_back_from_preview_discards_validation() {
    let (_tmp, store) = setup_store();
    let mut session = ImportSession::new(SessionSettings::default());
    session.select_entity(EntityType::Device).unwrap();
    session.upload(DEVICE_CSV, "a.csv").unwrap();
    session.validate_and_preview(&store).await.unwrap();
    assert_eq!(session.valid_row_count(), 2);

    session.back().unwrap();

    assert_eq!(session.stage(), ImportStage::Map);
    // 校验产物已丢弃，解析与映射保留
    assert_eq!(session.valid_row_count(), 0);
    assert_eq!(session.validation_error_count(), 0);
    assert_eq!(session.total_rows(), 2);
    assert!(session.mapping_complete());

    // 可重新触发校验
    session.validate_and_preview(&store).await.unwrap();
    assert_eq!(session.valid_row_count(), 2);
}

#[test]
fn test_back_from_map_discards_parse() {
    let mut session = ImportSession::new(SessionSettings::default());
    session.select_entity(EntityType::Device).unwrap();
    session.upload(DEVICE_CSV, "a.csv").unwrap();

    session.back().unwrap();

    assert_eq!(session.stage(), ImportStage::Upload);
    assert_eq!(session.total_rows(), 0);
    assert!(session.source_name().is_none());
    // 实体类型保留
    assert_eq!(session.entity(), Some(EntityType::Device));
}

#[test]
fn test_back_from_upload_clears_entity() {
    let mut session = ImportSession::new(SessionSettings::default());
    session.select_entity(EntityType::Merchant).unwrap();

    session.back().unwrap();

    assert_eq!(session.stage(), ImportStage::SelectType);
    assert_eq!(session.entity(), None);
}

#[test]
fn test_back_at_start_rejected() {
    let mut session = ImportSession::new(SessionSettings::default());
    assert!(session.back().is_err());
}

#[tokio::test]
async fn test_complete_is_terminal_and_reset_starts_over() {
    let (_tmp, store) = setup_store();
    let mut session = ImportSession::new(SessionSettings::default());
    session.select_entity(EntityType::Device).unwrap();
    session.upload(DEVICE_CSV, "a.csv").unwrap();
    session.validate_and_preview(&store).await.unwrap();
    session.commit(&store).await.unwrap();

    assert_eq!(session.stage(), ImportStage::Complete);
    assert!(session.result().is_some());
    // 终态不可回退、不可再次提交
    assert!(session.back().is_err());
    assert!(session.commit(&store).await.is_err());

    session.reset();
    assert_eq!(session.stage(), ImportStage::SelectType);
    assert!(session.result().is_none());
    assert_eq!(session.total_rows(), 0);
}

// ==========================================
// 协作取消
// ==========================================

#[tokio::test]
async fn test_cancel_before_commit_stops_at_first_gap() {
    let (_tmp, store) = setup_store();
    let mut session = ImportSession::new(SessionSettings {
        batch_size: 1,
        ..SessionSettings::default()
    });
    session.select_entity(EntityType::Device).unwrap();
    session.upload(DEVICE_CSV, "a.csv").unwrap();
    session.validate_and_preview(&store).await.unwrap();

    session.request_cancel();
    let result = session.commit(&store).await.unwrap();

    assert!(result.cancelled);
    assert_eq!(result.success, 0);
    // 取消后的会话仍然归档为 complete（结果带取消标记）
    assert_eq!(session.stage(), ImportStage::Complete);
}
