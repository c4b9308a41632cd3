//! Retrieval integration tests: single fetch, date-filtered zip bundles,
//! and the admin delete.

mod helpers;

use central_core::models::BackupRecord;
use central_core::{sha256_hex, AppError};
use central_db::DateRange;
use central_storage::{keys, Storage};
use chrono::{NaiveDate, TimeZone, Utc};
use helpers::harness;
use std::io::Read;
use std::sync::atomic::Ordering;
use uuid::Uuid;

const DUMP: &[u8] = b"-- MySQL dump 10.13\nCREATE TABLE students (id INT);\n";

#[tokio::test]
async fn test_ingest_then_fetch_one_round_trip() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");

    let record = h
        .ingest
        .ingest(&tenant, "dump.sql", DUMP.to_vec(), None)
        .await
        .unwrap();
    assert!(record.is_encrypted);

    let fetched = h.retrieval.fetch_one(record.id).await.unwrap();
    assert_eq!(fetched.data, DUMP);
    assert_eq!(fetched.filename, "dump.sql");
}

#[tokio::test]
async fn test_fetch_one_unknown_id_is_not_found() {
    let h = harness().await;
    let err = h.retrieval.fetch_one(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_fetch_one_missing_object_is_not_found() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");

    // Record whose object was never written.
    let record = BackupRecord {
        id: Uuid::new_v4(),
        tenant_id: tenant.id,
        storage_key: "COL/2026-01-01_00-00-00_gone.sql".to_string(),
        original_filename: "gone.sql".to_string(),
        file_size: 4,
        checksum: sha256_hex(b"gone"),
        is_encrypted: false,
        remarks: None,
        uploaded_at: Utc::now(),
    };
    h.store.insert(record.clone());

    let err = h.retrieval.fetch_one(record.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_empty_bundle_is_not_found() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");

    let err = h
        .retrieval
        .fetch_bundle(&tenant, DateRange::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_bundle_contains_plaintext_only() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");

    let uploads: [(&str, &[u8]); 2] = [
        ("monday.sql", b"monday bytes"),
        ("tuesday.sql", b"tuesday bytes"),
    ];
    for (name, data) in uploads {
        let record = h
            .ingest
            .ingest(&tenant, name, data.to_vec(), None)
            .await
            .unwrap();
        assert!(record.is_encrypted);
    }

    // Third member could not be encrypted and sits in plaintext.
    h.storage.fail_encrypted_writes.store(true, Ordering::SeqCst);
    let plain = h
        .ingest
        .ingest(&tenant, "wednesday.sql", b"wednesday bytes".to_vec(), None)
        .await
        .unwrap();
    assert!(!plain.is_encrypted);

    let buffer = h
        .retrieval
        .fetch_bundle(&tenant, DateRange::default())
        .await
        .unwrap();

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(buffer)).unwrap();
    assert_eq!(archive.len(), 3);

    let expected: [(&str, &[u8]); 3] = [
        ("COL/monday.sql", b"monday bytes"),
        ("COL/tuesday.sql", b"tuesday bytes"),
        ("COL/wednesday.sql", b"wednesday bytes"),
    ];
    for (entry_name, data) in expected {
        let mut entry = archive.by_name(entry_name).unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, data);
    }
}

#[tokio::test]
async fn test_bundle_date_filter_is_inclusive() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");

    // Three records on distinct days, objects written directly so the
    // upload timestamps can be controlled.
    for day in [10, 15, 20] {
        let uploaded_at = Utc.with_ymd_and_hms(2026, 6, day, 12, 0, 0).unwrap();
        let filename = format!("day{}.sql", day);
        let key = keys::backup_key(&tenant.code, uploaded_at, &filename);
        let data = format!("dump for day {}", day).into_bytes();
        h.storage.write(&key, data.clone()).await.unwrap();
        h.store.insert(BackupRecord {
            id: Uuid::new_v4(),
            tenant_id: tenant.id,
            storage_key: key,
            original_filename: filename,
            file_size: data.len() as i64,
            checksum: sha256_hex(&data),
            is_encrypted: false,
            remarks: None,
            uploaded_at,
        });
    }

    let range = DateRange {
        start: Some(NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()),
        end: Some(NaiveDate::from_ymd_opt(2026, 6, 20).unwrap()),
    };
    let buffer = h.retrieval.fetch_bundle(&tenant, range).await.unwrap();

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(buffer)).unwrap();
    assert_eq!(archive.len(), 2);
    assert!(archive.by_name("COL/day15.sql").is_ok());
    assert!(archive.by_name("COL/day20.sql").is_ok());
}

#[tokio::test]
async fn test_delete_backup_removes_record_and_object() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");

    let record = h
        .ingest
        .ingest(&tenant, "dump.sql", DUMP.to_vec(), None)
        .await
        .unwrap();

    let deleted = h.retrieval.delete_backup(record.id).await.unwrap();
    assert_eq!(deleted.id, record.id);
    assert!(!h.storage.exists(&record.storage_key).await.unwrap());
    assert!(h.store.all().is_empty());

    let err = h.retrieval.delete_backup(record.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_end_to_end_layout_scenario() {
    let h = harness().await;
    let tenant = helpers::test_tenant("ABC");

    let data = b"0123456789".to_vec();
    let record = h
        .ingest
        .ingest(&tenant, "dump.sql", data.clone(), None)
        .await
        .unwrap();

    assert_eq!(record.file_size, 10);
    assert_eq!(record.checksum.len(), 64);
    assert!(record.checksum.chars().all(|c| c.is_ascii_hexdigit()));

    // Key layout: ABC/{YYYY-MM-DD_HH-MM-SS}_dump.sql.enc
    let rest = record.storage_key.strip_prefix("ABC/").unwrap();
    let timestamp = rest.strip_suffix("_dump.sql.enc").unwrap();
    assert_eq!(timestamp.len(), "2026-03-14_09-26-53".len());

    let fetched = h.retrieval.fetch_one(record.id).await.unwrap();
    assert_eq!(fetched.data, data);
    assert_eq!(fetched.filename, "dump.sql");
}
