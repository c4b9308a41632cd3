//! Ingestion pipeline integration tests: staging, hashing, relocation,
//! in-place encryption, and the failure modes of each stage.

mod helpers;

use central_core::{sha256_hex, AppError};
use central_storage::{keys, Storage};
use chrono::{Duration, Utc};
use helpers::harness;
use std::sync::atomic::Ordering;

const DUMP: &[u8] = b"-- MySQL dump 10.13\nCREATE TABLE students (id INT);\n";

#[tokio::test]
async fn test_ingest_happy_path() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");

    let record = h
        .ingest
        .ingest(&tenant, "dump.sql", DUMP.to_vec(), Some("weekly".to_string()))
        .await
        .unwrap();

    assert_eq!(record.tenant_id, tenant.id);
    assert_eq!(record.original_filename, "dump.sql");
    assert_eq!(record.remarks.as_deref(), Some("weekly"));
    assert!(record.is_encrypted);
    assert!(record.storage_key.starts_with("COL/"));
    assert!(record.storage_key.ends_with("_dump.sql.enc"));

    // Size and checksum describe the plaintext even though the object on
    // disk is encrypted.
    assert_eq!(record.file_size, DUMP.len() as i64);
    assert_eq!(record.checksum, sha256_hex(DUMP));

    // The stored object is ciphertext, and the plaintext key is gone.
    let stored = h.storage.read(&record.storage_key).await.unwrap();
    assert_ne!(stored, DUMP);
    let plaintext_key = keys::strip_encrypted_suffix(&record.storage_key);
    assert!(!h.storage.exists(plaintext_key).await.unwrap());

    // The persisted record matches what the caller got back.
    let persisted = h.store.all().pop().unwrap();
    assert_eq!(persisted.storage_key, record.storage_key);
    assert!(persisted.is_encrypted);
}

#[tokio::test]
async fn test_ingest_rejects_empty_body() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");

    let err = h
        .ingest
        .ingest(&tenant, "dump.sql", Vec::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(h.store.all().is_empty());
}

#[tokio::test]
async fn test_ingest_rejects_traversal_filename() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");

    let err = h
        .ingest
        .ingest(&tenant, "..", DUMP.to_vec(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_encryption_failure_leaves_valid_plaintext_backup() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");
    h.storage.fail_encrypted_writes.store(true, Ordering::SeqCst);

    let record = h
        .ingest
        .ingest(&tenant, "dump.sql", DUMP.to_vec(), None)
        .await
        .unwrap();

    // Ingest still succeeds; the backup just is not encrypted at rest.
    assert!(!record.is_encrypted);
    assert!(record.storage_key.ends_with("_dump.sql"));
    assert_eq!(record.checksum, sha256_hex(DUMP));
    assert_eq!(h.storage.read(&record.storage_key).await.unwrap(), DUMP);

    let persisted = h.store.all().pop().unwrap();
    assert!(!persisted.is_encrypted);
    assert_eq!(persisted.storage_key, record.storage_key);
}

#[tokio::test]
async fn test_relocation_failure_keeps_record_at_temp_key() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");
    h.storage.fail_copy.store(true, Ordering::SeqCst);

    let err = h
        .ingest
        .ingest(&tenant, "dump.sql", DUMP.to_vec(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));

    // The record exists, points at the staged object, and the bytes are
    // intact there.
    let persisted = h.store.all().pop().unwrap();
    assert!(persisted.storage_key.starts_with("tmp/"));
    assert!(!persisted.is_encrypted);
    assert_eq!(h.storage.read(&persisted.storage_key).await.unwrap(), DUMP);
}

#[tokio::test]
async fn test_same_second_collision_falls_back_to_id_key() {
    let h = harness().await;
    let tenant = helpers::test_tenant("COL");

    // Occupy the timestamp-derived key for a window around now so the
    // upload is guaranteed to collide whichever second it lands on.
    let now = Utc::now();
    for offset in -1..=3 {
        let at = now + Duration::seconds(offset);
        let key = keys::backup_key(&tenant.code, at, "dump.sql");
        h.storage.write(&key, b"occupied".to_vec()).await.unwrap();
    }

    let record = h
        .ingest
        .ingest(&tenant, "dump.sql", DUMP.to_vec(), None)
        .await
        .unwrap();

    assert!(record.storage_key.contains(&record.id.to_string()));
    assert!(record.storage_key.ends_with("_dump.sql.enc"));

    // The occupied keys were not overwritten.
    let occupied = keys::backup_key(&tenant.code, record.uploaded_at, "dump.sql");
    assert_eq!(h.storage.read(&occupied).await.unwrap(), b"occupied");
}
