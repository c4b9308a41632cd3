//! Central Services Library
//!
//! Business services over the storage and database layers: the ingestion
//! pipeline that stages, hashes, persists, relocates, and encrypts an
//! uploaded backup, and the retrieval service that hands backups back out
//! (individually or as a date-filtered zip bundle), decrypting on the way.

pub mod ingest;
pub mod retrieval;

pub use ingest::IngestService;
pub use retrieval::{FetchedBackup, RetrievalService};
