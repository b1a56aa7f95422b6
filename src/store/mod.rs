// Persistence module entry
// Owns the addresses table and every durable record operation

mod sqlite;

pub use sqlite::AddressStore;

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// One persisted address record.
///
/// The serialized shape is the wire shape:
/// `{"id": .., "address": .., "latitude": .., "longitude": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub id: i64,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Errors raised by the persistence layer.
///
/// Every variant maps to an HTTP 500 at the handler boundary; the message
/// becomes the `error` field of the response body.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store connection lock poisoned")]
    Poisoned,
    #[error("storage task failed: {0}")]
    Task(String),
}
