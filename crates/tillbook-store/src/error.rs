//! Error types for tillbook-store

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Snapshot is not valid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Import file is empty")]
    Empty,

    #[error("Header row must contain at least: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },
}
