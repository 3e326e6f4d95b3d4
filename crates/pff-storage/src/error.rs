//! Error types for archive storage operations

use pff_formats::PffError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading, extracting, or packing archives
#[derive(Error, Debug)]
pub enum StorageError {
    /// Archive-format level failure
    #[error("format error: {0}")]
    Format(#[from] PffError),

    /// An arena handle from a previous load generation was resolved
    #[error(
        "stale arena handle: generation {handle_generation}, \
         arena is at generation {current_generation}"
    )]
    StaleHandle {
        /// Generation the handle was allocated in
        handle_generation: u64,
        /// Current arena generation
        current_generation: u64,
    },

    /// The arena's capacity cap was exceeded
    #[error("arena exhausted: requested {requested} bytes, {available} available")]
    ArenaExhausted {
        /// Bytes the allocation asked for
        requested: usize,
        /// Bytes left under the cap
        available: usize,
    },

    /// Table accessor called with an out-of-range index
    #[error("{table} index {index} out of bounds ({len} entries)")]
    IndexOutOfBounds {
        /// Table name
        table: &'static str,
        /// Requested index
        index: usize,
        /// Table length
        len: usize,
    },

    /// A file referenced by the pack manifest cannot be opened
    #[error("source asset missing: {0}")]
    SourceAssetMissing(PathBuf),

    /// Writing an output file failed
    #[error("failed to write {path}: {source}")]
    WriteIo {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The pack manifest is structurally valid JSON but semantically wrong
    #[error("invalid manifest: {0}")]
    BadManifest(String),

    /// The pack manifest is not valid JSON
    #[error("manifest parse error: {0}")]
    ManifestJson(#[from] serde_json::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for storage operation results
pub type Result<T> = std::result::Result<T, StorageError>;
