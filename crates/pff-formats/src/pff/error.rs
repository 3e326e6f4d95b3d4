//! Error types for PFF archive parsing and building

use thiserror::Error;

/// Archive section in which an error was detected, used for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Fixed-size archive header
    Header,
    /// Tile-map level records
    Levels,
    /// Spawn-point records
    Spawns,
    /// Texture payload records
    Textures,
    /// Audio payload records
    Sounds,
    /// Optional trailing script/shader blob records
    Scripts,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::Levels => "levels",
            Self::Spawns => "spawns",
            Self::Textures => "textures",
            Self::Sounds => "sounds",
            Self::Scripts => "scripts",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when parsing or building PFF archives
#[derive(Error, Debug)]
pub enum PffError {
    /// Archive magic does not match the PFF sentinel
    #[error("invalid archive magic: {0:#018x}")]
    InvalidMagic(u64),

    /// Malformed data inside a well-delimited section
    #[error("corrupt archive in {category} section at offset {offset}: {reason}")]
    Corrupt {
        /// Section being parsed when corruption was detected
        category: Category,
        /// Absolute byte offset of the failing read
        offset: u64,
        /// Human-readable description of the inconsistency
        reason: String,
    },

    /// Stream ended before the expected data
    #[error(
        "archive truncated in {category} section at offset {offset}: \
         needed {needed} bytes, {remaining} remain"
    )]
    Truncated {
        /// Section being parsed when the stream ran out
        category: Category,
        /// Absolute byte offset of the failing read
        offset: u64,
        /// Bytes required by the next read
        needed: usize,
        /// Bytes actually remaining
        remaining: usize,
    },

    /// A level references a spawn slot the archive does not define
    #[error(
        "level {level} references spawn index {index}, \
         but the archive defines {spawn_count} spawns"
    )]
    SpawnIndexOutOfRange {
        /// Index of the offending level record
        level: usize,
        /// Out-of-range spawn index
        index: u16,
        /// Total spawn count in the archive
        spawn_count: u16,
    },

    /// A record category grew past its 16-bit header count
    #[error("too many records in {category} section: {count} exceeds {max}")]
    TooManyRecords {
        /// Overflowing category
        category: Category,
        /// Attempted record count
        count: usize,
        /// Largest representable count
        max: usize,
    },

    /// Script blob is not a recognizable ELF64 shared object
    #[error("invalid script binary: {reason}")]
    InvalidScriptBinary {
        /// What failed during the symbol-table scan
        reason: String,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` serialization error
    #[error("binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Type alias for PFF archive operation results
pub type Result<T> = std::result::Result<T, PffError>;
