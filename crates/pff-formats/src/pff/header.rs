//! PFF archive header parsing and building

use crate::pff::error::{PffError, Result};
use binrw::{BinRead, BinWrite};

/// Sentinel value every PFF archive starts with
pub const HEADER_MAGIC: u64 = 0x5F37_59DF;

/// Size of the fixed archive header in bytes
pub const HEADER_SIZE: usize = 16;

/// Fixed-size archive header
///
/// The header is the first 16 bytes of every archive:
/// - Magic sentinel (8 bytes, little-endian)
/// - Level count (2 bytes)
/// - Spawn count (2 bytes)
/// - Texture count (2 bytes)
/// - Sound count (2 bytes)
///
/// The four counts bound every loop the parser runs; nothing past the header
/// is touched until the magic has been verified bit-for-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct PffHeader {
    /// Magic sentinel, must equal [`HEADER_MAGIC`]
    pub magic: u64,

    /// Number of level records
    pub numlevels: u16,

    /// Number of spawn records
    pub numspawns: u16,

    /// Number of texture records
    pub numtextures: u16,

    /// Number of sound records
    pub numsounds: u16,
}

impl PffHeader {
    /// Create a header with the given category counts
    pub fn new(numlevels: u16, numspawns: u16, numtextures: u16, numsounds: u16) -> Self {
        Self {
            magic: HEADER_MAGIC,
            numlevels,
            numspawns,
            numtextures,
            numsounds,
        }
    }

    /// Validate the magic sentinel
    pub fn validate(&self) -> Result<()> {
        if self.magic != HEADER_MAGIC {
            return Err(PffError::InvalidMagic(self.magic));
        }
        Ok(())
    }
}
