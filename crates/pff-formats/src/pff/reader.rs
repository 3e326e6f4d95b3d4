//! Bounds-checked slice reader used by every record decoder
//!
//! All variable-length reads in the parser go through this cursor so that a
//! short or lying archive always surfaces as [`PffError::Truncated`] with the
//! section and absolute offset of the failing read, never as a raw EOF or an
//! out-of-range slice access.

use crate::pff::error::{Category, PffError, Result};

/// Forward-only cursor over the raw archive bytes
pub(crate) struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Absolute offset of the next read
    pub(crate) fn position(&self) -> u64 {
        self.pos as u64
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take `needed` bytes, failing with `Truncated` if the stream is short
    pub(crate) fn take(&mut self, needed: usize, category: Category) -> Result<&'a [u8]> {
        if needed > self.remaining() {
            return Err(PffError::Truncated {
                category,
                offset: self.position(),
                needed,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self, category: Category) -> Result<u8> {
        Ok(self.take(1, category)?[0])
    }

    pub(crate) fn read_u16(&mut self, category: Category) -> Result<u16> {
        let bytes = self.take(2, category)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_i32(&mut self, category: Category) -> Result<i32> {
        let bytes = self.take(4, category)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_u64(&mut self, category: Category) -> Result<u64> {
        let bytes = self.take(8, category)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Take a u64-length-prefixed payload, validating the length against the
    /// remaining stream before any allocation happens
    pub(crate) fn read_length_prefixed(&mut self, category: Category) -> Result<&'a [u8]> {
        let length = self.read_u64(category)?;
        if length > self.remaining() as u64 {
            return Err(PffError::Truncated {
                category,
                offset: self.position(),
                needed: usize::try_from(length).unwrap_or(usize::MAX),
                remaining: self.remaining(),
            });
        }
        self.take(length as usize, category)
    }
}
