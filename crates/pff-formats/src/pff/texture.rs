//! Texture payload records
//!
//! Textures travel as opaque encoded image bytes (PNG, BMP, ...); decoding
//! them is the renderer's job, not the archive layer's. On the wire a
//! texture is a u64 length followed by the payload verbatim.

use crate::pff::error::{Category, Result};
use crate::pff::reader::SliceReader;

/// One raw encoded texture image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    /// Encoded image bytes, copied verbatim
    pub data: Vec<u8>,
}

impl TextureRecord {
    /// Wrap raw encoded image bytes
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Payload size in bytes
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn read(reader: &mut SliceReader<'_>) -> Result<Self> {
        let payload = reader.read_length_prefixed(Category::Textures)?;
        Ok(Self {
            data: payload.to_vec(),
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.len().to_le_bytes());
        out.extend_from_slice(&self.data);
    }
}
