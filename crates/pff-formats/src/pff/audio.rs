//! Audio track records
//!
//! Audio streams stay encoded in the archive; the mixer decodes them at
//! playback time. Each record carries its codec tag, the level it belongs to
//! (or the [`NO_LEVEL`] sentinel for global/ambient tracks), and the raw
//! stream bytes behind a u64 length prefix.

use crate::pff::error::{Category, PffError, Result};
use crate::pff::reader::SliceReader;

/// Level-association sentinel meaning "not level-specific"
pub const NO_LEVEL: i32 = -1;

/// Codec of an encoded audio stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AudioCodec {
    /// Ogg Vorbis stream
    Ogg = 0,
    /// RIFF/WAVE stream
    Wav = 1,
    /// FLAC stream
    Flac = 2,
    /// Opus stream
    Opus = 3,
}

impl AudioCodec {
    /// Decode the wire byte, `None` for unknown values
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Ogg),
            1 => Some(Self::Wav),
            2 => Some(Self::Flac),
            3 => Some(Self::Opus),
            _ => None,
        }
    }

    /// Conventional file extension for extracted tracks
    pub fn extension(self) -> &'static str {
        match self {
            Self::Ogg => "ogg",
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Opus => "opus",
        }
    }
}

/// One encoded audio track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRecord {
    /// Stream codec
    pub codec: AudioCodec,

    /// Owning level index, or [`NO_LEVEL`]
    ///
    /// Deliberately not validated against the archive's level count at parse
    /// time; the engine validates lazily when a level requests its tracks.
    pub level_index: i32,

    /// Encoded stream bytes, copied verbatim
    pub data: Vec<u8>,
}

impl AudioRecord {
    /// Create a track bound to a level
    pub fn for_level(codec: AudioCodec, level_index: i32, data: Vec<u8>) -> Self {
        Self {
            codec,
            level_index,
            data,
        }
    }

    /// Create a global/ambient track
    pub fn global(codec: AudioCodec, data: Vec<u8>) -> Self {
        Self::for_level(codec, NO_LEVEL, data)
    }

    /// Owning level, `None` for global tracks
    pub fn level(&self) -> Option<usize> {
        usize::try_from(self.level_index).ok()
    }

    pub(crate) fn read(reader: &mut SliceReader<'_>) -> Result<Self> {
        let codec_offset = reader.position();
        let codec_byte = reader.read_u8(Category::Sounds)?;
        let codec = AudioCodec::from_u8(codec_byte).ok_or_else(|| PffError::Corrupt {
            category: Category::Sounds,
            offset: codec_offset,
            reason: format!("unknown audio codec byte {codec_byte:#04x}"),
        })?;

        let level_index = reader.read_i32(Category::Sounds)?;
        let payload = reader.read_length_prefixed(Category::Sounds)?;

        Ok(Self {
            codec,
            level_index,
            data: payload.to_vec(),
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.push(self.codec as u8);
        out.extend_from_slice(&self.level_index.to_le_bytes());
        out.extend_from_slice(&(self.data.len() as u64).to_le_bytes());
        out.extend_from_slice(&self.data);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_codec_conversion_bijective() {
        for codec in [
            AudioCodec::Ogg,
            AudioCodec::Wav,
            AudioCodec::Flac,
            AudioCodec::Opus,
        ] {
            assert_eq!(AudioCodec::from_u8(codec as u8), Some(codec));
        }
        assert_eq!(AudioCodec::from_u8(4), None);
        assert_eq!(AudioCodec::from_u8(0xff), None);
    }

    #[test]
    fn test_audio_round_trip() {
        let original = AudioRecord::for_level(AudioCodec::Flac, 2, vec![0xde, 0xad, 0xbe, 0xef]);

        let mut buffer = Vec::new();
        original.write(&mut buffer);
        assert_eq!(buffer.len(), 1 + 4 + 8 + 4);

        let mut reader = SliceReader::new(&buffer);
        let parsed = AudioRecord::read(&mut reader).expect("Operation should succeed");
        assert_eq!(original, parsed);
        assert_eq!(parsed.level(), Some(2));
    }

    #[test]
    fn test_global_track_sentinel() {
        let track = AudioRecord::global(AudioCodec::Ogg, vec![1]);
        assert_eq!(track.level_index, NO_LEVEL);
        assert_eq!(track.level(), None);

        let mut buffer = Vec::new();
        track.write(&mut buffer);
        assert_eq!(&buffer[1..5], &(-1i32).to_le_bytes());
    }

    #[test]
    fn test_unknown_codec_rejected() {
        let mut buffer = Vec::new();
        AudioRecord::global(AudioCodec::Wav, vec![7]).write(&mut buffer);
        buffer[0] = 9;

        let mut reader = SliceReader::new(&buffer);
        let err = AudioRecord::read(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            PffError::Corrupt {
                category: Category::Sounds,
                offset: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_stream() {
        let mut buffer = Vec::new();
        AudioRecord::global(AudioCodec::Opus, vec![1, 2, 3, 4]).write(&mut buffer);
        buffer.truncate(buffer.len() - 2);

        let mut reader = SliceReader::new(&buffer);
        assert!(matches!(
            AudioRecord::read(&mut reader),
            Err(PffError::Truncated { .. })
        ));
    }
}
