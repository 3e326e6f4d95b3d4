//! Spawn-point records
//!
//! A spawn point is a placement marker inside a level: an entity identifier,
//! the two tiles it can present (the marker before activation and the
//! replacement after), a world coordinate, and an opaque category byte the
//! spawner dispatches on. The wire record is a fixed 92 bytes.
//!
//! Identifier policy: identifiers longer than [`SPAWN_ID_MAX`] bytes are
//! truncated at a UTF-8 boundary with a warning when building (see
//! [`SpawnRecord::sanitize_id`]); when parsing, the 81-byte field must be a
//! NUL-terminated UTF-8 string with zero padding after the terminator.
//! Requiring canonical padding is what makes extract-then-pack reproduce an
//! archive byte for byte.

use crate::pff::error::{Category, PffError, Result};
use crate::pff::level::TileId;
use crate::pff::reader::SliceReader;
use tracing::warn;

/// Maximum identifier length in bytes, excluding the NUL terminator
pub const SPAWN_ID_MAX: usize = 80;

/// Size of one spawn record on the wire
pub const SPAWN_WIRE_SIZE: usize = SPAWN_ID_MAX + 1 + 1 + 1 + 8 + 1;

/// 2D world coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    /// Horizontal world position
    pub x: f32,
    /// Vertical world position
    pub y: f32,
}

/// One spawn-point definition
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRecord {
    /// Entity identifier, at most [`SPAWN_ID_MAX`] bytes, no interior NULs
    pub id: String,

    /// Tile shown once the spawn has been consumed
    pub replacement: TileId,

    /// Tile shown while the spawn is pending
    pub marker: TileId,

    /// World position of the marker
    pub position: Coord,

    /// Opaque behavior/category tag dispatched on by the spawner
    pub category: u8,

    /// Behavior-specific extra data
    ///
    /// Never stored in the archive; the archive layer always leaves this
    /// `None` and the spawn-behavior subsystem populates it after load.
    pub payload: Option<Vec<u8>>,
}

impl SpawnRecord {
    /// Create a record with the identifier policy applied
    pub fn new(id: &str, replacement: TileId, marker: TileId, position: Coord, category: u8) -> Self {
        Self {
            id: Self::sanitize_id(id),
            replacement,
            marker,
            position,
            category,
            payload: None,
        }
    }

    /// Enforce the identifier length limit
    ///
    /// Identifiers longer than [`SPAWN_ID_MAX`] bytes are cut back to the
    /// nearest UTF-8 character boundary and a warning is logged. Interior
    /// NULs are stripped since the wire field is NUL-terminated.
    pub fn sanitize_id(id: &str) -> String {
        let mut id: String = if id.contains('\0') {
            id.chars().filter(|&c| c != '\0').collect()
        } else {
            id.to_owned()
        };
        if id.len() > SPAWN_ID_MAX {
            let mut cut = SPAWN_ID_MAX;
            while !id.is_char_boundary(cut) {
                cut -= 1;
            }
            warn!(
                original_len = id.len(),
                truncated_len = cut,
                "spawn identifier exceeds {SPAWN_ID_MAX} bytes, truncating"
            );
            id.truncate(cut);
        }
        id
    }

    /// Check the record against the wire constraints
    pub fn validate(&self, spawn_index: usize) -> Result<()> {
        if self.id.len() > SPAWN_ID_MAX || self.id.contains('\0') {
            return Err(PffError::Corrupt {
                category: Category::Spawns,
                offset: 0,
                reason: format!("spawn {spawn_index} identifier violates the wire limits"),
            });
        }
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(PffError::Corrupt {
                category: Category::Spawns,
                offset: 0,
                reason: format!("spawn {spawn_index} has a non-finite coordinate"),
            });
        }
        Ok(())
    }

    pub(crate) fn read(reader: &mut SliceReader<'_>) -> Result<Self> {
        let record_offset = reader.position();
        let raw = reader.take(SPAWN_WIRE_SIZE, Category::Spawns)?;

        let id_field = &raw[..=SPAWN_ID_MAX];
        let Some(terminator) = id_field.iter().position(|&byte| byte == 0) else {
            return Err(PffError::Corrupt {
                category: Category::Spawns,
                offset: record_offset,
                reason: "spawn identifier is not NUL-terminated".to_owned(),
            });
        };
        if id_field[terminator..].iter().any(|&byte| byte != 0) {
            return Err(PffError::Corrupt {
                category: Category::Spawns,
                offset: record_offset,
                reason: "spawn identifier has non-zero padding".to_owned(),
            });
        }
        let id = std::str::from_utf8(&id_field[..terminator])
            .map_err(|e| PffError::Corrupt {
                category: Category::Spawns,
                offset: record_offset,
                reason: format!("spawn identifier is not UTF-8: {e}"),
            })?
            .to_owned();

        let mut fixed = &raw[SPAWN_ID_MAX + 1..];
        let replacement = TileId(fixed[0]);
        let marker = TileId(fixed[1]);
        fixed = &fixed[2..];
        let x = f32::from_le_bytes([fixed[0], fixed[1], fixed[2], fixed[3]]);
        let y = f32::from_le_bytes([fixed[4], fixed[5], fixed[6], fixed[7]]);
        let category = fixed[8];

        Ok(Self {
            id,
            replacement,
            marker,
            position: Coord { x, y },
            category,
            payload: None,
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        let mut id_field = [0u8; SPAWN_ID_MAX + 1];
        let id_bytes = self.id.as_bytes();
        id_field[..id_bytes.len()].copy_from_slice(id_bytes);
        out.extend_from_slice(&id_field);

        out.push(self.replacement.0);
        out.push(self.marker.0);
        out.extend_from_slice(&self.position.x.to_le_bytes());
        out.extend_from_slice(&self.position.y.to_le_bytes());
        out.push(self.category);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_spawn() -> SpawnRecord {
        SpawnRecord::new(
            "spawner_imp",
            TileId(12),
            TileId(13),
            Coord { x: 64.5, y: -12.25 },
            3,
        )
    }

    #[test]
    fn test_spawn_round_trip() {
        let original = sample_spawn();

        let mut buffer = Vec::new();
        original.write(&mut buffer);
        assert_eq!(buffer.len(), SPAWN_WIRE_SIZE);

        let mut reader = SliceReader::new(&buffer);
        let parsed = SpawnRecord::read(&mut reader).expect("Operation should succeed");
        assert_eq!(original, parsed);
        assert!(parsed.payload.is_none());
    }

    #[test]
    fn test_identifier_truncated_at_char_boundary() {
        // 79 ASCII bytes followed by a 2-byte character straddling the limit
        let long = format!("{}é", "a".repeat(79));
        assert_eq!(long.len(), 81);

        let record = SpawnRecord::new(&long, TileId(0), TileId(0), Coord::default(), 0);
        assert_eq!(record.id.len(), 79);
        assert!(record.validate(0).is_ok());
    }

    #[test]
    fn test_interior_nul_stripped() {
        let record = SpawnRecord::new("bad\0id", TileId(0), TileId(0), Coord::default(), 0);
        assert_eq!(record.id, "badid");
    }

    #[test]
    fn test_missing_terminator_rejected() {
        let mut buffer = Vec::new();
        sample_spawn().write(&mut buffer);
        for byte in &mut buffer[..=SPAWN_ID_MAX] {
            *byte = b'x';
        }

        let mut reader = SliceReader::new(&buffer);
        let err = SpawnRecord::read(&mut reader).unwrap_err();
        assert!(matches!(err, PffError::Corrupt { .. }));
        assert!(err.to_string().contains("NUL-terminated"));
    }

    #[test]
    fn test_dirty_padding_rejected() {
        let mut buffer = Vec::new();
        sample_spawn().write(&mut buffer);
        buffer[SPAWN_ID_MAX] = 0x7f; // past the terminator, inside the id field

        let mut reader = SliceReader::new(&buffer);
        let err = SpawnRecord::read(&mut reader).unwrap_err();
        assert!(err.to_string().contains("padding"));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut buffer = Vec::new();
        sample_spawn().write(&mut buffer);
        buffer[0] = 0xff;
        buffer[1] = 0xfe;

        let mut reader = SliceReader::new(&buffer);
        let err = SpawnRecord::read(&mut reader).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_truncated_record() {
        let mut buffer = Vec::new();
        sample_spawn().write(&mut buffer);
        buffer.truncate(SPAWN_WIRE_SIZE - 1);

        let mut reader = SliceReader::new(&buffer);
        let err = SpawnRecord::read(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            PffError::Truncated {
                category: Category::Spawns,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_non_finite_coordinate() {
        let mut record = sample_spawn();
        record.position.x = f32::NAN;
        assert!(record.validate(0).is_err());
    }
}
