//! Whole-archive parsing, building, and validation
//!
//! Loading is all-or-nothing: the header magic is verified before anything
//! else is touched, every record read is bounds-checked, and the first
//! failure aborts the parse. A caller either gets a fully populated
//! [`PffArchive`] or a typed error with section and offset context, never a
//! partially decoded container.

use crate::pff::audio::AudioRecord;
use crate::pff::error::{Category, PffError, Result};
use crate::pff::header::{HEADER_SIZE, PffHeader};
use crate::pff::level::LevelRecord;
use crate::pff::reader::SliceReader;
use crate::pff::script::ScriptRecord;
use crate::pff::spawn::SpawnRecord;
use crate::pff::texture::TextureRecord;
use binrw::{BinRead, BinWrite, io::Cursor};
use std::path::Path;
use tracing::debug;

/// A fully decoded PFF archive
///
/// Tables are insertion-order-indexed with no holes; their lengths always
/// equal the corresponding header counts. The script table is the optional
/// trailing section and is the only one not counted in the header.
#[derive(Debug, Clone, PartialEq)]
pub struct PffArchive {
    /// Fixed archive header
    pub header: PffHeader,
    /// Tile-map levels
    pub levels: Vec<LevelRecord>,
    /// Spawn-point definitions
    pub spawns: Vec<SpawnRecord>,
    /// Raw encoded textures
    pub textures: Vec<TextureRecord>,
    /// Encoded audio tracks
    pub sounds: Vec<AudioRecord>,
    /// Compiled script/shader blobs (optional trailing section)
    pub scripts: Vec<ScriptRecord>,
}

impl PffArchive {
    /// Parse an archive from raw bytes
    ///
    /// # Errors
    /// - [`PffError::InvalidMagic`] when the sentinel does not match
    /// - [`PffError::Truncated`] when the stream ends before expected data
    /// - [`PffError::Corrupt`] / [`PffError::SpawnIndexOutOfRange`] for
    ///   malformed records
    /// - [`PffError::InvalidScriptBinary`] when a scripted-event blob fails
    ///   the symbol-table scan
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = SliceReader::new(data);

        let header_bytes = reader.take(HEADER_SIZE, Category::Header)?;
        let header = PffHeader::read(&mut Cursor::new(header_bytes))?;
        header.validate()?;
        debug!(
            numlevels = header.numlevels,
            numspawns = header.numspawns,
            numtextures = header.numtextures,
            numsounds = header.numsounds,
            "parsing archive body"
        );

        let mut levels = Vec::with_capacity(usize::from(header.numlevels));
        for index in 0..usize::from(header.numlevels) {
            levels.push(LevelRecord::read(&mut reader, index, header.numspawns)?);
        }

        let mut spawns = Vec::with_capacity(usize::from(header.numspawns));
        for _ in 0..header.numspawns {
            spawns.push(SpawnRecord::read(&mut reader)?);
        }

        let mut textures = Vec::with_capacity(usize::from(header.numtextures));
        for _ in 0..header.numtextures {
            textures.push(TextureRecord::read(&mut reader)?);
        }

        let mut sounds = Vec::with_capacity(usize::from(header.numsounds));
        for _ in 0..header.numsounds {
            sounds.push(AudioRecord::read(&mut reader)?);
        }

        // Optional trailing script section: present iff bytes remain
        let mut scripts = Vec::new();
        if !reader.is_empty() {
            let section_offset = reader.position();
            let numscripts = reader.read_u16(Category::Scripts)?;
            // The writer omits the section entirely when there are no
            // scripts; an explicit zero count cannot be reproduced on
            // repack, so it is rejected rather than silently dropped
            if numscripts == 0 {
                return Err(PffError::Corrupt {
                    category: Category::Scripts,
                    offset: section_offset,
                    reason: "script section present but empty".to_string(),
                });
            }
            scripts.reserve(usize::from(numscripts));
            for _ in 0..numscripts {
                scripts.push(ScriptRecord::read(&mut reader)?);
            }
            if !reader.is_empty() {
                return Err(PffError::Corrupt {
                    category: Category::Scripts,
                    offset: reader.position(),
                    reason: format!("{} trailing bytes after the last record", reader.remaining()),
                });
            }
        }

        Ok(Self {
            header,
            levels,
            spawns,
            textures,
            sounds,
            scripts,
        })
    }

    /// Read and parse an archive file
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Serialize the archive to bytes
    ///
    /// Byte-deterministic: identical archives always produce identical
    /// output. The archive is validated first, so the writer can never emit
    /// a container its own parser would reject.
    pub fn build(&self) -> Result<Vec<u8>> {
        self.validate()?;

        let mut buffer = Vec::new();
        self.header.write(&mut Cursor::new(&mut buffer))?;

        for level in &self.levels {
            level.write(&mut buffer);
        }
        for spawn in &self.spawns {
            spawn.write(&mut buffer);
        }
        for texture in &self.textures {
            texture.write(&mut buffer);
        }
        for sound in &self.sounds {
            sound.write(&mut buffer);
        }
        if !self.scripts.is_empty() {
            buffer.extend_from_slice(&(self.scripts.len() as u16).to_le_bytes());
            for script in &self.scripts {
                script.write(&mut buffer);
            }
        }

        Ok(buffer)
    }

    /// Validate internal consistency
    pub fn validate(&self) -> Result<()> {
        self.header.validate()?;

        let counts = [
            (Category::Levels, self.levels.len(), self.header.numlevels),
            (Category::Spawns, self.spawns.len(), self.header.numspawns),
            (
                Category::Textures,
                self.textures.len(),
                self.header.numtextures,
            ),
            (Category::Sounds, self.sounds.len(), self.header.numsounds),
        ];
        for (category, actual, expected) in counts {
            if actual != usize::from(expected) {
                return Err(PffError::Corrupt {
                    category,
                    offset: 0,
                    reason: format!(
                        "header declares {expected} records, table holds {actual}"
                    ),
                });
            }
        }
        if self.scripts.len() > usize::from(u16::MAX) {
            return Err(PffError::TooManyRecords {
                category: Category::Scripts,
                count: self.scripts.len(),
                max: usize::from(u16::MAX),
            });
        }

        for (index, level) in self.levels.iter().enumerate() {
            level.validate(index, self.header.numspawns)?;
        }
        for (index, spawn) in self.spawns.iter().enumerate() {
            spawn.validate(index)?;
        }

        Ok(())
    }

    /// Total bulk payload bytes (texture, audio, and blob data)
    ///
    /// This is the amount of arena memory a loader needs for the archive.
    pub fn payload_bytes(&self) -> u64 {
        let textures: u64 = self.textures.iter().map(TextureRecord::len).sum();
        let sounds: u64 = self.sounds.iter().map(|sound| sound.data.len() as u64).sum();
        let scripts: u64 = self
            .scripts
            .iter()
            .map(|script| script.data.len() as u64)
            .sum();
        textures + sounds + scripts
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pff::audio::AudioCodec;
    use crate::pff::builder::PffArchiveBuilder;
    use crate::pff::level::{GRID_TILES, TileId};
    use crate::pff::spawn::Coord;
    use pretty_assertions::assert_eq;

    fn sample_archive() -> PffArchive {
        let mut level = LevelRecord::empty();
        level.set_tile(0, 1, 2, TileId(9));
        level.spawn_indices = vec![0, 1];

        PffArchiveBuilder::new()
            .add_level(level)
            .add_spawn(SpawnRecord::new(
                "barrel",
                TileId(4),
                TileId(5),
                Coord { x: 1.0, y: 2.0 },
                0,
            ))
            .add_spawn(SpawnRecord::new(
                "imp",
                TileId(6),
                TileId(7),
                Coord { x: -3.5, y: 8.0 },
                2,
            ))
            .add_texture(TextureRecord::new(vec![1, 2, 3, 4]))
            .add_sound(AudioRecord::global(AudioCodec::Ogg, vec![9, 9, 9]))
            .build()
            .expect("Operation should succeed")
    }

    #[test]
    fn test_archive_round_trip() {
        let original = sample_archive();
        let data = original.build().expect("Operation should succeed");
        let parsed = PffArchive::parse(&data).expect("Operation should succeed");
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_build_is_deterministic() {
        let archive = sample_archive();
        let first = archive.build().expect("Operation should succeed");
        let second = archive.build().expect("Operation should succeed");
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_archive() {
        let archive = PffArchiveBuilder::new()
            .build()
            .expect("Operation should succeed");
        let data = archive.build().expect("Operation should succeed");
        assert_eq!(data.len(), HEADER_SIZE);

        let parsed = PffArchive::parse(&data).expect("Operation should succeed");
        assert_eq!(parsed.header, PffHeader::new(0, 0, 0, 0));
    }

    #[test]
    fn test_magic_bit_flips_rejected() {
        let data = sample_archive().build().expect("Operation should succeed");

        for byte in 0..8 {
            for bit in 0..8 {
                let mut corrupted = data.clone();
                corrupted[byte] ^= 1 << bit;
                let err = PffArchive::parse(&corrupted).unwrap_err();
                assert!(
                    matches!(err, PffError::InvalidMagic(_)),
                    "byte {byte} bit {bit}: expected InvalidMagic, got {err:?}"
                );
            }
        }
    }

    #[test]
    fn test_truncation_at_every_offset() {
        let data = sample_archive().build().expect("Operation should succeed");

        for cut in 0..data.len() {
            let err = PffArchive::parse(&data[..cut]).unwrap_err();
            assert!(
                matches!(err, PffError::Truncated { .. }),
                "cut at {cut}: expected Truncated, got {err:?}"
            );
        }
    }

    #[test]
    fn test_level_spawn_reference_bounds() {
        // 1 level, 2 spawns, spawnidx [0, 1]: loads, and the level exposes
        // exactly two valid spawn references
        let archive = sample_archive();
        let data = archive.build().expect("Operation should succeed");
        let parsed = PffArchive::parse(&data).expect("Operation should succeed");
        assert_eq!(parsed.levels[0].spawn_indices, vec![0, 1]);

        // spawnidx [0, 2] with index 2 out of range: rejected
        let mut bad = archive;
        bad.levels[0].spawn_indices = vec![0, 2];
        let built = bad.build();
        assert!(matches!(
            built,
            Err(PffError::SpawnIndexOutOfRange {
                level: 0,
                index: 2,
                spawn_count: 2,
            })
        ));

        // The same archive hand-encoded must be rejected by the parser too
        let mut data = PffHeader::new(1, 2, 0, 0).magic.to_le_bytes().to_vec();
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&vec![0u8; GRID_TILES]);
        data.extend_from_slice(&2u16.to_le_bytes()); // spawncount
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes()); // out of range
        let err = PffArchive::parse(&data).unwrap_err();
        assert!(matches!(err, PffError::SpawnIndexOutOfRange { .. }));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut data = sample_archive().build().expect("Operation should succeed");
        // A valid one-record script section followed by garbage
        data.extend_from_slice(&1u16.to_le_bytes());
        data.push(0); // ShaderIr
        data.extend_from_slice(&2u64.to_le_bytes());
        data.extend_from_slice(&[0x03, 0x02]);
        data.push(0xab);

        let err = PffArchive::parse(&data).unwrap_err();
        assert!(matches!(
            err,
            PffError::Corrupt {
                category: Category::Scripts,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_script_section_rejected() {
        // The writer never emits a zero-count script section, so accepting
        // one would break repack byte-identity
        let mut data = sample_archive().build().expect("Operation should succeed");
        let section_offset = data.len() as u64;
        data.extend_from_slice(&0u16.to_le_bytes());

        let err = PffArchive::parse(&data).unwrap_err();
        assert!(matches!(
            err,
            PffError::Corrupt {
                category: Category::Scripts,
                offset,
                ..
            } if offset == section_offset
        ));
    }

    #[test]
    fn test_header_count_table_mismatch() {
        let mut archive = sample_archive();
        archive.textures.clear();
        let err = archive.build().unwrap_err();
        assert!(matches!(
            err,
            PffError::Corrupt {
                category: Category::Textures,
                ..
            }
        ));
    }

    #[test]
    fn test_payload_bytes() {
        let archive = sample_archive();
        assert_eq!(archive.payload_bytes(), 4 + 3);
    }
}
