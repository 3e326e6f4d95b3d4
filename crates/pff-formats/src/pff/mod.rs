//! PFF archive container format support
//!
//! A PFF archive packs every asset category a game build ships with into a
//! single file with a fixed 16-byte header:
//!
//! - **Header**: magic sentinel plus four per-category record counts
//! - **Levels**: fixed-dimension tile grids with spawn placements
//! - **Spawns**: entity spawn-point definitions
//! - **Textures**: opaque encoded image payloads
//! - **Sounds**: opaque encoded audio payloads with codec and level tags
//! - **Scripts** (optional trailing section): compiled shader IR and
//!   scripted-event binaries
//!
//! All multi-byte fields are little-endian. The writer is the authoritative
//! layout definition; [`PffArchive::build`] and [`PffArchive::parse`] are
//! kept in lockstep and round-trip byte-for-byte.
//!
//! # Basic Usage
//!
//! ## Parsing archives
//!
//! ```rust,no_run
//! use pff_formats::PffArchive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = PffArchive::parse_file("assets.pff")?;
//! println!("levels: {}", archive.header.numlevels);
//! println!("bulk payload: {} bytes", archive.payload_bytes());
//! # Ok(())
//! # }
//! ```
//!
//! ## Building archives
//!
//! ```rust
//! use pff_formats::PffArchiveBuilder;
//! use pff_formats::pff::texture::TextureRecord;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = PffArchiveBuilder::new()
//!     .add_texture(TextureRecord::new(vec![0x89, b'P', b'N', b'G']))
//!     .build()?;
//! let bytes = archive.build()?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod audio;
pub mod builder;
pub mod error;
pub mod header;
pub mod level;
mod reader;
pub mod script;
pub mod spawn;
pub mod texture;

pub use archive::PffArchive;
pub use audio::{AudioCodec, AudioRecord, NO_LEVEL};
pub use builder::PffArchiveBuilder;
pub use error::{Category, PffError, Result};
pub use header::{HEADER_MAGIC, HEADER_SIZE, PffHeader};
pub use level::{GRID_TILES, LevelRecord, NUM_SECTORS, SECTOR_MAX_X, SECTOR_MAX_Y, TileId};
pub use script::{ScriptKind, ScriptRecord};
pub use spawn::{Coord, SPAWN_ID_MAX, SpawnRecord};
pub use texture::TextureRecord;

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let _header = PffHeader::new(0, 0, 0, 0);
        let _builder = PffArchiveBuilder::new();
        let _level = LevelRecord::empty();
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn audio_codec() -> impl Strategy<Value = AudioCodec> {
            prop_oneof![
                Just(AudioCodec::Ogg),
                Just(AudioCodec::Wav),
                Just(AudioCodec::Flac),
                Just(AudioCodec::Opus),
            ]
        }

        fn spawn_record() -> impl Strategy<Value = SpawnRecord> {
            (
                "[a-z_]{0,16}",
                any::<u8>(),
                any::<u8>(),
                -1.0e4f32..1.0e4f32,
                -1.0e4f32..1.0e4f32,
                any::<u8>(),
            )
                .prop_map(|(id, replacement, marker, x, y, category)| {
                    SpawnRecord::new(
                        &id,
                        TileId(replacement),
                        TileId(marker),
                        Coord { x, y },
                        category,
                    )
                })
        }

        fn level_record(numspawns: usize) -> impl Strategy<Value = LevelRecord> {
            let indices = if numspawns == 0 {
                Just(Vec::new()).boxed()
            } else {
                prop::collection::vec(0..numspawns as u16, 0..6).boxed()
            };
            let edits = prop::collection::vec(
                (0..NUM_SECTORS, 0..SECTOR_MAX_Y, 0..SECTOR_MAX_X, any::<u8>()),
                0..8,
            );
            (edits, indices).prop_map(|(edits, spawn_indices)| {
                let mut level = LevelRecord::empty();
                for (sector, row, column, tile) in edits {
                    level.set_tile(sector, row, column, TileId(tile));
                }
                level.spawn_indices = spawn_indices;
                level
            })
        }

        fn pff_archive() -> impl Strategy<Value = PffArchive> {
            prop::collection::vec(spawn_record(), 0..4).prop_flat_map(|spawns| {
                let numspawns = spawns.len();
                (
                    Just(spawns),
                    prop::collection::vec(level_record(numspawns), 0..3),
                    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..4),
                    prop::collection::vec(
                        (audio_codec(), -1i32..3, prop::collection::vec(any::<u8>(), 0..64)),
                        0..4,
                    ),
                )
                    .prop_map(|(spawns, levels, textures, sounds)| {
                        let mut builder = PffArchiveBuilder::new();
                        for level in levels {
                            builder = builder.add_level(level);
                        }
                        for spawn in spawns {
                            builder = builder.add_spawn(spawn);
                        }
                        for texture in textures {
                            builder = builder.add_texture(TextureRecord::new(texture));
                        }
                        for (codec, level_index, data) in sounds {
                            builder =
                                builder.add_sound(AudioRecord::for_level(codec, level_index, data));
                        }
                        builder.build().expect("generated archive should be valid")
                    })
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            /// Round-trip law: parse(build(archive)) == archive
            #[test]
            fn archive_round_trip(archive in pff_archive()) {
                let data = archive.build()?;
                let parsed = PffArchive::parse(&data)?;
                prop_assert_eq!(archive, parsed);
            }

            /// Building the same archive twice yields identical bytes
            #[test]
            fn build_is_deterministic(archive in pff_archive()) {
                prop_assert_eq!(archive.build()?, archive.build()?);
            }

            /// Flipping any bit of the magic always yields InvalidMagic
            #[test]
            fn magic_corruption_detected(archive in pff_archive(), bit in 0usize..64) {
                let mut data = archive.build()?;
                data[bit / 8] ^= 1 << (bit % 8);
                let err = PffArchive::parse(&data).unwrap_err();
                prop_assert!(matches!(err, PffError::InvalidMagic(_)));
            }

            /// Truncating anywhere before the final byte yields Truncated
            #[test]
            fn truncation_detected(archive in pff_archive(), cut in any::<prop::sample::Index>()) {
                let data = archive.build()?;
                let cut = cut.index(data.len());
                let err = PffArchive::parse(&data[..cut]).unwrap_err();
                prop_assert!(
                    matches!(err, PffError::Truncated { .. }),
                    "cut at {}: got {:?}", cut, err
                );
            }
        }
    }
}
