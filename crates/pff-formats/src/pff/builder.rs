//! Builder pattern for assembling PFF archives

use crate::pff::archive::PffArchive;
use crate::pff::audio::AudioRecord;
use crate::pff::error::{Category, PffError, Result};
use crate::pff::header::PffHeader;
use crate::pff::level::LevelRecord;
use crate::pff::script::{ScriptKind, ScriptRecord};
use crate::pff::spawn::SpawnRecord;
use crate::pff::texture::TextureRecord;

/// Builder for assembling archives record by record
///
/// Header counts are computed at [`build`](Self::build) time and the
/// finished archive is validated before it is returned, so a builder can
/// never hand out a container that fails its own parser.
///
/// # Example
///
/// ```rust
/// use pff_formats::pff::builder::PffArchiveBuilder;
/// use pff_formats::pff::level::{LevelRecord, TileId};
/// use pff_formats::pff::spawn::{Coord, SpawnRecord};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut level = LevelRecord::empty();
/// level.spawn_indices = vec![0];
///
/// let archive = PffArchiveBuilder::new()
///     .add_level(level)
///     .add_spawn(SpawnRecord::new(
///         "health_pack",
///         TileId(3),
///         TileId(4),
///         Coord { x: 10.0, y: 20.0 },
///         1,
///     ))
///     .build()?;
///
/// let data = archive.build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct PffArchiveBuilder {
    levels: Vec<LevelRecord>,
    spawns: Vec<SpawnRecord>,
    textures: Vec<TextureRecord>,
    sounds: Vec<AudioRecord>,
    scripts: Vec<ScriptRecord>,
}

impl PffArchiveBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a level record
    #[must_use]
    pub fn add_level(mut self, level: LevelRecord) -> Self {
        self.levels.push(level);
        self
    }

    /// Append a spawn record
    #[must_use]
    pub fn add_spawn(mut self, spawn: SpawnRecord) -> Self {
        self.spawns.push(spawn);
        self
    }

    /// Append a texture record
    #[must_use]
    pub fn add_texture(mut self, texture: TextureRecord) -> Self {
        self.textures.push(texture);
        self
    }

    /// Append an audio record
    #[must_use]
    pub fn add_sound(mut self, sound: AudioRecord) -> Self {
        self.sounds.push(sound);
        self
    }

    /// Append a prepared script record
    #[must_use]
    pub fn add_script(mut self, script: ScriptRecord) -> Self {
        self.scripts.push(script);
        self
    }

    /// Append a compiled blob, scanning exports when it is a script binary
    ///
    /// # Errors
    /// [`PffError::InvalidScriptBinary`] when a scripted-event blob is not a
    /// recognizable ELF64 shared object.
    pub fn add_script_blob(mut self, kind: ScriptKind, data: Vec<u8>) -> Result<Self> {
        self.scripts.push(ScriptRecord::new(kind, data)?);
        Ok(self)
    }

    /// Finish the archive
    ///
    /// # Errors
    /// - [`PffError::TooManyRecords`] when a category overflows its 16-bit
    ///   header count
    /// - any validation error from the assembled records (out-of-range spawn
    ///   indices, oversized identifiers, mismatched grids)
    pub fn build(self) -> Result<PffArchive> {
        let numlevels = Self::count(Category::Levels, self.levels.len())?;
        let numspawns = Self::count(Category::Spawns, self.spawns.len())?;
        let numtextures = Self::count(Category::Textures, self.textures.len())?;
        let numsounds = Self::count(Category::Sounds, self.sounds.len())?;

        let archive = PffArchive {
            header: PffHeader::new(numlevels, numspawns, numtextures, numsounds),
            levels: self.levels,
            spawns: self.spawns,
            textures: self.textures,
            sounds: self.sounds,
            scripts: self.scripts,
        };
        archive.validate()?;
        Ok(archive)
    }

    fn count(category: Category, len: usize) -> Result<u16> {
        u16::try_from(len).map_err(|_| PffError::TooManyRecords {
            category,
            count: len,
            max: usize::from(u16::MAX),
        })
    }
}
