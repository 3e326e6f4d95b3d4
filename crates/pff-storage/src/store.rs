//! Loaded-archive tables backed by the arena
//!
//! [`LoadedArchive`] is the runtime view of one archive: parsed level and
//! spawn tables, plus texture/audio/blob payloads copied into a single
//! arena. The load path is synchronous and all-or-nothing; a failed load
//! leaves nothing behind. Unloading resets the arena, which invalidates
//! every handle handed out for this archive — collaborators that cached
//! handles get a typed error on the next resolve instead of dangling data.
//!
//! There are no process-wide tables: each `LoadedArchive` is a
//! self-contained value, so tests can load several archives side by side.
//! Engines that want the classic "one archive active" model simply keep one
//! value and call [`unload`](LoadedArchive::unload) on level transitions.

use crate::arena::{AllocTag, Arena, ArenaHandle, DEFAULT_ARENA_CAPACITY};
use crate::error::{Result, StorageError};
use memmap2::Mmap;
use pff_formats::pff::{AudioCodec, LevelRecord, PffArchive, PffHeader, ScriptKind, SpawnRecord};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Audio table entry: stream metadata plus the arena handle of its bytes
#[derive(Debug, Clone, Copy)]
pub struct SoundEntry {
    /// Stream codec
    pub codec: AudioCodec,
    /// Owning level index, `-1` for global tracks
    pub level_index: i32,
    /// Handle of the encoded stream bytes
    pub data: ArenaHandle,
}

impl SoundEntry {
    /// Owning level, `None` for global tracks
    pub fn level(&self) -> Option<usize> {
        usize::try_from(self.level_index).ok()
    }
}

/// Script table entry: blob metadata plus the arena handle of its bytes
#[derive(Debug, Clone)]
pub struct ScriptEntry {
    /// Blob kind
    pub kind: ScriptKind,
    /// Exported function names scanned at load time
    pub exports: Vec<String>,
    /// Handle of the compiled bytes
    pub data: ArenaHandle,
}

/// One loaded archive: typed tables plus arena-backed bulk payloads
#[derive(Debug)]
pub struct LoadedArchive {
    header: PffHeader,
    levels: Vec<LevelRecord>,
    spawns: Vec<SpawnRecord>,
    textures: Vec<ArenaHandle>,
    sounds: Vec<SoundEntry>,
    scripts: Vec<ScriptEntry>,
    arena: Arena,
}

impl LoadedArchive {
    /// Load an archive file with the default arena capacity
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_capacity(path, DEFAULT_ARENA_CAPACITY)
    }

    /// Load an archive file with an explicit arena capacity cap
    pub fn load_with_capacity(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };

        let archive = PffArchive::parse(&mmap)?;
        let loaded = Self::from_archive(archive, capacity)?;
        info!(
            path = %path.display(),
            levels = loaded.levels.len(),
            spawns = loaded.spawns.len(),
            textures = loaded.textures.len(),
            sounds = loaded.sounds.len(),
            scripts = loaded.scripts.len(),
            bulk_bytes = loaded.usage(),
            "archive loaded"
        );
        Ok(loaded)
    }

    /// Materialize an already-parsed archive into arena-backed tables
    pub fn from_archive(archive: PffArchive, capacity: usize) -> Result<Self> {
        let mut arena = Arena::with_capacity(capacity);

        let mut textures = Vec::with_capacity(archive.textures.len());
        for texture in &archive.textures {
            textures.push(arena.alloc(&texture.data, AllocTag::Textures)?);
        }

        let mut sounds = Vec::with_capacity(archive.sounds.len());
        for sound in &archive.sounds {
            sounds.push(SoundEntry {
                codec: sound.codec,
                level_index: sound.level_index,
                data: arena.alloc(&sound.data, AllocTag::Sounds)?,
            });
        }

        let mut scripts = Vec::with_capacity(archive.scripts.len());
        for script in &archive.scripts {
            scripts.push(ScriptEntry {
                kind: script.kind,
                exports: script.exports.clone(),
                data: arena.alloc(&script.data, AllocTag::Scripts)?,
            });
        }

        Ok(Self {
            header: archive.header,
            levels: archive.levels,
            spawns: archive.spawns,
            textures,
            sounds,
            scripts,
            arena,
        })
    }

    /// Archive header, including the original category counts
    pub fn header(&self) -> &PffHeader {
        &self.header
    }

    /// Level record by table index
    pub fn level(&self, index: usize) -> Result<&LevelRecord> {
        self.levels
            .get(index)
            .ok_or(StorageError::IndexOutOfBounds {
                table: "level",
                index,
                len: self.levels.len(),
            })
    }

    /// Spawn record by table index
    pub fn spawn(&self, index: usize) -> Result<&SpawnRecord> {
        self.spawns
            .get(index)
            .ok_or(StorageError::IndexOutOfBounds {
                table: "spawn",
                index,
                len: self.spawns.len(),
            })
    }

    /// Spawn records placed in a level, in placement order
    ///
    /// Indices were validated at parse time, so resolution cannot dangle.
    pub fn level_spawns(&self, index: usize) -> Result<Vec<&SpawnRecord>> {
        let level = self.level(index)?;
        level
            .spawn_indices
            .iter()
            .map(|&spawn_index| self.spawn(usize::from(spawn_index)))
            .collect()
    }

    /// Texture bytes by table index
    pub fn texture(&self, index: usize) -> Result<&[u8]> {
        self.arena.resolve(self.texture_handle(index)?)
    }

    /// Arena handle of a texture, for collaborators that cache references
    pub fn texture_handle(&self, index: usize) -> Result<ArenaHandle> {
        self.textures
            .get(index)
            .copied()
            .ok_or(StorageError::IndexOutOfBounds {
                table: "texture",
                index,
                len: self.textures.len(),
            })
    }

    /// Audio entry by table index
    pub fn sound(&self, index: usize) -> Result<&SoundEntry> {
        self.sounds
            .get(index)
            .ok_or(StorageError::IndexOutOfBounds {
                table: "sound",
                index,
                len: self.sounds.len(),
            })
    }

    /// Encoded audio bytes by table index
    pub fn sound_data(&self, index: usize) -> Result<&[u8]> {
        self.arena.resolve(self.sound(index)?.data)
    }

    /// Audio table indices associated with a level
    ///
    /// `None` selects global/ambient tracks. Association indices are stored
    /// unvalidated in the archive; this is the lazy validation point, and
    /// indices that name a nonexistent level simply match nothing.
    pub fn sounds_for_level(&self, level: Option<usize>) -> Vec<usize> {
        self.sounds
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.level() == level)
            .map(|(index, _)| index)
            .collect()
    }

    /// Script entry by table index
    pub fn script(&self, index: usize) -> Result<&ScriptEntry> {
        self.scripts
            .get(index)
            .ok_or(StorageError::IndexOutOfBounds {
                table: "script",
                index,
                len: self.scripts.len(),
            })
    }

    /// Compiled blob bytes by table index
    pub fn script_data(&self, index: usize) -> Result<&[u8]> {
        self.arena.resolve(self.script(index)?.data)
    }

    /// Resolve a cached arena handle
    pub fn resolve(&self, handle: ArenaHandle) -> Result<&[u8]> {
        self.arena.resolve(handle)
    }

    /// Table lengths as `(levels, spawns, textures, sounds, scripts)`
    pub fn counts(&self) -> (usize, usize, usize, usize, usize) {
        (
            self.levels.len(),
            self.spawns.len(),
            self.textures.len(),
            self.sounds.len(),
            self.scripts.len(),
        )
    }

    /// Total bulk bytes the archive holds in the arena
    pub fn usage(&self) -> u64 {
        self.arena.current_usage()
    }

    /// Bulk bytes attributed to one allocation category
    pub fn usage_for(&self, tag: AllocTag) -> u64 {
        self.arena.usage_for(tag)
    }

    /// Tear the archive down
    ///
    /// Clears every table and resets the arena, so all previously handed out
    /// [`ArenaHandle`]s become stale. The value itself can be reused as the
    /// target of a later load via [`from_archive`](Self::from_archive)
    /// replacement, but after `unload` every accessor reports empty tables.
    pub fn unload(&mut self) {
        info!(freed_bytes = self.arena.current_usage(), "archive unloaded");
        self.levels.clear();
        self.spawns.clear();
        self.textures.clear();
        self.sounds.clear();
        self.scripts.clear();
        self.header = PffHeader::new(0, 0, 0, 0);
        self.arena.reset();
    }
}
