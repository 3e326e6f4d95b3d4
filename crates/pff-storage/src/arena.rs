//! Bump arena for archive-lifetime bulk allocations
//!
//! Every bulk payload a loaded archive owns (texture bytes, audio streams,
//! compiled blobs) lives in one arena so a whole archive can be torn down by
//! a single reset instead of per-object deallocation. The arena hands out
//! [`ArenaHandle`]s rather than references: each handle carries the arena
//! generation it was allocated in, and resolving a handle after the arena
//! has been reset is a detectable [`StorageError::StaleHandle`] instead of a
//! use-after-free.

use crate::error::{Result, StorageError};
use tracing::{debug, trace};

/// Default arena capacity cap (256 MiB)
pub const DEFAULT_ARENA_CAPACITY: usize = 256 * 1024 * 1024;

/// Category an allocation is attributed to, for usage accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocTag {
    /// Level table data
    Levels,
    /// Spawn table data
    Spawns,
    /// Texture payloads
    Textures,
    /// Audio payloads
    Sounds,
    /// Compiled blob payloads
    Scripts,
}

impl AllocTag {
    const COUNT: usize = 5;

    fn slot(self) -> usize {
        match self {
            Self::Levels => 0,
            Self::Spawns => 1,
            Self::Textures => 2,
            Self::Sounds => 3,
            Self::Scripts => 4,
        }
    }
}

/// Generation-checked reference to an arena allocation
///
/// Handles are plain `Copy` values and may be stored anywhere, including
/// across frames; resolving one against an arena that has since been reset
/// fails instead of returning stale memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaHandle {
    offset: usize,
    len: usize,
    generation: u64,
}

impl ArenaHandle {
    /// Allocation size in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the allocation is zero-sized
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Arena generation this handle belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Bump allocator with per-category usage accounting
pub struct Arena {
    buf: Vec<u8>,
    capacity: usize,
    generation: u64,
    usage: [u64; AllocTag::COUNT],
}

impl Arena {
    /// Create an arena with the default capacity cap
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ARENA_CAPACITY)
    }

    /// Create an arena capped at `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::new(),
            capacity,
            generation: 0,
            usage: [0; AllocTag::COUNT],
        }
    }

    /// Copy `bytes` into the arena
    ///
    /// # Errors
    /// [`StorageError::ArenaExhausted`] when the allocation would push total
    /// usage past the capacity cap.
    pub fn alloc(&mut self, bytes: &[u8], tag: AllocTag) -> Result<ArenaHandle> {
        let available = self.capacity - self.buf.len();
        if bytes.len() > available {
            return Err(StorageError::ArenaExhausted {
                requested: bytes.len(),
                available,
            });
        }

        let offset = self.buf.len();
        self.buf.extend_from_slice(bytes);
        self.usage[tag.slot()] += bytes.len() as u64;
        trace!(?tag, offset, len = bytes.len(), "arena allocation");

        Ok(ArenaHandle {
            offset,
            len: bytes.len(),
            generation: self.generation,
        })
    }

    /// Resolve a handle to its bytes
    ///
    /// # Errors
    /// [`StorageError::StaleHandle`] when the handle predates the last
    /// [`reset`](Self::reset).
    pub fn resolve(&self, handle: ArenaHandle) -> Result<&[u8]> {
        if handle.generation != self.generation {
            return Err(StorageError::StaleHandle {
                handle_generation: handle.generation,
                current_generation: self.generation,
            });
        }
        self.buf
            .get(handle.offset..handle.offset + handle.len)
            .ok_or(StorageError::StaleHandle {
                handle_generation: handle.generation,
                current_generation: self.generation,
            })
    }

    /// Discard every allocation and invalidate all outstanding handles
    pub fn reset(&mut self) {
        debug!(
            generation = self.generation,
            freed = self.buf.len(),
            "arena reset"
        );
        self.buf.clear();
        self.buf.shrink_to_fit();
        self.usage = [0; AllocTag::COUNT];
        self.generation += 1;
    }

    /// Total bytes currently allocated across all categories
    pub fn current_usage(&self) -> u64 {
        self.buf.len() as u64
    }

    /// Bytes currently allocated for one category
    pub fn usage_for(&self, tag: AllocTag) -> u64 {
        self.usage[tag.slot()]
    }

    /// Current generation counter
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Capacity cap in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

// Buffer contents are elided; only the accounting is interesting
impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("len", &self.buf.len())
            .field("capacity", &self.capacity)
            .field("generation", &self.generation)
            .field("usage", &self.usage)
            .finish()
    }
}
