//! Arena-backed runtime storage and directory packing for PFF archives
//!
//! This crate sits on top of `pff-formats` and provides what an engine or a
//! content pipeline needs beyond raw parsing:
//!
//! - **Loading**: [`LoadedArchive`] memory-maps an archive file, parses it,
//!   and copies every bulk payload into a single bump [`Arena`], so a level
//!   transition tears the whole archive down with one reset
//! - **Handles**: [`ArenaHandle`]s are generation-checked, and resolving a
//!   handle that outlived its archive is a typed error, not stale memory
//! - **Extraction**: [`extract_archive`] unpacks an archive into an editable
//!   directory tree with a `manifest.json`
//! - **Packing**: [`write_archive`] rebuilds an archive from such a tree;
//!   extract-then-pack reproduces the original file byte for byte
//!
//! # Example
//!
//! ```rust,no_run
//! use pff_storage::LoadedArchive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut archive = LoadedArchive::load("assets.pff")?;
//! let texture = archive.texture(0)?;
//! println!("first texture: {} bytes", texture.len());
//! archive.unload();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod arena;
pub mod error;
pub mod extract;
pub mod manifest;
pub mod pack;
pub mod store;

pub use arena::{AllocTag, Arena, ArenaHandle, DEFAULT_ARENA_CAPACITY};
pub use error::{Result, StorageError};
pub use extract::extract_archive;
pub use manifest::{ArchiveManifest, MANIFEST_FILE};
pub use pack::write_archive;
pub use store::{LoadedArchive, ScriptEntry, SoundEntry};
