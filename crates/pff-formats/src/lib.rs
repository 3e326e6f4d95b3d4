//! Parser and builder for the PFF (Packed Format File) game-asset container
//!
//! A PFF archive is a single file holding every asset a game build needs:
//! tile-map levels, spawn-point definitions, raw texture images, audio
//! streams, and optionally compiled script/shader blobs. This crate provides
//! symmetric parse and build support so that the reader and writer can never
//! drift apart: the writer is the authoritative format definition and the
//! parser consumes exactly what it emits.
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: every record category parses and builds
//! - **All-or-Nothing Loading**: a failure in any record aborts the whole
//!   parse; partial archives are never exposed
//! - **Round-Trip Guarantee**: `parse(build(archive))` reproduces the
//!   archive field-by-field, and `build` is byte-deterministic
//! - **Bounded Reads**: every read is validated against the remaining
//!   stream length before it happens, so corrupt or truncated archives
//!   produce typed errors instead of out-of-range access

#![warn(missing_docs)]

pub mod pff;

pub use pff::archive::PffArchive;
pub use pff::builder::PffArchiveBuilder;
pub use pff::error::{Category, PffError, Result};
pub use pff::header::PffHeader;
