//! Pack/extract manifest model
//!
//! Extracting an archive produces a directory of asset files plus a
//! `manifest.json` describing how to reassemble them. The manifest is the
//! single source of truth for packing: record order in the manifest is the
//! record order in the rebuilt archive, so extract-then-pack reproduces the
//! original file byte for byte.

use crate::error::{Result, StorageError};
use pff_formats::pff::{AudioCodec, ScriptKind};
use serde::{Deserialize, Serialize};

/// Manifest file name inside an extracted archive directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Top-level manifest: one entry list per record category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    /// Level entries, in archive order
    #[serde(default)]
    pub levels: Vec<LevelEntry>,
    /// Spawn entries, in archive order
    #[serde(default)]
    pub spawns: Vec<SpawnEntry>,
    /// Texture file paths relative to the manifest, in archive order
    #[serde(default)]
    pub textures: Vec<String>,
    /// Audio entries, in archive order
    #[serde(default)]
    pub sounds: Vec<SoundManifestEntry>,
    /// Script entries, in archive order; absent for script-less archives
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<ScriptManifestEntry>,
}

/// One level: its tile-grid file plus spawn placements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelEntry {
    /// Path of the raw tile-grid file, relative to the manifest
    pub tiles: String,
    /// Spawn-table indices placed in this level, in placement order
    #[serde(default)]
    pub spawn_indices: Vec<u16>,
}

/// One spawn-point definition, stored inline in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    /// Entity identifier
    pub id: String,
    /// Tile placed when the entity is cleared
    pub replacement: u8,
    /// Tile marking the spawn location in the grid
    pub marker: u8,
    /// Horizontal world position
    pub x: f32,
    /// Vertical world position
    pub y: f32,
    /// Entity category discriminator
    pub category: u8,
}

/// One audio track: its stream file plus codec and level association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundManifestEntry {
    /// Path of the encoded stream file, relative to the manifest
    pub file: String,
    /// Codec name: `ogg`, `wav`, `flac`, or `opus`
    pub codec: String,
    /// Owning level index, `-1` for global tracks
    pub level_index: i32,
}

/// One script blob: its file plus kind tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptManifestEntry {
    /// Path of the blob file, relative to the manifest
    pub file: String,
    /// Blob kind name: `shader_ir` or `script_binary`
    pub kind: String,
}

/// Manifest string for a codec tag
pub fn codec_name(codec: AudioCodec) -> &'static str {
    match codec {
        AudioCodec::Ogg => "ogg",
        AudioCodec::Wav => "wav",
        AudioCodec::Flac => "flac",
        AudioCodec::Opus => "opus",
    }
}

/// Parse a manifest codec string
///
/// # Errors
/// [`StorageError::BadManifest`] for unrecognized names.
pub fn parse_codec(name: &str) -> Result<AudioCodec> {
    match name {
        "ogg" => Ok(AudioCodec::Ogg),
        "wav" => Ok(AudioCodec::Wav),
        "flac" => Ok(AudioCodec::Flac),
        "opus" => Ok(AudioCodec::Opus),
        other => Err(StorageError::BadManifest(format!(
            "unknown audio codec {other:?}"
        ))),
    }
}

/// Manifest string for a script kind
pub fn kind_name(kind: ScriptKind) -> &'static str {
    match kind {
        ScriptKind::ShaderIr => "shader_ir",
        ScriptKind::ScriptBinary => "script_binary",
    }
}

/// Parse a manifest script-kind string
///
/// # Errors
/// [`StorageError::BadManifest`] for unrecognized names.
pub fn parse_kind(name: &str) -> Result<ScriptKind> {
    match name {
        "shader_ir" => Ok(ScriptKind::ShaderIr),
        "script_binary" => Ok(ScriptKind::ScriptBinary),
        other => Err(StorageError::BadManifest(format!(
            "unknown script kind {other:?}"
        ))),
    }
}
