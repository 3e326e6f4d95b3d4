//! Archive extraction into an editable directory tree
//!
//! Extraction unpacks every record into its own file under category
//! subdirectories (`levels/`, `textures/`, `sounds/`, `scripts/`) and writes
//! a `manifest.json` capturing record order and metadata. The tree is the
//! editing surface for content tools; [`crate::pack::write_archive`]
//! reverses the operation exactly.

use crate::error::{Result, StorageError};
use crate::manifest::{
    ArchiveManifest, LevelEntry, MANIFEST_FILE, ScriptManifestEntry, SoundManifestEntry,
    SpawnEntry, codec_name, kind_name,
};
use pff_formats::PffArchive;
use std::fs;
use std::path::Path;
use tracing::info;

/// Extract an archive file into `out_dir`
///
/// Creates `out_dir` (and category subdirectories) as needed. Existing files
/// with colliding names are overwritten.
pub fn extract_archive(archive_path: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Result<()> {
    let archive_path = archive_path.as_ref();
    let out_dir = out_dir.as_ref();

    let archive = PffArchive::parse_file(archive_path)?;
    let mut manifest = ArchiveManifest::default();

    for (index, level) in archive.levels.iter().enumerate() {
        let relative = format!("levels/{index:03}.tiles");
        let grid: Vec<u8> = level.tiles.iter().map(|tile| tile.0).collect();
        write_file(out_dir, &relative, &grid)?;
        manifest.levels.push(LevelEntry {
            tiles: relative,
            spawn_indices: level.spawn_indices.clone(),
        });
    }

    for spawn in &archive.spawns {
        manifest.spawns.push(SpawnEntry {
            id: spawn.id.clone(),
            replacement: spawn.replacement.0,
            marker: spawn.marker.0,
            x: spawn.position.x,
            y: spawn.position.y,
            category: spawn.category,
        });
    }

    for (index, texture) in archive.textures.iter().enumerate() {
        let relative = format!("textures/{index:03}.bin");
        write_file(out_dir, &relative, &texture.data)?;
        manifest.textures.push(relative);
    }

    for (index, sound) in archive.sounds.iter().enumerate() {
        let relative = format!("sounds/{index:03}.{}", sound.codec.extension());
        write_file(out_dir, &relative, &sound.data)?;
        manifest.sounds.push(SoundManifestEntry {
            file: relative,
            codec: codec_name(sound.codec).to_string(),
            level_index: sound.level_index,
        });
    }

    for (index, script) in archive.scripts.iter().enumerate() {
        let relative = format!("scripts/{index:03}.{}", script.kind.extension());
        write_file(out_dir, &relative, &script.data)?;
        manifest.scripts.push(ScriptManifestEntry {
            file: relative,
            kind: kind_name(script.kind).to_string(),
        });
    }

    let manifest_json = serde_json::to_vec_pretty(&manifest)?;
    write_file(out_dir, MANIFEST_FILE, &manifest_json)?;

    info!(
        archive = %archive_path.display(),
        out = %out_dir.display(),
        levels = manifest.levels.len(),
        spawns = manifest.spawns.len(),
        textures = manifest.textures.len(),
        sounds = manifest.sounds.len(),
        scripts = manifest.scripts.len(),
        "archive extracted"
    );
    Ok(())
}

fn write_file(out_dir: &Path, relative: &str, bytes: &[u8]) -> Result<()> {
    let path = out_dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::WriteIo {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, bytes).map_err(|source| StorageError::WriteIo { path, source })
}
