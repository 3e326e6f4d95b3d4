//! Archive packing from an extracted directory tree
//!
//! Packing reads the `manifest.json` in a source directory, pulls each
//! referenced asset file back in, and writes a fresh archive. Validation is
//! strict and happens before any output: a missing asset, a wrong-sized tile
//! grid, or an unknown codec name aborts the pack with nothing written.

use crate::error::{Result, StorageError};
use crate::manifest::{ArchiveManifest, MANIFEST_FILE, parse_codec, parse_kind};
use pff_formats::PffArchiveBuilder;
use pff_formats::pff::{
    AudioRecord, Coord, GRID_TILES, LevelRecord, SpawnRecord, TextureRecord, TileId,
};
use std::fs;
use std::path::Path;
use tracing::info;

/// Build an archive from an extracted directory and write it to `output`
pub fn write_archive(output: impl AsRef<Path>, src_dir: impl AsRef<Path>) -> Result<()> {
    let output = output.as_ref();
    let src_dir = src_dir.as_ref();

    let manifest = read_manifest(src_dir)?;
    let mut builder = PffArchiveBuilder::new();

    for (index, entry) in manifest.levels.iter().enumerate() {
        let grid = read_asset(src_dir, &entry.tiles)?;
        if grid.len() != GRID_TILES {
            return Err(StorageError::BadManifest(format!(
                "level {index} grid file {:?} is {} bytes, expected {GRID_TILES}",
                entry.tiles,
                grid.len()
            )));
        }
        builder = builder.add_level(LevelRecord {
            tiles: grid.into_iter().map(TileId).collect(),
            spawn_indices: entry.spawn_indices.clone(),
        });
    }

    for entry in &manifest.spawns {
        builder = builder.add_spawn(SpawnRecord::new(
            &entry.id,
            TileId(entry.replacement),
            TileId(entry.marker),
            Coord {
                x: entry.x,
                y: entry.y,
            },
            entry.category,
        ));
    }

    for relative in &manifest.textures {
        builder = builder.add_texture(TextureRecord::new(read_asset(src_dir, relative)?));
    }

    for entry in &manifest.sounds {
        let codec = parse_codec(&entry.codec)?;
        let data = read_asset(src_dir, &entry.file)?;
        builder = builder.add_sound(AudioRecord::for_level(codec, entry.level_index, data));
    }

    for entry in &manifest.scripts {
        let kind = parse_kind(&entry.kind)?;
        let data = read_asset(src_dir, &entry.file)?;
        builder = builder.add_script_blob(kind, data)?;
    }

    let archive = builder.build()?;
    let bytes = archive.build()?;
    fs::write(output, &bytes).map_err(|source| StorageError::WriteIo {
        path: output.to_path_buf(),
        source,
    })?;

    info!(
        output = %output.display(),
        source = %src_dir.display(),
        bytes = bytes.len(),
        "archive packed"
    );
    Ok(())
}

fn read_manifest(src_dir: &Path) -> Result<ArchiveManifest> {
    let path = src_dir.join(MANIFEST_FILE);
    let json = fs::read(&path).map_err(|_| StorageError::SourceAssetMissing(path))?;
    Ok(serde_json::from_slice(&json)?)
}

fn read_asset(src_dir: &Path, relative: &str) -> Result<Vec<u8>> {
    let path = src_dir.join(relative);
    fs::read(&path).map_err(|_| StorageError::SourceAssetMissing(path))
}
