//! Inspect command implementation

use anyhow::Context;
use comfy_table::{Attribute, Cell, ContentArrangement, Table, presets::UTF8_FULL};
use pff_formats::PffArchive;
use pff_formats::pff::{GRID_TILES, spawn::SPAWN_WIRE_SIZE};
use std::path::Path;

/// Print a summary of an archive's contents
pub fn handle(archive_path: &Path) -> anyhow::Result<()> {
    let archive = PffArchive::parse_file(archive_path)
        .with_context(|| format!("failed to read {}", archive_path.display()))?;

    println!("Archive: {}", archive_path.display());
    println!("Bulk payload: {} bytes", archive.payload_bytes());
    println!();

    let mut summary = create_table();
    summary.set_header(vec![
        header_cell("Category"),
        header_cell("Records"),
        header_cell("Bytes"),
    ]);
    summary.add_row(vec![
        Cell::new("Levels"),
        Cell::new(archive.levels.len()),
        Cell::new(level_bytes(&archive)),
    ]);
    summary.add_row(vec![
        Cell::new("Spawns"),
        Cell::new(archive.spawns.len()),
        Cell::new(archive.spawns.len() * SPAWN_WIRE_SIZE),
    ]);
    summary.add_row(vec![
        Cell::new("Textures"),
        Cell::new(archive.textures.len()),
        Cell::new(archive.textures.iter().map(|t| t.data.len()).sum::<usize>()),
    ]);
    summary.add_row(vec![
        Cell::new("Sounds"),
        Cell::new(archive.sounds.len()),
        Cell::new(archive.sounds.iter().map(|s| s.data.len()).sum::<usize>()),
    ]);
    summary.add_row(vec![
        Cell::new("Scripts"),
        Cell::new(archive.scripts.len()),
        Cell::new(archive.scripts.iter().map(|s| s.data.len()).sum::<usize>()),
    ]);
    println!("{summary}");

    if !archive.sounds.is_empty() {
        println!();
        let mut sounds = create_table();
        sounds.set_header(vec![
            header_cell("Sound"),
            header_cell("Codec"),
            header_cell("Level"),
            header_cell("Bytes"),
        ]);
        for (index, sound) in archive.sounds.iter().enumerate() {
            let level = sound
                .level()
                .map_or_else(|| "global".to_string(), |level| level.to_string());
            sounds.add_row(vec![
                Cell::new(index),
                Cell::new(sound.codec.extension()),
                Cell::new(level),
                Cell::new(sound.data.len()),
            ]);
        }
        println!("{sounds}");
    }

    if !archive.scripts.is_empty() {
        println!();
        let mut scripts = create_table();
        scripts.set_header(vec![
            header_cell("Script"),
            header_cell("Kind"),
            header_cell("Bytes"),
            header_cell("Exports"),
        ]);
        for (index, script) in archive.scripts.iter().enumerate() {
            scripts.add_row(vec![
                Cell::new(index),
                Cell::new(script.kind.extension()),
                Cell::new(script.data.len()),
                Cell::new(script.exports.join(", ")),
            ]);
        }
        println!("{scripts}");
    }

    Ok(())
}

fn level_bytes(archive: &PffArchive) -> usize {
    archive
        .levels
        .iter()
        .map(|level| GRID_TILES + 2 + 2 * level.spawn_indices.len())
        .sum()
}

fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}
