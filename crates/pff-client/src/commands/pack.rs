//! Pack command implementation

use anyhow::Context;
use pff_storage::write_archive;
use std::path::Path;

/// Pack the extracted tree at `source` into an archive at `output`
pub fn handle(source: &Path, output: &Path) -> anyhow::Result<()> {
    write_archive(output, source)
        .with_context(|| format!("failed to pack {}", source.display()))?;
    println!("Packed {} into {}", source.display(), output.display());
    Ok(())
}
