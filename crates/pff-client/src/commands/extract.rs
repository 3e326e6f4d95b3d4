//! Extract command implementation

use anyhow::Context;
use pff_storage::extract_archive;
use std::path::Path;

/// Extract `archive` into the `output` directory
pub fn handle(archive: &Path, output: &Path) -> anyhow::Result<()> {
    extract_archive(archive, output)
        .with_context(|| format!("failed to extract {}", archive.display()))?;
    println!("Extracted {} to {}", archive.display(), output.display());
    Ok(())
}
