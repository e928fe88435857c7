use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::archipelago::Archipelago;
use crate::error::Result;

/// Writes seed, satellite placements and every island's config and heights.
pub fn export_json(arch: &Archipelago, path: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, arch)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
