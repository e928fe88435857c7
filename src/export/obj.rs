//! Wavefront OBJ with per-vertex colours (`v x y z r g b`).
//!
//! Every island becomes one `o` group in world space; face indices are 1-based
//! and run across the whole file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::archipelago::Archipelago;
use crate::error::Result;

pub fn write_obj(arch: &Archipelago, mut out: impl Write) -> io::Result<()> {
    let vertices: usize = arch.islands.iter().map(|i| i.mesh.vertex_count()).sum();
    let faces: usize = arch.islands.iter().map(|i| i.mesh.triangle_count()).sum();
    writeln!(out, "# archipelago seed {}", arch.seed)?;
    writeln!(out, "# vertices: {vertices}")?;
    writeln!(out, "# faces: {faces}")?;

    let mut base = 1u32;
    for (k, island) in arch.islands.iter().enumerate() {
        writeln!(out, "\no island_{k}")?;
        let o = island.offset;
        for (p, c) in island.mesh.positions.iter().zip(&island.mesh.colors) {
            writeln!(
                out,
                "v {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
                p[0] + o.x,
                p[1] + o.y,
                p[2] + o.z,
                c[0],
                c[1],
                c[2]
            )?;
        }
        for tri in island.mesh.indices.chunks_exact(3) {
            writeln!(out, "f {} {} {}", tri[0] + base, tri[1] + base, tri[2] + base)?;
        }
        base += island.mesh.vertex_count() as u32;
    }
    Ok(())
}

pub fn export_obj(arch: &Archipelago, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_obj(arch, &mut writer)?;
    writer.flush()?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
