//! Export backends: PNG map and legend, JSON dump, Wavefront OBJ, ASCII preview
//! and diagnostic noise maps.
pub mod ascii;
pub mod json;
pub mod noise_maps;
pub mod obj;
pub mod png;

pub use ascii::{Preview, preview};
pub use json::export_json;
pub use noise_maps::export_noise_maps;
pub use obj::{export_obj, write_obj};
pub use png::{export_legend_png, export_png};

use crate::archipelago::Archipelago;
use crate::generation::Island;

/// Highest island surface under world `(x, z)`, with the island it belongs to.
pub(crate) fn surface_at(arch: &Archipelago, x: f32, z: f32) -> Option<(f32, &Island)> {
    arch.islands
        .iter()
        .filter_map(|island| island.height_at(x, z).map(|h| (h, island)))
        .max_by(|a, b| a.0.total_cmp(&b.0))
}
