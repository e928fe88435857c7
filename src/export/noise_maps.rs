//! Export the intermediate stages of island shaping as false-colour PNGs.
//!
//! The maps produced for one island patch are:
//!
//! | File              | Range           | Description                            |
//! |-------------------|-----------------|----------------------------------------|
//! | noise_raw.png     | [-1, 1]         | Unmasked fBm sample                    |
//! | noise_mask.png    | [ 0, 1]         | Radial island mask                     |
//! | noise_masked.png  | [-1, 1]         | fBm × mask, before plateau and scaling |
//! | noise_height.png  | [ 0, max]       | Final shaped height / max_height       |
//!
//! Colour encoding
//! ───────────────
//! All maps share the same "jet" ramp:
//!   blue (low) → cyan → green → yellow → red (high)
//!
//! Signed maps are rescaled so that 0.0 → green, -1.0 → blue, +1.0 → red.
//! Unsigned maps are rescaled so that 0.0 → blue and 1.0 → red.
use std::path::Path;

use image::{Rgb, RgbImage};

use crate::config::TerrainConfig;
use crate::error::Result;
use crate::generation::patch_coords;
use crate::island::{mask_value, shape_height};
use crate::noise::HeightSampler;

// ── Colour map ────────────────────────────────────────────────────────────────

/// "Jet" ramp: blue → cyan → green → yellow → red.
/// `t` ∈ [0.0, 1.0].
fn jet(t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let r = (1.5 - (4.0 * t - 3.0).abs()).clamp(0.0, 1.0);
    let g = (1.5 - (4.0 * t - 2.0).abs()).clamp(0.0, 1.0);
    let b = (1.5 - (4.0 * t - 1.0).abs()).clamp(0.0, 1.0);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

#[inline]
fn diverge(v: f32) -> [u8; 3] {
    jet((v.clamp(-1.0, 1.0) + 1.0) * 0.5)
}

#[inline]
fn sequential(v: f32) -> [u8; 3] {
    jet(v.clamp(0.0, 1.0))
}

// ── PNG writer ────────────────────────────────────────────────────────────────

/// Writes a row-major `n × n` grid to `path` through `colorize`.
fn save_map(data: &[f32], n: u32, path: &Path, colorize: impl Fn(f32) -> [u8; 3]) -> Result<()> {
    let img = RgbImage::from_fn(n, n, |x, y| Rgb(colorize(data[(y * n + x) as usize])));
    img.save(path)?;
    log::info!("[noise] wrote {}", path.display());
    Ok(())
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Re-samples the main island of `seed` stage by stage and writes each stage
/// into `dir/`.  Uses the same sampler and shaping as generation, so the last
/// map matches the exported heightfield.
pub fn export_noise_maps(cfg: &TerrainConfig, seed: u32, dir: &Path) -> Result<()> {
    let sampler = HeightSampler::new(seed, cfg.noise);
    let n = cfg.resolution;

    let mut raw_buf = Vec::with_capacity(n * n);
    let mut mask_buf = Vec::with_capacity(n * n);
    let mut masked_buf = Vec::with_capacity(n * n);
    let mut height_buf = Vec::with_capacity(n * n);

    for (nx, nz) in patch_coords(cfg) {
        let raw = sampler.sample(nx as f64, nz as f64);
        let mask = mask_value(cfg.mask, (nx * nx + nz * nz).sqrt());

        raw_buf.push(raw);
        mask_buf.push(mask);
        masked_buf.push(raw * mask);
        height_buf.push(shape_height(raw, nx, nz, cfg) / cfg.max_height);
    }

    let n = n as u32;
    save_map(&raw_buf, n, &dir.join("noise_raw.png"), diverge)?;
    save_map(&mask_buf, n, &dir.join("noise_mask.png"), sequential)?;
    save_map(&masked_buf, n, &dir.join("noise_masked.png"), diverge)?;
    save_map(&height_buf, n, &dir.join("noise_height.png"), sequential)?;
    Ok(())
}
