//! Island shaping: raw fractal noise → bounded landmass height.

use crate::config::{IslandMask, ShorePolicy, TerrainConfig};

/// Mask value at normalised distance `d` from the patch centre.
pub fn mask_value(mask: IslandMask, d: f32) -> f32 {
    match mask {
        IslandMask::Linear { falloff } => (1.0 - d * falloff).max(0.0),
        IslandMask::Power { falloff, exponent } => (1.0 - d * falloff).max(0.0).powf(exponent),
    }
}

/// Turns one raw noise sample into a world-space height.
///
/// * `raw`: unclamped fBm value at this vertex.
/// * `nx, nz`: vertex position relative to the patch centre, divided by patch size.
///
/// The steps run in a fixed order: mask, plateau, scale, shore, floor.  Every
/// threshold test is a strict `<`, so a value sitting exactly on a threshold is
/// left alone.
pub fn shape_height(raw: f32, nx: f32, nz: f32, cfg: &TerrainConfig) -> f32 {
    let d = (nx * nx + nz * nz).sqrt();
    let mut h = raw * mask_value(cfg.mask, d);

    if let Some(plateau) = cfg.plateau {
        if h > 0.0 && h < plateau.threshold {
            h = plateau.level;
        }
    }

    h *= cfg.max_height;

    let floor = cfg.sea_level - cfg.underwater_allowance;
    h = match cfg.shore {
        ShorePolicy::None => h,
        ShorePolicy::Flatten { threshold, factor } if h < threshold => h * factor,
        ShorePolicy::Cut { threshold } if h < threshold => floor,
        _ => h,
    };

    h.max(floor)
}
