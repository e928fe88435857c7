use std::collections::HashSet;
use std::path::Path;

use font8x8::UnicodeFonts;
use image::{Rgb, RgbImage};

use crate::archipelago::Archipelago;
use crate::bands::Band;
use crate::error::Result;

use super::surface_at;

// Contour lines are drawn wherever a pixel and a neighbour fall in different height steps.
const CONTOUR_STEP: f32 = 1.5;
// Fraction to darken a pixel by when it sits on a contour line (0.0 = no change, 1.0 = black).
const CONTOUR_DARKNESS: f32 = 0.40;
// Sea margin around the archipelago, as a fraction of its extent.
const MARGIN: f32 = 0.05;

/// Top-down view of the archipelago, `pixels` wide.
pub fn export_png(arch: &Archipelago, path: &Path, pixels: u32) -> Result<()> {
    let img = render_map(arch, pixels);
    img.save(path)?;
    log::debug!("wrote {} ({}×{})", path.display(), img.width(), img.height());
    Ok(())
}

fn render_map(arch: &Archipelago, pixels: u32) -> RgbImage {
    let (min_x, min_z, max_x, max_z) = arch.extent();
    let pad = (max_x - min_x).max(max_z - min_z) * MARGIN;
    let (x0, z0) = (min_x - pad, min_z - pad);
    let w = pixels.max(1);
    let scale = (max_x - min_x + 2.0 * pad) / w as f32;
    let h = (((max_z - min_z + 2.0 * pad) / scale).round() as u32).max(1);
    let sea_level = arch.main_island().config.sea_level;

    // Height and band per pixel, row-major; `None` height is open sea.
    let mut heights: Vec<Option<f32>> = Vec::with_capacity((w * h) as usize);
    let mut bands: Vec<Band> = Vec::with_capacity((w * h) as usize);
    for py in 0..h {
        for px in 0..w {
            let x = x0 + (px as f32 + 0.5) * scale;
            let z = z0 + (py as f32 + 0.5) * scale;
            match surface_at(arch, x, z) {
                Some((height, island)) if height > sea_level => {
                    heights.push(Some(height));
                    bands.push(
                        island
                            .config
                            .bands
                            .classify_height(height, island.config.max_height),
                    );
                }
                _ => {
                    heights.push(None);
                    bands.push(Band::Water);
                }
            }
        }
    }

    let level = |v: Option<f32>| v.map_or(-1, |e| (e / CONTOUR_STEP).floor() as i32);
    let at = |x: i64, y: i64| -> Option<Option<f32>> {
        (x >= 0 && y >= 0 && x < w as i64 && y < h as i64).then(|| heights[(y * w as i64 + x) as usize])
    };

    let mut img = RgbImage::new(w, h);
    for py in 0..h {
        for px in 0..w {
            let idx = (py * w + px) as usize;
            let mut color = bands[idx].color();
            let e = heights[idx];
            let (x, y) = (px as i64, py as i64);

            let is_contour = e.is_some()
                && [at(x - 1, y), at(x + 1, y), at(x, y - 1), at(x, y + 1)]
                    .into_iter()
                    .flatten()
                    .any(|ne| level(ne) != level(e));

            if is_contour {
                color = color.map(|c| (c as f32 * (1.0 - CONTOUR_DARKNESS)) as u8);
            }
            img.put_pixel(px, py, Rgb(color));
        }
    }
    img
}

// ── Legend PNG ────────────────────────────────────────────────────────────────

/// Scale factor for the bitmap font (each logical pixel becomes `SCALE` screen pixels).
const FONT_SCALE: u32 = 2;
const CHAR_W: u32 = 8 * FONT_SCALE;
const CHAR_H: u32 = 8 * FONT_SCALE;

/// Draw a single character at (x, y) using the 8×8 bitmap font.
fn draw_char(img: &mut RgbImage, c: char, x: u32, y: u32, color: [u8; 3]) {
    let Some(glyph) = font8x8::BASIC_FONTS.get(c) else {
        return;
    };
    for (row, &byte) in glyph.iter().enumerate() {
        for col in 0u32..8 {
            if byte & (1 << col) == 0 {
                continue;
            }
            fill_rect(
                img,
                x + col * FONT_SCALE,
                y + row as u32 * FONT_SCALE,
                FONT_SCALE,
                FONT_SCALE,
                color,
            );
        }
    }
}

fn draw_str(img: &mut RgbImage, s: &str, x: u32, y: u32, color: [u8; 3]) {
    for (i, c) in s.chars().enumerate() {
        draw_char(img, c, x + i as u32 * CHAR_W, y, color);
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    for dy in 0..h {
        for dx in 0..w {
            let (px, py) = (x + dx, y + dy);
            if px < img.width() && py < img.height() {
                img.put_pixel(px, py, Rgb(color));
            }
        }
    }
}

/// Draw a 1-pixel border around a rectangle.
fn outline_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    fill_rect(img, x, y, w, 1, color);
    fill_rect(img, x, y + h - 1, w, 1, color);
    fill_rect(img, x, y, 1, h, color);
    fill_rect(img, x + w - 1, y, 1, h, color);
}

/// Bands present on the map, in legend order.
fn bands_present(arch: &Archipelago) -> Vec<Band> {
    let mut seen = HashSet::new();
    let mut bands = vec![Band::Water];
    seen.insert(Band::Water);
    for island in &arch.islands {
        let cfg = &island.config;
        for &h in &island.heightfield.heights {
            if h > cfg.sea_level {
                let band = cfg.bands.classify_height(h, cfg.max_height);
                if seen.insert(band) {
                    bands.push(band);
                }
            }
        }
    }
    bands.sort_by_key(|b| b.order());
    bands
}

/// Legend listing the archipelago's metadata and every band on the map.
pub fn export_legend_png(arch: &Archipelago, path: &Path) -> Result<()> {
    let bands = bands_present(arch);
    let main = arch.main_island();
    let land = main.land_fraction() * 100.0;
    let peak = arch
        .islands
        .iter()
        .map(|i| i.heightfield.max_height() + i.offset.y)
        .fold(f32::MIN, f32::max);

    let meta: &[(&str, String)] = &[
        ("Seed", arch.seed.to_string()),
        ("Islands", arch.islands.len().to_string()),
        ("Size", format!("{:.0}", main.config.size)),
        ("Peak", format!("{peak:.2}")),
        ("Land", format!("{land:.1}%")),
    ];

    // ── Layout constants ──────────────────────────────────────────────────────
    const PAD: u32 = 14;
    const SWATCH_W: u32 = 48;
    const SWATCH_H: u32 = CHAR_H;
    const SWATCH_GAP: u32 = 8;
    const ROW_H: u32 = SWATCH_H + 6;
    const META_ROW_H: u32 = CHAR_H + 5;
    // Space added before and after each horizontal divider line.
    const SECTION_GAP: u32 = 8;

    let title = "ISLAND LEGEND";
    let max_band_len = bands.iter().map(|b| b.name().len()).max().unwrap_or(0) as u32;
    let band_col_w = SWATCH_W + SWATCH_GAP + max_band_len * CHAR_W;

    // Values align at a fixed column (longest key + ": ").
    let key_col_chars = meta.iter().map(|(k, _)| k.len()).max().unwrap_or(0) as u32 + 2;
    let max_val_len = meta.iter().map(|(_, v)| v.len()).max().unwrap_or(0) as u32;
    let meta_col_w = (key_col_chars + max_val_len) * CHAR_W;

    let content_w = band_col_w.max(meta_col_w).max(title.len() as u32 * CHAR_W);
    let img_w = PAD + content_w + PAD;

    let divider_block_h = SECTION_GAP + 1 + SECTION_GAP;
    let img_h = PAD
        + CHAR_H
        + divider_block_h
        + meta.len() as u32 * META_ROW_H
        + divider_block_h
        + bands.len() as u32 * ROW_H
        + PAD;

    const BG: [u8; 3] = [22, 22, 35];
    const TITLE_COLOR: [u8; 3] = [240, 240, 240];
    const KEY_COLOR: [u8; 3] = [140, 155, 190];
    const VAL_COLOR: [u8; 3] = [220, 225, 240];
    const TEXT_COLOR: [u8; 3] = [210, 210, 210];
    const BORDER_COLOR: [u8; 3] = [80, 80, 100];
    const DIVIDER_COLOR: [u8; 3] = [55, 60, 88];

    let mut img = RgbImage::from_pixel(img_w, img_h, Rgb(BG));

    let title_x = img_w.saturating_sub(title.len() as u32 * CHAR_W) / 2;
    draw_str(&mut img, title, title_x, PAD, TITLE_COLOR);
    let mut y = PAD + CHAR_H;

    let divider_w = img_w.saturating_sub(2 * PAD);

    y += SECTION_GAP;
    fill_rect(&mut img, PAD, y, divider_w, 1, DIVIDER_COLOR);
    y += 1 + SECTION_GAP;

    let val_x = PAD + key_col_chars * CHAR_W;
    for (key, val) in meta {
        draw_str(&mut img, &format!("{key}: "), PAD, y, KEY_COLOR);
        draw_str(&mut img, val, val_x, y, VAL_COLOR);
        y += META_ROW_H;
    }

    y += SECTION_GAP;
    fill_rect(&mut img, PAD, y, divider_w, 1, DIVIDER_COLOR);
    y += 1 + SECTION_GAP;

    for band in &bands {
        fill_rect(&mut img, PAD, y, SWATCH_W, SWATCH_H, band.color());
        outline_rect(&mut img, PAD, y, SWATCH_W, SWATCH_H, BORDER_COLOR);
        draw_str(&mut img, band.name(), PAD + SWATCH_W + SWATCH_GAP, y, TEXT_COLOR);
        y += ROW_H;
    }

    img.save(path)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archipelago::generate_archipelago;
    use crate::config::{ArchipelagoConfig, TerrainConfig};

    fn lone_island() -> Archipelago {
        let cfg = ArchipelagoConfig {
            max_satellites: 0,
            ..ArchipelagoConfig::default()
        };
        generate_archipelago(&TerrainConfig::default(), &cfg, 11)
    }

    #[test]
    fn map_is_square_for_a_single_island() {
        let img = render_map(&lone_island(), 128);
        assert_eq!(img.dimensions(), (128, 128));
        assert_eq!(*img.get_pixel(0, 0), Rgb(Band::Water.color()));
    }

    #[test]
    fn legend_starts_with_water() {
        let bands = bands_present(&lone_island());
        assert_eq!(bands[0], Band::Water);
        assert!(bands.windows(2).all(|w| w[0].order() < w[1].order()));
    }
}
