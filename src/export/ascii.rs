//! Terminal preview of an archipelago.

use std::fmt;

use crate::archipelago::Archipelago;

use super::surface_at;

/// Height ratio upper bounds for `.`, `░`, `▒`, `▓`; anything higher is `█`.
const STEPS: [(f32, char); 4] = [(0.05, '.'), (0.15, '░'), (0.30, '▒'), (0.45, '▓')];

/// Character grid plus the statistics printed under it.
pub struct Preview {
    pub rows: Vec<String>,
    pub cells: usize,
    pub water_cells: usize,
    pub sea_level: f32,
    pub max_height: f32,
    pub islands: usize,
}

impl Preview {
    pub fn land_cells(&self) -> usize {
        self.cells - self.water_cells
    }
}

fn glyph(height: f32, sea_level: f32, max_height: f32) -> char {
    if height <= sea_level {
        return '~';
    }
    let ratio = (height - sea_level) / max_height;
    STEPS
        .iter()
        .find(|(upper, _)| ratio <= *upper)
        .map_or('█', |&(_, c)| c)
}

/// Samples the archipelago on a `width`-column grid.  Rows are half as dense
/// as columns since terminal cells are about twice as tall as wide.
pub fn preview(arch: &Archipelago, width: usize) -> Preview {
    let (min_x, min_z, max_x, max_z) = arch.extent();
    let width = width.max(2);
    let span = (max_x - min_x).max(max_z - min_z);
    let step = span / width as f32;
    let rows_n = ((max_z - min_z) / (step * 2.0)).ceil().max(1.0) as usize;
    let cols_n = ((max_x - min_x) / step).ceil().max(1.0) as usize;
    let sea_level = arch.main_island().config.sea_level;

    let mut water_cells = 0;
    let mut max_height = f32::MIN;
    let mut rows = Vec::with_capacity(rows_n);
    for r in 0..rows_n {
        let z = min_z + (r as f32 + 0.5) * step * 2.0;
        let mut line = String::with_capacity(cols_n);
        for c in 0..cols_n {
            let x = min_x + (c as f32 + 0.5) * step;
            let ch = match surface_at(arch, x, z) {
                Some((h, island)) => {
                    max_height = max_height.max(h);
                    glyph(h, sea_level, island.config.max_height)
                }
                None => '~',
            };
            if ch == '~' {
                water_cells += 1;
            }
            line.push(ch);
        }
        rows.push(line);
    }

    Preview {
        cells: rows_n * cols_n,
        rows,
        water_cells,
        sea_level,
        max_height: max_height.max(sea_level),
        islands: arch.islands.len(),
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "█ high mountain | ▓ mountain | ▒ hills | ░ low land | . beach | ~ water")?;
        writeln!(f)?;
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        let pct = |n: usize| 100.0 * n as f32 / self.cells.max(1) as f32;
        writeln!(f)?;
        writeln!(f, "Islands:    {}", self.islands)?;
        writeln!(f, "Cells:      {}", self.cells)?;
        writeln!(f, "Water:      {} ({:.1}%)", self.water_cells, pct(self.water_cells))?;
        writeln!(f, "Land:       {} ({:.1}%)", self.land_cells(), pct(self.land_cells()))?;
        writeln!(f, "Sea level:  {:.2}", self.sea_level)?;
        write!(f, "Max height: {:.3}", self.max_height)
    }
}
