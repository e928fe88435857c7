//! Height bands and their colours.
//!
//! This module owns the [`Band`] type and the height → band lookup:
//!  - [`Band`]: the enum itself (colour, name, sort order).
//!  - [`BandTable`]: ascending upper bounds over the normalised height ratio.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ── Band type ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// At or below sea level; only used by the top-down exports.
    Water,
    Sand,
    Grass,
    /// Dark grass on the upper slopes.
    Forest,
    /// Peaks and bare rock.
    Rock,
}

impl Band {
    /// Canonical RGB colour shared by the mesh builder and every export backend.
    pub fn color(self) -> [u8; 3] {
        match self {
            Band::Water => [0x00, 0x69, 0x94],
            Band::Sand => [0xC2, 0xB2, 0x80],
            Band::Grass => [0x3A, 0x9B, 0x3A],
            Band::Forest => [0x2D, 0x7A, 0x2D],
            Band::Rock => [0x8B, 0x73, 0x55],
        }
    }

    /// Colour as linear `0..=1` floats, the layout vertex buffers want.
    pub fn color_f32(self) -> [f32; 3] {
        self.color().map(|c| c as f32 / 255.0)
    }

    /// Human-readable name, used in the legend.
    pub fn name(self) -> &'static str {
        match self {
            Band::Water => "Water",
            Band::Sand => "Sand",
            Band::Grass => "Grass",
            Band::Forest => "Forest",
            Band::Rock => "Rock",
        }
    }

    /// Legend sort order (low to high ground).
    pub fn order(self) -> u8 {
        match self {
            Band::Water => 0,
            Band::Sand => 1,
            Band::Grass => 2,
            Band::Forest => 3,
            Band::Rock => 4,
        }
    }
}

// ── Band table ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandStop {
    /// Exclusive upper bound on `height / max_height`.
    pub upper: f32,
    pub band: Band,
}

/// Ordered band lookup.  The first stop whose upper bound exceeds the ratio
/// wins; anything past the last stop gets `catch_all`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub stops: Vec<BandStop>,
    pub catch_all: Band,
}

impl Default for BandTable {
    fn default() -> Self {
        // Sand below 1/15 of the peak, grass to a third, dark grass to two thirds.
        Self {
            stops: vec![
                BandStop {
                    upper: 1.0 / 15.0,
                    band: Band::Sand,
                },
                BandStop {
                    upper: 1.0 / 3.0,
                    band: Band::Grass,
                },
                BandStop {
                    upper: 2.0 / 3.0,
                    band: Band::Forest,
                },
            ],
            catch_all: Band::Rock,
        }
    }
}

impl BandTable {
    pub fn classify(&self, ratio: f32) -> Band {
        self.stops
            .iter()
            .find(|stop| ratio < stop.upper)
            .map_or(self.catch_all, |stop| stop.band)
    }

    /// Classifies an absolute height against the island's peak height.
    pub fn classify_height(&self, height: f32, max_height: f32) -> Band {
        self.classify(height / max_height)
    }

    /// Every band the table can produce, in legend order.
    pub fn bands(&self) -> Vec<Band> {
        let mut out: Vec<Band> = self.stops.iter().map(|s| s.band).collect();
        out.push(self.catch_all);
        out.sort_by_key(|b| b.order());
        out.dedup();
        out
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(pair) = self
            .stops
            .windows(2)
            .find(|pair| !(pair[0].upper < pair[1].upper))
        {
            return Err(Error::InvalidConfig(format!(
                "band bounds must be strictly ascending, got {} then {}",
                pair[0].upper, pair[1].upper
            )));
        }
        Ok(())
    }
}
