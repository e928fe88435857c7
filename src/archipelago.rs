//! Main island plus randomly placed satellites.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{ArchipelagoConfig, TerrainConfig};
use crate::generation::{Island, generate_island};

/// Where one satellite goes, before any terrain is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SatellitePlacement {
    /// Polar angle around the main island, radians in `[0, 2π)`.
    pub angle: f32,
    /// Distance from the main island centre.
    pub distance: f32,
    /// Size relative to the main island.
    pub size_factor: f32,
    pub seed: u32,
}

impl SatellitePlacement {
    pub fn offset(&self) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.distance,
            0.0,
            self.angle.sin() * self.distance,
        )
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Archipelago {
    pub seed: u32,
    pub placements: Vec<SatellitePlacement>,
    /// Main island first, satellites after in placement order.
    pub islands: Vec<Island>,
}

impl Archipelago {
    pub fn main_island(&self) -> &Island {
        &self.islands[0]
    }

    pub fn satellites(&self) -> &[Island] {
        &self.islands[1..]
    }

    /// Highest terrain under world `(x, z)` across all islands.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.islands
            .iter()
            .filter_map(|island| island.height_at(x, z))
            .reduce(f32::max)
    }

    /// First terrain surface hit by a ray cast straight down from `(x, from_y, z)`.
    pub fn raycast_down(&self, x: f32, from_y: f32, z: f32) -> Option<f32> {
        self.islands
            .iter()
            .filter_map(|island| island.raycast_down(x, from_y, z))
            .reduce(f32::max)
    }

    /// Top of the footprint box containing `(x, z)`, if any.
    pub fn footprint_top(&self, x: f32, z: f32) -> Option<f32> {
        self.islands
            .iter()
            .map(|island| island.bounds())
            .filter(|(min, max)| x >= min.x && x <= max.x && z >= min.z && z <= max.z)
            .map(|(_, max)| max.y)
            .reduce(f32::max)
    }

    /// Square `(min_x, min_z, max_x, max_z)` covering every island.
    pub fn extent(&self) -> (f32, f32, f32, f32) {
        self.islands.iter().map(|i| i.bounds()).fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(ax, az, bx, bz), (min, max)| (ax.min(min.x), az.min(min.z), bx.max(max.x), bz.max(max.z)),
        )
    }
}

/// Draws satellite count, sizes and polar offsets.
///
/// Satellite `i` of `N` sits in sector `i`: its angle is `i * 2π/N` plus a
/// jitter of at most `angle_jitter / 2` sectors either way.
pub fn place_satellites(
    cfg: &ArchipelagoConfig,
    main_size: f32,
    seed: u32,
    rng: &mut impl Rng,
) -> Vec<SatellitePlacement> {
    let count = rng.gen_range(0..=cfg.max_satellites);
    if count == 0 {
        return Vec::new();
    }
    let sector = TAU / count as f32;
    let half_jitter = cfg.angle_jitter * 0.5;

    (0..count)
        .map(|i| {
            let jitter = if half_jitter > 0.0 {
                rng.gen_range(-half_jitter..=half_jitter) * sector
            } else {
                0.0
            };
            let angle = (i as f32 * sector + jitter).rem_euclid(TAU);
            SatellitePlacement {
                angle,
                distance: main_size * rng.gen_range(cfg.min_distance..=cfg.max_distance),
                size_factor: rng.gen_range(cfg.min_size_factor..=cfg.max_size_factor),
                seed: seed.wrapping_add(i + 1),
            }
        })
        .collect()
}

/// Generates the main island at the origin and its satellites.
pub fn generate_archipelago(
    terrain: &TerrainConfig,
    cfg: &ArchipelagoConfig,
    seed: u32,
) -> Archipelago {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
    let placements = place_satellites(cfg, terrain.size, seed, &mut rng);

    let mut islands = Vec::with_capacity(placements.len() + 1);
    islands.push(generate_island(terrain, seed, Vec3::ZERO));
    for p in &placements {
        let scaled = terrain.scaled(p.size_factor);
        islands.push(generate_island(&scaled, p.seed, p.offset()));
    }

    log::info!(
        "archipelago seed={seed}: main island + {} satellite(s)",
        placements.len()
    );
    Archipelago {
        seed,
        placements,
        islands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angular_distance(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn satellites_partition_the_circle() {
        let cfg = ArchipelagoConfig::default();
        for seed in 0..64u32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
            let placements = place_satellites(&cfg, 50.0, seed, &mut rng);
            assert!(placements.len() <= 3);
            let n = placements.len();
            for (i, p) in placements.iter().enumerate() {
                let sector = TAU / n as f32;
                let nominal = i as f32 * sector;
                let bound = cfg.angle_jitter * 0.5 * sector + 1e-4;
                assert!(
                    angular_distance(p.angle, nominal) <= bound,
                    "seed {seed}: satellite {i} at {} strays from {nominal}",
                    p.angle
                );
                assert!((0.15..=0.40).contains(&p.size_factor));
                assert!((0.55 * 50.0..=0.8 * 50.0).contains(&p.distance));
                assert_eq!(p.seed, seed + i as u32 + 1);
            }
        }
    }

    #[test]
    fn no_jitter_means_even_spacing() {
        let cfg = ArchipelagoConfig {
            angle_jitter: 0.0,
            ..ArchipelagoConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let placements = place_satellites(&cfg, 50.0, 9, &mut rng);
        for (i, p) in placements.iter().enumerate() {
            let expected = i as f32 * TAU / placements.len() as f32;
            assert!((p.angle - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_satellites_allowed() {
        let cfg = ArchipelagoConfig {
            max_satellites: 0,
            ..ArchipelagoConfig::default()
        };
        let terrain = TerrainConfig {
            resolution: 16,
            ..TerrainConfig::default()
        };
        let arch = generate_archipelago(&terrain, &cfg, 3);
        assert_eq!(arch.islands.len(), 1);
        assert!(arch.satellites().is_empty());
    }

    #[test]
    fn deterministic_for_seed() {
        let terrain = TerrainConfig {
            resolution: 16,
            ..TerrainConfig::default()
        };
        let cfg = ArchipelagoConfig::default();
        let a = generate_archipelago(&terrain, &cfg, 77);
        let b = generate_archipelago(&terrain, &cfg, 77);
        assert_eq!(a.placements, b.placements);
        assert_eq!(a.islands.len(), b.islands.len());
        for (x, y) in a.islands.iter().zip(&b.islands) {
            assert_eq!(x.heightfield, y.heightfield);
        }
    }

    #[test]
    fn footprint_top_is_highest_covering_box() {
        let terrain = TerrainConfig {
            resolution: 16,
            ..TerrainConfig::default()
        };
        let cfg = ArchipelagoConfig::default();
        let arch = (0..32)
            .map(|s| generate_archipelago(&terrain, &cfg, s))
            .find(|a| !a.satellites().is_empty())
            .expect("some seed yields satellites");

        let main_top = arch.main_island().bounds().1.y;
        assert_eq!(arch.footprint_top(0.0, 0.0), Some(main_top));

        let sat = &arch.satellites()[0];
        let top = arch.footprint_top(sat.offset.x, sat.offset.z).unwrap();
        assert!(top >= sat.bounds().1.y);

        let (_, _, max_x, max_z) = arch.extent();
        assert_eq!(arch.footprint_top(max_x + 1.0, max_z + 1.0), None);
    }

    #[test]
    fn satellites_are_smaller_and_offset() {
        let terrain = TerrainConfig::default();
        let cfg = ArchipelagoConfig::default();
        let arch = (0..32)
            .map(|s| generate_archipelago(&terrain, &cfg, s))
            .find(|a| !a.satellites().is_empty())
            .expect("some seed yields satellites");
        for sat in arch.satellites() {
            assert!(sat.config.size < terrain.size * 0.41);
            assert!(sat.offset.length() > terrain.size * 0.5);
        }
    }
}
