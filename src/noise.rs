//! Fractal height sampler shared by island generation and noise-map export.
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Octave layout for the fractal sum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Number of noise layers to combine; more = more detail.
    pub octaves: u32,
    /// Frequency of the first octave, in cycles per patch.
    pub base_frequency: f64,
    /// Frequency multiplier applied per octave.
    pub lacunarity: f64,
    /// Amplitude multiplier applied per octave.
    pub persistence: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            base_frequency: 4.0,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

/// Fractional Brownian Motion over 2-D Perlin noise.
///
/// The raw sum is returned unnormalised: with the default octave layout it lies
/// roughly in `[-1.9, 1.9]`.  Island shaping masks and scales it afterwards, so
/// nothing is clamped here.
pub struct HeightSampler {
    perlin: Perlin,
    params: NoiseParams,
}

impl HeightSampler {
    pub fn new(seed: u32, params: NoiseParams) -> Self {
        Self {
            perlin: Perlin::new(seed),
            params,
        }
    }

    /// Samples the fractal sum at normalised patch coordinates.
    ///
    /// * `nx, nz`: position relative to the patch centre, divided by patch size.
    pub fn sample(&self, nx: f64, nz: f64) -> f32 {
        fbm(&self.perlin, nx, nz, &self.params)
    }
}

/// Sums `params.octaves` layers of noise, each at `lacunarity` times the previous
/// frequency and `persistence` times the previous amplitude.
pub fn fbm(noise: &Perlin, x: f64, z: f64, params: &NoiseParams) -> f32 {
    let mut value = 0.0f64;
    let mut amplitude = 1.0f64;
    let mut frequency = params.base_frequency;

    for _ in 0..params.octaves {
        value += noise.get([x * frequency, z * frequency]) * amplitude;
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }
    value as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_height() {
        let a = HeightSampler::new(42, NoiseParams::default());
        let b = HeightSampler::new(42, NoiseParams::default());
        for &(x, z) in &[(0.013, -0.2), (0.31, 0.44), (-0.49, 0.07)] {
            assert_eq!(a.sample(x, z), b.sample(x, z));
            assert_eq!(a.sample(x, z), a.sample(x, z));
        }
    }

    #[test]
    fn neighbouring_samples_are_close() {
        let s = HeightSampler::new(7, NoiseParams::default());
        let step = 1.0 / 2048.0;
        let mut x = -0.5;
        while x < 0.5 {
            let d = (s.sample(x, 0.1) - s.sample(x + step, 0.1)).abs();
            assert!(d < 0.1, "jump of {d} at x={x}");
            x += step;
        }
    }

    #[test]
    fn octaves_add_detail() {
        let one = NoiseParams {
            octaves: 1,
            ..NoiseParams::default()
        };
        let s1 = HeightSampler::new(3, one);
        let s4 = HeightSampler::new(3, NoiseParams::default());
        let differs = (0..64)
            .map(|i| i as f64 / 64.0 - 0.5)
            .any(|x| (s1.sample(x, 0.27) - s4.sample(x, 0.27)).abs() > 1e-4);
        assert!(differs);
    }
}
