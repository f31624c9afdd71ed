//! # Noise Generator
//!
//! Deterministic 3D gradient noise backing the terrain heightfield. The permutation
//! table is built once from a fixed seed and never reseeded, so every chunk sampled by
//! the same generator sees the same terrain.

use ::noise::{NoiseFn, Perlin};

use crate::config::TerrainConfig;

/// Period of the noise along every axis.
pub const NOISE_PERIOD: f64 = 256.0;

/// Gradient noise sampler with a fixed permutation table.
#[derive(Clone)]
pub struct NoiseGenerator {
    perlin: Perlin,
    seed: u32,
}

impl NoiseGenerator {
    /// Builds the permutation table for `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    /// Seed the permutation table was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples the noise field, returning a value in [-1, 1].
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.perlin.get([x, y, z]).clamp(-1.0, 1.0)
    }

    /// Surface height of the column at world `(x, z)`.
    ///
    /// The 2D heightfield is the `z = 0` slice of the 3D field, mapped linearly
    /// from [-1, 1] onto `[min_height, max_height]`.
    pub fn height_at(&self, world_x: i32, world_z: i32, terrain: &TerrainConfig) -> i32 {
        let sample = self.sample(
            f64::from(world_x) * terrain.noise_scale,
            f64::from(world_z) * terrain.noise_scale,
            0.0,
        );
        let span = f64::from(terrain.max_height - terrain.min_height);
        let height = f64::from(terrain.min_height) + (sample + 1.0) * 0.5 * span;
        (height.floor() as i32).clamp(terrain.min_height, terrain.max_height)
    }
}
