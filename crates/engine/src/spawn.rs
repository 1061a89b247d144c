//! Collectible spawn points.
//!
//! One burst per spawn interval, gated on whole seconds of session time:
//! the burst fires on the first tick of a second divisible by the interval
//! and re-arms one second later.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SpawnConfig;
use crate::position::SphericalPosition;

#[derive(Debug, Clone)]
pub struct PositionGenerator {
    rng: StdRng,
    interval: u64,
    range: Vec3,
    offset: Vec3,
    models: u32,
    spawned_this_interval: bool,
}

impl PositionGenerator {
    pub fn new(config: &SpawnConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            interval: u64::from(config.interval_secs.max(1)),
            range: Vec3::from_array(config.range).abs(),
            offset: Vec3::from_array(config.offset),
            models: config.models.max(1),
            spawned_this_interval: false,
        }
    }

    /// Whether a burst is due at `elapsed` seconds. Returns true at most
    /// once per interval.
    pub fn should_spawn(&mut self, elapsed: f32) -> bool {
        let second = elapsed.max(0.0).floor() as u64;
        match second % self.interval {
            0 if !self.spawned_this_interval => {
                self.spawned_this_interval = true;
                true
            }
            1 => {
                self.spawned_this_interval = false;
                false
            }
            _ => false,
        }
    }

    /// Raw spawn point: each axis uniform in `offset ± range` for that axis.
    pub fn sample_point(&mut self) -> Vec3 {
        let r = self.range;
        self.offset
            + Vec3::new(
                self.rng.random_range(-r.x..=r.x),
                self.rng.random_range(-r.y..=r.y),
                self.rng.random_range(-r.z..=r.z),
            )
    }

    /// Spawn point projected onto the sphere.
    pub fn generate(&mut self) -> SphericalPosition {
        SphericalPosition::from_angles(self.sample_point())
    }

    pub fn model_index(&mut self) -> u32 {
        self.rng.random_range(0..self.models)
    }
}
