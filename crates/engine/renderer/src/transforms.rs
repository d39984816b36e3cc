//! Per-instance model matrices for the instanced leaf quad
//!
//! The array has a fixed length and is generated once at startup. Instance
//! `i` sits in grid cell `(i mod 10, i div 10, 0)`, gets a random rotation
//! about Z, then Y, then X, and a random uniform XY scale.

use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use glam::{Mat4, Vec3};
use rand::prelude::*;
use tracing::debug;

use crate::device::RenderDevice;

/// Length of the `models` uniform array in the vertex stage
pub const MAX_INSTANCES: usize = 100;

/// Instances per grid row
pub const GRID_WIDTH: usize = 10;

/// Uniform XY scale bounds (Z scale stays 1.0)
pub const SCALE_RANGE: RangeInclusive<f32> = 0.6..=1.6;

/// Fixed array of instance model matrices
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceTransforms {
    models: Vec<Mat4>,
}

impl InstanceTransforms {
    /// Generate all [`MAX_INSTANCES`] transforms from `rng`
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let models = (0..MAX_INSTANCES)
            .map(|i| {
                let cell = Vec3::new((i % GRID_WIDTH) as f32, (i / GRID_WIDTH) as f32, 0.0);
                let rx = rng.random_range(0.0..TAU);
                let ry = rng.random_range(0.0..TAU);
                let rz = rng.random_range(0.0..TAU);
                let scale = rng.random_range(SCALE_RANGE);

                Mat4::from_translation(cell)
                    * Mat4::from_rotation_z(rz)
                    * Mat4::from_rotation_y(ry)
                    * Mat4::from_rotation_x(rx)
                    * Mat4::from_scale(Vec3::new(scale, scale, 1.0))
            })
            .collect();

        Self { models }
    }

    /// Generate from an explicit seed, or from entropy when `seed` is `None` or 0
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed.filter(|&s| s != 0) {
            Some(seed) => {
                debug!("Generating instance transforms with seed {}", seed);
                Self::generate(&mut StdRng::seed_from_u64(seed))
            }
            None => Self::generate(&mut rand::rng()),
        }
    }

    pub fn models(&self) -> &[Mat4] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Upload `models[i]` to the program currently bound on `device`
    pub fn upload<D: RenderDevice>(&self, device: &mut D) {
        for (i, model) in self.models.iter().enumerate() {
            device.set_mat4(&format!("models[{}]", i), *model);
        }
    }
}
