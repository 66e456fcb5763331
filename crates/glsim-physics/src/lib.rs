//! glsim Physics - Rigid body and point-mass integration
//!
//! Provides the physics components and a [`PhysicsSystem`] that advances them
//! once per frame through the ECS `System` lifecycle.

mod components;
mod system;

pub use components::{Position, RigidBody, Velocity};
pub use system::PhysicsSystem;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector applied to rigid bodies with `use_gravity` (default: -9.81 on Y axis)
    pub gravity: Vec3,
    /// Number of integration steps each frame's `dt` is split into
    pub substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            substeps: 1,
        }
    }
}
