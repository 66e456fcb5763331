//! Physics components
//!
//! `RigidBody` is get-or-create (it implements `AutoAttach`). `Position` and
//! `Velocity` describe bare point masses and must be attached explicitly with
//! `Registry::assign`.

use glam::Vec3;
use glsim_ecs::AutoAttach;

/// World-space position of a point mass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec3);

/// Linear velocity of a point mass, in units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity(pub Vec3);

/// Dynamic body integrated into the entity's `Transform`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub mass: f32,
    pub velocity: Vec3,
    /// Forces accumulated since the last step; cleared after integration.
    pub force_acc: Vec3,
    /// Fraction of velocity lost per second.
    pub linear_damping: f32,
    /// Static bodies never move.
    pub is_static: bool,
    pub use_gravity: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            velocity: Vec3::ZERO,
            force_acc: Vec3::ZERO,
            linear_damping: 0.01,
            is_static: false,
            use_gravity: true,
        }
    }
}

impl RigidBody {
    /// Accumulate a force to be applied on the next step.
    pub fn add_force(&mut self, force: Vec3) {
        self.force_acc += force;
    }

    /// Inverse mass; zero for static or massless bodies.
    pub fn inverse_mass(&self) -> f32 {
        if self.is_static || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }
}

impl AutoAttach for RigidBody {}
