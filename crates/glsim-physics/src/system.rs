use glam::Vec3;
use glsim_core::Transform;
use glsim_ecs::{Entity, Registry, System, SystemResult};
use tracing::{debug, trace};

use crate::components::{Position, RigidBody, Velocity};
use crate::PhysicsConfig;

/// Advances physics state once per frame.
///
/// - Point masses: `Position += Velocity * dt` (explicit Euler, no forces).
/// - Rigid bodies: semi-implicit Euler with gravity, accumulated forces and
///   linear damping, written into the entity's `Transform`.
pub struct PhysicsSystem {
    pub config: PhysicsConfig,
    /// Scratch buffer reused across frames.
    pending: Vec<(Entity, Vec3)>,
}

impl PhysicsSystem {
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
        }
    }

    fn integrate_points(&mut self, registry: &mut Registry, dt: f32) {
        self.pending.clear();
        self.pending
            .extend(registry.iter::<Velocity>().map(|(e, v)| (e, v.0)));

        for &(entity, velocity) in &self.pending {
            if let Some(position) = registry.get_mut::<Position>(entity) {
                position.0 += velocity * dt;
            }
        }
    }

    fn integrate_bodies(&mut self, registry: &mut Registry, h: f32) {
        let gravity = self.config.gravity;
        self.pending.clear();

        for (entity, body) in registry.each::<RigidBody>() {
            if body.is_static {
                continue;
            }
            let mut acceleration = body.force_acc * body.inverse_mass();
            if body.use_gravity {
                acceleration += gravity;
            }
            body.velocity += acceleration * h;
            body.velocity *= (1.0 - body.linear_damping * h).max(0.0);
            self.pending.push((entity, body.velocity * h));
        }

        for &(entity, displacement) in &self.pending {
            if let Some(transform) = registry.get_or_default::<Transform>(entity) {
                transform.translate(displacement);
            }
        }
    }
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PhysicsSystem {
    fn name(&self) -> &str {
        "physics"
    }

    fn on_init(&mut self, _registry: &mut Registry) -> SystemResult {
        debug!(
            "physics initialized (gravity = {}, substeps = {})",
            self.config.gravity, self.config.substeps
        );
        Ok(())
    }

    fn on_update(&mut self, registry: &mut Registry, dt: f32) -> SystemResult {
        trace!("physics step (dt = {dt})");
        self.integrate_points(registry, dt);

        let substeps = self.config.substeps.max(1);
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            self.integrate_bodies(registry, h);
        }
        for (_, body) in registry.each::<RigidBody>() {
            body.force_acc = Vec3::ZERO;
        }
        Ok(())
    }

    fn on_destroy(&mut self, _registry: &mut Registry) {
        self.pending = Vec::new();
        debug!("physics destroyed");
    }
}
