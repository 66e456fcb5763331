//! glsim sandbox
//!
//! Builds a world with physics and headless rendering, drops a handful of
//! bodies, runs the configured number of frames, then tears everything down.

mod settings;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glam::Vec3;
use glsim_core::{FrameClock, Transform, WORLD_UP};
use glsim_ecs::{Registry, System, SystemResult, World, WorldConfig};
use glsim_physics::{PhysicsSystem, Position, RigidBody, Velocity};
use glsim_render::{Camera, HeadlessBackend, Mesh, PrimitiveType, RenderingSystem};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use settings::Settings;

/// Bodies below this height are despawned.
const FLOOR: f32 = -50.0;

/// Spins every mesh and culls bodies that fell through the floor.
#[derive(Default)]
struct SandboxSystem {
    elapsed: f32,
    culled: usize,
}

impl System for SandboxSystem {
    fn name(&self) -> &str {
        "sandbox"
    }

    fn on_init(&mut self, _registry: &mut Registry) -> SystemResult {
        info!("sandbox system initialized");
        Ok(())
    }

    fn on_update(&mut self, registry: &mut Registry, dt: f32) -> SystemResult {
        self.elapsed += dt;

        let fallen: Vec<_> = registry
            .iter::<Transform>()
            .filter(|(_, t)| t.position.y < FLOOR)
            .map(|(e, _)| e)
            .collect();
        for entity in fallen {
            debug!("culling {entity}");
            registry.despawn(entity);
            self.culled += 1;
        }

        let spin = dt * std::f32::consts::FRAC_PI_2;
        let meshes: Vec<_> = registry.iter::<Mesh>().map(|(e, _)| e).collect();
        for entity in meshes {
            if let Some(transform) = registry.get_or_default::<Transform>(entity) {
                transform.rotate(spin, Vec3::Y);
            }
        }
        Ok(())
    }

    fn on_destroy(&mut self, _registry: &mut Registry) {
        info!(
            "sandbox system destroyed after {:.2}s ({} bodies culled)",
            self.elapsed, self.culled
        );
    }
}

fn populate(registry: &mut Registry, bodies: u32) {
    let camera = registry.spawn();
    let mut eye = Transform::from_position(Vec3::new(0.0, 5.0, 20.0));
    eye.look_at(Vec3::ZERO, WORLD_UP);
    registry.assign(camera, eye);
    registry.get_or_default::<Camera>(camera);

    for i in 0..bodies {
        let entity = registry.spawn();
        let x = i as f32 * 2.0 - bodies as f32;
        registry.assign(entity, Transform::from_position(Vec3::new(x, 10.0, 0.0)));
        registry.assign(
            entity,
            Mesh::new(match i % 3 {
                0 => PrimitiveType::Cube,
                1 => PrimitiveType::Sphere,
                _ => PrimitiveType::Plane,
            }),
        );
        if let Some(body) = registry.get_or_default::<RigidBody>(entity) {
            body.mass = 1.0 + i as f32;
            body.velocity = Vec3::new(0.0, i as f32, 0.0);
        }
    }

    // A bare point mass drifting along X.
    let marker = registry.spawn();
    registry.assign(marker, Position(Vec3::ZERO));
    registry.assign(marker, Velocity(Vec3::X));
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting glsim sandbox v{}", env!("CARGO_PKG_VERSION"));

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_from(&PathBuf::from(path)),
        None => Settings::load(),
    };
    debug!("{settings:?}");

    let mut world = World::with_config(WorldConfig {
        default_dt: settings.simulation.default_dt,
        initial_capacity: settings.simulation.bodies as usize + 2,
    });
    populate(world.registry_mut(), settings.simulation.bodies);

    let backend = HeadlessBackend::with_capacity(1);
    let frames = backend.frames();

    world
        .add_system(SandboxSystem::default())
        .context("failed to add sandbox system")?;
    world
        .add_system(PhysicsSystem::with_config(settings.physics.clone()))
        .context("failed to add physics system")?;
    world
        .add_system(RenderingSystem::new(backend))
        .context("failed to add rendering system")?;

    let mut clock = FrameClock::new(settings.time.clone());
    let frame_budget = Duration::from_secs_f32(clock.config.fixed_timestep.max(0.0));
    let mut last = Instant::now();

    for _ in 0..settings.simulation.frames {
        let dt = if settings.simulation.realtime {
            let now = Instant::now();
            let raw = now - last;
            last = now;
            clock.advance(raw.as_secs_f32())
        } else {
            clock.advance(world.config().default_dt)
        };

        world.update(dt).context("frame failed")?;

        if settings.simulation.realtime {
            if let Some(rest) = frame_budget.checked_sub(last.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    let draws = frames.lock().last().map_or(0, |f| f.draws.len());
    let marker = world
        .registry()
        .iter::<Position>()
        .next()
        .map(|(_, p)| p.0)
        .unwrap_or_default();
    info!(
        "Ran {} frames ({:.2}s simulated): {} entities alive, {} draws in last frame, marker at {}",
        clock.frame_count,
        clock.total_time,
        world.registry().entity_count(),
        draws,
        marker
    );

    world.shutdown();
    info!("Shutdown complete");
    Ok(())
}
