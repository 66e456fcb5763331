use glsim_core::Transform;
use glsim_ecs::{Registry, System, SystemResult};
use tracing::{debug, trace};

use crate::backend::{DrawCommand, FrameSubmission, RenderBackend};
use crate::camera::Camera;
use crate::mesh::Mesh;

/// Collects cameras and meshes each frame and hands them to a backend.
///
/// The first enabled camera (in dense storage order) drives the frame.
/// Entities with a `Mesh` but no `Transform` are drawn at the origin.
pub struct RenderingSystem {
    backend: Box<dyn RenderBackend>,
    submission: FrameSubmission,
    frame: u64,
}

impl RenderingSystem {
    pub fn new<B: RenderBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Box::new(backend),
            submission: FrameSubmission::default(),
            frame: 0,
        }
    }

    /// Frames submitted so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    fn collect(&mut self, registry: &Registry, dt: f32) {
        let submission = &mut self.submission;
        submission.frame = self.frame;
        submission.dt = dt;
        submission.view_projection = registry
            .iter::<Camera>()
            .find(|(_, camera)| camera.enabled)
            .map(|(entity, camera)| {
                let transform = registry.get::<Transform>(entity).copied().unwrap_or_default();
                camera.view_projection(&transform)
            });

        submission.draws.clear();
        submission.draws.extend(
            registry
                .iter::<Mesh>()
                .filter(|(_, mesh)| !mesh.hidden)
                .map(|(entity, mesh)| DrawCommand {
                    entity,
                    primitive: mesh.primitive,
                    model: registry
                        .get::<Transform>(entity)
                        .map(Transform::matrix)
                        .unwrap_or_default(),
                    color: mesh.color,
                }),
        );
    }
}

impl System for RenderingSystem {
    fn name(&self) -> &str {
        "rendering"
    }

    fn on_init(&mut self, _registry: &mut Registry) -> SystemResult {
        self.backend.init()?;
        debug!("rendering initialized with `{}` backend", self.backend.name());
        Ok(())
    }

    fn on_update(&mut self, registry: &mut Registry, dt: f32) -> SystemResult {
        self.collect(registry, dt);
        trace!(
            "frame {}: {} draws, camera = {}",
            self.frame,
            self.submission.draws.len(),
            self.submission.view_projection.is_some()
        );
        self.backend.submit(&self.submission)?;
        self.frame += 1;
        Ok(())
    }

    fn on_destroy(&mut self, _registry: &mut Registry) {
        self.backend.shutdown();
        debug!("rendering destroyed after {} frames", self.frame);
    }
}
