//! Camera component

use glam::Mat4;
use glsim_core::Transform;
use glsim_ecs::AutoAttach;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraProjection {
    Orthographic,
    #[default]
    Perspective,
}

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near_clip: f32,
    pub far_clip: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near_clip: 0.01,
            far_clip: 10000.0,
        }
    }
}

/// Orthographic projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    /// Half-height of the view volume
    pub zoom_level: f32,
    pub near_clip: f32,
    pub far_clip: f32,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self {
            zoom_level: 1.0,
            near_clip: -1.0,
            far_clip: 1.0,
        }
    }
}

/// Camera component. Get-or-create: implements `AutoAttach`.
///
/// The camera looks down the owning entity's `Transform::forward()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub projection: CameraProjection,
    pub enabled: bool,
    /// Width over height of the target surface
    pub aspect_ratio: f32,
    pub perspective: PerspectiveCamera,
    pub orthographic: OrthographicCamera,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: CameraProjection::default(),
            enabled: true,
            aspect_ratio: 1.0,
            perspective: PerspectiveCamera::default(),
            orthographic: OrthographicCamera::default(),
        }
    }
}

impl AutoAttach for Camera {}

impl Camera {
    /// World-to-view matrix for a camera placed at `transform` (scale is ignored).
    pub fn view_matrix(&self, transform: &Transform) -> Mat4 {
        Mat4::from_rotation_translation(transform.rotation, transform.position).inverse()
    }

    /// Projection matrix with the Y axis flipped for a Y-down clip space.
    pub fn projection_matrix(&self) -> Mat4 {
        let mut proj = match self.projection {
            CameraProjection::Perspective => Mat4::perspective_rh(
                self.perspective.fov.to_radians(),
                self.aspect_ratio,
                self.perspective.near_clip,
                self.perspective.far_clip,
            ),
            CameraProjection::Orthographic => {
                let zoom = self.orthographic.zoom_level;
                Mat4::orthographic_rh(
                    -self.aspect_ratio * zoom,
                    self.aspect_ratio * zoom,
                    -zoom,
                    zoom,
                    self.orthographic.near_clip,
                    self.orthographic.far_clip,
                )
            }
        };
        proj.y_axis.y *= -1.0;
        proj
    }

    pub fn view_projection(&self, transform: &Transform) -> Mat4 {
        self.projection_matrix() * self.view_matrix(transform)
    }
}
