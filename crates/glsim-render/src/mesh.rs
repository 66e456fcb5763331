//! Mesh component

use glsim_core::Color;
use glsim_ecs::AutoAttach;

/// Built-in primitive shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum PrimitiveType {
    #[default]
    Cube,
    Plane,
    Sphere,
}

/// Renderable primitive. Get-or-create: implements `AutoAttach`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mesh {
    pub primitive: PrimitiveType,
    pub color: Color,
    /// Hidden meshes are skipped during submission.
    pub hidden: bool,
}

impl Mesh {
    pub fn new(primitive: PrimitiveType) -> Self {
        Self {
            primitive,
            ..Default::default()
        }
    }
}

impl AutoAttach for Mesh {}
