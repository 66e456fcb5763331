//! glsim Render - Render submission for the ECS
//!
//! Owns the rendering components (`Camera`, `Mesh`) and a [`RenderingSystem`]
//! that turns them into per-frame draw submissions for a [`RenderBackend`].
//! GPU backends live outside this crate; [`HeadlessBackend`] records frames
//! for tests and tooling.

pub mod backend;
pub mod camera;
pub mod mesh;
mod system;

pub use backend::{DrawCommand, DrawConstants, FrameSubmission, HeadlessBackend, RenderBackend};
pub use camera::{Camera, CameraProjection, OrthographicCamera, PerspectiveCamera};
pub use mesh::{Mesh, PrimitiveType};
pub use system::RenderingSystem;
