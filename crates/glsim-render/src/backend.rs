//! Backend boundary and per-frame submission data

use std::sync::Arc;

use glam::Mat4;
use glsim_core::Color;
use glsim_ecs::{BoxedError, Entity};
use parking_lot::Mutex;

use crate::mesh::PrimitiveType;

/// One mesh instance to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub entity: Entity,
    pub primitive: PrimitiveType,
    pub model: Mat4,
    pub color: Color,
}

impl DrawCommand {
    /// Pack into the layout a shader consumes as push constants.
    pub fn constants(&self, view_projection: Mat4) -> DrawConstants {
        DrawConstants {
            model: self.model.to_cols_array_2d(),
            view_projection: view_projection.to_cols_array_2d(),
            color: self.color.to_array(),
        }
    }
}

/// Push constants for basic primitive rendering
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawConstants {
    pub model: [[f32; 4]; 4],
    pub view_projection: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Everything a backend needs to render one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSubmission {
    /// Frame counter since the rendering system was initialized
    pub frame: u64,
    /// Delta time the frame was produced with
    pub dt: f32,
    /// Camera view-projection, `None` when no enabled camera exists
    pub view_projection: Option<Mat4>,
    pub draws: Vec<DrawCommand>,
}

impl FrameSubmission {
    /// Push constants for every draw, or nothing without a camera.
    pub fn constants(&self) -> Vec<DrawConstants> {
        let Some(view_projection) = self.view_projection else {
            return Vec::new();
        };
        self.draws
            .iter()
            .map(|draw| draw.constants(view_projection))
            .collect()
    }
}

/// A GPU (or fake) renderer fed by the `RenderingSystem`.
pub trait RenderBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Acquire device resources. Called from the system's `on_init`.
    fn init(&mut self) -> Result<(), BoxedError> {
        Ok(())
    }

    fn submit(&mut self, frame: &FrameSubmission) -> Result<(), BoxedError>;

    /// Release device resources. Called from the system's `on_destroy`.
    fn shutdown(&mut self) {}
}

/// Backend that renders nothing and records every submitted frame.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    frames: Arc<Mutex<Vec<FrameSubmission>>>,
    /// Keep only the most recent `capacity` frames; `0` keeps everything.
    capacity: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` recorded frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Shared handle to the recorded frames, usable after the backend is boxed.
    pub fn frames(&self) -> Arc<Mutex<Vec<FrameSubmission>>> {
        self.frames.clone()
    }
}

impl RenderBackend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn submit(&mut self, frame: &FrameSubmission) -> Result<(), BoxedError> {
        let mut frames = self.frames.lock();
        if self.capacity > 0 && frames.len() >= self.capacity {
            let excess = frames.len() + 1 - self.capacity;
            frames.drain(..excess);
        }
        frames.push(frame.clone());
        Ok(())
    }
}
