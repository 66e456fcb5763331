//! glsim Core - Core types and utilities shared by every glsim crate
//!
//! This crate provides the foundational types used throughout the engine:
//! - Mathematical primitives (re-exported from glam)
//! - Transform component for entity positioning
//! - Frame clock that turns wall-clock deltas into simulation steps

pub mod time;
pub mod types;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use time::{FrameClock, TimeConfig};
pub use types::{Color, Transform, WORLD_UP};
