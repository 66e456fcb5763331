//! glsim ECS - Entity Component System
//!
//! Generational entity handles, sparse-set component storage, and a `World`
//! that drives an ordered list of systems through their init/update/destroy
//! lifecycle once per frame.

mod component;
mod entity;
mod error;
mod registry;
mod system;
mod world;

pub use component::{AutoAttach, Component, ErasedStorage, SparseSet};
pub use entity::Entity;
pub use error::{BoxedError, EcsError};
pub use registry::Registry;
pub use system::{ManagedSystem, System, SystemResult, SystemState};
pub use world::{SystemId, World, WorldConfig, DEFAULT_DT};
