use std::collections::TryReserveError;

use crate::entity::Entity;

/// Error type returned by fallible system hooks.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the ECS registry and scheduler.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    #[error("entity {0} is not alive")]
    InvalidHandle(Entity),

    #[error("entity {entity} has no `{component}` component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    #[error("failed to grow ECS storage: {0}")]
    OutOfMemory(#[from] TryReserveError),

    #[error("entity index space exhausted")]
    IndexSpaceExhausted,

    #[error("system `{system}` failed: {source}")]
    SystemFailed {
        system: String,
        #[source]
        source: BoxedError,
    },
}
