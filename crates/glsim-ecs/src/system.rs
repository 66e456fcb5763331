use crate::error::BoxedError;
use crate::registry::Registry;

/// Result of a fallible system hook.
pub type SystemResult = Result<(), BoxedError>;

/// A unit of per-frame behavior operating on the registry.
///
/// The registry is only lent for the duration of each call. Hooks are driven
/// by the `World`, which guarantees exactly one `on_init`, any number of
/// `on_update` calls, then exactly one `on_destroy`.
pub trait System: Send + Sync {
    /// Human-readable name for logging and error reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once when the system is registered.
    fn on_init(&mut self, _registry: &mut Registry) -> SystemResult {
        Ok(())
    }

    /// Called once per frame with the frame's delta time in seconds.
    fn on_update(&mut self, registry: &mut Registry, dt: f32) -> SystemResult;

    /// Called once when the system is deregistered or the world is torn down.
    fn on_destroy(&mut self, _registry: &mut Registry) {}
}

/// Blanket implementation so closures can be used as update-only systems.
impl<F: FnMut(&mut Registry, f32) + Send + Sync> System for F {
    fn on_update(&mut self, registry: &mut Registry, dt: f32) -> SystemResult {
        (self)(registry, dt);
        Ok(())
    }
}

/// Lifecycle position of a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    Uninitialized,
    Initialized,
    /// Terminal.
    Destroyed,
}

/// A boxed system paired with its lifecycle state.
///
/// Calling a hook out of order is a bug in the host and panics.
pub struct ManagedSystem {
    system: Box<dyn System>,
    state: SystemState,
}

impl ManagedSystem {
    pub fn new<S: System + 'static>(system: S) -> Self {
        Self::from_boxed(Box::new(system))
    }

    pub fn from_boxed(system: Box<dyn System>) -> Self {
        Self {
            system,
            state: SystemState::Uninitialized,
        }
    }

    pub fn name(&self) -> &str {
        self.system.name()
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    /// Run `on_init`. On failure the system stays uninitialized.
    pub fn init(&mut self, registry: &mut Registry) -> SystemResult {
        assert_eq!(
            self.state,
            SystemState::Uninitialized,
            "lifecycle violation: `{}` initialized twice",
            self.system.name()
        );
        self.system.on_init(registry)?;
        self.state = SystemState::Initialized;
        Ok(())
    }

    pub fn update(&mut self, registry: &mut Registry, dt: f32) -> SystemResult {
        assert_eq!(
            self.state,
            SystemState::Initialized,
            "lifecycle violation: `{}` updated while not initialized",
            self.system.name()
        );
        self.system.on_update(registry, dt)
    }

    pub fn destroy(&mut self, registry: &mut Registry) {
        assert_eq!(
            self.state,
            SystemState::Initialized,
            "lifecycle violation: `{}` destroyed while not initialized",
            self.system.name()
        );
        self.system.on_destroy(registry);
        self.state = SystemState::Destroyed;
    }

    /// Give back the wrapped system.
    pub fn into_inner(self) -> Box<dyn System> {
        self.system
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        updates: u32,
        fail_init: bool,
    }

    impl System for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn on_init(&mut self, _registry: &mut Registry) -> SystemResult {
            if self.fail_init {
                return Err("no device".into());
            }
            Ok(())
        }

        fn on_update(&mut self, _registry: &mut Registry, _dt: f32) -> SystemResult {
            self.updates += 1;
            Ok(())
        }
    }

    fn counter() -> Counter {
        Counter {
            updates: 0,
            fail_init: false,
        }
    }

    #[test]
    fn closure_system() {
        let mut registry = Registry::new();
        let e = registry.spawn();
        registry.assign(e, 0.0f32);

        let mut system = |r: &mut Registry, dt: f32| {
            for (_, total) in r.each::<f32>() {
                *total += dt;
            }
        };
        system.on_update(&mut registry, 0.5).unwrap();
        system.on_update(&mut registry, 0.25).unwrap();
        assert_eq!(registry.get::<f32>(e), Some(&0.75));
    }

    #[test]
    fn default_name_is_type_name() {
        struct Named;
        impl System for Named {
            fn on_update(&mut self, _: &mut Registry, _: f32) -> SystemResult {
                Ok(())
            }
        }
        assert!(Named.name().ends_with("Named"));
    }

    #[test]
    fn managed_lifecycle_transitions() {
        let mut registry = Registry::new();
        let mut managed = ManagedSystem::new(counter());
        assert_eq!(managed.state(), SystemState::Uninitialized);

        managed.init(&mut registry).unwrap();
        assert_eq!(managed.state(), SystemState::Initialized);

        managed.update(&mut registry, 0.016).unwrap();
        managed.update(&mut registry, 0.016).unwrap();

        managed.destroy(&mut registry);
        assert_eq!(managed.state(), SystemState::Destroyed);
        assert_eq!(managed.name(), "counter");
    }

    #[test]
    fn failed_init_stays_uninitialized() {
        let mut registry = Registry::new();
        let mut managed = ManagedSystem::new(Counter {
            updates: 0,
            fail_init: true,
        });
        let err = managed.init(&mut registry).unwrap_err();
        assert_eq!(err.to_string(), "no device");
        assert_eq!(managed.state(), SystemState::Uninitialized);
    }

    #[test]
    #[should_panic(expected = "lifecycle violation")]
    fn update_before_init_panics() {
        let mut registry = Registry::new();
        let mut managed = ManagedSystem::new(counter());
        let _ = managed.update(&mut registry, 0.016);
    }

    #[test]
    #[should_panic(expected = "lifecycle violation")]
    fn update_after_destroy_panics() {
        let mut registry = Registry::new();
        let mut managed = ManagedSystem::new(counter());
        managed.init(&mut registry).unwrap();
        managed.destroy(&mut registry);
        let _ = managed.update(&mut registry, 0.016);
    }

    #[test]
    #[should_panic(expected = "lifecycle violation")]
    fn double_init_panics() {
        let mut registry = Registry::new();
        let mut managed = ManagedSystem::new(counter());
        managed.init(&mut registry).unwrap();
        let _ = managed.init(&mut registry);
    }

    #[test]
    #[should_panic(expected = "lifecycle violation")]
    fn destroy_twice_panics() {
        let mut registry = Registry::new();
        let mut managed = ManagedSystem::new(counter());
        managed.init(&mut registry).unwrap();
        managed.destroy(&mut registry);
        managed.destroy(&mut registry);
    }
}
