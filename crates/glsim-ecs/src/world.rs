use std::fmt;

use tracing::{debug, trace, warn};

use crate::error::EcsError;
use crate::registry::Registry;
use crate::system::{ManagedSystem, System};

/// Delta time used by [`World::tick`], in seconds.
pub const DEFAULT_DT: f32 = 0.016;

/// Handle to a registered system, used to deregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(u64);

/// World construction parameters.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Delta time passed to systems by [`World::tick`].
    pub default_dt: f32,
    /// Entity slots reserved up front.
    pub initial_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            default_dt: DEFAULT_DT,
            initial_capacity: 0,
        }
    }
}

/// The orchestrator: owns the registry and drives registered systems every frame.
///
/// Systems run in registration order. On teardown (explicit [`World::shutdown`]
/// or drop) every remaining system receives `on_destroy` in reverse
/// registration order, after which the registry is released.
pub struct World {
    registry: Registry,
    systems: Vec<(SystemId, ManagedSystem)>,
    next_system_id: u64,
    config: WorldConfig,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            registry: Registry::with_capacity(config.initial_capacity),
            systems: Vec::new(),
            next_system_id: 0,
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    // ---- Systems ----

    /// Register a system at the end of the schedule and run its `on_init`.
    ///
    /// If `on_init` fails the system is dropped without being registered.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> Result<SystemId, EcsError> {
        self.add_boxed_system(Box::new(system))
    }

    pub fn add_boxed_system(&mut self, system: Box<dyn System>) -> Result<SystemId, EcsError> {
        let mut managed = ManagedSystem::from_boxed(system);
        if let Err(source) = managed.init(&mut self.registry) {
            warn!("system `{}` failed to initialize: {source}", managed.name());
            return Err(EcsError::SystemFailed {
                system: managed.name().to_string(),
                source,
            });
        }

        let id = SystemId(self.next_system_id);
        self.next_system_id += 1;
        debug!("registered system `{}` ({id:?})", managed.name());
        self.systems.push((id, managed));
        Ok(id)
    }

    /// Deregister a system, running its `on_destroy`. Returns `false` for unknown ids.
    pub fn remove_system(&mut self, id: SystemId) -> bool {
        let Some(pos) = self.systems.iter().position(|(sid, _)| *sid == id) else {
            return false;
        };
        let (_, mut managed) = self.systems.remove(pos);
        managed.destroy(&mut self.registry);
        debug!("removed system `{}` ({id:?})", managed.name());
        true
    }

    /// Number of registered systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Names of registered systems in execution order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.systems.iter().map(|(_, managed)| managed.name())
    }

    // ---- Frame loop ----

    /// Run every system's `on_update` once, in registration order.
    ///
    /// The first failing system halts the frame; later systems are skipped.
    pub fn update(&mut self, dt: f32) -> Result<(), EcsError> {
        for (_, managed) in &mut self.systems {
            trace!("updating `{}` (dt = {dt})", managed.name());
            if let Err(source) = managed.update(&mut self.registry, dt) {
                warn!("system `{}` failed: {source}", managed.name());
                return Err(EcsError::SystemFailed {
                    system: managed.name().to_string(),
                    source,
                });
            }
        }
        Ok(())
    }

    /// Run one frame with the configured default delta time.
    pub fn tick(&mut self) -> Result<(), EcsError> {
        self.update(self.config.default_dt)
    }

    /// Destroy every system (reverse registration order) and release the registry.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        while let Some((id, mut managed)) = self.systems.pop() {
            managed.destroy(&mut self.registry);
            debug!("destroyed system `{}` ({id:?})", managed.name());
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("registry", &self.registry)
            .field("systems", &self.system_names().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::system::SystemResult;

    type CallLog = Arc<Mutex<Vec<String>>>;

    /// Records every hook invocation into a shared log.
    struct Recorder {
        tag: &'static str,
        log: CallLog,
        fail_update: bool,
    }

    impl Recorder {
        fn new(tag: &'static str, log: &CallLog) -> Self {
            Self {
                tag,
                log: log.clone(),
                fail_update: false,
            }
        }
    }

    impl System for Recorder {
        fn name(&self) -> &str {
            self.tag
        }

        fn on_init(&mut self, _registry: &mut Registry) -> SystemResult {
            self.log.lock().push(format!("{}:init", self.tag));
            Ok(())
        }

        fn on_update(&mut self, _registry: &mut Registry, dt: f32) -> SystemResult {
            self.log.lock().push(format!("{}:update:{dt}", self.tag));
            if self.fail_update {
                return Err(format!("{} exploded", self.tag).into());
            }
            Ok(())
        }

        fn on_destroy(&mut self, _registry: &mut Registry) {
            self.log.lock().push(format!("{}:destroy", self.tag));
        }
    }

    struct FailingInit;

    impl System for FailingInit {
        fn on_init(&mut self, _registry: &mut Registry) -> SystemResult {
            Err("no gpu".into())
        }

        fn on_update(&mut self, _registry: &mut Registry, _dt: f32) -> SystemResult {
            unreachable!("never initialized")
        }
    }

    fn entries(log: &CallLog) -> Vec<String> {
        log.lock().clone()
    }

    #[test]
    fn system_lifecycle() {
        let log = CallLog::default();
        let mut world = World::new();

        world.add_system(Recorder::new("s", &log)).unwrap();
        assert_eq!(entries(&log), vec!["s:init"]);

        world.update(0.5).unwrap();
        assert_eq!(entries(&log), vec!["s:init", "s:update:0.5"]);

        drop(world);
        assert_eq!(entries(&log), vec!["s:init", "s:update:0.5", "s:destroy"]);
    }

    #[test]
    fn schedule_ordering() {
        let log = CallLog::default();
        let mut world = World::new();
        world.add_system(Recorder::new("a", &log)).unwrap();
        world.add_system(Recorder::new("b", &log)).unwrap();
        world.add_system(Recorder::new("c", &log)).unwrap();
        log.lock().clear();

        world.update(1.0).unwrap();
        assert_eq!(entries(&log), vec!["a:update:1", "b:update:1", "c:update:1"]);
        assert_eq!(world.system_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn shutdown_destroys_in_reverse_order() {
        let log = CallLog::default();
        let mut world = World::new();
        world.add_system(Recorder::new("physics", &log)).unwrap();
        world.add_system(Recorder::new("render", &log)).unwrap();
        log.lock().clear();

        world.shutdown();
        assert_eq!(entries(&log), vec!["render:destroy", "physics:destroy"]);
    }

    #[test]
    fn tick_uses_default_dt() {
        let log = CallLog::default();
        let mut world = World::with_config(WorldConfig {
            default_dt: 0.25,
            ..Default::default()
        });
        world.add_system(Recorder::new("s", &log)).unwrap();
        world.tick().unwrap();
        assert_eq!(entries(&log).last().unwrap(), "s:update:0.25");
        assert_eq!(World::new().config().default_dt, DEFAULT_DT);
    }

    #[test]
    fn closures_run_against_registry() {
        let mut world = World::new();
        let e = world.registry_mut().spawn();
        world.registry_mut().assign(e, 0u32);

        world
            .add_system(|registry: &mut Registry, _dt: f32| {
                for (_, frames) in registry.each::<u32>() {
                    *frames += 1;
                }
            })
            .unwrap();
        world.tick().unwrap();
        world.tick().unwrap();
        assert_eq!(world.registry().get::<u32>(e), Some(&2));
    }

    #[test]
    fn failing_update_halts_frame() {
        let log = CallLog::default();
        let mut world = World::new();
        world.add_system(Recorder::new("a", &log)).unwrap();
        let mut broken = Recorder::new("b", &log);
        broken.fail_update = true;
        world.add_system(broken).unwrap();
        world.add_system(Recorder::new("c", &log)).unwrap();
        log.lock().clear();

        let err = world.update(1.0).unwrap_err();
        assert!(matches!(&err, EcsError::SystemFailed { system, .. } if system == "b"));
        assert_eq!(err.to_string(), "system `b` failed: b exploded");
        assert_eq!(entries(&log), vec!["a:update:1", "b:update:1"]);
    }

    #[test]
    fn failed_init_is_not_registered() {
        let mut world = World::new();
        let err = world.add_system(FailingInit).unwrap_err();
        assert!(matches!(err, EcsError::SystemFailed { .. }));
        assert_eq!(world.system_count(), 0);
        // Never initialized, so teardown must not call on_destroy or on_update.
        world.tick().unwrap();
    }

    #[test]
    fn remove_system_destroys_once() {
        let log = CallLog::default();
        let mut world = World::new();
        let a = world.add_system(Recorder::new("a", &log)).unwrap();
        world.add_system(Recorder::new("b", &log)).unwrap();

        assert!(world.remove_system(a));
        assert!(!world.remove_system(a));
        world.update(2.0).unwrap();
        drop(world);

        assert_eq!(
            entries(&log),
            vec!["a:init", "b:init", "a:destroy", "b:update:2", "b:destroy"]
        );
    }

    #[test]
    fn no_updates_after_destroy() {
        let log = CallLog::default();
        {
            let mut world = World::new();
            world.add_system(Recorder::new("s", &log)).unwrap();
            world.tick().unwrap();
        }
        let calls = entries(&log);
        assert_eq!(calls.iter().filter(|c| c.starts_with("s:init")).count(), 1);
        assert_eq!(calls.iter().filter(|c| c.starts_with("s:update")).count(), 1);
        assert_eq!(calls.last().unwrap(), "s:destroy");
    }
}
