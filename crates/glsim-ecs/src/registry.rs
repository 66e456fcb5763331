use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::component::{AutoAttach, Component, ErasedStorage, SparseSet};
use crate::entity::{Entity, EntityAllocator};
use crate::error::EcsError;

/// The data layer of the ECS. Owns all entities and their components.
///
/// Component references handed out by the registry borrow it, so they cannot
/// survive a structural change (assign, remove, despawn) of the registry.
pub struct Registry {
    entities: EntityAllocator,
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a registry with room for `capacity` entities before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: EntityAllocator::with_capacity(capacity),
            storages: HashMap::new(),
        }
    }

    // ---- Entity management ----

    /// Spawn a new entity with no components.
    ///
    /// # Panics
    /// Panics if the entity table cannot grow; see [`Registry::try_spawn`].
    pub fn spawn(&mut self) -> Entity {
        match self.try_spawn() {
            Ok(entity) => entity,
            Err(err) => panic!("failed to spawn entity: {err}"),
        }
    }

    /// Spawn a new entity, reporting allocation failure instead of panicking.
    pub fn try_spawn(&mut self) -> Result<Entity, EcsError> {
        let entity = self.entities.try_allocate()?;
        trace!("spawned {entity}");
        Ok(entity)
    }

    /// Despawn an entity, removing all its components.
    ///
    /// Stale or unknown handles are ignored; returns `true` only if the entity was alive.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.entities.deallocate(entity) {
            return false;
        }
        for storage in self.storages.values_mut() {
            storage.erase(entity.index);
        }
        trace!("despawned {entity}");
        true
    }

    /// Check whether a handle refers to a live entity.
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterate all live entities in index order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// Despawn every entity and drop all components.
    ///
    /// Generations are still bumped, so handles taken before the clear stay invalid.
    pub fn clear(&mut self) {
        let live: Vec<Entity> = self.entities.iter().collect();
        for entity in live {
            self.entities.deallocate(entity);
        }
        for storage in self.storages.values_mut() {
            storage.clear();
        }
    }

    /// Replace `dest` with a deep copy of this registry.
    ///
    /// Live handles, generations and free slots carry over, so every handle
    /// valid here is valid in `dest` and the next `spawn` on either side
    /// returns the same entity. Component values are cloned, not shared.
    pub fn copy_to(&self, dest: &mut Registry) {
        dest.clone_from(self);
        trace!(
            "copied registry ({} entities, {} storages)",
            self.entities.len(),
            self.storages.len()
        );
    }

    // ---- Storage access ----

    fn storage_entry<T: Component>(&mut self) -> &mut SparseSet<T> {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()))
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .expect("component type mismatch")
    }

    /// The storage for `T`, if any component of that type was ever assigned.
    pub fn storage<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<SparseSet<T>>())
    }

    pub fn storage_mut<T: Component>(&mut self) -> Option<&mut SparseSet<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<SparseSet<T>>())
    }

    /// Type names of every component storage created so far.
    pub fn component_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.storages.values().map(|s| s.component_name())
    }

    // ---- Component management ----

    /// Attach a component to an entity, replacing any existing one of the same type.
    ///
    /// Returns `None` without storing anything when the handle is stale.
    pub fn assign<T: Component>(&mut self, entity: Entity, component: T) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            trace!("ignoring {} assign on dead entity {entity}", type_name::<T>());
            return None;
        }
        Some(self.storage_entry::<T>().assign(entity.index, component))
    }

    /// Like [`Registry::assign`], but reports stale handles and allocation failure.
    pub fn try_assign<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<&mut T, EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::InvalidHandle(entity));
        }
        Ok(self.storage_entry::<T>().try_assign(entity.index, component)?)
    }

    /// Get an immutable reference to a component on an entity.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.storage::<T>()?.get(entity.index)
    }

    /// Get a mutable reference to a component on an entity.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.storage_mut::<T>()?.get_mut(entity.index)
    }

    /// Get a component, distinguishing a stale handle from a missing component.
    pub fn fetch<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::InvalidHandle(entity));
        }
        self.storage::<T>()
            .and_then(|s| s.get(entity.index))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    pub fn fetch_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::InvalidHandle(entity));
        }
        self.storage_mut::<T>()
            .and_then(|s| s.get_mut(entity.index))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    /// Get a component, default-constructing and attaching it first if absent.
    ///
    /// Only available for components that opt into [`AutoAttach`].
    pub fn get_or_default<T: AutoAttach>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        let storage = self.storage_entry::<T>();
        if !storage.contains(entity.index) {
            trace!("auto-attaching {} to {entity}", type_name::<T>());
            return Some(storage.assign(entity.index, T::default()));
        }
        storage.get_mut(entity.index)
    }

    /// Remove a component from an entity, returning it if it was present.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.storage_mut::<T>()?.remove(entity.index)
    }

    /// Check whether an entity has a component of the given type.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    // ---- Iteration ----

    /// Iterate every `(Entity, &T)` pair in the storage's dense order.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        let entities = &self.entities;
        self.storage::<T>().into_iter().flat_map(move |set| {
            set.iter()
                .filter_map(move |(index, value)| Some((entities.resolve(index)?, value)))
        })
    }

    /// Iterate every `(Entity, &mut T)` pair in the storage's dense order.
    ///
    /// The registry stays mutably borrowed for the whole iteration, so the
    /// storage cannot be structurally changed mid-loop.
    pub fn each<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        let entities = &self.entities;
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<SparseSet<T>>())
            .into_iter()
            .flat_map(move |set| {
                set.each()
                    .filter_map(move |(index, value)| Some((entities.resolve(index)?, value)))
            })
    }
}

impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            entities: self.entities.clone(),
            storages: self
                .storages
                .iter()
                .map(|(&id, storage)| (id, storage.clone_boxed()))
                .collect(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.entities.len())
            .field("components", &self.component_names().collect::<Vec<_>>())
            .finish()
    }
}
