use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use crate::error::EcsError;

/// A generational entity handle. Uses compact u32 index + generation for cache performance.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Create an entity from raw parts (mainly for testing).
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The slot index of this entity.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation of this entity (incremented on reuse).
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Allocates and recycles entity slots with generational tracking.
///
/// Freed slots are handed out lowest index first. Generations wrap around with
/// `u32::wrapping_add`, so a handle could in principle alias a new entity after
/// 2^32 reuses of the same slot.
pub(crate) struct EntityAllocator {
    pub(crate) generations: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    free_list: BinaryHeap<Reverse<u32>>,
    len: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            free_list: BinaryHeap::new(),
            len: 0,
        }
    }

    /// Allocate a new entity, reusing the lowest freed slot if available.
    pub fn try_allocate(&mut self) -> Result<Entity, EcsError> {
        if let Some(Reverse(index)) = self.free_list.pop() {
            let idx = index as usize;
            self.alive[idx] = true;
            self.len += 1;
            return Ok(Entity {
                index,
                generation: self.generations[idx],
            });
        }

        let index =
            u32::try_from(self.generations.len()).map_err(|_| EcsError::IndexSpaceExhausted)?;
        self.generations.try_reserve(1)?;
        self.alive.try_reserve(1)?;
        // Keep free-list capacity at the slot count so `deallocate` never grows it.
        let slots = self.generations.len() + 1;
        self.free_list
            .try_reserve(slots.saturating_sub(self.free_list.len()))?;
        self.generations.push(0);
        self.alive.push(true);
        self.len += 1;
        Ok(Entity {
            index,
            generation: 0,
        })
    }

    /// Deallocate an entity. Returns `true` if it was alive.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let idx = entity.index as usize;
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(Reverse(entity.index));
        self.len -= 1;
        true
    }

    /// Check if an entity is currently alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        let idx = entity.index as usize;
        idx < self.alive.len() && self.alive[idx] && self.generations[idx] == entity.generation
    }

    /// The live handle currently occupying `index`, if any.
    pub fn resolve(&self, index: u32) -> Option<Entity> {
        let idx = index as usize;
        if *self.alive.get(idx)? {
            Some(Entity {
                index,
                generation: self.generations[idx],
            })
        } else {
            None
        }
    }

    /// Iterate all live entities in index order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .zip(&self.generations)
            .enumerate()
            .filter(|(_, (alive, _))| **alive)
            .map(|(idx, (_, &generation))| Entity {
                index: idx as u32,
                generation,
            })
    }

    /// Number of currently alive entities.
    pub fn len(&self) -> usize {
        self.len
    }

}

impl Clone for EntityAllocator {
    fn clone(&self) -> Self {
        let mut free_list = BinaryHeap::with_capacity(self.generations.len());
        free_list.extend(self.free_list.iter().copied());
        Self {
            generations: self.generations.clone(),
            alive: self.alive.clone(),
            free_list,
            len: self.len,
        }
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
