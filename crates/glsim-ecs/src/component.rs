use std::any::{type_name, Any};
use std::collections::TryReserveError;

/// Marker trait for types that can be stored as ECS components.
///
/// Components must be `Clone` so a whole registry can be duplicated with
/// `Registry::copy_to`.
pub trait Component: 'static + Send + Sync + Clone {}

/// Blanket implementation: any `'static + Send + Sync + Clone` type is a valid component.
impl<T: 'static + Send + Sync + Clone> Component for T {}

/// Opt-in for get-or-create access.
///
/// `Registry::get_or_default` only accepts components implementing this trait;
/// every other component must be attached explicitly with `Registry::assign`.
pub trait AutoAttach: Component + Default {}

impl AutoAttach for glsim_core::Transform {}

/// Type-erased component storage interface.
///
/// The registry keeps one boxed storage per component type so that despawning
/// can strip an entity from every storage without knowing the concrete types.
pub trait ErasedStorage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Drop the component stored for `index`. Returns `true` if one was present.
    fn erase(&mut self, index: u32) -> bool;
    fn contains(&self, index: u32) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn clear(&mut self);
    /// Type name of the stored component, for diagnostics.
    fn component_name(&self) -> &'static str;
    /// Deep copy of the storage, indices and values included.
    fn clone_boxed(&self) -> Box<dyn ErasedStorage>;
}

/// Sparse-set storage for a single component type. Provides O(1) insert/remove/lookup
/// and dense iteration.
///
/// Removal swaps the last component into the vacated slot, so dense order (and
/// any borrowed reference) is only stable until the next `assign` or `remove`.
#[derive(Clone)]
pub struct SparseSet<T> {
    /// Maps entity index → dense index. `None` means the entity has no component.
    sparse: Vec<Option<usize>>,
    /// Packed component values.
    dense: Vec<T>,
    /// Entity indices corresponding to each dense slot.
    entities: Vec<u32>,
}

impl<T: Component> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Insert or overwrite the component for `index`, reporting allocation failure.
    ///
    /// Overwriting keeps the existing dense slot.
    pub fn try_assign(&mut self, index: u32, value: T) -> Result<&mut T, TryReserveError> {
        let idx = index as usize;
        if idx >= self.sparse.len() {
            self.sparse.try_reserve(idx + 1 - self.sparse.len())?;
            self.sparse.resize(idx + 1, None);
        }

        let dense_idx = match self.sparse[idx] {
            Some(dense_idx) => {
                self.dense[dense_idx] = value;
                dense_idx
            }
            None => {
                self.dense.try_reserve(1)?;
                self.entities.try_reserve(1)?;
                let dense_idx = self.dense.len();
                self.sparse[idx] = Some(dense_idx);
                self.dense.push(value);
                self.entities.push(index);
                dense_idx
            }
        };
        Ok(&mut self.dense[dense_idx])
    }

    /// Insert or overwrite the component for `index`.
    ///
    /// # Panics
    /// Panics if the storage cannot grow.
    pub fn assign(&mut self, index: u32, value: T) -> &mut T {
        match self.try_assign(index, value) {
            Ok(component) => component,
            Err(err) => panic!("{} storage cannot grow: {err}", type_name::<T>()),
        }
    }

    /// Get an immutable reference to the component for an entity.
    pub fn get(&self, index: u32) -> Option<&T> {
        let dense_idx = (*self.sparse.get(index as usize)?)?;
        Some(&self.dense[dense_idx])
    }

    /// Get a mutable reference to the component for an entity.
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        let dense_idx = (*self.sparse.get(index as usize)?)?;
        Some(&mut self.dense[dense_idx])
    }

    pub fn contains(&self, index: u32) -> bool {
        matches!(self.sparse.get(index as usize), Some(Some(_)))
    }

    /// Remove the component for `index` with a swap-remove, returning it if present.
    pub fn remove(&mut self, index: u32) -> Option<T> {
        let dense_idx = self.sparse.get_mut(index as usize)?.take()?;

        let value = self.dense.swap_remove(dense_idx);
        self.entities.swap_remove(dense_idx);
        if let Some(&moved) = self.entities.get(dense_idx) {
            self.sparse[moved as usize] = Some(dense_idx);
        }
        Some(value)
    }

    /// Iterate over all (entity_index, &component) pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    /// Iterate over all (entity_index, &mut component) pairs in dense order.
    pub fn each(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.entities.iter().copied().zip(self.dense.iter_mut())
    }

    /// The dense array of all entity indices that have this component.
    pub fn entity_indices(&self) -> &[u32] {
        &self.entities
    }

    /// The packed component values, parallel to `entity_indices`.
    pub fn values(&self) -> &[T] {
        &self.dense
    }

    /// Number of components stored.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn clear(&mut self) {
        self.sparse.clear();
        self.dense.clear();
        self.entities.clear();
    }
}

impl<T: Component> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ErasedStorage for SparseSet<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn erase(&mut self, index: u32) -> bool {
        self.remove(index).is_some()
    }

    fn contains(&self, index: u32) -> bool {
        SparseSet::contains(self, index)
    }

    fn len(&self) -> usize {
        SparseSet::len(self)
    }

    fn clear(&mut self) {
        SparseSet::clear(self)
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn clone_boxed(&self) -> Box<dyn ErasedStorage> {
        Box::new(self.clone())
    }
}
