//! Append-only storage addressed by typed, stable indices.
//!
//! Geometry, materials and textures are owned by arenas; everything else
//! (BVH leaves, transforms, hit records) refers to them through [Id]s.

use std::{fmt, hash::Hash, marker::PhantomData};

/// A stable index into an [Arena] of `T`.
pub struct Id<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Creates a handle from a raw position. Nothing checks that it is in bounds.
    pub fn from_raw(index: usize) -> Self {
        Self {
            index: u32::try_from(index).unwrap_or(u32::MAX),
            _marker: PhantomData,
        }
    }

    /// Position of the referenced item inside its arena.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

// derives would put bounds on `T`
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index)
    }
}

#[derive(Debug, Clone)]
pub struct Arena<T> {
    store: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Creates a new Arena.
    pub fn new() -> Self {
        Self { store: Vec::new() }
    }

    /// Creates a new Arena with space for `capacity` amount of elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Vec::with_capacity(capacity),
        }
    }

    /// Adds the item to the arena and returns its handle.
    pub fn add(&mut self, item: T) -> Id<T> {
        let id = Id::from_raw(self.store.len());
        self.store.push(item);
        id
    }

    /// Returns a reference to the item behind `id`, if it belongs to this arena.
    pub fn get(&self, id: Id<T>) -> Option<&T> {
        self.store.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        self.store.iter().enumerate().map(|(i, item)| (Id::from_raw(i), item))
    }
}

impl<T> std::ops::Index<Id<T>> for Arena<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if the handle was issued by a different, larger arena.
    fn index(&self, id: Id<T>) -> &Self::Output {
        &self.store[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_stable() {
        let mut arena = Arena::new();
        let a = arena.add("a");
        let b = arena.add("b");
        assert_ne!(a, b);
        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn foreign_handle_is_rejected_by_get() {
        let mut big = Arena::new();
        big.add(1);
        let second = big.add(2);

        let small: Arena<i32> = Arena::with_capacity(1);
        assert!(small.get(second).is_none());
    }
}
