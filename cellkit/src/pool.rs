use alloc::vec::Vec;

use crate::binding::ViewType;
use crate::key::KeyMap;

/// Recycled visual elements, keyed by element type.
///
/// Owned by a single [`crate::Viewport`]; lives and dies with it.
pub struct ReusePool<V> {
    slots: KeyMap<ViewType, Vec<V>>,
    capacity_per_type: usize,
}

impl<V> ReusePool<V> {
    pub const DEFAULT_CAPACITY_PER_TYPE: usize = 32;

    pub fn new() -> Self {
        Self::with_capacity_per_type(Self::DEFAULT_CAPACITY_PER_TYPE)
    }

    /// Elements recycled beyond `capacity_per_type` for a type are dropped.
    pub fn with_capacity_per_type(capacity_per_type: usize) -> Self {
        Self {
            slots: KeyMap::new(),
            capacity_per_type,
        }
    }

    pub fn dequeue(&mut self, view_type: ViewType) -> Option<V> {
        self.slots.get_mut(view_type)?.pop()
    }

    pub fn recycle(&mut self, view_type: ViewType, view: V) {
        let slot = self.slots.entry(view_type).or_default();
        if slot.len() < self.capacity_per_type {
            slot.push(view);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len_of(&self, view_type: ViewType) -> usize {
        self.slots.get(view_type).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<V> Default for ReusePool<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> core::fmt::Debug for ReusePool<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReusePool")
            .field("len", &self.len())
            .field("capacity_per_type", &self.capacity_per_type)
            .finish()
    }
}
