use crate::error::Result;
use std::ops::{Index, IndexMut};

/// Stable handle to a slot of an `Arena`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// Pool of nodes addressed by `NodeId`.
/// Released slots are kept in a free list and handed out again before the
/// backing vector grows.
pub(crate) struct Arena<N> {
    slots: Vec<Option<N>>,
    free_list: Vec<usize>,
}

impl<N> Arena<N> {
    pub(crate) fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Number of live nodes
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Make sure the next `additional` calls to `alloc` won't need to allocate memory.
    /// Nothing is changed on failure
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let missing = additional.saturating_sub(self.free_list.len());
        self.slots.try_reserve(missing)?;
        // The free list grows by one entry for every released slot, so it
        // must never need to allocate while a fix-up releases nodes
        self.free_list.try_reserve(self.slots.len() + missing - self.free_list.len())?;
        Ok(())
    }

    /// Store `node` and return its handle
    pub(crate) fn alloc(&mut self, node: N) -> NodeId {
        match self.free_list.pop() {
            Some(index) => {
                debug_assert!(self.slots[index].is_none());
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Release the slot behind `id` and return the node it held.
    /// Panics if the slot is already vacant
    pub(crate) fn free(&mut self, id: NodeId) -> N {
        let node = self.slots[id.0]
            .take()
            .unwrap_or_else(|| panic!("double release of arena slot {}", id.0));
        self.free_list.push(id.0);
        node
    }

    /// Release every slot, keeping the allocated memory
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }
}

impl<N> Index<NodeId> for Arena<N> {
    type Output = N;

    fn index(&self, id: NodeId) -> &N {
        match &self.slots[id.0] {
            Some(node) => node,
            None => panic!("access to released arena slot {}", id.0),
        }
    }
}

impl<N> IndexMut<NodeId> for Arena<N> {
    fn index_mut(&mut self, id: NodeId) -> &mut N {
        match &mut self.slots[id.0] {
            Some(node) => node,
            None => panic!("access to released arena slot {}", id.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reuse_released_slots() {
        let mut arena = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(arena.len(), 2);

        assert_eq!(arena.free(a), "a");
        assert_eq!(arena.len(), 1);

        // The released slot is handed out again
        let c = arena.alloc("c");
        assert_eq!(c, a);
        assert_eq!(arena[c], "c");
        assert_eq!(arena[b], "b");
    }

    #[test]
    fn reserve_counts_free_slots() {
        let mut arena = Arena::new();
        let ids: Vec<_> = (0..4).map(|i| arena.alloc(i)).collect();
        for &id in &ids {
            arena.free(id);
        }
        let capacity = arena.slots.capacity();
        arena.try_reserve(4).unwrap();
        assert_eq!(arena.slots.capacity(), capacity);

        arena.try_reserve(10).unwrap();
        assert!(arena.slots.capacity() >= arena.slots.len() + 6);
    }

    #[test]
    fn reserve_overflow_fails() {
        let mut arena: Arena<u64> = Arena::new();
        assert!(arena.try_reserve(usize::MAX).is_err());
        assert_eq!(arena.len(), 0);
    }

    #[test]
    #[should_panic]
    fn double_free() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        arena.free(a);
        arena.free(a);
    }

    #[test]
    #[should_panic]
    fn index_released_slot() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        arena.free(a);
        let _ = arena[a];
    }
}
