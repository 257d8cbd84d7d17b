//! Chunked slot allocator used as node storage by the trees in this crate.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A handle to an object stored in an `Arena<T>`.
///
/// Handles are plain indices, so holding one does not borrow the arena. A handle is only
/// meaningful while the object it was returned for is still allocated.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle {
    chunk_index: usize,
    slot_index: usize,
}

enum Slot<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// An allocator for objects of a single type.
///
/// Objects are stored in fixed-size chunks which are never reallocated once created, and freed
/// slots are threaded onto a free list so that they are reused by later allocations. Every object
/// still in the arena is dropped when the arena is dropped or cleared.
///
/// # Examples
///
/// ```
/// use linked_avl::arena::Arena;
///
/// let mut arena = Arena::new(64);
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(x), 2);
/// assert!(arena.is_empty());
/// ```
pub struct Arena<T> {
    head: Option<Handle>,
    chunks: Vec<Vec<Slot<T>>>,
    chunk_size: usize,
    len: usize,
    capacity: usize,
}

impl<T> Arena<T> {
    fn is_valid_handle(&self, handle: Handle) -> bool {
        handle.chunk_index < self.chunks.len()
            && handle.slot_index < self.chunks[handle.chunk_index].len()
    }

    /// Constructs a new, empty `Arena<T>` holding up to `chunk_size` objects per chunk. A
    /// `chunk_size` of zero is treated as one.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::arena::Arena;
    ///
    /// let arena: Arena<u32> = Arena::new(1024);
    /// assert_eq!(arena.chunk_size(), 1024);
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        Arena {
            head: None,
            chunks: Vec::new(),
            chunk_size: chunk_size.max(1),
            len: 0,
            capacity: 0,
        }
    }

    /// Returns the number of slots allocated per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Moves `value` into the arena and returns a handle to it. Vacant slots are reused before a
    /// new chunk is created.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::arena::Arena;
    ///
    /// let mut arena = Arena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(x), Some(&0));
    /// ```
    pub fn allocate(&mut self, value: T) -> Handle {
        if self.len == self.capacity {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            self.capacity += self.chunk_size;
        }
        self.len += 1;

        match self.head.take() {
            None => {
                let chunk_index = self.chunks.len() - 1;
                let last_chunk = &mut self.chunks[chunk_index];
                last_chunk.push(Slot::Occupied(value));
                Handle {
                    chunk_index,
                    slot_index: last_chunk.len() - 1,
                }
            },
            Some(handle) => {
                let vacant_slot = mem::replace(
                    &mut self.chunks[handle.chunk_index][handle.slot_index],
                    Slot::Occupied(value),
                );
                match vacant_slot {
                    Slot::Vacant(next) => {
                        self.head = next;
                        handle
                    },
                    Slot::Occupied(_) => panic!("Error: free list points at an occupied slot."),
                }
            },
        }
    }

    /// Removes the object behind `handle` from the arena and returns it. The slot is reused by
    /// the next allocation.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not refer to an occupied slot.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::arena::Arena;
    ///
    /// let mut arena = Arena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.free(x), 0);
    /// ```
    pub fn free(&mut self, handle: Handle) -> T {
        if !self.is_valid_handle(handle) {
            panic!("Error: attempting to free an invalid slot.");
        }
        let old_slot = mem::replace(
            &mut self.chunks[handle.chunk_index][handle.slot_index],
            Slot::Vacant(self.head),
        );
        match old_slot {
            Slot::Vacant(next) => {
                self.chunks[handle.chunk_index][handle.slot_index] = Slot::Vacant(next);
                panic!("Error: attempting to free a vacant slot.");
            },
            Slot::Occupied(value) => {
                self.len -= 1;
                self.head = Some(handle);
                value
            },
        }
    }

    /// Returns an immutable reference to the object behind `handle`, or `None` if the slot is
    /// vacant or out of bounds.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        if !self.is_valid_handle(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.slot_index] {
            Slot::Occupied(ref value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the object behind `handle`, or `None` if the slot is vacant
    /// or out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::arena::Arena;
    ///
    /// let mut arena = Arena::new(1024);
    /// let x = arena.allocate(0);
    /// *arena.get_mut(x).unwrap() = 3;
    /// assert_eq!(arena[x], 3);
    /// ```
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if !self.is_valid_handle(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.slot_index] {
            Slot::Occupied(ref mut value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    /// Returns mutable references to two distinct objects at once. Returns `None` if the handles
    /// are equal or either slot is vacant or out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_avl::arena::Arena;
    /// use std::mem;
    ///
    /// let mut arena = Arena::new(1);
    /// let x = arena.allocate(1);
    /// let y = arena.allocate(2);
    /// if let Some((a, b)) = arena.get_pair_mut(x, y) {
    ///     mem::swap(a, b);
    /// }
    /// assert_eq!((arena[x], arena[y]), (2, 1));
    /// ```
    pub fn get_pair_mut(&mut self, a: Handle, b: Handle) -> Option<(&mut T, &mut T)> {
        if a == b || !self.is_valid_handle(a) || !self.is_valid_handle(b) {
            return None;
        }

        let (slot_a, slot_b) = if a.chunk_index == b.chunk_index {
            let chunk = &mut self.chunks[a.chunk_index];
            if a.slot_index < b.slot_index {
                let (lo, hi) = chunk.split_at_mut(b.slot_index);
                (&mut lo[a.slot_index], &mut hi[0])
            } else {
                let (lo, hi) = chunk.split_at_mut(a.slot_index);
                (&mut hi[0], &mut lo[b.slot_index])
            }
        } else if a.chunk_index < b.chunk_index {
            let (lo, hi) = self.chunks.split_at_mut(b.chunk_index);
            (&mut lo[a.chunk_index][a.slot_index], &mut hi[0][b.slot_index])
        } else {
            let (lo, hi) = self.chunks.split_at_mut(a.chunk_index);
            (&mut hi[0][a.slot_index], &mut lo[b.chunk_index][b.slot_index])
        };

        match (slot_a, slot_b) {
            (Slot::Occupied(x), Slot::Occupied(y)) => Some((x, y)),
            _ => None,
        }
    }

    /// Returns the number of live objects in the arena.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every object in the arena and releases all chunks. Previously returned handles
    /// become invalid.
    pub fn clear(&mut self) {
        self.head = None;
        self.chunks.clear();
        self.len = 0;
        self.capacity = 0;
    }
}

impl<T> Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(handle).expect("Error: handle refers to a vacant slot.")
    }
}

impl<T> IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(handle).expect("Error: handle refers to a vacant slot.")
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, Handle};

    fn handle(chunk_index: usize, slot_index: usize) -> Handle {
        Handle { chunk_index, slot_index }
    }

    #[test]
    #[should_panic]
    fn test_free_invalid_slot() {
        let mut arena: Arena<u32> = Arena::new(1024);
        arena.free(handle(0, 0));
    }

    #[test]
    #[should_panic]
    fn test_free_vacant_slot() {
        let mut arena = Arena::new(1024);
        let x = arena.allocate(0);
        arena.free(x);
        arena.free(x);
    }

    #[test]
    fn test_allocate_multiple_chunks() {
        let mut arena = Arena::new(2);
        assert_eq!(arena.allocate(0), handle(0, 0));
        assert_eq!(arena.allocate(0), handle(0, 1));
        assert_eq!(arena.allocate(0), handle(1, 0));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_zero_chunk_size() {
        let mut arena = Arena::new(0);
        assert_eq!(arena.chunk_size(), 1);
        assert_eq!(arena.allocate(0), handle(0, 0));
        assert_eq!(arena.allocate(0), handle(1, 0));
    }

    #[test]
    fn test_free_reuses_slots() {
        let mut arena = Arena::new(1024);
        let x = arena.allocate(0);
        let y = arena.allocate(1);
        assert_eq!(arena.free(x), 0);
        assert_eq!(arena.free(y), 1);
        assert!(arena.is_empty());
        assert_eq!(arena.allocate(2), y);
        assert_eq!(arena.allocate(3), x);
        assert_eq!(arena.allocate(4), handle(0, 2));
    }

    #[test]
    fn test_get_vacant_slot() {
        let mut arena = Arena::new(1024);
        let x = arena.allocate(0);
        arena.free(x);
        assert_eq!(arena.get(x), None);
        assert_eq!(arena.get_mut(x), None);
        assert_eq!(arena.get(handle(3, 0)), None);
    }

    #[test]
    fn test_get_pair_mut_same_chunk() {
        let mut arena = Arena::new(1024);
        let x = arena.allocate(1);
        let y = arena.allocate(2);
        {
            let (a, b) = arena.get_pair_mut(y, x).unwrap();
            assert_eq!((*a, *b), (2, 1));
            *a = 20;
            *b = 10;
        }
        assert_eq!(arena[x], 10);
        assert_eq!(arena[y], 20);
    }

    #[test]
    fn test_get_pair_mut_across_chunks() {
        let mut arena = Arena::new(1);
        let x = arena.allocate(1);
        let y = arena.allocate(2);
        {
            let (a, b) = arena.get_pair_mut(x, y).unwrap();
            assert_eq!((*a, *b), (1, 2));
        }
        let (a, b) = arena.get_pair_mut(y, x).unwrap();
        assert_eq!((*a, *b), (2, 1));
    }

    #[test]
    fn test_get_pair_mut_rejects_aliasing() {
        let mut arena = Arena::new(1024);
        let x = arena.allocate(1);
        let y = arena.allocate(2);
        assert!(arena.get_pair_mut(x, x).is_none());
        arena.free(y);
        assert!(arena.get_pair_mut(x, y).is_none());
    }

    #[test]
    fn test_clear() {
        let mut arena = Arena::new(2);
        for i in 0..5 {
            arena.allocate(i);
        }
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.allocate(7), handle(0, 0));
    }
}
