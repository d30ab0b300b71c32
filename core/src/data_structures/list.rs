//! Arena-indexed doubly-linked list with generation-checked handles
//!
//! Nodes live in a slot arena and are linked through slot indices instead of
//! pointers. Every handle records the generation of the slot it was issued
//! for; removing a node bumps that generation, so a detached handle is
//! detected on use instead of silently reaching a recycled node.
//!
//! # Complexity
//! - `insert_front`, `remove`, `get`, `next`: O(1)
//! - `iter`, `clear`: O(n)
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::fmt;
use std::mem;

use thiserror::Error;

/// Opaque reference to a node of a [`NodeList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListHandle {
    slot: usize,
    generation: u32,
}

impl fmt::Display for ListHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}@{}", self.slot, self.generation)
    }
}

/// List access errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    /// The handle refers to a node that has been removed
    #[error("Invalid list node: {0}")]
    InvalidNode(ListHandle),
}

/// Position produced by forward traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// A live node
    Node(ListHandle),
    /// Traversal ran past the last node
    End,
    /// Traversal started from a node that is no longer in the list
    Stale(ListHandle),
}

#[derive(Debug, Clone)]
enum SlotState<T> {
    Occupied {
        item: T,
        prev: Option<usize>,
        next: Option<usize>,
    },
    Vacant {
        next_free: Option<usize>,
    },
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    state: SlotState<T>,
}

/// Doubly-linked list over a slot arena
#[derive(Debug, Clone)]
pub struct NodeList<T> {
    slots: Vec<Slot<T>>,
    head: Option<usize>,
    free_head: Option<usize>,
    len: usize,
}

impl<T> Default for NodeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NodeList<T> {
    /// Creates an empty list
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: None,
            free_head: None,
            len: 0,
        }
    }

    /// Number of live nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `item` before the current front node and returns its handle
    pub fn insert_front(&mut self, item: T) -> ListHandle {
        let state = SlotState::Occupied {
            item,
            prev: None,
            next: self.head,
        };

        let slot = match self.free_head {
            Some(slot) => {
                let entry = &mut self.slots[slot];
                if let SlotState::Vacant { next_free } = entry.state {
                    self.free_head = next_free;
                }
                entry.state = state;
                slot
            }
            None => {
                self.slots.push(Slot { generation: 0, state });
                self.slots.len() - 1
            }
        };

        if let Some(old_head) = self.head {
            if let SlotState::Occupied { prev, .. } = &mut self.slots[old_head].state {
                *prev = Some(slot);
            }
        }

        self.head = Some(slot);
        self.len += 1;
        self.handle_at(slot)
    }

    /// Returns true while the node behind `handle` is still linked
    #[inline]
    pub fn is_valid(&self, handle: ListHandle) -> bool {
        self.links(handle).is_some()
    }

    /// Borrows the item behind `handle`
    pub fn get(&self, handle: ListHandle) -> Result<&T, ListError> {
        match self.slots.get(handle.slot) {
            Some(Slot {
                generation,
                state: SlotState::Occupied { item, .. },
            }) if *generation == handle.generation => Ok(item),
            _ => Err(ListError::InvalidNode(handle)),
        }
    }

    /// Mutably borrows the item behind `handle`
    pub fn get_mut(&mut self, handle: ListHandle) -> Result<&mut T, ListError> {
        match self.slots.get_mut(handle.slot) {
            Some(Slot {
                generation,
                state: SlotState::Occupied { item, .. },
            }) if *generation == handle.generation => Ok(item),
            _ => Err(ListError::InvalidNode(handle)),
        }
    }

    /// Cursor at the first node
    pub fn front(&self) -> Cursor {
        match self.head {
            Some(slot) => Cursor::Node(self.handle_at(slot)),
            None => Cursor::End,
        }
    }

    /// Cursor at the node following `handle`
    pub fn next(&self, handle: ListHandle) -> Cursor {
        match self.links(handle) {
            Some((_, Some(next))) => Cursor::Node(self.handle_at(next)),
            Some((_, None)) => Cursor::End,
            None => Cursor::Stale(handle),
        }
    }

    /// Unlinks the node behind `handle` and returns its item
    pub fn remove(&mut self, handle: ListHandle) -> Result<T, ListError> {
        let (prev, next) = self
            .links(handle)
            .ok_or(ListError::InvalidNode(handle))?;

        let slot = &mut self.slots[handle.slot];
        let state = mem::replace(
            &mut slot.state,
            SlotState::Vacant {
                next_free: self.free_head,
            },
        );
        slot.generation = slot.generation.wrapping_add(1);
        self.free_head = Some(handle.slot);

        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        if let Some(next) = next {
            self.set_prev(next, prev);
        }
        self.len -= 1;

        match state {
            SlotState::Occupied { item, .. } => Ok(item),
            // links() already proved the slot was occupied
            SlotState::Vacant { .. } => Err(ListError::InvalidNode(handle)),
        }
    }

    /// Drops every node; all outstanding handles become invalid
    pub fn clear(&mut self) {
        let mut free_head = None;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if matches!(slot.state, SlotState::Occupied { .. }) {
                slot.generation = slot.generation.wrapping_add(1);
            }
            slot.state = SlotState::Vacant { next_free: free_head };
            free_head = Some(index);
        }
        self.free_head = free_head;
        self.head = None;
        self.len = 0;
    }

    /// Front-to-back iteration yielding each node's handle and item
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
            remaining: self.len,
        }
    }

    fn handle_at(&self, slot: usize) -> ListHandle {
        ListHandle {
            slot,
            generation: self.slots[slot].generation,
        }
    }

    fn links(&self, handle: ListHandle) -> Option<(Option<usize>, Option<usize>)> {
        match self.slots.get(handle.slot) {
            Some(Slot {
                generation,
                state: SlotState::Occupied { prev, next, .. },
            }) if *generation == handle.generation => Some((*prev, *next)),
            _ => None,
        }
    }

    fn set_next(&mut self, slot: usize, value: Option<usize>) {
        if let SlotState::Occupied { next, .. } = &mut self.slots[slot].state {
            *next = value;
        }
    }

    fn set_prev(&mut self, slot: usize, value: Option<usize>) {
        if let SlotState::Occupied { prev, .. } = &mut self.slots[slot].state {
            *prev = value;
        }
    }
}

/// Borrowing iterator over a [`NodeList`]
#[derive(Debug)]
pub struct Iter<'a, T> {
    list: &'a NodeList<T>,
    current: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (ListHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.current?;
        let entry = &self.list.slots[slot];
        match &entry.state {
            SlotState::Occupied { item, next, .. } => {
                self.current = *next;
                self.remaining -= 1;
                Some((
                    ListHandle {
                        slot,
                        generation: entry.generation,
                    },
                    item,
                ))
            }
            SlotState::Vacant { .. } => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a NodeList<T> {
    type Item = (ListHandle, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator that moves items out front to back
#[derive(Debug)]
pub struct IntoIter<T> {
    list: NodeList<T>,
    current: Option<usize>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let slot = self.current?;
        let state = mem::replace(
            &mut self.list.slots[slot].state,
            SlotState::Vacant { next_free: None },
        );
        match state {
            SlotState::Occupied { item, next, .. } => {
                self.current = next;
                Some(item)
            }
            SlotState::Vacant { .. } => None,
        }
    }
}

impl<T> IntoIterator for NodeList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let current = self.head;
        IntoIter { list: self, current }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(list: &NodeList<i32>) -> Vec<i32> {
        list.iter().map(|(_, item)| *item).collect()
    }

    #[test]
    fn test_insert_front_reverses_order() {
        let mut list = NodeList::new();
        for value in 1..=4 {
            list.insert_front(value);
        }

        assert_eq!(list.len(), 4);
        assert_eq!(items(&list), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_remove_relinks_neighbours() {
        let mut list = NodeList::new();
        let a = list.insert_front(1);
        let b = list.insert_front(2);
        let c = list.insert_front(3);

        assert_eq!(list.remove(b), Ok(2));
        assert_eq!(items(&list), vec![3, 1]);

        assert_eq!(list.remove(c), Ok(3));
        assert_eq!(items(&list), vec![1]);
        assert_eq!(list.front(), Cursor::Node(a));

        assert_eq!(list.remove(a), Ok(1));
        assert!(list.is_empty());
        assert_eq!(list.front(), Cursor::End);
    }

    #[test]
    fn test_removed_handle_is_detected() {
        let mut list = NodeList::new();
        let handle = list.insert_front("x");
        list.remove(handle).unwrap();

        assert!(!list.is_valid(handle));
        assert_eq!(list.get(handle), Err(ListError::InvalidNode(handle)));
        assert_eq!(list.remove(handle), Err(ListError::InvalidNode(handle)));
        assert_eq!(list.next(handle), Cursor::Stale(handle));
    }

    #[test]
    fn test_slot_reuse_does_not_alias_old_handle() {
        let mut list = NodeList::new();
        let old = list.insert_front(10);
        list.remove(old).unwrap();
        let new = list.insert_front(20);

        assert!(list.get(old).is_err());
        assert_eq!(list.get(new), Ok(&20));
        assert_ne!(old, new);
    }

    #[test]
    fn test_cursor_walk_matches_iter() {
        let mut list = NodeList::new();
        for value in 0..5 {
            list.insert_front(value);
        }

        let mut walked = Vec::new();
        let mut cursor = list.front();
        while let Cursor::Node(handle) = cursor {
            walked.push(*list.get(handle).unwrap());
            cursor = list.next(handle);
        }

        assert_eq!(cursor, Cursor::End);
        assert_eq!(walked, items(&list));
    }

    #[test]
    fn test_get_mut_updates_item() {
        let mut list = NodeList::new();
        let handle = list.insert_front(1);
        *list.get_mut(handle).unwrap() = 7;
        assert_eq!(items(&list), vec![7]);
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut list = NodeList::new();
        let first = list.insert_front(1);
        let second = list.insert_front(2);
        list.clear();

        assert!(list.is_empty());
        assert!(!list.is_valid(first));
        assert!(!list.is_valid(second));

        let fresh = list.insert_front(3);
        assert!(list.get(first).is_err());
        assert!(list.get(second).is_err());
        assert_eq!(list.get(fresh), Ok(&3));
        assert_eq!(items(&list), vec![3]);
    }

    #[test]
    fn test_into_iter_moves_items() {
        let mut list = NodeList::new();
        list.insert_front(String::from("b"));
        list.insert_front(String::from("a"));

        let moved: Vec<String> = list.into_iter().collect();
        assert_eq!(moved, vec!["a".to_string(), "b".to_string()]);
    }
}
