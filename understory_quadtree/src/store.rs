// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable dense list of quadtree items.

use alloc::vec::Vec;
use core::ops::Index;

use crate::types::QuadTreeItem;

/// A growable list of [`QuadTreeItem`]s that keeps its allocation across clears.
///
/// Nodes store their items in an `ItemStore`, and query results are delivered in
/// one. Both kinds circulate through the [`NodePool`][crate::NodePool], so a
/// tree rebuilt every frame settles into a steady state without allocating.
///
/// Clearing drops every payload immediately; only the backing capacity is kept.
/// Indexing past [`len`][Self::len] panics; use [`get`][Self::get] for a checked
/// lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemStore<T> {
    items: Vec<QuadTreeItem<T>>,
}

impl<T> Default for ItemStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ItemStore<T> {
    /// Create an empty store without allocating.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty store with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Append an item, growing the backing storage geometrically when full.
    #[inline]
    pub fn add(&mut self, item: QuadTreeItem<T>) {
        self.items.push(item);
    }

    /// Append every item yielded by `items`.
    pub fn add_range<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = QuadTreeItem<T>>,
    {
        self.items.extend(items);
    }

    /// Remove all items, dropping their payloads. Capacity is retained.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Move all items out in storage order, leaving the store empty with its
    /// capacity intact.
    pub fn drain(&mut self) -> impl Iterator<Item = QuadTreeItem<T>> + '_ {
        self.items.drain(..)
    }

    /// Number of items held.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items the store can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// The item at `index`, if in range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&QuadTreeItem<T>> {
        self.items.get(index)
    }

    /// All items as a slice, in storage order.
    #[inline]
    pub fn as_slice(&self) -> &[QuadTreeItem<T>] {
        &self.items
    }

    /// Iterate over items in storage order.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, QuadTreeItem<T>> {
        self.items.iter()
    }
}

impl<T> Index<usize> for ItemStore<T> {
    type Output = QuadTreeItem<T>;

    #[track_caller]
    fn index(&self, index: usize) -> &Self::Output {
        match self.items.get(index) {
            Some(item) => item,
            None => panic!(
                "ItemStore index out of bounds: the len is {} but the index is {index}",
                self.items.len()
            ),
        }
    }
}

impl<'a, T> IntoIterator for &'a ItemStore<T> {
    type Item = &'a QuadTreeItem<T>;
    type IntoIter = core::slice::Iter<'a, QuadTreeItem<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for ItemStore<T> {
    type Item = QuadTreeItem<T>;
    type IntoIter = alloc::vec::IntoIter<QuadTreeItem<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T> Extend<QuadTreeItem<T>> for ItemStore<T> {
    fn extend<I: IntoIterator<Item = QuadTreeItem<T>>>(&mut self, iter: I) {
        self.add_range(iter);
    }
}

impl<T> FromIterator<QuadTreeItem<T>> for ItemStore<T> {
    fn from_iter<I: IntoIterator<Item = QuadTreeItem<T>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use kurbo::Rect;

    fn item(v: u32) -> QuadTreeItem<u32> {
        let x = f64::from(v);
        QuadTreeItem::new(Rect::new(x, x, x + 1.0, x + 1.0), v)
    }

    #[test]
    fn add_index_and_iterate() {
        let mut store = ItemStore::new();
        store.add(item(1));
        store.add_range([item(2), item(3)]);
        assert_eq!(store.len(), 3);
        assert_eq!(store[1].value, 2);
        assert_eq!(store.get(3), None);
        let values: Vec<u32> = store.iter().map(|i| i.value).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut store: ItemStore<u32> = (0..32).map(item).collect();
        let capacity = store.capacity();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), capacity);
    }

    #[test]
    fn clear_releases_payloads() {
        let payload = Rc::new(());
        let mut store = ItemStore::new();
        store.add(QuadTreeItem::new(Rect::ZERO, Rc::clone(&payload)));
        assert_eq!(Rc::strong_count(&payload), 2);
        store.clear();
        assert_eq!(Rc::strong_count(&payload), 1);
    }

    #[test]
    fn drain_moves_items_in_order() {
        let mut store: ItemStore<u32> = (0..4).map(item).collect();
        let drained: Vec<u32> = store.drain().map(|i| i.value).collect();
        assert_eq!(drained, vec![0, 1, 2, 3]);
        assert!(store.is_empty());
        assert!(store.capacity() >= 4);
    }

    #[test]
    #[should_panic(expected = "ItemStore index out of bounds")]
    fn index_past_len_panics() {
        let store: ItemStore<u32> = (0..2).map(item).collect();
        let _ = &store[2];
    }
}
