// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Borrowed, query-only access to a node and its subtree.

use core::fmt::Debug;

use kurbo::{Point, Rect};

use crate::geometry::point_rect;
use crate::pool::{Node, NodePool};
use crate::store::ItemStore;
use crate::types::{NodeFlags, NodeId, QuadTreeItem};

/// Read-only facade over one node of a quadtree.
///
/// Obtained from [`QuadTree::as_read_only`][crate::QuadTree::as_read_only] or
/// [`NodePool::view`]. The view borrows the pool, so the tree cannot be
/// mutated while a view is alive. Child accessors return views of the same
/// kind, which makes it possible to walk the structure for debugging or
/// overlay drawing.
pub struct ReadOnlyQuadTree<'a, T> {
    pool: &'a NodePool<T>,
    id: NodeId,
}

impl<T> Clone for ReadOnlyQuadTree<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ReadOnlyQuadTree<'_, T> {}

impl<T> Debug for ReadOnlyQuadTree<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let node = self.node();
        f.debug_struct("ReadOnlyQuadTree")
            .field("bounds", &node.bounds)
            .field("flags", &node.flags)
            .field("items", &node.items.len())
            .field("divided", &node.children.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, T> ReadOnlyQuadTree<'a, T> {
    pub(crate) fn new(pool: &'a NodePool<T>, id: NodeId) -> Self {
        Self { pool, id }
    }

    fn node(&self) -> &'a Node<T> {
        self.pool.node(self.id)
    }

    fn child(&self, quadrant: usize) -> Option<Self> {
        self.node()
            .children
            .map(|children| Self::new(self.pool, children[quadrant]))
    }

    /// Region covered by this node.
    pub fn bounds(&self) -> Rect {
        self.node().bounds
    }

    /// Items this node holds before it subdivides.
    pub fn threshold(&self) -> usize {
        self.node().threshold
    }

    /// Insertion policy of this node.
    pub fn flags(&self) -> NodeFlags {
        self.node().flags
    }

    /// Whether this node accepts items by overlap rather than containment.
    pub fn is_fuzzy(&self) -> bool {
        self.flags().contains(NodeFlags::FUZZY_BOUNDARIES)
    }

    /// Whether this node keeps items that no child accepts.
    pub fn allows_overflow(&self) -> bool {
        self.flags().contains(NodeFlags::ALLOW_OVERFLOW)
    }

    /// Whether this node has four children.
    pub fn is_divided(&self) -> bool {
        self.node().children.is_some()
    }

    /// Items stored directly at this node (not its descendants), in storage order.
    pub fn items(&self) -> &'a [QuadTreeItem<T>] {
        self.node().items.as_slice()
    }

    /// Top-left child, if divided.
    pub fn top_left(&self) -> Option<Self> {
        self.child(0)
    }

    /// Top-right child, if divided.
    pub fn top_right(&self) -> Option<Self> {
        self.child(1)
    }

    /// Bottom-left child, if divided.
    pub fn bottom_left(&self) -> Option<Self> {
        self.child(2)
    }

    /// Bottom-right child, if divided.
    pub fn bottom_right(&self) -> Option<Self> {
        self.child(3)
    }

    /// All four children in TL, TR, BL, BR order, if divided.
    pub fn children(&self) -> Option<[Self; 4]> {
        self.node()
            .children
            .map(|children| children.map(|id| Self::new(self.pool, id)))
    }

    /// Visit items overlapping `range`; see [`QuadTree::visit_rect`][crate::QuadTree::visit_rect].
    pub fn visit_rect<F: FnMut(&'a QuadTreeItem<T>)>(&self, range: Rect, f: F) -> bool {
        self.pool.visit_rect(self.id, range, f)
    }

    /// Visit every item in the subtree in pre-order.
    pub fn visit_items<F: FnMut(&'a QuadTreeItem<T>)>(&self, f: F) {
        self.pool.visit_items(self.id, f);
    }

    /// Append items overlapping `range` to `out`.
    ///
    /// Returns `false`, leaving `out` untouched, when `range` misses this node.
    pub fn query_into(&self, range: Rect, out: &mut ItemStore<T>) -> bool
    where
        T: Clone,
    {
        self.visit_rect(range, |item| out.add(item.clone()))
    }

    /// Items overlapping `range`, or `None` when `range` misses this node.
    ///
    /// A view cannot rent from the pool, so the result is freshly allocated.
    /// Prefer [`query_into`][Self::query_into] with a reused buffer in hot paths.
    pub fn query(&self, range: Rect) -> Option<ItemStore<T>>
    where
        T: Clone,
    {
        let mut out = ItemStore::new();
        self.query_into(range, &mut out).then_some(out)
    }

    /// Items whose bounds contain `point`.
    pub fn query_point(&self, point: Point) -> Option<ItemStore<T>>
    where
        T: Clone,
    {
        self.query(point_rect(point))
    }

    /// The item overlapping `range` closest to `start`; ties favor traversal order.
    pub fn query_nearest(&self, range: Rect, start: Point) -> Option<&'a QuadTreeItem<T>> {
        self.pool.nearest(self.id, range, start)
    }

    /// Every item in the subtree, in pre-order.
    pub fn get_items(&self) -> ItemStore<T>
    where
        T: Clone,
    {
        let mut out = ItemStore::new();
        self.visit_items(|item| out.add(item.clone()));
        out
    }
}
