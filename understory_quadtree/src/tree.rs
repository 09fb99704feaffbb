// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The owning quadtree: insertion, queries, resize, and clear.

use core::fmt::Debug;

use kurbo::{Point, Rect};
use tracing::{debug, warn};

use crate::geometry::point_rect;
use crate::pool::{self, NodePool};
use crate::store::ItemStore;
use crate::types::{NodeFlags, NodeId, QuadTreeItem};
use crate::view::ReadOnlyQuadTree;

/// A region quadtree over `kurbo` rectangles with pooled nodes.
///
/// Each node holds up to `threshold` items. Once full, the next insert splits it
/// into four equal quadrants and later items are pushed down to the first child
/// (TL, TR, BL, BR) that fully contains them. Items already held by a node are
/// not redistributed when it splits. An item that fits a node but none of its
/// children is kept at that node when [`NodeFlags::ALLOW_OVERFLOW`] is set and
/// rejected otherwise.
///
/// With [`NodeFlags::FUZZY_BOUNDARIES`] the root accepts anything that overlaps
/// its bounds rather than only what it contains. Children are always strict.
///
/// Nodes [`MAX_DEPTH`][Self::MAX_DEPTH] levels below the root, and nodes with
/// zero width or height, never split; once full they keep taking items past
/// `threshold`. This bounds the depth reached by many coincident items.
///
/// Node storage and query buffers come from the tree's [`NodePool`], so a tree
/// that is cleared and refilled every frame stops allocating once warm.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Point, Rect};
/// use understory_quadtree::{NodeFlags, QuadTree};
///
/// // Boxes span the full row height, so any that arrive after the root splits
/// // straddle the split line and are kept at the root.
/// let bounds = Rect::new(0.0, 0.0, 100.0, 20.0);
/// let mut tree = QuadTree::new(bounds, 4, NodeFlags::ALLOW_OVERFLOW);
/// for (i, x) in [0.0, 10.0, 20.0, 30.0, 40.0, 50.0].into_iter().enumerate() {
///     assert!(tree.insert(Rect::new(x, 0.0, x + 10.0, 20.0), i));
/// }
///
/// // Map a click back to the closest box.
/// let hit = tree.query_nearest(tree.bounds(), Point::new(33.0, 5.0)).unwrap();
/// assert_eq!(hit.value, 3);
///
/// // Range queries hand out pooled buffers; give them back when done.
/// let hits = tree.query(Rect::new(0.0, 0.0, 15.0, 20.0)).unwrap();
/// assert_eq!(hits.len(), 2);
/// tree.return_item_list(hits);
/// ```
pub struct QuadTree<T> {
    pool: NodePool<T>,
    root: NodeId,
    len: usize,
}

impl<T> Debug for QuadTree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QuadTree")
            .field("bounds", &self.bounds())
            .field("len", &self.len)
            .field("divided", &self.is_divided())
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl<T> QuadTree<T> {
    /// Depth below the root at which nodes stop subdividing.
    pub const MAX_DEPTH: usize = pool::MAX_DEPTH;

    /// Create an empty tree with a fresh pool.
    ///
    /// `threshold` is the number of items a node holds before it subdivides; zero
    /// is treated as one.
    pub fn new(bounds: Rect, threshold: usize, flags: NodeFlags) -> Self {
        Self::with_pool(NodePool::new(), bounds, threshold, flags)
    }

    /// Create an empty tree whose nodes and buffers come from `pool`.
    pub fn with_pool(
        mut pool: NodePool<T>,
        bounds: Rect,
        threshold: usize,
        flags: NodeFlags,
    ) -> Self {
        let root = pool.rent_node(bounds, threshold, flags);
        Self {
            pool,
            root,
            len: 0,
        }
    }

    /// Tear the tree down and hand back its pool, with every node returned to it.
    pub fn into_pool(self) -> NodePool<T> {
        let Self { mut pool, root, .. } = self;
        pool.return_node(root)
            .expect("quadtree invariant violated: root was not rented");
        pool
    }

    /// Insert `value` covering `bounds`. Returns `false` if the tree rejected it.
    ///
    /// Rejections happen when `bounds` is outside the root (or, for a fuzzy root,
    /// does not touch it), or when the item straddles a split line and overflow
    /// is disabled. Rejected values are dropped; use
    /// [`try_insert`][Self::try_insert] to get them back.
    pub fn insert(&mut self, bounds: Rect, value: T) -> bool {
        self.try_insert(QuadTreeItem::new(bounds, value)).is_ok()
    }

    /// Insert an item, handing it back if the tree rejected it.
    pub fn try_insert(&mut self, item: QuadTreeItem<T>) -> Result<(), QuadTreeItem<T>> {
        self.pool.insert(self.root, item)?;
        self.len += 1;
        Ok(())
    }

    /// Visit items whose bounds overlap `range`, without allocating.
    ///
    /// Order is pre-order: a node's own items, then its TL, TR, BL and BR
    /// subtrees. Returns `false` when `range` misses the root entirely.
    pub fn visit_rect<'a, F>(&'a self, range: Rect, f: F) -> bool
    where
        F: FnMut(&'a QuadTreeItem<T>),
    {
        self.pool.visit_rect(self.root, range, f)
    }

    /// Items whose bounds overlap `range`, or `None` when `range` misses the root.
    ///
    /// The buffer is rented from the pool; pass it to
    /// [`return_item_list`][Self::return_item_list] once consumed.
    pub fn query(&mut self, range: Rect) -> Option<ItemStore<T>>
    where
        T: Clone,
    {
        let mut out = self.pool.rent_item_list();
        if self.pool.visit_rect(self.root, range, |item| out.add(item.clone())) {
            Some(out)
        } else {
            self.pool.return_item_list(out);
            None
        }
    }

    /// Items whose bounds contain `point` (a query with a zero-size rect).
    pub fn query_point(&mut self, point: Point) -> Option<ItemStore<T>>
    where
        T: Clone,
    {
        self.query(point_rect(point))
    }

    /// Among items overlapping `range`, the one whose bounds are closest to `start`.
    ///
    /// Distance is measured from `start` to the nearest point of each item's
    /// bounds (zero when inside). Equal distances keep whichever item comes first
    /// in [`visit_rect`][Self::visit_rect] order.
    pub fn query_nearest(&self, range: Rect, start: Point) -> Option<&QuadTreeItem<T>> {
        self.pool.nearest(self.root, range, start)
    }

    /// Visit every item in pre-order.
    pub fn visit_items<'a, F>(&'a self, f: F)
    where
        F: FnMut(&'a QuadTreeItem<T>),
    {
        self.pool.visit_items(self.root, f);
    }

    /// Every item in pre-order, in a buffer rented from the pool.
    pub fn get_items(&mut self) -> ItemStore<T>
    where
        T: Clone,
    {
        let mut out = self.pool.rent_item_list();
        self.pool.visit_items(self.root, |item| out.add(item.clone()));
        out
    }

    /// Move the root to `bounds` and reinsert every item.
    ///
    /// Returns how many items no longer fit and were dropped.
    pub fn resize(&mut self, bounds: Rect) -> usize {
        self.resize_with(bounds, drop)
    }

    /// Like [`resize`][Self::resize], passing each dropped item to `on_drop`.
    pub fn resize_with<F>(&mut self, bounds: Rect, mut on_drop: F) -> usize
    where
        F: FnMut(QuadTreeItem<T>),
    {
        let mut items = self.pool.rent_item_list();
        self.pool.drain_into(self.root, &mut items);
        self.pool.clear_node(self.root);
        self.pool.node_mut(self.root).bounds = bounds;

        let mut dropped = 0;
        for item in items.drain() {
            if let Err(item) = self.pool.insert(self.root, item) {
                dropped += 1;
                on_drop(item);
            }
        }
        self.pool.return_item_list(items);
        self.len -= dropped;

        if dropped > 0 {
            warn!(dropped, ?bounds, "quadtree resize dropped items outside the new bounds");
        }
        debug!(kept = self.len, ?bounds, "quadtree resized");
        dropped
    }

    /// Remove every item and return all nodes below the root to the pool.
    pub fn clear(&mut self) {
        let returned = self.pool.clear_node(self.root);
        self.len = 0;
        debug!(returned, "quadtree cleared");
    }

    /// Give a buffer from [`query`][Self::query] or [`get_items`][Self::get_items]
    /// back to the pool.
    pub fn return_item_list(&mut self, list: ItemStore<T>) {
        self.pool.return_item_list(list);
    }

    /// Number of items stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Region covered by the root.
    pub fn bounds(&self) -> Rect {
        self.pool.node(self.root).bounds
    }

    /// Items a node holds before it subdivides.
    pub fn threshold(&self) -> usize {
        self.pool.node(self.root).threshold
    }

    /// Insertion policy of the root.
    pub fn flags(&self) -> NodeFlags {
        self.pool.node(self.root).flags
    }

    /// Whether the root has been subdivided.
    pub fn is_divided(&self) -> bool {
        self.pool.node(self.root).children.is_some()
    }

    /// The pool backing this tree.
    pub fn pool(&self) -> &NodePool<T> {
        &self.pool
    }

    /// Mutable access to the pool, e.g. to rent scratch item lists.
    ///
    /// The tree's own node handles are never exposed, and handles issued by
    /// another pool are rejected with [`PoolError::UnknownNode`][crate::PoolError::UnknownNode],
    /// so [`NodePool::return_node`] through this reference cannot free a node
    /// of the tree.
    pub fn pool_mut(&mut self) -> &mut NodePool<T> {
        &mut self.pool
    }

    /// Query-only view of the root.
    pub fn as_read_only(&self) -> ReadOnlyQuadTree<'_, T> {
        ReadOnlyQuadTree::new(&self.pool, self.root)
    }
}
