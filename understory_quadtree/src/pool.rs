// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node arena and free lists shared by every node of a tree.
//!
//! Nodes live in a flat vector of slots and refer to their children by
//! [`NodeId`]. Returning a node puts its slot on a free list and its item store
//! on a second free list; renting pops from those lists before allocating.
//! Every pool stamps its own tag into the handles it issues, so a handle from
//! one pool is never mistaken for a node of another.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::sync::atomic::{AtomicU32, Ordering};

use kurbo::{Point, Rect};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::PoolError;
use crate::geometry::{contains_rect, distance_sq_to_point, overlaps, quadrants};
use crate::store::ItemStore;
use crate::types::{NodeFlags, NodeId, QuadTreeItem};
use crate::view::ReadOnlyQuadTree;

type NodeStack = SmallVec<[NodeId; 16]>;

/// Levels below the root at which nodes stop subdividing.
pub(crate) const MAX_DEPTH: usize = 16;

static NEXT_POOL_TAG: AtomicU32 = AtomicU32::new(0);

pub(crate) struct Node<T> {
    pub(crate) bounds: Rect,
    pub(crate) threshold: usize,
    pub(crate) flags: NodeFlags,
    /// Zero for a rented node, parent depth plus one for a child.
    pub(crate) depth: usize,
    pub(crate) items: ItemStore<T>,
    /// TL, TR, BL, BR. `Some` iff the node is divided.
    pub(crate) children: Option<[NodeId; 4]>,
}

impl<T> Node<T> {
    #[inline]
    fn accepts(&self, bounds: Rect) -> bool {
        if self.flags.contains(NodeFlags::FUZZY_BOUNDARIES) {
            overlaps(self.bounds, bounds)
        } else {
            contains_rect(self.bounds, bounds)
        }
    }

    /// Whether a full leaf should split rather than keep growing.
    ///
    /// Degenerate bounds would produce quadrants identical to their parent, and
    /// coincident items would otherwise split forever.
    #[inline]
    fn can_subdivide(&self) -> bool {
        self.depth < MAX_DEPTH && self.bounds.width() > 0.0 && self.bounds.height() > 0.0
    }
}

struct Slot<T> {
    generation: u32,
    /// `None` while the slot sits on the free list.
    node: Option<Node<T>>,
}

/// Arena and free-list allocator for quadtree nodes and item stores.
///
/// A pool is single-threaded and performs no locking. To share one between trees,
/// move it: [`QuadTree::into_pool`][crate::QuadTree::into_pool] hands it back and
/// [`QuadTree::with_pool`][crate::QuadTree::with_pool] builds the next tree on it.
///
/// ```rust
/// use kurbo::Rect;
/// use understory_quadtree::{NodeFlags, NodePool};
///
/// let mut pool: NodePool<u32> = NodePool::new();
/// let node = pool.rent_node(Rect::new(0.0, 0.0, 10.0, 10.0), 4, NodeFlags::empty());
/// pool.return_node(node).unwrap();
/// assert_eq!(pool.free_node_count(), 1);
///
/// // Handing the same node back again is reported instead of corrupting the pool.
/// assert!(pool.return_node(node).is_err());
/// ```
pub struct NodePool<T> {
    tag: u32,
    slots: Vec<Slot<T>>,
    free_nodes: Vec<usize>,
    free_lists: Vec<ItemStore<T>>,
}

impl<T> Debug for NodePool<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodePool")
            .field("allocated_nodes", &self.slots.len())
            .field("free_nodes", &self.free_nodes.len())
            .field("free_item_lists", &self.free_lists.len())
            .finish_non_exhaustive()
    }
}

impl<T> Default for NodePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NodePool<T> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            tag: NEXT_POOL_TAG.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free_nodes: Vec::new(),
            free_lists: Vec::new(),
        }
    }

    /// Rent an empty leaf node configured with the given bounds and policy.
    ///
    /// A slot from the free list is reused when available; otherwise the arena
    /// grows by one. A `threshold` of zero is treated as one.
    ///
    /// A node rented here stands alone: items cannot be inserted into it, it can
    /// only be inspected with [`view`][Self::view] and handed back with
    /// [`return_node`][Self::return_node]. To build a tree on this pool's slots,
    /// pass the pool to [`QuadTree::with_pool`][crate::QuadTree::with_pool].
    pub fn rent_node(&mut self, bounds: Rect, threshold: usize, flags: NodeFlags) -> NodeId {
        self.rent_at_depth(bounds, threshold, flags, 0)
    }

    fn rent_at_depth(
        &mut self,
        bounds: Rect,
        threshold: usize,
        flags: NodeFlags,
        depth: usize,
    ) -> NodeId {
        let node = Node {
            bounds,
            threshold: threshold.max(1),
            flags,
            depth,
            items: self.rent_item_list(),
            children: None,
        };
        if let Some(idx) = self.free_nodes.pop() {
            let slot = &mut self.slots[idx];
            debug_assert!(slot.node.is_none(), "free list references a live node");
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            NodeId::new(self.tag, idx, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 1,
                node: Some(node),
            });
            trace!(allocated = self.slots.len(), "node pool grew");
            NodeId::new(self.tag, self.slots.len() - 1, 1)
        }
    }

    /// Return a node rented with [`rent_node`][Self::rent_node].
    ///
    /// The node's subtree is disbanded first: every descendant goes back to the
    /// pool and every item is dropped. Returning a handle twice, or a handle this
    /// pool never issued, is reported as a [`PoolError`] and leaves the pool
    /// unchanged. Handles carry the tag of the pool that issued them, so a
    /// handle from another pool is always [`PoolError::UnknownNode`].
    pub fn return_node(&mut self, id: NodeId) -> Result<(), PoolError> {
        if id.pool() != self.tag {
            return Err(PoolError::UnknownNode(id));
        }
        let slot = self.slots.get(id.idx()).ok_or(PoolError::UnknownNode(id))?;
        if slot.generation != id.generation() {
            return Err(if id.generation() < slot.generation {
                PoolError::AlreadyReturned(id)
            } else {
                PoolError::UnknownNode(id)
            });
        }
        if slot.node.is_none() {
            return Err(PoolError::AlreadyReturned(id));
        }
        self.release(id);
        Ok(())
    }

    /// Rent an empty item store, reusing a returned one when available.
    pub fn rent_item_list(&mut self) -> ItemStore<T> {
        self.free_lists.pop().unwrap_or_default()
    }

    /// Clear `list` and keep it for a later [`rent_item_list`][Self::rent_item_list].
    pub fn return_item_list(&mut self, mut list: ItemStore<T>) {
        list.clear();
        self.free_lists.push(list);
    }

    /// Number of node slots waiting on the free list.
    pub fn free_node_count(&self) -> usize {
        self.free_nodes.len()
    }

    /// Number of item stores waiting on the free list.
    pub fn free_item_list_count(&self) -> usize {
        self.free_lists.len()
    }

    /// Number of nodes currently rented, including every tree's internal nodes.
    pub fn live_node_count(&self) -> usize {
        self.slots.len() - self.free_nodes.len()
    }

    /// Number of node slots the arena has ever allocated.
    pub fn allocated_node_count(&self) -> usize {
        self.slots.len()
    }

    /// Read-only view of a live node and its subtree.
    pub fn view(&self, id: NodeId) -> Option<ReadOnlyQuadTree<'_, T>> {
        self.get(id).map(|_| ReadOnlyQuadTree::new(self, id))
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<T>> {
        if id.pool() != self.tag {
            return None;
        }
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        self.get(id)
            .expect("quadtree invariant violated: stale node handle")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        let slot = self
            .slots
            .get_mut(id.idx())
            .expect("quadtree invariant violated: node handle out of bounds");
        debug_assert_eq!(
            slot.generation,
            id.generation(),
            "quadtree invariant violated: stale node handle"
        );
        slot.node
            .as_mut()
            .expect("quadtree invariant violated: node handle refers to a free slot")
    }

    /// Clear `id` and free its slot. Returns the number of nodes freed.
    fn release(&mut self, id: NodeId) -> usize {
        let freed = self.clear_node(id) + 1;
        let node = self.slots[id.idx()]
            .node
            .take()
            .expect("quadtree invariant violated: releasing a free slot");
        self.return_item_list(node.items);
        self.free_nodes.push(id.idx());
        freed
    }

    /// Disband the subtree below `id` and drop its items. `id` itself stays rented.
    ///
    /// Returns the number of descendants handed back to the pool.
    pub(crate) fn clear_node(&mut self, id: NodeId) -> usize {
        let node = self.node_mut(id);
        node.items.clear();
        let Some(children) = node.children.take() else {
            return 0;
        };
        children.into_iter().map(|child| self.release(child)).sum()
    }

    /// Insert into the subtree rooted at `root`, handing the item back on rejection.
    ///
    /// Walks down one level per iteration to the first child that accepts the
    /// item. The item stays at the deepest node that takes it: in its items
    /// while the node is a leaf with room (or can no longer split), as overflow
    /// when no child of a divided node accepts it.
    pub(crate) fn insert(
        &mut self,
        root: NodeId,
        item: QuadTreeItem<T>,
    ) -> Result<(), QuadTreeItem<T>> {
        if !self.node(root).accepts(item.bounds) {
            return Err(item);
        }
        let mut id = root;
        loop {
            let (children, splits) = {
                let node = self.node(id);
                let full = node.items.len() >= node.threshold;
                (node.children, full && node.can_subdivide())
            };
            let children = match children {
                Some(children) => children,
                None if splits => self.subdivide(id),
                None => {
                    self.node_mut(id).items.add(item);
                    return Ok(());
                }
            };
            let next = children
                .into_iter()
                .find(|&child| self.node(child).accepts(item.bounds));
            match next {
                Some(child) => id = child,
                None => {
                    // Straddles a split line (or, at a fuzzy root, pokes outside every child).
                    let node = self.node_mut(id);
                    if !node.flags.contains(NodeFlags::ALLOW_OVERFLOW) {
                        return Err(item);
                    }
                    node.items.add(item);
                    return Ok(());
                }
            }
        }
    }

    /// Rent four strict children covering the quadrants of `id`.
    ///
    /// Items already stored at `id` stay where they are.
    fn subdivide(&mut self, id: NodeId) -> [NodeId; 4] {
        let (bounds, threshold, flags, depth) = {
            let node = self.node(id);
            (
                node.bounds,
                node.threshold,
                node.flags.for_children(),
                node.depth + 1,
            )
        };
        let children = quadrants(bounds)
            .map(|quad| self.rent_at_depth(quad, threshold, flags, depth));
        self.node_mut(id).children = Some(children);
        trace!(?bounds, "subdivided quadtree node");
        children
    }

    /// Visit items overlapping `range` in pre-order (node items, then TL, TR, BL, BR).
    ///
    /// Subtrees whose bounds miss `range` are skipped. Returns `false` without
    /// visiting anything when `range` misses the root itself.
    pub(crate) fn visit_rect<'a, F>(&'a self, root: NodeId, range: Rect, mut f: F) -> bool
    where
        F: FnMut(&'a QuadTreeItem<T>),
    {
        if !overlaps(self.node(root).bounds, range) {
            return false;
        }
        let mut stack = NodeStack::new();
        stack.push(root);
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if !overlaps(node.bounds, range) {
                continue;
            }
            for item in &node.items {
                if overlaps(item.bounds, range) {
                    f(item);
                }
            }
            if let Some([tl, tr, bl, br]) = node.children {
                stack.extend([br, bl, tr, tl]);
            }
        }
        true
    }

    /// Visit every item below `root` in pre-order.
    pub(crate) fn visit_items<'a, F>(&'a self, root: NodeId, mut f: F)
    where
        F: FnMut(&'a QuadTreeItem<T>),
    {
        let mut stack = NodeStack::new();
        stack.push(root);
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            node.items.iter().for_each(&mut f);
            if let Some([tl, tr, bl, br]) = node.children {
                stack.extend([br, bl, tr, tl]);
            }
        }
    }

    /// The item overlapping `range` whose bounds are closest to `start`.
    ///
    /// Ties go to the item visited first.
    pub(crate) fn nearest(
        &self,
        root: NodeId,
        range: Rect,
        start: Point,
    ) -> Option<&QuadTreeItem<T>> {
        let mut best: Option<(&QuadTreeItem<T>, f64)> = None;
        self.visit_rect(root, range, |item| {
            let dist = distance_sq_to_point(item.bounds, start);
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((item, dist)),
            }
        });
        best.map(|(item, _)| item)
    }

    /// Move every item below `root` into `out` in pre-order. The structure is untouched.
    pub(crate) fn drain_into(&mut self, root: NodeId, out: &mut ItemStore<T>) {
        let mut stack = NodeStack::new();
        stack.push(root);
        while let Some(id) = stack.pop() {
            let node = self.node_mut(id);
            out.add_range(node.items.drain());
            if let Some([tl, tr, bl, br]) = node.children {
                stack.extend([br, bl, tr, tl]);
            }
        }
    }
}
