// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the quadtree: items, node handles, and node flags.

use kurbo::Rect;

/// A rectangle paired with a caller-supplied payload.
///
/// Items are plain values. Once inserted they are only ever handed out by
/// shared reference or by copy, so a stored item is never mutated in place.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuadTreeItem<T> {
    /// Region covered by the item.
    pub bounds: Rect,
    /// Payload, typically an index into caller-owned data (a glyph, a widget).
    pub value: T,
}

impl<T> QuadTreeItem<T> {
    /// Create a new item.
    #[inline]
    pub const fn new(bounds: Rect, value: T) -> Self {
        Self { bounds, value }
    }
}

/// Handle to a node living in a [`NodePool`][crate::NodePool] (generational).
///
/// Besides the slot index and generation, a handle records which pool issued it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32, pub(crate) u32);

impl NodeId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Node handles are intentionally 32-bit; pools never hold 2^32 nodes."
    )]
    pub(crate) const fn new(pool: u32, idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation, pool)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }

    pub(crate) const fn pool(self) -> u32 {
        self.2
    }
}

bitflags::bitflags! {
    /// Per-node insertion policy.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Keep items that fit this node but none of its children at this node
        /// instead of rejecting them.
        const ALLOW_OVERFLOW   = 0b0000_0001;
        /// Accept items that merely overlap the node bounds rather than requiring
        /// full containment. Only honored on roots; subdivision clears it.
        const FUZZY_BOUNDARIES = 0b0000_0010;
    }
}

impl NodeFlags {
    /// Flags inherited by the four children created when a node subdivides.
    #[inline]
    pub(crate) fn for_children(self) -> Self {
        self - Self::FUZZY_BOUNDARIES
    }
}
