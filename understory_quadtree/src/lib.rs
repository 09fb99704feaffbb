// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_quadtree --heading-base-level=0

//! Understory QuadTree: a pooled region quadtree for per-frame UI hit testing.
//!
//! Understory QuadTree indexes axis-aligned rectangles with payloads and answers two questions fast:
//!
//! - Which items overlap this rectangle (or contain this point)?
//! - Which item is closest to this point, among those in a search region?
//!
//! The typical client is a text or widget layer that rebuilds its boxes every
//! frame (one per glyph, for instance) and maps each pointer event back to the
//! nearest box. To keep that loop allocation-free, nodes and item buffers are
//! recycled through a [`NodePool`] instead of being dropped.
//!
//! Geometry is [`kurbo`]'s: bounds are [`kurbo::Rect`] and query points are
//! [`kurbo::Point`]. Overlap and containment tests include edges, so zero-size
//! rects behave as points. Coordinates are assumed finite (no NaNs).
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_quadtree::{NodeFlags, QuadTree};
//!
//! let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0), 4, NodeFlags::empty());
//! for x in (5..100).step_by(10) {
//!     let x = f64::from(x);
//!     tree.insert(Rect::new(x, 0.0, x, 0.0), x);
//! }
//!
//! // Range query: the buffer is pooled, so return it once consumed.
//! let hits = tree.query(Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
//! assert_eq!(hits.len(), 5);
//! tree.return_item_list(hits);
//!
//! // Nearest query: ties go to the item met first during traversal.
//! let nearest = tree.query_nearest(tree.bounds(), Point::new(10.0, 0.0)).unwrap();
//! assert_eq!(nearest.value, 5.0);
//!
//! // Rebuild next frame without reallocating nodes.
//! tree.clear();
//! assert!(tree.is_empty());
//! ```
//!
//! ## API overview
//!
//! - [`QuadTree`]: owns a root node and its pool. Insert with [`QuadTree::insert`] or
//!   [`QuadTree::try_insert`], query with [`QuadTree::query`], [`QuadTree::query_point`],
//!   [`QuadTree::query_nearest`] and [`QuadTree::visit_rect`], rebuild with
//!   [`QuadTree::resize`] and [`QuadTree::clear`].
//! - [`NodeFlags`]: per-tree insertion policy ([`NodeFlags::ALLOW_OVERFLOW`],
//!   [`NodeFlags::FUZZY_BOUNDARIES`]).
//! - [`NodePool`]: arena and free lists for nodes and [`ItemStore`]s. Move it between
//!   trees with [`QuadTree::into_pool`] and [`QuadTree::with_pool`].
//! - [`ReadOnlyQuadTree`]: query-only facade, also used to walk the node structure.
//! - [`PoolError`]: returned when a node is handed back to a pool twice or to the wrong pool.
//!
//! ## Features
//!
//! - `std` *(default)*: enables `kurbo/std`.
//! - `libm`: enables `kurbo/libm` for `no_std` targets.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `trace` when the arena grows or a node
//! subdivides, `debug` after a clear or resize, and `warn` when a resize drops
//! items. Without a subscriber these cost nothing.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod geometry;
mod pool;
mod store;
mod tree;
mod types;
mod view;

pub use error::PoolError;
pub use pool::NodePool;
pub use store::ItemStore;
pub use tree::QuadTree;
pub use types::{NodeFlags, NodeId, QuadTreeItem};
pub use view::ReadOnlyQuadTree;
