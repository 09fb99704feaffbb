// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pool misuse errors.

use thiserror::Error;

use crate::types::NodeId;

/// Contract violations detected by [`NodePool::return_node`][crate::NodePool::return_node].
///
/// These indicate a caller bug. The pool's free list is left untouched when one is
/// reported.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// The node was already handed back (possibly rented again since).
    #[error("node {0:?} was already returned to the pool")]
    AlreadyReturned(NodeId),

    /// The handle was not issued by this pool.
    #[error("node {0:?} was not rented from this pool")]
    UnknownNode(NodeId),
}
