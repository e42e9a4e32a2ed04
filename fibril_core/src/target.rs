// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render target contract.
//!
//! The reconciler never touches a native tree directly. Everything it needs is
//! the small capability set of [`RenderTarget`]: create a node, set an
//! attribute, attach or detach a listener, insert or remove a child. Nodes
//! built for a pass that never commits are handed back through
//! [`discard`](RenderTarget::discard).
//!
//! Implementations in this workspace:
//!
//! - [`MemoryTarget`](crate::headless::MemoryTarget): an in-memory tree with a
//!   mutation log, used by tests and headless tools.
//! - `fibril_backend_web::DomTarget`: the browser DOM.
//!
//! Text nodes receive their content through
//! [`set_attribute`](RenderTarget::set_attribute) with the
//! [`NODE_VALUE`](crate::element::NODE_VALUE) key.

use crate::element::Listener;
use crate::error::TargetError;

/// Creates, mutates, and removes rendered nodes of a host environment.
///
/// Every method may fail; failures are propagated as-is and never retried.
pub trait RenderTarget {
    /// Handle to a rendered node. Cloning a handle must not clone the node.
    type Node: Clone;

    /// Creates an element node with the given tag.
    fn create_element(&mut self, tag: &str) -> Result<Self::Node, TargetError>;

    /// Creates an empty text node.
    fn create_text(&mut self) -> Result<Self::Node, TargetError>;

    /// Sets an attribute. Resetting a removed attribute passes `""`.
    fn set_attribute(&mut self, node: &Self::Node, key: &str, value: &str)
    -> Result<(), TargetError>;

    /// Subscribes `listener` to `event` on `node`.
    fn add_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        listener: &Listener,
    ) -> Result<(), TargetError>;

    /// Unsubscribes a listener previously passed to
    /// [`add_listener`](Self::add_listener).
    fn remove_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        listener: &Listener,
    ) -> Result<(), TargetError>;

    /// Appends `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node)
    -> Result<(), TargetError>;

    /// Inserts `child` under `parent` immediately before `before`, which is
    /// already a child of `parent`.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        before: &Self::Node,
    ) -> Result<(), TargetError>;

    /// Removes `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node)
    -> Result<(), TargetError>;

    /// Releases a node created for a pass that was abandoned.
    ///
    /// Called once per discarded node, at the start of the next slice. The
    /// node may already be attached if the pass failed mid-commit. Targets
    /// that keep per-node state (listener closures, for instance) drop it
    /// here. An error is reported by that slice; the node is not offered
    /// again.
    fn discard(&mut self, _node: &Self::Node) -> Result<(), TargetError> {
        Ok(())
    }
}
