// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory render target.
//!
//! [`MemoryTarget`] keeps a small DOM-like tree in memory and logs every
//! mutation it receives. It is what tests, demos, and headless tools render
//! into, and it can be told to fail the next call of a given capability to
//! exercise error paths.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write as _};

use crate::element::{EventArgs, Listener, NODE_VALUE};
use crate::error::{TargetError, TargetOp};
use crate::target::RenderTarget;

/// Handle to a node of a [`MemoryTarget`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// One successful call on a [`MemoryTarget`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// An element node was created.
    CreateElement {
        /// The new node.
        node: NodeId,
        /// Its tag.
        tag: String,
    },
    /// A text node was created.
    CreateText {
        /// The new node.
        node: NodeId,
    },
    /// An attribute was set (or reset to `""`).
    SetAttribute {
        /// Target node.
        node: NodeId,
        /// Attribute key.
        key: String,
        /// New value.
        value: String,
    },
    /// A listener was subscribed.
    AddListener {
        /// Target node.
        node: NodeId,
        /// Event name.
        event: String,
    },
    /// A listener was unsubscribed.
    RemoveListener {
        /// Target node.
        node: NodeId,
        /// Event name.
        event: String,
    },
    /// A child was appended.
    AppendChild {
        /// Parent node.
        parent: NodeId,
        /// Appended node.
        child: NodeId,
    },
    /// A child was inserted before a sibling.
    InsertBefore {
        /// Parent node.
        parent: NodeId,
        /// Inserted node.
        child: NodeId,
        /// The sibling it now precedes.
        before: NodeId,
    },
    /// A child was removed.
    RemoveChild {
        /// Parent node.
        parent: NodeId,
        /// Removed node.
        child: NodeId,
    },
}

impl Mutation {
    /// Returns `true` for attribute and listener mutations.
    #[must_use]
    pub const fn is_prop_mutation(&self) -> bool {
        matches!(
            self,
            Self::SetAttribute { .. } | Self::AddListener { .. } | Self::RemoveListener { .. }
        )
    }

    /// Returns `true` for node creations.
    #[must_use]
    pub const fn is_creation(&self) -> bool {
        matches!(self, Self::CreateElement { .. } | Self::CreateText { .. })
    }
}

#[derive(Debug, Default)]
struct MemoryNode {
    /// `None` for text nodes.
    tag: Option<String>,
    attributes: BTreeMap<String, String>,
    listeners: Vec<(String, Listener)>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// A DOM-like tree kept in memory.
///
/// Nodes are never freed; a removed node simply has no parent.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    nodes: Vec<MemoryNode>,
    log: Vec<Mutation>,
    discarded: Vec<NodeId>,
    fail_next: Option<TargetOp>,
}

impl MemoryTarget {
    /// Creates an empty target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element to render into. Not logged.
    pub fn create_container(&mut self, tag: &str) -> NodeId {
        self.alloc(Some(String::from(tag)))
    }

    /// Returns every mutation since creation or the last clear.
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    /// Returns and clears the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        core::mem::take(&mut self.log)
    }

    /// Clears the mutation log.
    pub fn clear_mutations(&mut self) {
        self.log.clear();
    }

    /// Nodes handed back through
    /// [`discard`](RenderTarget::discard), oldest first. Their listeners are
    /// gone.
    #[must_use]
    pub fn discarded(&self) -> &[NodeId] {
        &self.discarded
    }

    /// Makes the next call of `op` fail with a [`TargetError`].
    pub fn fail_next(&mut self, op: TargetOp) {
        self.fail_next = Some(op);
    }

    /// Returns the tag of an element node, or `None` for text nodes.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.get(node)?.tag.as_deref()
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attribute(&self, node: NodeId, key: &str) -> Option<&str> {
        self.get(node)?.attributes.get(key).map(String::as_str)
    }

    /// Returns the content of a text node.
    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        let n = self.get(node)?;
        if n.tag.is_some() {
            return None;
        }
        Some(n.attributes.get(NODE_VALUE).map_or("", String::as_str))
    }

    /// Returns the children of a node.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map_or(&[], |n| &n.children)
    }

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.parent
    }

    /// Returns how many listeners are subscribed to `event` on `node`.
    #[must_use]
    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.get(node)
            .map_or(0, |n| n.listeners.iter().filter(|(e, _)| e == event).count())
    }

    /// Fires `event` on `node`, calling each subscribed listener in
    /// subscription order. Returns the number of listeners called.
    ///
    /// There is no bubbling.
    pub fn dispatch(&self, node: NodeId, event: &str, value: Option<&str>) -> usize {
        let Some(n) = self.get(node) else {
            return 0;
        };
        let args = EventArgs { event, value };
        let mut called = 0;
        for (_, listener) in n.listeners.iter().filter(|(e, _)| e == event) {
            listener.call(&args);
            called += 1;
        }
        called
    }

    /// Serializes the subtree below `node` (excluding `node` itself).
    ///
    /// Elements are written as `<tag key="value">...</tag>` with attributes in
    /// key order; text nodes as their content.
    #[must_use]
    pub fn inner_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_markup(&mut out, child);
        }
        out
    }

    /// Serializes `node` and its subtree; see [`inner_markup`](Self::inner_markup).
    #[must_use]
    pub fn markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(&mut out, node);
        out
    }

    fn write_markup(&self, out: &mut String, node: NodeId) {
        let Some(n) = self.get(node) else {
            return;
        };
        let Some(tag) = &n.tag else {
            out.push_str(n.attributes.get(NODE_VALUE).map_or("", String::as_str));
            return;
        };
        let _ = write!(out, "<{tag}");
        for (key, value) in &n.attributes {
            let _ = write!(out, " {key}=\"{value}\"");
        }
        out.push('>');
        for &child in &n.children {
            self.write_markup(out, child);
        }
        let _ = write!(out, "</{tag}>");
    }

    fn alloc(&mut self, tag: Option<String>) -> NodeId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "node counts in a headless tree stay far below u32::MAX"
        )]
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(MemoryNode {
            tag,
            ..MemoryNode::default()
        });
        id
    }

    fn get(&self, node: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(node.0 as usize)
    }

    fn node_mut(&mut self, op: TargetOp, node: NodeId) -> Result<&mut MemoryNode, TargetError> {
        self.nodes
            .get_mut(node.0 as usize)
            .ok_or_else(|| TargetError::new(op, "unknown node"))
    }

    fn check(&mut self, op: TargetOp) -> Result<(), TargetError> {
        if self.fail_next == Some(op) {
            self.fail_next = None;
            return Err(TargetError::new(op, "injected failure"));
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes[child.0 as usize].parent.take() else {
            return;
        };
        self.nodes[parent.0 as usize].children.retain(|&c| c != child);
    }
}

impl RenderTarget for MemoryTarget {
    type Node = NodeId;

    fn create_element(&mut self, tag: &str) -> Result<NodeId, TargetError> {
        self.check(TargetOp::CreateElement)?;
        let node = self.alloc(Some(String::from(tag)));
        self.log.push(Mutation::CreateElement {
            node,
            tag: String::from(tag),
        });
        Ok(node)
    }

    fn create_text(&mut self) -> Result<NodeId, TargetError> {
        self.check(TargetOp::CreateText)?;
        let node = self.alloc(None);
        self.log.push(Mutation::CreateText { node });
        Ok(node)
    }

    fn set_attribute(&mut self, node: &NodeId, key: &str, value: &str) -> Result<(), TargetError> {
        self.check(TargetOp::SetAttribute)?;
        self.node_mut(TargetOp::SetAttribute, *node)?
            .attributes
            .insert(String::from(key), String::from(value));
        self.log.push(Mutation::SetAttribute {
            node: *node,
            key: String::from(key),
            value: String::from(value),
        });
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: &NodeId,
        event: &str,
        listener: &Listener,
    ) -> Result<(), TargetError> {
        self.check(TargetOp::AddListener)?;
        let n = self.node_mut(TargetOp::AddListener, *node)?;
        // Like the DOM, subscribing the same handler twice is a no-op.
        if !n
            .listeners
            .iter()
            .any(|(e, l)| e == event && l.ptr_eq(listener))
        {
            n.listeners.push((String::from(event), listener.clone()));
        }
        self.log.push(Mutation::AddListener {
            node: *node,
            event: String::from(event),
        });
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: &NodeId,
        event: &str,
        listener: &Listener,
    ) -> Result<(), TargetError> {
        self.check(TargetOp::RemoveListener)?;
        self.node_mut(TargetOp::RemoveListener, *node)?
            .listeners
            .retain(|(e, l)| !(e == event && l.ptr_eq(listener)));
        self.log.push(Mutation::RemoveListener {
            node: *node,
            event: String::from(event),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), TargetError> {
        self.check(TargetOp::AppendChild)?;
        self.node_mut(TargetOp::AppendChild, *parent)?;
        self.node_mut(TargetOp::AppendChild, *child)?;
        if parent == child {
            return Err(TargetError::new(
                TargetOp::AppendChild,
                "cannot append a node to itself",
            ));
        }
        // Appending an attached node moves it.
        self.detach(*child);
        self.nodes[parent.0 as usize].children.push(*child);
        self.nodes[child.0 as usize].parent = Some(*parent);
        self.log.push(Mutation::AppendChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        before: &NodeId,
    ) -> Result<(), TargetError> {
        self.check(TargetOp::InsertBefore)?;
        self.node_mut(TargetOp::InsertBefore, *child)?;
        if self.node_mut(TargetOp::InsertBefore, *before)?.parent != Some(*parent) {
            return Err(TargetError::new(
                TargetOp::InsertBefore,
                "reference node is not a child of the given parent",
            ));
        }
        if child == before {
            return Err(TargetError::new(
                TargetOp::InsertBefore,
                "cannot insert a node before itself",
            ));
        }
        self.detach(*child);
        let siblings = &mut self.nodes[parent.0 as usize].children;
        let at = siblings
            .iter()
            .position(|c| c == before)
            .unwrap_or(siblings.len());
        siblings.insert(at, *child);
        self.nodes[child.0 as usize].parent = Some(*parent);
        self.log.push(Mutation::InsertBefore {
            parent: *parent,
            child: *child,
            before: *before,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), TargetError> {
        self.check(TargetOp::RemoveChild)?;
        if self.node_mut(TargetOp::RemoveChild, *child)?.parent != Some(*parent) {
            return Err(TargetError::new(
                TargetOp::RemoveChild,
                "node is not a child of the given parent",
            ));
        }
        self.detach(*child);
        self.log.push(Mutation::RemoveChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn discard(&mut self, node: &NodeId) -> Result<(), TargetError> {
        self.check(TargetOp::Discard)?;
        self.node_mut(TargetOp::Discard, *node)?.listeners.clear();
        self.discarded.push(*node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_serializes_a_tree() {
        let mut target = MemoryTarget::new();
        let root = target.create_container("main");
        let div = target.create_element("div").unwrap();
        let text = target.create_text().unwrap();
        target.set_attribute(&div, "id", "greeting").unwrap();
        target.set_attribute(&text, NODE_VALUE, "World").unwrap();
        target.append_child(&div, &text).unwrap();
        target.append_child(&root, &div).unwrap();

        assert_eq!(
            target.markup(root),
            "<main><div id=\"greeting\">World</div></main>"
        );
        assert_eq!(target.inner_markup(root), "<div id=\"greeting\">World</div>");
        assert_eq!(target.text(text), Some("World"));
        assert_eq!(target.parent(text), Some(div));
    }

    #[test]
    fn append_moves_an_attached_node() {
        let mut target = MemoryTarget::new();
        let a = target.create_container("a");
        let b = target.create_container("b");
        let child = target.create_element("span").unwrap();
        target.append_child(&a, &child).unwrap();
        target.append_child(&b, &child).unwrap();
        assert!(target.children(a).is_empty());
        assert_eq!(target.children(b), &[child]);
    }

    #[test]
    fn insert_before_places_ahead_of_the_reference() {
        let mut target = MemoryTarget::new();
        let list = target.create_container("ul");
        let first = target.create_element("li").unwrap();
        let last = target.create_element("li").unwrap();
        target.append_child(&list, &first).unwrap();
        target.append_child(&list, &last).unwrap();

        let middle = target.create_element("li").unwrap();
        target.insert_before(&list, &middle, &last).unwrap();
        assert_eq!(target.children(list), &[first, middle, last]);

        // Reinserting an attached node moves it.
        target.insert_before(&list, &last, &first).unwrap();
        assert_eq!(target.children(list), &[last, first, middle]);
    }

    #[test]
    fn insert_before_a_stranger_fails() {
        let mut target = MemoryTarget::new();
        let a = target.create_container("a");
        let b = target.create_container("b");
        let other = target.create_element("i").unwrap();
        target.append_child(&b, &other).unwrap();
        let child = target.create_element("span").unwrap();

        let err = target.insert_before(&a, &child, &other).unwrap_err();
        assert_eq!(err.op, TargetOp::InsertBefore);
        assert_eq!(target.parent(child), None);
    }

    #[test]
    fn discard_drops_listeners() {
        let mut target = MemoryTarget::new();
        let node = target.create_element("input").unwrap();
        target
            .add_listener(&node, "input", &Listener::new(|_| {}))
            .unwrap();
        target.discard(&node).unwrap();
        assert_eq!(target.listener_count(node, "input"), 0);
        assert_eq!(target.discarded(), &[node]);
    }

    #[test]
    fn removing_a_non_child_fails() {
        let mut target = MemoryTarget::new();
        let a = target.create_container("a");
        let child = target.create_element("span").unwrap();
        let err = target.remove_child(&a, &child).unwrap_err();
        assert_eq!(err.op, TargetOp::RemoveChild);
    }

    #[test]
    fn injected_failure_fires_once() {
        let mut target = MemoryTarget::new();
        target.fail_next(TargetOp::CreateText);
        assert!(target.create_text().is_err());
        assert!(target.create_text().is_ok());
        assert_eq!(target.mutations().len(), 1);
    }

    #[test]
    fn duplicate_listener_is_subscribed_once() {
        let mut target = MemoryTarget::new();
        let node = target.create_element("button").unwrap();
        let listener = Listener::new(|_| {});
        target.add_listener(&node, "click", &listener).unwrap();
        target.add_listener(&node, "click", &listener).unwrap();
        assert_eq!(target.listener_count(node, "click"), 1);
        assert_eq!(target.dispatch(node, "click", None), 1);
    }
}
