// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser DOM render target.
//!
//! [`DomTarget`] implements [`RenderTarget`] over `web_sys::Node` handles.
//! Attribute writes follow the host's property semantics: a key the node
//! knows as a property (`value`, `checked`, `disabled`, `className`) is
//! assigned as one, so `value` sets the live value of a form control and an
//! empty string clears a boolean. Other keys (`class`, `data-*`, `aria-*`)
//! become content attributes. [`NODE_VALUE`] sets the content of text nodes.
//!
//! Listeners are wrapped in JS closures owned by the target. The closure is
//! kept so [`remove_listener`](RenderTarget::remove_listener) can unsubscribe
//! the exact function it registered, and is dropped once the listener is
//! removed, or its node is removed or discarded.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use fibril_core::element::{EventArgs, Listener, NODE_VALUE};
use fibril_core::error::{TargetError, TargetOp};
use fibril_core::target::RenderTarget;
use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Document, Element, Event, HtmlInputElement, HtmlTextAreaElement, Node};

type ListenerClosure = Closure<dyn FnMut(Event)>;

struct Subscription {
    node: Node,
    event: String,
    listener: Listener,
    closure: ListenerClosure,
}

impl Subscription {
    fn matches(&self, node: &Node, event: &str, listener: &Listener) -> bool {
        self.event == event
            && self.listener.ptr_eq(listener)
            && self.node.is_same_node(Some(node))
    }

    fn unsubscribe(&self) -> Result<(), JsValue> {
        self.node.remove_event_listener_with_callback(
            &self.event,
            self.closure.as_ref().unchecked_ref(),
        )
    }
}

/// A [`RenderTarget`] that builds real DOM nodes.
pub struct DomTarget {
    document: Document,
    subscriptions: Vec<Subscription>,
}

impl core::fmt::Debug for DomTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomTarget")
            .field("document", &"Document")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl DomTarget {
    /// Creates a target that creates nodes in `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            subscriptions: Vec::new(),
        }
    }

    /// Creates a target for the document that owns `container`.
    ///
    /// Returns `None` if `container` is a document itself or is not attached
    /// to one.
    #[must_use]
    pub fn for_container(container: &Node) -> Option<Self> {
        container.owner_document().map(Self::new)
    }

    /// Returns the document nodes are created in.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Number of listeners currently subscribed through this target.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Unsubscribes and drops every subscription whose node satisfies `gone`.
    ///
    /// A subscription that fails to unsubscribe keeps its closure, since the
    /// DOM may still call it. The first such error is returned.
    fn forget(&mut self, op: TargetOp, gone: impl Fn(&Node) -> bool) -> Result<(), TargetError> {
        let mut failed = None;
        self.subscriptions.retain(|sub| {
            if !gone(&sub.node) {
                return true;
            }
            match sub.unsubscribe() {
                Ok(()) => false,
                Err(err) => {
                    failed.get_or_insert(err);
                    true
                }
            }
        });
        failed.map_or(Ok(()), |err| Err(js_error(op, &err)))
    }
}

fn js_error(op: TargetOp, err: &JsValue) -> TargetError {
    let message = err.as_string().unwrap_or_else(|| format!("{err:?}"));
    TargetError::new(op, message)
}

/// Reads the live value of a form control, if the event target is one.
fn target_value(event: &Event) -> Option<String> {
    let target = event.target()?;
    if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    target
        .dyn_ref::<HtmlTextAreaElement>()
        .map(HtmlTextAreaElement::value)
}

impl RenderTarget for DomTarget {
    type Node = Node;

    fn create_element(&mut self, tag: &str) -> Result<Node, TargetError> {
        self.document
            .create_element(tag)
            .map(Node::from)
            .map_err(|err| js_error(TargetOp::CreateElement, &err))
    }

    fn create_text(&mut self) -> Result<Node, TargetError> {
        Ok(self.document.create_text_node("").into())
    }

    fn set_attribute(&mut self, node: &Node, key: &str, value: &str) -> Result<(), TargetError> {
        if key == NODE_VALUE {
            node.set_node_value(Some(value));
            return Ok(());
        }
        let property = JsValue::from_str(key);
        let is_property = Reflect::has(node, &property)
            .map_err(|err| js_error(TargetOp::SetAttribute, &err))?;
        // A read-only property refuses the write; fall back to the attribute.
        if is_property
            && Reflect::set(node, &property, &JsValue::from_str(value))
                .map_err(|err| js_error(TargetOp::SetAttribute, &err))?
        {
            return Ok(());
        }
        let Some(element) = node.dyn_ref::<Element>() else {
            return Err(TargetError::new(
                TargetOp::SetAttribute,
                format!("cannot set `{key}` on a non-element node"),
            ));
        };
        element
            .set_attribute(key, value)
            .map_err(|err| js_error(TargetOp::SetAttribute, &err))
    }

    fn add_listener(
        &mut self,
        node: &Node,
        event: &str,
        listener: &Listener,
    ) -> Result<(), TargetError> {
        if self
            .subscriptions
            .iter()
            .any(|sub| sub.matches(node, event, listener))
        {
            return Ok(());
        }

        let handler = listener.clone();
        let name = event.to_string();
        let closure = Closure::wrap(Box::new(move |e: Event| {
            let value = target_value(&e);
            handler.call(&EventArgs {
                event: &name,
                value: value.as_deref(),
            });
        }) as Box<dyn FnMut(Event)>);

        node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|err| js_error(TargetOp::AddListener, &err))?;

        self.subscriptions.push(Subscription {
            node: node.clone(),
            event: event.to_string(),
            listener: listener.clone(),
            closure,
        });
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: &Node,
        event: &str,
        listener: &Listener,
    ) -> Result<(), TargetError> {
        let Some(pos) = self
            .subscriptions
            .iter()
            .position(|sub| sub.matches(node, event, listener))
        else {
            // Never subscribed here; same as the DOM, nothing to do.
            return Ok(());
        };
        let sub = self.subscriptions.swap_remove(pos);
        node.remove_event_listener_with_callback(event, sub.closure.as_ref().unchecked_ref())
            .map_err(|err| js_error(TargetOp::RemoveListener, &err))
    }

    fn append_child(&mut self, parent: &Node, child: &Node) -> Result<(), TargetError> {
        parent
            .append_child(child)
            .map(drop)
            .map_err(|err| js_error(TargetOp::AppendChild, &err))
    }

    fn insert_before(
        &mut self,
        parent: &Node,
        child: &Node,
        before: &Node,
    ) -> Result<(), TargetError> {
        parent
            .insert_before(child, Some(before))
            .map(drop)
            .map_err(|err| js_error(TargetOp::InsertBefore, &err))
    }

    fn remove_child(&mut self, parent: &Node, child: &Node) -> Result<(), TargetError> {
        parent
            .remove_child(child)
            .map_err(|err| js_error(TargetOp::RemoveChild, &err))?;
        self.forget(TargetOp::RemoveListener, |node| child.contains(Some(node)))
    }

    fn discard(&mut self, node: &Node) -> Result<(), TargetError> {
        self.forget(TargetOp::Discard, |sub| sub.is_same_node(Some(node)))
    }
}
