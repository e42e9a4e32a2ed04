// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Nothing in this crate retries. A [`TargetError`] raised by the render
//! target is wrapped into a [`RenderError`] and propagated to the caller of
//! [`work_loop`](crate::Renderer::work_loop), which aborts the pass in flight.

use alloc::string::String;
use core::fmt;

/// A render-target capability, used to say which call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetOp {
    /// [`RenderTarget::create_element`](crate::target::RenderTarget::create_element).
    CreateElement,
    /// [`RenderTarget::create_text`](crate::target::RenderTarget::create_text).
    CreateText,
    /// [`RenderTarget::set_attribute`](crate::target::RenderTarget::set_attribute).
    SetAttribute,
    /// [`RenderTarget::add_listener`](crate::target::RenderTarget::add_listener).
    AddListener,
    /// [`RenderTarget::remove_listener`](crate::target::RenderTarget::remove_listener).
    RemoveListener,
    /// [`RenderTarget::append_child`](crate::target::RenderTarget::append_child).
    AppendChild,
    /// [`RenderTarget::insert_before`](crate::target::RenderTarget::insert_before).
    InsertBefore,
    /// [`RenderTarget::remove_child`](crate::target::RenderTarget::remove_child).
    RemoveChild,
    /// [`RenderTarget::discard`](crate::target::RenderTarget::discard).
    Discard,
}

impl fmt::Display for TargetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateElement => "create_element",
            Self::CreateText => "create_text",
            Self::SetAttribute => "set_attribute",
            Self::AddListener => "add_listener",
            Self::RemoveListener => "remove_listener",
            Self::AppendChild => "append_child",
            Self::InsertBefore => "insert_before",
            Self::RemoveChild => "remove_child",
            Self::Discard => "discard",
        })
    }
}

/// A failure reported by a [`RenderTarget`](crate::target::RenderTarget).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("render target failed in {op}: {message}")]
pub struct TargetError {
    /// The capability that failed.
    pub op: TargetOp,
    /// Host-provided description.
    pub message: String,
}

impl TargetError {
    /// Creates a target error.
    #[must_use]
    pub fn new(op: TargetOp, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }
}

/// Why a render pass failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The render target rejected a mutation. Mutations already applied in
    /// the same pass are not rolled back.
    #[error(transparent)]
    Target(#[from] TargetError),
    /// An element description cannot be materialized.
    #[error("malformed element: {reason}")]
    MalformedElement {
        /// What is wrong with it.
        reason: &'static str,
    },
}
