// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for fibril.
//!
//! This crate connects the reconciler to browser APIs:
//!
//! - [`DomTarget`]: a [`RenderTarget`] over DOM nodes
//! - [`IdleLoop`]: `requestIdleCallback` slice source, handing out
//!   [`BrowserDeadline`]s
//! - [`WebRoot`]: a renderer mounted on a container and driven by the idle
//!   loop
//!
//! ```no_run
//! use fibril_backend_web::WebRoot;
//! use fibril_core::element::Element;
//! # fn mount(container: web_sys::Node) {
//! let root = WebRoot::new(container).expect("container is attached");
//! root.render(Element::host("h2").child("Hello World"));
//! # }
//! ```

#![no_std]

extern crate alloc;

mod dom;
mod idle;
mod root;

pub use dom::DomTarget;
pub use fibril_core::target::RenderTarget;
pub use idle::{BrowserDeadline, IdleLoop};
pub use root::WebRoot;
