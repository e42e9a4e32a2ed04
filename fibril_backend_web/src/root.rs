// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A renderer mounted on a DOM container and driven by idle callbacks.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use fibril_core::Renderer;
use fibril_core::element::Element;
use fibril_core::error::RenderError;
use fibril_core::trace::{TraceSink, Tracer};
use web_sys::Node;

use crate::dom::DomTarget;
use crate::idle::{BrowserDeadline, IdleLoop};

struct Mount {
    renderer: Renderer<Node>,
    target: DomTarget,
    container: Node,
    sink: Option<Box<dyn TraceSink>>,
    last_error: Option<RenderError>,
}

fn tracer_for(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink.as_deref_mut() {
        Some(sink) => Tracer::new(sink),
        None => Tracer::none(),
    }
}

impl Mount {
    fn start_pass(&mut self, element: Element) {
        let container = self.container.clone();
        let mut tracer = tracer_for(&mut self.sink);
        self.renderer.render_traced(element, container, &mut tracer);
    }

    fn run_slice(&mut self, deadline: &BrowserDeadline) {
        let mut tracer = tracer_for(&mut self.sink);
        if let Err(err) = self
            .renderer
            .work_loop(&mut self.target, deadline, &mut tracer)
        {
            self.last_error = Some(err);
        }
    }
}

struct Shared {
    mount: RefCell<Mount>,
    /// The latest element requested while the mount was busy.
    pending: RefCell<Option<Element>>,
    /// The latest trace sink installed while the mount was busy.
    pending_sink: RefCell<Option<Box<dyn TraceSink>>>,
}

impl Shared {
    /// Applies the pending sink and starts a pass for the pending element,
    /// unless a slice is running.
    fn apply_pending(&self) {
        let Ok(mut mount) = self.mount.try_borrow_mut() else {
            return;
        };
        if let Some(sink) = self.pending_sink.borrow_mut().take() {
            mount.sink = Some(sink);
        }
        if let Some(element) = self.pending.borrow_mut().take() {
            mount.start_pass(element);
        }
    }
}

/// A [`Renderer`] mounted on a DOM container.
///
/// [`render`](Self::render) requests a new tree; the work happens in
/// `requestIdleCallback` slices, each bounded by the browser's deadline. The
/// handle is cheap to clone, so event handlers can capture one and re-render
/// from inside a listener.
///
/// A render requested while a slice is running (a listener fired by a DOM
/// mutation, for instance) is held and starts before the next slice. Only the
/// latest held request survives.
#[derive(Clone)]
pub struct WebRoot {
    shared: Rc<Shared>,
    idle: Rc<IdleLoop>,
}

impl core::fmt::Debug for WebRoot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebRoot")
            .field("idle", &self.idle)
            .field("pending", &self.shared.pending.borrow().is_some())
            .field("pending_sink", &self.shared.pending_sink.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl WebRoot {
    /// Mounts a root on `container` and starts the idle loop.
    ///
    /// Returns `None` if `container` is not attached to a document.
    #[must_use]
    pub fn new(container: Node) -> Option<Self> {
        let target = DomTarget::for_container(&container)?;
        let shared = Rc::new(Shared {
            mount: RefCell::new(Mount {
                renderer: Renderer::new(),
                target,
                container,
                sink: None,
                last_error: None,
            }),
            pending: RefCell::new(None),
            pending_sink: RefCell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        let idle = IdleLoop::new(move |deadline| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            shared.apply_pending();
            // A listener fired mid-slice may request a render; it lands in
            // `pending` because the mount is borrowed.
            if let Ok(mut mount) = shared.mount.try_borrow_mut() {
                mount.run_slice(deadline);
            }
        });
        idle.start();

        Some(Self {
            shared,
            idle: Rc::new(idle),
        })
    }

    /// Requests a render of `element` into the container.
    ///
    /// Supersedes any pass in flight. The tree is built over the following
    /// idle periods.
    pub fn render(&self, element: Element) {
        *self.shared.pending.borrow_mut() = Some(element);
        self.shared.apply_pending();
    }

    /// Installs a trace sink for subsequent passes.
    ///
    /// Called from inside a slice (from a listener, say), the sink is held
    /// like a render request and takes over before the next slice. Events are
    /// only delivered when `fibril_core` is built with its `trace` feature.
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink>) {
        *self.shared.pending_sink.borrow_mut() = Some(sink);
        self.shared.apply_pending();
    }

    /// Takes the error that ended the most recent failed pass, if any.
    pub fn take_error(&self) -> Option<RenderError> {
        self.shared
            .mount
            .try_borrow_mut()
            .ok()
            .and_then(|mut mount| mount.last_error.take())
    }

    /// Whether no pass is in flight and no render is waiting to start.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.shared.pending.borrow().is_none()
            && self
                .shared
                .mount
                .try_borrow()
                .is_ok_and(|mount| mount.renderer.is_idle())
    }

    /// Stops scheduling slices. Work in flight resumes on [`resume`](Self::resume).
    pub fn pause(&self) {
        self.idle.stop();
    }

    /// Resumes scheduling slices after [`pause`](Self::pause).
    pub fn resume(&self) {
        self.idle.start();
    }
}
