// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestIdleCallback` slice source.
//!
//! [`IdleLoop`] asks the browser for an idle period, hands the callback a
//! [`BrowserDeadline`], and asks again. The renderer's
//! [`work_loop`](fibril_core::Renderer::work_loop) consumes that deadline to
//! decide when to yield.
//!
//! The loop keeps requesting callbacks while running, even when the renderer
//! is idle, so a render requested from an event handler is picked up at the
//! next idle period without extra signaling.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::time::Duration;

use fibril_core::IdleDeadline;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

// Direct global bindings instead of `web_sys::Window` methods, which would need
// the Window object fetched (and unwrapped) on every callback.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "requestIdleCallback")]
    fn request_idle_callback(callback: &JsValue) -> u32;

    #[wasm_bindgen(js_name = "cancelIdleCallback")]
    fn cancel_idle_callback(id: u32);
}

/// The browser's idle-period deadline.
#[derive(Debug)]
pub struct BrowserDeadline(web_sys::IdleDeadline);

impl BrowserDeadline {
    /// Wraps a deadline received from `requestIdleCallback`.
    #[must_use]
    pub fn new(deadline: web_sys::IdleDeadline) -> Self {
        Self(deadline)
    }

    /// Whether the callback ran because its timeout elapsed.
    #[must_use]
    pub fn did_timeout(&self) -> bool {
        self.0.did_timeout()
    }
}

impl IdleDeadline for BrowserDeadline {
    fn time_remaining(&self) -> Duration {
        millis_to_duration(self.0.time_remaining())
    }
}

/// Converts a `DOMHighResTimeStamp` span to a [`Duration`], clamping negative
/// and NaN values to zero.
fn millis_to_duration(ms: f64) -> Duration {
    if ms.is_nan() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
}

/// A `requestIdleCallback` loop that hands each idle period to a callback.
///
/// Create with [`IdleLoop::new`], then call [`start`](Self::start). The loop
/// re-registers itself after every callback until [`stop`](Self::stop) is
/// called or the `IdleLoop` is dropped.
pub struct IdleLoop {
    inner: Rc<IdleInner>,
}

type IdleClosure = Closure<dyn FnMut(web_sys::IdleDeadline)>;

struct IdleInner {
    /// The JS closure registered with `requestIdleCallback`.
    ///
    /// Stored in its own `RefCell` so it can be set once in `start()` and
    /// referenced from inside itself without conflicting with `callback`.
    closure: RefCell<Option<IdleClosure>>,

    callback: RefCell<Box<dyn FnMut(&BrowserDeadline)>>,

    /// Idle periods delivered so far.
    periods: Cell<u64>,

    running: Cell<bool>,

    /// The handle of the pending request, for `cancelIdleCallback`.
    request_id: Cell<u32>,
}

impl IdleLoop {
    /// Creates a loop that is **not yet running**.
    pub fn new(callback: impl FnMut(&BrowserDeadline) + 'static) -> Self {
        Self {
            inner: Rc::new(IdleInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                periods: Cell::new(0),
                running: Cell::new(false),
                request_id: Cell::new(0),
            }),
        }
    }

    /// Starts requesting idle callbacks.
    ///
    /// If already running, this is a no-op.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        // Restart after `stop`: the closure from the first start is reused.
        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = request_idle_callback(closure.as_ref().unchecked_ref());
            self.inner.request_id.set(id);
            return;
        }

        let inner = Rc::clone(&self.inner);
        let closure = Closure::wrap(Box::new(move |deadline: web_sys::IdleDeadline| {
            if !inner.running.get() {
                return;
            }
            inner.periods.set(inner.periods.get() + 1);

            // Scoped so the borrow does not overlap with `closure` below.
            inner.callback.borrow_mut()(&BrowserDeadline(deadline));

            if inner.running.get()
                && let Some(ref closure) = *inner.closure.borrow()
            {
                let id = request_idle_callback(closure.as_ref().unchecked_ref());
                inner.request_id.set(id);
            }
        }) as Box<dyn FnMut(web_sys::IdleDeadline)>);

        let id = request_idle_callback(closure.as_ref().unchecked_ref());
        self.inner.request_id.set(id);
        *self.inner.closure.borrow_mut() = Some(closure);
    }

    /// Stops the loop and cancels the pending request. Can be restarted.
    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        cancel_idle_callback(self.inner.request_id.get());
    }

    /// Returns `true` if the loop is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Number of idle periods delivered to the callback.
    #[must_use]
    pub fn periods(&self) -> u64 {
        self.inner.periods.get()
    }
}

impl Drop for IdleLoop {
    fn drop(&mut self) {
        self.stop();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for IdleLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdleLoop")
            .field("running", &self.inner.running.get())
            .field("periods", &self.inner.periods.get())
            .finish_non_exhaustive()
    }
}
