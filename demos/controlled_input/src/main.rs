// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A controlled text input rendered headlessly.
//!
//! The tree is `<div><input value={v}/><h2>Hello {v}</h2></div>`; each
//! `input` event re-renders with the new value. Keystrokes arrive faster than
//! the work loop finishes a pass, so intermediate passes are superseded and
//! only the latest value commits.
//!
//! Events go to a [`PrettyPrintSink`](fibril_debug::pretty::PrettyPrintSink)
//! on stdout, a [`RecorderSink`](fibril_debug::recorder::RecorderSink), and
//! `tracing` (filter with `RUST_LOG`, e.g. `RUST_LOG=fibril=debug`). The
//! recording is exported as Chrome trace JSON at the end.

use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use fibril_core::element::{Element, Listener};
use fibril_core::headless::{MemoryTarget, NodeId};
use fibril_core::trace::Tracer;
use fibril_core::{Renderer, SliceOutcome, UnitBudget};
use fibril_debug::Fanout;
use fibril_debug::pretty::PrettyPrintSink;
use fibril_debug::recorder::RecorderSink;
use fibril_debug::tracing_sink::TracingSink;
use tracing_subscriber::EnvFilter;

const KEYSTROKES: &[&str] = &["F", "Fi", "Fib", "Fibr", "Fibri", "Fibril"];
/// Units per idle period. A pass over this tree takes six.
const UNITS_PER_SLICE: u32 = 2;
/// Idle periods between keystrokes.
const TYPING_INTERVAL: u32 = 2;
const MAX_SLICES: u32 = 100;

fn app(value: &str, on_input: &Listener) -> Element {
    Element::host("div")
        .child(
            Element::host("input")
                .on("onInput", on_input.clone())
                .attr("value", value),
        )
        .child(Element::host("h2").child("Hello ").child(value))
}

/// The committed `<input>`, once there is one.
fn find_input(target: &MemoryTarget, container: NodeId) -> Option<NodeId> {
    let div = *target.children(container).first()?;
    let input = *target.children(div).first()?;
    (target.tag(input) == Some("input")).then_some(input)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut target = MemoryTarget::new();
    let container = target.create_container("root");
    let mut renderer = Renderer::new();

    let typed: Rc<RefCell<Option<String>>> = Rc::default();
    let on_input = {
        let typed = Rc::clone(&typed);
        Listener::new(move |args| {
            if let Some(value) = args.value {
                *typed.borrow_mut() = Some(value.to_owned());
            }
        })
    };

    let mut sink = Fanout(
        PrettyPrintSink::new(Box::new(std::io::stdout())),
        Fanout(RecorderSink::new(), TracingSink),
    );

    let mut commits = 0_u32;
    {
        let mut tracer = Tracer::new(&mut sink);
        renderer.render_traced(app("World", &on_input), container, &mut tracer);

        let mut keys = KEYSTROKES.iter();
        for slice in 1..=MAX_SLICES {
            let budget = UnitBudget::new(UNITS_PER_SLICE);
            let outcome = renderer
                .work_loop(&mut target, &budget, &mut tracer)
                .expect("memory target does not fail");
            if let SliceOutcome::Committed { .. } = outcome {
                commits += 1;
                println!("  => {}", target.inner_markup(container));
            }

            // The user types between idle periods.
            if slice % TYPING_INTERVAL == 0
                && let Some(input) = find_input(&target, container)
                && let Some(key) = keys.next()
            {
                target.dispatch(input, "input", Some(key));
            }
            if let Some(value) = typed.borrow_mut().take() {
                renderer.render_traced(app(&value, &on_input), container, &mut tracer);
            }

            if renderer.is_idle() && keys.as_slice().is_empty() {
                break;
            }
        }
    }

    assert_eq!(
        target.inner_markup(container),
        r#"<div><input value="Fibril"></input><h2>Hello Fibril</h2></div>"#,
    );

    let Fanout(_, Fanout(recorder, _)) = sink;
    let path = "fibril-trace.json";
    let file = File::create(path).expect("failed to create fibril-trace.json");
    let mut writer = BufWriter::new(file);
    fibril_debug::chrome::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!(
        "Wrote {path} ({commits} commits, {} mutations)",
        target.mutations().len()
    );
}
