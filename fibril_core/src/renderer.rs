// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render session.
//!
//! A [`Renderer`] owns everything one render root needs between calls: the
//! fiber store holding both tree generations, the committed root, the pass in
//! flight, and the deletion set. Several renderers can drive independent roots
//! side by side.
//!
//! # Passes
//!
//! [`render`](Renderer::render) arms a pass: it creates a work-in-progress root
//! whose node is the container and whose single child is the element, links it
//! to the committed root, and points the work loop at it. Nothing is rendered
//! until the host runs [`work_loop`](Renderer::work_loop) (or
//! [`flush`](Renderer::flush)).
//!
//! At most one pass is in flight. Calling `render` again before the previous
//! pass committed drops the partial tree; the last call wins. The drop is
//! reported to the tracer as a [`PassAbandonedEvent`], and the nodes the
//! dropped pass created are handed to
//! [`RenderTarget::discard`] before the next slice.
//!
//! Rendering into a different container than the committed tree's starts
//! over: the new tree is built without a baseline and the old one is removed
//! from its container by the same commit.
//!
//! # Generations
//!
//! After a commit the work-in-progress tree becomes the current tree and the
//! previous current tree, deleted fibers included, is freed. Fibers of the
//! current tree have no alternate and carry [`EffectTag::None`], so the store
//! holds exactly the current tree plus whatever the pass in flight has built.

use alloc::vec::Vec;

use crate::commit::{CommitStats, commit_root};
use crate::element::{Element, Props};
use crate::error::RenderError;
use crate::fiber::{EffectTag, FiberId, FiberStore};
use crate::reconcile::perform_unit_of_work;
use crate::scheduler::WorkLoopConfig;
use crate::target::RenderTarget;
use crate::trace::{
    AbandonReason, CommitEvent, PassAbandonedEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    RenderEvent, Tracer, UnitOfWorkEvent,
};

/// An incremental renderer for one root.
///
/// `N` is the node handle type of the [`RenderTarget`] it renders into.
#[derive(Debug)]
pub struct Renderer<N> {
    pub(crate) fibers: FiberStore<N>,
    pub(crate) current_root: Option<FiberId>,
    pub(crate) wip_root: Option<FiberId>,
    pub(crate) next_unit: Option<FiberId>,
    pub(crate) deletions: Vec<FiberId>,
    pub(crate) config: WorkLoopConfig,
    /// Counts `render` calls.
    pub(crate) pass: u64,
    /// Units run in the pass in flight.
    pub(crate) pass_units: u32,
    /// Nodes of abandoned passes not yet handed to the target.
    pub(crate) discarded: Vec<N>,
}

impl<N: Clone> Default for Renderer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone> Renderer<N> {
    /// Creates a renderer with the [`browser`](WorkLoopConfig::browser)
    /// work-loop preset.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorkLoopConfig::default())
    }

    /// Creates a renderer with the given work-loop configuration.
    #[must_use]
    pub fn with_config(config: WorkLoopConfig) -> Self {
        Self {
            fibers: FiberStore::new(),
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            config,
            pass: 0,
            pass_units: 0,
            discarded: Vec::new(),
        }
    }

    /// Arms a pass that renders `element` into `container`.
    pub fn render(&mut self, element: Element, container: N)
    where
        N: PartialEq,
    {
        self.render_traced(element, container, &mut Tracer::none());
    }

    /// [`render`](Self::render) with tracing.
    pub fn render_traced(&mut self, element: Element, container: N, tracer: &mut Tracer<'_>)
    where
        N: PartialEq,
    {
        self.abandon_pass(AbandonReason::Superseded, tracer);

        self.pass += 1;
        self.pass_units = 0;
        let baseline = self
            .current_root
            .filter(|&root| self.fibers.node(root) == Some(&container));
        if let Some(old_root) = self.current_root
            && baseline.is_none()
        {
            // New container: the old tree leaves its container on commit.
            let old: Vec<FiberId> = self.fibers.children(old_root).collect();
            for fiber in old {
                self.fibers.set_effect(fiber, EffectTag::Deletion);
                self.deletions.push(fiber);
            }
        }

        let root = self.fibers.create_fiber(
            None,
            Props::new(Vec::new(), alloc::vec![element]),
            Some(container),
            EffectTag::None,
        );
        self.fibers.set_alternate(root, baseline);
        self.wip_root = Some(root);
        self.next_unit = Some(root);

        tracer.render(&RenderEvent {
            pass: self.pass,
            root,
            has_current: baseline.is_some(),
        });
    }

    // -- Accessors --

    /// Returns the fiber store.
    #[must_use]
    pub fn fibers(&self) -> &FiberStore<N> {
        &self.fibers
    }

    /// Returns the root of the last committed tree.
    #[must_use]
    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    /// Returns the root of the pass in flight.
    #[must_use]
    pub fn wip_root(&self) -> Option<FiberId> {
        self.wip_root
    }

    /// Returns the fiber the next unit of work will visit.
    #[must_use]
    pub fn next_unit(&self) -> Option<FiberId> {
        self.next_unit
    }

    /// Returns the old fibers the pass in flight will remove.
    #[must_use]
    pub fn deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    /// Returns the work-loop configuration.
    #[must_use]
    pub fn config(&self) -> &WorkLoopConfig {
        &self.config
    }

    /// Replaces the work-loop configuration. Takes effect on the next slice.
    pub fn set_config(&mut self, config: WorkLoopConfig) {
        self.config = config;
    }

    /// Returns the number of `render` calls so far.
    #[must_use]
    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Returns `true` if no pass is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.wip_root.is_none()
    }

    // -- Pass lifecycle --

    /// Runs one unit on `fiber` and advances the pointer. Abandons the pass on
    /// error.
    pub(crate) fn run_unit<T>(
        &mut self,
        target: &mut T,
        fiber: FiberId,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), RenderError>
    where
        T: RenderTarget<Node = N> + ?Sized,
    {
        let report =
            match perform_unit_of_work(target, &mut self.fibers, &mut self.deletions, fiber) {
                Ok(report) => report,
                Err(err) => {
                    self.abandon_pass(AbandonReason::Failed, tracer);
                    return Err(err);
                }
            };
        self.next_unit = report.next;
        self.pass_units += 1;
        tracer.unit_of_work(&UnitOfWorkEvent {
            pass: self.pass,
            fiber,
            effect: self.fibers.effect(fiber),
            materialized: report.materialized,
            children: report.children,
            deletions: report.deletions,
        });
        Ok(())
    }

    /// Commits the pass in flight and promotes its tree. Abandons the pass on
    /// error.
    pub(crate) fn commit<T>(
        &mut self,
        target: &mut T,
        tracer: &mut Tracer<'_>,
    ) -> Result<CommitStats, RenderError>
    where
        T: RenderTarget<Node = N> + ?Sized,
    {
        let Some(wip) = self.wip_root else {
            return Ok(CommitStats::default());
        };
        let pass = self.pass;
        tracer.phase_begin(&PhaseBeginEvent {
            pass,
            phase: PhaseKind::Commit,
        });
        let stats = match commit_root(target, &self.fibers, wip, &self.deletions) {
            Ok(stats) => stats,
            Err(err) => {
                self.abandon_pass(AbandonReason::Failed, tracer);
                return Err(err);
            }
        };

        let retired = self
            .current_root
            .replace(wip)
            .map_or(0, |old| self.fibers.destroy_subtree(old));
        self.settle(wip);
        self.wip_root = None;
        self.next_unit = None;
        self.deletions.clear();

        tracer.commit(&CommitEvent {
            pass,
            units: self.pass_units,
            stats,
            retired,
        });
        tracer.phase_end(&PhaseEndEvent {
            pass,
            phase: PhaseKind::Commit,
        });
        Ok(stats)
    }

    /// Drops the pass in flight, if any, and frees its tree.
    fn abandon_pass(&mut self, reason: AbandonReason, tracer: &mut Tracer<'_>) {
        let Some(wip) = self.wip_root.take() else {
            return;
        };
        self.next_unit = None;
        // Deleted fibers belong to the current tree, which stays.
        for fiber in self.deletions.drain(..) {
            self.fibers.set_effect(fiber, EffectTag::None);
        }
        // Placed fibers own nodes no committed tree refers to. Updated fibers
        // share theirs with the current tree.
        for fiber in self.fibers.preorder(wip) {
            if self.fibers.effect(fiber) == EffectTag::Placement
                && let Some(node) = self.fibers.node(fiber)
            {
                self.discarded.push(node.clone());
            }
        }
        let freed = self.fibers.destroy_subtree(wip);
        tracer.pass_abandoned(&PassAbandonedEvent {
            pass: self.pass,
            reason,
            units: self.pass_units,
            freed,
        });
    }

    /// Hands the nodes of abandoned passes to the target.
    ///
    /// Stops at the first error. The failing node is dropped from the list,
    /// the rest are offered again next time.
    pub(crate) fn release_discarded<T>(&mut self, target: &mut T) -> Result<(), RenderError>
    where
        T: RenderTarget<Node = N> + ?Sized,
    {
        let mut offered = 0;
        let released = self.discarded.iter().try_for_each(|node| {
            offered += 1;
            target.discard(node)
        });
        self.discarded.drain(..offered);
        released.map_err(RenderError::from)
    }

    /// Clears the per-pass links of a freshly committed tree.
    fn settle(&mut self, root: FiberId) {
        let fibers: Vec<FiberId> = self.fibers.preorder(root).collect();
        for fiber in fibers {
            self.fibers.set_alternate(fiber, None);
            self.fibers.set_effect(fiber, EffectTag::None);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::RefCell;

    use crate::element::{ElementType, EventArgs, Listener, NODE_VALUE};
    use crate::error::TargetOp;
    use crate::headless::{MemoryTarget, Mutation, NodeId};

    use super::*;

    fn setup() -> (MemoryTarget, NodeId, Renderer<NodeId>) {
        let mut target = MemoryTarget::new();
        let container = target.create_container("main");
        (target, container, Renderer::new())
    }

    fn render_and_flush(
        renderer: &mut Renderer<NodeId>,
        target: &mut MemoryTarget,
        container: NodeId,
        element: Element,
    ) -> CommitStats {
        renderer.render(element, container);
        renderer.flush(target).unwrap().unwrap()
    }

    #[test]
    fn div_with_text_renders_into_the_container() {
        let (mut target, container, mut renderer) = setup();
        let tree = Element::new(ElementType::host("div"), [], [Element::text("World")]);
        render_and_flush(&mut renderer, &mut target, container, tree);

        let [div] = target.children(container) else {
            panic!("expected one child");
        };
        assert_eq!(target.tag(*div), Some("div"));
        let [text] = target.children(*div) else {
            panic!("expected one text node");
        };
        assert_eq!(target.text(*text), Some("World"));
        assert_eq!(target.inner_markup(container), "<div>World</div>");
    }

    #[test]
    fn target_mirrors_a_nested_tree() {
        let (mut target, container, mut renderer) = setup();
        let tree = Element::host("section")
            .attr("id", "s")
            .child(Element::host("h1").child("Title"))
            .child(
                Element::host("ul")
                    .child(Element::host("li").child("one"))
                    .child(Element::host("li").child("two")),
            )
            .child("tail");
        render_and_flush(&mut renderer, &mut target, container, tree);

        assert_eq!(
            target.inner_markup(container),
            "<section id=\"s\"><h1>Title</h1><ul><li>one</li><li>two</li></ul>tail</section>"
        );
    }

    #[test]
    fn controlled_input_rerender_sets_only_the_value() {
        let (mut target, container, mut renderer) = setup();
        let on_input = Listener::new(|_| {});
        let view = |value: &str| {
            Element::host("input")
                .attr("value", value)
                .on("onInput", on_input.clone())
        };

        render_and_flush(&mut renderer, &mut target, container, view("World"));
        let input = target.children(container)[0];
        target.clear_mutations();

        let stats = render_and_flush(&mut renderer, &mut target, container, view("World2"));
        assert_eq!(
            target.mutations(),
            &[Mutation::SetAttribute {
                node: input,
                key: "value".into(),
                value: "World2".into(),
            }]
        );
        assert_eq!(stats.updates, 1);
        assert_eq!(stats.placements, 0);
        assert_eq!(target.children(container), &[input]);
    }

    #[test]
    fn same_type_keeps_the_node() {
        let (mut target, container, mut renderer) = setup();
        render_and_flush(&mut renderer, &mut target, container, Element::host("p").child("a"));
        let p = target.children(container)[0];
        let text = target.children(p)[0];
        target.clear_mutations();

        render_and_flush(&mut renderer, &mut target, container, Element::host("p").child("b"));
        assert_eq!(target.children(container), &[p]);
        assert_eq!(target.children(p), &[text]);
        assert_eq!(target.text(text), Some("b"));
        assert!(!target.mutations().iter().any(Mutation::is_creation));
    }

    #[test]
    fn type_change_replaces_the_node() {
        let (mut target, container, mut renderer) = setup();
        render_and_flush(&mut renderer, &mut target, container, Element::host("p"));
        let p = target.children(container)[0];
        target.clear_mutations();

        let stats =
            render_and_flush(&mut renderer, &mut target, container, Element::host("span"));
        let span = target.children(container)[0];
        assert_ne!(span, p);
        assert_eq!(target.tag(span), Some("span"));
        assert_eq!(target.parent(p), None);
        assert_eq!(stats.deletions, 1);
        assert_eq!(stats.placements, 1);
        assert_eq!(stats.updates, 0);
        assert!(target.mutations().contains(&Mutation::RemoveChild {
            parent: container,
            child: p,
        }));
    }

    #[test]
    fn type_change_mid_list_keeps_the_position() {
        let (mut target, container, mut renderer) = setup();
        let view = |first: &str| {
            Element::host("section")
                .child(Element::host(first))
                .child(Element::host("span"))
        };
        render_and_flush(&mut renderer, &mut target, container, view("p"));
        let section = target.children(container)[0];
        let span = target.children(section)[1];

        render_and_flush(&mut renderer, &mut target, container, view("div"));
        assert_eq!(
            target.inner_markup(container),
            "<section><div></div><span></span></section>"
        );
        assert_eq!(target.children(section)[1], span);
    }

    /// Xorshift64, seeded per sequence so failures reproduce.
    struct Rng(u64);

    impl Rng {
        fn below(&mut self, n: usize) -> usize {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            usize::try_from(self.0 % n as u64).unwrap()
        }
    }

    /// Builds a random tree over a few tags and its expected markup.
    fn random_tree(rng: &mut Rng, depth: u32) -> (Element, String) {
        use core::fmt::Write as _;

        if depth == 0 || rng.below(4) == 0 {
            let text = ["x", "y", "z"][rng.below(3)];
            return (Element::text(text), String::from(text));
        }
        let tag = ["a", "b", "c"][rng.below(3)];
        let mut element = Element::host(tag);
        let mut markup = alloc::format!("<{tag}");
        if rng.below(2) == 0 {
            let id = rng.below(3);
            element = element.attr("id", alloc::format!("{id}"));
            let _ = write!(markup, " id=\"{id}\"");
        }
        markup.push('>');
        for _ in 0..rng.below(4) {
            let (child, child_markup) = random_tree(rng, depth - 1);
            element = element.child(child);
            markup.push_str(&child_markup);
        }
        let _ = write!(markup, "</{tag}>");
        (element, markup)
    }

    #[test]
    fn random_rerenders_match_a_fresh_render() {
        for seed in 1..=200_u64 {
            let (mut target, container, mut renderer) = setup();
            let mut rng = Rng(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15));
            for _ in 0..5 {
                let (element, markup) = random_tree(&mut rng, 3);
                render_and_flush(&mut renderer, &mut target, container, element);
                assert_eq!(target.inner_markup(container), markup, "seed {seed}");
            }
        }
    }

    #[test]
    fn identical_rerender_issues_no_prop_mutations() {
        let (mut target, container, mut renderer) = setup();
        let handler = Listener::new(|_| {});
        let view = || {
            Element::host("form")
                .attr("action", "/go")
                .on("onSubmit", handler.clone())
                .child(Element::host("input").attr("value", "x"))
                .child("label")
        };

        render_and_flush(&mut renderer, &mut target, container, view());
        target.clear_mutations();
        let stats = render_and_flush(&mut renderer, &mut target, container, view());

        assert!(stats.is_empty());
        assert_eq!(stats.updates, 3);
        assert!(target.mutations().is_empty());
    }

    #[test]
    fn listener_replacement_detaches_before_attaching() {
        let (mut target, container, mut renderer) = setup();
        let seen = Rc::new(RefCell::new(Vec::<String>::new()));
        let listener = |name: &'static str| {
            let seen = seen.clone();
            Listener::new(move |args: &EventArgs<'_>| {
                seen.borrow_mut()
                    .push(alloc::format!("{name}:{}", args.value.unwrap_or_default()));
            })
        };

        let a = listener("a");
        let b = listener("b");
        render_and_flush(
            &mut renderer,
            &mut target,
            container,
            Element::host("input").on("onInput", a),
        );
        let input = target.children(container)[0];
        target.dispatch(input, "input", Some("1"));
        target.clear_mutations();

        render_and_flush(
            &mut renderer,
            &mut target,
            container,
            Element::host("input").on("onInput", b),
        );
        assert_eq!(
            target.mutations(),
            &[
                Mutation::RemoveListener {
                    node: input,
                    event: "input".into(),
                },
                Mutation::AddListener {
                    node: input,
                    event: "input".into(),
                },
            ]
        );
        assert_eq!(target.listener_count(input, "input"), 1);
        target.dispatch(input, "input", Some("2"));
        assert_eq!(*seen.borrow(), vec![String::from("a:1"), String::from("b:2")]);
    }

    #[test]
    fn shrinking_list_removes_only_the_tail() {
        let (mut target, container, mut renderer) = setup();
        let list = |n: usize| {
            Element::host("ul").children((0..n).map(|i| Element::host("li").child(alloc::format!("{i}"))))
        };
        render_and_flush(&mut renderer, &mut target, container, list(3));
        let ul = target.children(container)[0];
        let kept = target.children(ul)[0];

        let stats = render_and_flush(&mut renderer, &mut target, container, list(1));
        assert_eq!(stats.deletions, 2);
        assert_eq!(target.children(ul), &[kept]);
        assert_eq!(target.inner_markup(container), "<ul><li>0</li></ul>");
    }

    #[test]
    fn deletions_are_visible_before_commit() {
        let (mut target, container, mut renderer) = setup();
        render_and_flush(
            &mut renderer,
            &mut target,
            container,
            Element::host("div").child(Element::host("a")).child(Element::host("b")),
        );
        let current = renderer.current_root().unwrap();
        let div = renderer.fibers().child(current).unwrap();
        let old: Vec<_> = renderer.fibers().children(div).collect();

        renderer.render(
            Element::host("div").child(Element::host("a")).child(Element::text("b")),
            container,
        );
        // root, then div: div's unit reconciles its children.
        renderer.step(&mut target).unwrap();
        renderer.step(&mut target).unwrap();

        assert_eq!(renderer.deletions(), &[old[1]]);
        assert_eq!(renderer.fibers().effect(old[1]), EffectTag::Deletion);
        let wip_div = renderer
            .fibers()
            .child(renderer.wip_root().unwrap())
            .unwrap();
        let effects: Vec<_> = renderer
            .fibers()
            .children(wip_div)
            .map(|f| renderer.fibers().effect(f))
            .collect();
        assert_eq!(effects, vec![EffectTag::Update, EffectTag::Placement]);
    }

    #[test]
    fn committed_tree_is_settled() {
        let (mut target, container, mut renderer) = setup();
        render_and_flush(&mut renderer, &mut target, container, Element::host("p").child("x"));
        render_and_flush(&mut renderer, &mut target, container, Element::host("p").child("y"));

        let fibers = renderer.fibers();
        let root = renderer.current_root().unwrap();
        for fiber in fibers.preorder(root) {
            assert_eq!(fibers.alternate(fiber), None);
            assert_eq!(fibers.effect(fiber), EffectTag::None);
        }
        assert!(renderer.deletions().is_empty());
        assert!(renderer.is_idle());
    }

    #[test]
    fn arena_holds_only_the_current_tree() {
        let (mut target, container, mut renderer) = setup();
        let view = || Element::host("div").child(Element::host("p").child("a")).child("b");
        for _ in 0..5 {
            render_and_flush(&mut renderer, &mut target, container, view());
        }
        // root + div + p + two text fibers.
        assert_eq!(renderer.fibers().live_count(), 5);

        render_and_flush(&mut renderer, &mut target, container, Element::host("div"));
        assert_eq!(renderer.fibers().live_count(), 2);
    }

    #[test]
    fn superseding_render_discards_the_partial_tree() {
        let (mut target, container, mut renderer) = setup();
        render_and_flush(&mut renderer, &mut target, container, Element::host("p").child("old"));
        let baseline = renderer.fibers().live_count();

        renderer.render(Element::host("h1").child("lost"), container);
        renderer.step(&mut target).unwrap();
        renderer.step(&mut target).unwrap();
        assert!(!renderer.deletions().is_empty());

        renderer.render(Element::host("p").child("new"), container);
        assert_eq!(renderer.fibers().live_count(), baseline + 1);
        assert!(renderer.deletions().is_empty());
        let current = renderer.current_root().unwrap();
        for fiber in renderer.fibers().preorder(current) {
            assert_eq!(renderer.fibers().effect(fiber), EffectTag::None);
        }

        renderer.flush(&mut target).unwrap();
        assert_eq!(target.inner_markup(container), "<p>new</p>");
        assert_eq!(renderer.pass(), 3);
    }

    #[test]
    fn superseded_nodes_are_discarded_before_the_next_slice() {
        let (mut target, container, mut renderer) = setup();
        let on_input = Listener::new(|_| {});
        renderer.render(
            Element::host("div").child(Element::host("input").on("onInput", on_input)),
            container,
        );
        for _ in 0..3 {
            renderer.step(&mut target).unwrap();
        }
        let fibers = renderer.fibers();
        let div_fiber = fibers.children(renderer.wip_root().unwrap()).next().unwrap();
        let input_fiber = fibers.children(div_fiber).next().unwrap();
        let div = *fibers.node(div_fiber).unwrap();
        let input = *fibers.node(input_fiber).unwrap();
        assert!(target.children(container).is_empty());
        assert_eq!(target.listener_count(input, "input"), 1);

        renderer.render(Element::host("p"), container);
        assert!(target.discarded().is_empty());
        renderer.flush(&mut target).unwrap();

        assert_eq!(target.discarded(), &[div, input]);
        assert_eq!(target.listener_count(input, "input"), 0);
        assert_eq!(target.inner_markup(container), "<p></p>");
    }

    #[test]
    fn failed_pass_discards_its_nodes() {
        let (mut target, container, mut renderer) = setup();
        renderer.render(
            Element::host("div").child(Element::host("i")).child(Element::host("b")),
            container,
        );
        target.fail_next(TargetOp::AppendChild);
        renderer.flush(&mut target).unwrap_err();
        assert!(target.children(container).is_empty());
        assert_eq!(renderer.discarded.len(), 3);

        assert_eq!(renderer.flush(&mut target).unwrap(), None);
        assert_eq!(target.discarded().len(), 3);
        assert!(renderer.discarded.is_empty());
    }

    #[test]
    fn discard_failure_surfaces_once() {
        let (mut target, container, mut renderer) = setup();
        renderer.render(Element::host("div").child(Element::host("i")), container);
        renderer.step(&mut target).unwrap();
        renderer.step(&mut target).unwrap();
        renderer.step(&mut target).unwrap();
        renderer.render(Element::host("p"), container);

        target.fail_next(TargetOp::Discard);
        let err = renderer.flush(&mut target).unwrap_err();
        assert!(matches!(err, RenderError::Target(ref e) if e.op == TargetOp::Discard));
        assert_eq!(renderer.discarded.len(), 1);

        // The pass survives; the remaining node is released first.
        renderer.flush(&mut target).unwrap();
        assert_eq!(target.discarded().len(), 1);
        assert_eq!(target.inner_markup(container), "<p></p>");
    }

    #[test]
    fn updated_nodes_are_never_discarded() {
        let (mut target, container, mut renderer) = setup();
        render_and_flush(&mut renderer, &mut target, container, Element::host("p"));
        renderer.render(Element::host("p").attr("id", "x"), container);
        renderer.step(&mut target).unwrap();
        renderer.step(&mut target).unwrap();

        render_and_flush(&mut renderer, &mut target, container, Element::host("p"));
        assert!(target.discarded().is_empty());
    }

    #[test]
    fn new_container_starts_a_fresh_tree() {
        let mut target = MemoryTarget::new();
        let a = target.create_container("a");
        let b = target.create_container("b");
        let mut renderer = Renderer::new();

        render_and_flush(&mut renderer, &mut target, a, Element::host("p").child("x"));
        let stats = render_and_flush(&mut renderer, &mut target, b, Element::host("p").child("x"));

        assert_eq!(target.inner_markup(a), "");
        assert_eq!(target.inner_markup(b), "<p>x</p>");
        assert_eq!(stats.deletions, 1);
        assert_eq!(stats.placements, 2);
        assert_eq!(stats.updates, 0);
        assert_eq!(renderer.fibers().live_count(), 3);

        // Back to a same-container update.
        let stats = render_and_flush(&mut renderer, &mut target, b, Element::host("p").child("y"));
        assert_eq!(stats.deletions, 0);
        assert_eq!(target.inner_markup(b), "<p>y</p>");
    }

    #[test]
    fn abandoned_container_change_keeps_the_old_tree() {
        let mut target = MemoryTarget::new();
        let a = target.create_container("a");
        let b = target.create_container("b");
        let mut renderer = Renderer::new();
        render_and_flush(&mut renderer, &mut target, a, Element::host("p"));

        renderer.render(Element::host("p"), b);
        assert_eq!(renderer.deletions().len(), 1);
        renderer.render(Element::host("span"), a);
        assert!(renderer.deletions().is_empty());

        renderer.flush(&mut target).unwrap();
        assert_eq!(target.inner_markup(a), "<span></span>");
        assert_eq!(target.inner_markup(b), "");
    }

    #[test]
    fn failed_commit_aborts_the_pass() {
        let (mut target, container, mut renderer) = setup();
        render_and_flush(&mut renderer, &mut target, container, Element::host("p"));
        let current = renderer.current_root();

        renderer.render(Element::host("span"), container);
        target.fail_next(TargetOp::RemoveChild);
        let err = renderer.flush(&mut target).unwrap_err();

        assert_eq!(
            err,
            RenderError::Target(crate::error::TargetError::new(
                TargetOp::RemoveChild,
                "injected failure"
            ))
        );
        assert!(renderer.is_idle());
        assert_eq!(renderer.current_root(), current);
        assert_eq!(target.inner_markup(container), "<p></p>");
    }

    #[test]
    fn independent_roots_do_not_interfere() {
        let mut target = MemoryTarget::new();
        let left = target.create_container("left");
        let right = target.create_container("right");
        let mut a = Renderer::new();
        let mut b = Renderer::new();

        a.render(Element::host("p").child("a"), left);
        b.render(Element::host("p").child("b"), right);
        a.flush(&mut target).unwrap();
        b.flush(&mut target).unwrap();

        assert_eq!(target.inner_markup(left), "<p>a</p>");
        assert_eq!(target.inner_markup(right), "<p>b</p>");
    }

    #[test]
    fn text_content_goes_through_node_value() {
        let (mut target, container, mut renderer) = setup();
        render_and_flush(&mut renderer, &mut target, container, Element::text("hi"));
        let text = target.children(container)[0];
        assert_eq!(target.attribute(text, NODE_VALUE), Some("hi"));
    }

    #[cfg(feature = "trace")]
    #[test]
    fn trace_events_follow_the_pass() {
        use alloc::vec::Vec;

        use crate::trace::{SliceYieldEvent, TraceSink};

        #[derive(Default)]
        struct Log(Vec<&'static str>);
        impl TraceSink for Log {
            fn on_render(&mut self, _: &RenderEvent) {
                self.0.push("render");
            }
            fn on_unit_of_work(&mut self, _: &UnitOfWorkEvent) {
                self.0.push("unit");
            }
            fn on_slice_yield(&mut self, _: &SliceYieldEvent) {
                self.0.push("yield");
            }
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.0.push(match e.phase {
                    PhaseKind::Reconcile => "begin:reconcile",
                    PhaseKind::Commit => "begin:commit",
                });
            }
            fn on_phase_end(&mut self, e: &PhaseEndEvent) {
                self.0.push(match e.phase {
                    PhaseKind::Reconcile => "end:reconcile",
                    PhaseKind::Commit => "end:commit",
                });
            }
            fn on_commit(&mut self, _: &CommitEvent) {
                self.0.push("commit");
            }
            fn on_pass_abandoned(&mut self, _: &PassAbandonedEvent) {
                self.0.push("abandoned");
            }
        }

        let (mut target, container, mut renderer) = setup();
        let mut log = Log::default();
        let mut tracer = Tracer::new(&mut log);
        renderer.render_traced(Element::host("div"), container, &mut tracer);
        renderer.render_traced(Element::host("p"), container, &mut tracer);
        renderer
            .work_loop(&mut target, &crate::scheduler::UnitBudget::new(1), &mut tracer)
            .unwrap();
        renderer
            .work_loop(&mut target, &crate::scheduler::Unbounded, &mut tracer)
            .unwrap();
        drop(tracer);

        assert_eq!(
            log.0,
            vec![
                "render",
                "abandoned",
                "render",
                "begin:reconcile",
                "unit",
                "end:reconcile",
                "yield",
                "begin:reconcile",
                "unit",
                "end:reconcile",
                "begin:commit",
                "commit",
                "end:commit",
            ]
        );
    }
}
