// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node materializer.

use crate::diff::{PropChanges, diff_props};
use crate::element::{ElementType, Props};
use crate::error::RenderError;
use crate::target::RenderTarget;

/// Creates the rendered node for one element and applies its initial props.
///
/// Exactly one node is created; it is not inserted anywhere. Insertion happens
/// at commit. The initial props go through [`diff_props`] against an empty
/// baseline, so attributes and listeners are applied the same way updates are.
///
/// Fails with [`RenderError::MalformedElement`] for a host element with an
/// empty tag, and with [`RenderError::Target`] if the target rejects a call.
pub fn materialize<T: RenderTarget + ?Sized>(
    target: &mut T,
    ty: &ElementType,
    props: &Props,
) -> Result<(T::Node, PropChanges), RenderError> {
    let node = match ty {
        ElementType::Text => target.create_text()?,
        ElementType::Host(tag) if tag.is_empty() => {
            return Err(RenderError::MalformedElement {
                reason: "host element with an empty tag",
            });
        }
        ElementType::Host(tag) => target.create_element(tag)?,
    };
    let changes = diff_props(target, &node, &Props::default(), props)?;
    Ok((node, changes))
}

#[cfg(test)]
mod tests {
    use crate::element::{Element, EventArgs};
    use crate::error::TargetOp;
    use crate::headless::{MemoryTarget, Mutation};

    use super::*;

    #[test]
    fn text_node_gets_its_content() {
        let mut target = MemoryTarget::new();
        let el = Element::text("World");
        let (node, changes) = materialize(&mut target, el.element_type(), el.props()).unwrap();
        assert_eq!(target.text(node), Some("World"));
        assert_eq!(changes.attributes_set, 1);
    }

    #[test]
    fn element_gets_attributes_and_listeners_but_no_parent() {
        let mut target = MemoryTarget::new();
        let el = Element::host("input")
            .attr("value", "World")
            .on("onInput", |_: &EventArgs<'_>| {});
        let (node, changes) = materialize(&mut target, el.element_type(), el.props()).unwrap();

        assert_eq!(target.tag(node), Some("input"));
        assert_eq!(target.attribute(node, "value"), Some("World"));
        assert_eq!(target.listener_count(node, "input"), 1);
        assert_eq!(target.parent(node), None);
        assert_eq!(changes.total(), 2);
        assert!(
            !target
                .mutations()
                .iter()
                .any(|m| matches!(m, Mutation::AppendChild { .. }))
        );
    }

    #[test]
    fn empty_tag_is_malformed() {
        let mut target = MemoryTarget::new();
        let err = materialize(&mut target, &ElementType::host(""), &Props::default()).unwrap_err();
        assert!(matches!(err, RenderError::MalformedElement { .. }));
        assert!(target.mutations().is_empty());
    }

    #[test]
    fn target_failure_propagates() {
        let mut target = MemoryTarget::new();
        target.fail_next(TargetOp::CreateElement);
        let err = materialize(&mut target, &ElementType::host("div"), &Props::default()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Target(e) if e.op == TargetOp::CreateElement
        ));
    }
}
