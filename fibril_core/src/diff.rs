// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prop differ.
//!
//! [`diff_props`] brings a rendered node from one prop set to another in four
//! ordered passes:
//!
//! 1. Unsubscribe previous listeners that are gone or whose handler changed.
//! 2. Reset previous attributes that are gone to `""`.
//! 3. Set next attributes that are new or changed.
//! 4. Subscribe next listeners that are new or changed.
//!
//! Old listeners are always detached before new ones are attached, with the
//! *old* handler, so a node never holds both handlers of one key at once.

use core::ops::AddAssign;

use crate::element::{PropValue, Props};
use crate::error::TargetError;
use crate::target::RenderTarget;

/// Number of target mutations issued by one or more [`diff_props`] calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PropChanges {
    /// Listeners unsubscribed (pass 1).
    pub listeners_removed: u32,
    /// Attributes reset to the empty value (pass 2).
    pub attributes_reset: u32,
    /// Attributes set (pass 3).
    pub attributes_set: u32,
    /// Listeners subscribed (pass 4).
    pub listeners_added: u32,
}

impl PropChanges {
    /// Total number of mutations.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.listeners_removed + self.attributes_reset + self.attributes_set + self.listeners_added
    }

    /// Returns `true` if no mutation was issued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign for PropChanges {
    fn add_assign(&mut self, rhs: Self) {
        self.listeners_removed += rhs.listeners_removed;
        self.attributes_reset += rhs.attributes_reset;
        self.attributes_set += rhs.attributes_set;
        self.listeners_added += rhs.listeners_added;
    }
}

/// Applies the delta between `prev` and `next` to `node`.
///
/// Children are not looked at. Reads only the two prop sets; the only side
/// effects are the target calls.
pub fn diff_props<T: RenderTarget + ?Sized>(
    target: &mut T,
    node: &T::Node,
    prev: &Props,
    next: &Props,
) -> Result<PropChanges, TargetError> {
    let mut changes = PropChanges::default();

    for prop in prev.entries() {
        if let PropValue::Listener { event, handler } = prop.value()
            && next.get(prop.key()) != Some(prop.value())
        {
            target.remove_listener(node, event, handler)?;
            changes.listeners_removed += 1;
        }
    }

    for prop in prev.entries() {
        if matches!(prop.value(), PropValue::Attribute(_)) && next.get(prop.key()).is_none() {
            target.set_attribute(node, prop.key(), "")?;
            changes.attributes_reset += 1;
        }
    }

    for prop in next.entries() {
        if let PropValue::Attribute(value) = prop.value()
            && prev.get(prop.key()) != Some(prop.value())
        {
            target.set_attribute(node, prop.key(), value)?;
            changes.attributes_set += 1;
        }
    }

    for prop in next.entries() {
        if let PropValue::Listener { event, handler } = prop.value()
            && prev.get(prop.key()) != Some(prop.value())
        {
            target.add_listener(node, event, handler)?;
            changes.listeners_added += 1;
        }
    }

    Ok(changes)
}
