// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element descriptions.
//!
//! An [`Element`] is an immutable description of one node of the UI: an
//! [`ElementType`], a set of [`Props`], and an ordered list of child elements.
//! Elements are built fresh for every [`render`](crate::Renderer::render) call
//! and are cheap to clone, since props are shared rather than copied.
//!
//! Props are classified once, when they are built:
//!
//! - A **listener** is a key starting with [`LISTENER_PREFIX`] that carries a
//!   [`Listener`]. Its event name is the key with the prefix stripped and the
//!   remainder lower-cased (`onInput` subscribes to `input`).
//! - Everything else is a plain **attribute** with a string value.
//!
//! The reconciler and the prop differ only ever look at the tagged
//! [`PropValue`], never at the shape of the key.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Key prefix reserved for event listeners.
pub const LISTENER_PREFIX: &str = "on";

/// Attribute carrying the content of a text node.
pub const NODE_VALUE: &str = "nodeValue";

/// What kind of rendered node an element describes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// A host element with the given tag (`div`, `input`, ...).
    Host(String),
    /// A raw text node. Its content lives in the [`NODE_VALUE`] attribute.
    Text,
}

impl ElementType {
    /// Creates a host element type.
    #[must_use]
    pub fn host(tag: impl Into<String>) -> Self {
        Self::Host(tag.into())
    }

    /// Returns the host tag, or `None` for text.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Host(tag) => Some(tag),
            Self::Text => None,
        }
    }

    /// Returns `true` for the text sentinel.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(tag) => write!(f, "<{tag}>"),
            Self::Text => f.write_str("#text"),
        }
    }
}

/// What a listener receives when its event fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventArgs<'a> {
    /// Event name, e.g. `input`.
    pub event: &'a str,
    /// Current value of the event target, when the host has one (form
    /// controls).
    pub value: Option<&'a str>,
}

/// A shared event handler.
///
/// Two listeners are equal only if they are clones of the same handler. The
/// prop differ relies on this: re-rendering with the same `Listener` leaves
/// the subscription alone, while a freshly created closure replaces it.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&EventArgs<'_>)>);

impl Listener {
    /// Wraps a handler function.
    pub fn new(handler: impl Fn(&EventArgs<'_>) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Invokes the handler.
    pub fn call(&self, args: &EventArgs<'_>) {
        (self.0)(args);
    }

    /// Returns `true` if both listeners share the same handler.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<F> From<F> for Listener
where
    F: Fn(&EventArgs<'_>) + 'static,
{
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// Returns `true` if `key` names an event listener.
#[must_use]
pub fn is_listener_key(key: &str) -> bool {
    key.len() > LISTENER_PREFIX.len() && key.starts_with(LISTENER_PREFIX)
}

/// Derives the event name from a listener key (`onInput` → `input`).
///
/// Returns `None` if `key` is not a listener key.
#[must_use]
pub fn event_name(key: &str) -> Option<String> {
    if !is_listener_key(key) {
        return None;
    }
    Some(key[LISTENER_PREFIX.len()..].to_lowercase())
}

/// The tagged value of a single prop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropValue {
    /// A plain attribute.
    Attribute(String),
    /// An event subscription.
    Listener {
        /// Event name derived from the key.
        event: String,
        /// The handler.
        handler: Listener,
    },
}

/// One keyed prop of an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prop {
    key: String,
    value: PropValue,
}

impl Prop {
    /// Creates a plain attribute.
    ///
    /// The value is always treated as an attribute, even when the key looks
    /// like a listener key.
    #[must_use]
    pub fn attribute(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: PropValue::Attribute(value.into()),
        }
    }

    /// Creates an event listener prop.
    ///
    /// # Panics
    ///
    /// Panics if `key` does not start with [`LISTENER_PREFIX`] followed by an
    /// event name.
    #[must_use]
    pub fn listener(key: impl Into<String>, handler: impl Into<Listener>) -> Self {
        let key = key.into();
        let Some(event) = event_name(&key) else {
            panic!("listener key {key:?} must start with {LISTENER_PREFIX:?} and name an event");
        };
        Self {
            key,
            value: PropValue::Listener {
                event,
                handler: handler.into(),
            },
        }
    }

    /// Returns the prop key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the tagged value.
    #[must_use]
    pub fn value(&self) -> &PropValue {
        &self.value
    }

    /// Returns the attribute value, if this prop is an attribute.
    #[must_use]
    pub fn as_attribute(&self) -> Option<&str> {
        match &self.value {
            PropValue::Attribute(value) => Some(value),
            PropValue::Listener { .. } => None,
        }
    }

    /// Returns the event name and handler, if this prop is a listener.
    #[must_use]
    pub fn as_listener(&self) -> Option<(&str, &Listener)> {
        match &self.value {
            PropValue::Listener { event, handler } => Some((event, handler)),
            PropValue::Attribute(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct PropsInner {
    entries: Vec<Prop>,
    children: Vec<Element>,
}

/// The props of an element: keyed attributes and listeners plus the ordered
/// children.
///
/// Keys are unique; setting a key twice keeps the last value in the position
/// of the first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Props(Rc<PropsInner>);

impl Props {
    /// Creates props from entries and children.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = Prop>, children: Vec<Element>) -> Self {
        let mut props = Self::default();
        for prop in entries {
            props.set(prop);
        }
        Rc::make_mut(&mut props.0).children = children;
        props
    }

    /// Looks up a prop value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0
            .entries
            .iter()
            .find(|prop| prop.key == key)
            .map(|prop| &prop.value)
    }

    /// Returns all props in insertion order, excluding children.
    #[must_use]
    pub fn entries(&self) -> &[Prop] {
        &self.0.entries
    }

    /// Returns the child elements.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.0.children
    }

    /// Returns `true` if there are neither props nor children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.entries.is_empty() && self.0.children.is_empty()
    }

    fn set(&mut self, prop: Prop) {
        let inner = Rc::make_mut(&mut self.0);
        match inner.entries.iter_mut().find(|p| p.key == prop.key) {
            Some(slot) => *slot = prop,
            None => inner.entries.push(prop),
        }
    }

    fn push_child(&mut self, child: Element) {
        Rc::make_mut(&mut self.0).children.push(child);
    }
}

/// An immutable description of one UI node.
///
/// Built either with [`Element::new`] (type, props, children) or fluently:
///
/// ```
/// use fibril_core::element::Element;
///
/// let heading = Element::host("h2").child("Hello ").child("World");
/// assert_eq!(heading.props().children().len(), 2);
/// ```
///
/// Strings used as children are wrapped into [text](Element::text) elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    ty: ElementType,
    props: Props,
}

impl Element {
    /// Creates an element from a type, its props, and its children.
    ///
    /// # Panics
    ///
    /// Panics if a text element is given children.
    #[must_use]
    pub fn new<C>(
        ty: ElementType,
        props: impl IntoIterator<Item = Prop>,
        children: impl IntoIterator<Item = C>,
    ) -> Self
    where
        C: Into<Self>,
    {
        let children: Vec<Self> = children.into_iter().map(Into::into).collect();
        assert!(
            !ty.is_text() || children.is_empty(),
            "text elements cannot have children"
        );
        Self {
            props: Props::new(props, children),
            ty,
        }
    }

    /// Creates a host element with no props or children.
    #[must_use]
    pub fn host(tag: impl Into<String>) -> Self {
        Self {
            ty: ElementType::host(tag),
            props: Props::default(),
        }
    }

    /// Creates a text element.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            ty: ElementType::Text,
            props: Props::new([Prop::attribute(NODE_VALUE, content)], Vec::new()),
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.set(Prop::attribute(key, value));
        self
    }

    /// Sets an event listener (`key` like `onInput`).
    ///
    /// # Panics
    ///
    /// Panics if `key` is not a listener key; see [`Prop::listener`].
    #[must_use]
    pub fn on(mut self, key: impl Into<String>, handler: impl Into<Listener>) -> Self {
        self.props.set(Prop::listener(key, handler));
        self
    }

    /// Appends a child.
    ///
    /// # Panics
    ///
    /// Panics if `self` is a text element.
    #[must_use]
    pub fn child(mut self, child: impl Into<Self>) -> Self {
        assert!(!self.ty.is_text(), "text elements cannot have children");
        self.props.push_child(child.into());
        self
    }

    /// Appends several children.
    ///
    /// # Panics
    ///
    /// Panics if `self` is a text element.
    #[must_use]
    pub fn children<C: Into<Self>>(self, children: impl IntoIterator<Item = C>) -> Self {
        children.into_iter().fold(self, |el, child| el.child(child))
    }

    /// Returns the element type.
    #[must_use]
    pub fn element_type(&self) -> &ElementType {
        &self.ty
    }

    /// Returns the props, including children.
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.props
    }
}

impl From<&str> for Element {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Element {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn event_name_strips_prefix_and_lowercases() {
        assert_eq!(event_name("onInput").as_deref(), Some("input"));
        assert_eq!(event_name("onclick").as_deref(), Some("click"));
        assert_eq!(event_name("on"), None);
        assert_eq!(event_name("value"), None);
    }

    #[test]
    fn string_children_become_text_elements() {
        let el = Element::host("h2").child("Hello ").child(String::from("World"));
        let children = el.props().children();
        assert_eq!(children.len(), 2);
        assert!(children[0].element_type().is_text());
        assert_eq!(
            children[1].props().get(NODE_VALUE),
            Some(&PropValue::Attribute("World".into()))
        );
    }

    #[test]
    fn props_are_tagged_at_build_time() {
        let el = Element::host("input")
            .attr("value", "World")
            .on("onInput", |_: &EventArgs<'_>| {});
        let props = el.props();
        assert_eq!(props.entries()[0].as_attribute(), Some("World"));
        let (event, _) = props.entries()[1].as_listener().unwrap();
        assert_eq!(event, "input");
    }

    #[test]
    fn setting_a_key_twice_keeps_last_value() {
        let el = Element::host("div").attr("id", "a").attr("class", "x").attr("id", "b");
        let keys: Vec<_> = el.props().entries().iter().map(Prop::key).collect();
        assert_eq!(keys, vec!["id", "class"]);
        assert_eq!(el.props().entries()[0].as_attribute(), Some("b"));
    }

    #[test]
    fn listener_equality_is_identity() {
        let a = Listener::new(|_| {});
        let b = Listener::new(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn new_matches_fluent_builder() {
        let built = Element::new(
            ElementType::host("div"),
            [Prop::attribute("id", "root")],
            ["hi"],
        );
        let fluent = Element::host("div").attr("id", "root").child("hi");
        assert_eq!(built, fluent);
    }

    #[test]
    #[should_panic(expected = "must start with")]
    fn listener_with_plain_key_panics() {
        let _ = Prop::listener("value", |_: &EventArgs<'_>| {});
    }

    #[test]
    #[should_panic(expected = "text elements cannot have children")]
    fn text_with_children_panics() {
        let _ = Element::text("a").child("b");
    }
}
