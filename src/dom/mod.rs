//! In-memory document model.
//!
//! The localization manager works against an already-rendered page. This
//! module provides that page as an owned tree: elements with attributes,
//! text and element children, per-element and document-level event
//! listeners, and the handful of queries the localizer needs (by attribute,
//! by class, containment). Pages can be built programmatically or imported
//! from HTML (see [`html`]).

pub mod apply;
pub mod events;
pub mod html;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub use apply::{AppliedString, ApplyReport, ApplyTarget, I18N_ATTR, apply_table};
pub use events::{Event, EventKind, Listener, ListenerAction};

/// Document shared between the localizer and external collaborators
/// (fragment loaders, widgets) that mutate the same page.
pub type SharedDocument = Arc<Mutex<Document>>;

/// Attributes reported for ids whose element no longer exists.
static NO_ATTRS: BTreeMap<String, String> = BTreeMap::new();

/// Handle to an element inside its [`Document`].
///
/// The generation tells a released slot's old id apart from the element
/// that reuses the slot later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId {
    index: usize,
    generation: u32,
}

/// Child node of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// Nested element.
    Element(ElementId),
    /// Text run.
    Text(String),
}

/// Storage for one element.
#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: BTreeMap<String, String>,
    children: Vec<Child>,
    parent: Option<ElementId>,
    attached: bool,
    listeners: Vec<Listener>,
    generation: u32,
}

impl ElementData {
    /// Fresh, detached element.
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
            attached: false,
            listeners: Vec::new(),
            generation: 0,
        }
    }
}

/// An element tree rooted at an `<html>` element.
///
/// Elements live in an arena. Removing an element only detaches it, so it
/// can be appended again. Replacing an element with a clone releases the
/// original subtree: its ids stop resolving and the slots are reused by
/// later elements, so repeated re-binding does not grow the arena.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<ElementData>,
    free: Vec<usize>,
    root: ElementId,
    document_listeners: Vec<Listener>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only the `<html>` root.
    #[must_use]
    pub fn new() -> Self {
        let mut root = ElementData::new("html");
        root.attached = true;
        Self {
            elements: vec![root],
            free: Vec::new(),
            root: ElementId {
                index: 0,
                generation: 0,
            },
            document_listeners: Vec::new(),
        }
    }

    /// Wrap the document for sharing.
    #[must_use]
    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    /// The `<html>` root element.
    #[must_use]
    pub const fn root(&self) -> ElementId {
        self.root
    }

    /// Number of arena slots, free ones included.
    #[must_use]
    pub const fn arena_len(&self) -> usize {
        self.elements.len()
    }

    /// Create a detached element; attach it with [`Self::append_child`].
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.alloc(ElementData::new(tag))
    }

    /// What: Append `child` as the last element child of `parent`.
    ///
    /// Details:
    /// - A child that already has a parent is moved.
    /// - The child's subtree becomes attached when `parent` is attached.
    /// - Released ids are ignored.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if !self.is_live(parent) || !self.is_live(child) {
            return;
        }
        if parent == child || self.contains(child, parent) {
            tracing::warn!("refusing to append an element into its own subtree");
            return;
        }
        self.unlink(child);
        self.elements[parent.index].children.push(Child::Element(child));
        self.elements[child.index].parent = Some(parent);
        let attached = self.elements[parent.index].attached;
        self.set_attached(child, attached);
    }

    /// Append a text run to `parent`.
    pub fn append_text(&mut self, parent: ElementId, text: &str) {
        let Some(data) = self.get_mut(parent) else {
            return;
        };
        if let Some(Child::Text(last)) = data.children.last_mut() {
            last.push_str(text);
        } else {
            data.children.push(Child::Text(text.to_string()));
        }
    }

    /// Convenience: create `<tag class="...">` under `parent`.
    pub fn append_element(&mut self, parent: ElementId, tag: &str, class: Option<&str>) -> ElementId {
        let id = self.create_element(tag);
        if let Some(class) = class {
            self.set_attr(id, "class", class);
        }
        self.append_child(parent, id);
        id
    }

    /// Remove `id` (and its subtree) from the document.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.root || !self.is_live(id) {
            return;
        }
        self.unlink(id);
        self.set_attached(id, false);
    }

    /// What: Replace `id` by a deep clone of itself.
    ///
    /// Output:
    /// - Id of the clone, which takes the original's position
    ///
    /// Details:
    /// - Listeners are not cloned: the clone and its subtree start bare.
    /// - The original subtree is released together with its listeners; its
    ///   ids no longer resolve and its slots are reused.
    /// - A detached or released `id` is returned unchanged.
    pub fn replace_with_clone(&mut self, id: ElementId) -> ElementId {
        let Some(parent) = self.parent(id) else {
            return id;
        };
        let Some(position) = self.elements[parent.index]
            .children
            .iter()
            .position(|c| *c == Child::Element(id))
        else {
            return id;
        };
        let clone = self.deep_clone(id);
        self.elements[parent.index].children[position] = Child::Element(clone);
        self.elements[clone.index].parent = Some(parent);
        let attached = self.elements[parent.index].attached;
        self.set_attached(clone, attached);
        self.release(id);
        clone
    }

    /// Whether `id` is part of the live tree.
    #[must_use]
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|e| e.attached)
    }

    /// Lower-case tag name of `id`; empty for released ids.
    #[must_use]
    pub fn tag(&self, id: ElementId) -> &str {
        self.get(id).map_or("", |e| e.tag.as_str())
    }

    /// Parent element of `id`, if any.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|e| e.parent)
    }

    /// Child nodes of `id`.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[Child] {
        self.get(id).map(|e| e.children.as_slice()).unwrap_or_default()
    }

    /// Attribute value of `id`.
    #[must_use]
    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id)?.attrs.get(name).map(String::as_str)
    }

    /// All attributes of `id`, sorted by name.
    #[must_use]
    pub fn attrs(&self, id: ElementId) -> &BTreeMap<String, String> {
        self.get(id).map_or(&NO_ATTRS, |e| &e.attrs)
    }

    /// Set an attribute on `id`.
    pub fn set_attr(&mut self, id: ElementId, name: &str, value: &str) {
        if let Some(data) = self.get_mut(id) {
            data.attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// Whether the `class` attribute of `id` lists `class`.
    #[must_use]
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Add `class` to `id` unless already present.
    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let classes = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &classes);
    }

    /// Remove `class` from `id`.
    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let classes: Vec<&str> = self
            .attr(id, "class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        let joined = classes.join(" ");
        self.set_attr(id, "class", &joined);
    }

    /// Toggle `class` on `id`; returns whether it is now present.
    pub fn toggle_class(&mut self, id: ElementId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class);
            true
        }
    }

    /// Concatenated text of `id`'s subtree, in document order.
    #[must_use]
    pub fn text_content(&self, id: ElementId) -> String {
        let mut out = String::new();
        if self.is_live(id) {
            self.collect_text(id, &mut out);
        }
        out
    }

    /// Replace every child of `id` by a single text run.
    pub fn set_text_content(&mut self, id: ElementId, text: &str) {
        let Some(data) = self.get_mut(id) else {
            return;
        };
        let old: Vec<Child> = std::mem::take(&mut data.children);
        for child in old {
            if let Child::Element(child) = child {
                self.elements[child.index].parent = None;
                self.set_attached(child, false);
            }
        }
        if !text.is_empty() {
            self.elements[id.index]
                .children
                .push(Child::Text(text.to_string()));
        }
    }

    /// Value of one inline style property of `id`.
    #[must_use]
    pub fn style(&self, id: ElementId, property: &str) -> Option<String> {
        parse_style(self.attr(id, "style").unwrap_or_default())
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    /// Set one inline style property of `id`, keeping the others.
    pub fn set_style(&mut self, id: ElementId, property: &str, value: &str) {
        let mut declarations = parse_style(self.attr(id, "style").unwrap_or_default());
        if let Some(entry) = declarations.iter_mut().find(|(name, _)| name == property) {
            entry.1 = value.to_string();
        } else {
            declarations.push((property.to_string(), value.to_string()));
        }
        let style = declarations
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "style", &style);
    }

    /// Attached elements of `scope`'s subtree (excluding `scope`), in document order.
    #[must_use]
    pub fn descendants(&self, scope: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if self.is_live(scope) {
            self.collect_descendants(scope, &mut out);
        }
        out
    }

    /// Every attached element carrying attribute `name`, in document order.
    #[must_use]
    pub fn elements_with_attr(&self, name: &str) -> Vec<ElementId> {
        self.all_elements()
            .into_iter()
            .filter(|id| self.elements[id.index].attrs.contains_key(name))
            .collect()
    }

    /// First attached element with class `class`.
    #[must_use]
    pub fn query_class(&self, class: &str) -> Option<ElementId> {
        self.all_elements()
            .into_iter()
            .find(|id| self.has_class(*id, class))
    }

    /// Every attached element with class `class`.
    #[must_use]
    pub fn query_class_all(&self, class: &str) -> Vec<ElementId> {
        self.all_elements()
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    /// First element with class `class` inside `scope`'s subtree.
    #[must_use]
    pub fn query_class_within(&self, scope: ElementId, class: &str) -> Option<ElementId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.has_class(*id, class))
    }

    /// First element with tag `tag` in the document.
    #[must_use]
    pub fn query_tag(&self, tag: &str) -> Option<ElementId> {
        let tag = tag.to_ascii_lowercase();
        self.all_elements()
            .into_iter()
            .find(|id| self.elements[id.index].tag == tag)
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    #[must_use]
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        if !self.is_live(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.elements[id.index].parent;
        }
        false
    }

    /// Attach a listener to an element.
    pub fn add_listener(&mut self, target: ElementId, listener: Listener) {
        if let Some(data) = self.get_mut(target) {
            data.listeners.push(listener);
        }
    }

    /// Attach a listener to the document itself.
    pub fn add_document_listener(&mut self, listener: Listener) {
        self.document_listeners.push(listener);
    }

    /// Drop document-level listeners matching `predicate`; returns how many.
    pub fn remove_document_listeners<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Listener) -> bool,
    {
        let before = self.document_listeners.len();
        self.document_listeners.retain(|l| !predicate(l));
        before - self.document_listeners.len()
    }

    /// Number of listeners on attached elements plus the document.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        let on_elements: usize = self
            .all_elements()
            .into_iter()
            .map(|id| self.elements[id.index].listeners.len())
            .sum();
        on_elements + self.document_listeners.len()
    }

    /// What: Resolve which listeners an event triggers.
    ///
    /// Output:
    /// - Listeners in firing order: target, its ancestors, then the document
    ///
    /// Details:
    /// - A firing listener with `stop_propagation` stops the walk after the
    ///   element it is attached to.
    /// - Events aimed at detached or released elements only reach document
    ///   listeners.
    #[must_use]
    pub fn dispatch(&self, event: &Event) -> Vec<Listener> {
        let kind = event.kind();
        let mut fired = Vec::new();
        if let Some(target) = event.target().filter(|t| self.is_attached(*t)) {
            let mut current = Some(target);
            while let Some(id) = current {
                let mut stop = false;
                for listener in self.elements[id.index]
                    .listeners
                    .iter()
                    .filter(|l| l.event == kind)
                {
                    stop |= listener.stop_propagation;
                    fired.push(listener.clone());
                }
                if stop {
                    return fired;
                }
                current = self.elements[id.index].parent;
            }
        }
        fired.extend(
            self.document_listeners
                .iter()
                .filter(|l| l.event == kind)
                .cloned(),
        );
        fired
    }

    /// Slot for `id` when it still belongs to that element.
    fn get(&self, id: ElementId) -> Option<&ElementData> {
        self.elements
            .get(id.index)
            .filter(|e| e.generation == id.generation)
    }

    /// Mutable slot for `id` when it still belongs to that element.
    fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementData> {
        self.elements
            .get_mut(id.index)
            .filter(|e| e.generation == id.generation)
    }

    /// Whether `id` resolves to an element.
    fn is_live(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Store `data` in a free slot, or a new one.
    fn alloc(&mut self, mut data: ElementData) -> ElementId {
        if let Some(index) = self.free.pop() {
            data.generation = self.elements[index].generation;
            self.elements[index] = data;
            ElementId {
                index,
                generation: self.elements[index].generation,
            }
        } else {
            self.elements.push(data);
            ElementId {
                index: self.elements.len() - 1,
                generation: 0,
            }
        }
    }

    /// Free `id`'s subtree; old ids stop resolving.
    fn release(&mut self, id: ElementId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let slot = &mut self.elements[current.index];
            let generation = slot.generation.wrapping_add(1);
            let released = std::mem::replace(slot, ElementData::new(""));
            slot.generation = generation;
            self.free.push(current.index);
            pending.extend(released.children.into_iter().filter_map(|c| match c {
                Child::Element(e) => Some(e),
                Child::Text(_) => None,
            }));
        }
    }

    /// Root plus every attached descendant.
    fn all_elements(&self) -> Vec<ElementId> {
        let mut out = vec![self.root];
        self.collect_descendants(self.root, &mut out);
        out
    }

    /// Depth-first collection helper.
    fn collect_descendants(&self, id: ElementId, out: &mut Vec<ElementId>) {
        for child in &self.elements[id.index].children {
            if let Child::Element(child) = child
                && self.elements[child.index].attached
            {
                out.push(*child);
                self.collect_descendants(*child, out);
            }
        }
    }

    /// Depth-first text helper.
    fn collect_text(&self, id: ElementId, out: &mut String) {
        for child in &self.elements[id.index].children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Element(child) => self.collect_text(*child, out),
            }
        }
    }

    /// Detach `id` from its parent's child list.
    fn unlink(&mut self, id: ElementId) {
        if let Some(parent) = self.elements[id.index].parent.take() {
            self.elements[parent.index]
                .children
                .retain(|c| *c != Child::Element(id));
        }
    }

    /// Mark `id`'s subtree attached or detached.
    fn set_attached(&mut self, id: ElementId, attached: bool) {
        self.elements[id.index].attached = attached;
        let children: Vec<ElementId> = self.elements[id.index]
            .children
            .iter()
            .filter_map(|c| match c {
                Child::Element(e) => Some(*e),
                Child::Text(_) => None,
            })
            .collect();
        for child in children {
            self.set_attached(child, attached);
        }
    }

    /// Copy `id`'s subtree into fresh, detached, listener-free elements.
    fn deep_clone(&mut self, id: ElementId) -> ElementId {
        let source = &self.elements[id.index];
        let mut data = ElementData::new(&source.tag);
        data.attrs = source.attrs.clone();
        let children = source.children.clone();
        let clone = self.alloc(data);
        for child in children {
            match child {
                Child::Text(text) => self.elements[clone.index].children.push(Child::Text(text)),
                Child::Element(child) => {
                    let child_clone = self.deep_clone(child);
                    self.elements[child_clone.index].parent = Some(clone);
                    self.elements[clone.index]
                        .children
                        .push(Child::Element(child_clone));
                }
            }
        }
        clone
    }
}

/// Split an inline style attribute into `(property, value)` pairs.
fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}
