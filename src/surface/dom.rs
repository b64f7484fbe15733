use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt,
    rc::{Rc, Weak},
};

use layout_fixer_core::text::{TextRange, floor_boundary};

/// Attributes whose changes are reported as [`MutationRecord::AttributeChanged`].
const OBSERVED_ATTRIBUTES: [&str; 2] = ["contenteditable", "role"];

/// Notification dispatched on an element after a programmatic edit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DomEvent {
    Input,
    Change,
}

#[derive(Default)]
struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    value: String,
    text: String,
    selection: TextRange,
    text_align: Option<&'static str>,
    attached: bool,
    parent: Weak<RefCell<ElementData>>,
    children: Vec<Node>,
    dispatched: Vec<DomEvent>,
}

impl ElementData {
    fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea")
    }

    /// Text the selection offsets index into.
    fn editable_text(&self) -> &str {
        if self.is_form_control() {
            &self.value
        } else {
            &self.text
        }
    }

    fn clamp_selection(&mut self) {
        let text = self.editable_text();
        let start = floor_boundary(text, self.selection.start);
        let end = floor_boundary(text, self.selection.end);
        self.selection = TextRange::ordered(start, end);
    }
}

/// Shared handle to an element.
#[derive(Clone)]
pub struct Node(Rc<RefCell<ElementData>>);

/// Non-owning element reference; never keeps a removed element alive.
#[derive(Clone, Default)]
pub struct WeakNode(Weak<RefCell<ElementData>>);

impl Node {
    /// Creates a detached element. Tag names are stored lowercase.
    pub fn element(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        })))
    }

    /// Builder form of an attribute write, for elements that are not in a document yet.
    #[must_use]
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_value(self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    #[must_use]
    pub fn with_text(self, text: &str) -> Self {
        self.set_text_content(text);
        self
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }

    pub(crate) fn set_attribute_raw(&self, name: &str, value: &str) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn is_form_control(&self) -> bool {
        self.0.borrow().is_form_control()
    }

    pub fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    /// Writes the form value without dispatching any event, like a script assignment.
    pub fn set_value(&self, value: &str) {
        let mut el = self.0.borrow_mut();
        el.value = value.to_string();
        el.clamp_selection();
    }

    pub fn text_content(&self) -> String {
        self.0.borrow().text.clone()
    }

    pub fn set_text_content(&self, text: &str) {
        let mut el = self.0.borrow_mut();
        el.text = text.to_string();
        el.clamp_selection();
    }

    pub fn selection(&self) -> TextRange {
        self.0.borrow().selection
    }

    /// Sets the selection, clamped into the current text and onto code point boundaries.
    pub fn set_selection(&self, range: TextRange) {
        let mut el = self.0.borrow_mut();
        el.selection = TextRange::ordered(range.start, range.end);
        el.clamp_selection();
    }

    pub fn text_align(&self) -> Option<&'static str> {
        self.0.borrow().text_align
    }

    pub(crate) fn set_text_align(&self, align: &'static str) {
        self.0.borrow_mut().text_align = Some(align);
    }

    pub fn is_attached(&self) -> bool {
        self.0.borrow().attached
    }

    pub fn dispatch_event(&self, event: DomEvent) {
        self.0.borrow_mut().dispatched.push(event);
    }

    /// Drains the events dispatched on this element so far.
    pub fn take_dispatched_events(&self) -> Vec<DomEvent> {
        std::mem::take(&mut self.0.borrow_mut().dispatched)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    /// The element itself followed by all of its descendants in document order.
    pub fn subtree(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn set_attached_recursive(&self, attached: bool) {
        for node in self.subtree() {
            node.0.borrow_mut().attached = attached;
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let el = self.0.borrow();
        f.debug_struct("Node")
            .field("tag", &el.tag)
            .field("attached", &el.attached)
            .finish_non_exhaustive()
    }
}

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }

    pub fn points_to(&self, node: &Node) -> bool {
        Weak::ptr_eq(&self.0, &Rc::downgrade(&node.0))
    }

    /// Upgrades only while the element is still part of a document.
    pub fn attached(&self) -> Option<Node> {
        self.upgrade().filter(Node::is_attached)
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(node) => write!(f, "WeakNode({node:?})"),
            None => f.write_str("WeakNode(dropped)"),
        }
    }
}

/// Change to the document tree, as reported to the surface-discovery watcher.
#[derive(Clone, Debug)]
pub enum MutationRecord {
    Added(Node),
    Removed(WeakNode),
    AttributeChanged { target: Node, name: String },
}

/// Element tree with a body, a focused element and a queue of mutation records.
#[derive(Debug)]
pub struct Document {
    body: Node,
    focused: Option<WeakNode>,
    mutations: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Node::element("body");
        body.0.borrow_mut().attached = true;
        Self {
            body,
            focused: None,
            mutations: Vec::new(),
        }
    }

    pub fn body(&self) -> &Node {
        &self.body
    }

    /// Appends `child` under `parent`; the subtree is attached if `parent` is.
    ///
    /// A child that already has a parent is moved. Returns `false` and changes
    /// nothing when `parent` is `child` itself or one of its descendants.
    pub fn append_child(&mut self, parent: &Node, child: &Node) -> bool {
        if child.subtree().iter().any(|n| n.ptr_eq(parent)) {
            tracing::debug!(?parent, ?child, "append would create a cycle");
            return false;
        }

        if let Some(old_parent) = child.parent() {
            old_parent
                .0
                .borrow_mut()
                .children
                .retain(|c| !c.ptr_eq(child));
        }

        child.0.borrow_mut().parent = Rc::downgrade(&parent.0);
        parent.0.borrow_mut().children.push(child.clone());

        if parent.is_attached() {
            child.set_attached_recursive(true);
            self.mutations.push(MutationRecord::Added(child.clone()));
        }
        true
    }

    /// Detaches `node` and its subtree from the document.
    pub fn remove(&mut self, node: &Node) {
        if let Some(parent) = node.parent() {
            parent.0.borrow_mut().children.retain(|c| !c.ptr_eq(node));
        }
        node.0.borrow_mut().parent = Weak::new();

        let was_attached = node.is_attached();
        node.set_attached_recursive(false);

        if self.focused().is_none() {
            self.focused = None;
        }

        if was_attached {
            self.mutations
                .push(MutationRecord::Removed(node.downgrade()));
        }
    }

    pub fn set_attribute(&mut self, node: &Node, name: &str, value: &str) {
        node.set_attribute_raw(name, value);

        let name = name.to_ascii_lowercase();
        if node.is_attached() && OBSERVED_ATTRIBUTES.contains(&name.as_str()) {
            self.mutations.push(MutationRecord::AttributeChanged {
                target: node.clone(),
                name,
            });
        }
    }

    /// Moves focus to `node` if it is attached.
    pub fn focus(&mut self, node: &Node) -> bool {
        if !node.is_attached() {
            return false;
        }
        self.focused = Some(node.downgrade());
        true
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Currently focused element, if it is still attached.
    pub fn focused(&self) -> Option<Node> {
        self.focused.as_ref().and_then(WeakNode::attached)
    }

    /// Drains pending mutation records in the order they happened.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }
}
