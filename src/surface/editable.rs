use layout_fixer_core::text::{Direction, TextRange, replace_utf16_range, utf16_len};

use super::dom::{DomEvent, Node, WeakNode};

/// `type` values of `<input>` that hold free text.
const TEXT_INPUT_TYPES: [&str; 6] = ["text", "search", "email", "url", "tel", "password"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// `<input>` or `<textarea>`: text lives in `value`.
    PlainField,
    /// Anything else that accepts text: text lives in the text content.
    ContentEditable,
}

impl SurfaceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            SurfaceKind::PlainField => "plain_field",
            SurfaceKind::ContentEditable => "content_editable",
        }
    }
}

/// Returns `true` if `node` can hold user-edited text.
///
/// Tolerates `None`. Detached elements are never editable.
pub fn is_editable(node: Option<&Node>) -> bool {
    node.and_then(surface_kind).is_some()
}

fn surface_kind(node: &Node) -> Option<SurfaceKind> {
    if !node.is_attached() {
        return None;
    }

    match node.tag().as_str() {
        "textarea" => return Some(SurfaceKind::PlainField),
        "input" => {
            let ty = node.attribute("type").map(|t| t.to_ascii_lowercase());
            return match ty.as_deref() {
                None | Some("") => Some(SurfaceKind::PlainField),
                Some(t) if TEXT_INPUT_TYPES.contains(&t) => Some(SurfaceKind::PlainField),
                Some(_) => None,
            };
        }
        _ => {}
    }

    let content_editable = node.attribute("contenteditable");
    if content_editable.as_deref() == Some("false") {
        return None;
    }

    let editable = matches!(
        content_editable.as_deref(),
        Some("" | "true" | "plaintext-only")
    ) || matches!(node.attribute("role").as_deref(), Some("textbox" | "textinput"))
        || node.attribute("aria-multiline").as_deref() == Some("true")
        || node.has_class("editable")
        || node
            .attribute("class")
            .is_some_and(|class| class.contains("textbox"))
        || node
            .attribute("data-testid")
            .is_some_and(|id| id.contains("edit"));

    editable.then_some(SurfaceKind::ContentEditable)
}

/// Read/write access to the text of one editable surface.
///
/// Every method is a no-op on a detached element: reads return an empty
/// string or a zero range, writes do nothing.
pub trait TextSurface {
    fn text(&self) -> String;

    /// Current caret or selection; `start == end` for a collapsed caret.
    fn selection(&self) -> TextRange;

    /// Replaces the entire content.
    fn set_text(&self, text: &str);

    fn set_selection(&self, range: TextRange);

    /// Replaces exactly `range`, moves the caret after the inserted text and
    /// returns that caret offset. `None` if `range` does not fit the text.
    fn replace_range(&self, text: &str, range: TextRange) -> Option<usize>;

    fn set_direction(&self, direction: Direction);
}

/// `<input>`/`<textarea>` surface.
#[derive(Clone, Debug)]
pub struct PlainField(Node);

/// Content-editable (or textbox-like) surface.
#[derive(Clone, Debug)]
pub struct ContentEditable(Node);

impl PlainField {
    /// Page scripts bound to the field only see the change through these.
    fn notify(&self) {
        self.0.dispatch_event(DomEvent::Input);
        self.0.dispatch_event(DomEvent::Change);
    }
}

impl TextSurface for PlainField {
    fn text(&self) -> String {
        if !self.0.is_attached() {
            return String::new();
        }
        self.0.value()
    }

    fn selection(&self) -> TextRange {
        if !self.0.is_attached() {
            return TextRange::default();
        }
        self.0.selection()
    }

    fn set_text(&self, text: &str) {
        if !self.0.is_attached() {
            return;
        }
        self.0.set_value(text);
        self.0.set_selection(TextRange::caret(utf16_len(text)));
        self.notify();
    }

    fn set_selection(&self, range: TextRange) {
        if self.0.is_attached() {
            self.0.set_selection(range);
        }
    }

    fn replace_range(&self, text: &str, range: TextRange) -> Option<usize> {
        if !self.0.is_attached() {
            return None;
        }
        let (value, caret) = replace_utf16_range(&self.0.value(), text, range)?;
        self.0.set_value(&value);
        self.0.set_selection(TextRange::caret(caret));
        self.notify();
        Some(caret)
    }

    fn set_direction(&self, direction: Direction) {
        if !self.0.is_attached() {
            return;
        }
        self.0.set_attribute_raw("dir", direction.as_str());
        self.0.set_text_align(direction.text_align());
    }
}

impl TextSurface for ContentEditable {
    fn text(&self) -> String {
        if !self.0.is_attached() {
            return String::new();
        }
        self.0.text_content()
    }

    fn selection(&self) -> TextRange {
        if !self.0.is_attached() {
            return TextRange::default();
        }
        self.0.selection()
    }

    fn set_text(&self, text: &str) {
        if !self.0.is_attached() {
            return;
        }
        self.0.set_text_content(text);
        self.0.set_selection(TextRange::caret(utf16_len(text)));
    }

    fn set_selection(&self, range: TextRange) {
        if self.0.is_attached() {
            self.0.set_selection(range);
        }
    }

    fn replace_range(&self, text: &str, range: TextRange) -> Option<usize> {
        if !self.0.is_attached() {
            return None;
        }
        let (content, caret) = replace_utf16_range(&self.0.text_content(), text, range)?;
        self.0.set_text_content(&content);
        self.0.set_selection(TextRange::caret(caret));
        Some(caret)
    }

    fn set_direction(&self, direction: Direction) {
        if self.0.is_attached() {
            self.0.set_attribute_raw("dir", direction.as_str());
        }
    }
}

/// An element resolved to one of the two surface variants.
#[derive(Clone, Debug)]
pub enum EditableSurface {
    PlainField(PlainField),
    ContentEditable(ContentEditable),
}

impl EditableSurface {
    /// Classifies `node`; `None` if it is not editable or not attached.
    pub fn resolve(node: &Node) -> Option<Self> {
        let surface = match surface_kind(node)? {
            SurfaceKind::PlainField => Self::PlainField(PlainField(node.clone())),
            SurfaceKind::ContentEditable => Self::ContentEditable(ContentEditable(node.clone())),
        };
        Some(surface)
    }

    pub fn kind(&self) -> SurfaceKind {
        match self {
            Self::PlainField(_) => SurfaceKind::PlainField,
            Self::ContentEditable(_) => SurfaceKind::ContentEditable,
        }
    }

    pub fn node(&self) -> &Node {
        match self {
            Self::PlainField(f) => &f.0,
            Self::ContentEditable(c) => &c.0,
        }
    }

    pub fn downgrade(&self) -> WeakNode {
        self.node().downgrade()
    }

    pub fn is_attached(&self) -> bool {
        self.node().is_attached()
    }

    fn ops(&self) -> &dyn TextSurface {
        match self {
            Self::PlainField(f) => f,
            Self::ContentEditable(c) => c,
        }
    }
}

impl TextSurface for EditableSurface {
    fn text(&self) -> String {
        self.ops().text()
    }

    fn selection(&self) -> TextRange {
        self.ops().selection()
    }

    fn set_text(&self, text: &str) {
        self.ops().set_text(text);
    }

    fn set_selection(&self, range: TextRange) {
        self.ops().set_selection(range);
    }

    fn replace_range(&self, text: &str, range: TextRange) -> Option<usize> {
        self.ops().replace_range(text, range)
    }

    fn set_direction(&self, direction: Direction) {
        self.ops().set_direction(direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::dom::Document;

    fn attach(doc: &mut Document, node: Node) -> Node {
        let body = doc.body().clone();
        doc.append_child(&body, &node);
        node
    }

    #[test]
    fn editability_rules() {
        let mut doc = Document::new();
        let cases = [
            (Node::element("input"), true),
            (Node::element("input").with_attribute("type", "search"), true),
            (Node::element("input").with_attribute("type", "checkbox"), false),
            (Node::element("textarea"), true),
            (Node::element("div"), false),
            (Node::element("div").with_attribute("contenteditable", "true"), true),
            (Node::element("div").with_attribute("contenteditable", ""), true),
            (Node::element("div").with_attribute("contenteditable", "false"), false),
            (Node::element("div").with_attribute("role", "textbox"), true),
            (Node::element("div").with_attribute("role", "textinput"), true),
            (Node::element("div").with_attribute("aria-multiline", "true"), true),
            (Node::element("div").with_attribute("class", "note editable"), true),
            (Node::element("div").with_attribute("class", "rich-textbox-wrap"), true),
            (Node::element("div").with_attribute("data-testid", "tweet-editor"), true),
            (
                Node::element("div")
                    .with_attribute("role", "textbox")
                    .with_attribute("contenteditable", "false"),
                false,
            ),
        ];

        for (node, expected) in cases {
            let node = attach(&mut doc, node);
            assert_eq!(
                is_editable(Some(&node)),
                expected,
                "{node:?} {:?}",
                node.attribute("class")
            );
        }
    }

    #[test]
    fn none_and_detached_are_not_editable() {
        assert!(!is_editable(None));
        assert!(!is_editable(Some(&Node::element("textarea"))));
    }

    #[test]
    fn kinds_follow_the_tag() {
        let mut doc = Document::new();
        let textarea = attach(&mut doc, Node::element("textarea"));
        let div = attach(&mut doc, Node::element("div").with_attribute("role", "textbox"));
        assert_eq!(
            EditableSurface::resolve(&textarea).map(|s| s.kind()),
            Some(SurfaceKind::PlainField)
        );
        assert_eq!(
            EditableSurface::resolve(&div).map(|s| s.kind()),
            Some(SurfaceKind::ContentEditable)
        );
    }

    #[test]
    fn plain_field_replace_range_notifies_and_moves_caret() {
        let mut doc = Document::new();
        let node = attach(&mut doc, Node::element("textarea").with_value("hello world"));
        let surface = EditableSurface::resolve(&node).unwrap();

        let caret = surface.replace_range("mundo", TextRange { start: 6, end: 11 });
        assert_eq!(caret, Some(11));
        assert_eq!(surface.text(), "hello mundo");
        assert_eq!(surface.selection(), TextRange::caret(11));
        assert_eq!(
            node.take_dispatched_events(),
            [DomEvent::Input, DomEvent::Change]
        );
    }

    #[test]
    fn plain_field_set_text_notifies() {
        let mut doc = Document::new();
        let node = attach(&mut doc, Node::element("input").with_value("abc"));
        let surface = EditableSurface::resolve(&node).unwrap();
        surface.set_text("שלום");
        assert_eq!(node.value(), "שלום");
        assert_eq!(
            node.take_dispatched_events(),
            [DomEvent::Input, DomEvent::Change]
        );
    }

    #[test]
    fn content_editable_replace_range_inserts_at_caret() {
        let mut doc = Document::new();
        let node = attach(
            &mut doc,
            Node::element("div")
                .with_attribute("contenteditable", "true")
                .with_text("ac"),
        );
        let surface = EditableSurface::resolve(&node).unwrap();
        assert_eq!(surface.replace_range("b", TextRange::caret(1)), Some(2));
        assert_eq!(node.text_content(), "abc");
        assert!(node.take_dispatched_events().is_empty());
    }

    #[test]
    fn set_direction_aligns_plain_fields_only() {
        let mut doc = Document::new();
        let input = attach(&mut doc, Node::element("input"));
        let div = attach(&mut doc, Node::element("div").with_attribute("contenteditable", ""));

        EditableSurface::resolve(&input)
            .unwrap()
            .set_direction(Direction::Rtl);
        EditableSurface::resolve(&div)
            .unwrap()
            .set_direction(Direction::Rtl);

        assert_eq!(input.attribute("dir").as_deref(), Some("rtl"));
        assert_eq!(input.text_align(), Some("right"));
        assert_eq!(div.attribute("dir").as_deref(), Some("rtl"));
        assert_eq!(div.text_align(), None);
    }

    #[test]
    fn detached_surface_operations_are_silent_noops() {
        let mut doc = Document::new();
        let node = attach(&mut doc, Node::element("textarea").with_value("keep"));
        let surface = EditableSurface::resolve(&node).unwrap();
        doc.remove(&node);

        assert_eq!(surface.text(), "");
        assert_eq!(surface.selection(), TextRange::default());
        surface.set_text("changed");
        assert_eq!(surface.replace_range("x", TextRange::caret(0)), None);
        surface.set_direction(Direction::Rtl);

        assert_eq!(node.value(), "keep");
        assert!(node.attribute("dir").is_none());
        assert!(node.take_dispatched_events().is_empty());
    }

    #[test]
    fn replace_range_out_of_bounds_is_rejected() {
        let mut doc = Document::new();
        let node = attach(&mut doc, Node::element("input").with_value("ab"));
        let surface = EditableSurface::resolve(&node).unwrap();
        assert_eq!(surface.replace_range("x", TextRange { start: 0, end: 5 }), None);
        assert_eq!(node.value(), "ab");
    }
}
