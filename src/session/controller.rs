use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use layout_fixer_core::text::{CaretPlacement, DirectionVerdict, TextRange, utf16_len};

use super::{
    span::{ConversionSpan, PendingRequest},
    undo::UndoSlot,
};
use crate::{
    config::Config,
    domain::outcome::{ActionOutcome, RequestId, SkipReason},
    input::{KeyEvent, ShortcutAction, ShortcutBindings},
    notifier::{Notifier, T_SERVICE, UserNotice},
    service::{ServiceError, TransformKind},
    surface::{Document, EditableSurface, MutationRecord, Node, TextSurface, WeakNode, is_editable},
};

/// Per-surface view of the state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// At least one request for the surface is in flight.
    AwaitingResult,
}

#[derive(Clone, Debug)]
pub struct ControllerSettings {
    pub bindings: ShortcutBindings,
    pub undo_window: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bindings: ShortcutBindings::from_config(config),
            undo_window: config.undo_window(),
        }
    }
}

/// Work the host has to hand to the converter service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub id: RequestId,
    pub kind: TransformKind,
    pub text: String,
}

/// What the controller made of one key event.
#[derive(Clone, Debug, Default)]
pub struct KeyResponse {
    /// Bound action the event matched, if any.
    pub action: Option<ShortcutAction>,
    pub outcome: Option<ActionOutcome>,
    pub dispatch: Option<Dispatch>,
}

impl KeyResponse {
    fn outcome(action: ShortcutAction, outcome: ActionOutcome) -> Self {
        Self {
            action: Some(action),
            outcome: Some(outcome),
            dispatch: None,
        }
    }

    /// `true` only when the controller acted on the event.
    pub fn handled(&self) -> bool {
        self.outcome.as_ref().is_some_and(ActionOutcome::consumes_event)
    }
}

/// Owns the active surface, the bound surfaces, in-flight requests and the
/// undo slot for one document.
#[derive(Debug)]
pub struct ConversionController {
    settings: ControllerSettings,
    active: Option<WeakNode>,
    bound: Vec<WeakNode>,
    pending: BTreeMap<RequestId, PendingRequest>,
    next_request: u64,
    undo: Option<UndoSlot>,
    notifier: Notifier,
}

impl ConversionController {
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            settings,
            active: None,
            bound: Vec::new(),
            pending: BTreeMap::new(),
            next_request: 1,
            undo: None,
            notifier: Notifier::default(),
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Records `node` as the active surface if it is editable.
    pub fn on_focus(&mut self, node: &Node) {
        if is_editable(Some(node)) {
            tracing::trace!(?node, "active surface changed");
            self.active = Some(node.downgrade());
        }
    }

    pub fn active_surface(&self) -> Option<Node> {
        self.active.as_ref().and_then(WeakNode::attached)
    }

    /// Binds `node` and every editable descendant. Returns how many were newly bound.
    pub fn on_surface_discovered(&mut self, node: &Node) -> usize {
        let mut added = 0;
        for candidate in node.subtree() {
            if !is_editable(Some(&candidate)) || self.is_bound(&candidate) {
                continue;
            }
            self.bound.push(candidate.downgrade());
            added += 1;
        }
        if added > 0 {
            tracing::trace!(added, total = self.bound.len(), "surfaces bound");
        }
        added
    }

    /// Applies a batch of document mutations to the binding registry.
    pub fn on_mutations<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = MutationRecord>,
    {
        for record in records {
            match record {
                MutationRecord::Added(node) => {
                    self.on_surface_discovered(&node);
                }
                MutationRecord::AttributeChanged { target, name } => {
                    tracing::trace!(attribute = %name, "editability attribute changed");
                    if is_editable(Some(&target)) {
                        self.on_surface_discovered(&target);
                    } else {
                        self.bound.retain(|w| !w.points_to(&target));
                    }
                }
                MutationRecord::Removed(_) => {}
            }
        }
        self.prune();
    }

    fn prune(&mut self) {
        self.bound.retain(|w| w.attached().is_some());
        if self.active.as_ref().is_some_and(|w| w.attached().is_none()) {
            tracing::trace!("active surface detached");
            self.active = None;
        }
    }

    pub fn is_bound(&self, node: &Node) -> bool {
        self.bound.iter().any(|w| w.points_to(node))
    }

    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    pub fn state_of(&self, node: &Node) -> SessionState {
        if self.pending.values().any(|p| p.span.surface().points_to(node)) {
            SessionState::AwaitingResult
        } else {
            SessionState::Idle
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn undo_slot(&self) -> Option<&UndoSlot> {
        self.undo.as_ref()
    }

    pub fn drain_notice(&mut self) -> Option<UserNotice> {
        self.notifier.drain_one()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Routes a key event to the bound action, if any.
    ///
    /// Never suppresses the event itself; the caller does that when
    /// [`KeyResponse::handled`] is `true`.
    #[tracing::instrument(level = "trace", skip_all, fields(key = %event.key))]
    pub fn handle_key(&mut self, doc: &Document, event: &KeyEvent, now: Instant) -> KeyResponse {
        let Some(action) = self.settings.bindings.match_event(event) else {
            return KeyResponse::default();
        };

        match action {
            ShortcutAction::Transform(kind) => self.begin_transform(doc, event, kind, now),
            ShortcutAction::Undo => KeyResponse::outcome(action, self.undo(doc, now)),
        }
    }

    /// Event target, then the document's focused element, then the last
    /// focused surface; the first one that is editable wins.
    fn resolve_target(
        &self,
        doc: &Document,
        event: &KeyEvent,
    ) -> Result<EditableSurface, SkipReason> {
        let node = event
            .target
            .clone()
            .filter(|n| is_editable(Some(n)))
            .or_else(|| doc.focused().filter(|n| is_editable(Some(n))))
            .or_else(|| self.active_surface().filter(|n| is_editable(Some(n))))
            .ok_or(SkipReason::NotEditable)?;

        if !self.is_bound(&node) {
            return Err(SkipReason::NotBound);
        }

        EditableSurface::resolve(&node).ok_or(SkipReason::NotEditable)
    }

    fn begin_transform(
        &mut self,
        doc: &Document,
        event: &KeyEvent,
        kind: TransformKind,
        now: Instant,
    ) -> KeyResponse {
        let action = ShortcutAction::Transform(kind);

        let surface = match self.resolve_target(doc, event) {
            Ok(s) => s,
            Err(reason) => {
                tracing::trace!(
                    reason = reason.as_str(),
                    kind = kind.as_str(),
                    "transform skipped"
                );
                return KeyResponse::outcome(action, ActionOutcome::Skipped(reason));
            }
        };

        let Some((span, text)) = ConversionSpan::capture(&surface)
            .and_then(|span| span.text().map(|text| (span, text)))
        else {
            tracing::trace!(
                reason = SkipReason::EmptyInput.as_str(),
                kind = kind.as_str(),
                "transform skipped"
            );
            return KeyResponse::outcome(action, ActionOutcome::Skipped(SkipReason::EmptyInput));
        };

        let id = RequestId(self.next_request);
        self.next_request += 1;

        tracing::trace!(
            id = id.0,
            kind = kind.as_str(),
            surface = surface.kind().as_str(),
            origin = ?span.origin(),
            start = span.range().start,
            end = span.range().end,
            "request dispatched"
        );

        self.pending.insert(
            id,
            PendingRequest {
                kind,
                span,
                dispatched_at: now,
            },
        );

        KeyResponse {
            action: Some(action),
            outcome: Some(ActionOutcome::Dispatched(id)),
            dispatch: Some(Dispatch { id, kind, text }),
        }
    }

    /// Applies the converter service's answer for request `id`.
    ///
    /// Failures leave the surface untouched and queue a user notice. A result
    /// whose span no longer matches the surface is discarded silently.
    #[tracing::instrument(level = "trace", skip_all, fields(id = id.0))]
    pub fn complete(
        &mut self,
        id: RequestId,
        result: Result<String, ServiceError>,
        now: Instant,
    ) -> ActionOutcome {
        let Some(request) = self.pending.remove(&id) else {
            tracing::debug!("completion for unknown request dropped");
            return ActionOutcome::Skipped(SkipReason::UnknownRequest);
        };

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(
                    kind = request.kind.as_str(),
                    error = %e,
                    user_text = e.user_text(),
                    "converter request failed"
                );
                self.notifier.push(T_SERVICE, e.user_text(), &e);
                return ActionOutcome::Failed(e);
            }
        };

        let Some((surface, original)) = request.span.revalidate() else {
            tracing::debug!(
                reason = SkipReason::StaleSpan.as_str(),
                kind = request.kind.as_str(),
                "result discarded"
            );
            return ActionOutcome::Skipped(SkipReason::StaleSpan);
        };

        let range = request.span.range();
        let whole_field = range == TextRange { start: 0, end: utf16_len(&original) };

        if whole_field {
            apply_whole_field(&surface, &output);
        } else if surface.replace_range(&output, range).is_none() {
            tracing::debug!(reason = SkipReason::StaleSpan.as_str(), "range replacement rejected");
            return ActionOutcome::Skipped(SkipReason::StaleSpan);
        }

        tracing::trace!(
            kind = request.kind.as_str(),
            field = request.kind.response_field(),
            whole_field,
            latency = ?now.saturating_duration_since(request.dispatched_at),
            "result applied"
        );

        self.undo = Some(UndoSlot::capture(surface.downgrade(), original, now));
        ActionOutcome::Applied
    }

    fn undo(&mut self, doc: &Document, now: Instant) -> ActionOutcome {
        let Some(slot) = self.undo.as_ref() else {
            return skip_undo(SkipReason::UndoUnavailable);
        };

        if slot.is_expired(now, self.settings.undo_window) {
            self.undo = None;
            return skip_undo(SkipReason::UndoExpired);
        }

        let Some(surface) = doc
            .focused()
            .filter(|focused| slot.belongs_to(focused))
            .and_then(|focused| EditableSurface::resolve(&focused))
        else {
            return skip_undo(SkipReason::UndoSurfaceMismatch);
        };

        let Some(slot) = self.undo.take() else {
            return skip_undo(SkipReason::UndoUnavailable);
        };
        surface.set_text(slot.original_text());
        tracing::trace!("undo restored original text");
        ActionOutcome::Restored
    }

    /// Forgets every pending request, binding and the undo slot.
    pub fn teardown(&mut self) {
        tracing::trace!(pending = self.pending.len(), "session torn down");
        self.pending.clear();
        self.bound.clear();
        self.active = None;
        self.undo = None;
        self.notifier.clear();
    }
}

fn skip_undo(reason: SkipReason) -> ActionOutcome {
    tracing::trace!(reason = reason.as_str(), "undo passed through");
    ActionOutcome::Skipped(reason)
}

/// Writes `output` over the whole surface and applies the direction and caret policy.
fn apply_whole_field(surface: &EditableSurface, output: &str) {
    let verdict = DirectionVerdict::analyze(output);
    surface.set_text(output);
    surface.set_direction(verdict.direction());

    let caret = match verdict.caret() {
        CaretPlacement::End => utf16_len(output),
        CaretPlacement::Start => 0,
    };
    surface.set_selection(TextRange::caret(caret));

    tracing::trace!(
        direction = verdict.direction().as_str(),
        rtl_led = verdict.rtl_led,
        trailing_rtl = verdict.trailing_rtl,
        caret,
        "whole field replaced"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrimaryModifier;

    fn controller() -> ConversionController {
        let config = Config {
            primary_modifier: PrimaryModifier::Ctrl,
            ..Default::default()
        };
        ConversionController::new(ControllerSettings::from_config(&config))
    }

    fn mounted(doc: &mut Document, c: &mut ConversionController, node: Node) -> Node {
        let body = doc.body().clone();
        doc.append_child(&body, &node);
        c.on_mutations(doc.take_mutations());
        doc.focus(&node);
        c.on_focus(&node);
        node
    }

    fn convert_key(node: &Node) -> KeyEvent {
        KeyEvent::new("Z").ctrl().shift().on(node)
    }

    #[test]
    fn unmatched_keys_are_ignored() {
        let mut doc = Document::new();
        let mut c = controller();
        let node = mounted(&mut doc, &mut c, Node::element("input").with_value("abc"));
        let r = c.handle_key(&doc, &KeyEvent::new("a").on(&node), Instant::now());
        assert!(r.action.is_none());
        assert!(!r.handled());
    }

    #[test]
    fn focus_on_non_editable_keeps_previous_active_surface() {
        let mut doc = Document::new();
        let mut c = controller();
        let input = mounted(&mut doc, &mut c, Node::element("input"));
        let div = Node::element("div");
        c.on_focus(&div);
        assert_eq!(c.active_surface(), Some(input));
    }

    #[test]
    fn dispatch_moves_surface_to_awaiting_result() {
        let mut doc = Document::new();
        let mut c = controller();
        let node = mounted(&mut doc, &mut c, Node::element("input").with_value("akuo"));
        assert_eq!(c.state_of(&node), SessionState::Idle);

        let r = c.handle_key(&doc, &convert_key(&node), Instant::now());
        assert!(r.handled());
        let d = r.dispatch.unwrap();
        assert_eq!(d.kind, TransformKind::Convert);
        assert_eq!(d.text, "akuo");
        assert_eq!(c.state_of(&node), SessionState::AwaitingResult);

        assert_eq!(c.complete(d.id, Ok("שלום".into()), Instant::now()), ActionOutcome::Applied);
        assert_eq!(c.state_of(&node), SessionState::Idle);
    }

    #[test]
    fn failure_leaves_text_and_queues_notice() {
        let mut doc = Document::new();
        let mut c = controller();
        let node = mounted(&mut doc, &mut c, Node::element("textarea").with_value("abc"));
        let d = c
            .handle_key(&doc, &convert_key(&node), Instant::now())
            .dispatch
            .unwrap();

        let out = c.complete(d.id, Err(ServiceError::RateLimited), Instant::now());
        assert_eq!(out, ActionOutcome::Failed(ServiceError::RateLimited));
        assert_eq!(node.value(), "abc");
        assert!(node.take_dispatched_events().is_empty());
        assert!(c.undo_slot().is_none());
        assert_eq!(
            c.drain_notice().map(|n| n.user_text),
            Some("Too many requests, please try again later".to_string())
        );
    }

    #[test]
    fn unbound_surface_is_skipped() {
        let mut doc = Document::new();
        let mut c = controller();
        let node = Node::element("input").with_value("abc");
        let body = doc.body().clone();
        doc.append_child(&body, &node);
        // Mutations deliberately not delivered.
        let r = c.handle_key(&doc, &convert_key(&node), Instant::now());
        assert_eq!(r.outcome, Some(ActionOutcome::Skipped(SkipReason::NotBound)));
        assert!(!r.handled());
    }

    #[test]
    fn non_editable_target_without_focus_is_skipped() {
        let mut doc = Document::new();
        let mut c = controller();
        let div = Node::element("div").with_text("plain");
        let body = doc.body().clone();
        doc.append_child(&body, &div);
        c.on_mutations(doc.take_mutations());

        let r = c.handle_key(&doc, &convert_key(&div), Instant::now());
        assert_eq!(r.outcome, Some(ActionOutcome::Skipped(SkipReason::NotEditable)));
    }

    #[test]
    fn focused_element_is_used_when_target_is_not_editable() {
        let mut doc = Document::new();
        let mut c = controller();
        let input = mounted(&mut doc, &mut c, Node::element("input").with_value("abc"));
        let r = c.handle_key(&doc, &convert_key(doc.body()), Instant::now());
        assert!(r.handled());
        assert_eq!(c.state_of(&input), SessionState::AwaitingResult);
    }

    #[test]
    fn last_focused_surface_is_the_final_fallback() {
        let mut doc = Document::new();
        let mut c = controller();
        let input = mounted(&mut doc, &mut c, Node::element("input").with_value("abc"));
        doc.blur();

        let r = c.handle_key(&doc, &convert_key(doc.body()), Instant::now());
        assert!(r.handled());
        assert_eq!(r.dispatch.map(|d| d.text), Some("abc".to_string()));
        assert_eq!(c.state_of(&input), SessionState::AwaitingResult);
    }

    #[test]
    fn no_editable_candidate_is_not_editable() {
        let mut doc = Document::new();
        let mut c = controller();
        let input = mounted(&mut doc, &mut c, Node::element("input").with_value("abc"));
        doc.blur();
        doc.remove(&input);
        c.on_mutations(doc.take_mutations());

        let r = c.handle_key(&doc, &convert_key(doc.body()), Instant::now());
        assert_eq!(r.outcome, Some(ActionOutcome::Skipped(SkipReason::NotEditable)));
    }

    #[test]
    fn attribute_change_binds_and_unbinds() {
        let mut doc = Document::new();
        let mut c = controller();
        let div = Node::element("div");
        let body = doc.body().clone();
        doc.append_child(&body, &div);
        c.on_mutations(doc.take_mutations());
        assert!(!c.is_bound(&div));

        doc.set_attribute(&div, "contenteditable", "true");
        c.on_mutations(doc.take_mutations());
        assert!(c.is_bound(&div));

        doc.set_attribute(&div, "contenteditable", "false");
        c.on_mutations(doc.take_mutations());
        assert!(!c.is_bound(&div));
    }

    #[test]
    fn removal_prunes_bindings_and_active_surface() {
        let mut doc = Document::new();
        let mut c = controller();
        let node = mounted(&mut doc, &mut c, Node::element("textarea"));
        assert_eq!(c.bound_count(), 1);

        doc.remove(&node);
        c.on_mutations(doc.take_mutations());
        assert_eq!(c.bound_count(), 0);
        assert!(c.active_surface().is_none());
    }

    #[test]
    fn discovery_walks_the_subtree_once() {
        let mut doc = Document::new();
        let mut c = controller();
        let form = Node::element("form");
        let a = Node::element("input");
        let b = Node::element("div").with_attribute("role", "textbox");
        doc.append_child(&form, &a);
        doc.append_child(&form, &b);
        let body = doc.body().clone();
        doc.append_child(&body, &form);
        c.on_mutations(doc.take_mutations());
        assert_eq!(c.bound_count(), 2);
        assert_eq!(c.on_surface_discovered(&form), 0);
    }

    #[test]
    fn unknown_completion_is_dropped() {
        let mut c = controller();
        assert_eq!(
            c.complete(RequestId(42), Ok("x".into()), Instant::now()),
            ActionOutcome::Skipped(SkipReason::UnknownRequest)
        );
    }

    #[test]
    fn teardown_discards_in_flight_requests() {
        let mut doc = Document::new();
        let mut c = controller();
        let node = mounted(&mut doc, &mut c, Node::element("input").with_value("abc"));
        let d = c
            .handle_key(&doc, &convert_key(&node), Instant::now())
            .dispatch
            .unwrap();
        c.teardown();
        assert_eq!(
            c.complete(d.id, Ok("xyz".into()), Instant::now()),
            ActionOutcome::Skipped(SkipReason::UnknownRequest)
        );
        assert_eq!(node.value(), "abc");
        assert_eq!(c.bound_count(), 0);
    }

    #[test]
    fn whole_field_result_sets_direction_and_caret() {
        let mut doc = Document::new();
        let mut c = controller();
        let node = mounted(&mut doc, &mut c, Node::element("input").with_value("abc tcd"));
        let d = c
            .handle_key(&doc, &convert_key(&node), Instant::now())
            .dispatch
            .unwrap();
        c.complete(d.id, Ok("abc אבג".into()), Instant::now());

        assert_eq!(node.value(), "abc אבג");
        assert_eq!(node.attribute("dir").as_deref(), Some("rtl"));
        assert_eq!(node.text_align(), Some("right"));
        // Trailing RTL without an RTL-led prefix: caret goes to the start.
        assert_eq!(node.selection(), TextRange::caret(0));
    }

    #[test]
    fn range_result_leaves_direction_alone() {
        let mut doc = Document::new();
        let mut c = controller();
        let node = mounted(&mut doc, &mut c, Node::element("input").with_value("hello akuo"));
        node.set_selection(TextRange { start: 6, end: 10 });
        let d = c
            .handle_key(&doc, &convert_key(&node), Instant::now())
            .dispatch
            .unwrap();
        assert_eq!(d.text, "akuo");
        c.complete(d.id, Ok("שלום".into()), Instant::now());

        assert_eq!(node.value(), "hello שלום");
        assert_eq!(node.attribute("dir"), None);
        assert_eq!(node.selection(), TextRange::caret(10));
    }

    #[test]
    fn translate_and_rephrase_share_the_undo_slot() {
        let mut doc = Document::new();
        let mut c = controller();
        let node = mounted(&mut doc, &mut c, Node::element("textarea").with_value("one"));
        let t0 = Instant::now();

        let d = c
            .handle_key(&doc, &KeyEvent::new("x").ctrl().shift().on(&node), t0)
            .dispatch
            .unwrap();
        assert_eq!(d.kind, TransformKind::Translate);
        c.complete(d.id, Ok("uno".into()), t0);

        let d = c
            .handle_key(&doc, &KeyEvent::new("h").ctrl().shift().on(&node), t0)
            .dispatch
            .unwrap();
        assert_eq!(d.kind, TransformKind::Rephrase);
        c.complete(d.id, Ok("un".into()), t0);

        assert_eq!(c.undo_slot().map(UndoSlot::original_text), Some("uno"));
    }

    #[test]
    fn undo_requires_focus_on_the_transformed_surface() {
        let mut doc = Document::new();
        let mut c = controller();
        let a = mounted(&mut doc, &mut c, Node::element("input").with_value("abc"));
        let t0 = Instant::now();
        let d = c.handle_key(&doc, &convert_key(&a), t0).dispatch.unwrap();
        c.complete(d.id, Ok("xyz".into()), t0);

        let b = mounted(&mut doc, &mut c, Node::element("input").with_value("other"));
        let r = c.handle_key(&doc, &KeyEvent::new("z").ctrl().on(&b), t0);
        assert_eq!(r.outcome, Some(ActionOutcome::Skipped(SkipReason::UndoSurfaceMismatch)));
        assert!(!r.handled());
        assert!(c.undo_slot().is_some());

        doc.focus(&a);
        let r = c.handle_key(&doc, &KeyEvent::new("z").ctrl().on(&a), t0);
        assert!(r.handled());
        assert_eq!(a.value(), "abc");
    }
}
