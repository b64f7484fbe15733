use crate::service::ServiceError;

/// Identifier of one dispatched converter request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// Result of one controller step, as logged and returned to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A request left for the converter service.
    Dispatched(RequestId),
    /// A result was written to the surface.
    Applied,
    /// The undo slot was written back.
    Restored,
    Skipped(SkipReason),
    Failed(ServiceError),
}

impl ActionOutcome {
    /// Whether the key event that caused this outcome must be suppressed.
    pub fn consumes_event(&self) -> bool {
        matches!(self, ActionOutcome::Dispatched(_) | ActionOutcome::Restored)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotEditable,
    NotBound,
    EmptyInput,
    StaleSpan,
    UnknownRequest,
    UndoUnavailable,
    UndoExpired,
    UndoSurfaceMismatch,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NotEditable => "not_editable",
            SkipReason::NotBound => "not_bound",
            SkipReason::EmptyInput => "empty_input",
            SkipReason::StaleSpan => "stale_span",
            SkipReason::UnknownRequest => "unknown_request",
            SkipReason::UndoUnavailable => "undo_unavailable",
            SkipReason::UndoExpired => "undo_expired",
            SkipReason::UndoSurfaceMismatch => "undo_surface_mismatch",
        }
    }
}
