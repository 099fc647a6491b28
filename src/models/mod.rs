/// Session states, events and transitions
pub mod state;
/// Validation verdicts and rejection reasons
pub mod verdict;

pub use state::{
    EventKind, ScanState, ScanView, SessionEvent, StateKind, Transition, ValidationTicket,
};
pub use verdict::{RejectionReason, ValidationVerdict};
