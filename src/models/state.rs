use super::RejectionReason;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Identifies one in-flight validation of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValidationTicket(pub(crate) u64);

impl ValidationTicket {
    /// Raw sequence number
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Scan session state. Exactly one variant is active; payload and reason
/// only exist on the variants that own them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Screen opened, camera not running
    #[default]
    Idle,
    /// Camera running, waiting for a decoded payload
    Capturing,
    /// A payload is being validated
    Validating {
        /// Payload under validation
        payload: String,
        /// Ticket a late verdict must present
        ticket: ValidationTicket,
        /// When validation began
        started: Instant,
    },
    /// Last payload accepted
    Accepted {
        /// Accepted payload
        payload: String,
    },
    /// Last payload rejected
    Rejected {
        /// Rejected payload
        payload: String,
        /// Why it was rejected
        reason: RejectionReason,
    },
}

impl ScanState {
    /// Discriminant without data
    pub fn kind(&self) -> StateKind {
        match self {
            ScanState::Idle => StateKind::Idle,
            ScanState::Capturing => StateKind::Capturing,
            ScanState::Validating { .. } => StateKind::Validating,
            ScanState::Accepted { .. } => StateKind::Accepted,
            ScanState::Rejected { .. } => StateKind::Rejected,
        }
    }

    /// Payload attached to the current state, if any
    pub fn payload(&self) -> Option<&str> {
        match self {
            ScanState::Validating { payload, .. }
            | ScanState::Accepted { payload }
            | ScanState::Rejected { payload, .. } => Some(payload),
            ScanState::Idle | ScanState::Capturing => None,
        }
    }

    /// Rejection reason; only present when rejected
    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            ScanState::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Data-free state discriminant, used in transitions and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// See [`ScanState::Idle`]
    Idle,
    /// See [`ScanState::Capturing`]
    Capturing,
    /// See [`ScanState::Validating`]
    Validating,
    /// See [`ScanState::Accepted`]
    Accepted,
    /// See [`ScanState::Rejected`]
    Rejected,
}

impl StateKind {
    /// Accepted or Rejected
    pub fn is_terminal(&self) -> bool {
        matches!(self, StateKind::Accepted | StateKind::Rejected)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::Idle => "idle",
            StateKind::Capturing => "capturing",
            StateKind::Validating => "validating",
            StateKind::Accepted => "accepted",
            StateKind::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Input that drives a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Capture device activated
    StartCapture,
    /// Capture device produced a payload (or failed to decode one)
    PayloadDecoded,
    /// A deferred verdict arrived
    VerdictReady,
    /// A deferred validation ran out of time
    Timeout,
    /// User asked to scan again
    Reset,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::StartCapture => "start_capture",
            EventKind::PayloadDecoded => "payload_decoded",
            EventKind::VerdictReady => "verdict_ready",
            EventKind::Timeout => "timeout",
            EventKind::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// Outcome of feeding one event to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Transition {
    /// The event changed the state
    Moved {
        /// State before the event
        from: StateKind,
        /// State after the event
        to: StateKind,
    },
    /// The event was dropped; state unchanged
    Ignored {
        /// State the event was dropped in
        state: StateKind,
        /// The dropped event
        event: EventKind,
    },
}

impl Transition {
    /// Whether the event had an effect
    pub fn is_moved(&self) -> bool {
        matches!(self, Transition::Moved { .. })
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Moved { from, to } => write!(f, "{} -> {}", from, to),
            Transition::Ignored { state, event } => write!(f, "{} ignored in {}", event, state),
        }
    }
}

/// Visual branch the scan screen renders for a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanView {
    /// Tap-to-scan placeholder
    Preview,
    /// Live camera
    Scanning,
    /// Success panel
    Success,
    /// Failure panel with retry
    Error,
}

impl From<StateKind> for ScanView {
    fn from(kind: StateKind) -> Self {
        match kind {
            StateKind::Idle => ScanView::Preview,
            // The camera stays on screen while a payload is checked
            StateKind::Capturing | StateKind::Validating => ScanView::Scanning,
            StateKind::Accepted => ScanView::Success,
            StateKind::Rejected => ScanView::Error,
        }
    }
}

/// Snapshot pushed to observers after every effective transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    /// State before
    pub from: StateKind,
    /// State after
    pub to: StateKind,
    /// Payload of the new state
    pub payload: Option<String>,
    /// Reason of the new state
    pub reason: Option<RejectionReason>,
}
