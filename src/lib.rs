//! EIAR scan core
//!
//! QR payload validation and the scan-session state machine behind the EIAR
//! campus orientation app's scan screen, plus the student registration rules.
//! Camera, authentication and document storage are external and reached
//! through traits.
//!
//! ```
//! use eiar_scan::{ScanSession, StateKind};
//!
//! let mut session = ScanSession::new();
//! session.start_capture();
//! session.payload_decoded("EIA-BLOCKA-042");
//! assert_eq!(session.kind(), StateKind::Accepted);
//! ```

#![warn(missing_docs)]

/// Capture device trait and a scripted implementation
pub mod capture;
/// Environment-driven configuration
pub mod config;
/// Core data structures (states, transitions, verdicts)
pub mod models;
/// Student registration rules and orchestration
pub mod registration;
/// Scan session state machine
pub mod session;
/// CLI and bench helpers (scripts, batch summaries)
pub mod tools;
/// Payload validation policy
pub mod validator;

pub use capture::{CaptureDevice, CaptureError, ScriptedCapture};
pub use config::{ConfigError, ScanConfig};
pub use models::{
    EventKind, RejectionReason, ScanState, ScanView, SessionEvent, StateKind, Transition,
    ValidationTicket, ValidationVerdict,
};
pub use session::{ScanSession, SubscriptionId};
pub use validator::{Validator, validate};
