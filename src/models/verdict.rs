use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a payload was turned down.
///
/// The `Display` text is what the scan screen shows to the user verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Nothing was decoded, or the device reported a decode failure
    #[error("empty or unreadable code")]
    EmptyOrUnreadable,
    /// Decoded text does not carry the institution marker
    #[error("code not recognized")]
    NotRecognized,
    /// A deferred validation did not finish in time
    #[error("timeout")]
    Timeout,
}

impl RejectionReason {
    /// User-facing message for this reason
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::EmptyOrUnreadable => "empty or unreadable code",
            RejectionReason::NotRecognized => "code not recognized",
            RejectionReason::Timeout => "timeout",
        }
    }
}

/// Accept/reject result of validating one payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    accepted: bool,
    payload: String,
    reason: Option<RejectionReason>,
}

impl ValidationVerdict {
    /// Verdict accepting `payload`
    pub fn accept(payload: impl Into<String>) -> Self {
        Self {
            accepted: true,
            payload: payload.into(),
            reason: None,
        }
    }

    /// Verdict rejecting `payload` for `reason`
    pub fn reject(payload: impl Into<String>, reason: RejectionReason) -> Self {
        Self {
            accepted: false,
            payload: payload.into(),
            reason: Some(reason),
        }
    }

    /// Whether the payload was accepted
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// The payload that was evaluated
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Rejection reason, `None` when accepted
    pub fn reason(&self) -> Option<RejectionReason> {
        self.reason
    }
}
