//! Per-screen scan session state machine.
//!
//! ```text
//! Idle --start_capture--> Capturing --payload_decoded--> Validating --+--> Accepted
//!  ^                                                                  +--> Rejected
//!  +------------------------------- reset ----------------------------------+
//! ```
//!
//! Only one validation may be in flight. Payloads arriving while a session is
//! validating, or outside Capturing, are dropped rather than queued.

mod observers;

pub use observers::SubscriptionId;

use crate::capture::{CaptureDevice, CaptureError};
use crate::config::{ConfigError, ScanConfig};
use crate::models::{
    EventKind, RejectionReason, ScanState, ScanView, SessionEvent, StateKind, Transition,
    ValidationTicket, ValidationVerdict,
};
use crate::validator::Validator;
use observers::Observers;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// State machine for one scan-to-result cycle
pub struct ScanSession {
    state: ScanState,
    validator: Validator,
    timeout: Duration,
    next_ticket: u64,
    observers: Observers,
}

impl ScanSession {
    /// Session configured from the process-wide [`ScanConfig::global`]
    pub fn new() -> Self {
        let config = ScanConfig::global();
        match Validator::from_config(config) {
            Ok(validator) => Self::with_validator(validator, config.validation_timeout()),
            Err(_) => Self::with_validator(
                Validator::new(),
                ScanConfig::default().validation_timeout(),
            ),
        }
    }

    /// Session with an explicit validator and deferred-validation timeout
    pub fn with_validator(validator: Validator, timeout: Duration) -> Self {
        Self {
            state: ScanState::Idle,
            validator,
            timeout,
            next_ticket: 0,
            observers: Observers::default(),
        }
    }

    /// Session configured from `config`
    pub fn from_config(config: &ScanConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_validator(
            Validator::from_config(config)?,
            config.validation_timeout(),
        ))
    }

    /// Current state
    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Current state discriminant
    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    /// Payload being validated or last validated. Cleared by reset.
    pub fn last_payload(&self) -> Option<&str> {
        self.state.payload()
    }

    /// Reason of the last rejection; `Some` only while rejected
    pub fn last_reason(&self) -> Option<RejectionReason> {
        self.state.reason()
    }

    /// Visual branch for the current state
    pub fn view(&self) -> ScanView {
        ScanView::from(self.kind())
    }

    /// Validator used for synchronous validation
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Deferred-validation timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Capture device was activated
    pub fn start_capture(&mut self) -> Transition {
        match self.state {
            ScanState::Idle => self.move_to(ScanState::Capturing),
            _ => self.ignore(EventKind::StartCapture),
        }
    }

    /// Capture device decoded `payload`. Validates synchronously.
    pub fn payload_decoded(&mut self, payload: &str) -> Transition {
        let from = self.kind();
        let ticket = match self.try_begin(payload) {
            Ok(ticket) => ticket,
            Err(ignored) => return ignored,
        };
        let verdict = self.validator.validate(Some(payload));
        self.complete_validation(ticket, verdict);
        Transition::Moved {
            from,
            to: self.kind(),
        }
    }

    /// Capture device failed to decode; treated as an empty payload
    pub fn decode_failed(&mut self) -> Transition {
        self.payload_decoded("")
    }

    /// Enter Validating without resolving, for validators that answer later.
    /// Returns `None` if the session is not capturing.
    pub fn begin_validation(&mut self, payload: &str) -> Option<ValidationTicket> {
        self.try_begin(payload).ok()
    }

    /// Resolve the in-flight validation. Verdicts for any ticket other than
    /// the current one are discarded.
    pub fn complete_validation(
        &mut self,
        ticket: ValidationTicket,
        verdict: ValidationVerdict,
    ) -> Transition {
        let payload = match &self.state {
            ScanState::Validating {
                ticket: current,
                payload,
                ..
            } if *current == ticket => payload.clone(),
            _ => {
                warn!(
                    ticket = ticket.id(),
                    state = %self.kind(),
                    "discarding verdict for a validation that is no longer in flight"
                );
                return self.ignore(EventKind::VerdictReady);
            }
        };

        match verdict.reason() {
            None => {
                info!(payload = %payload, "scan accepted");
                self.move_to(ScanState::Accepted { payload })
            }
            Some(reason) => {
                debug!(payload = %payload, %reason, "scan rejected");
                self.move_to(ScanState::Rejected { payload, reason })
            }
        }
    }

    /// Force the in-flight validation identified by `ticket` to time out
    pub fn expire_validation(&mut self, ticket: ValidationTicket) -> Transition {
        let payload = match &self.state {
            ScanState::Validating {
                ticket: current,
                payload,
                ..
            } if *current == ticket => payload.clone(),
            _ => return self.ignore(EventKind::Timeout),
        };
        warn!(ticket = ticket.id(), payload = %payload, "validation timed out");
        self.move_to(ScanState::Rejected {
            payload,
            reason: RejectionReason::Timeout,
        })
    }

    /// Time out the in-flight validation if it started at least `timeout` before `now`
    pub fn poll_timeout(&mut self, now: Instant) -> Transition {
        let expired = match &self.state {
            ScanState::Validating {
                ticket, started, ..
            } if now.saturating_duration_since(*started) >= self.timeout => Some(*ticket),
            _ => None,
        };
        match expired {
            Some(ticket) => self.expire_validation(ticket),
            None => self.ignore(EventKind::Timeout),
        }
    }

    /// Return to Idle from any state, clearing payload and reason. Any
    /// in-flight ticket becomes stale.
    pub fn reset(&mut self) -> Transition {
        self.move_to(ScanState::Idle)
    }

    /// Register an observer called after every effective transition
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.observers.add(Box::new(callback))
    }

    /// Drop an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Run one capture activation against a device
    ///
    /// Starts capture (only from Idle), starts the device, and feeds each
    /// decoded item into the session until a verdict is reached or the device
    /// runs dry. Decode failures count as empty payloads. The device is
    /// stopped before returning.
    ///
    /// # Arguments
    /// * `device` - Capture device, possibly a trait object
    ///
    /// # Returns
    /// The resulting state: Accepted or Rejected on a verdict, Capturing if the
    /// device ran dry, or the unchanged state if the session was not Idle.
    /// If the device fails to start, the session is reset to Idle and the
    /// device error is returned.
    pub fn drive<D>(&mut self, device: &mut D) -> Result<StateKind, CaptureError>
    where
        D: CaptureDevice + ?Sized,
    {
        if !self.start_capture().is_moved() {
            return Ok(self.kind());
        }
        if let Err(err) = device.start() {
            // Leave the session retryable
            self.reset();
            return Err(err);
        }

        while !self.kind().is_terminal() {
            match device.next_decoded() {
                Some(Ok(payload)) => {
                    self.payload_decoded(&payload);
                }
                Some(Err(err)) => {
                    debug!(%err, "capture device reported a decode failure");
                    self.decode_failed();
                }
                None => break,
            }
        }

        device.stop();
        Ok(self.kind())
    }

    fn try_begin(&mut self, payload: &str) -> Result<ValidationTicket, Transition> {
        if !matches!(self.state, ScanState::Capturing) {
            return Err(self.ignore(EventKind::PayloadDecoded));
        }
        let ticket = ValidationTicket(self.next_ticket);
        self.next_ticket += 1;
        self.move_to(ScanState::Validating {
            payload: payload.to_string(),
            ticket,
            started: Instant::now(),
        });
        Ok(ticket)
    }

    fn move_to(&mut self, next: ScanState) -> Transition {
        let from = self.kind();
        self.state = next;
        let to = self.kind();
        debug!(%from, %to, "scan session transition");

        let event = SessionEvent {
            from,
            to,
            payload: self.state.payload().map(str::to_string),
            reason: self.state.reason(),
        };
        self.observers.notify(&event);
        Transition::Moved { from, to }
    }

    fn ignore(&self, event: EventKind) -> Transition {
        let state = self.kind();
        debug!(%event, %state, "scan session event ignored");
        Transition::Ignored { state, event }
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSession")
            .field("state", &self.state)
            .field("validator", &self.validator)
            .field("timeout", &self.timeout)
            .field("observers", &self.observers.len())
            .finish()
    }
}
