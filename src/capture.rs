//! Capture device seam.
//!
//! The camera and barcode decoder live outside this crate. A device only has
//! to start, stop, and hand over decoded strings one at a time.

use std::collections::VecDeque;
use thiserror::Error;

/// Failures reported by a capture device
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// The device could not be started (no camera, permission denied)
    #[error("capture device unavailable: {0}")]
    Unavailable(String),
    /// A frame was seen but no text could be decoded from it
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Source of decoded barcode payloads
pub trait CaptureDevice {
    /// Begin active scanning
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop scanning. Must be safe to call when not running.
    fn stop(&mut self);

    /// Next decoded payload, or `None` when the device has nothing more to give
    fn next_decoded(&mut self) -> Option<Result<String, CaptureError>>;
}

/// In-memory device replaying a fixed sequence of decode results
#[derive(Debug, Clone, Default)]
pub struct ScriptedCapture {
    queue: VecDeque<Result<String, CaptureError>>,
    start_error: Option<CaptureError>,
    running: bool,
    starts: usize,
}

impl ScriptedCapture {
    /// Device yielding `items` in order
    pub fn new(items: Vec<Result<String, CaptureError>>) -> Self {
        Self {
            queue: items.into(),
            ..Self::default()
        }
    }

    /// Device yielding successfully decoded `payloads` in order
    pub fn from_payloads<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(payloads.into_iter().map(|p| Ok(p.into())).collect())
    }

    /// Device whose `start` always fails
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            start_error: Some(CaptureError::Unavailable(message.into())),
            ..Self::default()
        }
    }

    /// Queue another decoded payload
    pub fn push_payload(&mut self, payload: impl Into<String>) {
        self.queue.push_back(Ok(payload.into()));
    }

    /// Queue a decode failure
    pub fn push_failure(&mut self, message: impl Into<String>) {
        self.queue.push_back(Err(CaptureError::Decode(message.into())));
    }

    /// Items not yet handed out
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Whether the device is between `start` and `stop`
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// How many times `start` succeeded
    pub fn starts(&self) -> usize {
        self.starts
    }
}

impl CaptureDevice for ScriptedCapture {
    fn start(&mut self) -> Result<(), CaptureError> {
        if let Some(err) = &self.start_error {
            return Err(err.clone());
        }
        self.running = true;
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn next_decoded(&mut self) -> Option<Result<String, CaptureError>> {
        if !self.running {
            return None;
        }
        self.queue.pop_front()
    }
}
