//! Helpers shared by the command-line tool, tests and benches.

use crate::models::{RejectionReason, Transition, ValidationVerdict};
use crate::session::ScanSession;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// One line of a session script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", content = "payload", rename_all = "snake_case")]
pub enum ScriptStep {
    /// `start`
    Start,
    /// `decode <payload>`; the payload is the rest of the line
    Decode(String),
    /// `fail`: device could not decode
    Fail,
    /// `reset`
    Reset,
}

/// Malformed script line
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: unknown step {text:?}")]
pub struct ScriptError {
    /// 1-based line number
    pub line: usize,
    /// Offending text
    pub text: String,
}

/// Parse a newline-separated script. Blank lines and `#` comments are skipped.
pub fn parse_script(source: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim_start();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (line.trim_end(), ""),
        };
        let step = match word {
            "start" => ScriptStep::Start,
            "decode" => ScriptStep::Decode(rest.trim_end_matches('\r').to_string()),
            "fail" => ScriptStep::Fail,
            "reset" => ScriptStep::Reset,
            _ => {
                return Err(ScriptError {
                    line: idx + 1,
                    text: line.trim_end().to_string(),
                });
            }
        };
        steps.push(step);
    }
    Ok(steps)
}

/// Feed `steps` into `session`, returning each step's transition
pub fn run_script(session: &mut ScanSession, steps: &[ScriptStep]) -> Vec<Transition> {
    steps
        .iter()
        .map(|step| match step {
            ScriptStep::Start => session.start_capture(),
            ScriptStep::Decode(payload) => session.payload_decoded(payload),
            ScriptStep::Fail => session.decode_failed(),
            ScriptStep::Reset => session.reset(),
        })
        .collect()
}

/// Read one payload per line. Empty lines are kept as empty payloads.
pub fn read_payload_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>, std::io::Error> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect())
}

/// Verdict counts for a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Payloads validated
    pub total: usize,
    /// Accepted payloads
    pub accepted: usize,
    /// Rejected as empty or unreadable
    pub empty_or_unreadable: usize,
    /// Rejected as not recognized
    pub not_recognized: usize,
}

impl BatchSummary {
    /// Count verdicts by outcome
    pub fn from_verdicts(verdicts: &[ValidationVerdict]) -> Self {
        let mut summary = Self {
            total: verdicts.len(),
            ..Self::default()
        };
        for verdict in verdicts {
            match verdict.reason() {
                None => summary.accepted += 1,
                Some(RejectionReason::EmptyOrUnreadable) => summary.empty_or_unreadable += 1,
                Some(RejectionReason::NotRecognized) => summary.not_recognized += 1,
                // Synchronous validation never times out
                Some(RejectionReason::Timeout) => {}
            }
        }
        summary
    }

    /// Accepted share in [0, 1]
    pub fn acceptance_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.accepted as f64 / self.total as f64
        }
    }
}
