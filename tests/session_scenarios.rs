//! End-to-end scan session scenarios
//!
//! These drive a session the way the scan screen does: start the camera, feed
//! decoded payloads, observe the result, retry with reset.

use eiar_scan::{
    CaptureDevice, CaptureError, RejectionReason, ScanSession, ScanView, ScriptedCapture,
    StateKind, Transition, ValidationVerdict, Validator,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Idle -> start -> Capturing -> "EIA-BLOCKA-042" -> Accepted
#[test]
fn test_scenario_accept() {
    let mut session = ScanSession::new();
    assert_eq!(session.kind(), StateKind::Idle);

    session.start_capture();
    assert_eq!(session.kind(), StateKind::Capturing);

    session.payload_decoded("EIA-BLOCKA-042");
    assert_eq!(session.kind(), StateKind::Accepted);
    assert_eq!(session.last_payload(), Some("EIA-BLOCKA-042"));
    assert_eq!(session.last_reason(), None);
}

/// Idle -> start -> Capturing -> "random-code" -> Rejected (not recognized)
#[test]
fn test_scenario_reject_unknown() {
    let mut session = ScanSession::new();
    session.start_capture();
    session.payload_decoded("random-code");

    assert_eq!(session.kind(), StateKind::Rejected);
    assert_eq!(session.last_reason(), Some(RejectionReason::NotRecognized));
    assert_eq!(
        session.last_reason().map(|r| r.to_string()),
        Some("code not recognized".to_string())
    );
}

/// Rejected -> reset -> Idle with everything cleared
#[test]
fn test_scenario_reset_after_reject() {
    let mut session = ScanSession::new();
    session.start_capture();
    session.payload_decoded("random-code");
    assert_eq!(session.kind(), StateKind::Rejected);

    session.reset();
    assert_eq!(session.kind(), StateKind::Idle);
    assert_eq!(session.last_payload(), None);
    assert_eq!(session.last_reason(), None);
    assert_eq!(session.view(), ScanView::Preview);
}

/// Capturing -> "" -> Rejected (empty or unreadable)
#[test]
fn test_scenario_empty_payload() {
    let mut session = ScanSession::new();
    session.start_capture();
    session.payload_decoded("");

    assert_eq!(session.kind(), StateKind::Rejected);
    assert_eq!(
        session.last_reason().map(|r| r.to_string()),
        Some("empty or unreadable code".to_string())
    );
}

/// Reset from every reachable state lands in Idle with nothing left over
#[test]
fn test_reset_from_every_state() {
    let setups: [fn(&mut ScanSession); 5] = [
        |_| {},
        |s| {
            s.start_capture();
        },
        |s| {
            s.start_capture();
            s.begin_validation("EIA-1");
        },
        |s| {
            s.start_capture();
            s.payload_decoded("EIA-1");
        },
        |s| {
            s.start_capture();
            s.payload_decoded("nope");
        },
    ];

    for setup in setups {
        let mut session = ScanSession::new();
        setup(&mut session);
        session.reset();
        assert_eq!(session.kind(), StateKind::Idle);
        assert_eq!(session.last_payload(), None);
        assert_eq!(session.last_reason(), None);

        // second reset is a no-op on observable state
        session.reset();
        assert_eq!(session.state(), &eiar_scan::ScanState::Idle);
    }
}

/// A second decode while the first is still being validated changes nothing
#[test]
fn test_no_double_validation() {
    let mut session = ScanSession::new();
    session.start_capture();
    let ticket = session.begin_validation("EIA-FIRST").unwrap();

    let dropped = session.payload_decoded("random-second");
    assert!(matches!(dropped, Transition::Ignored { .. }));
    assert_eq!(session.last_payload(), Some("EIA-FIRST"));

    session.complete_validation(ticket, Validator::new().validate(Some("EIA-FIRST")));
    assert_eq!(session.kind(), StateKind::Accepted);
    assert_eq!(session.last_payload(), Some("EIA-FIRST"));
    assert_eq!(session.last_reason(), None);
}

/// Rapid-fire duplicate callbacks after a verdict are idempotent
#[test]
fn test_duplicate_callbacks_after_verdict() {
    let mut session = ScanSession::new();
    session.start_capture();
    session.payload_decoded("random-code");
    let snapshot = session.state().clone();

    for _ in 0..5 {
        session.payload_decoded("EIA-late");
        session.decode_failed();
    }
    assert_eq!(session.state(), &snapshot);
}

/// Retry loop: reject, reset, scan again, accept
#[test]
fn test_retry_cycle() {
    let mut session = ScanSession::new();
    session.start_capture();
    session.payload_decoded("blurry");
    assert_eq!(session.view(), ScanView::Error);

    session.reset();
    session.start_capture();
    session.payload_decoded("EIA-LAB-7");
    assert_eq!(session.view(), ScanView::Success);
}

/// A slow validator that misses the deadline is rejected; its answer is dropped
#[test]
fn test_deferred_timeout_discards_late_verdict() {
    let mut session = ScanSession::with_validator(Validator::new(), Duration::from_millis(500));
    session.start_capture();
    let ticket = session.begin_validation("EIA-REMOTE").unwrap();

    session.poll_timeout(Instant::now() + Duration::from_secs(5));
    assert_eq!(session.last_reason(), Some(RejectionReason::Timeout));

    let late = session.complete_validation(ticket, ValidationVerdict::accept("EIA-REMOTE"));
    assert!(!late.is_moved());
    assert_eq!(session.kind(), StateKind::Rejected);
    assert_eq!(session.last_reason().map(|r| r.to_string()), Some("timeout".into()));
}

/// Observers follow the screen's visual branches and stop after unsubscribe
#[test]
fn test_observer_views() {
    let mut session = ScanSession::new();
    let views = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&views);
    let id = session.subscribe(move |event| sink.borrow_mut().push(ScanView::from(event.to)));

    session.start_capture();
    session.payload_decoded("EIA-1");
    session.reset();
    assert_eq!(
        *views.borrow(),
        vec![
            ScanView::Scanning,
            ScanView::Scanning,
            ScanView::Success,
            ScanView::Preview
        ]
    );

    session.unsubscribe(id);
    session.start_capture();
    assert_eq!(views.borrow().len(), 4);
}

/// Decode failures from the device are unreadable codes
#[test]
fn test_drive_with_decode_failure() {
    let mut device = ScriptedCapture::new(vec![Err(CaptureError::Decode("glare".into()))]);
    let mut session = ScanSession::new();

    assert_eq!(session.drive(&mut device).unwrap(), StateKind::Rejected);
    assert_eq!(
        session.last_reason(),
        Some(RejectionReason::EmptyOrUnreadable)
    );
    assert!(!device.is_running());
}

/// Driving a session that already has a verdict does not touch the device
#[test]
fn test_drive_requires_idle() {
    let mut session = ScanSession::new();
    session.start_capture();
    session.payload_decoded("EIA-1");

    let mut device = ScriptedCapture::from_payloads(["random"]);
    assert_eq!(session.drive(&mut device).unwrap(), StateKind::Accepted);
    assert_eq!(device.starts(), 0);
    assert_eq!(device.remaining(), 1);
}

/// Devices can be used through a trait object
#[test]
fn test_drive_dyn_device() {
    let mut scripted = ScriptedCapture::from_payloads(["EIA-DYN"]);
    let device: &mut dyn CaptureDevice = &mut scripted;
    let mut session = ScanSession::new();
    assert_eq!(session.drive(device).unwrap(), StateKind::Accepted);
}
