use criterion::{Criterion, black_box, criterion_group, criterion_main};
use eiar_scan::{ScanSession, ScriptedCapture};

fn bench_accept_reset_cycle(c: &mut Criterion) {
    let mut session = ScanSession::new();
    c.bench_function("session_accept_reset", |b| {
        b.iter(|| {
            session.start_capture();
            session.payload_decoded(black_box("EIA-BLOCKA-042"));
            session.reset()
        })
    });
}

fn bench_observed_cycle(c: &mut Criterion) {
    let mut session = ScanSession::new();
    let counter = std::rc::Rc::new(std::cell::Cell::new(0usize));
    let sink = std::rc::Rc::clone(&counter);
    session.subscribe(move |_| sink.set(sink.get() + 1));
    c.bench_function("session_observed_reject_reset", |b| {
        b.iter(|| {
            session.start_capture();
            session.payload_decoded(black_box("random-code"));
            session.reset()
        })
    });
    assert!(counter.get() > 0);
}

fn bench_drive_scripted(c: &mut Criterion) {
    c.bench_function("session_drive_scripted", |b| {
        b.iter(|| {
            let mut session = ScanSession::new();
            let mut device = ScriptedCapture::from_payloads(["", "blurry", "EIA-1"]);
            session.drive(black_box(&mut device))
        })
    });
}

criterion_group!(
    benches,
    bench_accept_reset_cycle,
    bench_observed_cycle,
    bench_drive_scripted
);
criterion_main!(benches);
