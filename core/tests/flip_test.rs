use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use luaplayer_core::console::{Console, ConsoleConfig};

/// Every snapshot the presentation side takes must be one whole frame,
/// never a mix of two.
#[test]
fn test_snapshots_never_tear() {
    let console = Console::new(ConsoleConfig::default());
    let mut hw = console.hardware().unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let writer_done = Arc::clone(&done);
    let writer = thread::spawn(move || {
        for frame in 0..200u32 {
            hw.clear(0xFF00_0000 | frame);
            hw.swap_buffers();
        }
        writer_done.store(true, Ordering::Release);
    });

    let mut seen = 0;
    while !done.load(Ordering::Acquire) {
        let snap = console.render_buffer().snapshot();
        let first = snap.pixels()[0];
        assert!(snap.pixels().iter().all(|&c| c == first), "torn frame");
        seen += 1;
    }
    writer.join().unwrap();

    assert!(seen > 0);
    assert_eq!(console.render_buffer().frame_count(), 200);
    assert_eq!(console.render_buffer().snapshot().get(0, 0), Some(0xFF00_00C7));
}

#[test]
fn test_frame_counter_tracks_flips() {
    let console = Console::new(ConsoleConfig::default());
    let mut hw = console.hardware().unwrap();
    for _ in 0..5 {
        hw.swap_buffers();
    }
    assert_eq!(console.render_buffer().snapshot().frame(), 5);
}
