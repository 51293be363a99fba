//! Vblank pacing for the script thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Refresh rate of the emulated display.
pub const DEFAULT_REFRESH_RATE: u32 = 60;

/// Longest uninterrupted sleep in [`delay`]; bounds shutdown latency.
const DELAY_SLICE: Duration = Duration::from_millis(10);

/// Implements "wait for the next vblank" against a fixed frame period.
///
/// The first wait only records a baseline. Later waits sleep until one
/// period after the previous deadline, so the cadence holds regardless of
/// how long the caller spent drawing. A caller that overruns a whole period
/// gets a fresh baseline instead of a burst of zero-length waits.
#[derive(Debug)]
pub struct VsyncPacer {
    period: Duration,
    last: Option<Instant>,
}

impl VsyncPacer {
    pub fn new(refresh_rate: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / refresh_rate.max(1),
            last: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Block until the next frame deadline.
    ///
    /// This is the script's shutdown polling point: it returns
    /// [`Error::Shutdown`] when `running` is cleared, both before and after
    /// sleeping.
    pub fn wait(&mut self, running: &AtomicBool) -> Result<()> {
        if !running.load(Ordering::Acquire) {
            return Err(Error::Shutdown);
        }

        let now = Instant::now();
        let Some(last) = self.last else {
            self.last = Some(now);
            return Ok(());
        };

        let deadline = last + self.period;
        if now < deadline {
            thread::sleep(deadline - now);
            self.last = Some(deadline);
        } else {
            self.last = Some(now);
        }

        if !running.load(Ordering::Acquire) {
            return Err(Error::Shutdown);
        }
        Ok(())
    }
}

impl Default for VsyncPacer {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_RATE)
    }
}

/// Sleep for `duration` in short slices, returning early with
/// [`Error::Shutdown`] once `running` is cleared.
pub fn delay(duration: Duration, running: &AtomicBool) -> Result<()> {
    let end = Instant::now() + duration;
    loop {
        if !running.load(Ordering::Acquire) {
            return Err(Error::Shutdown);
        }
        let now = Instant::now();
        if now >= end {
            return Ok(());
        }
        thread::sleep((end - now).min(DELAY_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_wait_returns_immediately() {
        let running = AtomicBool::new(true);
        let mut pacer = VsyncPacer::new(10);
        let start = Instant::now();
        pacer.wait(&running).unwrap();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn waits_hold_the_cadence() {
        let running = AtomicBool::new(true);
        let mut pacer = VsyncPacer::new(100);
        let start = Instant::now();
        for _ in 0..6 {
            pacer.wait(&running).unwrap();
        }
        // N waits take at least (N - 1) periods.
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn cadence_absorbs_draw_time() {
        let running = AtomicBool::new(true);
        let mut pacer = VsyncPacer::new(50);
        pacer.wait(&running).unwrap();
        let start = Instant::now();
        for _ in 0..4 {
            thread::sleep(Duration::from_millis(8));
            pacer.wait(&running).unwrap();
        }
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(80));
        // Draw time is hidden inside the period instead of adding to it.
        assert!(elapsed < Duration::from_millis(80 + 4 * 8), "took {elapsed:?}");
    }

    #[test]
    fn overrun_resets_baseline() {
        let running = AtomicBool::new(true);
        let mut pacer = VsyncPacer::new(100);
        pacer.wait(&running).unwrap();
        thread::sleep(Duration::from_millis(35));
        let start = Instant::now();
        pacer.wait(&running).unwrap();
        assert!(start.elapsed() < Duration::from_millis(5));
    }

    #[test]
    fn wait_reports_shutdown() {
        let running = AtomicBool::new(false);
        let mut pacer = VsyncPacer::default();
        assert!(matches!(pacer.wait(&running), Err(Error::Shutdown)));
    }

    #[test]
    fn period_from_rate() {
        assert_eq!(VsyncPacer::new(50).period(), Duration::from_millis(20));
        assert_eq!(VsyncPacer::new(0).period(), Duration::from_secs(1));
    }

    #[test]
    fn delay_stops_on_shutdown() {
        let running = AtomicBool::new(false);
        let start = Instant::now();
        assert!(matches!(delay(Duration::from_secs(5), &running), Err(Error::Shutdown)));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn delay_sleeps_full_duration() {
        let running = AtomicBool::new(true);
        let start = Instant::now();
        delay(Duration::from_millis(25), &running).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(25));
    }
}
