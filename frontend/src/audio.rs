use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use luaplayer_core::audio::AudioRing;
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};
use tracing::{info, warn};

/// Device buffer size in samples.
const BUFFER_SAMPLES: u16 = 512;

/// Length of the start and stop ramps in samples.
const RAMP_SAMPLES: i32 = 256;

/// Linear gain ramp. Rises to unity while the device runs and falls back
/// to silence once released, so opening and closing never click.
#[derive(Debug, Default)]
struct Envelope {
    level: i32,
}

impl Envelope {
    fn apply(&mut self, raw: i16, released: bool) -> i16 {
        if released {
            self.level = (self.level - 1).max(0);
        } else if self.level < RAMP_SAMPLES {
            self.level += 1;
        }
        (i32::from(raw) * self.level / RAMP_SAMPLES) as i16
    }
}

/// Audio callback draining the mixer ring.
pub(crate) struct RingDrain {
    ring: AudioRing,
    envelope: Envelope,
    released: Arc<AtomicBool>,
}

impl AudioCallback for RingDrain {
    type Channel = i16;

    fn callback(&mut self, out: &mut [i16]) {
        let released = self.released.load(Ordering::Relaxed);
        let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        for sample in out.iter_mut() {
            let raw = ring.pop_front().unwrap_or(0);
            *sample = self.envelope.apply(raw, released);
        }
    }
}

/// An open mono 16-bit playback device.
pub struct AudioOut {
    device: AudioDevice<RingDrain>,
    released: Arc<AtomicBool>,
}

impl AudioOut {
    /// Open playback draining `ring`, asking for `requested_rate`.
    ///
    /// The device starts paused. The host may grant a different rate; build
    /// the mixer with [`AudioOut::sample_rate`].
    pub fn open(sdl_audio: &sdl2::AudioSubsystem, requested_rate: u32, ring: AudioRing) -> Result<Self> {
        let released = Arc::new(AtomicBool::new(false));
        let desired = AudioSpecDesired {
            freq: Some(requested_rate as i32),
            channels: Some(1),
            samples: Some(BUFFER_SAMPLES),
        };
        let device = sdl_audio
            .open_playback(None, &desired, |_| RingDrain {
                ring,
                envelope: Envelope::default(),
                released: Arc::clone(&released),
            })
            .map_err(|e| anyhow!("failed to open audio device: {e}"))?;

        let obtained = device.spec().freq;
        if obtained != requested_rate as i32 {
            warn!(requested = requested_rate, obtained, "audio device rate differs, mixing at the obtained rate");
        }
        info!(rate = obtained, channels = device.spec().channels, "audio device opened");
        Ok(Self { device, released })
    }

    /// Rate the device actually plays at.
    pub fn sample_rate(&self) -> u32 {
        self.device.spec().freq.max(1) as u32
    }

    pub fn resume(&self) {
        self.device.resume();
    }

    /// Ramp to silence, then pause the device.
    pub fn close(self) {
        self.released.store(true, Ordering::Relaxed);
        let tail = (RAMP_SAMPLES as u64 + u64::from(BUFFER_SAMPLES)) * 1000 / u64::from(self.sample_rate());
        thread::sleep(Duration::from_millis(tail));
        self.device.pause();
    }
}
