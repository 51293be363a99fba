//! Sample-voice mixer.
//!
//! The presentation thread calls [`AudioMixer::tick`] once per iteration; the
//! mixer tops up a shared ring of mono `i16` samples that the host audio
//! callback drains. Scripts start and stop voices from their own thread.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

/// Periodic audio collaborator driven by the presentation loop.
pub trait AudioMixer: Send + Sync {
    /// Begin producing samples.
    fn start(&self);
    /// Stop all playback and drop anything buffered.
    fn stop(&self);
    /// Advance the mixer clock by one presentation tick.
    fn tick(&self);
}

/// A mixer that never produces sound.
#[derive(Debug, Default)]
pub struct NullMixer;

impl AudioMixer for NullMixer {
    fn start(&self) {}
    fn stop(&self) {}
    fn tick(&self) {}
}

/// Shared ring of mixed samples. The mixer pushes, the host callback pops.
pub type AudioRing = Arc<Mutex<VecDeque<i16>>>;

/// Default host sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Frames of audio kept buffered ahead of the callback.
const BUFFERED_FRAMES: usize = 3;

/// Full-scale master volume.
pub const MAX_MASTER_VOLUME: u8 = 128;

/// Highest per-voice playback frequency, in Hz.
pub const MAX_VOICE_FREQUENCY: u32 = 100_000;

/// An empty ring for [`SampleMixer::with_ring`].
pub fn new_ring() -> AudioRing {
    Arc::new(Mutex::new(VecDeque::with_capacity(4096)))
}

#[derive(Debug, Error)]
pub enum SoundError {
    #[error("failed to read WAV data: {0}")]
    Wav(#[from] hound::Error),

    #[error("WAV file has no samples")]
    Empty,
}

/// A decoded mono sample, shared between every voice playing it.
#[derive(Debug, Clone)]
pub struct Sound {
    samples: Arc<[i16]>,
    sample_rate: u32,
}

impl Sound {
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate: sample_rate.max(1),
        }
    }

    /// Decode a WAV file. Multi-channel files are folded down to mono and
    /// every sample format is converted to 16-bit.
    pub fn load_wav(path: impl AsRef<Path>) -> Result<Self, SoundError> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let interleaved: Vec<i32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let shift = i32::from(spec.bits_per_sample) - 16;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| if shift >= 0 { v >> shift } else { v << -shift }))
                    .collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i32))
                .collect::<Result<_, _>>()?,
        };
        if interleaved.is_empty() {
            return Err(SoundError::Empty);
        }

        let mono = interleaved
            .chunks(channels)
            .map(|frame| (frame.iter().sum::<i32>() / frame.len() as i32) as i16)
            .collect();
        Ok(Self::from_samples(mono, spec.sample_rate))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Handle to one playing instance of a [`Sound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(u64);

struct Voice {
    id: VoiceId,
    sound: Sound,
    /// Source position in 32.32 fixed point.
    pos: u64,
    step: u64,
    volume: u8,
    looping: bool,
}

impl Voice {
    /// Next sample scaled by volume, or `None` once a one-shot voice ends.
    fn next(&mut self) -> Option<i32> {
        let len = self.sound.samples.len() as u64;
        let mut index = self.pos >> 32;
        if index >= len {
            if !self.looping || len == 0 {
                return None;
            }
            self.pos %= len << 32;
            index = self.pos >> 32;
        }
        self.pos += self.step;
        let sample = i32::from(self.sound.samples[index as usize]);
        Some(sample * i32::from(self.volume) / 255)
    }
}

struct MixerState {
    voices: Vec<Voice>,
    next_id: u64,
    master_volume: u8,
    active: bool,
}

/// Mixes any number of [`Sound`] voices into an [`AudioRing`].
pub struct SampleMixer {
    sample_rate: u32,
    samples_per_tick: usize,
    ring: AudioRing,
    state: Mutex<MixerState>,
}

impl SampleMixer {
    pub fn new(sample_rate: u32, refresh_rate: u32) -> Self {
        Self::with_ring(sample_rate, refresh_rate, new_ring())
    }

    /// A mixer feeding an existing ring, typically one the host audio
    /// device was opened with before the output rate was known.
    pub fn with_ring(sample_rate: u32, refresh_rate: u32, ring: AudioRing) -> Self {
        let sample_rate = sample_rate.max(1);
        Self {
            sample_rate,
            samples_per_tick: (sample_rate / refresh_rate.max(1)).max(1) as usize,
            ring,
            state: Mutex::new(MixerState {
                voices: Vec::new(),
                next_id: 1,
                master_volume: MAX_MASTER_VOLUME,
                active: false,
            }),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The ring the host audio callback should drain.
    pub fn ring(&self) -> AudioRing {
        Arc::clone(&self.ring)
    }

    /// Start a voice at full volume.
    pub fn play(&self, sound: &Sound, looping: bool) -> VoiceId {
        let mut state = self.lock();
        let id = VoiceId(state.next_id);
        state.next_id += 1;
        state.voices.push(Voice {
            id,
            sound: sound.clone(),
            pos: 0,
            step: self.step_for(sound.sample_rate),
            volume: 255,
            looping,
        });
        id
    }

    pub fn stop_voice(&self, id: VoiceId) {
        self.lock().voices.retain(|v| v.id != id);
    }

    pub fn stop_all(&self) {
        self.lock().voices.clear();
    }

    pub fn is_playing(&self, id: VoiceId) -> bool {
        self.lock().voices.iter().any(|v| v.id == id)
    }

    pub fn set_volume(&self, id: VoiceId, volume: u8) {
        if let Some(voice) = self.lock().voices.iter_mut().find(|v| v.id == id) {
            voice.volume = volume;
        }
    }

    /// Play voice `id` back at `hz` (clamped to [`MAX_VOICE_FREQUENCY`]),
    /// changing its pitch and speed.
    pub fn set_frequency(&self, id: VoiceId, hz: u32) {
        let step = self.step_for(hz.min(MAX_VOICE_FREQUENCY));
        if let Some(voice) = self.lock().voices.iter_mut().find(|v| v.id == id) {
            voice.step = step;
        }
    }

    /// Scale every voice by `volume / 128`; values above 128 are clamped.
    pub fn set_master_volume(&self, volume: u8) {
        self.lock().master_volume = volume.min(MAX_MASTER_VOLUME);
    }

    pub fn master_volume(&self) -> u8 {
        self.lock().master_volume
    }

    pub fn voice_count(&self) -> usize {
        self.lock().voices.len()
    }

    /// Mix `out.len()` samples, retiring voices that finish.
    pub fn mix(&self, out: &mut [i16]) {
        let mut state = self.lock();
        let mut acc = vec![0i32; out.len()];
        state.voices.retain_mut(|voice| {
            for slot in acc.iter_mut() {
                match voice.next() {
                    Some(s) => *slot += s,
                    None => return false,
                }
            }
            true
        });
        let master = i64::from(state.master_volume);
        for (dst, src) in out.iter_mut().zip(acc) {
            let scaled = i64::from(src) * master / i64::from(MAX_MASTER_VOLUME);
            *dst = scaled.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16;
        }
    }

    /// 32.32 source advance per output sample for a voice playing at `hz`.
    fn step_for(&self, hz: u32) -> u64 {
        (u64::from(hz) << 32) / u64::from(self.sample_rate)
    }

    fn lock(&self) -> MutexGuard<'_, MixerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_ring(&self) -> MutexGuard<'_, VecDeque<i16>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AudioMixer for SampleMixer {
    fn start(&self) {
        self.lock().active = true;
    }

    fn stop(&self) {
        {
            let mut state = self.lock();
            state.active = false;
            state.voices.clear();
        }
        self.lock_ring().clear();
    }

    fn tick(&self) {
        if !self.lock().active {
            // No output device: voices still run their course so one-shots
            // retire and `is_playing` tracks wall time.
            let mut discard = vec![0i16; self.samples_per_tick];
            self.mix(&mut discard);
            return;
        }
        let target = self.samples_per_tick * BUFFERED_FRAMES;
        let missing = target.saturating_sub(self.lock_ring().len());
        if missing == 0 {
            return;
        }
        let mut block = vec![0i16; missing];
        self.mix(&mut block);
        self.lock_ring().extend(block);
    }
}
