//! The console context: every piece of state shared between the
//! presentation thread and the script thread, created once at startup.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::audio::{self, AudioRing, DEFAULT_SAMPLE_RATE, SampleMixer};
use crate::error::{Error, Result};
use crate::input::{CtrlData, InputState};
use crate::timing::{self, DEFAULT_REFRESH_RATE, VsyncPacer};
use crate::video::{Color, FrameBuffers, GraphicsEmulator, PixelBuffer, Rect, RenderBuffer, Texture};

/// Startup parameters for a [`Console`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Vblank rate the script is paced to, in Hz.
    pub refresh_rate: u32,
    /// Host audio sample rate.
    pub sample_rate: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            refresh_rate: DEFAULT_REFRESH_RATE,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Cross-thread state. Shared as `Arc<Console>`.
pub struct Console {
    config: ConsoleConfig,
    render: Arc<RenderBuffer>,
    input: InputState,
    mixer: Arc<SampleMixer>,
    running: AtomicBool,
    hardware_claimed: AtomicBool,
}

impl Console {
    pub fn new(config: ConsoleConfig) -> Arc<Self> {
        Self::with_audio_ring(config, audio::new_ring())
    }

    /// A console whose mixer feeds `ring`. The host opens its audio device
    /// on the ring first and then builds the console at the rate it got.
    pub fn with_audio_ring(config: ConsoleConfig, ring: AudioRing) -> Arc<Self> {
        Arc::new(Self {
            config,
            render: Arc::new(RenderBuffer::new()),
            input: InputState::new(),
            mixer: Arc::new(SampleMixer::with_ring(
                config.sample_rate,
                config.refresh_rate,
                ring,
            )),
            running: AtomicBool::new(true),
            hardware_claimed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear the running flag. Both threads wind down at their next check.
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn render_buffer(&self) -> &RenderBuffer {
        &self.render
    }

    pub fn mixer(&self) -> &Arc<SampleMixer> {
        &self.mixer
    }

    /// Claim the script-side [`Hardware`]. Only one exists per console, so
    /// the script thread stays the sole writer of the draw buffers.
    pub fn hardware(self: &Arc<Self>) -> Result<Hardware> {
        if self.hardware_claimed.swap(true, Ordering::AcqRel) {
            return Err(Error::HardwareClaimed);
        }
        Ok(Hardware {
            frames: FrameBuffers::new(Arc::clone(&self.render)),
            gu: GraphicsEmulator::new(),
            pacer: VsyncPacer::new(self.config.refresh_rate),
            console: Arc::clone(self),
        })
    }
}

/// Everything the script thread touches: the draw buffers, the graphics
/// emulator, the vblank pacer and a handle back to the shared console.
pub struct Hardware {
    console: Arc<Console>,
    frames: FrameBuffers,
    gu: GraphicsEmulator,
    pacer: VsyncPacer,
}

impl Hardware {
    pub fn console(&self) -> &Arc<Console> {
        &self.console
    }

    pub fn frames(&self) -> &FrameBuffers {
        &self.frames
    }

    pub fn draw_buffer(&mut self) -> &mut PixelBuffer {
        self.frames.draw_buffer()
    }

    pub fn gu(&self) -> &GraphicsEmulator {
        &self.gu
    }

    pub fn gu_mut(&mut self) -> &mut GraphicsEmulator {
        &mut self.gu
    }

    pub fn clear(&mut self, color: Color) {
        self.gu.clear(self.frames.draw_buffer(), color);
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.gu.set_clear_color(color);
    }

    pub fn clear_current(&mut self) {
        self.gu.clear_current(self.frames.draw_buffer());
    }

    pub fn bind_texture(&mut self, texture: Texture, width: usize, height: usize) {
        self.gu.bind_texture(texture, width, height);
    }

    /// Alpha-keyed sprite from the bound texture onto the back buffer.
    pub fn draw_sprite(&mut self, src: Rect, dst: Rect) {
        self.gu.draw_sprite(self.frames.draw_buffer(), src, dst);
    }

    /// Publish the back buffer and swap.
    pub fn swap_buffers(&mut self) {
        self.frames.flip();
    }

    /// Block until the next vblank, or fail with [`Error::Shutdown`].
    pub fn wait_vblank(&mut self) -> Result<()> {
        self.pacer.wait(&self.console.running)
    }

    /// Sleep without blocking shutdown.
    pub fn delay(&self, duration: Duration) -> Result<()> {
        timing::delay(duration, &self.console.running)
    }

    pub fn read_controls(&self) -> CtrlData {
        self.console.input.read()
    }
}
