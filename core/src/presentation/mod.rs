//! The render loop coordinator.
//!
//! Runs on the thread that owns the host window. Each iteration drains
//! host events, ticks the audio mixer, copies the render buffer out under
//! its lock, and uploads the copy. The lock is released before the upload
//! so a slow display never stalls the script's next flip.

pub mod overlay;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::audio::AudioMixer;
use crate::console::Console;
use crate::input::Buttons;
use crate::script::ScriptThread;
use crate::video::PixelBuffer;

use self::overlay::FpsCounter;

/// Input the host delivers to the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Window closed or the exit key pressed.
    Quit,
    ButtonDown(Buttons),
    ButtonUp(Buttons),
    /// Focus lost: release everything so no button sticks.
    FocusLost,
}

/// Source of host events (the window system).
pub trait EventSource {
    /// Append every pending event to `events`.
    fn poll_events(&mut self, events: &mut Vec<HostEvent>);
}

/// The host display surface.
pub trait Display {
    /// Upload one frame of ABGR texels.
    fn upload(&mut self, frame: &PixelBuffer) -> Result<()>;
    /// Show the last uploaded frame.
    fn present(&mut self);
}

pub struct RenderLoop {
    console: Arc<Console>,
    staging: PixelBuffer,
    events: Vec<HostEvent>,
    fps: Option<FpsCounter>,
    presented: u64,
}

impl RenderLoop {
    pub fn new(console: Arc<Console>) -> Self {
        Self {
            console,
            staging: PixelBuffer::screen(),
            events: Vec::new(),
            fps: None,
            presented: 0,
        }
    }

    /// Draw a frames-per-second counter over the presented image. The
    /// overlay touches only the presentation copy, never the script's
    /// buffers.
    pub fn with_fps_overlay(mut self, enabled: bool) -> Self {
        self.fps = enabled.then(FpsCounter::new);
        self
    }

    /// Frames uploaded so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// One iteration. Returns `Ok(false)` once the running flag is clear, in
    /// which case nothing was uploaded.
    pub fn tick(
        &mut self,
        display: &mut dyn Display,
        events: &mut dyn EventSource,
        mixer: &dyn AudioMixer,
    ) -> Result<bool> {
        self.pump_events(events);
        if !self.console.is_running() {
            return Ok(false);
        }

        mixer.tick();

        {
            let snapshot = self.console.render_buffer().snapshot();
            self.staging.copy_from(&snapshot);
        }

        if let Some(fps) = &mut self.fps {
            fps.frame();
            overlay::draw_text(&mut self.staging, fps.text());
        }

        display.upload(&self.staging)?;
        display.present();
        self.presented += 1;
        Ok(true)
    }

    /// Present until the running flag clears, then join the script thread.
    /// The display must outlive this call, which guarantees the script is
    /// gone before the caller tears the display down.
    pub fn run(
        mut self,
        display: &mut dyn Display,
        events: &mut dyn EventSource,
        mixer: &dyn AudioMixer,
        script: ScriptThread,
    ) -> Result<()> {
        info!(script = script.name(), "presentation loop started");
        let started = Instant::now();

        let outcome = loop {
            match self.tick(display, events, mixer) {
                Ok(true) => {}
                Ok(false) => break Ok(()),
                Err(err) => {
                    warn!("display upload failed, shutting down: {err:#}");
                    self.console.request_shutdown();
                    break Err(err);
                }
            }
        };

        debug!("waiting for script thread");
        script.join();
        info!(
            frames = self.presented,
            seconds = started.elapsed().as_secs_f32(),
            "presentation loop stopped"
        );
        outcome
    }

    fn pump_events(&mut self, source: &mut dyn EventSource) {
        self.events.clear();
        source.poll_events(&mut self.events);
        let input = self.console.input();
        for event in self.events.drain(..) {
            match event {
                HostEvent::Quit => self.console.request_shutdown(),
                HostEvent::ButtonDown(buttons) => input.press(buttons),
                HostEvent::ButtonUp(buttons) => input.release(buttons),
                HostEvent::FocusLost => input.release_all(),
            }
        }
    }
}
