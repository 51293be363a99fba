use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use luaplayer_core::audio::AudioMixer;
use luaplayer_core::console::{Console, ConsoleConfig};
use luaplayer_core::presentation::RenderLoop;
use luaplayer_core::script::{Script, ScriptThread};
use tracing::info;

use crate::audio::AudioOut;
use crate::events::SdlEvents;
use crate::input::KeyMap;
use crate::video::Video;

/// Settings resolved from the config file and command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub title: String,
    pub scale: u32,
    pub refresh_rate: u32,
    pub show_fps: bool,
    pub audio: bool,
    pub sample_rate: u32,
}

/// Open the window and audio, run `script` on its own thread, and present
/// until it finishes or the user closes the window.
///
/// Every host resource is created before the script thread starts, so an
/// initialization failure never leaves a thread behind. The window and
/// audio device are dropped only after the script thread has been joined.
pub fn run(options: &Options, script: Box<dyn Script>, keys: KeyMap) -> Result<()> {
    let sdl_context = sdl2::init().map_err(|e| anyhow!("failed to initialize SDL2: {e}"))?;
    let sdl_video = sdl_context
        .video()
        .map_err(|e| anyhow!("failed to init SDL video: {e}"))?;

    // The device decides the real rate, so it opens before the console.
    let ring = luaplayer_core::audio::new_ring();
    let audio_out = if options.audio {
        let sdl_audio = sdl_context
            .audio()
            .map_err(|e| anyhow!("failed to init SDL audio: {e}"))?;
        Some(AudioOut::open(&sdl_audio, options.sample_rate, Arc::clone(&ring))?)
    } else {
        info!("audio disabled");
        None
    };
    let sample_rate = audio_out
        .as_ref()
        .map_or(options.sample_rate, AudioOut::sample_rate);

    let console = Console::with_audio_ring(
        ConsoleConfig {
            refresh_rate: options.refresh_rate,
            sample_rate,
        },
        ring,
    );

    let mut video = Video::new(&sdl_video, &options.title, options.scale)?;
    let pump = sdl_context
        .event_pump()
        .map_err(|e| anyhow!("failed to get event pump: {e}"))?;
    let mut events = SdlEvents::new(pump, keys);

    let hardware = console.hardware()?;
    let mixer = Arc::clone(console.mixer());
    if let Some(out) = &audio_out {
        mixer.start();
        out.resume();
    }

    let script = ScriptThread::spawn(script, hardware).context("failed to spawn script thread")?;
    let result = RenderLoop::new(Arc::clone(&console))
        .with_fps_overlay(options.show_fps)
        .run(&mut video, &mut events, mixer.as_ref(), script);

    if let Some(out) = audio_out {
        out.close();
    }
    result
}
