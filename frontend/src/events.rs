use luaplayer_core::presentation::{EventSource, HostEvent};
use sdl2::EventPump;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Scancode;

use crate::input::KeyMap;

/// Translates SDL events into console input.
pub struct SdlEvents {
    pump: EventPump,
    keys: KeyMap,
}

impl SdlEvents {
    pub fn new(pump: EventPump, keys: KeyMap) -> Self {
        Self { pump, keys }
    }
}

impl EventSource for SdlEvents {
    fn poll_events(&mut self, events: &mut Vec<HostEvent>) {
        for event in self.pump.poll_iter() {
            let translated = match event {
                Event::Quit { .. } => Some(HostEvent::Quit),

                Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => Some(HostEvent::Quit),

                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => self.keys.get(sc).map(HostEvent::ButtonDown),

                Event::KeyUp {
                    scancode: Some(sc), ..
                } => self.keys.get(sc).map(HostEvent::ButtonUp),

                Event::Window {
                    win_event: WindowEvent::FocusLost,
                    ..
                } => Some(HostEvent::FocusLost),

                _ => None,
            };
            events.extend(translated);
        }
    }
}
