//! Controller state shared between the presentation thread (writer) and the
//! script thread (reader).
//!
//! The script sees a polled snapshot, exactly like the handheld's
//! `ctrlReadBufferPositive`: whatever the presentation thread last stored.
//! A press and release that both land between two polls are never seen.

use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;

bitflags! {
    /// Digital buttons, using the handheld's bit values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u32 {
        const SELECT = 0x00_0001;
        const START = 0x00_0008;
        const UP = 0x00_0010;
        const RIGHT = 0x00_0020;
        const DOWN = 0x00_0040;
        const LEFT = 0x00_0080;
        const LTRIGGER = 0x00_0100;
        const RTRIGGER = 0x00_0200;
        const TRIANGLE = 0x00_1000;
        const CIRCLE = 0x00_2000;
        const CROSS = 0x00_4000;
        const SQUARE = 0x00_8000;
        const HOME = 0x01_0000;
        const HOLD = 0x02_0000;
        const NOTE = 0x80_0000;
    }
}

impl Buttons {
    /// Look up a single button by its lowercase name as used in key
    /// configuration files (`"cross"`, `"l"`, `"ltrigger"`, ...).
    pub fn from_config_name(name: &str) -> Option<Buttons> {
        let button = match name.to_ascii_lowercase().as_str() {
            "select" => Buttons::SELECT,
            "start" => Buttons::START,
            "up" => Buttons::UP,
            "right" => Buttons::RIGHT,
            "down" => Buttons::DOWN,
            "left" => Buttons::LEFT,
            "l" | "ltrigger" => Buttons::LTRIGGER,
            "r" | "rtrigger" => Buttons::RTRIGGER,
            "triangle" => Buttons::TRIANGLE,
            "circle" => Buttons::CIRCLE,
            "cross" => Buttons::CROSS,
            "square" => Buttons::SQUARE,
            "home" => Buttons::HOME,
            "hold" => Buttons::HOLD,
            "note" => Buttons::NOTE,
            _ => return None,
        };
        Some(button)
    }
}

/// Analog stick value reported when no analog source exists.
pub const ANALOG_CENTER: u8 = 128;

/// One controller sample as returned to the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtrlData {
    pub buttons: Buttons,
    pub lx: u8,
    pub ly: u8,
}

impl CtrlData {
    pub fn pressed(&self, button: Buttons) -> bool {
        self.buttons.contains(button)
    }
}

/// Current controller state.
pub struct InputState {
    buttons: AtomicU32,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            buttons: AtomicU32::new(0),
        }
    }

    /// Key-down: set the given bits. Repeated presses are harmless.
    pub fn press(&self, buttons: Buttons) {
        self.buttons.fetch_or(buttons.bits(), Ordering::Release);
    }

    /// Key-up: clear the given bits. Releasing an unheld button is harmless.
    pub fn release(&self, buttons: Buttons) {
        self.buttons.fetch_and(!buttons.bits(), Ordering::Release);
    }

    /// Drop every held button (used when the window loses focus).
    pub fn release_all(&self) {
        self.buttons.store(0, Ordering::Release);
    }

    /// Non-blocking read of the most recent state.
    pub fn read(&self) -> CtrlData {
        CtrlData {
            buttons: Buttons::from_bits_truncate(self.buttons.load(Ordering::Acquire)),
            lx: ANALOG_CENTER,
            ly: ANALOG_CENTER,
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
