use std::collections::{BTreeMap, HashMap};

use luaplayer_core::input::Buttons;
use sdl2::keyboard::Scancode;
use tracing::warn;

/// Maps SDL scancodes to console buttons.
pub struct KeyMap {
    map: HashMap<Scancode, Buttons>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind a scancode to a button.
    pub fn bind(&mut self, scancode: Scancode, button: Buttons) {
        self.map.insert(scancode, button);
    }

    /// Move `button` to `scancode`, dropping its previous bindings.
    pub fn rebind(&mut self, scancode: Scancode, button: Buttons) {
        self.map.retain(|_, b| *b != button);
        self.bind(scancode, button);
    }

    /// Look up the button for a scancode.
    pub fn get(&self, scancode: Scancode) -> Option<Buttons> {
        self.map.get(&scancode).copied()
    }

    /// Apply `[keys]` overrides from the config file. Unknown button or key
    /// names are skipped with a warning.
    pub fn apply_overrides(&mut self, keys: &BTreeMap<String, String>) {
        for (name, key) in keys {
            let Some(button) = Buttons::from_config_name(name) else {
                warn!("config: unknown button {name:?}, ignored");
                continue;
            };
            let Some(scancode) = Scancode::from_name(key) else {
                warn!("config: unknown key {key:?} for {name}, ignored");
                continue;
            };
            self.rebind(scancode, button);
        }
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        default_key_map()
    }
}

/// The desktop player's keyboard layout.
pub fn default_key_map() -> KeyMap {
    let mut km = KeyMap::new();

    km.bind(Scancode::Up, Buttons::UP);
    km.bind(Scancode::Down, Buttons::DOWN);
    km.bind(Scancode::Left, Buttons::LEFT);
    km.bind(Scancode::Right, Buttons::RIGHT);

    km.bind(Scancode::A, Buttons::SELECT);
    km.bind(Scancode::S, Buttons::START);
    km.bind(Scancode::Q, Buttons::LTRIGGER);
    km.bind(Scancode::W, Buttons::RTRIGGER);
    km.bind(Scancode::R, Buttons::TRIANGLE);
    km.bind(Scancode::F, Buttons::CIRCLE);
    km.bind(Scancode::C, Buttons::CROSS);
    km.bind(Scancode::D, Buttons::SQUARE);
    km.bind(Scancode::Space, Buttons::HOME);

    km
}
