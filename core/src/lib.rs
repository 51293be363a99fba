pub mod audio;
pub mod console;
pub mod error;
pub mod input;
pub mod presentation;
pub mod script;
pub mod timing;
pub mod video;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::audio::{AudioMixer, SampleMixer, Sound, VoiceId};
    pub use crate::console::{Console, ConsoleConfig, Hardware};
    pub use crate::input::{ANALOG_CENTER, Buttons, CtrlData};
    pub use crate::presentation::{Display, EventSource, HostEvent, RenderLoop};
    pub use crate::script::{Script, ScriptThread};
    pub use crate::video::{Color, PixelBuffer, Rect, SCREEN_HEIGHT, SCREEN_WIDTH, Texture};
}
