pub mod framebuffer;
pub mod gu;
pub mod pixel;

pub use framebuffer::{FrameBuffers, RenderBuffer, RenderSnapshot};
pub use gu::{GraphicsEmulator, Texture, blit_copy, blit_within};
pub use pixel::{Color, LINE_SIZE, PixelBuffer, Rect, SCREEN_HEIGHT, SCREEN_WIDTH, rgba, unpack};
