use anyhow::{Context, Result, anyhow};
use luaplayer_core::presentation::Display;
use luaplayer_core::video::{PixelBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};

const WIDTH: u32 = SCREEN_WIDTH as u32;
const HEIGHT: u32 = SCREEN_HEIGHT as u32;

pub struct Video {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
}

impl Video {
    /// Create a window `scale` times the console resolution. The renderer
    /// keeps a 480x272 logical size, so resizing letterboxes instead of
    /// stretching, and presents on host vsync.
    pub fn new(sdl_video: &sdl2::VideoSubsystem, title: &str, scale: u32) -> Result<Self> {
        let window = sdl_video
            .window(title, WIDTH * scale, HEIGHT * scale)
            .position_centered()
            .resizable()
            .build()
            .context("failed to create window")?;

        let mut canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .context("failed to create renderer")?;
        canvas
            .set_logical_size(WIDTH, HEIGHT)
            .context("failed to set logical size")?;

        let texture_creator = canvas.texture_creator();

        Ok(Self {
            canvas,
            texture_creator,
        })
    }
}

impl Display for Video {
    /// Upload an ABGR framebuffer and draw it to the back buffer.
    fn upload(&mut self, frame: &PixelBuffer) -> Result<()> {
        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::ABGR8888, WIDTH, HEIGHT)
            .context("failed to create texture")?;

        texture
            .update(None, bytemuck::cast_slice(frame.pixels()), frame.stride() * 4)
            .context("failed to update texture")?;

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .map_err(|e| anyhow!("failed to copy texture: {e}"))?;
        Ok(())
    }

    fn present(&mut self) {
        self.canvas.present();
    }
}
