use std::time::{Duration, Instant};

use crate::video::{Color, PixelBuffer};

const GLYPH_W: usize = 3;
const GLYPH_H: usize = 5;
const ADVANCE: usize = GLYPH_W + 1;
const ORIGIN: (usize, usize) = (2, 2);
const INK: Color = 0xFFFF_FFFF;

/// 3x5 glyph bitmap, rows packed top to bottom, three bits per row with the
/// leftmost column in the high bit. Characters without a glyph draw nothing.
fn glyph(ch: u8) -> u16 {
    match ch {
        b'0' => 0b111_101_101_101_111,
        b'1' => 0b010_110_010_010_111,
        b'2' => 0b111_001_111_100_111,
        b'3' => 0b111_001_011_001_111,
        b'4' => 0b101_101_111_001_001,
        b'5' => 0b111_100_111_001_111,
        b'6' => 0b111_100_111_101_111,
        b'7' => 0b111_001_010_010_010,
        b'8' => 0b111_101_111_101_111,
        b'9' => 0b111_101_111_001_111,
        b'.' => 0b000_000_000_000_010,
        _ => 0,
    }
}

fn lit(bits: u16, col: usize, row: usize) -> bool {
    let shift = (GLYPH_H - 1 - row) * GLYPH_W + (GLYPH_W - 1 - col);
    bits >> shift & 1 != 0
}

/// Draw a short string (digits and '.') in white at the top-left corner.
/// Texels that fall outside the buffer are skipped.
pub fn draw_text(buffer: &mut PixelBuffer, text: &str) {
    let (x0, y0) = ORIGIN;
    for (i, ch) in text.bytes().enumerate() {
        let bits = glyph(ch);
        let left = x0 + i * ADVANCE;
        for row in 0..GLYPH_H {
            for col in (0..GLYPH_W).filter(|&col| lit(bits, col, row)) {
                buffer.set((left + col) as i32, (y0 + row) as i32, INK);
            }
        }
    }
}

/// Counts presented frames and produces a once-per-second rate string.
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    text: String,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            text: String::new(),
        }
    }

    /// Record one presented frame.
    pub fn frame(&mut self) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let fps = f64::from(self.frames) / elapsed.as_secs_f64();
            self.text = format!("{fps:.1}");
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
