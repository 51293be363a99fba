//! Packed colors, rectangles and the strided pixel buffer every draw call
//! reads from or writes into.

use std::fmt;

use crate::error::Error;

/// A packed 32-bit texel in the handheld's native ABGR order:
/// red in bits 0-7, green 8-15, blue 16-23, alpha 24-31.
pub type Color = u32;

/// Visible screen width in texels.
pub const SCREEN_WIDTH: usize = 480;
/// Visible screen height in texels.
pub const SCREEN_HEIGHT: usize = 272;
/// Texels per framebuffer line (the hardware pads each row to 512).
pub const LINE_SIZE: usize = 512;

/// Pack 8-bit channels into a [`Color`].
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
    ((a as u32) << 24) | ((b as u32) << 16) | ((g as u32) << 8) | (r as u32)
}

/// Split a [`Color`] into `(r, g, b, a)`.
pub const fn unpack(color: Color) -> (u8, u8, u8, u8) {
    (
        color as u8,
        (color >> 8) as u8,
        (color >> 16) as u8,
        (color >> 24) as u8,
    )
}

/// Alpha channel of a packed color.
pub const fn alpha(color: Color) -> u8 {
    (color >> 24) as u8
}

/// Integer rectangle in texel coordinates. Zero or negative extents are
/// legal values and mean "empty".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Overlap of two rectangles, or `None` when they do not intersect.
    /// Computed in 64-bit so huge extents cannot overflow.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let x0 = i64::from(self.x).max(i64::from(other.x));
        let y0 = i64::from(self.y).max(i64::from(other.y));
        let x1 = (i64::from(self.x) + i64::from(self.w)).min(i64::from(other.x) + i64::from(other.w));
        let y1 = (i64::from(self.y) + i64::from(self.h)).min(i64::from(other.y) + i64::from(other.h));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        // The intersection lies inside `self`, so every value fits in i32.
        Some(Rect::new(
            x0 as i32,
            y0 as i32,
            (x1 - x0) as i32,
            (y1 - y0) as i32,
        ))
    }
}

/// A width x height grid of [`Color`]s stored row-major with `stride`
/// texels per row (`stride >= width`). Padding texels past `width` are
/// part of the storage and are touched only by whole-buffer operations.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    stride: usize,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Zero-filled buffer with no row padding.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_stride(width, height, width)
    }

    /// Zero-filled buffer with rows padded to `stride` texels.
    /// A stride smaller than `width` is raised to `width`.
    pub fn with_stride(width: usize, height: usize, stride: usize) -> Self {
        let stride = stride.max(width);
        Self {
            width,
            height,
            stride,
            pixels: vec![0; stride * height],
        }
    }

    /// A 480x272 buffer with the hardware's 512-texel line size.
    pub fn screen() -> Self {
        Self::with_stride(SCREEN_WIDTH, SCREEN_HEIGHT, LINE_SIZE)
    }

    /// Wrap tightly packed texels (stride == width).
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self, Error> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(Error::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            stride: width,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The visible area as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, clamp_i32(self.width), clamp_i32(self.height))
    }

    /// Raw storage including row padding.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Visible texels of row `y`. Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[Color] {
        let start = y * self.stride;
        &self.pixels[start..start + self.width]
    }

    /// Mutable visible texels of row `y`. Panics if `y >= height`.
    pub fn row_mut(&mut self, y: usize) -> &mut [Color] {
        let start = y * self.stride;
        &mut self.pixels[start..start + self.width]
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        let (x, y) = self.index(x, y)?;
        Some(self.pixels[y * self.stride + x])
    }

    /// Write one texel. Returns false (and writes nothing) when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, color: Color) -> bool {
        match self.index(x, y) {
            Some((x, y)) => {
                self.pixels[y * self.stride + x] = color;
                true
            }
            None => false,
        }
    }

    /// Fill the whole storage, padding included.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Overwrite this buffer with `other`. Buffers of identical geometry
    /// copy the raw storage in one pass; otherwise the overlapping visible
    /// area is copied row by row.
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        if self.stride == other.stride && self.height == other.height && self.width == other.width {
            self.pixels.copy_from_slice(&other.pixels);
            return;
        }
        let w = self.width.min(other.width);
        for y in 0..self.height.min(other.height) {
            self.row_mut(y)[..w].copy_from_slice(&other.row(y)[..w]);
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish_non_exhaustive()
    }
}

fn clamp_i32(v: usize) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
