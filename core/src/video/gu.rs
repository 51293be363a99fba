//! Immediate-mode graphics emulator
//!
//! Software stand-in for the handheld's fixed-function GU, reduced to the
//! operations 2D sprite scripts actually use:
//!
//! | Operation       | Behaviour                                                  |
//! |-----------------|------------------------------------------------------------|
//! | `clear`         | fill every texel of the target, padding included           |
//! | `bind_texture`  | remember a texture handle and its declared size (no copy)  |
//! | `draw_sprite`   | nearest-sample blit, binary alpha key, clipped to target   |
//! | `blit_copy`     | unconditional rectangular copy between two buffers         |
//!
//! The alpha key is a test, not a blend: a sampled texel is written iff its
//! alpha byte is non-zero, and then written verbatim. Filtering is always
//! nearest. Assets authored for the handheld depend on both.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::pixel::{Color, PixelBuffer, Rect, alpha};

/// Shared handle to a pixel buffer used as a sprite source or render target.
/// Cloning shares the texels.
#[derive(Clone, Debug)]
pub struct Texture(Arc<RwLock<PixelBuffer>>);

impl Texture {
    pub fn new(pixels: PixelBuffer) -> Self {
        Self(Arc::new(RwLock::new(pixels)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, PixelBuffer> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, PixelBuffer> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// True when both handles refer to the same texels.
    pub fn same_as(&self, other: &Texture) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn width(&self) -> usize {
        self.read().width()
    }

    pub fn height(&self) -> usize {
        self.read().height()
    }
}

#[derive(Clone, Debug)]
struct Binding {
    texture: Texture,
    width: usize,
    height: usize,
}

pub struct GraphicsEmulator {
    clear_color: Color,
    binding: Option<Binding>,
}

impl GraphicsEmulator {
    pub fn new() -> Self {
        Self {
            clear_color: 0,
            binding: None,
        }
    }

    /// Latch the color used by [`clear_current`](Self::clear_current).
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Fill the whole target with `color`.
    pub fn clear(&self, target: &mut PixelBuffer, color: Color) {
        target.fill(color);
    }

    /// Fill the whole target with the latched clear color.
    pub fn clear_current(&self, target: &mut PixelBuffer) {
        target.fill(self.clear_color);
    }

    /// Record the sprite source for subsequent [`draw_sprite`](Self::draw_sprite)
    /// calls. `width`/`height` are the caller's declared dimensions; sampling
    /// is clamped to whichever of declared and actual size is smaller.
    pub fn bind_texture(&mut self, texture: Texture, width: usize, height: usize) {
        self.binding = Some(Binding {
            texture,
            width,
            height,
        });
    }

    /// Copy `src` texels of the bound texture onto `dst` of `target`,
    /// skipping texels whose alpha is zero.
    ///
    /// Each destination texel maps back to a source texel relative to the
    /// *unclipped* destination rectangle, so clipping never shifts which
    /// source texel lands where. When `src` and `dst` differ in size the
    /// mapping scales nearest-neighbour. Empty rectangles, no binding, or a
    /// destination entirely off-target all draw nothing.
    ///
    /// The target must not be the bound texture's own storage; the caller
    /// binds a copy for self-blits.
    pub fn draw_sprite(&self, target: &mut PixelBuffer, src: Rect, dst: Rect) {
        let Some(binding) = &self.binding else {
            return;
        };
        if src.is_empty() || dst.is_empty() {
            return;
        }
        let Some(clip) = dst.intersect(&target.bounds()) else {
            return;
        };

        let texels = binding.texture.read();
        let tex_w = binding.width.min(texels.width());
        let tex_h = binding.height.min(texels.height());
        if tex_w == 0 || tex_h == 0 {
            return;
        }

        for ty in clip.y..clip.y + clip.h {
            let sy = sample(src.y, src.h, dst.y, dst.h, ty, tex_h);
            let src_row = texels.row(sy);
            let dst_row = target.row_mut(ty as usize);
            for tx in clip.x..clip.x + clip.w {
                let sx = sample(src.x, src.w, dst.x, dst.w, tx, tex_w);
                let color = src_row[sx];
                if alpha(color) != 0 {
                    dst_row[tx as usize] = color;
                }
            }
        }
    }
}

impl Default for GraphicsEmulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest source coordinate for destination coordinate `d`, clamped into
/// `0..limit`.
fn sample(src_pos: i32, src_len: i32, dst_pos: i32, dst_len: i32, d: i32, limit: usize) -> usize {
    let offset = i64::from(d) - i64::from(dst_pos);
    let s = i64::from(src_pos) + offset * i64::from(src_len) / i64::from(dst_len);
    s.clamp(0, limit as i64 - 1) as usize
}

/// A copy region resolved against both buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CopyRegion {
    sx: usize,
    sy: usize,
    dx: usize,
    dy: usize,
    w: usize,
    h: usize,
}

/// Clip a 1:1 copy against the source and destination bounds. The copied
/// extent is the smaller of the two rectangles; mismatched sizes are not
/// scaled.
fn clip_copy(src_rect: Rect, src: &PixelBuffer, dst_rect: Rect, dst: (usize, usize)) -> Option<CopyRegion> {
    let mut w = i64::from(src_rect.w.min(dst_rect.w));
    let mut h = i64::from(src_rect.h.min(dst_rect.h));
    if w <= 0 || h <= 0 {
        return None;
    }
    let (mut sx, mut sy) = (i64::from(src_rect.x), i64::from(src_rect.y));
    let (mut dx, mut dy) = (i64::from(dst_rect.x), i64::from(dst_rect.y));

    let skip_x = (-sx).max(-dx).max(0);
    let skip_y = (-sy).max(-dy).max(0);
    sx += skip_x;
    dx += skip_x;
    w -= skip_x;
    sy += skip_y;
    dy += skip_y;
    h -= skip_y;

    w = w.min(src.width() as i64 - sx).min(dst.0 as i64 - dx);
    h = h.min(src.height() as i64 - sy).min(dst.1 as i64 - dy);
    if w <= 0 || h <= 0 {
        return None;
    }
    Some(CopyRegion {
        sx: sx as usize,
        sy: sy as usize,
        dx: dx as usize,
        dy: dy as usize,
        w: w as usize,
        h: h as usize,
    })
}

/// Copy a rectangle from `src` to `dst` row by row with no alpha test and
/// no scaling. Parts outside either buffer are clipped away.
pub fn blit_copy(src_rect: Rect, src: &PixelBuffer, dst_rect: Rect, dst: &mut PixelBuffer) {
    let Some(r) = clip_copy(src_rect, src, dst_rect, (dst.width(), dst.height())) else {
        return;
    };
    for row in 0..r.h {
        let from = &src.row(r.sy + row)[r.sx..r.sx + r.w];
        dst.row_mut(r.dy + row)[r.dx..r.dx + r.w].copy_from_slice(from);
    }
}

/// [`blit_copy`] with source and destination in the same buffer. Overlapping
/// regions copy as if through a temporary.
pub fn blit_within(buffer: &mut PixelBuffer, src_rect: Rect, dst_rect: Rect) {
    let Some(r) = clip_copy(src_rect, buffer, dst_rect, (buffer.width(), buffer.height())) else {
        return;
    };
    let stride = buffer.stride();
    let pixels = buffer.pixels_mut();
    let mut copy_row = |row: usize| {
        let from = (r.sy + row) * stride + r.sx;
        let to = (r.dy + row) * stride + r.dx;
        pixels.copy_within(from..from + r.w, to);
    };
    if r.dy > r.sy {
        (0..r.h).rev().for_each(&mut copy_row);
    } else {
        (0..r.h).for_each(&mut copy_row);
    }
}
