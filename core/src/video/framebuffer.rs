//! Double-buffered drawing plus the locked render buffer the presentation
//! thread reads from.
//!
//! The script thread owns [`FrameBuffers`] outright: the two draw buffers
//! are never shared, so drawing needs no lock. Only the render buffer
//! crosses threads, and it is reachable solely through [`RenderBuffer`],
//! whose mutex is held for exactly one copy-in ([`FrameBuffers::flip`]) or
//! one copy-out ([`RenderBuffer::snapshot`]).

use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::pixel::PixelBuffer;

struct RenderState {
    pixels: PixelBuffer,
    /// Number of completed flips copied in so far.
    frame: u64,
}

/// The stable copy of the last completed frame.
pub struct RenderBuffer {
    state: Mutex<RenderState>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RenderState {
                pixels: PixelBuffer::screen(),
                frame: 0,
            }),
        }
    }

    /// Take the render lock. The returned guard derefs to the render buffer
    /// and releases the lock when dropped; keep it alive only long enough to
    /// copy the pixels out.
    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        RenderSnapshot {
            guard: self.lock(),
        }
    }

    /// Frames copied in since startup.
    pub fn frame_count(&self) -> u64 {
        self.lock().frame
    }

    fn store(&self, src: &PixelBuffer) {
        let mut state = self.lock();
        state.pixels.copy_from(src);
        state.frame += 1;
    }

    fn lock(&self) -> MutexGuard<'_, RenderState> {
        // A panic mid-copy leaves at worst a stale frame, never invalid memory.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Read access to the render buffer with the render lock held.
pub struct RenderSnapshot<'a> {
    guard: MutexGuard<'a, RenderState>,
}

impl RenderSnapshot<'_> {
    /// Sequence number of the flip that produced these pixels (0 before the
    /// first flip).
    pub fn frame(&self) -> u64 {
        self.guard.frame
    }
}

impl Deref for RenderSnapshot<'_> {
    type Target = PixelBuffer;

    fn deref(&self) -> &PixelBuffer {
        &self.guard.pixels
    }
}

/// The back/front buffer pair and the handle to the shared render buffer.
pub struct FrameBuffers {
    buffers: [PixelBuffer; 2],
    back: usize,
    render: Arc<RenderBuffer>,
}

impl FrameBuffers {
    pub fn new(render: Arc<RenderBuffer>) -> Self {
        Self {
            buffers: [PixelBuffer::screen(), PixelBuffer::screen()],
            back: 0,
            render,
        }
    }

    /// The buffer currently receiving draw writes.
    pub fn draw_buffer(&mut self) -> &mut PixelBuffer {
        &mut self.buffers[self.back]
    }

    /// The idle buffer that was "back" before the last flip.
    pub fn display_buffer(&self) -> &PixelBuffer {
        &self.buffers[1 - self.back]
    }

    /// Index (0 or 1) of the current back buffer.
    pub fn back_index(&self) -> usize {
        self.back
    }

    /// Publish the finished back buffer to the render buffer, then swap
    /// roles. The new back buffer keeps whatever it held two frames ago;
    /// nothing is cleared automatically.
    pub fn flip(&mut self) {
        self.render.store(&self.buffers[self.back]);
        self.back = 1 - self.back;
    }

    pub fn snapshot_for_presentation(&self) -> RenderSnapshot<'_> {
        self.render.snapshot()
    }

    pub fn render_buffer(&self) -> &Arc<RenderBuffer> {
        &self.render
    }
}
