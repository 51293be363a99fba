use luaplayer_core::console::{Console, ConsoleConfig};
use luaplayer_core::video::{
    GraphicsEmulator, PixelBuffer, Rect, SCREEN_HEIGHT, SCREEN_WIDTH, Texture, blit_copy,
};

const RED: u32 = 0xFF00_00FF;
const BLUE: u32 = 0xFFFF_0000;

fn solid(width: usize, height: usize, color: u32) -> Texture {
    let mut pixels = PixelBuffer::new(width, height);
    pixels.fill(color);
    Texture::new(pixels)
}

// ===== Scenario =====

#[test]
fn test_clear_then_sprite_then_flip() {
    let console = Console::new(ConsoleConfig::default());
    let mut hw = console.hardware().unwrap();

    hw.clear(RED);
    hw.bind_texture(solid(2, 2, BLUE), 2, 2);
    hw.draw_sprite(Rect::new(0, 0, 2, 2), Rect::new(0, 0, 2, 2));
    hw.swap_buffers();

    let snap = console.render_buffer().snapshot();
    assert_eq!(snap.get(0, 0), Some(BLUE));
    assert_eq!(snap.get(1, 1), Some(BLUE));
    assert_eq!(snap.get(2, 0), Some(RED));
    assert_eq!(snap.get(10, 10), Some(RED));
    assert_eq!(snap.width(), SCREEN_WIDTH);
    assert_eq!(snap.height(), SCREEN_HEIGHT);
}

#[test]
fn test_draw_buffer_alternates_after_flip() {
    let console = Console::new(ConsoleConfig::default());
    let mut hw = console.hardware().unwrap();
    let first = hw.frames().back_index();
    hw.swap_buffers();
    assert_ne!(hw.frames().back_index(), first);
    hw.swap_buffers();
    assert_eq!(hw.frames().back_index(), first);
}

// ===== Alpha key =====

#[test]
fn test_zero_alpha_texels_leave_target_untouched() {
    let mut tex = PixelBuffer::new(4, 1);
    tex.pixels_mut()
        .copy_from_slice(&[0x00FF_FFFF, 0x0100_0000, 0xFF12_3456, 0x0000_0000]);

    let mut gu = GraphicsEmulator::new();
    gu.bind_texture(Texture::new(tex), 4, 1);
    let mut target = PixelBuffer::new(4, 1);
    target.fill(0xDEAD_BEEF);
    gu.draw_sprite(&mut target, Rect::new(0, 0, 4, 1), Rect::new(0, 0, 4, 1));

    // Any non-zero alpha is written verbatim, never blended.
    assert_eq!(target.row(0), &[0xDEAD_BEEF, 0x0100_0000, 0xFF12_3456, 0xDEAD_BEEF]);
}

#[test]
fn test_fully_transparent_sprite_is_a_no_op() {
    let mut gu = GraphicsEmulator::new();
    gu.bind_texture(solid(8, 8, 0x00FF_FFFF), 8, 8);
    let mut target = PixelBuffer::new(16, 16);
    target.fill(RED);
    gu.draw_sprite(&mut target, Rect::new(0, 0, 8, 8), Rect::new(4, 4, 8, 8));
    assert!(target.pixels().iter().all(|&c| c == RED));
}

// ===== Clipping =====

#[test]
fn test_sprite_partially_off_screen_is_clipped() {
    let mut tex = PixelBuffer::new(4, 4);
    for y in 0..4 {
        for x in 0..4 {
            tex.set(x, y, 0xFF00_0000 | (y as u32) << 8 | x as u32);
        }
    }
    let mut gu = GraphicsEmulator::new();
    gu.bind_texture(Texture::new(tex), 4, 4);
    let mut target = PixelBuffer::new(8, 8);
    gu.draw_sprite(&mut target, Rect::new(0, 0, 4, 4), Rect::new(-2, 6, 4, 4));

    // Source texel (2, 0) lands at (0, 6): clipping does not shift sampling.
    assert_eq!(target.get(0, 6), Some(0xFF00_0002));
    assert_eq!(target.get(1, 7), Some(0xFF00_0103));
    assert_eq!(target.get(2, 6), Some(0));
}

#[test]
fn test_repeated_clipped_draw_is_idempotent() {
    let mut gu = GraphicsEmulator::new();
    gu.bind_texture(solid(64, 64, BLUE), 64, 64);
    let mut once = PixelBuffer::screen();
    gu.draw_sprite(&mut once, Rect::new(0, 0, 64, 64), Rect::new(450, 250, 64, 64));
    let mut twice = once.clone();
    gu.draw_sprite(&mut twice, Rect::new(0, 0, 64, 64), Rect::new(450, 250, 64, 64));
    assert_eq!(once.pixels(), twice.pixels());
    assert_eq!(once.get(479, 271), Some(BLUE));
}

#[test]
fn test_off_screen_destination_matches_preclipped_draw() {
    let mut tex = PixelBuffer::new(8, 8);
    for y in 0..8 {
        for x in 0..8 {
            tex.set(x, y, 0xFF00_0000 | (y as u32) << 8 | x as u32);
        }
    }
    let mut gu = GraphicsEmulator::new();
    gu.bind_texture(Texture::new(tex), 8, 8);

    let mut clipped = PixelBuffer::screen();
    gu.draw_sprite(&mut clipped, Rect::new(0, 0, 8, 8), Rect::new(476, -3, 8, 8));
    let mut preclipped = PixelBuffer::screen();
    gu.draw_sprite(&mut preclipped, Rect::new(0, 3, 4, 5), Rect::new(476, 0, 4, 5));

    assert_eq!(clipped.pixels(), preclipped.pixels());
    assert_eq!(clipped.get(476, 0), Some(0xFF00_0300));
    assert_eq!(clipped.get(479, 4), Some(0xFF00_0703));
    assert_eq!(clipped.get(476, 5), Some(0));
}

#[test]
fn test_sprite_entirely_off_screen_draws_nothing() {
    let mut gu = GraphicsEmulator::new();
    gu.bind_texture(solid(4, 4, BLUE), 4, 4);
    let mut target = PixelBuffer::screen();
    gu.draw_sprite(&mut target, Rect::new(0, 0, 4, 4), Rect::new(480, 0, 4, 4));
    gu.draw_sprite(&mut target, Rect::new(0, 0, 4, 4), Rect::new(-4, -4, 4, 4));
    assert!(target.pixels().iter().all(|&c| c == 0));
}

#[test]
fn test_clear_fills_padding() {
    let mut target = PixelBuffer::screen();
    GraphicsEmulator::new().clear(&mut target, RED);
    assert_eq!(target.stride(), 512);
    assert!(target.pixels().iter().all(|&c| c == RED));
}

// ===== Block copy =====

#[test]
fn test_blit_copy_ignores_alpha() {
    let mut src = PixelBuffer::new(2, 2);
    src.fill(0x0012_3456);
    let mut dst = PixelBuffer::new(4, 4);
    dst.fill(RED);
    blit_copy(Rect::new(0, 0, 2, 2), &src, Rect::new(1, 1, 2, 2), &mut dst);
    assert_eq!(dst.get(1, 1), Some(0x0012_3456));
    assert_eq!(dst.get(2, 2), Some(0x0012_3456));
    assert_eq!(dst.get(0, 0), Some(RED));
    assert_eq!(dst.get(3, 3), Some(RED));
}

#[test]
fn test_blit_copy_clips_to_destination() {
    let mut src = PixelBuffer::new(4, 4);
    src.fill(BLUE);
    let mut dst = PixelBuffer::new(4, 4);
    blit_copy(Rect::new(0, 0, 4, 4), &src, Rect::new(2, -2, 4, 4), &mut dst);
    assert_eq!(dst.get(2, 0), Some(BLUE));
    assert_eq!(dst.get(3, 1), Some(BLUE));
    assert_eq!(dst.get(1, 0), Some(0));
    assert_eq!(dst.get(2, 2), Some(0));
}
