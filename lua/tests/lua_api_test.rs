use std::path::PathBuf;
use std::sync::Arc;

use luaplayer_core::console::{Console, ConsoleConfig};
use luaplayer_core::input::Buttons;
use luaplayer_core::script::Script;
use luaplayer_lua::{LuaScript, ScriptLoadError};

fn run(console: &Arc<Console>, source: &str) -> anyhow::Result<()> {
    let hw = console.hardware().unwrap();
    Box::new(LuaScript::from_source("test", source)).run(hw)
}

fn fresh() -> Arc<Console> {
    Console::new(ConsoleConfig::default())
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("luaplayer_lua_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ===== Graphics =====

#[test]
fn test_red_clear_blue_sprite() {
    let console = fresh();
    run(
        &console,
        r#"
        local blue = Color.new(0, 0, 255)
        local sprite = Image.createEmpty(2, 2)
        sprite:clear(blue)
        screen:clear(Color.new(255, 0, 0))
        screen:blit(0, 0, sprite)
        screen.flip()
        "#,
    )
    .unwrap();

    let snap = console.render_buffer().snapshot();
    assert_eq!(snap.get(0, 0), Some(0xFFFF_0000));
    assert_eq!(snap.get(1, 1), Some(0xFFFF_0000));
    assert_eq!(snap.get(10, 10), Some(0xFF00_00FF));
}

#[test]
fn test_transparent_texels_are_skipped() {
    let console = fresh();
    run(
        &console,
        r#"
        local img = Image.createEmpty(4, 4)
        img:pixel(1, 1, Color.new(0, 255, 0))
        screen:clear(Color.new(255, 255, 255))
        screen:blit(10, 10, img)
        assert(screen:pixel(11, 11) == Color.new(0, 255, 0))
        assert(screen:pixel(10, 10) == Color.new(255, 255, 255))
        screen:blit(10, 10, img, false)
        assert(screen:pixel(10, 10) == 0)
        "#,
    )
    .unwrap();
}

#[test]
fn test_screen_dimensions_and_color_helpers() {
    let console = fresh();
    run(
        &console,
        r#"
        assert(screen:width() == 480 and screen:height() == 272)
        local c = Color.new(1, 2, 3)
        assert(c == 0xFF030201)
        local r, g, b, a = Color.unpack(c)
        assert(r == 1 and g == 2 and b == 3 and a == 255)
        assert(Color.new(300, -5, 0, 0) == 0x000000FF)
        "#,
    )
    .unwrap();
}

#[test]
fn test_image_load_png() {
    let dir = temp_dir("png");
    let path = dir.join("dot.png");
    {
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), 2, 1);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer
            .write_image_data(&[255, 0, 0, 255, 0, 0, 255, 0])
            .unwrap();
    }

    let console = fresh();
    let source = format!(
        r#"
        local img = Image.load("{}")
        assert(img:width() == 2 and img:height() == 1)
        assert(img:pixel(0, 0) == Color.new(255, 0, 0))
        assert(img:pixel(1, 0) == Color.new(0, 0, 255, 0))
        "#,
        path.display()
    );
    run(&console, &source).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_image_load_missing_file_is_a_lua_error() {
    let console = fresh();
    run(
        &console,
        r#"
        local ok, err = pcall(Image.load, "does/not/exist.png")
        assert(not ok)
        assert(string.find(tostring(err), "Image.load", 1, true))
        "#,
    )
    .unwrap();
}

// ===== Input =====

#[test]
fn test_controls_read_polls_input_state() {
    let console = fresh();
    console.input().press(Buttons::CROSS | Buttons::LTRIGGER);
    run(
        &console,
        r#"
        local pad = Controls.read()
        assert(pad:cross() and pad:l())
        assert(not pad:circle() and not pad:start())
        assert(pad:analogX() == 0 and pad:analogY() == 0)
        assert(pad:buttons() == 0x4100)
        assert(pad == Controls.read())
        "#,
    )
    .unwrap();
}

// ===== Lifecycle =====

#[test]
fn test_table_getn_shim() {
    let console = fresh();
    run(&console, "assert(table.getn({1, 2, 3}) == 3)").unwrap();
}

#[test]
fn test_runtime_error_is_reported() {
    let console = fresh();
    let err = run(&console, "local t = nil; return t.field").unwrap_err();
    assert!(format!("{err}").contains("nil"), "{err}");
}

#[test]
fn test_syntax_error_is_reported() {
    let console = fresh();
    assert!(run(&console, "this is not lua").is_err());
}

#[test]
fn test_system_exit_stops_console() {
    let console = fresh();
    run(
        &console,
        r#"
        System.exit()
        error("unreachable")
        "#,
    )
    .unwrap();
    assert!(!console.is_running());
}

#[test]
fn test_wait_vblank_unwinds_on_shutdown() {
    let console = fresh();
    console.request_shutdown();
    run(
        &console,
        r#"
        while true do
            screen.flip()
            screen.waitVblankStart()
        end
        "#,
    )
    .unwrap();
}

#[test]
fn test_busy_loop_stops_on_shutdown() {
    let console = fresh();
    console.request_shutdown();
    run(&console, "while true do end").unwrap();
}

#[test]
fn test_sleep_returns() {
    let console = fresh();
    run(&console, "System.sleep(5)").unwrap();
}

#[test]
fn test_load_missing_script() {
    let err = LuaScript::load(std::path::Path::new("/nonexistent/script.lua")).err();
    assert!(matches!(err, Some(ScriptLoadError::Io { .. })));
}

// ===== Sound =====

#[test]
fn test_sound_voices() {
    let dir = temp_dir("wav");
    let path = dir.join("beep.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..4410 {
        writer.write_sample((i % 100) as i16).unwrap();
    }
    writer.finalize().unwrap();

    let console = fresh();
    let source = format!(
        r#"
        local beep = Sound.load("{}")
        assert(beep:length() == 4410)
        local voice = beep:play(true)
        assert(voice:playing())
        voice:volume(128)
        voice:frequency(22050)
        voice:frequency(1e9)
        assert(voice:playing())
        voice:stop()
        assert(not voice:playing())
        local other = beep:play()
        Sound.stopAll()
        assert(not other:playing())
        assert(Sound.volume() == 128)
        assert(Sound.volume(64) == 64)
        assert(Sound.volume(1000) == 128)
        assert(Sound.volume(-5) == 0)
        "#,
        path.display()
    );
    run(&console, &source).unwrap();
    assert_eq!(console.mixer().master_volume(), 0);
    std::fs::remove_dir_all(&dir).unwrap();
}
