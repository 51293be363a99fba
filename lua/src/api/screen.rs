//! The `screen` global: the back buffer of the emulated display.

use mlua::{Lua, MetaMethod, UserData, UserDataMethods, UserDataRef, Value, Variadic};

use luaplayer_core::video::{Color, SCREEN_HEIGHT, SCREEN_WIDTH, blit_copy};

use super::image::{BlitArgs, Image};
use super::{core_error, hardware, int};

struct Screen;

impl UserData for Screen {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("width", |_, _, ()| Ok(SCREEN_WIDTH));
        methods.add_method("height", |_, _, ()| Ok(SCREEN_HEIGHT));

        // screen:clear(color) latches the clear color, then clears with it.
        methods.add_method("clear", |lua, _, color: Option<Color>| {
            let mut hw = hardware(lua)?;
            if let Some(color) = color {
                hw.set_clear_color(color);
            }
            hw.clear_current();
            Ok(())
        });

        methods.add_method("pixel", |lua, _, (x, y, color): (f64, f64, Option<Color>)| {
            let mut hw = hardware(lua)?;
            let target = hw.draw_buffer();
            match color {
                Some(color) => {
                    target.set(x as i32, y as i32, color);
                    Ok(None)
                }
                None => Ok(target.get(x as i32, y as i32)),
            }
        });

        methods.add_method(
            "blit",
            |lua, _, (x, y, image, rest): (f64, f64, UserDataRef<Image>, Variadic<Value>)| {
                let texture = image.texture();
                let args = BlitArgs::parse(texture, &rest)?;
                let Some((src, dst)) = args.placement(texture, x as i32, y as i32) else {
                    return Ok(());
                };
                let mut hw = hardware(lua)?;
                if args.alpha {
                    hw.bind_texture(texture.clone(), texture.width(), texture.height());
                    hw.draw_sprite(src, dst);
                } else {
                    blit_copy(src, &texture.read(), dst, hw.draw_buffer());
                }
                Ok(())
            },
        );

        // flip and waitVblankStart are called with `.`, but tolerate `:`.
        methods.add_function("flip", |lua, _: Variadic<Value>| {
            hardware(lua)?.swap_buffers();
            Ok(())
        });

        methods.add_function("waitVblankStart", |lua, args: Variadic<Value>| {
            let count = args.iter().rev().find_map(int).unwrap_or(1).max(1);
            let mut hw = hardware(lua)?;
            for _ in 0..count {
                hw.wait_vblank().map_err(core_error)?;
            }
            Ok(())
        });

        methods.add_meta_method(MetaMethod::ToString, |_, _, ()| {
            Ok(format!("Screen({SCREEN_WIDTH}x{SCREEN_HEIGHT})"))
        });
    }
}

pub(super) fn install(lua: &Lua) -> mlua::Result<()> {
    lua.globals().set("screen", Screen)
}
