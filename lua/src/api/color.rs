use mlua::Lua;

use luaplayer_core::video::{Color, rgba, unpack};

fn channel(v: f64) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

pub(super) fn install(lua: &Lua) -> mlua::Result<()> {
    let table = lua.create_table()?;

    table.set(
        "new",
        lua.create_function(|_, (r, g, b, a): (f64, f64, f64, Option<f64>)| {
            Ok(rgba(channel(r), channel(g), channel(b), channel(a.unwrap_or(255.0))))
        })?,
    )?;

    table.set(
        "unpack",
        lua.create_function(|_, color: Color| {
            let (r, g, b, a) = unpack(color);
            Ok((r, g, b, a))
        })?,
    )?;

    lua.globals().set("Color", table)
}
