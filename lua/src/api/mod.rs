//! The script-facing API: global tables and userdata types installed into
//! every Lua state before the script runs.
//!
//! All functions reach the hardware through the [`Hardware`] stored as Lua
//! app data, so the API only works on the thread that owns the state.

mod color;
mod controls;
mod image;
mod screen;
mod sound;
mod system;

use mlua::{AppDataRefMut, Lua, Value};

use luaplayer_core::console::Hardware;

pub use image::{Image, load_png};

/// Maximum texture edge, as on the handheld.
pub const MAX_IMAGE_SIZE: usize = 512;

/// Register every API table on `lua`'s globals.
pub fn install(lua: &Lua) -> mlua::Result<()> {
    // Scripts written for Lua 5.0 still call table.getn.
    lua.load("table.getn = function(t) return #t end")
        .set_name("=compat")
        .exec()?;

    color::install(lua)?;
    screen::install(lua)?;
    image::install(lua)?;
    controls::install(lua)?;
    sound::install(lua)?;
    system::install(lua)?;
    Ok(())
}

/// Borrow the hardware attached to `lua`.
pub(crate) fn hardware(lua: &Lua) -> mlua::Result<AppDataRefMut<'_, Hardware>> {
    lua.app_data_mut::<Hardware>()
        .ok_or_else(|| mlua::Error::runtime("no hardware attached to this Lua state"))
}

/// Convert a core error (typically [`luaplayer_core::Error::Shutdown`]) into
/// a Lua error that unwinds the script.
pub(crate) fn core_error(err: luaplayer_core::Error) -> mlua::Error {
    mlua::Error::external(err)
}

/// A numeric argument truncated toward zero, like `luaL_checkint`.
pub(crate) fn int(value: &Value) -> Option<i32> {
    match value {
        Value::Integer(i) => Some(*i as i32),
        Value::Number(n) => Some(*n as i32),
        _ => None,
    }
}
