use std::time::Duration;

use mlua::Lua;
use tracing::info;

use luaplayer_core::Error;

use super::{core_error, hardware};

pub(super) fn install(lua: &Lua) -> mlua::Result<()> {
    let table = lua.create_table()?;

    table.set(
        "sleep",
        lua.create_function(|lua, ms: f64| {
            let duration = Duration::try_from_secs_f64(ms.max(0.0) / 1000.0)
                .map_err(mlua::Error::external)?;
            hardware(lua)?.delay(duration).map_err(core_error)
        })?,
    )?;

    // Leaves through the same path as a close request from the host.
    table.set(
        "exit",
        lua.create_function(|lua, ()| -> mlua::Result<()> {
            info!("script requested exit");
            hardware(lua)?.console().request_shutdown();
            Err(core_error(Error::Shutdown))
        })?,
    )?;

    lua.globals().set("System", table)
}
