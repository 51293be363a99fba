use mlua::{Lua, MetaMethod, UserData, UserDataMethods, UserDataRef};

use luaplayer_core::input::{ANALOG_CENTER, Buttons, CtrlData};

use super::hardware;

/// One controller poll as seen by the script.
struct Pad(CtrlData);

const BUTTONS: &[(&str, Buttons)] = &[
    ("select", Buttons::SELECT),
    ("start", Buttons::START),
    ("up", Buttons::UP),
    ("right", Buttons::RIGHT),
    ("down", Buttons::DOWN),
    ("left", Buttons::LEFT),
    ("l", Buttons::LTRIGGER),
    ("r", Buttons::RTRIGGER),
    ("triangle", Buttons::TRIANGLE),
    ("circle", Buttons::CIRCLE),
    ("cross", Buttons::CROSS),
    ("square", Buttons::SQUARE),
    ("home", Buttons::HOME),
    ("hold", Buttons::HOLD),
    ("note", Buttons::NOTE),
];

impl UserData for Pad {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        for &(name, button) in BUTTONS {
            methods.add_method(name, move |_, this, ()| Ok(this.0.pressed(button)));
        }

        // Signed offset from center; 0 when idle.
        methods.add_method("analogX", |_, this, ()| {
            Ok(i32::from(this.0.lx) - i32::from(ANALOG_CENTER))
        });
        methods.add_method("analogY", |_, this, ()| {
            Ok(i32::from(this.0.ly) - i32::from(ANALOG_CENTER))
        });

        methods.add_method("buttons", |_, this, ()| Ok(this.0.buttons.bits()));

        methods.add_meta_method(MetaMethod::Eq, |_, this, other: UserDataRef<Pad>| {
            Ok(this.0 == other.0)
        });
    }
}

pub(super) fn install(lua: &Lua) -> mlua::Result<()> {
    let table = lua.create_table()?;
    table.set(
        "read",
        lua.create_function(|lua, ()| Ok(Pad(hardware(lua)?.read_controls())))?,
    )?;
    lua.globals().set("Controls", table)
}
