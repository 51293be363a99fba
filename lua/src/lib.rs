//! Lua script engine.
//!
//! A [`LuaScript`] owns only the chunk source; the Lua state itself is
//! created on the script thread inside [`Script::run`], with the
//! [`Hardware`] handle attached as app data for the API functions.

pub mod api;
pub mod error;
pub mod registry;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use mlua::{HookTriggers, Lua, VmState};
use tracing::debug;

use luaplayer_core::console::{Console, Hardware};
use luaplayer_core::script::Script;

pub use error::{ImageError, ScriptLoadError};
pub use registry::ScriptEntry;

/// Instructions between checks of the running flag.
const SHUTDOWN_CHECK_INTERVAL: u32 = 10_000;

pub struct LuaScript {
    name: String,
    source: Vec<u8>,
}

impl LuaScript {
    /// Read a script file. The chunk name is `@path`, so Lua error messages
    /// point at the file.
    pub fn load(path: &Path) -> Result<Self, ScriptLoadError> {
        let source = fs::read(path).map_err(|source| ScriptLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            name: format!("@{}", path.display()),
            source,
        })
    }

    /// A script from an in-memory chunk.
    pub fn from_source(name: &str, source: impl Into<Vec<u8>>) -> Self {
        Self {
            name: format!("={name}"),
            source: source.into(),
        }
    }

    fn create(path: &Path) -> Result<Box<dyn Script>, ScriptLoadError> {
        Ok(Box::new(Self::load(path)?))
    }
}

impl Script for LuaScript {
    fn name(&self) -> &str {
        self.name.trim_start_matches(['@', '='])
    }

    fn run(self: Box<Self>, hardware: Hardware) -> anyhow::Result<()> {
        let lua = Lua::new();
        install_shutdown_hook(&lua, Arc::clone(hardware.console()));
        lua.set_app_data(hardware);
        api::install(&lua).map_err(|err| anyhow::anyhow!("failed to install Lua API: {err}"))?;

        match lua.load(&self.source[..]).set_name(&self.name).exec() {
            Ok(()) => Ok(()),
            Err(err) if is_shutdown(&err) => {
                debug!("Lua chunk unwound by shutdown");
                Ok(())
            }
            Err(err) => Err(anyhow::anyhow!("{err}")),
        }
    }
}

/// Raise a shutdown error inside long-running Lua code that never waits for
/// vblank, so a close request still stops it.
fn install_shutdown_hook(lua: &Lua, console: Arc<Console>) {
    let triggers = HookTriggers::new().every_nth_instruction(SHUTDOWN_CHECK_INTERVAL);
    lua.set_hook(triggers, move |_, _| {
        if console.is_running() {
            Ok(VmState::Continue)
        } else {
            Err(api::core_error(luaplayer_core::Error::Shutdown))
        }
    });
}

/// True if `err` is, or was caused by, the console shutting down.
///
/// mlua wraps errors raised inside callbacks in `CallbackError`, and the
/// wrapped value does not show up through `source()`, so walk it by hand.
pub fn is_shutdown(err: &mlua::Error) -> bool {
    match err {
        mlua::Error::CallbackError { cause, .. } => is_shutdown(cause),
        mlua::Error::WithContext { cause, .. } => is_shutdown(cause),
        mlua::Error::ExternalError(inner) => matches!(
            inner.downcast_ref::<luaplayer_core::Error>(),
            Some(luaplayer_core::Error::Shutdown)
        ),
        _ => false,
    }
}

inventory::submit! {
    ScriptEntry::new("lua", &["lua"], LuaScript::create)
}
