//! Script engine registry for automatic front-end discovery.
//!
//! Each engine self-registers via [`inventory::submit!`] with a
//! [`ScriptEntry`] naming the file extensions it runs and a factory. The
//! front-end picks an engine for the script path at runtime without any
//! central list.

use std::path::Path;

use luaplayer_core::script::Script;

use crate::error::ScriptLoadError;

/// Describes a script engine.
pub struct ScriptEntry {
    /// Engine name used in log messages (e.g., "lua").
    pub name: &'static str,
    /// File extensions this engine runs, lowercase, without the dot.
    pub extensions: &'static [&'static str],
    /// Factory: load a script from disk.
    pub create: fn(&Path) -> Result<Box<dyn Script>, ScriptLoadError>,
}

impl ScriptEntry {
    pub const fn new(
        name: &'static str,
        extensions: &'static [&'static str],
        create: fn(&Path) -> Result<Box<dyn Script>, ScriptLoadError>,
    ) -> Self {
        Self {
            name,
            extensions,
            create,
        }
    }

    pub fn handles(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

inventory::collect!(ScriptEntry);

/// Return all registered engines, sorted by name.
pub fn all() -> Vec<&'static ScriptEntry> {
    let mut entries: Vec<_> = inventory::iter::<ScriptEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Pick the engine for `path` by its extension.
pub fn for_path(path: &Path) -> Option<&'static ScriptEntry> {
    let ext = path.extension()?.to_str()?;
    inventory::iter::<ScriptEntry>
        .into_iter()
        .find(|e| e.handles(ext))
}

/// Load `path` with the engine registered for its extension.
pub fn load(path: &Path) -> Result<(&'static ScriptEntry, Box<dyn Script>), ScriptLoadError> {
    let Some(entry) = for_path(path) else {
        let supported: Vec<_> = all()
            .iter()
            .flat_map(|e| e.extensions.iter().copied())
            .collect();
        return Err(ScriptLoadError::UnknownEngine {
            path: path.to_path_buf(),
            supported: supported.join(", "),
        });
    };
    Ok((entry, (entry.create)(path)?))
}
