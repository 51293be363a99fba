//! Script path resolution: a script file, or a game directory containing
//! `index.lua` or `script.lua`.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Entry points tried, in order, when the path is a directory.
pub const ENTRY_POINTS: &[&str] = &["index.lua", "script.lua"];

#[derive(Debug, Error)]
pub enum ScriptPathError {
    #[error("script path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no {} in directory {}", ENTRY_POINTS.join(" or "), .0.display())]
    NoEntryPoint(PathBuf),
}

/// Resolve a command-line script argument to the script file to run.
///
/// Resolution order:
/// 1. If `path` is a file → run it.
/// 2. If `path` is a directory → the first of [`ENTRY_POINTS`] it contains.
pub fn resolve(path: &Path) -> Result<PathBuf, ScriptPathError> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if path.is_dir() {
        return ENTRY_POINTS
            .iter()
            .map(|name| path.join(name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ScriptPathError::NoEntryPoint(path.to_path_buf()));
    }
    Err(ScriptPathError::NotFound(path.to_path_buf()))
}

/// Directory the script's relative asset paths are resolved against.
pub fn working_dir(script: &Path) -> Option<&Path> {
    script.parent().filter(|dir| !dir.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("luaplayer_scriptpath_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn resolve_file_directly() {
        let dir = temp_dir("file");
        let script = dir.join("game.lua");
        std::fs::write(&script, "-- game").unwrap();

        assert_eq!(resolve(&script).unwrap(), script);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn resolve_directory_prefers_index() {
        let dir = temp_dir("index");
        std::fs::write(dir.join("index.lua"), "").unwrap();
        std::fs::write(dir.join("script.lua"), "").unwrap();

        assert_eq!(resolve(&dir).unwrap(), dir.join("index.lua"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn resolve_directory_script_fallback() {
        let dir = temp_dir("script");
        std::fs::write(dir.join("script.lua"), "").unwrap();

        assert_eq!(resolve(&dir).unwrap(), dir.join("script.lua"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn resolve_empty_directory_fails() {
        let dir = temp_dir("empty");

        assert!(matches!(resolve(&dir), Err(ScriptPathError::NoEntryPoint(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn resolve_missing_path_fails() {
        let missing = Path::new("/nonexistent/luaplayer/game.lua");
        assert!(matches!(resolve(missing), Err(ScriptPathError::NotFound(_))));
    }

    #[test]
    fn working_dir_of_bare_file_name_is_none() {
        assert_eq!(working_dir(Path::new("game.lua")), None);
        assert_eq!(working_dir(Path::new("games/pong/index.lua")), Some(Path::new("games/pong")));
    }
}
