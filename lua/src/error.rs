use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a script from disk.
#[derive(Debug, Error)]
pub enum ScriptLoadError {
    #[error("failed to read script {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no script engine handles {} (supported: {supported})", path.display())]
    UnknownEngine { path: PathBuf, supported: String },
}

/// Errors raised by `Image.load` and `Image.createEmpty`.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to open image: {0}")]
    Io(#[from] io::Error),

    #[error("failed to decode PNG: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("image size {width}x{height} outside 1..={max}")]
    Size {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("unsupported PNG color type {0:?}")]
    Format(png::ColorType),
}
