use thiserror::Error;

/// Errors raised by the hardware layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The running flag was cleared; the caller should unwind and return.
    #[error("console is shutting down")]
    Shutdown,

    /// The script-side hardware handle can only be taken once per console.
    #[error("hardware handle already claimed")]
    HardwareClaimed,

    #[error("{width}x{height} buffer needs {expected} texels, got {actual}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True if `err` (or anything in its source chain) is [`Error::Shutdown`].
    pub fn is_shutdown(err: &anyhow::Error) -> bool {
        err.chain()
            .any(|cause| matches!(cause.downcast_ref::<Error>(), Some(Error::Shutdown)))
    }
}
