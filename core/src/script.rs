//! The script execution thread.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use crate::audio::AudioMixer;
use crate::console::{Console, Hardware};
use crate::error::Error;

/// A guest program that drives the hardware until it returns.
///
/// Implementations are created on the presentation thread and moved to the
/// script thread, where `run` receives the only [`Hardware`] handle.
pub trait Script: Send + 'static {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Run to completion. Returning an error chain containing
    /// [`Error::Shutdown`] means the script unwound because the console is
    /// closing; it is not reported as a failure.
    fn run(self: Box<Self>, hardware: Hardware) -> anyhow::Result<()>;
}

/// Stops audio and clears the running flag when the script thread ends,
/// including by panic.
struct ExitGuard(Arc<Console>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.mixer().stop();
        self.0.request_shutdown();
        debug!("script thread finished, running flag cleared");
    }
}

/// Handle to the running script thread.
pub struct ScriptThread {
    handle: JoinHandle<()>,
    name: String,
}

impl ScriptThread {
    /// Spawn `script` on a dedicated thread.
    pub fn spawn(script: Box<dyn Script>, hardware: Hardware) -> io::Result<Self> {
        let name = script.name().to_string();
        let console = Arc::clone(hardware.console());
        let handle = thread::Builder::new()
            .name("script".into())
            .spawn(move || {
                let _guard = ExitGuard(console);
                run_reporting(script, hardware);
            })?;
        Ok(Self { handle, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to exit. A panic inside the script has already
    /// been turned into a shutdown by the exit guard; it is logged here.
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!(script = %self.name, "script thread panicked");
        }
    }
}

/// Run the script and report its outcome exactly once.
fn run_reporting(script: Box<dyn Script>, hardware: Hardware) {
    let name = script.name().to_string();
    info!(script = %name, "script started");
    match script.run(hardware) {
        Ok(()) => info!(script = %name, "script finished"),
        Err(err) if Error::is_shutdown(&err) => {
            debug!(script = %name, "script stopped by shutdown request")
        }
        Err(err) => error!(script = %name, "script error: {err:#}"),
    }
}
