//! Thread and tokio runtime construction.

use std::io;
use std::thread::{self, JoinHandle};

use tokio::runtime::{Builder, Runtime};

/// Build a single-threaded tokio runtime with time and IO drivers enabled.
///
/// Every worker thread owns one of these, so handler futures never run on
/// the caller's async runtime.
///
/// # Errors
///
/// Propagates the runtime builder's IO error.
pub fn current_thread_runtime() -> io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

/// Spawn a named thread whose handle the caller may drop.
///
/// # Errors
///
/// Returns the OS error if the thread could not be created.
pub fn spawn_detached<F>(name: &str, f: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new().name(name.to_string()).spawn(f)
}
