//! Runtime adapters: worker runtimes and detached threads.

pub mod threads;

pub use threads::{current_thread_runtime, spawn_detached};
