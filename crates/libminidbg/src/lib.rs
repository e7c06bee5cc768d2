//! Core library facade for the minidbg debugger.
//! Provides the process-control pieces driven by the CLI front end.

pub mod command;
pub mod errors;
pub mod process;
pub mod session;
pub mod trace;

#[cfg(test)]
mod testing;

pub use errors::{MdbError, MdbResult};
pub use process::{LaunchOptions, ProcessHandle};
pub use session::{LineReader, Session};
pub use trace::{TraceController, TraceeState, WaitOutcome};

/// Exposes the crate version for CLI reporting.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
