//! The interactive read/dispatch loop.

use std::io::Write;
use std::path::Path;

use log::{info, warn};

use crate::command::{Dispatched, dispatch};
use crate::errors::MdbResult;
use crate::process::{self, LaunchOptions};
use crate::trace::{PtracePort, TraceController, TraceePort};

/// Prompt shown before every command.
pub const PROMPT: &str = "minidbg> ";

/// Source of operator input. Line editing and history storage live behind
/// this trait.
pub trait LineReader {
    /// Read one line, `None` once input is closed.
    fn read_line(&mut self, prompt: &str) -> MdbResult<Option<String>>;

    fn add_history(&mut self, line: &str);
}

/// One debugging session over one tracee.
#[derive(Debug)]
pub struct Session<P> {
    controller: TraceController<P>,
}

impl Session<PtracePort> {
    /// Fork and exec `program` under ptrace. The tracee's initial stop is
    /// consumed by [`Session::run`].
    pub fn launch(program: &Path, options: &LaunchOptions) -> MdbResult<Self> {
        let handle = process::launch(program, options)?;
        let port = PtracePort::new(handle.pid());
        Ok(Self::new(TraceController::new(port, handle.program())))
    }
}

impl<P: TraceePort> Session<P> {
    pub fn new(controller: TraceController<P>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &TraceController<P> {
        &self.controller
    }

    /// Synchronise with the tracee, then serve commands until input ends.
    ///
    /// Recoverable errors are written to `err` and the loop goes on; fatal
    /// ones end the session and are returned.
    pub fn run<R, O, E>(&mut self, reader: &mut R, out: &mut O, err: &mut E) -> MdbResult<()>
    where
        R: LineReader,
        O: Write,
        E: Write,
    {
        let pid = self.controller.pid();
        let initial = self.controller.wait_initial_stop()?;
        if !initial.is_exec_trap() {
            warn!("pid {pid} initial stop was {initial}");
            writeln!(
                err,
                "warning: tracee {pid} did not reach its entry point: {initial}"
            )?;
        }
        info!("Session ready for pid {pid}");

        while let Some(line) = reader.read_line(PROMPT)? {
            match dispatch(&mut self.controller, &line) {
                Ok(Dispatched::Outcome(outcome)) if outcome.is_terminated() => {
                    writeln!(out, "Process {pid} {outcome}")?;
                }
                Ok(_) => {}
                Err(e) if !e.is_fatal() => writeln!(err, "{e}")?,
                Err(e) => return Err(e),
            }

            if !line.trim().is_empty() {
                reader.add_history(&line);
            }
        }

        info!("Input closed, leaving session for pid {pid}");
        Ok(())
    }
}
