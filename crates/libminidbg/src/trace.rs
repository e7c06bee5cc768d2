//! Trace control for a single tracee.
//!
//! [`TraceePort`] is the narrow seam over the blocking `ptrace`/`waitpid`
//! pair; [`TraceController`] tracks the tracee's run state on top of it and
//! refuses requests the kernel would reject or misinterpret.

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use nix::sys::ptrace;
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;

use crate::errors::{MdbError, MdbResult};

/// Why the tracee last changed state, as reported by `waitpid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Stopped and still alive; `signal` is the stop signal.
    Stopped { signal: Signal },
    /// Exited normally with `code`.
    Exited { code: i32 },
    /// Killed by `signal`.
    Signaled { signal: Signal, core_dumped: bool },
}

impl WaitOutcome {
    /// True once the tracee has exited or been killed.
    pub fn is_terminated(&self) -> bool {
        matches!(self, WaitOutcome::Exited { .. } | WaitOutcome::Signaled { .. })
    }

    /// The trap raised by a successful exec after `PTRACE_TRACEME`.
    pub fn is_exec_trap(&self) -> bool {
        matches!(self, WaitOutcome::Stopped { signal: Signal::SIGTRAP })
    }

    fn from_status(pid: Pid, status: WaitStatus) -> MdbResult<Self> {
        match status {
            WaitStatus::Stopped(_, signal) => Ok(WaitOutcome::Stopped { signal }),
            WaitStatus::PtraceEvent(_, signal, _) => Ok(WaitOutcome::Stopped { signal }),
            WaitStatus::PtraceSyscall(_) => Ok(WaitOutcome::Stopped {
                signal: Signal::SIGTRAP,
            }),
            WaitStatus::Exited(_, code) => Ok(WaitOutcome::Exited { code }),
            WaitStatus::Signaled(_, signal, core_dumped) => {
                Ok(WaitOutcome::Signaled { signal, core_dumped })
            }
            // Continued/StillAlive need wait flags we never pass.
            other => Err(MdbError::UnexpectedWaitStatus {
                pid,
                status: format!("{other:?}"),
            }),
        }
    }
}

impl fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitOutcome::Stopped { signal } => write!(f, "stopped by {}", signal.as_str()),
            WaitOutcome::Exited { code } => write!(f, "exited with status {code}"),
            WaitOutcome::Signaled {
                signal,
                core_dumped,
            } => {
                write!(f, "terminated by {}", signal.as_str())?;
                if *core_dumped {
                    write!(f, " (core dumped)")?;
                }
                Ok(())
            }
        }
    }
}

/// Run state of the tracee as seen from the tracer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceeState {
    /// Forked but its first stop has not been consumed yet.
    Launched,
    Stopped,
    Running,
    /// Absorbing: no control request is valid afterwards.
    Terminated,
}

/// Blocking control primitives for one tracee.
pub trait TraceePort {
    /// PID of the controlled tracee.
    fn pid(&self) -> Pid;

    /// Resume a stopped tracee and block until its next stop or exit.
    fn resume(&mut self) -> MdbResult<WaitOutcome>;

    /// Block until the tracee reports a state change.
    fn wait_for_stop(&mut self) -> MdbResult<WaitOutcome>;
}

/// [`TraceePort`] backed by `ptrace(2)` and `waitpid(2)`.
#[derive(Debug)]
pub struct PtracePort {
    pid: Pid,
}

impl PtracePort {
    /// Control an already traced child `pid`.
    pub fn new(pid: Pid) -> Self {
        Self { pid }
    }
}

impl TraceePort for PtracePort {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn resume(&mut self) -> MdbResult<WaitOutcome> {
        ptrace::cont(self.pid, None).map_err(|errno| MdbError::from_trace_errno(self.pid, errno))?;
        self.wait_for_stop()
    }

    fn wait_for_stop(&mut self) -> MdbResult<WaitOutcome> {
        let status =
            waitpid(self.pid, None).map_err(|errno| MdbError::from_trace_errno(self.pid, errno))?;
        debug!("waitpid({}) -> {status:?}", self.pid);
        WaitOutcome::from_status(self.pid, status)
    }
}

/// Owns one tracee for the lifetime of a debugging session.
#[derive(Debug)]
pub struct TraceController<P> {
    port: P,
    program: PathBuf,
    state: TraceeState,
    last_outcome: Option<WaitOutcome>,
}

impl<P: TraceePort> TraceController<P> {
    /// Wrap a freshly launched tracee whose first stop is still pending.
    pub fn new(port: P, program: impl Into<PathBuf>) -> Self {
        Self {
            port,
            program: program.into(),
            state: TraceeState::Launched,
            last_outcome: None,
        }
    }

    /// PID of the tracee.
    pub fn pid(&self) -> Pid {
        self.port.pid()
    }

    /// Executable the tracee was launched from.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run state as last observed.
    pub fn state(&self) -> TraceeState {
        self.state
    }

    /// Outcome of the most recent wait, if any.
    pub fn last_outcome(&self) -> Option<WaitOutcome> {
        self.last_outcome
    }

    /// Consume the stop the tracee raises on exec.
    ///
    /// Must be called exactly once, before any other control request.
    pub fn wait_initial_stop(&mut self) -> MdbResult<WaitOutcome> {
        if self.state != TraceeState::Launched {
            return Err(MdbError::AlreadySynchronised);
        }
        let outcome = self.port.wait_for_stop()?;
        self.observe(outcome);
        Ok(outcome)
    }

    /// Resume the tracee and block until it stops again or terminates.
    pub fn continue_execution(&mut self) -> MdbResult<WaitOutcome> {
        match self.state {
            TraceeState::Stopped => {}
            TraceeState::Terminated => return Err(MdbError::ProcessExited { pid: self.pid() }),
            TraceeState::Launched | TraceeState::Running => return Err(MdbError::NotStopped),
        }

        self.state = TraceeState::Running;
        let outcome = self.port.resume()?;
        self.observe(outcome);
        Ok(outcome)
    }

    fn observe(&mut self, outcome: WaitOutcome) {
        debug!("pid {} {outcome}", self.pid());
        self.state = if outcome.is_terminated() {
            TraceeState::Terminated
        } else {
            TraceeState::Stopped
        };
        self.last_outcome = Some(outcome);
    }
}
