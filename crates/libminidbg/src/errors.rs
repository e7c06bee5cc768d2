//! Error taxonomy for the debugger core.

use nix::errno::Errno;
use nix::unistd::Pid;
use std::ffi::NulError;
use std::io;
use thiserror::Error;

/// Unified result type across the debugger core.
pub type MdbResult<T> = Result<T, MdbError>;

/// Error cases
#[derive(Debug, Error)]
pub enum MdbError {
    /// The tracer could not duplicate itself to create the tracee.
    #[error("could not fork tracee process: {0}")]
    Fork(#[source] Errno),

    /// The OS does not know `pid` as a traced child of ours.
    #[error("no traced child with pid {pid}")]
    NoSuchTracee { pid: Pid },

    #[error("system call failed: {0}")]
    SysCall(#[from] Errno),

    #[error("unexpected wait status for pid {pid}: {status}")]
    UnexpectedWaitStatus { pid: Pid, status: String },

    #[error("C string error: {0}")]
    CString(#[from] NulError),

    #[error("input error: {0}")]
    Io(#[from] io::Error),

    #[error("tracee has already reported its initial stop")]
    AlreadySynchronised,

    #[error("tracee has not reported a stop yet")]
    NotStopped,

    #[error("process {pid} has already exited")]
    ProcessExited { pid: Pid },

    #[error("Unknown command")]
    UnknownCommand { keyword: String },
}

impl MdbError {
    /// Whether the session can keep going after reporting this error.
    ///
    /// Fatal errors mean the tracer/tracee relationship can no longer be
    /// trusted and the session has to end.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            MdbError::UnknownCommand { .. } | MdbError::NotStopped | MdbError::ProcessExited { .. }
        )
    }

    /// Map an errno from a ptrace/waitpid call on `pid`.
    pub(crate) fn from_trace_errno(pid: Pid, errno: Errno) -> Self {
        match errno {
            Errno::ESRCH | Errno::ECHILD => MdbError::NoSuchTracee { pid },
            other => MdbError::SysCall(other),
        }
    }
}
