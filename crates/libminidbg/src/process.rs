//! Tracee creation: fork, `PTRACE_TRACEME`, then exec.

use std::ffi::{CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::process;

use log::info;
use nix::sys::personality::{self, Persona};
use nix::sys::ptrace;
use nix::unistd::{ForkResult, Pid, execv, fork};

use crate::errors::{MdbError, MdbResult};

/// Knobs applied inside the child before its image is replaced.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Run the target with `ADDR_NO_RANDOMIZE` so addresses repeat across runs.
    pub disable_aslr: bool,
}

/// Represents a freshly launched process under the debugger's control.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pid: Pid,
    program: PathBuf,
}

impl ProcessHandle {
    /// Access the underlying PID for logging or future syscalls.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Path of the executable the tracee was started from.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// Launch `program` as a traced child of the calling process.
///
/// Returns as soon as the child exists. The child has asked to be traced
/// before exec'ing, so its first instruction raises a `SIGTRAP` stop that the
/// caller must consume with a wait before issuing any ptrace request.
pub fn launch(program: &Path, options: &LaunchOptions) -> MdbResult<ProcessHandle> {
    // Everything the child needs is allocated before the fork.
    let path = CString::new(program.as_os_str().as_bytes())?;

    // SAFETY: the child only performs personality/ptrace/exec calls before
    // either replacing its image or aborting.
    match unsafe { fork() }.map_err(MdbError::Fork)? {
        ForkResult::Parent { child } => {
            info!("Launched {} as pid {child}", program.display());
            Ok(ProcessHandle {
                pid: child,
                program: program.to_path_buf(),
            })
        }
        ForkResult::Child => spawn_and_prepare_child_image(&path, options),
    }
}

/// Child side of [`launch`]. Never returns.
fn spawn_and_prepare_child_image(path: &CStr, options: &LaunchOptions) -> ! {
    if options.disable_aslr {
        let disabled = personality::get()
            .and_then(|persona| personality::set(persona | Persona::ADDR_NO_RANDOMIZE));
        if disabled.is_err() {
            process::abort();
        }
    }

    if ptrace::traceme().is_err() {
        process::abort();
    }

    // argv[0] is the path itself, nothing else is passed.
    let _ = execv(path, &[path]);

    // exec only comes back on failure.
    process::abort()
}
