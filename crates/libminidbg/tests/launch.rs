use std::path::Path;

use anyhow::Result;
use libminidbg::{LaunchOptions, MdbError, Session, TraceController, TraceeState, WaitOutcome};
use libminidbg::process::launch;
use libminidbg::session::LineReader;
use libminidbg::trace::PtracePort;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitStatus, waitpid};
use ntest::timeout;
use pretty_assertions::assert_eq;

struct Lines(Vec<&'static str>);

impl LineReader for Lines {
    fn read_line(&mut self, _prompt: &str) -> libminidbg::MdbResult<Option<String>> {
        Ok((!self.0.is_empty()).then(|| self.0.remove(0).to_owned()))
    }

    fn add_history(&mut self, _line: &str) {}
}

fn traced(program: &str, options: &LaunchOptions) -> Result<TraceController<PtracePort>> {
    let handle = launch(Path::new(program), options)?;
    assert_eq!(handle.program(), Path::new(program));
    Ok(TraceController::new(PtracePort::new(handle.pid()), handle.program()))
}

#[test]
#[timeout(5000)]
fn first_observed_state_is_stopped_at_exec() -> Result<()> {
    let mut ctl = traced("/bin/true", &LaunchOptions::default())?;
    assert_eq!(ctl.state(), TraceeState::Launched);

    let outcome = ctl.wait_initial_stop()?;
    assert_eq!(outcome, WaitOutcome::Stopped { signal: Signal::SIGTRAP });
    assert_eq!(ctl.state(), TraceeState::Stopped);

    let outcome = ctl.continue_execution()?;
    assert_eq!(outcome, WaitOutcome::Exited { code: 0 });
    assert_eq!(ctl.state(), TraceeState::Terminated);

    Ok(())
}

#[test]
#[timeout(5000)]
fn exit_code_is_reported() -> Result<()> {
    let mut ctl = traced("/bin/false", &LaunchOptions::default())?;
    ctl.wait_initial_stop()?;
    assert_eq!(ctl.continue_execution()?, WaitOutcome::Exited { code: 1 });

    let err = ctl.continue_execution().unwrap_err();
    assert!(matches!(err, MdbError::ProcessExited { .. }));
    Ok(())
}

#[test]
#[timeout(5000)]
fn missing_executable_never_reaches_entry() -> Result<()> {
    let mut ctl = traced("/definitely/not/here", &LaunchOptions::default())?;
    let outcome = ctl.wait_initial_stop()?;
    assert!(!outcome.is_exec_trap(), "{outcome}");

    // The aborting child sits in a signal-delivery stop; reap it.
    let pid = ctl.pid();
    kill(pid, Signal::SIGKILL)?;
    assert_eq!(waitpid(pid, None)?, WaitStatus::Signaled(pid, Signal::SIGKILL, false));
    Ok(())
}

#[test]
#[timeout(5000)]
fn runs_with_aslr_disabled() -> Result<()> {
    let mut ctl = traced("/bin/true", &LaunchOptions { disable_aslr: true })?;
    assert_eq!(ctl.wait_initial_stop()?, WaitOutcome::Stopped { signal: Signal::SIGTRAP });
    assert_eq!(ctl.continue_execution()?, WaitOutcome::Exited { code: 0 });
    assert_eq!(ctl.state(), TraceeState::Terminated);
    Ok(())
}

#[test]
#[timeout(5000)]
fn session_runs_target_to_completion() -> Result<()> {
    let mut session = Session::launch(Path::new("/bin/true"), &LaunchOptions::default())?;
    let mut reader = Lines(vec!["xyz", "cont"]);
    let (mut out, mut err) = (Vec::new(), Vec::new());

    session.run(&mut reader, &mut out, &mut err)?;

    let pid = session.controller().pid();
    assert_eq!(String::from_utf8(out)?, format!("Process {pid} exited with status 0\n"));
    assert_eq!(String::from_utf8(err)?, "Unknown command\n");
    assert_eq!(session.controller().state(), TraceeState::Terminated);
    Ok(())
}
