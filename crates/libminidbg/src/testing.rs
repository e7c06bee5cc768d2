//! Scripted stand-ins for the tracee and the operator.

use std::collections::VecDeque;

use nix::unistd::Pid;

use crate::errors::{MdbError, MdbResult};
use crate::session::LineReader;
use crate::trace::{TraceePort, WaitOutcome};

/// Replays a fixed sequence of wait outcomes. Once the script runs dry the
/// tracee behaves like a pid the kernel no longer knows.
#[derive(Debug)]
pub struct FakeTracee {
    pid: Pid,
    script: VecDeque<WaitOutcome>,
    resumes: usize,
}

impl FakeTracee {
    pub fn new(pid: i32, script: impl IntoIterator<Item = WaitOutcome>) -> Self {
        Self {
            pid: Pid::from_raw(pid),
            script: script.into_iter().collect(),
            resumes: 0,
        }
    }

    pub fn resumes(&self) -> usize {
        self.resumes
    }
}

impl TraceePort for FakeTracee {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn resume(&mut self) -> MdbResult<WaitOutcome> {
        self.resumes += 1;
        self.wait_for_stop()
    }

    fn wait_for_stop(&mut self) -> MdbResult<WaitOutcome> {
        self.script
            .pop_front()
            .ok_or(MdbError::NoSuchTracee { pid: self.pid })
    }
}

/// Feeds canned lines and records what ends up in history.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    lines: VecDeque<String>,
    pub prompts: Vec<String>,
    pub history: Vec<String>,
}

impl ScriptedReader {
    pub fn new<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            lines: lines.into_iter().map(str::to_owned).collect(),
            ..Self::default()
        }
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> MdbResult<Option<String>> {
        self.prompts.push(prompt.to_owned());
        Ok(self.lines.pop_front())
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_owned());
    }
}
