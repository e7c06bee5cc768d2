//! Operator command parsing and dispatch.

use log::debug;

use crate::errors::{MdbError, MdbResult};
use crate::trace::{TraceController, TraceePort, WaitOutcome};

/// Commands understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Resume the tracee until its next stop or exit.
    Continue,
}

/// Lookup table in priority order: when a keyword prefixes several names,
/// the first entry wins.
pub const COMMANDS: &[Command] = &[Command::Continue];

impl Command {
    /// Full name used for prefix matching.
    pub fn name(self) -> &'static str {
        match self {
            Command::Continue => "continue",
        }
    }
}

/// Resolve a possibly abbreviated keyword (`c`, `cont`, ...) to a command.
pub fn resolve(keyword: &str) -> Option<Command> {
    COMMANDS
        .iter()
        .copied()
        .find(|command| is_prefix(keyword, command.name()))
}

/// True when `s` is a non-empty prefix of `of`.
pub fn is_prefix(s: &str, of: &str) -> bool {
    !s.is_empty() && of.starts_with(s)
}

/// Split a line into whitespace-separated tokens.
pub fn split_line(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// One line of input broken into keyword and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub keyword: &'a str,
    pub args: Vec<&'a str>,
}

impl<'a> ParsedLine<'a> {
    /// `None` for blank lines.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut tokens = split_line(line).into_iter();
        let keyword = tokens.next()?;
        Some(Self {
            keyword,
            args: tokens.collect(),
        })
    }
}

/// What a dispatched line did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Blank input, nothing ran.
    Empty,
    /// A control request ran to completion with this outcome.
    Outcome(WaitOutcome),
}

/// Run the command on `line` against the tracee. Blocks until the command
/// has completed.
pub fn dispatch<P: TraceePort>(
    controller: &mut TraceController<P>,
    line: &str,
) -> MdbResult<Dispatched> {
    let Some(parsed) = ParsedLine::parse(line) else {
        return Ok(Dispatched::Empty);
    };

    let command = resolve(parsed.keyword).ok_or_else(|| MdbError::UnknownCommand {
        keyword: parsed.keyword.to_owned(),
    })?;
    debug!("dispatching {command:?} with args {:?}", parsed.args);

    match command {
        Command::Continue => controller.continue_execution().map(Dispatched::Outcome),
    }
}
