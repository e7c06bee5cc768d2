//! rustyline-backed operator input.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use libminidbg::{LineReader, MdbError, MdbResult};
use log::{debug, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Line editor with optional on-disk history.
pub struct Editor {
    inner: DefaultEditor,
    history: Option<PathBuf>,
}

impl Editor {
    pub fn new(history: Option<PathBuf>) -> Result<Self> {
        let mut inner = DefaultEditor::new()?;
        if let Some(path) = &history {
            // A missing file just means a fresh history.
            if let Err(err) = inner.load_history(path) {
                debug!("no history loaded from {}: {err}", path.display());
            }
        }
        Ok(Self { inner, history })
    }

    /// Persist history if a file was configured.
    pub fn save(&mut self) {
        if let Some(path) = &self.history {
            if let Err(err) = self.inner.save_history(path) {
                warn!("could not save history to {}: {err}", path.display());
            }
        }
    }
}

impl LineReader for Editor {
    fn read_line(&mut self, prompt: &str) -> MdbResult<Option<String>> {
        match self.inner.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
            Err(ReadlineError::Io(err)) => Err(MdbError::Io(err)),
            Err(err) => Err(MdbError::Io(io::Error::other(err.to_string()))),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(err) = self.inner.add_history_entry(line) {
            warn!("could not record history entry: {err}");
        }
    }
}
