//! Command-line interface for the minidbg debugger.

mod editor;

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use libminidbg::{LaunchOptions, Session};
use log::info;

use crate::editor::Editor;

/// Top-level argument parser describing the debugger interface.
#[derive(Parser, Debug)]
#[command(name = "minidbg", version, about = "A minimal Linux debugger in Rust", long_about = None)]
struct Cli {
    /// Executable to run under minidbg control.
    prog: Option<PathBuf>,

    /// Disable address space randomisation for the target.
    #[arg(long)]
    no_aslr: bool,

    /// Load command history from this file and save it on exit.
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let Some(prog) = cli.prog else {
        eprintln!("Program name not specified");
        process::exit(-1);
    };

    info!("minidbg {} starting", libminidbg::version());
    let options = LaunchOptions {
        disable_aslr: cli.no_aslr,
    };
    run_program(&prog, &options, cli.history)
}

fn run_program(prog: &Path, options: &LaunchOptions, history: Option<PathBuf>) -> Result<()> {
    info!("Launching {} with {options:?}", prog.display());
    let mut session = Session::launch(prog, options)
        .with_context(|| format!("failed to launch {}", prog.display()))?;
    println!("Started debugging process {}", session.controller().pid());

    let mut editor = Editor::new(history)?;
    let result = session.run(&mut editor, &mut io::stdout(), &mut io::stderr());
    editor.save();

    result.with_context(|| format!("debugging session for {} ended", prog.display()))
}
