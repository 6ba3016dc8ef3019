// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! pitopt entrypoint.
//!
//! # Usage
//! ```text
//! pitopt <command> [options]
//! ```
//!
//! Commands: `run` solves every realization of a block model, `graph`
//! writes one realization's flow network in DIMACS format, `params` prints
//! the annotated default parameters and `version` prints the program
//! version. The CLI exits with code `0` on success and non-zero on error.

#![deny(rust_2018_idioms)]
// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod logging;
mod output;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log.as_deref())?;

    match cli.command {
        Command::Run(args) => commands::run(&args),
        Command::Graph(args) => commands::graph(&args),
        Command::Params { save, config_dir } => {
            commands::params(save.as_deref(), config_dir.as_deref())
        }
        Command::Version => {
            println!("{}", commands::version_line());
            Ok(())
        }
    }
}
