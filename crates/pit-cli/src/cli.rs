// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pitopt", author, version, about = "Ultimate pit optimization")]
pub struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Solve the ultimate pit of every realization
    Run(RunArgs),
    /// Write one realization's flow network in DIMACS max-flow format
    Graph(GraphArgs),
    /// Print the annotated default parameters
    Params {
        /// Also store the defaults as a named parameter set
        #[arg(long, value_name = "NAME")]
        save: Option<String>,
        /// Directory holding named parameter sets
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },
    /// Print the program version
    Version,
}

/// Where the model comes from.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Block value file (GEO-EAS text or gzip)
    #[arg(short, long)]
    pub input: PathBuf,
    /// Parameter file, or the name of a stored parameter set
    #[arg(short, long, value_name = "FILE|NAME")]
    pub params: String,
    /// Directory holding named parameter sets
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub model: ModelArgs,
    /// Override the engine (1 Lerchs-Grossmann, 2 min cut)
    #[arg(long)]
    pub engine: Option<u32>,
    /// Override the worker thread count (0 uses every core)
    #[arg(long)]
    pub threads: Option<usize>,
    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GraphArgs {
    #[command(flatten)]
    pub model: ModelArgs,
    /// DIMACS output file
    #[arg(short, long)]
    pub output: PathBuf,
    /// Realization to export (0-based)
    #[arg(long, default_value_t = 0)]
    pub realization: usize,
}
