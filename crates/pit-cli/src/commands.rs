// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Subcommand implementations.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{bail, Context, Result};
use pit_app_core::config::{ConfigService, ConfigStore};
use pit_app_core::params::{RunParams, DEFAULT_PARAMS};
use pit_app_core::pipeline::{load_model, network_for, run as run_pipeline, BlockModel};
use pit_config_fs::FsConfigStore;
use pit_core::{SolveContext, TracingProgressSink};
use tracing::info;

use crate::cli::{GraphArgs, ModelArgs, RunArgs};
use crate::output::summary_table;

pub fn version_line() -> String {
    format!("pitopt {}", env!("CARGO_PKG_VERSION"))
}

fn config_store(config_dir: Option<&Path>) -> Result<FsConfigStore> {
    let store = match config_dir {
        Some(dir) => FsConfigStore::with_base(dir),
        None => FsConfigStore::new(),
    };
    store.context("failed to open the config directory")
}

/// A path to an existing file wins; anything else names a stored set.
fn load_params(spec: &str, config_dir: Option<&Path>) -> Result<RunParams> {
    let path = Path::new(spec);
    if path.is_file() {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read parameters {}", path.display()))?;
        return RunParams::from_json(&bytes)
            .with_context(|| format!("invalid parameters in {}", path.display()));
    }
    let service = ConfigService::new(config_store(config_dir)?);
    match service.load::<RunParams>(spec) {
        Ok(Some(params)) => Ok(params),
        Ok(None) => bail!("no parameter file or stored parameter set named {spec:?}"),
        Err(e) => Err(e).with_context(|| format!("invalid stored parameter set {spec:?}")),
    }
}

fn load(model: &ModelArgs) -> Result<(RunParams, BlockModel)> {
    let params = load_params(&model.params, model.config_dir.as_deref())?;
    info!(grid = %params.input.grid, "grid");
    let block_model = load_model(&model.input, &params)
        .with_context(|| format!("failed to load {}", model.input.display()))?;
    Ok((params, block_model))
}

pub fn run(args: &RunArgs) -> Result<()> {
    let (mut params, model) = load(&args.model)?;
    if let Some(engine) = args.engine {
        params.optimization.engine = engine;
    }
    if let Some(threads) = args.threads {
        params.threads = threads;
    }

    info!("pitopt begin");
    let sink = TracingProgressSink;
    let ctx = SolveContext::new().with_progress(&sink);
    let summary = run_pipeline(&model, &params, &ctx).context("optimization failed")?;
    info!("pitopt finished");

    if args.json {
        serde_json::to_writer_pretty(io::stdout().lock(), &summary)?;
        println!();
    } else {
        println!(
            "engine: {}  blocks: {}  retained: {}",
            summary.engine, summary.blocks, summary.retained
        );
        println!("{}", summary_table(&summary));
    }
    Ok(())
}

pub fn graph(args: &GraphArgs) -> Result<()> {
    let (params, model) = load(&args.model)?;
    let (network, _) = network_for(&model, &params, args.realization, &SolveContext::default())
        .context("failed to build the flow network")?;
    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    network
        .write_dimacs(BufWriter::new(file))
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        nodes = network.node_count(),
        arcs = network.arcs().len(),
        output = %args.output.display(),
        "wrote DIMACS network"
    );
    Ok(())
}

pub fn params(save: Option<&str>, config_dir: Option<&Path>) -> Result<()> {
    if let Some(name) = save {
        let store = config_store(config_dir)?;
        store
            .save_raw(name, DEFAULT_PARAMS.as_bytes())
            .with_context(|| format!("failed to store parameter set {name:?}"))?;
        info!(name, path = %store.path_for(name).display(), "stored default parameters");
    }
    print!("{DEFAULT_PARAMS}");
    Ok(())
}
