// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end realization pipeline.
//!
//! A block that is never profitable, and is not required by one that is,
//! can never be part of an optimal pit. The pipeline seeds a mask with every
//! block positive in some realization, closes it, compacts values and
//! precedence to the retained blocks, and solves each realization on the
//! reduced model. Selections are re-expanded to grid indices.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use pit_core::flow::FlowNetwork;
use pit_core::{
    close, compact_realizations, retained_count, selection_value, Compaction, Engine, EngineKind,
    PitError, PitSolver, Precedence, SolveContext, Solution,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::ebv::read_block_values;
use crate::error::PipelineError;
use crate::grid::Grid;
use crate::params::RunParams;
use crate::slope::bench_precedence;

/// Grid, precedence and every realization of block values.
#[derive(Debug, Clone)]
pub struct BlockModel {
    /// Block grid.
    pub grid: Grid,
    /// Precedence over all grid blocks.
    pub precedence: Precedence,
    /// One value vector per realization, each of grid length.
    pub realizations: Vec<Vec<f64>>,
}

impl BlockModel {
    /// Number of blocks.
    pub fn blocks(&self) -> usize {
        self.precedence.len()
    }
}

/// Reads values from `input` and builds precedence as `params` describe.
pub fn load_model(input: &Path, params: &RunParams) -> Result<BlockModel, PipelineError> {
    params.validate()?;
    let realizations = read_block_values(input, &params.input)?;
    let precedence = bench_precedence(&params.input.grid, &params.precedence)?;
    info!(
        realizations = realizations.len(),
        blocks = precedence.len(),
        arcs = precedence.arc_count(),
        "loaded block model"
    );
    Ok(BlockModel {
        grid: params.input.grid,
        precedence,
        realizations,
    })
}

/// Marks every block that is strictly positive in at least one realization.
pub fn seed_mask(realizations: &[Vec<f64>], blocks: usize) -> Vec<bool> {
    let mut mask = vec![false; blocks];
    for values in realizations {
        for (slot, &value) in mask.iter_mut().zip(values) {
            *slot |= value > 0.0;
        }
    }
    mask
}

/// The model restricted to blocks that can matter.
#[derive(Debug, Clone)]
pub struct Reduction {
    /// Closed seed mask over the full grid.
    pub mask: Vec<bool>,
    /// Compacted precedence and the map back to grid indices.
    pub compaction: Compaction,
    /// Compacted values, one vector per realization.
    pub values: Vec<Vec<f64>>,
}

impl Reduction {
    /// Retained block count.
    pub fn retained(&self) -> usize {
        self.compaction.origin.len()
    }
}

/// Seeds, closes and compacts `model`.
pub fn reduce(model: &BlockModel) -> Result<Reduction, PitError> {
    let blocks = model.blocks();
    let mut mask = seed_mask(&model.realizations, blocks);
    close(&mut mask, &model.precedence)?;
    let retained = retained_count(&mask);
    let compaction = model.precedence.compact(&mask, retained)?;
    let values = compact_realizations(&mask, &model.realizations)?;

    let reduction = if blocks == 0 {
        0.0
    } else {
        (blocks - retained) as f64 / blocks as f64 * 100.0
    };
    info!(
        original = blocks,
        compressed = retained,
        reduction_percent = reduction,
        lists = compaction.precedence.defs().len(),
        "compressed block model"
    );
    Ok(Reduction {
        mask,
        compaction,
        values,
    })
}

/// Outcome for one realization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealizationReport {
    /// 0-based realization index.
    pub realization: usize,
    /// Blocks retained after compaction.
    pub retained: usize,
    /// Blocks in the optimal pit.
    pub selected: usize,
    /// Total value of the optimal pit.
    pub value: f64,
    /// Engine work counter.
    pub moves: u64,
    /// Optimal pit over grid indices.
    #[serde(skip)]
    pub selection: Vec<bool>,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Engine that produced the selections.
    pub engine: EngineKind,
    /// Grid block count.
    pub blocks: usize,
    /// Blocks retained after compaction.
    pub retained: usize,
    /// One report per realization, in input order.
    pub realizations: Vec<RealizationReport>,
}

/// Solves every realization of `model`.
///
/// Realizations are independent and each gets a fresh engine. With more than
/// one worker they are claimed from a shared counter by scoped threads;
/// results are reported in input order regardless.
pub fn run(
    model: &BlockModel,
    params: &RunParams,
    ctx: &SolveContext<'_>,
) -> Result<RunSummary, PipelineError> {
    let engine = Engine::select(&params.optimization)?.kind();
    ctx.notify("compress");
    let reduction = reduce(model)?;
    let count = reduction.values.len();
    let workers = params.worker_count(count);
    info!(%engine, realizations = count, workers, "solving realizations");

    let solve_one = |r: usize| -> Result<Solution, PitError> {
        let solution = Engine::select(&params.optimization)?.solve(
            &reduction.values[r],
            &reduction.compaction.precedence,
            ctx,
        )?;
        debug!(realization = r, moves = solution.moves, "realization solved");
        Ok(solution)
    };

    let mut solved: Vec<(usize, Result<Solution, PitError>)> = if workers <= 1 {
        (0..count).map(|r| (r, solve_one(r))).collect()
    } else {
        let next = AtomicUsize::new(0);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let next = &next;
                    let solve_one = &solve_one;
                    s.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let r = next.fetch_add(1, Ordering::Relaxed);
                            if r >= count {
                                break;
                            }
                            done.push((r, solve_one(r)));
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| match h.join() {
                    Ok(done) => done,
                    Err(e) => std::panic::resume_unwind(e),
                })
                .collect()
        })
    };
    solved.sort_unstable_by_key(|(r, _)| *r);

    let blocks = model.blocks();
    let mut realizations = Vec::with_capacity(count);
    for (r, outcome) in solved {
        let solution = outcome?;
        let selection = reduction.compaction.expand(&solution.selection, blocks)?;
        let value = selection_value(&model.realizations[r], &selection);
        let selected = solution.selected();
        info!(realization = r, selected, value, "optimal pit");
        realizations.push(RealizationReport {
            realization: r,
            retained: reduction.retained(),
            selected,
            value,
            moves: solution.moves,
            selection,
        });
    }
    ctx.notify("done");

    Ok(RunSummary {
        engine,
        blocks,
        retained: reduction.retained(),
        realizations,
    })
}

/// Flow network of one realization over the compacted model.
///
/// Node `j + 2` is compacted block `j`; [`Reduction::compaction`] maps it
/// back to the grid.
pub fn network_for(
    model: &BlockModel,
    params: &RunParams,
    realization: usize,
    ctx: &SolveContext<'_>,
) -> Result<(FlowNetwork, Reduction), PipelineError> {
    let available = model.realizations.len();
    if realization >= available {
        return Err(PipelineError::RealizationOutOfRange {
            realization,
            available,
        });
    }
    let reduction = reduce(model)?;
    let network = FlowNetwork::build(
        &reduction.values[realization],
        &reduction.compaction.precedence,
        params.optimization.effective_precision(),
        ctx,
    )?;
    Ok((network, reduction))
}
