// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! pit-core: ultimate pit limit optimization engine.
//!
//! Blocks are dense indices `0..N`. Each block carries an economic value and
//! an optional list of strictly positive offsets naming the blocks that must
//! be mined with it. The crate provides the compact precedence encoding, mask
//! closure and compaction, and two interchangeable solvers for the resulting
//! maximum-weight closure problem.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

mod closure;
mod engine;
mod error;
/// Flow-network formulation, DIMACS export and the min-cut primitive.
pub mod flow;
mod lg;
mod precedence;
mod progress;
mod selection;

/// Mask closure and projection helpers.
pub use closure::{close, compact_realizations, compact_values, retained_count};
/// Engine selection and the shared solving contract.
pub use engine::{Engine, EngineConfig, EngineKind, PitSolver, Solution, DEFAULT_PRECISION};
/// Error taxonomy for the core.
pub use error::PitError;
/// Flow-network engine.
pub use flow::FlowEngine;
/// Lerchs–Grossmann tree restructuring engine.
pub use lg::LgEngine;
/// Precedence store, builder and compaction output.
pub use precedence::{Compaction, Precedence, PrecedenceBuilder, MISSING};
/// Progress notification and cancellation plumbing.
pub use progress::{
    ChannelProgressSink, NullProgressSink, ProgressSink, SolveContext, TracingProgressSink,
};
/// Value and feasibility helpers for selections.
pub use selection::{is_feasible, selection_value};
