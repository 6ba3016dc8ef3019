// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine selection and the shared solving contract.
use tracing::warn;

use crate::error::PitError;
use crate::flow::{FlowEngine, MinCutOptions};
use crate::lg::LgEngine;
use crate::precedence::Precedence;
use crate::progress::SolveContext;

/// Fallback scale from economic values to integer flow capacities.
pub const DEFAULT_PRECISION: f64 = 100.0;

/// Threshold of the historical precision override (see [`EngineConfig::legacy_precision`]).
const LEGACY_PRECISION_THRESHOLD: f64 = 1e6;

/// Closed set of solving strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineKind {
    /// Spanning-tree restructuring (code `1`).
    LerchsGrossmann,
    /// Source/sink network solved by minimum cut (code `2`).
    MinCut,
}

impl EngineKind {
    /// Maps a configuration code onto an engine kind.
    ///
    /// # Errors
    /// [`PitError::InvalidEngineType`] for any code other than `1` or `2`.
    pub fn from_code(code: u32) -> Result<Self, PitError> {
        match code {
            1 => Ok(Self::LerchsGrossmann),
            2 => Ok(Self::MinCut),
            other => Err(PitError::InvalidEngineType(other)),
        }
    }

    /// Configuration code of this kind.
    pub fn code(self) -> u32 {
        match self {
            Self::LerchsGrossmann => 1,
            Self::MinCut => 2,
        }
    }

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::LerchsGrossmann => "lerchs-grossmann",
            Self::MinCut => "min-cut",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Engine settings. This is the only place configuration reaches the core.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Engine code: `1` Lerchs–Grossmann, `2` min cut.
    pub engine: u32,
    /// Scale applied to values before rounding to flow capacities.
    pub precision: f64,
    /// Min cut: process active nodes lowest label first instead of highest.
    pub lowest_label: bool,
    /// Min cut: first-in first-out buckets instead of last-in first-out.
    pub fifo_buckets: bool,
    /// Reproduce the historical override that replaced every precision
    /// below 1e6 in magnitude with [`DEFAULT_PRECISION`].
    pub legacy_precision: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::LerchsGrossmann.code(),
            precision: DEFAULT_PRECISION,
            lowest_label: false,
            fifo_buckets: false,
            legacy_precision: false,
        }
    }
}

impl EngineConfig {
    /// Precision the flow engine actually uses.
    ///
    /// The configured magnitude is honoured when finite and non-zero.
    /// Otherwise, and for every magnitude below 1e6 when
    /// `legacy_precision` is set, [`DEFAULT_PRECISION`] applies.
    pub fn effective_precision(&self) -> f64 {
        let magnitude = self.precision.abs();
        if !magnitude.is_finite() || magnitude <= 0.0 {
            return DEFAULT_PRECISION;
        }
        if self.legacy_precision && magnitude < LEGACY_PRECISION_THRESHOLD {
            if (magnitude - DEFAULT_PRECISION).abs() > f64::EPSILON {
                warn!(
                    configured = self.precision,
                    used = DEFAULT_PRECISION,
                    "legacy precision override in effect"
                );
            }
            return DEFAULT_PRECISION;
        }
        magnitude
    }
}

/// Optimal selection returned by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// `selection[i]` is `true` when block `i` lies inside the pit.
    pub selection: Vec<bool>,
    /// Engine work counter: tree moves for Lerchs–Grossmann, pushes for min cut.
    pub moves: u64,
}

impl Solution {
    /// Number of selected blocks.
    pub fn selected(&self) -> usize {
        self.selection.iter().filter(|&&picked| picked).count()
    }
}

/// Shared solving contract.
///
/// Solvers consume themselves: an instance carries no state across calls
/// and all working storage is rebuilt inside `solve`.
pub trait PitSolver {
    /// Computes the maximum-value precedence-closed selection.
    ///
    /// # Errors
    /// Data-shape errors before any work starts, [`PitError::Cancelled`] when
    /// the context's flag is raised, and invariant violations on corrupted
    /// internal state.
    fn solve(
        self,
        values: &[f64],
        precedence: &Precedence,
        ctx: &SolveContext<'_>,
    ) -> Result<Solution, PitError>;
}

/// Engine chosen from configuration.
#[derive(Debug)]
pub enum Engine {
    /// Spanning-tree restructuring.
    LerchsGrossmann(LgEngine),
    /// Flow network and minimum cut.
    MinCut(FlowEngine),
}

impl Engine {
    /// Builds a fresh engine for `config`.
    ///
    /// # Errors
    /// [`PitError::InvalidEngineType`] for an unknown engine code.
    pub fn select(config: &EngineConfig) -> Result<Self, PitError> {
        let engine = match EngineKind::from_code(config.engine)? {
            EngineKind::LerchsGrossmann => Self::LerchsGrossmann(LgEngine::new()),
            EngineKind::MinCut => Self::MinCut(FlowEngine::new(
                config.effective_precision(),
                MinCutOptions {
                    lowest_label: config.lowest_label,
                    fifo_buckets: config.fifo_buckets,
                },
            )),
        };
        Ok(engine)
    }

    /// Kind of the wrapped engine.
    pub fn kind(&self) -> EngineKind {
        match self {
            Self::LerchsGrossmann(_) => EngineKind::LerchsGrossmann,
            Self::MinCut(_) => EngineKind::MinCut,
        }
    }
}

impl PitSolver for Engine {
    fn solve(
        self,
        values: &[f64],
        precedence: &Precedence,
        ctx: &SolveContext<'_>,
    ) -> Result<Solution, PitError> {
        match self {
            Self::LerchsGrossmann(engine) => engine.solve(values, precedence, ctx),
            Self::MinCut(engine) => engine.solve(values, precedence, ctx),
        }
    }
}

/// Entry checks shared by both engines.
pub(crate) fn validate_input(values: &[f64], precedence: &Precedence) -> Result<(), PitError> {
    if values.len() != precedence.len() {
        return Err(PitError::ShapeMismatch {
            values: values.len(),
            blocks: precedence.len(),
        });
    }
    if let Some(block) = values.iter().position(|v| !v.is_finite()) {
        return Err(PitError::NonFiniteValue { block });
    }
    Ok(())
}
