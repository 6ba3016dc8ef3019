// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for model loading and the realization pipeline.

use pit_core::PitError;
use thiserror::Error;

/// Failure while building a block model from parameters and input data.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A grid axis has no blocks.
    #[error("grid axis {axis} has no blocks")]
    EmptyAxis {
        /// Axis name (`x`, `y` or `z`).
        axis: char,
    },
    /// A grid block size is zero, negative or not finite.
    #[error("grid block size on axis {axis} must be finite and positive, got {size}")]
    BlockSize {
        /// Axis name (`x`, `y` or `z`).
        axis: char,
        /// Offending size.
        size: f64,
    },
    /// The grid has more blocks than a precedence offset can address.
    #[error("grid of {blocks} blocks exceeds the addressable range")]
    GridTooLarge {
        /// Requested block count (saturated).
        blocks: usize,
    },
    /// Unknown `input.type`.
    #[error("unsupported input type {0}")]
    UnsupportedInput(u32),
    /// Unknown `precedence.method`.
    #[error("unsupported precedence method {0}")]
    UnsupportedPrecedence(u32),
    /// Slope angle outside `(0, 90]` degrees.
    #[error("slope must lie in (0, 90] degrees, got {0}")]
    Slope(f64),
    /// `ebv_column` does not name a column of the input.
    #[error("ebv_column {column} is outside 1..={available}")]
    EbvColumn {
        /// Requested 1-based column.
        column: usize,
        /// Columns the input declares.
        available: usize,
    },
    /// Malformed line in the input.
    #[error("line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },
    /// Trailing values that do not fill a whole grid.
    #[error("input holds {values} values, which is not a whole number of {blocks}-block realizations")]
    PartialRealization {
        /// Values read.
        values: usize,
        /// Blocks per realization.
        blocks: usize,
    },
    /// The input holds no values at all.
    #[error("input holds no block values")]
    NoData,
    /// I/O error while reading input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Precedence construction rejected the generated offsets.
    #[error(transparent)]
    Pit(#[from] PitError),
}

/// Failure while solving the realizations of a loaded model.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Model loading failed.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// The optimization core rejected the input or aborted.
    #[error(transparent)]
    Pit(#[from] PitError),
    /// A realization index past the loaded data.
    #[error("realization {realization} requested but only {available} loaded")]
    RealizationOutOfRange {
        /// Requested index (0-based).
        realization: usize,
        /// Number of realizations loaded.
        available: usize,
    },
}
