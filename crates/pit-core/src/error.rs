// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Errors surfaced by the optimization core.
use thiserror::Error;

/// Errors emitted by precedence handling and the solving engines.
///
/// Configuration and data-shape errors are raised before any solving work
/// starts. Invariant violations abort the running solve; they indicate a
/// defect in the input precedence or in tree maintenance and are never
/// retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PitError {
    /// The configured engine code does not name a known engine.
    #[error("invalid engine type: {0}")]
    InvalidEngineType(u32),
    /// Value array and precedence disagree on the number of blocks.
    #[error("value count {values} does not match precedence block count {blocks}")]
    ShapeMismatch {
        /// Length of the value array.
        values: usize,
        /// Number of blocks in the precedence store.
        blocks: usize,
    },
    /// A mask does not cover exactly the blocks of the model.
    #[error("mask length {mask} does not match block count {blocks}")]
    MaskShape {
        /// Length of the mask.
        mask: usize,
        /// Number of blocks in the model.
        blocks: usize,
    },
    /// The declared retained count disagrees with the mask.
    #[error("mask retains {actual} blocks but {declared} were declared")]
    RetainedCount {
        /// Count supplied by the caller.
        declared: usize,
        /// Count of `true` entries in the mask.
        actual: usize,
    },
    /// A block value is NaN or infinite.
    #[error("block {block} has a non-finite value")]
    NonFiniteValue {
        /// Offending block index.
        block: usize,
    },
    /// An offset is zero or points past the last block.
    #[error("block {block}: offset {offset} is not in 1..{blocks}-{block}")]
    InvalidOffset {
        /// Block owning the offset list.
        block: usize,
        /// Offending offset.
        offset: u32,
        /// Number of blocks in the model.
        blocks: usize,
    },
    /// A key refers to an offset list that does not exist.
    #[error("block {block} references missing offset list {key}")]
    UnknownOffsetList {
        /// Block owning the key.
        block: usize,
        /// Offending key.
        key: u32,
    },
    /// A scaled capacity (or the sum of source capacities) is not representable.
    #[error("capacity of block {block} overflows the flow capacity range")]
    CapacityOverflow {
        /// Block whose capacity overflowed.
        block: usize,
    },
    /// Internal invariant violated (spanning tree or network corruption).
    #[error("internal invariant violated: {0}")]
    InternalCorruption(&'static str),
    /// The caller raised the cancellation flag.
    #[error("solve cancelled")]
    Cancelled,
}

impl PitError {
    /// Returns `true` for errors that indicate corrupted input or engine state.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidOffset { .. } | Self::UnknownOffsetList { .. } | Self::InternalCorruption(_)
        )
    }
}
