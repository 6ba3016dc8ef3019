// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deduplicated precedence store and mask-driven compaction.
//!
//! For block `i` with `keys[i] = k`, every offset `off` in `defs[k]` names
//! block `i + off` as a block that must be selected whenever `i` is. Offsets
//! are strictly positive and stay inside the model, so increasing block order
//! is already a topological order of the precedence relation. Closure and
//! compaction both rely on that to run as a single linear pass.
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::PitError;

/// Key sentinel for blocks without precedence.
pub const MISSING: u32 = u32::MAX;

/// Compact "which blocks must be removed before this one" relation.
///
/// Many blocks share an identical offset list (the slope cone away from model
/// boundaries), so lists are stored once in `defs` and referenced by index
/// from `keys`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Precedence {
    keys: Vec<u32>,
    defs: Vec<Vec<u32>>,
}

/// Result of [`Precedence::compact`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compaction {
    /// Precedence over the retained blocks, in their compacted order.
    pub precedence: Precedence,
    /// `origin[j]` is the original index of compacted block `j`.
    pub origin: Vec<usize>,
}

impl Compaction {
    /// Expands a selection over compacted blocks back into the original index space.
    ///
    /// Blocks dropped by the mask come back as `false`.
    ///
    /// # Errors
    /// [`PitError::MaskShape`] when `selection` does not match the retained count.
    pub fn expand(&self, selection: &[bool], blocks: usize) -> Result<Vec<bool>, PitError> {
        if selection.len() != self.origin.len() {
            return Err(PitError::MaskShape {
                mask: selection.len(),
                blocks: self.origin.len(),
            });
        }
        let mut full = vec![false; blocks];
        for (&picked, &original) in selection.iter().zip(&self.origin) {
            let slot = full
                .get_mut(original)
                .ok_or(PitError::InternalCorruption("compaction origin past model end"))?;
            *slot = picked;
        }
        Ok(full)
    }
}

impl Precedence {
    /// Builds a store from raw keys and offset lists, validating every offset.
    ///
    /// # Errors
    /// [`PitError::UnknownOffsetList`] for a key past `defs`, and
    /// [`PitError::InvalidOffset`] for an offset that is zero or lands past
    /// the last block.
    pub fn new(keys: Vec<u32>, defs: Vec<Vec<u32>>) -> Result<Self, PitError> {
        let precedence = Self { keys, defs };
        precedence.validate()?;
        Ok(precedence)
    }

    /// A store of `blocks` blocks with no precedence at all.
    pub fn unconstrained(blocks: usize) -> Self {
        Self {
            keys: vec![MISSING; blocks],
            defs: Vec::new(),
        }
    }

    /// Number of blocks covered by the store.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` when the store covers no blocks.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Per-block keys into [`Precedence::defs`] (`MISSING` for none).
    pub fn keys(&self) -> &[u32] {
        &self.keys
    }

    /// Distinct offset lists.
    pub fn defs(&self) -> &[Vec<u32>] {
        &self.defs
    }

    /// Offsets required by block `i`, or `None` when it has no precedence.
    #[inline]
    pub fn lookup(&self, i: usize) -> Option<&[u32]> {
        match self.keys.get(i) {
            Some(&key) if key != MISSING => self.defs.get(key as usize).map(Vec::as_slice),
            _ => None,
        }
    }

    /// Iterates the blocks required by block `i`.
    pub fn required(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.lookup(i)
            .into_iter()
            .flatten()
            .map(move |&off| i + off as usize)
    }

    /// Total number of precedence arcs (shared lists counted per block).
    pub fn arc_count(&self) -> usize {
        (0..self.len())
            .map(|i| self.lookup(i).map_or(0, <[u32]>::len))
            .sum()
    }

    /// Checks that every key resolves and every offset is in `1..N-i`.
    ///
    /// # Errors
    /// Same as [`Precedence::new`].
    pub fn validate(&self) -> Result<(), PitError> {
        let blocks = self.keys.len();
        for (block, &key) in self.keys.iter().enumerate() {
            if key == MISSING {
                continue;
            }
            let offsets = self
                .defs
                .get(key as usize)
                .ok_or(PitError::UnknownOffsetList { block, key })?;
            for &offset in offsets {
                if offset == 0 || block + offset as usize >= blocks {
                    return Err(PitError::InvalidOffset {
                        block,
                        offset,
                        blocks,
                    });
                }
            }
        }
        Ok(())
    }

    /// Shrinks the store to the blocks retained by `mask`.
    ///
    /// Single backward pass: `zeroes_before[t]` counts dropped blocks at
    /// indices `>= t` seen so far, so an arc `i -> i + off` between two
    /// retained blocks becomes `off - (current_zeroes - zeroes_before[i + off])`
    /// in compacted numbering. Arcs into dropped blocks disappear. A new
    /// offset list is only compared against the most recently emitted one,
    /// which keeps the pass streaming at the cost of occasional duplicates in
    /// `defs`.
    ///
    /// # Errors
    /// [`PitError::MaskShape`] when the mask length differs from the block
    /// count and [`PitError::RetainedCount`] when `retained` disagrees with
    /// the number of `true` entries.
    pub fn compact(&self, mask: &[bool], retained: usize) -> Result<Compaction, PitError> {
        let blocks = self.len();
        if mask.len() != blocks {
            return Err(PitError::MaskShape {
                mask: mask.len(),
                blocks,
            });
        }
        let actual = mask.iter().filter(|&&kept| kept).count();
        if actual != retained {
            return Err(PitError::RetainedCount {
                declared: retained,
                actual,
            });
        }

        let mut zeroes_before = vec![0usize; blocks];
        let mut keys = vec![MISSING; retained];
        let mut origin = vec![0usize; retained];
        let mut defs: Vec<Vec<u32>> = Vec::new();
        let mut current_zeroes = 0usize;
        let mut j = retained;

        for i in (0..blocks).rev() {
            if !mask[i] {
                current_zeroes += 1;
                zeroes_before[i] = current_zeroes;
                continue;
            }
            zeroes_before[i] = current_zeroes;
            j -= 1;
            origin[j] = i;

            let Some(offsets) = self.lookup(i) else {
                continue;
            };
            let mut def = Vec::with_capacity(offsets.len());
            for &off in offsets {
                let target = i + off as usize;
                if mask[target] {
                    let skipped = current_zeroes - zeroes_before[target];
                    def.push(off - skipped as u32);
                }
            }
            if def.is_empty() {
                continue;
            }
            if defs.last() != Some(&def) {
                defs.push(def);
            }
            keys[j] = (defs.len() - 1) as u32;
        }

        debug!(
            blocks,
            retained,
            defs_before = self.defs.len(),
            defs_after = defs.len(),
            "compacted precedence"
        );
        Ok(Compaction {
            precedence: Self { keys, defs },
            origin,
        })
    }
}

/// Incremental builder that shares identical offset lists across blocks.
///
/// Unlike [`Precedence::compact`], lookups go through a hash map so every
/// distinct list is stored exactly once.
#[derive(Debug, Default)]
pub struct PrecedenceBuilder {
    keys: Vec<u32>,
    defs: Vec<Vec<u32>>,
    index: FxHashMap<Vec<u32>, u32>,
}

impl PrecedenceBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty builder with room for `blocks` blocks.
    pub fn with_capacity(blocks: usize) -> Self {
        Self {
            keys: Vec::with_capacity(blocks),
            ..Self::default()
        }
    }

    /// Appends the next block with the given offsets (empty means no precedence).
    pub fn push(&mut self, offsets: &[u32]) -> &mut Self {
        if offsets.is_empty() {
            self.keys.push(MISSING);
            return self;
        }
        let key = match self.index.get(offsets) {
            Some(&key) => key,
            None => {
                let key = self.defs.len() as u32;
                self.defs.push(offsets.to_vec());
                self.index.insert(offsets.to_vec(), key);
                key
            }
        };
        self.keys.push(key);
        self
    }

    /// Number of blocks pushed so far.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` when no block has been pushed.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Validates and freezes the store.
    ///
    /// # Errors
    /// Same as [`Precedence::new`].
    pub fn build(self) -> Result<Precedence, PitError> {
        Precedence::new(self.keys, self.defs)
    }
}
