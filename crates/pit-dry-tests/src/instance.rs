// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Seeded block models with valid precedence.
use pit_core::{PitError, Precedence, PrecedenceBuilder};

use crate::rng::XorShift64;

/// One realization of values over a precedence store.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Integer-valued block values.
    pub values: Vec<f64>,
    /// Precedence over the same blocks.
    pub precedence: Precedence,
}

/// Random DAG instance.
///
/// Each block requires up to `max_required` distinct later blocks; values
/// are integers in `[lo, hi]`.
///
/// # Errors
/// Only if the generated store fails validation, which would be a fixture bug.
pub fn random_instance(
    rng: &mut XorShift64,
    blocks: usize,
    max_required: usize,
    lo: i32,
    hi: i32,
) -> Result<Instance, PitError> {
    let mut builder = PrecedenceBuilder::with_capacity(blocks);
    for i in 0..blocks {
        let room = blocks - i - 1;
        let wanted = rng.gen_range_usize(max_required.min(room) + 1);
        let mut offsets: Vec<u32> = (0..wanted)
            .map(|_| (rng.gen_range_usize(room) + 1) as u32)
            .collect();
        offsets.sort_unstable();
        offsets.dedup();
        builder.push(&offsets);
    }
    let values = (0..blocks).map(|_| rng.gen_value(lo, hi)).collect();
    Ok(Instance {
        values,
        precedence: builder.build()?,
    })
}

/// Two-dimensional section: `layers` rows of `width` blocks.
///
/// Row `0` is the deepest. A block requires the up-to-three blocks diagonally
/// and directly above it, so row `r` lives at indices `r * width ..` and every
/// offset is positive. Shallow rows lean negative (waste), deep rows carry
/// sparse positive ore.
///
/// # Errors
/// Only if the generated store fails validation, which would be a fixture bug.
pub fn layered_instance(
    rng: &mut XorShift64,
    width: usize,
    layers: usize,
) -> Result<Instance, PitError> {
    let blocks = width * layers;
    let mut builder = PrecedenceBuilder::with_capacity(blocks);
    let mut values = Vec::with_capacity(blocks);
    for row in 0..layers {
        for x in 0..width {
            if row + 1 == layers {
                builder.push(&[]);
            } else {
                let lo = x.saturating_sub(1);
                let hi = (x + 1).min(width - 1);
                let offsets: Vec<u32> = (lo..=hi).map(|xx| (width + xx - x) as u32).collect();
                builder.push(&offsets);
            }
            let ore = row * 2 < layers && rng.gen_ratio(1, 3);
            values.push(if ore {
                rng.gen_value(5, 40)
            } else {
                rng.gen_value(-4, -1)
            });
        }
    }
    Ok(Instance {
        values,
        precedence: builder.build()?,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn random_instances_are_valid() {
        let mut rng = XorShift64::new(11);
        for blocks in [0, 1, 5, 40] {
            let inst = random_instance(&mut rng, blocks, 3, -10, 10).unwrap();
            assert_eq!(inst.values.len(), blocks);
            assert_eq!(inst.precedence.len(), blocks);
            inst.precedence.validate().unwrap();
        }
    }

    #[test]
    fn layered_top_row_is_free() {
        let mut rng = XorShift64::new(3);
        let inst = layered_instance(&mut rng, 4, 3).unwrap();
        assert_eq!(inst.precedence.len(), 12);
        for i in 8..12 {
            assert!(inst.precedence.lookup(i).is_none());
        }
        // Edge block needs two blocks above, interior block three.
        assert_eq!(inst.precedence.lookup(0), Some(&[4u32, 5][..]));
        assert_eq!(inst.precedence.lookup(1), Some(&[3u32, 4, 5][..]));
    }
}
