// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reachability closure of block masks and value projection.
use crate::error::PitError;
use crate::precedence::Precedence;

/// Expands `mask` so every retained block also retains what it requires.
///
/// Offsets are strictly positive, so a block marked while visiting `i` has an
/// index above `i` and is visited later in the same pass. One forward sweep is
/// the full transitive closure.
pub fn close(mask: &mut [bool], precedence: &Precedence) -> Result<(), PitError> {
    if mask.len() != precedence.len() {
        return Err(PitError::MaskShape {
            mask: mask.len(),
            blocks: precedence.len(),
        });
    }
    for i in 0..mask.len() {
        if !mask[i] {
            continue;
        }
        if let Some(offsets) = precedence.lookup(i) {
            for &off in offsets {
                mask[i + off as usize] = true;
            }
        }
    }
    Ok(())
}

/// Number of retained blocks in `mask`.
pub fn retained_count(mask: &[bool]) -> usize {
    mask.iter().filter(|&&kept| kept).count()
}

/// Copies the values of retained blocks into contiguous order.
///
/// # Errors
/// [`PitError::MaskShape`] when `values` and `mask` differ in length.
pub fn compact_values(mask: &[bool], values: &[f64]) -> Result<Vec<f64>, PitError> {
    if mask.len() != values.len() {
        return Err(PitError::MaskShape {
            mask: mask.len(),
            blocks: values.len(),
        });
    }
    Ok(mask
        .iter()
        .zip(values)
        .filter_map(|(&kept, &value)| kept.then_some(value))
        .collect())
}

/// [`compact_values`] applied to every realization.
///
/// # Errors
/// As [`compact_values`], for the first mismatching realization.
pub fn compact_realizations(
    mask: &[bool],
    realizations: &[Vec<f64>],
) -> Result<Vec<Vec<f64>>, PitError> {
    realizations
        .iter()
        .map(|values| compact_values(mask, values))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::precedence::PrecedenceBuilder;

    #[test]
    fn single_pass_reaches_transitive_requirements() {
        // 0 -> 2 -> 3 -> 5, block 1 and 4 untouched.
        let mut builder = PrecedenceBuilder::new();
        builder
            .push(&[2])
            .push(&[])
            .push(&[1])
            .push(&[2])
            .push(&[])
            .push(&[]);
        let pre = builder.build().unwrap();
        let mut mask = vec![true, false, false, false, false, false];
        close(&mut mask, &pre).unwrap();
        assert_eq!(mask, vec![true, false, true, true, false, true]);
    }

    #[test]
    fn close_rejects_wrong_mask_length() {
        let pre = Precedence::unconstrained(3);
        let mut mask = vec![true; 2];
        assert_eq!(
            close(&mut mask, &pre),
            Err(PitError::MaskShape { mask: 2, blocks: 3 })
        );
    }

    #[test]
    fn value_projection_keeps_mask_order() {
        let mask = [true, false, true, true];
        let out = compact_realizations(&mask, &[vec![1.0, 2.0, 3.0, 4.0], vec![-1.0, -2.0, -3.0, -4.0]])
            .unwrap();
        assert_eq!(out, vec![vec![1.0, 3.0, 4.0], vec![-1.0, -3.0, -4.0]]);
        assert_eq!(retained_count(&mask), 3);
    }
}
