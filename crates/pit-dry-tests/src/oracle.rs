// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Exhaustive optimum for tiny models.
use pit_core::{is_feasible, selection_value, Precedence};

/// Largest model [`brute_force_best`] will enumerate.
pub const MAX_ORACLE_BLOCKS: usize = 20;

/// Best achievable total value over every precedence-closed subset.
///
/// Returns `None` when the model exceeds [`MAX_ORACLE_BLOCKS`] or the
/// lengths disagree. The empty selection is always feasible, so the result
/// is never negative.
pub fn brute_force_best(values: &[f64], precedence: &Precedence) -> Option<f64> {
    let n = values.len();
    if n > MAX_ORACLE_BLOCKS || n != precedence.len() {
        return None;
    }
    let mut best = 0.0f64;
    let mut selection = vec![false; n];
    for bits in 0u32..(1u32 << n) {
        for (i, slot) in selection.iter_mut().enumerate() {
            *slot = bits & (1 << i) != 0;
        }
        if is_feasible(&selection, precedence) {
            best = best.max(selection_value(values, &selection));
        }
    }
    Some(best)
}
