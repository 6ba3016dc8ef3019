// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Value and feasibility helpers for block selections.
use crate::precedence::Precedence;

/// Sum of the values of selected blocks.
///
/// Extra entries on either side are ignored.
pub fn selection_value(values: &[f64], selection: &[bool]) -> f64 {
    values
        .iter()
        .zip(selection)
        .filter_map(|(&value, &picked)| picked.then_some(value))
        .sum()
}

/// Returns `true` when every selected block has all of its required blocks selected.
pub fn is_feasible(selection: &[bool], precedence: &Precedence) -> bool {
    selection.len() == precedence.len()
        && selection
            .iter()
            .enumerate()
            .filter(|&(_, &picked)| picked)
            .all(|(i, _)| precedence.required(i).all(|j| selection[j]))
}
