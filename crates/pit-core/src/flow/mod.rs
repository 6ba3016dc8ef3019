// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Source/sink network for the closure problem.
//!
//! Node `1` is the source, node `N + 2` the sink and node `i + 2` block `i`.
//! Non-negative blocks receive an arc from the source, negative blocks an arc
//! to the sink, both with capacity `round(|value| * precision)`. Every
//! precedence arc becomes an arc of [`INFINITE_CAPACITY`] so a finite cut can
//! never separate a block from a block it requires. The source side of a
//! minimum cut is the optimal pit.
use std::io::{self, Write};

use tracing::debug;

use crate::engine::{validate_input, PitSolver, Solution};
use crate::error::PitError;
use crate::precedence::Precedence;
use crate::progress::SolveContext;

mod mincut;

pub use mincut::{min_cut, MinCut, MinCutOptions};

/// Capacity of precedence arcs.
pub const INFINITE_CAPACITY: i64 = i64::MAX;

/// Node id of the source.
pub const SOURCE: usize = 1;

/// Directed capacitated arc between 1-based node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowArc {
    /// Tail node id.
    pub tail: usize,
    /// Head node id.
    pub head: usize,
    /// Integer capacity.
    pub capacity: i64,
}

/// Capacitated network with 1-based node ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNetwork {
    blocks: usize,
    arcs: Vec<FlowArc>,
}

impl FlowNetwork {
    /// Builds the network for one realization.
    ///
    /// # Errors
    /// [`PitError::ShapeMismatch`] or [`PitError::NonFiniteValue`] on bad
    /// input, [`PitError::CapacityOverflow`] when a scaled value or the sum of
    /// either terminal side does not fit the capacity range, and
    /// [`PitError::Cancelled`] when the context's flag is raised.
    pub fn build(
        values: &[f64],
        precedence: &Precedence,
        precision: f64,
        ctx: &SolveContext<'_>,
    ) -> Result<Self, PitError> {
        validate_input(values, precedence)?;
        let blocks = values.len();
        let sink = blocks + 2;
        let mut arcs = Vec::with_capacity(blocks + precedence.arc_count());
        let mut supply = 0i64;
        let mut demand = 0i64;

        for (i, &value) in values.iter().enumerate() {
            ctx.checkpoint()?;
            let capacity = scale(value, precision).ok_or(PitError::CapacityOverflow { block: i })?;
            if value < 0.0 {
                demand = demand
                    .checked_add(capacity)
                    .ok_or(PitError::CapacityOverflow { block: i })?;
                arcs.push(FlowArc {
                    tail: i + 2,
                    head: sink,
                    capacity,
                });
            } else {
                supply = supply
                    .checked_add(capacity)
                    .ok_or(PitError::CapacityOverflow { block: i })?;
                arcs.push(FlowArc {
                    tail: SOURCE,
                    head: i + 2,
                    capacity,
                });
            }
            arcs.extend(precedence.required(i).map(|j| FlowArc {
                tail: i + 2,
                head: j + 2,
                capacity: INFINITE_CAPACITY,
            }));
        }

        debug!(
            nodes = blocks + 2,
            arcs = arcs.len(),
            supply,
            demand,
            "built flow network"
        );
        Ok(Self { blocks, arcs })
    }

    /// Number of blocks in the network.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Number of nodes, terminals included.
    pub fn node_count(&self) -> usize {
        self.blocks + 2
    }

    /// Node id of the sink.
    pub fn sink(&self) -> usize {
        self.blocks + 2
    }

    /// All arcs in construction order.
    pub fn arcs(&self) -> &[FlowArc] {
        &self.arcs
    }

    /// Writes the network in DIMACS max-flow format.
    ///
    /// # Errors
    /// Propagates I/O errors from `out`.
    pub fn write_dimacs<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "c ultimate pit network, {} blocks", self.blocks)?;
        writeln!(out, "p max {} {}", self.node_count(), self.arcs.len())?;
        writeln!(out, "n {SOURCE} s")?;
        writeln!(out, "n {} t", self.sink())?;
        for arc in &self.arcs {
            writeln!(out, "a {} {} {}", arc.tail, arc.head, arc.capacity)?;
        }
        out.flush()
    }
}

/// `round(|value| * precision)` when it fits below [`INFINITE_CAPACITY`].
fn scale(value: f64, precision: f64) -> Option<i64> {
    let scaled = (value.abs() * precision).round();
    (scaled.is_finite() && scaled < INFINITE_CAPACITY as f64).then_some(scaled as i64)
}

/// Flow-network engine. Single use: [`PitSolver::solve`] consumes it.
#[derive(Debug, Clone, Copy)]
pub struct FlowEngine {
    precision: f64,
    options: MinCutOptions,
}

impl FlowEngine {
    /// Creates an engine scaling values by `precision`.
    pub fn new(precision: f64, options: MinCutOptions) -> Self {
        Self { precision, options }
    }

    /// Scale applied to values before rounding.
    pub fn precision(&self) -> f64 {
        self.precision
    }
}

impl PitSolver for FlowEngine {
    fn solve(
        self,
        values: &[f64],
        precedence: &Precedence,
        ctx: &SolveContext<'_>,
    ) -> Result<Solution, PitError> {
        ctx.notify("build network");
        let network = FlowNetwork::build(values, precedence, self.precision, ctx)?;
        ctx.notify("solve");
        let cut = min_cut(&network, self.options, ctx)?;
        let selection = (0..network.blocks())
            .map(|i| cut.on_source_side(i + 2))
            .collect();
        ctx.notify("done");
        Ok(Solution {
            selection,
            moves: cut.pushes,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::precedence::MISSING;

    fn scenario(values: &[f64]) -> (Vec<f64>, Precedence) {
        let pre = Precedence::new(vec![0, MISSING, MISSING], vec![vec![1]]).unwrap();
        (values.to_vec(), pre)
    }

    fn solve(values: &[f64], pre: &Precedence) -> Vec<bool> {
        FlowEngine::new(100.0, MinCutOptions::default())
            .solve(values, pre, &SolveContext::default())
            .unwrap()
            .selection
    }

    #[test]
    fn network_layout_matches_node_numbering() {
        let (values, pre) = scenario(&[3.0, -1.0, 5.0]);
        let net = FlowNetwork::build(&values, &pre, 100.0, &SolveContext::default()).unwrap();
        assert_eq!(net.node_count(), 5);
        assert_eq!(
            net.arcs(),
            &[
                FlowArc {
                    tail: 1,
                    head: 2,
                    capacity: 300
                },
                FlowArc {
                    tail: 2,
                    head: 3,
                    capacity: INFINITE_CAPACITY
                },
                FlowArc {
                    tail: 3,
                    head: 5,
                    capacity: 100
                },
                FlowArc {
                    tail: 1,
                    head: 4,
                    capacity: 500
                },
            ]
        );
    }

    #[test]
    fn dimacs_output_lists_problem_terminals_and_arcs() {
        let (values, pre) = scenario(&[0.5, -1.0, 5.0]);
        let net = FlowNetwork::build(&values, &pre, 10.0, &SolveContext::default()).unwrap();
        let mut buf = Vec::new();
        net.write_dimacs(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().skip(1).collect();
        let precedence_arc = format!("a 2 3 {INFINITE_CAPACITY}");
        assert_eq!(
            lines,
            vec![
                "p max 5 4",
                "n 1 s",
                "n 5 t",
                "a 1 2 5",
                precedence_arc.as_str(),
                "a 3 5 10",
                "a 1 4 50",
            ]
        );
    }

    #[test]
    fn forced_inclusion_and_exclusion() {
        let (values, pre) = scenario(&[3.0, -1.0, 5.0]);
        assert_eq!(solve(&values, &pre), vec![true, true, true]);
        let (values, pre) = scenario(&[0.5, -1.0, 5.0]);
        assert_eq!(solve(&values, &pre), vec![false, false, true]);
    }

    #[test]
    fn oversized_values_overflow_capacity() {
        let pre = Precedence::unconstrained(2);
        let err = FlowNetwork::build(&[1e300, 1.0], &pre, 100.0, &SolveContext::default())
            .unwrap_err();
        assert_eq!(err, PitError::CapacityOverflow { block: 0 });
        let half = (i64::MAX / 2) as f64;
        let err = FlowNetwork::build(&[half, half], &pre, 1.0, &SolveContext::default())
            .unwrap_err();
        assert_eq!(err, PitError::CapacityOverflow { block: 1 });
    }
}
