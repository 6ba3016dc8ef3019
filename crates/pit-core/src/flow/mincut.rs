// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Push–relabel minimum cut (preflow phase only).
//!
//! The source saturates its arcs, exact distance labels come from one
//! backward breadth-first search from the sink, and active nodes are
//! discharged from label buckets until no active node has a label below
//! `n`. At that point the preflow is maximum and the nodes that can still
//! reach the sink in the residual graph form the sink side of a minimum cut.
//! Converting the preflow into a flow is not needed for the cut and is
//! skipped.
use std::collections::VecDeque;

use tracing::debug;

use super::{FlowNetwork, SOURCE};
use crate::error::PitError;
use crate::progress::SolveContext;

/// Discharges between two cancellation checks.
const CHECK_INTERVAL: u64 = 1024;

/// Active-node selection policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinCutOptions {
    /// Discharge the lowest labelled active node first (default: highest).
    pub lowest_label: bool,
    /// Within one label, first-in first-out (default: last-in first-out).
    pub fifo_buckets: bool,
}

/// Result of [`min_cut`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinCut {
    /// Indexed by 1-based node id; slot `0` is unused.
    source_side: Vec<bool>,
    /// Capacity of the cut.
    pub value: i64,
    /// Number of push operations performed.
    pub pushes: u64,
}

impl MinCut {
    /// Returns `true` when node `id` lies on the source side of the cut.
    pub fn on_source_side(&self, id: usize) -> bool {
        self.source_side.get(id).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy)]
struct Residual {
    head: usize,
    cap: i64,
}

struct PushRelabel {
    n: usize,
    source: usize,
    sink: usize,
    /// Arc `e` and `e ^ 1` are each other's reverse.
    arcs: Vec<Residual>,
    adjacency: Vec<Vec<usize>>,
    label: Vec<usize>,
    excess: Vec<i64>,
    current: Vec<usize>,
    count: Vec<usize>,
    buckets: Vec<VecDeque<usize>>,
    cursor: usize,
    options: MinCutOptions,
    pushes: u64,
}

impl PushRelabel {
    fn new(network: &FlowNetwork, options: MinCutOptions) -> Self {
        let n = network.node_count();
        let mut arcs = Vec::with_capacity(network.arcs().len() * 2);
        let mut adjacency = vec![Vec::new(); n];
        for arc in network.arcs() {
            let (tail, head) = (arc.tail - 1, arc.head - 1);
            adjacency[tail].push(arcs.len());
            arcs.push(Residual {
                head,
                cap: arc.capacity,
            });
            adjacency[head].push(arcs.len());
            arcs.push(Residual { head: tail, cap: 0 });
        }
        Self {
            n,
            source: SOURCE - 1,
            sink: network.sink() - 1,
            arcs,
            adjacency,
            label: vec![0; n],
            excess: vec![0; n],
            current: vec![0; n],
            count: vec![0; n],
            buckets: vec![VecDeque::new(); n],
            cursor: 0,
            options,
            pushes: 0,
        }
    }

    fn saturate_source(&mut self) {
        for &e in &self.adjacency[self.source] {
            let cap = self.arcs[e].cap;
            if cap > 0 {
                let head = self.arcs[e].head;
                self.arcs[e].cap = 0;
                self.arcs[e ^ 1].cap += cap;
                self.excess[head] += cap;
                self.excess[self.source] -= cap;
            }
        }
    }

    /// Exact distance-to-sink labels; unreachable nodes get `n`.
    fn global_relabel(&mut self) {
        let n = self.n;
        self.label.iter_mut().for_each(|l| *l = n);
        self.count.iter_mut().for_each(|c| *c = 0);
        self.label[self.sink] = 0;
        self.count[0] = 1;
        let mut queue = VecDeque::from([self.sink]);
        while let Some(v) = queue.pop_front() {
            let next = self.label[v] + 1;
            for &e in &self.adjacency[v] {
                let u = self.arcs[e].head;
                if u != self.source && self.label[u] == n && self.arcs[e ^ 1].cap > 0 {
                    self.label[u] = next;
                    self.count[next] += 1;
                    queue.push_back(u);
                }
            }
        }
        self.label[self.source] = n;
        self.current.iter_mut().for_each(|c| *c = 0);
        for v in 0..n {
            if v != self.source && v != self.sink && self.excess[v] > 0 && self.label[v] < n {
                self.activate(v);
            }
        }
    }

    fn activate(&mut self, v: usize) {
        let h = self.label[v];
        self.buckets[h].push_back(v);
        self.cursor = if self.options.lowest_label {
            self.cursor.min(h)
        } else {
            self.cursor.max(h)
        };
    }

    fn pop_bucket(&mut self, h: usize) -> Option<usize> {
        if self.options.fifo_buckets {
            self.buckets[h].pop_front()
        } else {
            self.buckets[h].pop_back()
        }
    }

    /// Next active node, skipping stale bucket entries.
    fn next_active(&mut self) -> Option<usize> {
        loop {
            let h = self.cursor;
            if h >= self.n {
                return None;
            }
            match self.pop_bucket(h) {
                Some(v) if self.label[v] == h && self.excess[v] > 0 => return Some(v),
                Some(_) => {}
                None if self.options.lowest_label => self.cursor += 1,
                None if h == 0 => {
                    self.cursor = self.n;
                    return None;
                }
                None => self.cursor -= 1,
            }
        }
    }

    fn discharge(&mut self, v: usize) {
        while self.excess[v] > 0 {
            let Some(&e) = self.adjacency[v].get(self.current[v]) else {
                self.relabel(v);
                if self.label[v] < self.n {
                    self.activate(v);
                }
                return;
            };
            let Residual { head: u, cap } = self.arcs[e];
            if cap > 0 && self.label[v] == self.label[u] + 1 {
                let delta = self.excess[v].min(cap);
                self.arcs[e].cap -= delta;
                self.arcs[e ^ 1].cap += delta;
                self.excess[v] -= delta;
                let was_idle = self.excess[u] == 0;
                self.excess[u] += delta;
                self.pushes += 1;
                if was_idle && u != self.sink && u != self.source {
                    self.activate(u);
                }
            } else {
                self.current[v] += 1;
            }
        }
    }

    fn relabel(&mut self, v: usize) {
        let n = self.n;
        let old = self.label[v];
        self.count[old] -= 1;
        if self.count[old] == 0 {
            // Gap: nothing above `old` can reach the sink any more.
            for w in 0..n {
                if self.label[w] > old && self.label[w] < n {
                    self.count[self.label[w]] -= 1;
                    self.label[w] = n;
                }
            }
            self.label[v] = n;
        } else {
            let lowest = self.adjacency[v]
                .iter()
                .filter(|&&e| self.arcs[e].cap > 0)
                .map(|&e| self.label[self.arcs[e].head] + 1)
                .min()
                .unwrap_or(n)
                .min(n);
            self.label[v] = lowest;
            if lowest < n {
                self.count[lowest] += 1;
            }
        }
        self.current[v] = 0;
    }

    /// Nodes that cannot reach the sink in the residual graph, by node id.
    fn source_side(&self) -> Vec<bool> {
        let mut reaches = vec![false; self.n];
        reaches[self.sink] = true;
        let mut queue = VecDeque::from([self.sink]);
        while let Some(v) = queue.pop_front() {
            for &e in &self.adjacency[v] {
                let u = self.arcs[e].head;
                if !reaches[u] && self.arcs[e ^ 1].cap > 0 {
                    reaches[u] = true;
                    queue.push_back(u);
                }
            }
        }
        std::iter::once(false)
            .chain(reaches.into_iter().map(|r| !r))
            .collect()
    }
}

/// Computes a minimum source/sink cut of `network`.
///
/// The returned source side is the largest one among all minimum cuts.
///
/// # Errors
/// [`PitError::Cancelled`] when the context's flag is raised mid-solve.
pub fn min_cut(
    network: &FlowNetwork,
    options: MinCutOptions,
    ctx: &SolveContext<'_>,
) -> Result<MinCut, PitError> {
    let mut state = PushRelabel::new(network, options);
    state.saturate_source();
    state.cursor = if options.lowest_label { 0 } else { state.n - 1 };
    state.global_relabel();

    let mut discharges = 0u64;
    while let Some(v) = state.next_active() {
        discharges += 1;
        if discharges.is_multiple_of(CHECK_INTERVAL) {
            ctx.checkpoint()?;
        }
        state.discharge(v);
    }

    let value = state.excess[state.sink];
    debug!(
        nodes = state.n,
        discharges,
        pushes = state.pushes,
        value,
        "min cut found"
    );
    Ok(MinCut {
        source_side: state.source_side(),
        value,
        pushes: state.pushes,
    })
}
