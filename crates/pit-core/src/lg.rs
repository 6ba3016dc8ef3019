// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Lerchs–Grossmann spanning-tree restructuring.
//!
//! Every block is a vertex of a forest hanging from a virtual root. Each
//! vertex owns exactly one edge toward the root (`root_edge`); the edge mass
//! is the total value of the subtree it separates from the root. A branch
//! (subtree under one root edge) is selected when its mass is positive.
//!
//! Orientation follows the precedence relation: an edge from `source` to
//! `target` means `source` requires `target`. `Plus` edges point away from
//! the root (`source` is the parent), `Minus` edges point toward it
//! (`target` is the parent). A non-root edge is strong when a positive
//! `Plus` subtree or a non-positive `Minus` subtree could stand on its own;
//! normalization cuts strong edges until only root edges carry decisions.
//!
//! Vertices and edges live in call-local arenas addressed by index. The
//! virtual root is the sentinel `ROOT` and never occupies an arena slot.
use tracing::debug;

use crate::engine::{validate_input, PitSolver, Solution};
use crate::error::PitError;
use crate::precedence::Precedence;
use crate::progress::SolveContext;

const ROOT: usize = usize::MAX;

const NOT_A_VERTEX: PitError = PitError::InternalCorruption("tree edge points at a missing vertex");
const NOT_AN_EDGE: PitError = PitError::InternalCorruption("vertex points at a missing edge");
const ROOT_PATH_CYCLE: PitError = PitError::InternalCorruption("cycle on path to root");
const EMPTY_PATH: PitError = PitError::InternalCorruption("empty path to root");
const SAME_BRANCH: PitError = PitError::InternalCorruption("merging a branch with itself");
const STALE_ADJACENCY: PitError =
    PitError::InternalCorruption("edge missing from its parent's adjacency");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Plus,
    Minus,
}

impl Direction {
    fn flipped(self) -> Self {
        match self {
            Self::Plus => Self::Minus,
            Self::Minus => Self::Plus,
        }
    }
}

#[derive(Debug, Clone)]
struct Vertex {
    root_edge: usize,
    /// Child edges whose `target` is this vertex (`Minus` edges).
    in_edges: Vec<usize>,
    /// Child edges whose `source` is this vertex (`Plus` edges).
    out_edges: Vec<usize>,
    strong: bool,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    mass: f64,
    source: usize,
    target: usize,
    direction: Direction,
}

impl Edge {
    fn parent(&self) -> usize {
        match self.direction {
            Direction::Plus => self.source,
            Direction::Minus => self.target,
        }
    }

    fn child(&self) -> usize {
        match self.direction {
            Direction::Plus => self.target,
            Direction::Minus => self.source,
        }
    }

    fn is_strong(&self) -> bool {
        self.source != ROOT
            && self.target != ROOT
            && (self.mass > 0.0) == (self.direction == Direction::Plus)
    }
}

fn detach(list: &mut Vec<usize>, edge: usize) -> Result<(), PitError> {
    let pos = list
        .iter()
        .position(|&e| e == edge)
        .ok_or(STALE_ADJACENCY)?;
    list.swap_remove(pos);
    Ok(())
}

/// Lerchs–Grossmann engine. Single use: [`PitSolver::solve`] consumes it.
#[derive(Debug, Default)]
pub struct LgEngine {
    _private: (),
}

impl LgEngine {
    /// Creates an engine for one solve.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PitSolver for LgEngine {
    fn solve(
        self,
        values: &[f64],
        precedence: &Precedence,
        ctx: &SolveContext<'_>,
    ) -> Result<Solution, PitError> {
        validate_input(values, precedence)?;
        let n = values.len();
        if n == 0 {
            return Ok(Solution {
                selection: Vec::new(),
                moves: 0,
            });
        }

        ctx.notify("init normalized tree");
        let mut tree = Tree::new(values, precedence);

        ctx.notify("solve");
        let mut xk = 0usize;
        let mut since_change = 0usize;
        let mut moves = 0u64;
        while since_change < n {
            ctx.checkpoint()?;
            match tree.violated_requirement(xk) {
                Some(xi) => {
                    tree.move_toward_feasibility(xk, xi)?;
                    moves += 1;
                    since_change = 0;
                }
                None => since_change += 1,
            }
            xk = (xk + 1) % n;
        }

        let selection = tree.selection();
        debug!(
            blocks = n,
            moves,
            selected = selection.iter().filter(|&&s| s).count(),
            "lerchs-grossmann converged"
        );
        ctx.notify("done");
        Ok(Solution { selection, moves })
    }
}

struct Tree<'p> {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    precedence: &'p Precedence,
    strong_plusses: Vec<usize>,
    strong_minuses: Vec<usize>,
}

impl<'p> Tree<'p> {
    /// Normalized starting forest: every block hangs directly from the root.
    fn new(values: &[f64], precedence: &'p Precedence) -> Self {
        let vertices = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Vertex {
                root_edge: i,
                in_edges: Vec::new(),
                out_edges: Vec::new(),
                strong: value > 0.0,
            })
            .collect();
        let edges = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Edge {
                mass: value,
                source: ROOT,
                target: i,
                direction: Direction::Plus,
            })
            .collect();
        Self {
            vertices,
            edges,
            precedence,
            strong_plusses: Vec::new(),
            strong_minuses: Vec::new(),
        }
    }

    fn selection(&self) -> Vec<bool> {
        self.vertices.iter().map(|v| v.strong).collect()
    }

    /// First block required by a selected `xk` that is not selected itself.
    fn violated_requirement(&self, xk: usize) -> Option<usize> {
        if !self.vertices.get(xk)?.strong {
            return None;
        }
        self.precedence
            .required(xk)
            .find(|&xi| self.vertices.get(xi).is_some_and(|v| !v.strong))
    }

    fn vertex_mut(&mut self, v: usize) -> Result<&mut Vertex, PitError> {
        self.vertices.get_mut(v).ok_or(NOT_A_VERTEX)
    }

    fn edge(&self, e: usize) -> Result<&Edge, PitError> {
        self.edges.get(e).ok_or(NOT_AN_EDGE)
    }

    fn edge_mut(&mut self, e: usize) -> Result<&mut Edge, PitError> {
        self.edges.get_mut(e).ok_or(NOT_AN_EDGE)
    }

    /// Edges from `v` up to and including its branch's root edge.
    fn stack_to_root(&self, v: usize) -> Result<Vec<usize>, PitError> {
        let mut stack = Vec::new();
        let mut current = v;
        loop {
            let e = self.vertices.get(current).ok_or(NOT_A_VERTEX)?.root_edge;
            stack.push(e);
            if stack.len() > self.vertices.len() {
                return Err(ROOT_PATH_CYCLE);
            }
            current = self.edge(e)?.parent();
            if current == ROOT {
                return Ok(stack);
            }
        }
    }

    fn queue_if_strong(&mut self, e: usize) -> Result<(), PitError> {
        let edge = *self.edge(e)?;
        if edge.is_strong() {
            match edge.direction {
                Direction::Plus => self.strong_plusses.push(e),
                Direction::Minus => self.strong_minuses.push(e),
            }
        }
        Ok(())
    }

    /// Hangs the branch of strong `xk` under weak `xi` through a new
    /// `xk -> xi` edge, then renormalizes and refreshes vertex strength.
    fn move_toward_feasibility(&mut self, xk: usize, xi: usize) -> Result<(), PitError> {
        let mut xk_path = self.stack_to_root(xk)?;
        let xi_path = self.stack_to_root(xi)?;
        let link = xk_path.pop().ok_or(EMPTY_PATH)?;
        let xi_root_edge = *xi_path.last().ok_or(EMPTY_PATH)?;
        if xi_root_edge == link {
            return Err(SAME_BRANCH);
        }

        // The old root edge of xk's branch becomes the new link.
        let base = {
            let edge = self.edge_mut(link)?;
            edge.source = xk;
            edge.target = xi;
            edge.direction = Direction::Minus;
            edge.mass
        };
        self.vertex_mut(xk)?.root_edge = link;
        self.vertex_mut(xi)?.in_edges.push(link);
        self.queue_if_strong(link)?;

        // Re-root xk's branch at xk, walking down from the old branch root.
        for &e in xk_path.iter().rev() {
            let edge = *self.edge(e)?;
            let (far, near) = (edge.parent(), edge.child());
            match edge.direction {
                Direction::Plus => {
                    detach(&mut self.vertex_mut(far)?.out_edges, e)?;
                    self.vertex_mut(near)?.in_edges.push(e);
                }
                Direction::Minus => {
                    detach(&mut self.vertex_mut(far)?.in_edges, e)?;
                    self.vertex_mut(near)?.out_edges.push(e);
                }
            }
            self.vertex_mut(far)?.root_edge = e;
            let edge = self.edge_mut(e)?;
            edge.direction = edge.direction.flipped();
            edge.mass = base - edge.mass;
            self.queue_if_strong(e)?;
        }

        for &e in &xi_path {
            self.edge_mut(e)?.mass += base;
            self.queue_if_strong(e)?;
        }

        let cut = self.normalize()?;
        let merged = self.edge(xi_root_edge)?.mass > 0.0;
        self.set_branch(xi_root_edge, merged)?;
        for e in cut {
            let positive = self.edge(e)?.mass > 0.0;
            self.set_branch(e, positive)?;
        }
        Ok(())
    }

    /// Cuts queued strong edges until none remain; returns the new root edges.
    fn normalize(&mut self) -> Result<Vec<usize>, PitError> {
        let mut cut = Vec::new();
        while let Some(e) = self
            .strong_plusses
            .pop()
            .or_else(|| self.strong_minuses.pop())
        {
            let edge = *self.edge(e)?;
            if !edge.is_strong() {
                continue;
            }
            let parent = edge.parent();
            self.subtract_to_root(parent, edge.mass)?;
            match edge.direction {
                Direction::Plus => {
                    detach(&mut self.vertex_mut(parent)?.out_edges, e)?;
                    self.edge_mut(e)?.source = ROOT;
                }
                Direction::Minus => {
                    detach(&mut self.vertex_mut(parent)?.in_edges, e)?;
                    let edge = self.edge_mut(e)?;
                    edge.direction = Direction::Plus;
                    edge.target = edge.source;
                    edge.source = ROOT;
                }
            }
            cut.push(e);
        }
        Ok(cut)
    }

    /// Removes `mass` from every edge between `v` and the root.
    fn subtract_to_root(&mut self, v: usize, mass: f64) -> Result<(), PitError> {
        let mut current = v;
        let mut steps = 0usize;
        while current != ROOT {
            steps += 1;
            if steps > self.vertices.len() {
                return Err(ROOT_PATH_CYCLE);
            }
            let e = self.vertices.get(current).ok_or(NOT_A_VERTEX)?.root_edge;
            let edge = self.edge_mut(e)?;
            edge.mass -= mass;
            current = edge.parent();
            self.queue_if_strong(e)?;
        }
        Ok(())
    }

    /// Marks every vertex under root edge `e` as selected or not.
    fn set_branch(&mut self, e: usize, strong: bool) -> Result<(), PitError> {
        let mut stack = vec![self.edge(e)?.child()];
        let mut visited = 0usize;
        while let Some(v) = stack.pop() {
            visited += 1;
            if visited > self.vertices.len() {
                return Err(ROOT_PATH_CYCLE);
            }
            let vertex = self.vertices.get_mut(v).ok_or(NOT_A_VERTEX)?;
            vertex.strong = strong;
            for &child in &vertex.out_edges {
                stack.push(self.edges.get(child).ok_or(NOT_AN_EDGE)?.target);
            }
            for &child in &vertex.in_edges {
                stack.push(self.edges.get(child).ok_or(NOT_AN_EDGE)?.source);
            }
        }
        Ok(())
    }
}
