// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bench precedence over a regular grid.
//!
//! Bench `b` above a block is reachable within a horizontal radius of
//! `b * siz_z / tan(slope)`. Every block of that bench whose centroid lies
//! inside the radius (an ellipse in index space when `siz_x != siz_y`) must
//! be mined first. Grid rows grow upward with `iz`, so all offsets are
//! positive.

use pit_core::{Precedence, PrecedenceBuilder};
use tracing::debug;

use crate::error::ModelError;
use crate::grid::Grid;
use crate::params::PrecedenceParams;

/// Relative slack on the radius so blocks exactly on the cone are included.
const RADIUS_SLACK: f64 = 1e-9;

/// Horizontal `(dx, dy)` cells within the cone for each bench, sorted so the
/// resulting offsets ascend.
fn bench_patterns(grid: &Grid, slope: f64, benches: usize) -> Vec<Vec<(isize, isize)>> {
    let run = slope.to_radians().tan();
    (1..=benches)
        .map(|b| {
            let radius = b as f64 * grid.siz_z / run;
            let limit = radius * radius * (1.0 + RADIUS_SLACK);
            let reach_x = (radius / grid.siz_x).floor() as isize;
            let reach_y = (radius / grid.siz_y).floor() as isize;
            let mut cells = Vec::new();
            for dy in -reach_y..=reach_y {
                for dx in -reach_x..=reach_x {
                    let hx = dx as f64 * grid.siz_x;
                    let hy = dy as f64 * grid.siz_y;
                    if hx * hx + hy * hy <= limit {
                        cells.push((dx, dy));
                    }
                }
            }
            cells
        })
        .collect()
}

/// Builds bench precedence for every block of `grid`.
pub fn bench_precedence(
    grid: &Grid,
    params: &PrecedenceParams,
) -> Result<Precedence, ModelError> {
    let blocks = grid.validate()?;
    if params.method != 1 {
        return Err(ModelError::UnsupportedPrecedence(params.method));
    }
    let slope = params.slope;
    if slope.is_nan() || slope <= 0.0 || slope > 90.0 {
        return Err(ModelError::Slope(slope));
    }

    let benches = params.num_benches.min(grid.num_z - 1);
    let patterns = bench_patterns(grid, slope, benches);
    let mut builder = PrecedenceBuilder::with_capacity(blocks);
    let mut offsets: Vec<u32> = Vec::new();
    let mut arcs = 0usize;

    for k in 0..blocks {
        offsets.clear();
        let (ix, iy, iz) = (grid.ix(k), grid.iy(k), grid.iz(k));
        for (b, cells) in patterns.iter().enumerate() {
            let z = iz + b + 1;
            if z >= grid.num_z {
                break;
            }
            for &(dx, dy) in cells {
                let (Some(x), Some(y)) = (ix.checked_add_signed(dx), iy.checked_add_signed(dy))
                else {
                    continue;
                };
                if x < grid.num_x && y < grid.num_y {
                    offsets.push((grid.index(x, y, z) - k) as u32);
                }
            }
        }
        offsets.sort_unstable();
        arcs += offsets.len();
        builder.push(&offsets);
    }

    let precedence = builder.build()?;
    debug!(
        blocks,
        benches,
        slope,
        arcs,
        lists = precedence.defs().len(),
        "built bench precedence"
    );
    Ok(precedence)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn cube(n: usize) -> Grid {
        Grid {
            num_x: n,
            num_y: n,
            num_z: n,
            min_x: 0.0,
            min_y: 0.0,
            min_z: 0.0,
            siz_x: 10.0,
            siz_y: 10.0,
            siz_z: 10.0,
        }
    }

    fn benches(slope: f64, num_benches: usize) -> PrecedenceParams {
        PrecedenceParams {
            method: 1,
            slope,
            num_benches,
        }
    }

    #[test]
    fn forty_five_degrees_takes_the_cross_above() {
        let pre = bench_precedence(&cube(3), &benches(45.0, 1)).unwrap();
        assert_eq!(pre.len(), 27);
        // (1,1,0) needs (1,0,1) (0,1,1) (1,1,1) (2,1,1) (1,2,1).
        assert_eq!(pre.lookup(4), Some(&[6u32, 8, 9, 10, 12][..]));
        // Corner keeps only the cells inside the grid.
        assert_eq!(pre.lookup(0), Some(&[9u32, 10, 12][..]));
        for k in 18..27 {
            assert!(pre.lookup(k).is_none());
        }
    }

    #[test]
    fn vertical_walls_only_look_straight_up() {
        let pre = bench_precedence(&cube(3), &benches(90.0, 2)).unwrap();
        assert_eq!(pre.lookup(0), Some(&[9u32, 18][..]));
        assert_eq!(pre.lookup(13), Some(&[9u32][..]));
    }

    #[test]
    fn interior_blocks_share_one_list() {
        let pre = bench_precedence(&cube(5), &benches(45.0, 1)).unwrap();
        let centre = pre.keys()[5 + 5 + 2];
        assert_eq!(pre.keys()[5 + 5 + 3], centre);
        assert_eq!(pre.keys()[2 * 5 + 5 + 2], centre);
        pre.validate().unwrap();
    }

    #[test]
    fn zero_benches_leave_blocks_free() {
        let pre = bench_precedence(&cube(3), &benches(45.0, 0)).unwrap();
        assert_eq!(pre.arc_count(), 0);
    }

    #[test]
    fn bad_slopes_are_rejected() {
        for slope in [0.0, -10.0, 91.0, f64::NAN] {
            assert!(matches!(
                bench_precedence(&cube(2), &benches(slope, 1)),
                Err(ModelError::Slope(_))
            ));
        }
    }
}
