// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Regular block grid geometry.
//!
//! Blocks are numbered along x first, then y, then z:
//! `k = ix + iy * num_x + iz * num_x * num_y`. `min_*` is the lower corner of
//! block `(0, 0, 0)`; centroids sit half a block further in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Axis-aligned bounding box in model coordinates.
///
/// Invariant: every `min` component is at most its `max` counterpart.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    /// Lower corner `[x, y, z]`.
    pub min: [f64; 3],
    /// Upper corner `[x, y, z]`.
    pub max: [f64; 3],
}

impl Aabb {
    /// Builds a box centered at `center` with half-extents `half`.
    pub fn from_center_half_extents(center: [f64; 3], half: [f64; 3]) -> Self {
        Self {
            min: [center[0] - half[0], center[1] - half[1], center[2] - half[2]],
            max: [center[0] + half[0], center[1] + half[1], center[2] + half[2]],
        }
    }

    /// Returns `true` if `point` lies inside or on the boundary.
    pub fn contains(&self, point: [f64; 3]) -> bool {
        (0..3).all(|a| self.min[a] <= point[a] && point[a] <= self.max[a])
    }
}

/// Grid definition as it appears in run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid {
    /// Blocks along x.
    pub num_x: usize,
    /// Blocks along y.
    pub num_y: usize,
    /// Blocks along z.
    pub num_z: usize,
    /// Lower x corner.
    pub min_x: f64,
    /// Lower y corner.
    pub min_y: f64,
    /// Lower z corner.
    pub min_z: f64,
    /// Block size along x.
    pub siz_x: f64,
    /// Block size along y.
    pub siz_y: f64,
    /// Block size along z.
    pub siz_z: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            num_x: 60,
            num_y: 60,
            num_z: 13,
            min_x: 810.0,
            min_y: 110.0,
            min_z: 110.0,
            siz_x: 20.0,
            siz_y: 20.0,
            siz_z: 20.0,
        }
    }
}

impl Grid {
    /// Checks every axis and returns the block count.
    ///
    /// The count must stay below `u32::MAX` so that any forward offset fits a
    /// precedence entry.
    pub fn validate(&self) -> Result<usize, ModelError> {
        for (axis, num, siz) in [
            ('x', self.num_x, self.siz_x),
            ('y', self.num_y, self.siz_y),
            ('z', self.num_z, self.siz_z),
        ] {
            if num == 0 {
                return Err(ModelError::EmptyAxis { axis });
            }
            if !siz.is_finite() || siz <= 0.0 {
                return Err(ModelError::BlockSize { axis, size: siz });
            }
        }
        let blocks = self
            .num_x
            .checked_mul(self.num_y)
            .and_then(|layer| layer.checked_mul(self.num_z))
            .ok_or(ModelError::GridTooLarge { blocks: usize::MAX })?;
        if blocks >= u32::MAX as usize {
            return Err(ModelError::GridTooLarge { blocks });
        }
        Ok(blocks)
    }

    /// Number of blocks. Saturates on overflow; call [`Grid::validate`] first.
    pub fn count(&self) -> usize {
        self.layer().saturating_mul(self.num_z)
    }

    /// Blocks in one horizontal layer.
    pub fn layer(&self) -> usize {
        self.num_x.saturating_mul(self.num_y)
    }

    /// Index along x of block `k`.
    pub fn ix(&self, k: usize) -> usize {
        (k % self.layer()) % self.num_x
    }

    /// Index along y of block `k`.
    pub fn iy(&self, k: usize) -> usize {
        (k % self.layer()) / self.num_x
    }

    /// Index along z of block `k`.
    pub fn iz(&self, k: usize) -> usize {
        k / self.layer()
    }

    /// Linear index of `(ix, iy, iz)`.
    pub fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + iy * self.num_x + iz * self.layer()
    }

    /// Centroid of block `k`.
    pub fn centroid(&self, k: usize) -> [f64; 3] {
        [
            self.ix(k) as f64 * self.siz_x + self.min_x + self.siz_x / 2.0,
            self.iy(k) as f64 * self.siz_y + self.min_y + self.siz_y / 2.0,
            self.iz(k) as f64 * self.siz_z + self.min_z + self.siz_z / 2.0,
        ]
    }

    /// Bounding box of block `k`.
    pub fn block_aabb(&self, k: usize) -> Aabb {
        Aabb::from_center_half_extents(
            self.centroid(k),
            [self.siz_x / 2.0, self.siz_y / 2.0, self.siz_z / 2.0],
        )
    }

    /// Bounding box of the whole grid.
    pub fn aabb(&self) -> Aabb {
        Aabb {
            min: [self.min_x, self.min_y, self.min_z],
            max: [
                self.min_x + self.num_x as f64 * self.siz_x,
                self.min_y + self.num_y as f64 * self.siz_y,
                self.min_z + self.num_z as f64 * self.siz_z,
            ],
        }
    }

    /// Returns `true` if `point` falls in block `k`.
    ///
    /// Lower faces belong to the block, upper faces to its neighbour.
    pub fn contains_point(&self, k: usize, point: [f64; 3]) -> bool {
        let local = [
            point[0] - (self.ix(k) as f64 * self.siz_x + self.min_x),
            point[1] - (self.iy(k) as f64 * self.siz_y + self.min_y),
            point[2] - (self.iz(k) as f64 * self.siz_z + self.min_z),
        ];
        let size = [self.siz_x, self.siz_y, self.siz_z];
        (0..3).all(|a| 0.0 <= local[a] && local[a] < size[a])
    }

    /// Moves the origin to half a block, as GSLIB grids expect.
    pub fn adjust_for_gslib(&mut self) {
        self.min_x = self.siz_x / 2.0;
        self.min_y = self.siz_y / 2.0;
        self.min_z = self.siz_z / 2.0;
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "x ={:7} {:12.1}  {:10.1}", self.num_x, self.min_x, self.siz_x)?;
        writeln!(f, "y ={:7} {:12.1}  {:10.1}", self.num_y, self.min_y, self.siz_y)?;
        write!(f, "z ={:7} {:12.1}  {:10.1}", self.num_z, self.min_z, self.siz_z)
    }
}
