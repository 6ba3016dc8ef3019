// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Run parameters: input description, precedence rule, engine settings.

use pit_core::{EngineConfig, EngineKind};
use serde::{Deserialize, Serialize};

use crate::config::{from_commented_json, ConfigError};
use crate::error::ModelError;
use crate::grid::Grid;

/// Annotated default parameter file printed by `pitopt params`.
///
/// Parses to [`RunParams::default`].
pub const DEFAULT_PARAMS: &str = r#"{
// input
//   type
//     1 (GEO-EAS / GSLIB text file, optionally gzipped. Pre-calculated EBV)
//     2 (gzip file, EBV only, one value per line, no header)
//   grid (the block grid)
//     num_x, num_y, num_z (number of blocks)
//     min_x, min_y, min_z (lower corner of the first block)
//     siz_x, siz_y, siz_z (block size)
//   ebv_column (economic block value column, 1 indexed, type 1 only)
"input": {
  "type": 1,
  "grid": {
    "num_x": 60, "min_x": 810.0, "siz_x": 20.0,
    "num_y": 60, "min_y": 110.0, "siz_y": 20.0,
    "num_z": 13, "min_z": 110.0, "siz_z": 20.0
  },
  "ebv_column": 1
},

// precedence
//   method
//     1 (benches)
//   slope (overall slope angle in degrees, 0 < slope <= 90)
//   num_benches (benches above a block that constrain it)
"precedence": {
  "method": 1,
  "slope": 45.0,
  "num_benches": 8
},

// optimization
//   engine
//     1 (Lerchs-Grossmann)
//     2 (flow network, minimum cut)
//   precision (value scale before rounding to flow capacities)
//   lowest_label, fifo_buckets (minimum cut active node policy)
//   legacy_precision (replace every precision below 1e6 with 100)
"optimization": {
  "engine": 1,
  "precision": 100.0,
  "lowest_label": false,
  "fifo_buckets": false,
  "legacy_precision": false
},

// threads (realizations solved concurrently)
"threads": 1
}
"#;

/// How block values are stored in the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// GEO-EAS text: title, variable count, names, then rows.
    GeoEas,
    /// Headerless single column, gzip compressed.
    GzipColumn,
}

impl InputFormat {
    /// Maps the parameter file's `input.type` code.
    pub fn from_code(code: u32) -> Result<Self, ModelError> {
        match code {
            1 => Ok(Self::GeoEas),
            2 => Ok(Self::GzipColumn),
            other => Err(ModelError::UnsupportedInput(other)),
        }
    }
}

/// `input` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputParams {
    /// Input format code, see [`InputFormat`].
    #[serde(rename = "type")]
    pub kind: u32,
    /// Block grid the values are laid out on.
    pub grid: Grid,
    /// 1-based value column for GEO-EAS input.
    pub ebv_column: usize,
}

impl Default for InputParams {
    fn default() -> Self {
        Self {
            kind: 1,
            grid: Grid::default(),
            ebv_column: 1,
        }
    }
}

impl InputParams {
    /// Decoded input format.
    pub fn format(&self) -> Result<InputFormat, ModelError> {
        InputFormat::from_code(self.kind)
    }
}

/// `precedence` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecedenceParams {
    /// Precedence rule code; `1` is benches.
    pub method: u32,
    /// Overall slope angle in degrees.
    pub slope: f64,
    /// Benches above a block that constrain it.
    pub num_benches: usize,
}

impl Default for PrecedenceParams {
    fn default() -> Self {
        Self {
            method: 1,
            slope: 45.0,
            num_benches: 8,
        }
    }
}

/// Complete parameter file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParams {
    /// Where the block values come from.
    pub input: InputParams,
    /// How precedence is generated.
    pub precedence: PrecedenceParams,
    /// Engine selection and tuning.
    pub optimization: EngineConfig,
    /// Realizations solved concurrently; `0` uses every available core.
    pub threads: usize,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            input: InputParams::default(),
            precedence: PrecedenceParams::default(),
            optimization: EngineConfig::default(),
            threads: 1,
        }
    }
}

impl RunParams {
    /// Parses a parameter file that may contain `//` comment lines.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        from_commented_json(bytes)
    }

    /// Checks the parameters and returns the grid's block count.
    pub fn validate(&self) -> Result<usize, ModelError> {
        let blocks = self.input.grid.validate()?;
        self.input.format()?;
        if self.precedence.method != 1 {
            return Err(ModelError::UnsupportedPrecedence(self.precedence.method));
        }
        let slope = self.precedence.slope;
        if slope.is_nan() || slope <= 0.0 || slope > 90.0 {
            return Err(ModelError::Slope(slope));
        }
        EngineKind::from_code(self.optimization.engine)?;
        Ok(blocks)
    }

    /// Worker threads to use for `realizations` solves.
    pub fn worker_count(&self, realizations: usize) -> usize {
        let wanted = if self.threads == 0 {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        } else {
            self.threads
        };
        wanted.clamp(1, realizations.max(1))
    }
}
