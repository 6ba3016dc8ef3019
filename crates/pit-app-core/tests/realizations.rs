// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::float_cmp)]
use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use pit_app_core::grid::Grid;
use pit_app_core::params::{InputParams, PrecedenceParams, RunParams};
use pit_app_core::pipeline::{load_model, run, BlockModel};
use pit_app_core::slope::bench_precedence;
use pit_core::{is_feasible, SolveContext};
use pit_dry_tests::{brute_force_best, XorShift64};

fn small_grid() -> Grid {
    Grid {
        num_x: 3,
        num_y: 2,
        num_z: 3,
        min_x: 0.0,
        min_y: 0.0,
        min_z: 0.0,
        siz_x: 10.0,
        siz_y: 10.0,
        siz_z: 10.0,
    }
}

fn params(engine: u32, slope: f64) -> RunParams {
    let mut params = RunParams {
        input: InputParams {
            kind: 2,
            grid: small_grid(),
            ebv_column: 1,
        },
        precedence: PrecedenceParams {
            method: 1,
            slope,
            num_benches: 2,
        },
        threads: 2,
        ..RunParams::default()
    };
    params.optimization.engine = engine;
    params
}

#[test]
fn compacted_runs_match_the_exhaustive_optimum() {
    let mut rng = XorShift64::new(0xb10c);
    for slope in [45.0, 60.0, 90.0] {
        let grid = small_grid();
        let precedence = bench_precedence(&grid, &params(1, slope).precedence).unwrap();
        let realizations: Vec<Vec<f64>> = (0..3)
            .map(|_| (0..grid.count()).map(|_| rng.gen_value(-6, 6)).collect())
            .collect();
        let best: Vec<f64> = realizations
            .iter()
            .map(|values| brute_force_best(values, &precedence).unwrap())
            .collect();
        let model = BlockModel {
            grid,
            precedence,
            realizations,
        };
        for engine in [1, 2] {
            let summary = run(&model, &params(engine, slope), &SolveContext::default()).unwrap();
            for report in &summary.realizations {
                assert_eq!(
                    report.value, best[report.realization],
                    "slope {slope}, engine {engine}"
                );
                assert!(is_feasible(&report.selection, &model.precedence));
            }
        }
    }
}

#[test]
fn gzip_column_input_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ebv.gz");
    let grid = small_grid();
    // Ore in one deep block, waste everywhere above.
    let mut text = String::new();
    for realization in 0..2 {
        for k in 0..grid.count() {
            let value = if k == grid.index(1, 0, 0) {
                if realization == 0 {
                    50.0
                } else {
                    2.0
                }
            } else {
                -1.0
            };
            text.push_str(&format!("{value}\n"));
        }
    }
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(text.as_bytes()).unwrap();
    std::fs::write(&path, enc.finish().unwrap()).unwrap();

    let params = params(2, 45.0);
    let model = load_model(&path, &params).unwrap();
    assert_eq!(model.realizations.len(), 2);
    let summary = run(&model, &params, &SolveContext::default()).unwrap();

    let first = &summary.realizations[0];
    assert!(first.selection[grid.index(1, 0, 0)]);
    assert_eq!(first.value, 50.0 - (first.selected as f64 - 1.0));
    assert_eq!(summary.realizations[1].selected, 0);
    assert_eq!(summary.realizations[1].value, 0.0);
}
