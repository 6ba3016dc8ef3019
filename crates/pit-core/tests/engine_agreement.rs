// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::float_cmp)]
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::sync_channel;

use pit_core::flow::MinCutOptions;
use pit_core::{
    close, compact_values, is_feasible, retained_count, selection_value, ChannelProgressSink,
    Engine, EngineConfig, FlowEngine, LgEngine, PitError, PitSolver, Precedence, SolveContext,
    MISSING,
};
use pit_dry_tests::{brute_force_best, layered_instance, random_instance, XorShift64};

fn config(engine: u32) -> EngineConfig {
    EngineConfig {
        engine,
        precision: 100.0,
        ..EngineConfig::default()
    }
}

fn solve(engine: u32, values: &[f64], precedence: &Precedence) -> Vec<bool> {
    Engine::select(&config(engine))
        .unwrap()
        .solve(values, precedence, &SolveContext::default())
        .unwrap()
        .selection
}

fn pair_scenario() -> Precedence {
    Precedence::new(vec![0, MISSING, MISSING], vec![vec![1]]).unwrap()
}

#[test]
fn single_block_scenarios() {
    let pre = Precedence::unconstrained(1);
    for engine in [1, 2] {
        assert_eq!(solve(engine, &[5.0], &pre), vec![true]);
        assert_eq!(solve(engine, &[-5.0], &pre), vec![false]);
    }
}

#[test]
fn forced_inclusion_and_exclusion_on_both_engines() {
    let pre = pair_scenario();
    for engine in [1, 2] {
        let picked = solve(engine, &[3.0, -1.0, 5.0], &pre);
        assert_eq!(picked, vec![true, true, true]);
        assert!((selection_value(&[3.0, -1.0, 5.0], &picked) - 7.0).abs() < f64::EPSILON);

        let picked = solve(engine, &[0.5, -1.0, 5.0], &pre);
        assert_eq!(picked, vec![false, false, true]);
    }
}

#[test]
fn both_engines_reach_the_exhaustive_optimum() {
    let mut rng = XorShift64::new(0x5eed);
    for case in 0..300 {
        let blocks = 1 + rng.gen_range_usize(12);
        let inst = random_instance(&mut rng, blocks, 3, -9, 9).unwrap();
        let best = brute_force_best(&inst.values, &inst.precedence).unwrap();

        let lg = solve(1, &inst.values, &inst.precedence);
        assert!(is_feasible(&lg, &inst.precedence), "case {case}: lg infeasible");
        assert_eq!(selection_value(&inst.values, &lg), best, "case {case}: lg");

        let flow = solve(2, &inst.values, &inst.precedence);
        assert!(is_feasible(&flow, &inst.precedence), "case {case}: flow infeasible");
        assert_eq!(selection_value(&inst.values, &flow), best, "case {case}: flow");
    }
}

#[test]
fn every_min_cut_policy_agrees_with_lerchs_grossmann() {
    let mut rng = XorShift64::new(99);
    for case in 0..20 {
        let inst = layered_instance(&mut rng, 12, 8).unwrap();
        let lg = solve(1, &inst.values, &inst.precedence);
        let lg_value = selection_value(&inst.values, &lg);
        assert!(is_feasible(&lg, &inst.precedence));
        for lowest_label in [false, true] {
            for fifo_buckets in [false, true] {
                let options = MinCutOptions {
                    lowest_label,
                    fifo_buckets,
                };
                let flow = FlowEngine::new(1.0, options)
                    .solve(&inst.values, &inst.precedence, &SolveContext::default())
                    .unwrap()
                    .selection;
                assert!(is_feasible(&flow, &inst.precedence));
                assert_eq!(
                    selection_value(&inst.values, &flow),
                    lg_value,
                    "case {case}: {options:?}"
                );
            }
        }
    }
}

#[test]
fn compaction_leaves_the_optimum_unchanged() {
    let mut rng = XorShift64::new(2024);
    for case in 0..40 {
        let inst = layered_instance(&mut rng, 10, 6).unwrap();
        let mut mask: Vec<bool> = inst.values.iter().map(|&v| v > 0.0).collect();
        close(&mut mask, &inst.precedence).unwrap();
        let retained = retained_count(&mask);
        let compaction = inst.precedence.compact(&mask, retained).unwrap();
        let values = compact_values(&mask, &inst.values).unwrap();

        for engine in [1, 2] {
            let full = solve(engine, &inst.values, &inst.precedence);
            let small = solve(engine, &values, &compaction.precedence);
            let expanded = compaction.expand(&small, inst.values.len()).unwrap();
            assert!(is_feasible(&expanded, &inst.precedence), "case {case}");
            assert_eq!(
                selection_value(&inst.values, &expanded),
                selection_value(&inst.values, &full),
                "case {case}: engine {engine}"
            );
            assert!(expanded
                .iter()
                .zip(&mask)
                .all(|(&picked, &kept)| kept || !picked));
        }
    }
}

#[test]
fn fresh_instances_are_required_per_call() {
    // Engines consume themselves; two solves need two selections.
    let pre = pair_scenario();
    let first = LgEngine::new()
        .solve(&[3.0, -1.0, 5.0], &pre, &SolveContext::default())
        .unwrap();
    let second = LgEngine::new()
        .solve(&[3.0, -1.0, 5.0], &pre, &SolveContext::default())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn configuration_and_shape_errors_surface_before_solving() {
    assert_eq!(
        Engine::select(&config(7)).unwrap_err(),
        PitError::InvalidEngineType(7)
    );
    let pre = pair_scenario();
    for engine in [1, 2] {
        let err = Engine::select(&config(engine))
            .unwrap()
            .solve(&[1.0, 2.0], &pre, &SolveContext::default())
            .unwrap_err();
        assert_eq!(
            err,
            PitError::ShapeMismatch {
                values: 2,
                blocks: 3
            }
        );
        let err = Engine::select(&config(engine))
            .unwrap()
            .solve(&[1.0, f64::NAN, 2.0], &pre, &SolveContext::default())
            .unwrap_err();
        assert_eq!(err, PitError::NonFiniteValue { block: 1 });
    }
}

#[test]
fn cancellation_aborts_both_engines() {
    let flag = AtomicBool::new(true);
    let ctx = SolveContext::new().with_cancel(&flag);
    let pre = pair_scenario();
    for engine in [1, 2] {
        let err = Engine::select(&config(engine))
            .unwrap()
            .solve(&[3.0, -1.0, 5.0], &pre, &ctx)
            .unwrap_err();
        assert_eq!(err, PitError::Cancelled);
    }
}

#[test]
fn progress_messages_reach_a_channel_sink() {
    let (tx, rx) = sync_channel(16);
    let sink = ChannelProgressSink::new(tx);
    let ctx = SolveContext::new().with_progress(&sink);
    LgEngine::new()
        .solve(&[3.0, -1.0, 5.0], &pair_scenario(), &ctx)
        .unwrap();
    let seen: Vec<String> = rx.try_iter().collect();
    assert_eq!(seen, vec!["init normalized tree", "solve", "done"]);
}
