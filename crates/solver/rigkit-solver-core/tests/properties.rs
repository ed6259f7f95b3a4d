//! Sweeps over control ranges checking the invariants every solve must hold.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use nalgebra::Vector3;
use rigkit_solver_core::{
    soft_ik_scale, ChainInputs, ChainSolver, SegmentScaleInputs, SegmentScaleSolver,
    SolverConfig, SolverError, Transform,
};

fn steps(lo: f64, hi: f64, n: usize) -> impl Iterator<Item = f64> {
    (0..=n).map(move |i| lo + (hi - lo) * i as f64 / n as f64)
}

fn chain(reach: f64) -> ChainInputs {
    ChainInputs::default()
        .with_reference_lengths(3.0, 4.0)
        .with_handle_at(Vector3::new(reach * 0.6, reach * 0.8, 0.0))
}

#[test]
fn neutral_controls_reproduce_rest_lengths() {
    let solver = ChainSolver::default();
    for reach in steps(0.0, 20.0, 40) {
        let out = solver.solve(&chain(reach));
        assert_relative_eq!(out.start_output_length, 3.0);
        assert_relative_eq!(out.end_output_length, 4.0);
        assert_eq!(out.start_output_scale, 1.0);
        assert_eq!(out.end_output_scale, 1.0);
    }
}

#[test]
fn soft_ik_is_continuous_at_soft_distance() {
    for softness in steps(0.1, 6.0, 20) {
        let boundary = 7.0 - softness;
        assert_eq!(soft_ik_scale(boundary, 7.0, softness), 1.0);
        assert_abs_diff_eq!(
            soft_ik_scale(boundary + 1.0e-7, 7.0, softness),
            1.0,
            epsilon = 1.0e-6
        );
    }
}

#[test]
fn slide_conserves_chain_length() {
    let solver = ChainSolver::default();
    for reach in [2.0, 7.0, 9.0] {
        for stretch in [0.0, 1.0] {
            let base = solver.solve(&ChainInputs {
                stretch,
                ..chain(reach)
            });
            for slide in steps(-1.0, 1.0, 20) {
                let out = solver.solve(&ChainInputs {
                    stretch,
                    slide,
                    ..chain(reach)
                });
                assert_relative_eq!(
                    out.start_output_length + out.end_output_length,
                    base.start_output_length + base.end_output_length,
                    epsilon = 1.0e-9
                );
                assert!(out.start_output_length > 0.0);
                assert!(out.end_output_length > 0.0);
            }
        }
    }
}

#[test]
fn volumetric_scale_tracks_length_change() {
    let solver = ChainSolver::default();
    for reach in steps(7.5, 12.0, 9) {
        let stretched = ChainInputs {
            stretch: 1.0,
            ..chain(reach)
        };
        let plain = solver.solve(&stretched);
        let full = solver.solve(&ChainInputs {
            volumetric: 1.0,
            ..stretched.clone()
        });
        assert_relative_eq!(
            full.start_output_scale,
            3.0 / plain.start_output_length,
            epsilon = 1.0e-12
        );
        assert_relative_eq!(
            full.end_output_scale,
            4.0 / plain.end_output_length,
            epsilon = 1.0e-12
        );

        let none = solver.solve(&ChainInputs {
            volumetric: 0.0,
            ..stretched
        });
        assert_eq!(none.start_output_scale, 1.0);
        assert_eq!(none.end_output_scale, 1.0);
    }
}

#[test]
fn full_pole_lock_reaches_through_pole() {
    let solver = ChainSolver::default();
    let start = Vector3::new(1.0, 0.0, 0.0);
    let handle = Vector3::new(1.0, 6.0, 2.0);
    for pole in [
        Vector3::new(3.0, 3.0, 0.0),
        Vector3::new(-2.0, 1.0, 4.0),
        Vector3::new(1.0, 3.0, 1.0),
    ] {
        let inputs = ChainInputs {
            start_transform: Transform::new_translation(&start),
            pole_vector_lock: 1.0,
            ..ChainInputs::default()
                .with_reference_lengths(3.0, 4.0)
                .with_handle_at(handle)
                .with_pole_at(pole)
        };
        let out = solver.solve(&inputs);
        assert_relative_eq!(out.start_output_length, (pole - start).norm());
        assert_relative_eq!(out.end_output_length, (handle - pole).norm());
    }
}

#[test]
fn pole_lock_below_threshold_is_ignored() {
    let solver = ChainSolver::default();
    let inputs = ChainInputs {
        pole_vector_lock: 5.0e-4,
        ..chain(5.0).with_pole_at(Vector3::new(0.0, 40.0, 0.0))
    };
    let out = solver.solve(&inputs);
    assert_eq!(out.start_output_length, 3.0);
    assert_eq!(out.end_output_length, 4.0);
}

#[test]
fn preferred_angle_stays_in_range_with_input_sign() {
    let solver = ChainSolver::default();
    for reach in steps(0.0, 14.0, 14) {
        for angle in steps(-180.0, 180.0, 12) {
            for blend in [0.0, 1.0, 7.0, 15.0] {
                let out = solver.solve(&ChainInputs {
                    preferred_angle_input: Vector3::new(angle, 0.0, 0.0),
                    preferred_angle_blend: blend,
                    ..chain(reach)
                });
                let x = out.preferred_angle_output.x;
                assert!((1.0..=90.0).contains(&x.abs()), "{angle} {blend} -> {x}");
                assert_eq!(x < 0.0, angle < 0.0);
                assert_eq!(out.preferred_angle_output.y, 0.0);
                assert_eq!(out.preferred_angle_output.z, 0.0);
            }
        }
    }
}

#[test]
fn custom_angle_range_is_honoured() {
    let cfg = SolverConfig::default().with_preferred_angle_range(5.0, 30.0);
    assert!(cfg.validate().is_ok());
    let solver = ChainSolver::new(cfg);
    let out = solver.solve(&ChainInputs {
        preferred_angle_input: Vector3::new(80.0, 0.0, 0.0),
        ..chain(1.0)
    });
    assert_eq!(out.preferred_angle_output.x, 30.0);
}

#[test]
fn checked_solves_reject_every_non_finite_field() {
    let solver = ChainSolver::default();
    let mutations: Vec<(&'static str, fn(&mut ChainInputs))> = vec![
        ("start_transform", |i| i.start_transform[(0, 3)] = f64::NAN),
        ("handle_local_translation", |i| {
            i.handle_local_translation.y = f64::INFINITY
        }),
        ("global_scale", |i| i.global_scale = f64::NEG_INFINITY),
        ("slide", |i| i.slide = f64::NAN),
        ("preferred_angle_input", |i| {
            i.preferred_angle_input.x = f64::NAN
        }),
    ];
    for (field, mutate) in mutations {
        let mut inputs = chain(5.0);
        mutate(&mut inputs);
        assert_eq!(
            solver.solve_checked(&inputs),
            Err(SolverError::NonFinite { field })
        );
    }

    let segment = SegmentScaleInputs {
        reference_length: f64::INFINITY,
        ..Default::default()
    };
    assert_eq!(
        SegmentScaleSolver::default().solve_checked(&segment),
        Err(SolverError::NonFinite {
            field: "reference_length"
        })
    );
}

#[test]
fn solvers_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ChainSolver>();
    assert_send_sync::<SegmentScaleSolver>();
}
