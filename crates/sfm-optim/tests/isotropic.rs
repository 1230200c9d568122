use nalgebra::{DMatrix, DVector};
use sfm_core::models::{OpenCv, Pinhole};
use sfm_core::Vec2;
use sfm_optim::factors::ReprojErrorCost;
use sfm_optim::test_utils::{assert_jacobians_match, pose_blocks, pose_from};
use sfm_optim::{AutoDiffCostFunction, CostError, CostFunction, IsotropicNoiseCost};

const POINT: [f64; 3] = [0.4, -0.2, 5.0];
const PINHOLE: [f64; 4] = [500.0, 510.0, 320.0, 240.0];

fn blocks() -> ([f64; 4], [f64; 3]) {
    pose_blocks(&pose_from([0.1, -0.05, 0.2], [0.3, 0.1, 0.5]))
}

fn evaluate(cost: &dyn CostFunction) -> (DVector<f64>, Vec<DMatrix<f64>>) {
    let (q, t) = blocks();
    cost.evaluate_with_jacobians(&[&q, &t, &POINT, &PINHOLE]).unwrap()
}

#[test]
fn unit_stddev_is_identity() {
    let observation = Vec2::new(300.0, 200.0);
    let plain = AutoDiffCostFunction::boxed(ReprojErrorCost::<Pinhole>::new(observation));
    let wrapped = IsotropicNoiseCost::create(1.0, ReprojErrorCost::<Pinhole>::new(observation))
        .unwrap();
    let (r0, j0) = evaluate(plain.as_ref());
    let (r1, j1) = evaluate(wrapped.as_ref());
    assert_eq!(r0, r1);
    assert_eq!(j0, j1);
}

#[test]
fn stddev_divides_residuals_and_jacobians() {
    let observation = Vec2::new(300.0, 200.0);
    let plain = AutoDiffCostFunction::boxed(ReprojErrorCost::<Pinhole>::new(observation));
    let wrapped = IsotropicNoiseCost::create(2.0, ReprojErrorCost::<Pinhole>::new(observation))
        .unwrap();

    let (r0, j0) = evaluate(plain.as_ref());
    let (r1, j1) = evaluate(wrapped.as_ref());
    assert!((r1 - r0 * 0.5).norm() < 1e-12);
    for (a, b) in j0.iter().zip(&j1) {
        assert!((b - a * 0.5).norm() < 1e-9);
    }
}

#[test]
fn wrapper_keeps_layout_and_accessors() {
    let inner = AutoDiffCostFunction::boxed(ReprojErrorCost::<OpenCv>::new(Vec2::zeros()));
    let cost = IsotropicNoiseCost::new(inner, 0.5).unwrap();
    assert_eq!(cost.num_residuals(), 2);
    assert_eq!(cost.parameter_block_sizes(), &[4, 3, 3, 8]);
    assert_eq!(cost.inner().parameter_block_sizes(), &[4, 3, 3, 8]);
    assert_eq!(cost.stddev(), 0.5);
}

#[test]
fn nested_wrappers_compose() {
    let observation = Vec2::new(310.0, 250.0);
    let plain = AutoDiffCostFunction::boxed(ReprojErrorCost::<Pinhole>::new(observation));
    let once = IsotropicNoiseCost::create(2.0, ReprojErrorCost::<Pinhole>::new(observation))
        .unwrap();
    let twice = IsotropicNoiseCost::new(once, 4.0).unwrap();

    let (r0, _) = evaluate(plain.as_ref());
    let (r2, _) = evaluate(&twice);
    assert!((r2 - r0 / 8.0).norm() < 1e-12);
}

#[test]
fn wrapped_jacobians_match_finite_differences() {
    let functor = ReprojErrorCost::<OpenCv>::new(Vec2::new(1.0, 2.0));
    let cost = IsotropicNoiseCost::create(0.7, functor).unwrap();
    let (q, t) = blocks();
    let camera = [480.0, 470.0, 300.0, 220.0, -0.2, 0.05, 0.001, -0.002];
    assert_jacobians_match(cost.as_ref(), &[&q, &t, &POINT, &camera], 1e-5);
}

#[test]
fn invalid_stddev_is_rejected() {
    for stddev in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let result =
            IsotropicNoiseCost::create(stddev, ReprojErrorCost::<Pinhole>::new(Vec2::zeros()));
        match result {
            Err(CostError::NonPositiveStddev(v)) => {
                assert!((v.is_nan() && stddev.is_nan()) || v == stddev);
            }
            Ok(_) => panic!("stddev {stddev} accepted"),
        }
    }
}

#[test]
fn partial_jacobian_request_is_scaled() {
    let observation = Vec2::new(300.0, 200.0);
    let plain = AutoDiffCostFunction::boxed(ReprojErrorCost::<Pinhole>::new(observation));
    let wrapped = IsotropicNoiseCost::create(2.0, ReprojErrorCost::<Pinhole>::new(observation))
        .unwrap();
    let (_, full) = evaluate(plain.as_ref());

    let (q, t) = blocks();
    let mut residuals = [0.0; 2];
    let mut point_jac = [0.0; 6];
    let mut slots = [None, None, Some(&mut point_jac[..]), None];
    assert!(wrapped.evaluate(&[&q, &t, &POINT, &PINHOLE], &mut residuals, Some(&mut slots[..])));

    let expected = &full[2] * 0.5;
    for r in 0..2 {
        for c in 0..3 {
            assert!((point_jac[r * 3 + c] - expected[(r, c)]).abs() < 1e-9);
        }
    }
}
