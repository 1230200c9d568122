//! Whitened prior residuals.

use sfm_core::{sqrt_information, Mat3, Mat6, Pt3, Quat, Rigid3, Sim3, Vec3, Vec6};
use sfm_optim::factors::{
    AbsolutePosePriorCost, AbsolutePositionPriorCost, PointAlignmentCost, RelativePosePriorCost,
};
use sfm_optim::test_utils::{assert_jacobians_match, pose_blocks, pose_from};
use sfm_optim::{AutoDiffCostFunction, CostFunction};

fn spd6() -> Mat6 {
    let mut a = Mat6::identity() * 0.5;
    for r in 0..6 {
        for c in 0..6 {
            a[(r, c)] += 0.05 * ((r + 2 * c) % 5) as f64;
        }
    }
    a * a.transpose() + Mat6::identity() * 0.1
}

fn spd3() -> Mat3 {
    let a = Mat3::new(0.3, 0.05, 0.0, -0.02, 0.4, 0.1, 0.01, 0.0, 0.2);
    a * a.transpose() + Mat3::identity() * 0.01
}

#[test]
fn absolute_pose_prior_is_zero_at_prior() {
    let prior = pose_from([0.4, -0.3, 0.9], [1.0, 2.0, -0.5]);
    let cost = AutoDiffCostFunction::new(AbsolutePosePriorCost::new(&prior, &spd6()));
    let (q, t) = pose_blocks(&prior);
    let r = cost.evaluate_residuals(&[&q, &t]).unwrap();
    assert_eq!(r.len(), 6);
    assert!(r.norm() < 1e-9, "residual {r}");
}

#[test]
fn absolute_pose_prior_whitening_is_matrix_product() {
    let prior = pose_from([0.1, 0.2, -0.1], [0.5, 0.0, 1.0]);
    let covariance = spd6();
    let whitened = AutoDiffCostFunction::new(AbsolutePosePriorCost::new(&prior, &covariance));
    let raw = AutoDiffCostFunction::new(AbsolutePosePriorCost::new(&prior, &Mat6::identity()));

    let estimate = pose_from([0.12, 0.18, -0.05], [0.55, -0.1, 0.9]);
    let (q, t) = pose_blocks(&estimate);
    let r_white = whitened.evaluate_residuals(&[&q, &t]).unwrap();
    let r_raw = raw.evaluate_residuals(&[&q, &t]).unwrap();

    let raw6 = Vec6::from_column_slice(r_raw.as_slice());
    let expected = sqrt_information(&covariance) * raw6;
    for i in 0..6 {
        assert!((r_white[i] - expected[i]).abs() < 1e-10, "component {i}");
    }
    // squared norm is the Mahalanobis distance of the raw residual
    let info = covariance.try_inverse().unwrap();
    let mahalanobis = (raw6.transpose() * info * raw6)[(0, 0)];
    assert!((r_white.norm_squared() - mahalanobis).abs() < 1e-8 * mahalanobis.max(1.0));
}

#[test]
fn absolute_pose_prior_rotation_part_is_relative_angle_axis() {
    let prior = Rigid3::identity();
    let cost = AutoDiffCostFunction::new(AbsolutePosePriorCost::new(&prior, &Mat6::identity()));
    let estimate = Rigid3::new(Quat::from_scaled_axis(Vec3::new(0.0, 0.0, 0.3)), Vec3::zeros());
    let (q, t) = pose_blocks(&estimate);
    let r = cost.evaluate_residuals(&[&q, &t]).unwrap();
    assert!((r[2] - 0.3).abs() < 1e-12, "rz={}", r[2]);
    assert!(r[0].abs() < 1e-12 && r[1].abs() < 1e-12);
    assert!(r.rows(3, 3).norm() < 1e-12);
}

#[test]
fn absolute_pose_prior_jacobians() {
    let prior = pose_from([0.4, -0.3, 0.9], [1.0, 2.0, -0.5]);
    let cost = AutoDiffCostFunction::new(AbsolutePosePriorCost::new(&prior, &spd6()));
    let (q, t) = pose_blocks(&pose_from([0.35, -0.2, 1.0], [1.1, 1.8, -0.4]));
    assert_jacobians_match(&cost, &[&q, &t], 1e-5);
}

#[test]
fn absolute_pose_prior_jacobian_at_prior_is_finite() {
    let cost = AutoDiffCostFunction::new(AbsolutePosePriorCost::new(
        &Rigid3::identity(),
        &Mat6::identity(),
    ));
    let (q, t) = pose_blocks(&Rigid3::identity());
    let (r, jac) = cost.evaluate_with_jacobians(&[&q, &t]).unwrap();
    assert!(r.norm() < 1e-15);
    assert!(jac.iter().all(|j| j.iter().all(|v| v.is_finite())));
    // d(angle-axis)/d(q_xyz) = 2 I at the identity
    assert!((jac[0][(0, 0)] - 2.0).abs() < 1e-12);
    assert!((jac[0][(1, 1)] - 2.0).abs() < 1e-12);
    assert!((jac[0][(2, 2)] - 2.0).abs() < 1e-12);
}

#[test]
fn position_prior_is_zero_at_camera_center() {
    let pose = pose_from([0.2, 0.1, -0.4], [0.3, -1.0, 2.0]);
    let center = pose.inverse().translation;
    let cost = AutoDiffCostFunction::new(AbsolutePositionPriorCost::new(center, &spd3()));
    let (q, t) = pose_blocks(&pose);
    let r = cost.evaluate_residuals(&[&q, &t]).unwrap();
    assert!(r.norm() < 1e-9, "residual {r}");
    assert_jacobians_match(&cost, &[&q, &t], 1e-5);
}

#[test]
fn position_prior_adds_prior_and_rotated_translation() {
    // identity rotation: residual = prior + t
    let cost = AutoDiffCostFunction::new(AbsolutePositionPriorCost::new(
        Vec3::new(1.0, 2.0, 3.0),
        &Mat3::identity(),
    ));
    let r = cost
        .evaluate_residuals(&[&[0.0, 0.0, 0.0, 1.0], &[0.5, 0.5, 0.5]])
        .unwrap();
    assert!((r[0] - 1.5).abs() < 1e-12);
    assert!((r[1] - 2.5).abs() < 1e-12);
    assert!((r[2] - 3.5).abs() < 1e-12);
}

#[test]
fn relative_prior_is_zero_at_true_relative_pose() {
    let i_from_world = pose_from([0.3, -0.1, 0.2], [0.5, -1.0, 2.0]);
    let j_from_world = pose_from([-0.2, 0.4, 0.1], [-1.0, 0.3, 0.7]);
    let i_from_j = i_from_world * j_from_world.inverse();
    let cost = AutoDiffCostFunction::new(RelativePosePriorCost::new(&i_from_j, &spd6()));

    let (qi, ti) = pose_blocks(&i_from_world);
    let (qj, tj) = pose_blocks(&j_from_world);
    let r = cost.evaluate_residuals(&[&qi, &ti, &qj, &tj]).unwrap();
    assert!(r.norm() < 1e-9, "residual {r}");
}

#[test]
fn relative_prior_jacobians() {
    let i_from_j = pose_from([0.1, 0.2, -0.3], [1.0, 0.0, 0.2]);
    let cost = AutoDiffCostFunction::new(RelativePosePriorCost::new(&i_from_j, &spd6()));
    let (qi, ti) = pose_blocks(&pose_from([0.3, -0.1, 0.2], [0.5, -1.0, 2.0]));
    let (qj, tj) = pose_blocks(&pose_from([-0.2, 0.4, 0.1], [-1.0, 0.3, 0.7]));
    assert_jacobians_match(&cost, &[&qi, &ti, &qj, &tj], 1e-5);
}

#[test]
fn point_alignment_is_zero_for_exact_similarity() {
    let b_from_a = Sim3::new(
        2.5,
        Quat::from_scaled_axis(Vec3::new(0.2, -0.4, 0.1)),
        Vec3::new(1.0, -2.0, 0.5),
    );
    let point_in_a = Pt3::new(0.3, 1.2, -0.7);
    let point_in_b = b_from_a * point_in_a;
    let cost = AutoDiffCostFunction::new(PointAlignmentCost::new(point_in_b.coords, &spd3()));

    let q = b_from_a.rotation_params();
    let t = b_from_a.translation_params();
    let s = [b_from_a.scale];
    let blocks: [&[f64]; 4] = [point_in_a.coords.as_slice(), &q, &t, &s];
    let r = cost.evaluate_residuals(&blocks).unwrap();
    assert!(r.norm() < 1e-9, "residual {r}");
    assert_jacobians_match(&cost, &blocks, 1e-5);
}

#[test]
fn point_alignment_scale_jacobian_is_whitened_rotated_point() {
    let cov = Mat3::identity() * 4.0;
    let cost = AutoDiffCostFunction::new(PointAlignmentCost::new(Vec3::zeros(), &cov));
    let (_, jac) = cost
        .evaluate_with_jacobians(&[&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0, 1.0], &[0.0; 3], &[1.0]])
        .unwrap();
    // d r / d s = R p whitened by 1/2
    assert!((jac[3][(0, 0)] - 0.5).abs() < 1e-12);
    assert!((jac[3][(1, 0)] - 1.0).abs() < 1e-12);
    assert!((jac[3][(2, 0)] - 1.5).abs() < 1e-12);
}

#[test]
fn priors_declare_block_layouts() {
    let pose = Rigid3::identity();
    let abs = AutoDiffCostFunction::new(AbsolutePosePriorCost::new(&pose, &Mat6::identity()));
    let pos = AutoDiffCostFunction::new(AbsolutePositionPriorCost::new(
        Vec3::zeros(),
        &Mat3::identity(),
    ));
    let rel = AutoDiffCostFunction::new(RelativePosePriorCost::new(&pose, &Mat6::identity()));
    let align =
        AutoDiffCostFunction::new(PointAlignmentCost::new(Vec3::zeros(), &Mat3::identity()));

    assert_eq!((abs.num_residuals(), abs.parameter_block_sizes()), (6, &[4, 3][..]));
    assert_eq!((pos.num_residuals(), pos.parameter_block_sizes()), (3, &[4, 3][..]));
    assert_eq!((rel.num_residuals(), rel.parameter_block_sizes()), (6, &[4, 3, 4, 3][..]));
    assert_eq!((align.num_residuals(), align.parameter_block_sizes()), (3, &[3, 4, 3, 1][..]));
}
