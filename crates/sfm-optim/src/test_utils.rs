//! Utilities for validating cost functions in tests.
//!
//! This module is public to allow use across workspace test suites,
//! but is not intended for production use. It provides finite-difference
//! Jacobians and comparison helpers for checking the autodiff path.

use crate::cost::CostFunction;
use nalgebra::{DMatrix, DVector};
use sfm_core::{Quat, Rigid3};

/// Default central-difference step.
pub const FD_STEP: f64 = 1e-6;

/// Central finite-difference Jacobians of every parameter block.
///
/// Returns `None` if any evaluation fails.
pub fn numeric_jacobians(
    cost: &dyn CostFunction,
    parameters: &[&[f64]],
    step: f64,
) -> Option<Vec<DMatrix<f64>>> {
    let n = cost.num_residuals();
    let mut blocks: Vec<Vec<f64>> = parameters.iter().map(|p| p.to_vec()).collect();
    let mut jacobians = Vec::with_capacity(blocks.len());

    for (b, &d) in cost.parameter_block_sizes().iter().enumerate() {
        let mut jac = DMatrix::zeros(n, d);
        for c in 0..d {
            let original = blocks[b][c];

            blocks[b][c] = original + step;
            let plus = eval(cost, &blocks)?;
            blocks[b][c] = original - step;
            let minus = eval(cost, &blocks)?;
            blocks[b][c] = original;

            jac.set_column(c, &((plus - minus) / (2.0 * step)));
        }
        jacobians.push(jac);
    }
    Some(jacobians)
}

fn eval(cost: &dyn CostFunction, blocks: &[Vec<f64>]) -> Option<DVector<f64>> {
    let refs: Vec<&[f64]> = blocks.iter().map(Vec::as_slice).collect();
    cost.evaluate_residuals(&refs)
}

/// Assert that analytic and finite-difference Jacobians agree.
///
/// The tolerance is relative to `max(1, |J_fd|)` per entry.
pub fn assert_jacobians_match(cost: &dyn CostFunction, parameters: &[&[f64]], tol: f64) {
    let (_, analytic) = cost
        .evaluate_with_jacobians(parameters)
        .expect("cost evaluation with jacobians failed");
    let numeric = numeric_jacobians(cost, parameters, FD_STEP).expect("cost evaluation failed");

    for (b, (ja, jn)) in analytic.iter().zip(&numeric).enumerate() {
        assert_eq!(ja.shape(), jn.shape(), "block {b} shape");
        for r in 0..ja.nrows() {
            for c in 0..ja.ncols() {
                let a = ja[(r, c)];
                let f = jn[(r, c)];
                let err = (a - f).abs() / f.abs().max(1.0);
                assert!(
                    err < tol,
                    "block {b} entry ({r}, {c}): autodiff {a} vs numeric {f} (rel err {err:.3e})"
                );
            }
        }
    }
}

/// Parameter blocks `[qx, qy, qz, qw]` and `[tx, ty, tz]` of a rigid transform.
pub fn pose_blocks(pose: &Rigid3) -> ([f64; 4], [f64; 3]) {
    (pose.rotation_params(), pose.translation_params())
}

/// Deterministic rigid transform from a rotation vector and a translation.
pub fn pose_from(rotvec: [f64; 3], translation: [f64; 3]) -> Rigid3 {
    Rigid3::new(Quat::from_scaled_axis(rotvec.into()), translation.into())
}
