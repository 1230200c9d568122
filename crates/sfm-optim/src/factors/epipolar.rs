//! Sampson error of a two-view correspondence.

use crate::cost::ResidualFunctor;
use nalgebra::{DVector, RealField, Vector3};
use sfm_core::math::{
    lift, quaternion_from_slice, rotation_matrix, skew_symmetric, vector3_from_slice,
};
use sfm_core::Vec2;

/// First-order geometric distance of a correspondence to its epipolar lines.
///
/// `x1` and `x2` are normalized image coordinates in cameras 1 and 2.
/// Blocks: `cam2_from_cam1` rotation (4), translation (3).
///
/// With `E = [t]ₓ R` the single residual is
/// `(x2ᵀ E x1)² / ((E x1)₀² + (E x1)₁² + (Eᵀ x2)₀² + (Eᵀ x2)₁²)`.
/// A vanishing denominator yields a non-finite residual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampsonErrorCost {
    pub x1: Vec2,
    pub x2: Vec2,
}

impl SampsonErrorCost {
    pub fn new(x1: Vec2, x2: Vec2) -> Self {
        Self { x1, x2 }
    }
}

impl ResidualFunctor for SampsonErrorCost {
    const NUM_RESIDUALS: usize = 1;

    fn parameter_block_sizes(&self) -> Vec<usize> {
        vec![4, 3]
    }

    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 2);
        let rotation = rotation_matrix(&quaternion_from_slice(params[0].as_slice()));
        let translation = vector3_from_slice(params[1].as_slice());
        let essential = skew_symmetric(&translation) * rotation;

        let x1 = Vector3::new(lift::<T>(self.x1.x), lift(self.x1.y), T::one());
        let x2 = Vector3::new(lift::<T>(self.x2.x), lift(self.x2.y), T::one());

        let line1 = &essential * &x1;
        let line2 = essential.transpose() * &x2;
        let num = x2.dot(&line1);
        let denom = line1[0].clone() * line1[0].clone()
            + line1[1].clone() * line1[1].clone()
            + line2[0].clone() * line2[0].clone()
            + line2[1].clone() * line2[1].clone();

        DVector::from_element(1, num.clone() * num / denom)
    }
}
