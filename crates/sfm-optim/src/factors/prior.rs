//! Whitened prior residuals on poses, positions and point alignments.
//!
//! Each prior stores the square-root information `R` of its covariance
//! (`Rᵀ R = C⁻¹`) and multiplies the raw residual by it, so the squared norm
//! of the residual is the Mahalanobis distance to the prior.

use crate::cost::ResidualFunctor;
use nalgebra::{DVector, RealField, SVector, Vector3, Vector6};
use sfm_core::math::{
    lift_quaternion, lift_vector3, quaternion_from_slice, quaternion_inverse,
    quaternion_to_angle_axis, sqrt_information, vector3_from_slice, whiten,
};
use sfm_core::{Mat3, Mat6, Rigid3, Vec3};

fn stack6<T: RealField>(rotation: Vector3<T>, translation: Vector3<T>) -> Vector6<T> {
    Vector6::new(
        rotation.x.clone(),
        rotation.y.clone(),
        rotation.z.clone(),
        translation.x.clone(),
        translation.y.clone(),
        translation.z.clone(),
    )
}

fn into_dvector<T: RealField, const N: usize>(v: SVector<T, N>) -> DVector<T> {
    DVector::from_iterator(N, v.iter().cloned())
}

/// Prior on an absolute camera pose.
///
/// Blocks: `cam_from_world` rotation (4), translation (3). The residual is
/// `[log(R_est R_prior⁻¹); t_est + R_est t_prior⁻¹]`, whitened by the 6×6
/// covariance ordered rotation first, translation second.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsolutePosePriorCost {
    pub world_from_cam_prior: Rigid3,
    pub sqrt_information: Mat6,
}

impl AbsolutePosePriorCost {
    pub fn new(cam_from_world_prior: &Rigid3, covariance_cam: &Mat6) -> Self {
        Self {
            world_from_cam_prior: cam_from_world_prior.inverse(),
            sqrt_information: sqrt_information(covariance_cam),
        }
    }
}

impl ResidualFunctor for AbsolutePosePriorCost {
    const NUM_RESIDUALS: usize = 6;

    fn parameter_block_sizes(&self) -> Vec<usize> {
        vec![4, 3]
    }

    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 2);
        let rotation = quaternion_from_slice(params[0].as_slice());
        let translation = vector3_from_slice(params[1].as_slice());

        let prior_rotation = lift_quaternion::<T>(&self.world_from_cam_prior.rotation);
        let prior_translation = lift_vector3::<T>(&self.world_from_cam_prior.translation);

        let param_from_prior = &rotation * prior_rotation;
        let r_rot = quaternion_to_angle_axis(&param_from_prior);
        let r_trans = translation + rotation * prior_translation;

        into_dvector(whiten(&self.sqrt_information, stack6(r_rot, r_trans)))
    }
}

/// Prior on the position of a camera center in world coordinates.
///
/// Blocks: `cam_from_world` rotation (4), translation (3). The residual is
/// `position_prior + R_est⁻¹ t_est`, whitened by the 3×3 covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsolutePositionPriorCost {
    pub position_in_world_prior: Vec3,
    pub sqrt_information: Mat3,
}

impl AbsolutePositionPriorCost {
    pub fn new(position_in_world_prior: Vec3, covariance: &Mat3) -> Self {
        Self {
            position_in_world_prior,
            sqrt_information: sqrt_information(covariance),
        }
    }
}

impl ResidualFunctor for AbsolutePositionPriorCost {
    const NUM_RESIDUALS: usize = 3;

    fn parameter_block_sizes(&self) -> Vec<usize> {
        vec![4, 3]
    }

    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 2);
        let rotation = quaternion_from_slice(params[0].as_slice());
        let translation = vector3_from_slice(params[1].as_slice());

        let raw = lift_vector3::<T>(&self.position_in_world_prior)
            + quaternion_inverse(&rotation) * translation;
        into_dvector(whiten(&self.sqrt_information, raw))
    }
}

/// Prior on the relative pose between two cameras `i` and `j`.
///
/// Blocks: `i_from_world` rotation (4), translation (3), `j_from_world`
/// rotation (4), translation (3). With `R_ij = R_i R_j⁻¹` and the stored
/// `j_from_i` prior, the residual is
/// `[log(R_ij R_ji_prior); t_i + R_ij (t_ji_prior - t_j)]`, whitened.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativePosePriorCost {
    pub j_from_i_prior: Rigid3,
    pub sqrt_information: Mat6,
}

impl RelativePosePriorCost {
    pub fn new(i_from_j_prior: &Rigid3, covariance_j: &Mat6) -> Self {
        Self {
            j_from_i_prior: i_from_j_prior.inverse(),
            sqrt_information: sqrt_information(covariance_j),
        }
    }
}

impl ResidualFunctor for RelativePosePriorCost {
    const NUM_RESIDUALS: usize = 6;

    fn parameter_block_sizes(&self) -> Vec<usize> {
        vec![4, 3, 4, 3]
    }

    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 4);
        let i_rotation = quaternion_from_slice(params[0].as_slice());
        let i_translation = vector3_from_slice(params[1].as_slice());
        let j_rotation = quaternion_from_slice(params[2].as_slice());
        let j_translation = vector3_from_slice(params[3].as_slice());

        let i_from_j_rotation = i_rotation * quaternion_inverse(&j_rotation);
        let prior_rotation = lift_quaternion::<T>(&self.j_from_i_prior.rotation);
        let prior_translation = lift_vector3::<T>(&self.j_from_i_prior.translation);

        let r_rot = quaternion_to_angle_axis(&(&i_from_j_rotation * prior_rotation));
        let r_trans = i_translation + i_from_j_rotation * (prior_translation - j_translation);

        into_dvector(whiten(&self.sqrt_information, stack6(r_rot, r_trans)))
    }
}

/// Alignment of a point in frame `a` with a prior position in frame `b`.
///
/// Blocks: `point_in_a` (3), `b_from_a` rotation (4), translation (3),
/// scale (1). The residual is `s (R p) + t - point_in_b_prior`, whitened by the
/// 3×3 covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAlignmentCost {
    pub point_in_b_prior: Vec3,
    pub sqrt_information: Mat3,
}

impl PointAlignmentCost {
    pub fn new(point_in_b_prior: Vec3, covariance_b: &Mat3) -> Self {
        Self {
            point_in_b_prior,
            sqrt_information: sqrt_information(covariance_b),
        }
    }
}

impl ResidualFunctor for PointAlignmentCost {
    const NUM_RESIDUALS: usize = 3;

    fn parameter_block_sizes(&self) -> Vec<usize> {
        vec![3, 4, 3, 1]
    }

    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 4);
        let point = vector3_from_slice(params[0].as_slice());
        let rotation = quaternion_from_slice(params[1].as_slice());
        let translation = vector3_from_slice(params[2].as_slice());
        let scale = params[3][0].clone();

        let point_in_b = (rotation * point) * scale + translation;
        let raw = point_in_b - lift_vector3::<T>(&self.point_in_b_prior);
        into_dvector(whiten(&self.sqrt_information, raw))
    }
}
