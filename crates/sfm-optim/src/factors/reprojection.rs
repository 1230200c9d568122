//! Reprojection residuals for every camera model.
//!
//! All variants transform a 3D point into the camera frame, project it with
//! the camera model `C` and return `projected - observed` in pixels.

use crate::cost::ResidualFunctor;
use nalgebra::{DVector, RealField, UnitQuaternion, Vector3};
use sfm_core::math::{
    lift, lift_quaternion, lift_vector3, quaternion_from_slice, vector3_from_slice,
};
use sfm_core::{CameraModel, Rigid3, Vec2, Vec3};
use std::marker::PhantomData;

/// Project a camera-frame point and subtract the observation.
fn reproj_residual_generic<C: CameraModel, T: RealField>(
    camera: &[T],
    point_in_cam: Vector3<T>,
    point2d: &Vec2,
) -> DVector<T> {
    debug_assert!(
        camera.len() >= C::NUM_PARAMS,
        "camera must have {} params",
        C::NUM_PARAMS
    );
    let (u, v) = C::img_from_cam(
        camera,
        point_in_cam.x.clone(),
        point_in_cam.y.clone(),
        point_in_cam.z.clone(),
    );
    DVector::from_vec(vec![u - lift(point2d.x), v - lift(point2d.y)])
}

/// `q * p + t`.
fn transform<T: RealField>(
    rotation: &UnitQuaternion<T>,
    translation: &Vector3<T>,
    point: &Vector3<T>,
) -> Vector3<T> {
    rotation * point + translation
}

/// Reprojection error with free pose, point and intrinsics.
///
/// Blocks: `cam_from_world` rotation (4), translation (3), point (3), camera (`C::NUM_PARAMS`).
#[derive(Debug, Clone)]
pub struct ReprojErrorCost<C> {
    pub point2d: Vec2,
    _model: PhantomData<C>,
}

impl<C: CameraModel> ReprojErrorCost<C> {
    pub fn new(point2d: Vec2) -> Self {
        Self {
            point2d,
            _model: PhantomData,
        }
    }
}

impl<C: CameraModel> ResidualFunctor for ReprojErrorCost<C> {
    const NUM_RESIDUALS: usize = 2;

    fn parameter_block_sizes(&self) -> Vec<usize> {
        vec![4, 3, 3, C::NUM_PARAMS]
    }

    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 4);
        let rotation = quaternion_from_slice(params[0].as_slice());
        let translation = vector3_from_slice(params[1].as_slice());
        let point = vector3_from_slice(params[2].as_slice());
        let pc = transform(&rotation, &translation, &point);
        reproj_residual_generic::<C, T>(params[3].as_slice(), pc, &self.point2d)
    }
}

/// Reprojection error with a fixed pose.
///
/// Blocks: point (3), camera (`C::NUM_PARAMS`).
#[derive(Debug, Clone)]
pub struct ReprojErrorConstantPoseCost<C> {
    pub cam_from_world: Rigid3,
    pub point2d: Vec2,
    _model: PhantomData<C>,
}

impl<C: CameraModel> ReprojErrorConstantPoseCost<C> {
    pub fn new(cam_from_world: Rigid3, point2d: Vec2) -> Self {
        Self {
            cam_from_world,
            point2d,
            _model: PhantomData,
        }
    }
}

impl<C: CameraModel> ResidualFunctor for ReprojErrorConstantPoseCost<C> {
    const NUM_RESIDUALS: usize = 2;

    fn parameter_block_sizes(&self) -> Vec<usize> {
        vec![3, C::NUM_PARAMS]
    }

    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 2);
        let rotation = lift_quaternion::<T>(&self.cam_from_world.rotation);
        let translation = lift_vector3::<T>(&self.cam_from_world.translation);
        let point = vector3_from_slice(params[0].as_slice());
        let pc = transform(&rotation, &translation, &point);
        reproj_residual_generic::<C, T>(params[1].as_slice(), pc, &self.point2d)
    }
}

/// Reprojection error with a fixed 3D point.
///
/// Blocks: `cam_from_world` rotation (4), translation (3), camera (`C::NUM_PARAMS`).
#[derive(Debug, Clone)]
pub struct ReprojErrorConstantPointCost<C> {
    pub point2d: Vec2,
    pub point3d: Vec3,
    _model: PhantomData<C>,
}

impl<C: CameraModel> ReprojErrorConstantPointCost<C> {
    pub fn new(point2d: Vec2, point3d: Vec3) -> Self {
        Self {
            point2d,
            point3d,
            _model: PhantomData,
        }
    }
}

impl<C: CameraModel> ResidualFunctor for ReprojErrorConstantPointCost<C> {
    const NUM_RESIDUALS: usize = 2;

    fn parameter_block_sizes(&self) -> Vec<usize> {
        vec![4, 3, C::NUM_PARAMS]
    }

    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 3);
        let rotation = quaternion_from_slice(params[0].as_slice());
        let translation = vector3_from_slice(params[1].as_slice());
        let point = lift_vector3::<T>(&self.point3d);
        let pc = transform(&rotation, &translation, &point);
        reproj_residual_generic::<C, T>(params[2].as_slice(), pc, &self.point2d)
    }
}

/// Reprojection error of a camera mounted in a rig, with free extrinsic.
///
/// Blocks: `cam_from_rig` rotation (4), translation (3), `rig_from_world`
/// rotation (4), translation (3), point (3), camera (`C::NUM_PARAMS`).
#[derive(Debug, Clone)]
pub struct RigReprojErrorCost<C> {
    pub point2d: Vec2,
    _model: PhantomData<C>,
}

impl<C: CameraModel> RigReprojErrorCost<C> {
    pub fn new(point2d: Vec2) -> Self {
        Self {
            point2d,
            _model: PhantomData,
        }
    }
}

impl<C: CameraModel> ResidualFunctor for RigReprojErrorCost<C> {
    const NUM_RESIDUALS: usize = 2;

    fn parameter_block_sizes(&self) -> Vec<usize> {
        vec![4, 3, 4, 3, 3, C::NUM_PARAMS]
    }

    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 6);
        let cam_from_rig_rotation = quaternion_from_slice(params[0].as_slice());
        let cam_from_rig_translation = vector3_from_slice(params[1].as_slice());
        let rig_from_world_rotation = quaternion_from_slice(params[2].as_slice());
        let rig_from_world_translation = vector3_from_slice(params[3].as_slice());
        let point = vector3_from_slice(params[4].as_slice());

        let point_in_rig = transform(
            &rig_from_world_rotation,
            &rig_from_world_translation,
            &point,
        );
        let pc = transform(
            &cam_from_rig_rotation,
            &cam_from_rig_translation,
            &point_in_rig,
        );
        reproj_residual_generic::<C, T>(params[5].as_slice(), pc, &self.point2d)
    }
}

/// Reprojection error of a camera mounted in a rig, with fixed extrinsic.
///
/// Blocks: `rig_from_world` rotation (4), translation (3), point (3), camera (`C::NUM_PARAMS`).
#[derive(Debug, Clone)]
pub struct RigReprojErrorConstantRigCost<C> {
    pub cam_from_rig: Rigid3,
    pub point2d: Vec2,
    _model: PhantomData<C>,
}

impl<C: CameraModel> RigReprojErrorConstantRigCost<C> {
    pub fn new(cam_from_rig: Rigid3, point2d: Vec2) -> Self {
        Self {
            cam_from_rig,
            point2d,
            _model: PhantomData,
        }
    }
}

impl<C: CameraModel> ResidualFunctor for RigReprojErrorConstantRigCost<C> {
    const NUM_RESIDUALS: usize = 2;

    fn parameter_block_sizes(&self) -> Vec<usize> {
        vec![4, 3, 3, C::NUM_PARAMS]
    }

    fn residual<T: RealField>(&self, params: &[DVector<T>]) -> DVector<T> {
        debug_assert_eq!(params.len(), 4);
        let cam_from_rig_rotation = lift_quaternion::<T>(&self.cam_from_rig.rotation);
        let cam_from_rig_translation = lift_vector3::<T>(&self.cam_from_rig.translation);
        let rig_from_world_rotation = quaternion_from_slice(params[0].as_slice());
        let rig_from_world_translation = vector3_from_slice(params[1].as_slice());
        let point = vector3_from_slice(params[2].as_slice());

        let point_in_rig = transform(
            &rig_from_world_rotation,
            &rig_from_world_translation,
            &point,
        );
        let pc = transform(
            &cam_from_rig_rotation,
            &cam_from_rig_translation,
            &point_in_rig,
        );
        reproj_residual_generic::<C, T>(params[3].as_slice(), pc, &self.point2d)
    }
}
