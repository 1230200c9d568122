//! Runtime camera-model dispatch.
//!
//! Residual rules are specialized per camera model at compile time. The
//! dispatcher maps a runtime [`CameraModelId`] to the matching model type with
//! an exhaustive `match`, so adding a model to the closed set without a
//! dispatch arm is a compile error.

use crate::cost::CostFunction;
use crate::factors::{
    ReprojErrorConstantPointCost, ReprojErrorConstantPoseCost, ReprojErrorCost,
    RigReprojErrorConstantRigCost, RigReprojErrorCost,
};
use crate::jacobian_ad::AutoDiffCostFunction;
use sfm_core::models::{
    FullOpenCv, OpenCv, OpenCvFisheye, Pinhole, Radial, RadialFisheye, SimplePinhole,
    SimpleRadial, SimpleRadialFisheye,
};
use sfm_core::{CameraModel, CameraModelId, Rigid3, Vec2, Vec3};

/// Operation performed with the concrete model type selected at runtime.
pub trait CameraModelVisitor {
    type Output;

    fn visit<C: CameraModel>(self) -> Self::Output;
}

/// Invoke `visitor` with the model type identified by `model_id`.
pub fn dispatch_camera_model<V: CameraModelVisitor>(
    model_id: CameraModelId,
    visitor: V,
) -> V::Output {
    match model_id {
        CameraModelId::SimplePinhole => visitor.visit::<SimplePinhole>(),
        CameraModelId::Pinhole => visitor.visit::<Pinhole>(),
        CameraModelId::SimpleRadial => visitor.visit::<SimpleRadial>(),
        CameraModelId::Radial => visitor.visit::<Radial>(),
        CameraModelId::OpenCv => visitor.visit::<OpenCv>(),
        CameraModelId::OpenCvFisheye => visitor.visit::<OpenCvFisheye>(),
        CameraModelId::FullOpenCv => visitor.visit::<FullOpenCv>(),
        CameraModelId::SimpleRadialFisheye => visitor.visit::<SimpleRadialFisheye>(),
        CameraModelId::RadialFisheye => visitor.visit::<RadialFisheye>(),
    }
}

/// A family of residual rules parameterized by camera model.
pub trait CameraCostFamily {
    /// Constructor arguments shared by every model specialization.
    type Args;

    const NAME: &'static str;

    fn create<C: CameraModel>(args: Self::Args) -> Box<dyn CostFunction>;
}

/// [`ReprojErrorCost`]; args: observed pixel.
#[derive(Debug, Clone, Copy)]
pub struct ReprojError;

impl CameraCostFamily for ReprojError {
    type Args = Vec2;
    const NAME: &'static str = "ReprojError";

    fn create<C: CameraModel>(point2d: Vec2) -> Box<dyn CostFunction> {
        AutoDiffCostFunction::boxed(ReprojErrorCost::<C>::new(point2d))
    }
}

/// [`ReprojErrorConstantPoseCost`]; args: `(cam_from_world, point2d)`.
#[derive(Debug, Clone, Copy)]
pub struct ReprojErrorConstantPose;

impl CameraCostFamily for ReprojErrorConstantPose {
    type Args = (Rigid3, Vec2);
    const NAME: &'static str = "ReprojErrorConstantPose";

    fn create<C: CameraModel>(args: Self::Args) -> Box<dyn CostFunction> {
        let (cam_from_world, point2d) = args;
        AutoDiffCostFunction::boxed(ReprojErrorConstantPoseCost::<C>::new(
            cam_from_world,
            point2d,
        ))
    }
}

/// [`ReprojErrorConstantPointCost`]; args: `(point2d, point3d)`.
#[derive(Debug, Clone, Copy)]
pub struct ReprojErrorConstantPoint;

impl CameraCostFamily for ReprojErrorConstantPoint {
    type Args = (Vec2, Vec3);
    const NAME: &'static str = "ReprojErrorConstantPoint";

    fn create<C: CameraModel>(args: Self::Args) -> Box<dyn CostFunction> {
        let (point2d, point3d) = args;
        AutoDiffCostFunction::boxed(ReprojErrorConstantPointCost::<C>::new(point2d, point3d))
    }
}

/// [`RigReprojErrorCost`]; args: observed pixel.
#[derive(Debug, Clone, Copy)]
pub struct RigReprojError;

impl CameraCostFamily for RigReprojError {
    type Args = Vec2;
    const NAME: &'static str = "RigReprojError";

    fn create<C: CameraModel>(point2d: Vec2) -> Box<dyn CostFunction> {
        AutoDiffCostFunction::boxed(RigReprojErrorCost::<C>::new(point2d))
    }
}

/// [`RigReprojErrorConstantRigCost`]; args: `(cam_from_rig, point2d)`.
#[derive(Debug, Clone, Copy)]
pub struct RigReprojErrorConstantRig;

impl CameraCostFamily for RigReprojErrorConstantRig {
    type Args = (Rigid3, Vec2);
    const NAME: &'static str = "RigReprojErrorConstantRig";

    fn create<C: CameraModel>(args: Self::Args) -> Box<dyn CostFunction> {
        let (cam_from_rig, point2d) = args;
        AutoDiffCostFunction::boxed(RigReprojErrorConstantRigCost::<C>::new(
            cam_from_rig,
            point2d,
        ))
    }
}

struct CreateCost<F: CameraCostFamily>(F::Args);

impl<F: CameraCostFamily> CameraModelVisitor for CreateCost<F> {
    type Output = Box<dyn CostFunction>;

    fn visit<C: CameraModel>(self) -> Self::Output {
        F::create::<C>(self.0)
    }
}

/// Build the cost function of family `F` specialized for `model_id`.
///
/// `args` are forwarded unchanged to the family constructor.
pub fn create_camera_cost_function<F: CameraCostFamily>(
    model_id: CameraModelId,
    args: F::Args,
) -> Box<dyn CostFunction> {
    log::debug!("creating {} cost for camera model {model_id}", F::NAME);
    dispatch_camera_model(model_id, CreateCost::<F>(args))
}

struct NumParams;

impl CameraModelVisitor for NumParams {
    type Output = usize;

    fn visit<C: CameraModel>(self) -> usize {
        C::NUM_PARAMS
    }
}

/// Number of intrinsic parameters of `model_id`, resolved through dispatch.
pub fn camera_model_num_params(model_id: CameraModelId) -> usize {
    dispatch_camera_model(model_id, NumParams)
}
