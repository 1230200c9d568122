//! Residual rules for bundle adjustment.
//!
//! Every rule is a [`ResidualFunctor`](crate::ResidualFunctor): a small value
//! type that owns its fixed data (observations, fixed poses, square-root
//! information matrices) and computes its residual generically over
//! [`nalgebra::RealField`], so the same code runs on `f64` and on the dual
//! numbers used by [`AutoDiffCostFunction`](crate::AutoDiffCostFunction).
//!
//! # Parameter blocks
//!
//! - rotations are `[qx, qy, qz, qw]` quaternions, used as given (no
//!   normalization); the solver keeps them on the unit sphere
//! - translations and points are `[x, y, z]`
//! - camera blocks hold `C::NUM_PARAMS` intrinsics of the camera model `C`
//!
//! # Available rules
//!
//! - [`reprojection`] - reprojection error with free or fixed pose, point or rig extrinsic
//! - [`epipolar`] - Sampson error of a two-view correspondence
//! - [`prior`] - whitened pose, position, relative-pose and point-alignment priors

pub mod epipolar;
pub mod prior;
pub mod reprojection;

pub use epipolar::SampsonErrorCost;
pub use prior::{
    AbsolutePosePriorCost, AbsolutePositionPriorCost, PointAlignmentCost, RelativePosePriorCost,
};
pub use reprojection::{
    ReprojErrorConstantPointCost, ReprojErrorConstantPoseCost, ReprojErrorCost,
    RigReprojErrorConstantRigCost, RigReprojErrorCost,
};
