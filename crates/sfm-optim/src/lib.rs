//! Differentiable residuals for bundle adjustment.
//!
//! Residual rules ([`ResidualFunctor`]) are written once, generically over
//! [`nalgebra::RealField`], and turned into solver-facing [`CostFunction`]
//! handles by [`AutoDiffCostFunction`], which evaluates them on `f64` or on
//! `num-dual` dual numbers when Jacobians are requested.
//!
//! Handles can be wrapped with [`IsotropicNoiseCost`] and specialized per
//! camera model at runtime through [`dispatch`]. Residual rules can also be
//! registered directly with tiny-solver via [`solver::tiny`].

mod cost;
pub mod dispatch;
mod error;
pub mod factors;
pub mod isotropic;
mod jacobian_ad;
pub mod solver;
pub mod test_utils;

pub use cost::{CostFunction, ResidualFunctor};
pub use dispatch::{
    camera_model_num_params, create_camera_cost_function, dispatch_camera_model,
    CameraCostFamily, CameraModelVisitor,
};
pub use error::CostError;
pub use isotropic::{IsotropicNoiseCost, LinearConditioner};
pub use jacobian_ad::AutoDiffCostFunction;
pub use solver::tiny::{TinyFactor, TinySolveOptions};
