//! Core math and geometry primitives for bundle-adjustment cost functions.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Mat6`, ...) and helpers that
//!   work for any [`nalgebra::RealField`] scalar, including dual numbers,
//! - rigid ([`Rigid3`]) and similarity ([`Sim3`]) transforms with the
//!   `c_from_a = c_from_b * b_from_a` composition convention,
//! - [`sqrt_information`] for whitening residuals with a covariance,
//! - the closed set of camera models ([`models`]) behind [`CameraModelId`].
//!
//! Parameter blocks store quaternions as `[qx, qy, qz, qw]` and translations as
//! `[tx, ty, tz]`.

mod error;
/// Linear algebra type aliases and generic helpers.
pub mod math;
/// Camera projection models.
pub mod models;
/// Rigid transforms.
pub mod rigid;
/// Similarity transforms.
pub mod sim3;

pub use error::ModelError;
pub use math::*;
pub use models::{CameraModel, CameraModelId};
pub use rigid::Rigid3;
pub use sim3::Sim3;
