use crate::math::{Pt3, Quat, Real, Vec3};
use anyhow::{ensure, Result};
use nalgebra::{DVector, DVectorView, Quaternion, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Similarity transform `b_from_a`: `x_b = scale * (rotation * x_a) + translation`.
///
/// Parameter blocks are the rotation `[qx, qy, qz, qw]`, the translation
/// `[tx, ty, tz]` and the scale `[s]`, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sim3 {
    pub scale: Real,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for Sim3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Sim3 {
    pub fn new(scale: Real, rotation: Quat, translation: Vec3) -> Self {
        Self {
            scale,
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, Quat::identity(), Vec3::zeros())
    }

    /// Inverse transform `a_from_b`. Requires a non-zero scale.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        let scale = 1.0 / self.scale;
        Self::new(scale, rotation, -(rotation * self.translation) * scale)
    }

    pub fn transform_point(&self, p: &Pt3) -> Pt3 {
        Pt3::from(self.rotation * p.coords * self.scale + self.translation)
    }

    /// Rotation parameter block `[qx, qy, qz, qw]`.
    pub fn rotation_params(&self) -> [Real; 4] {
        let c = &self.rotation.quaternion().coords;
        [c[0], c[1], c[2], c[3]]
    }

    /// Translation parameter block `[tx, ty, tz]`.
    pub fn translation_params(&self) -> [Real; 3] {
        [self.translation.x, self.translation.y, self.translation.z]
    }

    /// Convert into an 8D vector `[qx, qy, qz, qw, tx, ty, tz, s]`.
    pub fn to_dvec(&self) -> DVector<Real> {
        let q = self.rotation_params();
        let t = self.translation_params();
        nalgebra::dvector![q[0], q[1], q[2], q[3], t[0], t[1], t[2], self.scale]
    }

    /// Parse an 8D vector `[qx, qy, qz, qw, tx, ty, tz, s]`.
    pub fn from_dvec(v: DVectorView<'_, Real>) -> Result<Self> {
        ensure!(
            v.len() == 8,
            "expected similarity vector of length 8, got {}",
            v.len()
        );
        let q = UnitQuaternion::new_unchecked(Quaternion::new(v[3], v[0], v[1], v[2]));
        Ok(Self::new(v[7], q, Vec3::new(v[4], v[5], v[6])))
    }
}

impl Mul for Sim3 {
    type Output = Sim3;

    fn mul(self, rhs: Sim3) -> Sim3 {
        Sim3::new(
            self.scale * rhs.scale,
            self.rotation * rhs.rotation,
            self.rotation * rhs.translation * self.scale + self.translation,
        )
    }
}

impl Mul<Pt3> for Sim3 {
    type Output = Pt3;

    fn mul(self, rhs: Pt3) -> Pt3 {
        self.transform_point(&rhs)
    }
}
