use crate::math::{Pt3, Quat, Real, Vec3};
use anyhow::{ensure, Result};
use nalgebra::{DVector, DVectorView, Isometry3, Quaternion, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Rigid transform `b_from_a`: maps points expressed in frame `a` into frame `b`.
///
/// `x_b = rotation * x_a + translation`. Composition follows the frame names:
/// `c_from_a = c_from_b * b_from_a`.
///
/// The rotation is expected to be unit norm; this is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rigid3 {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for Rigid3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rigid3 {
    pub fn new(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Quat::identity(), Vec3::zeros())
    }

    /// Build from raw `[qx, qy, qz, qw]` and `[tx, ty, tz]` parameter blocks.
    pub fn from_params(rotation: &[Real; 4], translation: &[Real; 3]) -> Self {
        let q = Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]);
        Self::new(
            UnitQuaternion::new_unchecked(q),
            Vec3::new(translation[0], translation[1], translation[2]),
        )
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

    /// Inverse transform `a_from_b`.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self::new(rotation, -(rotation * self.translation))
    }

    pub fn transform_point(&self, p: &Pt3) -> Pt3 {
        Pt3::from(self.rotation * p.coords + self.translation)
    }

    pub fn to_isometry(&self) -> Isometry3<Real> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    pub fn from_isometry(iso: &Isometry3<Real>) -> Self {
        Self::new(iso.rotation, iso.translation.vector)
    }

    /// Convert into a 7D vector `[qx, qy, qz, qw, tx, ty, tz]`.
    pub fn to_dvec(&self) -> DVector<Real> {
        let q = self.rotation_params();
        let t = self.translation_params();
        nalgebra::dvector![q[0], q[1], q[2], q[3], t[0], t[1], t[2]]
    }

    /// Parse a 7D vector `[qx, qy, qz, qw, tx, ty, tz]`.
    pub fn from_dvec(v: DVectorView<'_, Real>) -> Result<Self> {
        ensure!(
            v.len() == 7,
            "expected rigid transform vector of length 7, got {}",
            v.len()
        );
        Ok(Self::from_params(
            &[v[0], v[1], v[2], v[3]],
            &[v[4], v[5], v[6]],
        ))
    }
}

impl Mul for Rigid3 {
    type Output = Rigid3;

    fn mul(self, rhs: Rigid3) -> Rigid3 {
        Rigid3::new(
            self.rotation * rhs.rotation,
            self.translation + self.rotation * rhs.translation,
        )
    }
}

impl Mul<Pt3> for Rigid3 {
    type Output = Pt3;

    fn mul(self, rhs: Pt3) -> Pt3 {
        self.transform_point(&rhs)
    }
}
