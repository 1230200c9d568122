use nalgebra::{
    Matrix3, Matrix6, Point2, Point3, Quaternion, RealField, SMatrix, UnitQuaternion, Vector2,
    Vector3, Vector6,
};

pub type Real = f64;

pub type Vec2 = Vector2<Real>;
pub type Vec3 = Vector3<Real>;
pub type Vec6 = Vector6<Real>;
pub type Pt2 = Point2<Real>;
pub type Pt3 = Point3<Real>;
pub type Mat3 = Matrix3<Real>;
pub type Mat6 = Matrix6<Real>;
pub type Quat = UnitQuaternion<Real>;

/// Square-root information matrix of a covariance.
///
/// Returns the upper-triangular `R` with `Rᵀ R = covariance⁻¹`, i.e. the
/// transposed lower Cholesky factor of the information matrix. Whitening a raw
/// residual is the matrix-vector product `R * r`.
///
/// The covariance must be symmetric positive definite. This is not checked:
/// a singular or indefinite input produces a NaN-filled matrix.
pub fn sqrt_information<const N: usize>(covariance: &SMatrix<Real, N, N>) -> SMatrix<Real, N, N> {
    let Some(information) = covariance.try_inverse() else {
        return SMatrix::from_element(Real::NAN);
    };
    match information.cholesky() {
        Some(chol) => chol.l().transpose(),
        None => SMatrix::from_element(Real::NAN),
    }
}

/// Convert an `f64` constant into a generic scalar.
#[inline]
pub fn lift<T: RealField>(v: Real) -> T {
    nalgebra::convert(v)
}

/// Convert a constant vector into a generic scalar vector.
pub fn lift_vector3<T: RealField>(v: &Vec3) -> Vector3<T> {
    Vector3::new(lift(v.x), lift(v.y), lift(v.z))
}

/// Convert a constant matrix into a generic scalar matrix.
pub fn lift_matrix<T: RealField, const R: usize, const C: usize>(
    m: &SMatrix<Real, R, C>,
) -> SMatrix<T, R, C> {
    m.map(lift::<T>)
}

/// Convert a constant rotation into a generic scalar quaternion.
pub fn lift_quaternion<T: RealField>(q: &Quat) -> UnitQuaternion<T> {
    let c = &q.quaternion().coords;
    UnitQuaternion::new_unchecked(Quaternion::new(
        lift(c[3]),
        lift(c[0]),
        lift(c[1]),
        lift(c[2]),
    ))
}

/// Interpret a `[qx, qy, qz, qw]` parameter block as a rotation.
///
/// The quaternion is not normalized; keeping it on the unit sphere is the
/// solver manifold's job.
pub fn quaternion_from_slice<T: RealField>(q: &[T]) -> UnitQuaternion<T> {
    debug_assert!(q.len() >= 4, "quaternion block must have 4 params");
    UnitQuaternion::new_unchecked(Quaternion::new(
        q[3].clone(),
        q[0].clone(),
        q[1].clone(),
        q[2].clone(),
    ))
}

/// Interpret a `[x, y, z]` parameter block as a vector.
pub fn vector3_from_slice<T: RealField>(v: &[T]) -> Vector3<T> {
    debug_assert!(v.len() >= 3, "vector block must have 3 params");
    Vector3::new(v[0].clone(), v[1].clone(), v[2].clone())
}

/// Quaternion inverse `q* / |q|²`.
///
/// Matches the unit-quaternion conjugate on the manifold but stays exact for
/// the ambient parameterization the derivatives are taken in.
pub fn quaternion_inverse<T: RealField>(q: &UnitQuaternion<T>) -> UnitQuaternion<T> {
    let q = q.quaternion();
    let norm_squared = q.norm_squared();
    let conj = q.conjugate();
    UnitQuaternion::new_unchecked(Quaternion::from_vector(conj.coords / norm_squared))
}

/// Rotation matrix of a (nominally unit) quaternion.
pub fn rotation_matrix<T: RealField>(q: &UnitQuaternion<T>) -> Matrix3<T> {
    let c = &q.quaternion().coords;
    let (x, y, z, w) = (c[0].clone(), c[1].clone(), c[2].clone(), c[3].clone());
    let two = lift::<T>(2.0);
    let tx = two.clone() * x.clone();
    let ty = two.clone() * y.clone();
    let tz = two * z.clone();
    let twx = tx.clone() * w.clone();
    let twy = ty.clone() * w.clone();
    let twz = tz.clone() * w;
    let txx = tx.clone() * x.clone();
    let txy = ty.clone() * x.clone();
    let txz = tz.clone() * x;
    let tyy = ty.clone() * y.clone();
    let tyz = tz.clone() * y;
    let tzz = tz * z;
    let one = T::one();

    Matrix3::new(
        one.clone() - (tyy.clone() + tzz.clone()),
        txy.clone() - twz.clone(),
        txz.clone() + twy.clone(),
        txy + twz,
        one.clone() - (txx.clone() + tzz),
        tyz.clone() - twx.clone(),
        txz - twy,
        tyz + twx,
        one - (txx + tyy),
    )
}

/// Cross-product matrix `[v]ₓ` such that `[v]ₓ u = v × u`.
pub fn skew_symmetric<T: RealField>(v: &Vector3<T>) -> Matrix3<T> {
    let zero = T::zero();
    Matrix3::new(
        zero.clone(),
        -v.z.clone(),
        v.y.clone(),
        v.z.clone(),
        zero.clone(),
        -v.x.clone(),
        -v.y.clone(),
        v.x.clone(),
        zero,
    )
}

/// Logarithm of a rotation quaternion as an angle-axis vector.
///
/// The only branch is at `sin(θ/2) = 0`, where the small-angle form `2 q_v`
/// agrees with the general formula to first order, so derivatives stay valid
/// at the identity. The result is wrapped to `|θ| <= π`.
pub fn quaternion_to_angle_axis<T: RealField>(q: &UnitQuaternion<T>) -> Vector3<T> {
    let c = &q.quaternion().coords;
    let q1 = c[0].clone();
    let q2 = c[1].clone();
    let q3 = c[2].clone();
    let sin_squared_theta =
        q1.clone() * q1.clone() + q2.clone() * q2.clone() + q3.clone() * q3.clone();

    let k = if sin_squared_theta > T::zero() {
        let sin_theta = sin_squared_theta.sqrt();
        let cos_theta = c[3].clone();
        let two_theta = lift::<T>(2.0)
            * if cos_theta < T::zero() {
                (-sin_theta.clone()).atan2(-cos_theta)
            } else {
                sin_theta.clone().atan2(cos_theta)
            };
        two_theta / sin_theta
    } else {
        lift(2.0)
    };

    Vector3::new(q1 * k.clone(), q2 * k.clone(), q3 * k)
}

/// Apply a square-root information matrix to a raw residual.
pub fn whiten<T: RealField, const N: usize>(
    sqrt_info: &SMatrix<Real, N, N>,
    raw: SMatrix<T, N, 1>,
) -> SMatrix<T, N, 1> {
    lift_matrix::<T, N, N>(sqrt_info) * raw
}
