use super::{to_pixels, CameraModel, CameraModelId};
use crate::math::lift;
use nalgebra::RealField;

/// Brown-Conrady camera: `[fx, fy, cx, cy, k1, k2, p1, p2]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCv;

impl CameraModel for OpenCv {
    const MODEL_ID: CameraModelId = CameraModelId::OpenCv;
    const NUM_PARAMS: usize = 8;

    fn img_from_cam<T: RealField>(params: &[T], x: T, y: T, z: T) -> (T, T) {
        debug_assert!(params.len() >= Self::NUM_PARAMS);
        let u = x / z.clone();
        let v = y / z;
        let k1 = params[4].clone();
        let k2 = params[5].clone();
        let p1 = params[6].clone();
        let p2 = params[7].clone();

        let two = lift::<T>(2.0);
        let u2 = u.clone() * u.clone();
        let uv = u.clone() * v.clone();
        let v2 = v.clone() * v.clone();
        let r2 = u2.clone() + v2.clone();
        let radial = k1 * r2.clone() + k2 * r2.clone() * r2.clone();
        let du = u.clone() * radial.clone()
            + two.clone() * p1.clone() * uv.clone()
            + p2.clone() * (r2.clone() + two.clone() * u2);
        let dv = v.clone() * radial + two.clone() * p2 * uv + p1 * (r2 + two * v2);

        to_pixels(
            params[0].clone(),
            params[1].clone(),
            params[2].clone(),
            params[3].clone(),
            u + du,
            v + dv,
        )
    }
}

/// Rational Brown-Conrady camera:
/// `[fx, fy, cx, cy, k1, k2, p1, p2, k3, k4, k5, k6]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullOpenCv;

impl CameraModel for FullOpenCv {
    const MODEL_ID: CameraModelId = CameraModelId::FullOpenCv;
    const NUM_PARAMS: usize = 12;

    fn img_from_cam<T: RealField>(params: &[T], x: T, y: T, z: T) -> (T, T) {
        debug_assert!(params.len() >= Self::NUM_PARAMS);
        let u = x / z.clone();
        let v = y / z;
        let k1 = params[4].clone();
        let k2 = params[5].clone();
        let p1 = params[6].clone();
        let p2 = params[7].clone();
        let k3 = params[8].clone();
        let k4 = params[9].clone();
        let k5 = params[10].clone();
        let k6 = params[11].clone();

        let one = T::one();
        let two = lift::<T>(2.0);
        let u2 = u.clone() * u.clone();
        let uv = u.clone() * v.clone();
        let v2 = v.clone() * v.clone();
        let r2 = u2.clone() + v2.clone();
        let r4 = r2.clone() * r2.clone();
        let r6 = r4.clone() * r2.clone();
        let radial = (one.clone() + k1 * r2.clone() + k2 * r4.clone() + k3 * r6.clone())
            / (one + k4 * r2.clone() + k5 * r4 + k6 * r6);
        let du = u.clone() * radial.clone()
            + two.clone() * p1.clone() * uv.clone()
            + p2.clone() * (r2.clone() + two.clone() * u2)
            - u.clone();
        let dv = v.clone() * radial + two.clone() * p2 * uv + p1 * (r2 + two * v2) - v.clone();

        to_pixels(
            params[0].clone(),
            params[1].clone(),
            params[2].clone(),
            params[3].clone(),
            u + du,
            v + dv,
        )
    }
}
