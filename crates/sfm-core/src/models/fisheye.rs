use super::{to_pixels, CameraModel, CameraModelId};
use crate::math::lift;
use nalgebra::RealField;

/// Below this normalized radius the equidistant mapping is treated as identity.
const FISHEYE_MIN_RADIUS: f64 = f64::EPSILON;

/// Equidistant fisheye offsets for `θ_d = θ (1 + k1 θ² + k2 θ⁴ + k3 θ⁶ + k4 θ⁸)`.
///
/// Near the optical axis the offset is `O(r³)`, so the zero branch agrees with
/// the general formula to first order.
fn fisheye_distortion<T: RealField>(u: T, v: T, k: [T; 4]) -> (T, T) {
    let r = (u.clone() * u.clone() + v.clone() * v.clone()).sqrt();
    if r > lift::<T>(FISHEYE_MIN_RADIUS) {
        let [k1, k2, k3, k4] = k;
        let theta = r.clone().atan();
        let theta2 = theta.clone() * theta.clone();
        let theta4 = theta2.clone() * theta2.clone();
        let theta6 = theta4.clone() * theta2.clone();
        let theta8 = theta4.clone() * theta4.clone();
        let thetad = theta * (T::one() + k1 * theta2 + k2 * theta4 + k3 * theta6 + k4 * theta8);
        let scale = thetad / r;
        (u.clone() * scale.clone() - u, v.clone() * scale - v)
    } else {
        (T::zero(), T::zero())
    }
}

/// OpenCV equidistant fisheye camera: `[fx, fy, cx, cy, k1, k2, k3, k4]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvFisheye;

impl CameraModel for OpenCvFisheye {
    const MODEL_ID: CameraModelId = CameraModelId::OpenCvFisheye;
    const NUM_PARAMS: usize = 8;

    fn img_from_cam<T: RealField>(params: &[T], x: T, y: T, z: T) -> (T, T) {
        debug_assert!(params.len() >= Self::NUM_PARAMS);
        let u = x / z.clone();
        let v = y / z;
        let (du, dv) = fisheye_distortion(
            u.clone(),
            v.clone(),
            [
                params[4].clone(),
                params[5].clone(),
                params[6].clone(),
                params[7].clone(),
            ],
        );
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

/// Equidistant fisheye with one focal length and one coefficient: `[f, cx, cy, k]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRadialFisheye;

impl CameraModel for SimpleRadialFisheye {
    const MODEL_ID: CameraModelId = CameraModelId::SimpleRadialFisheye;
    const NUM_PARAMS: usize = 4;

    fn img_from_cam<T: RealField>(params: &[T], x: T, y: T, z: T) -> (T, T) {
        debug_assert!(params.len() >= Self::NUM_PARAMS);
        let f = params[0].clone();
        let u = x / z.clone();
        let v = y / z;
        let (du, dv) = fisheye_distortion(
            u.clone(),
            v.clone(),
            [params[3].clone(), T::zero(), T::zero(), T::zero()],
        );
        to_pixels(
            f.clone(),
            f,
            params[1].clone(),
            params[2].clone(),
            u + du,
            v + dv,
        )
    }
}

/// Equidistant fisheye with one focal length and two coefficients: `[f, cx, cy, k1, k2]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadialFisheye;

impl CameraModel for RadialFisheye {
    const MODEL_ID: CameraModelId = CameraModelId::RadialFisheye;
    const NUM_PARAMS: usize = 5;

    fn img_from_cam<T: RealField>(params: &[T], x: T, y: T, z: T) -> (T, T) {
        debug_assert!(params.len() >= Self::NUM_PARAMS);
        let f = params[0].clone();
        let u = x / z.clone();
        let v = y / z;
        let (du, dv) = fisheye_distortion(
            u.clone(),
            v.clone(),
            [params[3].clone(), params[4].clone(), T::zero(), T::zero()],
        );
        to_pixels(
            f.clone(),
            f,
            params[1].clone(),
            params[2].clone(),
            u + du,
            v + dv,
        )
    }
}
