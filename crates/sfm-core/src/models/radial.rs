use super::{to_pixels, CameraModel, CameraModelId};
use nalgebra::RealField;

/// Radial distortion offsets `(du, dv)` for `radial = k1 r² + k2 r⁴`.
fn radial_distortion<T: RealField>(u: T, v: T, k1: T, k2: T) -> (T, T) {
    let r2 = u.clone() * u.clone() + v.clone() * v.clone();
    let radial = k1 * r2.clone() + k2 * r2.clone() * r2;
    (u * radial.clone(), v * radial)
}

/// Single focal length with one radial coefficient: `[f, cx, cy, k]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRadial;

impl CameraModel for SimpleRadial {
    const MODEL_ID: CameraModelId = CameraModelId::SimpleRadial;
    const NUM_PARAMS: usize = 4;

    fn img_from_cam<T: RealField>(params: &[T], x: T, y: T, z: T) -> (T, T) {
        debug_assert!(params.len() >= Self::NUM_PARAMS);
        let f = params[0].clone();
        let u = x / z.clone();
        let v = y / z;
        let (du, dv) = radial_distortion(u.clone(), v.clone(), params[3].clone(), T::zero());
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

/// Single focal length with two radial coefficients: `[f, cx, cy, k1, k2]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Radial;

impl CameraModel for Radial {
    const MODEL_ID: CameraModelId = CameraModelId::Radial;
    const NUM_PARAMS: usize = 5;

    fn img_from_cam<T: RealField>(params: &[T], x: T, y: T, z: T) -> (T, T) {
        debug_assert!(params.len() >= Self::NUM_PARAMS);
        let f = params[0].clone();
        let u = x / z.clone();
        let v = y / z;
        let (du, dv) = radial_distortion(
            u.clone(),
            v.clone(),
            params[3].clone(),
            params[4].clone(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barrel_distortion_pulls_points_inward() {
        let p = [100.0, 0.0, 0.0, -0.2];
        let (u, _) = SimpleRadial::img_from_cam::<f64>(&p, 0.5, 0.0, 1.0);
        // 0.5 * (1 - 0.2 * 0.25) * 100
        assert!((u - 47.5).abs() < 1e-12, "u={u}");
    }

    #[test]
    fn radial_second_coefficient_uses_r4() {
        let p = [1.0, 0.0, 0.0, 0.0, 1.0];
        let (u, v) = Radial::img_from_cam::<f64>(&p, 1.0, 1.0, 1.0);
        // r² = 2, r⁴ = 4 -> factor 5
        assert!((u - 5.0).abs() < 1e-12);
        assert!((v - 5.0).abs() < 1e-12);
    }
}
