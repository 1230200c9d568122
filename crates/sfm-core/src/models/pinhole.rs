use super::{to_pixels, CameraModel, CameraModelId};
use nalgebra::RealField;

/// Pinhole camera with a single focal length: `[f, cx, cy]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplePinhole;

impl CameraModel for SimplePinhole {
    const MODEL_ID: CameraModelId = CameraModelId::SimplePinhole;
    const NUM_PARAMS: usize = 3;

    fn img_from_cam<T: RealField>(params: &[T], x: T, y: T, z: T) -> (T, T) {
        debug_assert!(params.len() >= Self::NUM_PARAMS);
        let f = params[0].clone();
        let u = x / z.clone();
        let v = y / z;
        to_pixels(f.clone(), f, params[1].clone(), params[2].clone(), u, v)
    }
}

/// Pinhole camera: `[fx, fy, cx, cy]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pinhole;

impl CameraModel for Pinhole {
    const MODEL_ID: CameraModelId = CameraModelId::Pinhole;
    const NUM_PARAMS: usize = 4;

    fn img_from_cam<T: RealField>(params: &[T], x: T, y: T, z: T) -> (T, T) {
        debug_assert!(params.len() >= Self::NUM_PARAMS);
        let u = x / z.clone();
        let v = y / z;
        to_pixels(
            params[0].clone(),
            params[1].clone(),
            params[2].clone(),
            params[3].clone(),
            u,
            v,
        )
    }
}
