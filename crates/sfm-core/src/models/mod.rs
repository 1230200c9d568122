//! Camera projection models.
//!
//! Every model is a zero-sized type implementing [`CameraModel`]. Projection is
//! generic over [`RealField`] so the same code runs on `f64` and on dual numbers.
//! The set of models is closed and enumerated by [`CameraModelId`].
//!
//! Camera pipeline:
//! `pixel = K ∘ distortion ∘ (x/z, y/z)`

mod fisheye;
mod opencv;
mod pinhole;
mod radial;

pub use fisheye::{OpenCvFisheye, RadialFisheye, SimpleRadialFisheye};
pub use opencv::{FullOpenCv, OpenCv};
pub use pinhole::{Pinhole, SimplePinhole};
pub use radial::{Radial, SimpleRadial};

use crate::error::ModelError;
use nalgebra::RealField;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Projection from camera coordinates to pixels for one camera model.
pub trait CameraModel: fmt::Debug + Clone + Copy + Default + Send + Sync + 'static {
    /// Identifier of this model in the closed model set.
    const MODEL_ID: CameraModelId;
    /// Number of intrinsic parameters in the camera parameter block.
    const NUM_PARAMS: usize;

    /// Project a point in camera coordinates to image coordinates.
    ///
    /// `params` must hold at least [`Self::NUM_PARAMS`] values. Points with
    /// `z = 0` produce non-finite output.
    fn img_from_cam<T: RealField>(params: &[T], x: T, y: T, z: T) -> (T, T);
}

/// Closed set of supported camera models.
///
/// Integer ids and names follow the usual SfM model numbering, but the set is
/// a subset of it: `FOV` (7) and `THIN_PRISM_FISHEYE` (10) are not provided,
/// so their ids and names are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraModelId {
    #[serde(rename = "SIMPLE_PINHOLE")]
    SimplePinhole = 0,
    #[serde(rename = "PINHOLE")]
    Pinhole = 1,
    #[serde(rename = "SIMPLE_RADIAL")]
    SimpleRadial = 2,
    #[serde(rename = "RADIAL")]
    Radial = 3,
    #[serde(rename = "OPENCV")]
    OpenCv = 4,
    #[serde(rename = "OPENCV_FISHEYE")]
    OpenCvFisheye = 5,
    #[serde(rename = "FULL_OPENCV")]
    FullOpenCv = 6,
    #[serde(rename = "SIMPLE_RADIAL_FISHEYE")]
    SimpleRadialFisheye = 8,
    #[serde(rename = "RADIAL_FISHEYE")]
    RadialFisheye = 9,
}

impl CameraModelId {
    /// All registered models.
    pub const ALL: [CameraModelId; 9] = [
        CameraModelId::SimplePinhole,
        CameraModelId::Pinhole,
        CameraModelId::SimpleRadial,
        CameraModelId::Radial,
        CameraModelId::OpenCv,
        CameraModelId::OpenCvFisheye,
        CameraModelId::FullOpenCv,
        CameraModelId::SimpleRadialFisheye,
        CameraModelId::RadialFisheye,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            CameraModelId::SimplePinhole => "SIMPLE_PINHOLE",
            CameraModelId::Pinhole => "PINHOLE",
            CameraModelId::SimpleRadial => "SIMPLE_RADIAL",
            CameraModelId::Radial => "RADIAL",
            CameraModelId::OpenCv => "OPENCV",
            CameraModelId::OpenCvFisheye => "OPENCV_FISHEYE",
            CameraModelId::FullOpenCv => "FULL_OPENCV",
            CameraModelId::SimpleRadialFisheye => "SIMPLE_RADIAL_FISHEYE",
            CameraModelId::RadialFisheye => "RADIAL_FISHEYE",
        }
    }

    /// Number of intrinsic parameters of the model.
    pub fn num_params(self) -> usize {
        match self {
            CameraModelId::SimplePinhole => SimplePinhole::NUM_PARAMS,
            CameraModelId::Pinhole => Pinhole::NUM_PARAMS,
            CameraModelId::SimpleRadial => SimpleRadial::NUM_PARAMS,
            CameraModelId::Radial => Radial::NUM_PARAMS,
            CameraModelId::OpenCv => OpenCv::NUM_PARAMS,
            CameraModelId::OpenCvFisheye => OpenCvFisheye::NUM_PARAMS,
            CameraModelId::FullOpenCv => FullOpenCv::NUM_PARAMS,
            CameraModelId::SimpleRadialFisheye => SimpleRadialFisheye::NUM_PARAMS,
            CameraModelId::RadialFisheye => RadialFisheye::NUM_PARAMS,
        }
    }
}

impl fmt::Display for CameraModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for CameraModelId {
    type Error = ModelError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        CameraModelId::ALL
            .into_iter()
            .find(|model| model.id() == id)
            .ok_or(ModelError::UnknownId(id))
    }
}

impl FromStr for CameraModelId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CameraModelId::ALL
            .into_iter()
            .find(|model| model.name() == s)
            .ok_or_else(|| ModelError::UnknownName(s.to_string()))
    }
}

/// Apply focal lengths and principal point to a distorted normalized point.
#[inline]
pub(crate) fn to_pixels<T: RealField>(fx: T, fy: T, cx: T, cy: T, u: T, v: T) -> (T, T) {
    (fx * u + cx, fy * v + cy)
}
