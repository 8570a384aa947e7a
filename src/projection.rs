//! World point to projector pixel.
//!
//! Pipeline for [`ProjectionMapper::project`]:
//! world -> projector local (inverse projector pose) -> optional Y flip ->
//! clip space (intrinsics, `w` = local z) -> `w == 0` gives [`ScreenPoint::undefined`] ->
//! perspective divide, with optional lens distortion on the normalized point ->
//! viewport `(v * 0.5 + 0.5) * dim` -> optional re-centring on the canvas midpoint.

use log::trace;
use nalgebra::{Point2, Point3, Vector4};
use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationParameters, LensModel};
use crate::camera::ImageSize;
use crate::distortion;
use crate::rig::RigPose;

/// Where pixel (0, 0) sits on the consumer's surface.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasOrigin {
    /// Top-left corner, plain screen coordinates.
    #[default]
    Corner,
    /// Canvas midpoint; `dimension / 2` is subtracted on both axes.
    Centered,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionOptions {
    /// Rig Y points up, image rows grow downwards.
    pub flip_y: bool,
    pub origin: CanvasOrigin,
    /// Bend the normalized point through the projector lens model (`distortion::correct`).
    pub lens_distortion: bool,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        ProjectionOptions {
            flip_y: true,
            origin: CanvasOrigin::Corner,
            lens_distortion: false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub pixel: Point2<f64>,
    /// Distance along the optical axis in metres; negative behind the lens.
    pub depth: f64,
    pub origin: CanvasOrigin,
    defined: bool,
}

impl ScreenPoint {
    /// Point on the projector's focal plane. Pixel is zero, depth is zero.
    pub fn undefined() -> ScreenPoint {
        ScreenPoint {
            pixel: Point2::origin(),
            depth: 0.0,
            origin: CanvasOrigin::Corner,
            defined: false,
        }
    }

    pub fn new(pixel: Point2<f64>, depth: f64, origin: CanvasOrigin) -> ScreenPoint {
        ScreenPoint {
            pixel,
            depth,
            origin,
            defined: true,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn defined(&self) -> Option<Point2<f64>> {
        self.defined.then_some(self.pixel)
    }

    /// Pixel in corner-origin coordinates regardless of the canvas origin.
    pub fn corner_pixel(&self, size: ImageSize) -> Point2<f64> {
        match self.origin {
            CanvasOrigin::Corner => self.pixel,
            CanvasOrigin::Centered => Point2::new(
                self.pixel.x + size.width as f64 / 2.0,
                self.pixel.y + size.height as f64 / 2.0,
            ),
        }
    }

    /// Defined, in front of the lens and inside `[0,width) x [0,height)`.
    pub fn in_image(&self, size: ImageSize) -> bool {
        self.defined && self.depth > 0.0 && size.contains(&self.corner_pixel(size))
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ProjectionMapper {
    options: ProjectionOptions,
}

impl ProjectionMapper {
    pub fn new(options: ProjectionOptions) -> ProjectionMapper {
        ProjectionMapper { options }
    }

    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }

    pub fn project(
        &self,
        world: &Point3<f64>,
        calib: &CalibrationParameters,
        projector: &RigPose,
    ) -> ScreenPoint {
        let local = projector.world_to_local(world);
        self.project_local(&local, calib)
    }

    /// Projects a point already expressed in the projector's local frame.
    pub fn project_local(&self, local: &Point3<f64>, calib: &CalibrationParameters) -> ScreenPoint {
        let local = self.flip(local);
        let size = calib.image_size;
        let clip_matrix = calib.projector.intrinsics().clip_matrix(size);
        let clip = clip_matrix * Vector4::new(local.x, local.y, local.z, 1.0);

        if clip.w == 0.0 {
            trace!("{:?} lies on the projector focal plane", local);
            return ScreenPoint::undefined();
        }

        let ndc = if self.options.lens_distortion {
            let normalized = Point2::new(local.x / clip.w, local.y / clip.w);
            let distorted = distortion::correct(&normalized, &calib.projector.distortion);
            let clip = clip_matrix * Vector4::new(distorted.x, distorted.y, 1.0, 1.0);
            Point2::new(clip.x, clip.y)
        } else {
            Point2::new(clip.x / clip.w, clip.y / clip.w)
        };

        let w = size.width as f64;
        let h = size.height as f64;
        let mut pixel = Point2::new((ndc.x * 0.5 + 0.5) * w, (ndc.y * 0.5 + 0.5) * h);
        if self.options.origin == CanvasOrigin::Centered {
            pixel.x -= w / 2.0;
            pixel.y -= h / 2.0;
        }
        ScreenPoint::new(pixel, clip.w, self.options.origin)
    }

    /// Renders through the depth sensor's own colour camera. Always corner origin.
    pub fn project_through_sensor(
        &self,
        world: &Point3<f64>,
        sensor: &RigPose,
        lens: &LensModel,
    ) -> ScreenPoint {
        let local = self.flip(&sensor.world_to_local(world));
        if local.z == 0.0 {
            return ScreenPoint::undefined();
        }
        let mut normalized = Point2::new(local.x / local.z, local.y / local.z);
        if self.options.lens_distortion {
            normalized = distortion::correct(&normalized, &lens.distortion);
        }
        let pixel = lens.intrinsics().normalized_to_pixel(&normalized);
        ScreenPoint::new(pixel, local.z, CanvasOrigin::Corner)
    }

    fn flip(&self, p: &Point3<f64>) -> Point3<f64> {
        if self.options.flip_y {
            Point3::new(p.x, -p.y, p.z)
        } else {
            *p
        }
    }
}
