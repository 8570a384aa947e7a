//! Projector/sensor calibration as written by the structured-light calibration tool.
//!
//! The file is an OpenCV `FileStorage` XML document whose root holds one
//! element per named block:
//!
//! | block         | values | meaning                                         |
//! |---------------|--------|-------------------------------------------------|
//! | `rotation`    | 9      | row-major sensor-to-projector rotation          |
//! | `translation` | 3      | projector offset in the sensor frame, mm        |
//! | `img_shape`   | 2      | projector image **height, width**               |
//! | `proj_int`    | 9      | row-major projector intrinsic matrix, pixels    |
//! | `proj_dist`   | 5      | projector k1, k2, p1, p2, k3 (optional)         |
//! | `cam_int`     | 9      | sensor colour camera intrinsics (optional)      |
//! | `cam_dist`    | 5      | sensor colour camera distortion (optional)      |
//!
//! A block's numbers are either the element text or, for `opencv-matrix`
//! elements, the text of the `<data>` child. Every token must parse as a
//! finite float; a single bad token fails the whole block.
//!
//! The projector principal point must lie horizontally inside the image; a
//! vertical offset past the image edge is normal for lens-shifted projectors
//! and only logged.

use std::path::Path;

use log::{debug, info, warn};
use nalgebra::{Matrix3, Matrix4, Vector3};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::camera::{ImageSize, Intrinsics};
use crate::distortion::DistortionCoeffs;
use crate::error::{OverlayError, Result};

/// Translation in the file is millimetres; rig space is metres.
pub const MILLIMETERS_TO_METERS: f64 = 0.001;

const ROTATION_TOLERANCE: f64 = 1e-4;

pub const BLOCK_ROTATION: &str = "rotation";
pub const BLOCK_TRANSLATION: &str = "translation";
pub const BLOCK_IMG_SHAPE: &str = "img_shape";
pub const BLOCK_PROJ_INT: &str = "proj_int";
pub const BLOCK_PROJ_DIST: &str = "proj_dist";
pub const BLOCK_CAM_INT: &str = "cam_int";
pub const BLOCK_CAM_DIST: &str = "cam_dist";
pub const BLOCK_LIVE: &str = "live_intrinsics";

/// Intrinsic matrix plus the distortion that goes with it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LensModel {
    pub intrinsic: Matrix3<f64>,
    pub distortion: DistortionCoeffs,
}

impl LensModel {
    pub fn new(intrinsic: Matrix3<f64>, distortion: DistortionCoeffs) -> LensModel {
        LensModel {
            intrinsic,
            distortion,
        }
    }

    pub fn intrinsics(&self) -> Intrinsics {
        Intrinsics::from_matrix(&self.intrinsic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationParameters {
    pub image_size: ImageSize,
    pub projector: LensModel,
    /// Depth-sensor colour camera; from `cam_int` or a live fetch.
    pub camera: Option<LensModel>,
    /// Row-major as in the file. Maps sensor-local directions into the projector frame.
    pub rotation: Matrix3<f64>,
    /// Millimetres, as in the file. See [`CalibrationParameters::translation_m`].
    pub translation: Vector3<f64>,
    /// Set once `camera` has been replaced by intrinsics fetched from the device.
    pub live_intrinsics: bool,
}

impl CalibrationParameters {
    pub fn load(path: impl AsRef<Path>) -> Result<CalibrationParameters> {
        let path = path.as_ref();
        debug!("load {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| {
            OverlayError::configuration("file", format!("{}: {}", path.display(), e))
        })?;
        let calib = CalibrationParameters::from_xml_str(&text)?;
        info!(
            "calibration loaded from {}: {}x{}, fx={:.2} fy={:.2}, camera intrinsics {}",
            path.display(),
            calib.image_size.width,
            calib.image_size.height,
            calib.projector.intrinsic[(0, 0)],
            calib.projector.intrinsic[(1, 1)],
            if calib.camera.is_some() { "present" } else { "absent" },
        );
        Ok(calib)
    }

    pub fn from_xml_str(text: &str) -> Result<CalibrationParameters> {
        let doc = Document::parse(text)
            .map_err(|e| OverlayError::configuration("file", format!("invalid XML: {}", e)))?;
        let root = doc.root_element();

        let rotation = matrix3(&required_block(root, BLOCK_ROTATION, 9)?);
        let translation = vector3(&required_block(root, BLOCK_TRANSLATION, 3)?);
        let image_size = image_size(&required_block(root, BLOCK_IMG_SHAPE, 2)?)?;
        let projector = LensModel::new(
            intrinsic(BLOCK_PROJ_INT, &required_block(root, BLOCK_PROJ_INT, 9)?)?,
            distortion(BLOCK_PROJ_DIST, optional_block(root, BLOCK_PROJ_DIST, 5)?)?,
        );

        let camera = match optional_block(root, BLOCK_CAM_INT, 9)? {
            Some(values) => Some(LensModel::new(
                intrinsic(BLOCK_CAM_INT, &values)?,
                distortion(BLOCK_CAM_DIST, optional_block(root, BLOCK_CAM_DIST, 5)?)?,
            )),
            None => {
                if find_block(root, BLOCK_CAM_DIST).is_some() {
                    warn!("`{}` present without `{}`, ignored", BLOCK_CAM_DIST, BLOCK_CAM_INT);
                }
                None
            }
        };

        check_rotation(&rotation)?;
        check_principal_point(&projector, image_size)?;

        Ok(CalibrationParameters {
            image_size,
            projector,
            camera,
            rotation,
            translation,
            live_intrinsics: false,
        })
    }

    pub fn translation_m(&self) -> Vector3<f64> {
        self.translation * MILLIMETERS_TO_METERS
    }

    /// Inverse of `rotation`; its transpose since the rotation is orthonormal.
    pub fn rotation_inverse(&self) -> Matrix3<f64> {
        self.rotation.transpose()
    }

    /// `[R | t]` with `t` in metres.
    pub fn extrinsic(&self) -> Matrix4<f64> {
        let mut m = self.rotation.to_homogeneous();
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation_m());
        m
    }

    /// New parameters with the sensor camera lens replaced by `live`.
    /// Extrinsics, image size and projector lens are untouched.
    pub fn update(&self, live: &LiveIntrinsics) -> Result<CalibrationParameters> {
        let lens = live.to_lens()?;
        Ok(CalibrationParameters {
            camera: Some(lens),
            live_intrinsics: true,
            ..self.clone()
        })
    }
}

/// Colour camera parameters as reported by the sensor device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    #[serde(default)]
    pub dist_coefs: Vec<f64>,
}

impl LiveIntrinsics {
    pub fn to_lens(&self) -> Result<LensModel> {
        let values = [self.fx, self.fy, self.cx, self.cy];
        if values.iter().chain(self.dist_coefs.iter()).any(|v| !v.is_finite()) {
            return Err(OverlayError::configuration(BLOCK_LIVE, "non-finite value"));
        }
        if self.fx <= 0.0 || self.fy <= 0.0 {
            return Err(OverlayError::configuration(
                BLOCK_LIVE,
                format!("focal lengths must be positive, got fx={} fy={}", self.fx, self.fy),
            ));
        }
        let d = &self.dist_coefs;
        let distortion = match d.len() {
            0 => DistortionCoeffs::default(),
            4 => DistortionCoeffs::new(d[0], d[1], d[2], d[3], 0.0),
            5 => DistortionCoeffs::new(d[0], d[1], d[2], d[3], d[4]),
            8 => {
                // rational model: k4..k6 follow k3 and are not modelled here
                warn!("ignoring rational distortion terms {:?}", &d[5..]);
                DistortionCoeffs::new(d[0], d[1], d[2], d[3], d[4])
            }
            n => {
                return Err(OverlayError::configuration(
                    BLOCK_LIVE,
                    format!("expected 0, 4, 5 or 8 distortion coefficients, found {}", n),
                ))
            }
        };
        let intrinsic =
            Intrinsics::new(self.fx, self.fy, self.cx, self.cy).intrinsic_matrix();
        Ok(LensModel::new(intrinsic, distortion))
    }
}

/// Strict numeric block parse: whitespace separated, every token a finite float,
/// exactly `expected` of them.
pub fn parse_block(block: &str, text: &str, expected: usize) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(expected);
    for (i, token) in text.split_whitespace().enumerate() {
        let v: f64 = token.parse().map_err(|_| {
            OverlayError::configuration(block, format!("token {} `{}` is not a number", i, token))
        })?;
        if !v.is_finite() {
            return Err(OverlayError::configuration(
                block,
                format!("token {} `{}` is not finite", i, token),
            ));
        }
        values.push(v);
    }
    if values.len() != expected {
        return Err(OverlayError::configuration(
            block,
            format!("expected {} values, found {}", expected, values.len()),
        ));
    }
    debug!("{}: {} values", block, values.len());
    Ok(values)
}

fn find_block<'a, 'input>(root: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    root.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn own_text(node: Node) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<Vec<_>>()
        .join(" ")
}

fn required_block(root: Node, name: &str, expected: usize) -> Result<Vec<f64>> {
    optional_block(root, name, expected)?
        .ok_or_else(|| OverlayError::configuration(name, "block is missing"))
}

fn optional_block(root: Node, name: &str, expected: usize) -> Result<Option<Vec<f64>>> {
    match find_block(root, name) {
        Some(node) => read_block(node, name, expected).map(Some),
        None => Ok(None),
    }
}

fn read_block(node: Node, name: &str, expected: usize) -> Result<Vec<f64>> {
    match child_element(node, "data") {
        Some(data) => {
            check_matrix_shape(node, name, expected)?;
            parse_block(name, &own_text(data), expected)
        }
        None => {
            if node.children().any(|n| n.is_element()) {
                return Err(OverlayError::configuration(
                    name,
                    "nested elements without a <data> child",
                ));
            }
            parse_block(name, &own_text(node), expected)
        }
    }
}

fn check_matrix_shape(node: Node, name: &str, expected: usize) -> Result<()> {
    let dim = |tag: &str| -> Result<Option<usize>> {
        match child_element(node, tag) {
            Some(n) => own_text(n).trim().parse::<usize>().map(Some).map_err(|_| {
                OverlayError::configuration(name, format!("<{}> is not an integer", tag))
            }),
            None => Ok(None),
        }
    };
    if let (Some(rows), Some(cols)) = (dim("rows")?, dim("cols")?) {
        if rows * cols != expected {
            return Err(OverlayError::configuration(
                name,
                format!("declared {}x{} matrix, expected {} values", rows, cols, expected),
            ));
        }
    }
    Ok(())
}

fn matrix3(v: &[f64]) -> Matrix3<f64> {
    Matrix3::from_row_slice(v)
}

fn vector3(v: &[f64]) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

fn image_size(v: &[f64]) -> Result<ImageSize> {
    let dim = |x: f64, what: &str| -> Result<u32> {
        if x.fract() != 0.0 || x < 1.0 || x > u32::MAX as f64 {
            return Err(OverlayError::configuration(
                BLOCK_IMG_SHAPE,
                format!("{} must be a positive integer, got {}", what, x),
            ));
        }
        Ok(x as u32)
    };
    // height first, as in an array shape
    Ok(ImageSize::new(dim(v[1], "width")?, dim(v[0], "height")?))
}

fn intrinsic(block: &str, v: &[f64]) -> Result<Matrix3<f64>> {
    let k = matrix3(v);
    if k[(0, 0)] <= 0.0 || k[(1, 1)] <= 0.0 {
        return Err(OverlayError::configuration(
            block,
            format!("focal lengths must be positive, got fx={} fy={}", k[(0, 0)], k[(1, 1)]),
        ));
    }
    // plain pinhole only: projection reads nothing but fx, fy, cx, cy
    if k[(0, 1)] != 0.0 || k[(1, 0)] != 0.0 {
        return Err(OverlayError::configuration(
            block,
            format!("skew is not supported, got {} and {}", k[(0, 1)], k[(1, 0)]),
        ));
    }
    if k[(2, 0)] != 0.0 || k[(2, 1)] != 0.0 || k[(2, 2)] != 1.0 {
        return Err(OverlayError::configuration(
            block,
            format!(
                "last row must be 0 0 1, got {} {} {}",
                k[(2, 0)],
                k[(2, 1)],
                k[(2, 2)]
            ),
        ));
    }
    Ok(k)
}

fn distortion(block: &str, values: Option<Vec<f64>>) -> Result<DistortionCoeffs> {
    match values {
        Some(v) => <[f64; 5]>::try_from(v.as_slice())
            .map(DistortionCoeffs::from_array)
            .map_err(|_| OverlayError::configuration(block, "expected k1, k2, p1, p2, k3")),
        None => Ok(DistortionCoeffs::default()),
    }
}

fn check_rotation(r: &Matrix3<f64>) -> Result<()> {
    let error = (r * r.transpose() - Matrix3::identity()).abs().max();
    if error > ROTATION_TOLERANCE {
        return Err(OverlayError::configuration(
            BLOCK_ROTATION,
            format!("not orthonormal (max deviation {:.2e})", error),
        ));
    }
    if r.determinant() <= 0.0 {
        return Err(OverlayError::configuration(BLOCK_ROTATION, "determinant is not +1"));
    }
    Ok(())
}

// Projectors shift their lens vertically, so only the horizontal component is
// held to the image. A cx past the width almost always means width and height
// were swapped.
fn check_principal_point(lens: &LensModel, size: ImageSize) -> Result<()> {
    let pp = lens.intrinsics().principal_point();
    if !(0.0..f64::from(size.width)).contains(&pp.x) {
        return Err(OverlayError::configuration(
            BLOCK_IMG_SHAPE,
            format!(
                "principal point x {} outside {} px image width; img_shape is height then width",
                pp.x, size.width
            ),
        ));
    }
    if !(0.0..f64::from(size.height)).contains(&pp.y) {
        warn!(
            "principal point y {} outside {} px image height (lens shift?)",
            pp.y, size.height
        );
    }
    if size.height > size.width {
        warn!(
            "portrait projector image {}x{}; check img_shape is height then width",
            size.width, size.height
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PLAIN: &str = r#"<?xml version="1.0"?>
<opencv_storage>
<rotation>
  9.9995961310770576e-01 8.9872990011441688e-03 2.4701242572249633e-05
  -8.9613393813132575e-03 9.9685483491258131e-01 7.8740920161649047e-02
  6.8304464003145823e-04 -7.8737961416805169e-02 9.9689511328020131e-01</rotation>
<translation>8.5737214348908466e+01 -6.3045718819563251e+02 -1.0084398390544085e+02</translation>
<img_shape>720 1280</img_shape>
<proj_int>1000 0 640
0 1000 360
0 0 1</proj_int>
</opencv_storage>
"#;

    fn with_block(name: &str, body: &str) -> String {
        PLAIN.replace("</opencv_storage>", &format!("<{0}>{1}</{0}>\n</opencv_storage>", name, body))
    }

    fn block_of(result: Result<CalibrationParameters>) -> String {
        match result {
            Err(OverlayError::Configuration { block, .. }) => block,
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn parses_plain_blocks() {
        let calib = CalibrationParameters::from_xml_str(PLAIN).unwrap();
        assert_eq!(calib.image_size, ImageSize::new(1280, 720));
        assert_eq!(calib.rotation[(0, 0)], 9.9995961310770576e-01);
        assert_eq!(calib.rotation[(1, 2)], 7.8740920161649047e-02);
        assert_eq!(calib.rotation[(2, 1)], -7.8737961416805169e-02);
        assert_eq!(calib.translation.y, -6.3045718819563251e+02);
        assert_eq!(calib.projector.intrinsics(), Intrinsics::new(1000.0, 1000.0, 640.0, 360.0));
        assert!(calib.projector.distortion.is_zero());
        assert!(calib.camera.is_none());
        assert!(!calib.live_intrinsics);
    }

    #[test]
    fn translation_scales_to_meters() {
        let calib = CalibrationParameters::from_xml_str(PLAIN).unwrap();
        assert_relative_eq!(calib.translation_m().x, 0.085737214348908466, epsilon = 1e-15);
        let e = calib.extrinsic();
        assert_relative_eq!(e[(1, 3)], -0.63045718819563251, epsilon = 1e-15);
        assert_eq!(e[(3, 3)], 1.0);
    }

    #[test]
    fn parses_opencv_matrix_blocks() {
        let xml = with_block(
            "proj_dist",
            r#"<rows>1</rows><cols>5</cols><dt>d</dt>
            <data>1.e-01 -2.5e-01 1.0e-03 -5.0e-04 8.0e-02</data>"#,
        );
        let calib = CalibrationParameters::from_xml_str(&xml).unwrap();
        assert_eq!(
            calib.projector.distortion,
            DistortionCoeffs::new(0.1, -0.25, 0.001, -0.0005, 0.08)
        );
    }

    #[test]
    fn declared_shape_must_match() {
        let xml = with_block(
            "proj_dist",
            "<rows>3</rows><cols>3</cols><dt>d</dt><data>1 2 3 4 5</data>",
        );
        assert_eq!(block_of(CalibrationParameters::from_xml_str(&xml)), "proj_dist");
    }

    #[test]
    fn camera_lens_is_optional() {
        let xml = with_block("cam_int", "600 0 320 0 600 240 0 0 1");
        let calib = CalibrationParameters::from_xml_str(&xml).unwrap();
        let camera = calib.camera.unwrap();
        assert_eq!(camera.intrinsics(), Intrinsics::new(600.0, 600.0, 320.0, 240.0));
        assert!(camera.distortion.is_zero());
    }

    #[test]
    fn malformed_token_fails_whole_block() {
        // "1.2." would once have been trimmed and accepted
        let xml = PLAIN.replace("<translation>8.5737214348908466e+01", "<translation>1.2.");
        assert_eq!(block_of(CalibrationParameters::from_xml_str(&xml)), "translation");

        let err = parse_block("rotation", "1 0 0 0 x 0 0 0 1", 9).unwrap_err();
        assert!(err.to_string().contains("`x`"));
    }

    #[test]
    fn malformed_token_is_not_compacted() {
        // ten tokens with one bad one must not collapse into nine good values
        let err = parse_block("rotation", "1 0 0 0 1 0 0 0 1 oops", 9).unwrap_err();
        assert_eq!(err.block(), Some("rotation"));
    }

    #[test]
    fn non_finite_tokens_are_rejected() {
        assert!(parse_block("translation", "1 NaN 3", 3).is_err());
        assert!(parse_block("translation", "1 inf 3", 3).is_err());
    }

    #[test]
    fn scientific_notation_is_accepted() {
        let v = parse_block("translation", "9.99e-01\n-1E+3   2.5e0", 3).unwrap();
        assert_eq!(v, vec![0.999, -1000.0, 2.5]);
    }

    #[test]
    fn wrong_count_is_rejected() {
        let err = parse_block("img_shape", "720 1280 3", 2).unwrap_err();
        assert!(err.to_string().contains("expected 2 values, found 3"));
    }

    #[test]
    fn missing_block_is_named() {
        for name in ["rotation", "translation", "img_shape", "proj_int"] {
            let start = PLAIN.find(&format!("<{}>", name)).unwrap();
            let end_tag = format!("</{}>", name);
            let end = PLAIN.find(&end_tag).unwrap() + end_tag.len();
            let xml = format!("{}{}", &PLAIN[..start], &PLAIN[end..]);
            assert_eq!(block_of(CalibrationParameters::from_xml_str(&xml)), name);
        }
    }

    #[test]
    fn swapped_img_shape_is_detected() {
        // width-first file with cx past the 720 px the swapped shape allows
        let xml = PLAIN
            .replace("<img_shape>720 1280", "<img_shape>1280 720")
            .replace("1000 0 640", "1000 0 1000");
        assert_eq!(block_of(CalibrationParameters::from_xml_str(&xml)), "img_shape");
    }

    #[test]
    fn non_pinhole_intrinsics_are_rejected() {
        let skewed = PLAIN.replace("1000 0 640", "1000 50 640");
        assert_eq!(block_of(CalibrationParameters::from_xml_str(&skewed)), "proj_int");

        let scaled = PLAIN.replace("0 0 1</proj_int>", "0 0 2</proj_int>");
        assert_eq!(block_of(CalibrationParameters::from_xml_str(&scaled)), "proj_int");

        let skewed_camera = with_block("cam_int", "600 0 320 3 600 240 0 0 1");
        assert_eq!(block_of(CalibrationParameters::from_xml_str(&skewed_camera)), "cam_int");
    }

    #[test]
    fn lens_shift_below_image_is_accepted() {
        let xml = PLAIN.replace("0 1000 360", "0 1000 850");
        let calib = CalibrationParameters::from_xml_str(&xml).unwrap();
        assert_eq!(calib.projector.intrinsics().cy, 850.0);
    }

    #[test]
    fn fractional_img_shape_is_rejected() {
        let xml = PLAIN.replace("<img_shape>720 1280", "<img_shape>720.5 1280");
        assert_eq!(block_of(CalibrationParameters::from_xml_str(&xml)), "img_shape");
    }

    #[test]
    fn non_rotation_is_rejected() {
        let start = PLAIN.find("<rotation>").unwrap();
        let end = PLAIN.find("</rotation>").unwrap();
        let scaled = format!("{}<rotation>2 0 0 0 2 0 0 0 2{}", &PLAIN[..start], &PLAIN[end..]);
        assert_eq!(block_of(CalibrationParameters::from_xml_str(&scaled)), "rotation");
        let mirrored = format!("{}<rotation>-1 0 0 0 1 0 0 0 1{}", &PLAIN[..start], &PLAIN[end..]);
        assert_eq!(block_of(CalibrationParameters::from_xml_str(&mirrored)), "rotation");
    }

    #[test]
    fn invalid_xml_is_configuration_error() {
        assert_eq!(block_of(CalibrationParameters::from_xml_str("<opencv_storage>")), "file");
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let result = CalibrationParameters::load("/nonexistent/calibration_result.xml");
        assert_eq!(block_of(result), "file");
    }

    #[test]
    fn update_replaces_camera_only() {
        let calib = CalibrationParameters::from_xml_str(PLAIN).unwrap();
        let live = LiveIntrinsics {
            fx: 605.5,
            fy: 604.9,
            cx: 639.1,
            cy: 366.8,
            dist_coefs: vec![0.5, -2.6, 0.0008, -0.0002, 1.5],
        };
        let updated = calib.update(&live).unwrap();
        assert!(updated.live_intrinsics);
        assert_eq!(updated.rotation, calib.rotation);
        assert_eq!(updated.translation, calib.translation);
        assert_eq!(updated.image_size, calib.image_size);
        assert_eq!(updated.projector, calib.projector);
        let camera = updated.camera.unwrap();
        assert_eq!(camera.intrinsics(), Intrinsics::new(605.5, 604.9, 639.1, 366.8));
        assert_eq!(camera.distortion.to_array(), [0.5, -2.6, 0.0008, -0.0002, 1.5]);
    }

    #[test]
    fn live_intrinsics_distortion_lengths() {
        let mut live = LiveIntrinsics {
            fx: 600.0,
            fy: 600.0,
            cx: 320.0,
            cy: 240.0,
            dist_coefs: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8],
        };
        assert_eq!(live.to_lens().unwrap().distortion.k3, 0.5);
        live.dist_coefs = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(live.to_lens().unwrap().distortion.k3, 0.0);
        live.dist_coefs = vec![0.1, 0.2, 0.3];
        assert!(live.to_lens().is_err());
        live.dist_coefs.clear();
        live.fx = 0.0;
        assert!(live.to_lens().is_err());
    }

    #[test]
    fn live_intrinsics_from_json() {
        let live: LiveIntrinsics =
            serde_json::from_str(r#"{"fx":1.0,"fy":2.0,"cx":3.0,"cy":4.0,"dist_coefs":[]}"#)
                .unwrap();
        assert_eq!(live.cy, 4.0);
        assert!(live.dist_coefs.is_empty());
    }
}
