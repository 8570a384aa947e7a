use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, Result};
use crate::projection::ProjectionOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Calibration XML written by the structured-light calibration tool
    pub calibration_path: PathBuf,
    /// Depth sensor to read live colour intrinsics from
    pub device_id: Option<String>,
    pub projection: ProjectionOptions,
    /// env_logger filter used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            calibration_path: PathBuf::from("calibration_result.xml"),
            device_id: None,
            projection: ProjectionOptions::default(),
            log_level: "info".to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<OverlayConfig> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            OverlayError::configuration("config", format!("{}: {}", path.display(), e))
        })?;
        OverlayConfig::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<OverlayConfig> {
        serde_json::from_str(text).map_err(|e| OverlayError::configuration("config", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::CanvasOrigin;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(OverlayConfig::from_json("{}").unwrap(), OverlayConfig::default());
    }

    #[test]
    fn partial_projection_section() {
        let config = OverlayConfig::from_json(
            r#"{"device_id": "kinect-azure", "projection": {"origin": "centered", "lens_distortion": true}}"#,
        )
        .unwrap();
        assert_eq!(config.device_id.as_deref(), Some("kinect-azure"));
        assert_eq!(config.projection.origin, CanvasOrigin::Centered);
        assert!(config.projection.lens_distortion);
        assert!(config.projection.flip_y);
        assert_eq!(config.calibration_path, PathBuf::from("calibration_result.xml"));
    }

    #[test]
    fn malformed_config_is_configuration_error() {
        let err = OverlayConfig::from_json(r#"{"projection": {"origin": "diagonal"}}"#).unwrap_err();
        assert_eq!(err.block(), Some("config"));
        let err = OverlayConfig::from_file("/nonexistent/overlay.json").unwrap_err();
        assert_eq!(err.block(), Some("config"));
    }
}
