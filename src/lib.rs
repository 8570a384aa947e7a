//! Projector overlay calibration and projection.
//!
//! Loads a projector/depth-sensor calibration, keeps the projector pose in
//! step with the tracked sensor, and maps robot-frame points to projector
//! pixels so overlays land on the right spot of the physical workspace.

pub mod anchors;
pub mod calibration;
pub mod calibration_store;
pub mod camera;
pub mod config;
pub mod distortion;
pub mod error;
pub mod frames;
pub mod projection;
pub mod remote;
pub mod rig;

pub use calibration::{CalibrationParameters, LensModel, LiveIntrinsics};
pub use calibration_store::CalibrationStore;
pub use config::OverlayConfig;
pub use error::{OverlayError, Result};
pub use projection::{CanvasOrigin, ProjectionMapper, ProjectionOptions, ScreenPoint};
pub use remote::{DeviceRpc, RemoteCalibrationFetcher};
pub use rig::{RigPose, RigPoseTracker};
