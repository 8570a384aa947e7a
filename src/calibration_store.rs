use std::path::Path;
use std::sync::{Arc, RwLock};

use log::{debug, info};

use crate::calibration::{CalibrationParameters, LiveIntrinsics};
use crate::error::Result;

/// Owner of the current calibration.
///
/// Readers take an `Arc` snapshot; writers build a complete replacement and
/// swap it in, so no reader ever sees a half-updated calibration.
#[derive(Debug)]
pub struct CalibrationStore {
    current: RwLock<Arc<CalibrationParameters>>,
}

impl CalibrationStore {
    pub fn new(calib: CalibrationParameters) -> CalibrationStore {
        CalibrationStore {
            current: RwLock::new(Arc::new(calib)),
        }
    }

    /// Parses `path`; nothing is published unless every block is valid.
    pub fn load(path: impl AsRef<Path>) -> Result<CalibrationStore> {
        Ok(CalibrationStore::new(CalibrationParameters::load(path)?))
    }

    pub fn snapshot(&self) -> Arc<CalibrationParameters> {
        // a poisoned lock still guards a whole, valid Arc
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn replace(&self, calib: CalibrationParameters) {
        let calib = Arc::new(calib);
        match self.current.write() {
            Ok(mut guard) => *guard = calib,
            Err(poisoned) => *poisoned.into_inner() = calib,
        }
    }

    /// Merges live sensor intrinsics, keeping extrinsics and image size from the file.
    /// Merged under the write lock; a concurrent `replace` or `reload` is never reverted.
    pub fn update(&self, live: &LiveIntrinsics) -> Result<Arc<CalibrationParameters>> {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let merged = Arc::new(guard.update(live)?);
        *guard = Arc::clone(&merged);
        drop(guard);
        debug!(
            "live intrinsics merged: fx={} fy={} cx={} cy={}",
            live.fx, live.fy, live.cx, live.cy
        );
        info!("sensor camera intrinsics updated from device");
        Ok(merged)
    }

    /// Re-reads the calibration file, keeping the old parameters on failure.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<Arc<CalibrationParameters>> {
        let calib = CalibrationParameters::load(path)?;
        self.replace(calib);
        Ok(self.snapshot())
    }
}
