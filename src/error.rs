use thiserror::Error;

pub type Result<T> = std::result::Result<T, OverlayError>;

#[derive(Debug, Error)]
pub enum OverlayError {
    /// Calibration or config source is missing or malformed. Fatal to startup.
    #[error("configuration error in `{block}`: {reason}")]
    Configuration { block: String, reason: String },

    /// The remote write-lock could not be acquired, even after one forced release.
    #[error("cannot lock device {device_id}: {reason}")]
    DeviceLock { device_id: String, reason: String },

    #[error("device {device_id} is busy")]
    DeviceBusy { device_id: String },

    /// Any other failure reported by the remote collaborator.
    #[error("request to device {device_id} failed: {reason}")]
    Rpc { device_id: String, reason: String },
}

impl OverlayError {
    #[inline]
    pub fn configuration(block: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            block: block.into(),
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn device_lock(device_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DeviceLock {
            device_id: device_id.into(),
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn rpc(device_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rpc {
            device_id: device_id.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending calibration block, for configuration errors.
    pub fn block(&self) -> Option<&str> {
        match self {
            Self::Configuration { block, .. } => Some(block),
            _ => None,
        }
    }

    pub fn is_lock_contention(&self) -> bool {
        matches!(self, Self::DeviceLock { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_names_block() {
        let err = OverlayError::configuration("img_shape", "expected 2 values, found 3");
        assert_eq!(err.block(), Some("img_shape"));
        assert_eq!(
            err.to_string(),
            "configuration error in `img_shape`: expected 2 values, found 3"
        );
    }

    #[test]
    fn lock_errors_are_contention() {
        assert!(OverlayError::device_lock("kinect", "held").is_lock_contention());
        assert!(!OverlayError::rpc("kinect", "timeout").is_lock_contention());
        assert_eq!(OverlayError::rpc("kinect", "timeout").block(), None);
    }
}
