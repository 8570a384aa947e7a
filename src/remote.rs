//! Live colour-camera intrinsics from the sensor device.
//!
//! Protocol per fetch: write-lock the device, read the colour camera
//! parameters, merge them into the calibration store, unlock. A lock that is
//! already held is force-released once and re-acquired once.
//!
//! Fetches for the same device are queued. The remote lock is released on
//! every exit path; if the fetch future is dropped while the lock is held,
//! the unlock is spawned on the current runtime and the device queue stays
//! blocked until it has gone through.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use log::{debug, info, warn};
use tokio::sync::OwnedMutexGuard;

use crate::calibration::{CalibrationParameters, LiveIntrinsics};
use crate::calibration_store::CalibrationStore;
use crate::error::{OverlayError, Result};

/// Lock/unlock/parameter RPCs exposed by the scene server for a device.
pub trait DeviceRpc: Send + Sync + 'static {
    /// Fails with [`OverlayError::DeviceLock`] when the lock is already held.
    fn write_lock<'a>(&'a self, device_id: &'a str, exclusive: bool) -> BoxFuture<'a, Result<()>>;

    fn write_unlock<'a>(&'a self, device_id: &'a str) -> BoxFuture<'a, Result<()>>;

    fn get_camera_color_parameters<'a>(
        &'a self,
        device_id: &'a str,
    ) -> BoxFuture<'a, Result<LiveIntrinsics>>;
}

pub struct RemoteCalibrationFetcher<R: DeviceRpc> {
    rpc: Arc<R>,
    store: Arc<CalibrationStore>,
    queues: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<R: DeviceRpc> RemoteCalibrationFetcher<R> {
    pub fn new(rpc: Arc<R>, store: Arc<CalibrationStore>) -> RemoteCalibrationFetcher<R> {
        RemoteCalibrationFetcher {
            rpc,
            store,
            queues: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<CalibrationStore> {
        &self.store
    }

    /// Fetches and merges live intrinsics, waiting behind any fetch already
    /// running for `device_id`.
    pub async fn fetch_live(&self, device_id: &str) -> Result<Arc<CalibrationParameters>> {
        let slot = self.queue(device_id).lock_owned().await;
        self.fetch_locked(device_id, slot).await
    }

    /// Like [`fetch_live`](Self::fetch_live) but fails with
    /// [`OverlayError::DeviceBusy`] instead of waiting.
    pub async fn try_fetch_live(&self, device_id: &str) -> Result<Arc<CalibrationParameters>> {
        let slot = self
            .queue(device_id)
            .try_lock_owned()
            .map_err(|_| OverlayError::DeviceBusy {
                device_id: device_id.to_string(),
            })?;
        self.fetch_locked(device_id, slot).await
    }

    fn queue(&self, device_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut queues = match self.queues.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // idle queues hold the only reference to their mutex
        queues.retain(|_, queue| Arc::strong_count(queue) > 1);
        Arc::clone(queues.entry(device_id.to_string()).or_default())
    }

    /// A failed unlock is logged, not returned; the merge result decides the outcome.
    async fn fetch_locked(
        &self,
        device_id: &str,
        slot: OwnedMutexGuard<()>,
    ) -> Result<Arc<CalibrationParameters>> {
        self.acquire(device_id).await?;
        // only a lock we know we hold is released on drop
        let guard = DeviceLockGuard::new(Arc::clone(&self.rpc), device_id, slot);
        debug!("device {} locked", device_id);

        let merged = match self.rpc.get_camera_color_parameters(device_id).await {
            Ok(live) => self.store.update(&live),
            Err(e) => Err(e),
        };
        if let Err(e) = guard.release().await {
            warn!("{} was not unlocked: {}", device_id, e);
        }

        let calib = merged?;
        info!("live intrinsics fetched from {}", device_id);
        Ok(calib)
    }

    async fn acquire(&self, device_id: &str) -> Result<()> {
        match self.rpc.write_lock(device_id, true).await {
            Err(e) if e.is_lock_contention() => {
                warn!("{}; forcing release and retrying once", e);
                self.rpc.write_unlock(device_id).await?;
                self.rpc.write_lock(device_id, true).await
            }
            other => other,
        }
    }
}

/// Holds the remote write-lock and this device's queue slot.
struct DeviceLockGuard<R: DeviceRpc> {
    rpc: Arc<R>,
    device_id: String,
    slot: Option<OwnedMutexGuard<()>>,
    armed: bool,
}

impl<R: DeviceRpc> DeviceLockGuard<R> {
    fn new(rpc: Arc<R>, device_id: &str, slot: OwnedMutexGuard<()>) -> DeviceLockGuard<R> {
        DeviceLockGuard {
            rpc,
            device_id: device_id.to_string(),
            slot: Some(slot),
            armed: true,
        }
    }

    async fn release(mut self) -> Result<()> {
        let result = self.rpc.write_unlock(&self.device_id).await;
        self.armed = false;
        debug!("device {} unlocked", self.device_id);
        result
    }
}

impl<R: DeviceRpc> Drop for DeviceLockGuard<R> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let rpc = Arc::clone(&self.rpc);
        let device_id = std::mem::take(&mut self.device_id);
        let slot = self.slot.take();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("fetch for {} dropped while locked, releasing", device_id);
                handle.spawn(async move {
                    if let Err(e) = rpc.write_unlock(&device_id).await {
                        warn!("release of {} failed: {}", device_id, e);
                    }
                    drop(slot);
                });
            }
            Err(_) => warn!("no runtime to release {}, lock left held", device_id),
        }
    }
}
