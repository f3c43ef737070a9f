use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, warn};

use crate::spotify::{ApiClient, player};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    Unknown,
    NoActiveDevice,
    Active(String),
}

/// One device check. Failures are logged and reported as `Unknown`.
pub async fn check_devices(api: &ApiClient) -> DeviceStatus {
    match player::get_devices(api).await {
        Ok(devices) => match devices.into_iter().find(|d| d.is_active) {
            Some(device) => DeviceStatus::Active(device.name),
            None => DeviceStatus::NoActiveDevice,
        },
        Err(e) => {
            warn!("Error checking devices: {}", e);
            DeviceStatus::Unknown
        }
    }
}

/// Background device status polling.
///
/// Cycles run strictly one after another on a single task. A cycle is
/// skipped while the surface is hidden or no valid token exists. The task
/// ends on [`DevicePoller::stop`] or when the poller is dropped.
pub struct DevicePoller {
    visible: Arc<AtomicBool>,
    status: watch::Receiver<DeviceStatus>,
    handle: JoinHandle<()>,
}

impl DevicePoller {
    /// A zero `period` falls back to [`DEFAULT_POLL_INTERVAL`].
    pub fn spawn(api: Arc<ApiClient>, period: Duration) -> Self {
        let period = if period.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            period
        };
        let visible = Arc::new(AtomicBool::new(true));
        let (tx, rx) = watch::channel(DeviceStatus::Unknown);

        let task_visible = Arc::clone(&visible);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                if !task_visible.load(Ordering::SeqCst) {
                    continue;
                }

                match api.tokens().get_access_token().await {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        debug!("logged out, skipping device poll");
                        tx.send_replace(DeviceStatus::Unknown);
                        continue;
                    }
                    Err(e) => {
                        warn!("Error reading token for device poll: {}", e);
                        tx.send_replace(DeviceStatus::Unknown);
                        continue;
                    }
                }

                let status = check_devices(&api).await;
                tx.send_if_modified(|current| {
                    if *current == status {
                        false
                    } else {
                        *current = status;
                        true
                    }
                });

                if tx.is_closed() {
                    break;
                }
            }
        });

        Self {
            visible,
            status: rx,
            handle,
        }
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    pub fn status(&self) -> DeviceStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DeviceStatus> {
        self.status.clone()
    }

    pub fn stop(self) {}
}

impl Drop for DevicePoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
