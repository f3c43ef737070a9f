use crate::{
    cli::App,
    error, info,
    quiz::{DEFAULT_POLL_INTERVAL, DevicePoller, DeviceStatus, check_devices},
    spotify::player,
    success, warning,
};

pub async fn devices(app: &App) {
    match player::get_devices(&app.api).await {
        Ok(devices) if devices.is_empty() => {
            warning!("No active device detected. Open Spotify on any device and start playing.")
        }
        Ok(devices) => {
            for device in devices {
                if device.is_active {
                    success!("{} ({}) - active", device.name, device.kind);
                } else {
                    info!("{} ({})", device.name, device.kind);
                }
            }
        }
        Err(e) => error!("Unable to check devices: {}", e),
    }
}

/// Prints device status changes until interrupted.
pub async fn watch_devices(app: &App) {
    print_status(&check_devices(&app.api).await);

    let poller = DevicePoller::spawn(app.api.clone(), DEFAULT_POLL_INTERVAL);
    let mut rx = poller.subscribe();

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = rx.borrow_and_update().clone();
                print_status(&status);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    poller.stop();
}

fn print_status(status: &DeviceStatus) {
    match status {
        DeviceStatus::Active(name) => success!("Active device: {}", name),
        DeviceStatus::NoActiveDevice => warning!("No active device detected"),
        DeviceStatus::Unknown => warning!("Unable to check devices"),
    }
}
