use std::sync::Arc;

use keyguard_adb::{AdbDevice, AdbUi};
use keyguard_core::config::AppConfig;
use keyguard_unlock::Unlocker;

pub fn create_device(config: &AppConfig) -> Arc<AdbDevice> {
    if let Some(serial) = &config.adb.serial {
        tracing::debug!("Using device {serial}");
    }
    Arc::new(AdbDevice::new(&config.adb))
}

pub fn create_unlocker(config: &AppConfig) -> Unlocker {
    let device = create_device(config);
    let ui = Arc::new(AdbUi::new(device.clone()));
    Unlocker::new(device, ui, config.unlock.clone())
}
