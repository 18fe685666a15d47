//! Steps shared by every UI-driven unlock: getting past the keyguard before
//! input, and confirming afterwards.

use keyguard_core::config::UnlockConfig;
use keyguard_core::error::UnlockResult;
use keyguard_core::keycode::KEYCODE_ENTER;
use keyguard_core::DeviceControl;

/// Wake the screen, collapse notifications and ask the keyguard to go away.
pub async fn dismiss_keyguard(device: &dyn DeviceControl) -> UnlockResult<()> {
    tracing::info!("Waking up the device to unlock it");
    // A full off/on cycle also clears any half-typed input on the lock screen.
    device.cycle_wake_up().await?;

    tracing::debug!("Dismissing notifications from the unlock view");
    device.shell(&["service", "call", "notification", "1"]).await?;

    tracing::debug!("Dismissing keyguard");
    device.dismiss_keyguard().await
}

/// Give the device a moment, then press enter once if it is still locked.
pub async fn wait_for_unlock(device: &dyn DeviceControl, config: &UnlockConfig) -> UnlockResult<()> {
    tokio::time::sleep(config.unlock_wait()).await;
    if !device.is_screen_locked().await? {
        return Ok(());
    }
    tracing::debug!("Screen still locked, sending enter key");
    device.keyevent(KEYCODE_ENTER).await?;
    tokio::time::sleep(config.unlock_wait()).await;
    Ok(())
}
