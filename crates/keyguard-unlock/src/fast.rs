//! Unlock by temporarily removing the lock credential instead of typing it.

use std::future::Future;

use keyguard_core::error::{UnlockError, UnlockResult};
use keyguard_core::types::FastUnlockOptions;
use keyguard_core::DeviceControl;

/// The device with its lock credential cleared.
///
/// Obtained with [`ClearedCredential::acquire`] and consumed by
/// [`ClearedCredential::scope`], which puts the credential back on every exit
/// path. If no lock was enabled at acquisition, nothing is cleared or restored.
#[must_use = "the credential is only restored through `scope` or `restore`"]
pub struct ClearedCredential<'a> {
    device: &'a dyn DeviceControl,
    options: &'a FastUnlockOptions,
    was_lock_enabled: bool,
}

impl<'a> ClearedCredential<'a> {
    pub async fn acquire(
        device: &'a dyn DeviceControl,
        options: &'a FastUnlockOptions,
    ) -> UnlockResult<Self> {
        let was_lock_enabled = device.is_lock_enabled().await?;
        if !was_lock_enabled {
            tracing::info!("No active lock has been detected. Proceeding to the keyguard dismissal");
            return Ok(Self {
                device,
                options,
                was_lock_enabled,
            });
        }

        device.clear_lock_credential(&options.credential).await?;
        let guard = Self {
            device,
            options,
            was_lock_enabled,
        };
        // Dismissal alone does not light the screen after the credential is cleared.
        if let Err(e) = device.cycle_wake_up().await {
            let restored = guard.restore().await;
            return Err(first_error(e, restored));
        }
        Ok(guard)
    }

    pub fn was_lock_enabled(&self) -> bool {
        self.was_lock_enabled
    }

    /// Put the original credential back.
    pub async fn restore(self) -> UnlockResult<()> {
        if !self.was_lock_enabled {
            return Ok(());
        }
        tracing::debug!("Restoring the {} lock credential", self.options.credential_type);
        self.device
            .set_lock_credential(self.options.credential_type, &self.options.credential)
            .await
    }

    /// Run `body` against the unlocked device, then restore.
    ///
    /// An error from `body` wins over an error from restoring.
    pub async fn scope<T, F, Fut>(self, body: F) -> UnlockResult<T>
    where
        F: FnOnce(&'a dyn DeviceControl) -> Fut,
        Fut: Future<Output = UnlockResult<T>>,
    {
        let outcome = body(self.device).await;
        let restored = self.restore().await;
        match outcome {
            Ok(value) => restored.map(|()| value),
            Err(e) => Err(first_error(e, restored)),
        }
    }
}

/// Keep `err`, logging a restore failure that would otherwise be lost.
fn first_error(err: UnlockError, restored: UnlockResult<()>) -> UnlockError {
    if let Err(restore_err) = restored {
        tracing::error!("Failed to restore the lock credential: {restore_err}");
    }
    err
}

/// Clear the lock credential, dismiss the keyguard, restore the credential.
pub async fn fast_unlock(device: &dyn DeviceControl, options: &FastUnlockOptions) -> UnlockResult<()> {
    tracing::info!(
        "Unlocking the device via locksettings using a {} credential",
        options.credential_type
    );
    ClearedCredential::acquire(device, options)
        .await?
        .scope(|device| async move { device.dismiss_keyguard().await })
        .await
}
