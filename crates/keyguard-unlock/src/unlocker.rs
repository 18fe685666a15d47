use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use keyguard_core::config::UnlockConfig;
use keyguard_core::error::{UnlockError, UnlockResult};
use keyguard_core::types::{FastUnlockOptions, UnlockCapabilities, UnlockType};
use keyguard_core::validate::validate_unlock_capabilities;
use keyguard_core::{DeviceControl, UiDriver};

use crate::fast::fast_unlock;
use crate::strategies::{execute, UnlockContext};

/// How the credential reaches the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnlockStrategy {
    /// Simulate the user on the lock screen.
    #[default]
    Uiautomator,
    /// Clear and restore the credential through `locksettings`.
    Locksettings,
}

impl fmt::Display for UnlockStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnlockStrategy::Uiautomator => f.write_str("uiautomator"),
            UnlockStrategy::Locksettings => f.write_str("locksettings"),
        }
    }
}

impl FromStr for UnlockStrategy {
    type Err = UnlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uiautomator" => Ok(UnlockStrategy::Uiautomator),
            "locksettings" => Ok(UnlockStrategy::Locksettings),
            other => Err(UnlockError::validation(format!(
                "Unknown unlock strategy '{other}'. Supported: uiautomator, locksettings"
            ))),
        }
    }
}

/// Raw unlock input as received at the boundary.
#[derive(Debug, Clone)]
pub struct UnlockRequest {
    pub unlock_type: String,
    pub unlock_key: String,
    pub strategy: UnlockStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    AlreadyUnlocked,
    Unlocked,
}

/// Entry point: validates, dispatches and verifies one unlock attempt.
pub struct Unlocker {
    device: Arc<dyn DeviceControl>,
    ui: Arc<dyn UiDriver>,
    config: UnlockConfig,
}

impl Unlocker {
    pub fn new(device: Arc<dyn DeviceControl>, ui: Arc<dyn UiDriver>, config: UnlockConfig) -> Self {
        Self { device, ui, config }
    }

    pub async fn unlock(&self, request: &UnlockRequest) -> UnlockResult<UnlockOutcome> {
        if !self.device.is_screen_locked().await? {
            tracing::info!("Screen already unlocked, doing nothing");
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        let caps = validate_unlock_capabilities(&request.unlock_type, &request.unlock_key)?;
        match request.strategy {
            UnlockStrategy::Uiautomator => self.unlock_with_capabilities(&caps).await?,
            UnlockStrategy::Locksettings => {
                let options = fast_unlock_options(&caps)?;
                fast_unlock(self.device.as_ref(), &options).await?;
            }
        }

        self.verify_unlocked().await?;
        tracing::info!("Device unlocked");
        Ok(UnlockOutcome::Unlocked)
    }

    /// Drive the lock screen for already validated capabilities. No verification.
    pub async fn unlock_with_capabilities(&self, caps: &UnlockCapabilities) -> UnlockResult<()> {
        let ctx = UnlockContext {
            device: self.device.as_ref(),
            ui: self.ui.as_ref(),
            config: &self.config,
        };
        execute(&ctx, caps).await
    }

    /// Poll until the lock screen is gone or the success timeout passes.
    pub async fn verify_unlocked(&self) -> UnlockResult<()> {
        let deadline = tokio::time::Instant::now() + self.config.success_timeout();
        loop {
            if !self.device.is_screen_locked().await? {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(UnlockError::StillLocked {
                    timeout_ms: self.config.success_timeout_ms,
                });
            }
            tokio::time::sleep(self.config.verify_interval()).await;
        }
    }
}

/// Credential options for the `locksettings` strategy.
pub fn fast_unlock_options(caps: &UnlockCapabilities) -> UnlockResult<FastUnlockOptions> {
    let credential_type = caps.unlock_type.credential_type().ok_or_else(|| {
        UnlockError::validation(format!(
            "Unlock type '{}' cannot be used with the locksettings strategy",
            caps.unlock_type
        ))
    })?;
    let credential = match caps.unlock_type {
        UnlockType::Password => caps.unlock_key.clone(),
        _ => caps.unlock_key.trim().to_string(),
    };
    Ok(FastUnlockOptions {
        credential,
        credential_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyguard_core::types::CredentialType;

    #[test]
    fn strategy_parsing() {
        assert_eq!("uiautomator".parse::<UnlockStrategy>().unwrap(), UnlockStrategy::Uiautomator);
        assert_eq!("LockSettings".parse::<UnlockStrategy>().unwrap(), UnlockStrategy::Locksettings);
        assert!("adb".parse::<UnlockStrategy>().is_err());
        assert_eq!(UnlockStrategy::default().to_string(), "uiautomator");
    }

    #[test]
    fn fast_options_per_type() {
        let caps = UnlockCapabilities {
            unlock_type: UnlockType::PinWithKeyEvent,
            unlock_key: " 1234 ".into(),
        };
        let opts = fast_unlock_options(&caps).unwrap();
        assert_eq!(opts.credential_type, CredentialType::Pin);
        assert_eq!(opts.credential, "1234");

        let caps = UnlockCapabilities {
            unlock_type: UnlockType::Password,
            unlock_key: " pw  ".into(),
        };
        assert_eq!(fast_unlock_options(&caps).unwrap().credential, " pw  ");

        let caps = UnlockCapabilities {
            unlock_type: UnlockType::Fingerprint,
            unlock_key: "1".into(),
        };
        assert!(matches!(fast_unlock_options(&caps), Err(UnlockError::Validation(_))));
    }
}
