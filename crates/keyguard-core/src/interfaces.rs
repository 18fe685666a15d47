//! Collaborators driven by the unlock flow.
//!
//! Both traits use `async-trait` so executors can hold `Arc<dyn ...>`.

use async_trait::async_trait;

use crate::error::UnlockResult;
use crate::types::{CredentialType, ElementRef, Locator, Position, Size, TouchAction};

/// Privileged channel to the device (key events, shell, lock settings).
#[async_trait]
pub trait DeviceControl: Send + Sync {
    async fn is_screen_locked(&self) -> UnlockResult<bool>;

    /// Inject a platform key code.
    async fn keyevent(&self, code: u32) -> UnlockResult<()>;

    /// Run a shell command on the device, returning its stdout.
    async fn shell(&self, args: &[&str]) -> UnlockResult<String>;

    async fn api_level(&self) -> UnlockResult<u32>;

    /// Whether a lock credential is currently configured.
    async fn is_lock_enabled(&self) -> UnlockResult<bool>;

    async fn clear_lock_credential(&self, credential: &str) -> UnlockResult<()>;

    async fn set_lock_credential(
        &self,
        credential_type: CredentialType,
        credential: &str,
    ) -> UnlockResult<()>;

    /// Turn the screen off and on again.
    async fn cycle_wake_up(&self) -> UnlockResult<()>;

    async fn dismiss_keyguard(&self) -> UnlockResult<()>;

    /// Simulate a fingerprint touch (emulators only).
    async fn fingerprint(&self, finger_id: &str) -> UnlockResult<()>;
}

/// Element lookup and touch input on the current screen.
#[async_trait]
pub trait UiDriver: Send + Sync {
    async fn find_element(&self, locator: &Locator) -> UnlockResult<Option<ElementRef>>;

    /// All matches, possibly empty.
    async fn find_elements(&self, locator: &Locator) -> UnlockResult<Vec<ElementRef>>;

    async fn get_attribute(&self, name: &str, element: &ElementRef) -> UnlockResult<String>;

    async fn click(&self, element: &ElementRef) -> UnlockResult<()>;

    /// Top-left corner of the element on screen.
    async fn get_location(&self, element: &ElementRef) -> UnlockResult<Position>;

    async fn get_size(&self, element: &ElementRef) -> UnlockResult<Size>;

    /// Perform the actions as one continuous gesture.
    async fn perform_touch(&self, actions: &[TouchAction]) -> UnlockResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn assert_dyn_device(_: Option<&dyn DeviceControl>) {}
        fn assert_dyn_ui(_: Option<&dyn UiDriver>) {}
        assert_dyn_device(None);
        assert_dyn_ui(None);
    }
}
