//! Talks to a real device through the `adb` binary.
//!
//! [`AdbDevice`] implements the privileged device channel; [`AdbUi`] resolves
//! elements from `uiautomator dump` output and injects input with `input`.

pub mod device;
pub mod hierarchy;
pub mod ui;

pub use device::AdbDevice;
pub use ui::AdbUi;
