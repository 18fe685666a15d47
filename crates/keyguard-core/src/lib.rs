pub mod config;
pub mod error;
pub mod geometry;
pub mod interfaces;
pub mod keycode;
pub mod lifecycle;
pub mod types;
pub mod validate;

pub use error::{UnlockError, UnlockResult};
pub use interfaces::{DeviceControl, UiDriver};
pub use types::{
    CredentialType, ElementRef, FastUnlockOptions, Locator, Position, Size, TouchAction,
    UnlockCapabilities, UnlockType,
};
pub use validate::validate_unlock_capabilities;
