pub mod fast;
pub mod keyguard;
pub mod strategies;
pub mod unlocker;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use fast::{fast_unlock, ClearedCredential};
pub use strategies::{execute, PinAttempt, PinUnlock, UnlockContext};
pub use unlocker::{fast_unlock_options, UnlockOutcome, UnlockRequest, UnlockStrategy, Unlocker};
