//! Capability gate run before any device interaction.

use crate::error::{UnlockError, UnlockResult};
use crate::types::{UnlockCapabilities, UnlockType};

pub const PASSWORD_MIN_LENGTH: usize = 4;
pub const PATTERN_MIN_DIGITS: usize = 2;
pub const PATTERN_MAX_DIGITS: usize = 9;

/// Check that `unlock_key` has the shape required by `unlock_type`.
///
/// The key is returned verbatim; trimming only applies to the checks.
pub fn validate_unlock_capabilities(
    unlock_type: &str,
    unlock_key: &str,
) -> UnlockResult<UnlockCapabilities> {
    let parsed: UnlockType = unlock_type.parse()?;
    validate_key(parsed, unlock_key)?;
    Ok(UnlockCapabilities {
        unlock_type: parsed,
        unlock_key: unlock_key.to_string(),
    })
}

/// Key grammar for an already-parsed unlock type.
pub fn validate_key(unlock_type: UnlockType, unlock_key: &str) -> UnlockResult<()> {
    match unlock_type {
        UnlockType::Pin | UnlockType::PinWithKeyEvent | UnlockType::Fingerprint => {
            let key = unlock_key.trim();
            if key.is_empty() || !key.chars().all(|c| c.is_ascii_digit()) {
                return Err(UnlockError::validation(format!(
                    "Unlock key value '{unlock_key}' must only consist of digits"
                )));
            }
        }
        UnlockType::Pattern => {
            let key = unlock_key.trim();
            let in_range = (PATTERN_MIN_DIGITS..=PATTERN_MAX_DIGITS).contains(&key.len())
                && key.chars().all(|c| ('1'..='9').contains(&c));
            if !in_range {
                return Err(UnlockError::validation(format!(
                    "Unlock key value '{unlock_key}' must only include from two to nine digits in range 1..9"
                )));
            }
            if has_repeated_digit(key) {
                return Err(UnlockError::validation(format!(
                    "Unlock key value '{unlock_key}' must define a pattern without repeated digits"
                )));
            }
        }
        UnlockType::Password => {
            if unlock_key.chars().count() < PASSWORD_MIN_LENGTH {
                return Err(UnlockError::validation(format!(
                    "The minimum allowed length is {PASSWORD_MIN_LENGTH} characters for a password unlock key"
                )));
            }
        }
    }
    Ok(())
}

fn has_repeated_digit(key: &str) -> bool {
    let bytes = key.as_bytes();
    bytes
        .iter()
        .enumerate()
        .any(|(i, b)| bytes[i + 1..].contains(b))
}
