use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnlockError {
    /// Malformed unlock type or key. Never retried.
    #[error("Invalid unlock capabilities: {0}")]
    Validation(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Device command failed: {0}")]
    DeviceCommand(String),

    #[error("Device is still locked after {timeout_ms}ms")]
    StillLocked { timeout_ms: u64 },
}

impl UnlockError {
    pub fn validation(msg: impl Into<String>) -> Self {
        UnlockError::Validation(msg.into())
    }

    pub fn device(msg: impl Into<String>) -> Self {
        UnlockError::DeviceCommand(msg.into())
    }
}

impl From<std::io::Error> for UnlockError {
    fn from(e: std::io::Error) -> Self {
        UnlockError::DeviceCommand(e.to_string())
    }
}

pub type UnlockResult<T> = Result<T, UnlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_maps_to_device_command() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "adb: not found");
        let err: UnlockError = io.into();
        assert!(matches!(err, UnlockError::DeviceCommand(ref m) if m.contains("adb")));
    }

    #[test]
    fn still_locked_message_names_timeout() {
        let err = UnlockError::StillLocked { timeout_ms: 2000 };
        assert_eq!(err.to_string(), "Device is still locked after 2000ms");
    }
}
