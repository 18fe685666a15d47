use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub adb: AdbConfig,
    #[serde(default)]
    pub unlock: UnlockConfig,
}

/// How to reach the device.
#[derive(Debug, Clone, Deserialize)]
pub struct AdbConfig {
    #[serde(default = "default_adb_binary")]
    pub binary: String,
    /// Device serial passed as `-s`; `None` lets adb pick the only device.
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

fn default_adb_binary() -> String {
    "adb".into()
}
fn default_command_timeout_ms() -> u64 {
    20_000
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            binary: default_adb_binary(),
            serial: None,
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

/// Timing of the unlock flow.
#[derive(Debug, Clone, Deserialize)]
pub struct UnlockConfig {
    /// Pause after an unlock gesture before checking the lock state.
    #[serde(default = "default_unlock_wait_ms")]
    pub unlock_wait_ms: u64,
    /// Pause between typing a password and confirming it.
    #[serde(default = "default_input_keys_wait_ms")]
    pub input_keys_wait_ms: u64,
    /// How long to wait for the lock screen to go away after an attempt.
    #[serde(default = "default_success_timeout_ms")]
    pub success_timeout_ms: u64,
    #[serde(default = "default_verify_interval_ms")]
    pub verify_interval_ms: u64,
}

fn default_unlock_wait_ms() -> u64 {
    100
}
fn default_input_keys_wait_ms() -> u64 {
    100
}
fn default_success_timeout_ms() -> u64 {
    2000
}
fn default_verify_interval_ms() -> u64 {
    1000
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            unlock_wait_ms: default_unlock_wait_ms(),
            input_keys_wait_ms: default_input_keys_wait_ms(),
            success_timeout_ms: default_success_timeout_ms(),
            verify_interval_ms: default_verify_interval_ms(),
        }
    }
}

impl UnlockConfig {
    pub fn unlock_wait(&self) -> Duration {
        Duration::from_millis(self.unlock_wait_ms)
    }

    pub fn input_keys_wait(&self) -> Duration {
        Duration::from_millis(self.input_keys_wait_ms)
    }

    pub fn success_timeout(&self) -> Duration {
        Duration::from_millis(self.success_timeout_ms)
    }

    pub fn verify_interval(&self) -> Duration {
        Duration::from_millis(self.verify_interval_ms)
    }

    /// All waits zeroed. Used by tests that drive mocks.
    pub fn immediate() -> Self {
        Self {
            unlock_wait_ms: 0,
            input_keys_wait_ms: 0,
            success_timeout_ms: 0,
            verify_interval_ms: 0,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback chain: explicit path → ./config/default.toml → hardcoded defaults.
    pub fn load_or_default(explicit_path: Option<&Path>) -> Self {
        if let Some(path) = explicit_path {
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {e}", path.display());
                }
            }
        }

        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            match Self::load(default_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!("Failed to load default config: {e}");
                }
            }
        }

        tracing::info!("Using hardcoded default configuration");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.adb.binary, "adb");
        assert!(cfg.adb.serial.is_none());
        assert_eq!(cfg.adb.command_timeout_ms, 20_000);
        assert_eq!(cfg.unlock.unlock_wait(), Duration::from_millis(100));
        assert_eq!(cfg.unlock.success_timeout_ms, 2000);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [adb]
            serial = "emulator-5554"

            [unlock]
            success_timeout_ms = 5000
        "#,
        )
        .unwrap();
        assert_eq!(cfg.adb.serial.as_deref(), Some("emulator-5554"));
        assert_eq!(cfg.adb.binary, "adb");
        assert_eq!(cfg.unlock.success_timeout_ms, 5000);
        assert_eq!(cfg.unlock.input_keys_wait_ms, 100);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyguard.toml");
        std::fs::write(&path, "[adb]\nbinary = \"/opt/sdk/adb\"\n").unwrap();
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.adb.binary, "/opt/sdk/adb");
    }

    #[test]
    fn load_or_default_survives_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[adb\nbinary =").unwrap();
        let cfg = AppConfig::load_or_default(Some(&path));
        assert_eq!(cfg.unlock.verify_interval_ms, 1000);
    }
}
