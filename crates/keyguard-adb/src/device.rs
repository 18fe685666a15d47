use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use keyguard_core::config::AdbConfig;
use keyguard_core::error::{UnlockError, UnlockResult};
use keyguard_core::keycode::{KEYCODE_POWER, KEYCODE_WAKEUP};
use keyguard_core::types::CredentialType;
use keyguard_core::DeviceControl;
use tokio::process::Command;

/// Markers in `dumpsys window` output that mean the keyguard is up.
const LOCKED_MARKERS: [&str; 4] = [
    "mShowingLockscreen=true",
    "mDreamingLockscreen=true",
    "isStatusBarKeyguard=true",
    "mKeyguardShowing=true",
];

/// One device reachable through the `adb` binary.
pub struct AdbDevice {
    binary: String,
    serial: Option<String>,
    timeout: Duration,
}

impl AdbDevice {
    pub fn new(config: &AdbConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            serial: config.serial.clone(),
            timeout: Duration::from_millis(config.command_timeout_ms),
        }
    }

    /// Run `adb <args>` and return stdout. Non-zero exit is an error.
    pub async fn exec(&self, args: &[&str]) -> UnlockResult<String> {
        let output = self.exec_output(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(UnlockError::device(format!(
                "adb {} exited with {}: {}",
                describe(args),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run `adb <args>` and return stdout and stderr combined, whatever the exit status.
    async fn exec_lenient(&self, args: &[&str]) -> UnlockResult<String> {
        let output = self.exec_output(args).await?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    async fn exec_output(&self, args: &[&str]) -> UnlockResult<Output> {
        let mut cmd = Command::new(&self.binary);
        if let Some(serial) = &self.serial {
            cmd.args(["-s", serial]);
        }
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!("adb {}", describe(args));
        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(UnlockError::device(format!(
                "adb {} timed out after {}ms",
                describe(args),
                self.timeout.as_millis()
            ))),
        }
    }

    async fn shell_lenient(&self, args: &[&str]) -> UnlockResult<String> {
        let quoted = shell_command(args);
        let full: Vec<&str> = quoted.iter().map(String::as_str).collect();
        self.exec_lenient(&full).await
    }
}

#[async_trait]
impl DeviceControl for AdbDevice {
    async fn is_screen_locked(&self) -> UnlockResult<bool> {
        let dump = self.shell(&["dumpsys", "window"]).await?;
        Ok(parse_screen_locked(&dump))
    }

    async fn keyevent(&self, code: u32) -> UnlockResult<()> {
        let code = code.to_string();
        self.shell(&["input", "keyevent", &code]).await?;
        Ok(())
    }

    async fn shell(&self, args: &[&str]) -> UnlockResult<String> {
        let quoted = shell_command(args);
        let full: Vec<&str> = quoted.iter().map(String::as_str).collect();
        self.exec(&full).await
    }

    async fn api_level(&self) -> UnlockResult<u32> {
        let out = self.shell(&["getprop", "ro.build.version.sdk"]).await?;
        parse_api_level(&out)
    }

    async fn is_lock_enabled(&self) -> UnlockResult<bool> {
        let verified = self.shell_lenient(&["locksettings", "verify"]).await?;
        if verified.contains("verified successfully") {
            return Ok(false);
        }
        let out = self.shell(&["locksettings", "get-disabled"]).await?;
        parse_lock_disabled(&out).map(|disabled| !disabled)
    }

    async fn clear_lock_credential(&self, credential: &str) -> UnlockResult<()> {
        let out = self
            .shell_lenient(&["locksettings", "clear", "--old", credential])
            .await?;
        check_locksettings(&out, "clear")
    }

    async fn set_lock_credential(
        &self,
        credential_type: CredentialType,
        credential: &str,
    ) -> UnlockResult<()> {
        let command = format!("set-{credential_type}");
        let out = self
            .shell_lenient(&["locksettings", &command, credential])
            .await?;
        check_locksettings(&out, &command)
    }

    async fn cycle_wake_up(&self) -> UnlockResult<()> {
        self.keyevent(KEYCODE_POWER).await?;
        self.keyevent(KEYCODE_WAKEUP).await
    }

    async fn dismiss_keyguard(&self) -> UnlockResult<()> {
        self.shell(&["wm", "dismiss-keyguard"]).await?;
        Ok(())
    }

    async fn fingerprint(&self, finger_id: &str) -> UnlockResult<()> {
        let args: Vec<&str> = if self.serial.is_some() {
            vec!["emu", "finger", "touch", finger_id]
        } else {
            vec!["-e", "emu", "finger", "touch", finger_id]
        };
        self.exec(&args).await?;
        Ok(())
    }
}

/// `shell` followed by `args`, each quoted for the device-side `sh`.
///
/// adbd joins the arguments with spaces and hands the line to `sh -c`.
fn shell_command(args: &[&str]) -> Vec<String> {
    std::iter::once("shell".to_string())
        .chain(args.iter().map(|arg| shell_quote(arg)))
        .collect()
}

/// Single-quote `arg` unless it only holds characters `sh` leaves alone.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Command name for logs, without credentials or typed text.
fn describe(args: &[&str]) -> String {
    let shown: Vec<&str> = args.iter().take(3).copied().collect();
    if args.len() > shown.len() {
        format!("{} ...", shown.join(" "))
    } else {
        shown.join(" ")
    }
}

pub fn parse_screen_locked(dumpsys_window: &str) -> bool {
    dumpsys_window
        .split_whitespace()
        .any(|token| LOCKED_MARKERS.contains(&token))
}

pub fn parse_api_level(getprop: &str) -> UnlockResult<u32> {
    getprop
        .trim()
        .parse()
        .map_err(|_| UnlockError::device(format!("Unexpected API level '{}'", getprop.trim())))
}

/// Output of `locksettings get-disabled`: `true` when the lock screen is disabled.
pub fn parse_lock_disabled(output: &str) -> UnlockResult<bool> {
    let words: Vec<&str> = output.split_whitespace().collect();
    if words.contains(&"false") {
        Ok(false)
    } else if words.contains(&"true") {
        Ok(true)
    } else {
        Err(UnlockError::device(format!(
            "Unexpected locksettings get-disabled output: '{}'",
            output.trim()
        )))
    }
}

/// `locksettings` reports failures on stdout with a zero exit code.
fn check_locksettings(output: &str, command: &str) -> UnlockResult<()> {
    let lower = output.to_ascii_lowercase();
    if lower.contains("error") || lower.contains("didn't match") || lower.contains("failed") {
        return Err(UnlockError::device(format!(
            "locksettings {command} failed: {}",
            output.trim()
        )));
    }
    Ok(())
}
