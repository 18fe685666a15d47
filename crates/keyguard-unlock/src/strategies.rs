//! One executor per unlock type.
//!
//! Every executor propagates the first collaborator error it hits. The only
//! recovery is the PIN fallback: when the keypad cannot be found on screen,
//! the digits are typed as key events instead.

use std::collections::HashMap;

use keyguard_core::config::UnlockConfig;
use keyguard_core::error::{UnlockError, UnlockResult};
use keyguard_core::geometry::{gesture_actions, parse_pattern_digits};
use keyguard_core::keycode::{digit_keycode, KEYCODE_ENTER};
use keyguard_core::types::{ElementRef, Locator, UnlockCapabilities, UnlockType};
use keyguard_core::{DeviceControl, UiDriver};

use crate::keyguard::{dismiss_keyguard, wait_for_unlock};

/// First API level whose keyguard lives in SystemUI.
pub const SYSTEMUI_KEYGUARD_API_LEVEL: u32 = 21;
pub const FINGERPRINT_MIN_API_LEVEL: u32 = 23;

const PIN_DIGIT_ID: &str = "com.android.systemui:id/digit_text";

fn legacy_pin_key_id(digit: char) -> String {
    format!("com.android.keyguard:id/key{digit}")
}

fn pattern_view_id(api_level: u32) -> &'static str {
    if api_level >= SYSTEMUI_KEYGUARD_API_LEVEL {
        "com.android.systemui:id/lockPatternView"
    } else {
        "com.android.keyguard:id/lockPatternView"
    }
}

/// Collaborators and timing for one unlock attempt.
pub struct UnlockContext<'a> {
    pub device: &'a dyn DeviceControl,
    pub ui: &'a dyn UiDriver,
    pub config: &'a UnlockConfig,
}

impl UnlockContext<'_> {
    async fn pause(&self, duration: std::time::Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run the executor for an already validated unlock request.
pub async fn execute(ctx: &UnlockContext<'_>, caps: &UnlockCapabilities) -> UnlockResult<()> {
    tracing::info!("Unlocking the device using the {} strategy", caps.unlock_type);
    match caps.unlock_type {
        UnlockType::Pin => PinUnlock::new(&caps.unlock_key).run(ctx).await,
        UnlockType::PinWithKeyEvent => pin_keyevent_unlock(ctx, &caps.unlock_key).await,
        UnlockType::Password => password_unlock(ctx, &caps.unlock_key).await,
        UnlockType::Pattern => pattern_unlock(ctx, &caps.unlock_key).await,
        UnlockType::Fingerprint => fingerprint_unlock(ctx, &caps.unlock_key).await,
    }
}

/// Key characters without whitespace.
pub fn split_key(key: &str) -> Vec<char> {
    key.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Escape a password for `input text`: whitespace becomes `%s`.
pub fn encode_password(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for c in key.chars() {
        if c.is_whitespace() {
            encoded.push_str("%s");
        } else {
            encoded.push(c);
        }
    }
    encoded
}

// ── PIN ──────────────────────────────────────────────────────────────

/// Result of the element-driven PIN step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAttempt {
    /// Every digit was clicked.
    Entered,
    /// The keypad is not on screen; nothing more was clicked.
    KeypadMissing,
}

/// PIN entry by clicking keypad buttons, falling back to key events.
pub struct PinUnlock<'k> {
    key: &'k str,
}

impl<'k> PinUnlock<'k> {
    pub fn new(key: &'k str) -> Self {
        Self { key }
    }

    pub async fn run(&self, ctx: &UnlockContext<'_>) -> UnlockResult<()> {
        match self.primary(ctx).await? {
            PinAttempt::Entered => wait_for_unlock(ctx.device, ctx.config).await,
            PinAttempt::KeypadMissing => {
                tracing::warn!("PIN keypad not found on screen, falling back to key events");
                self.fallback(ctx).await
            }
        }
    }

    /// Click the keypad button for each digit.
    pub async fn primary(&self, ctx: &UnlockContext<'_>) -> UnlockResult<PinAttempt> {
        dismiss_keyguard(ctx.device).await?;
        let digits = split_key(self.key);

        if ctx.device.api_level().await? >= SYSTEMUI_KEYGUARD_API_LEVEL {
            let elements = ctx.ui.find_elements(&Locator::id(PIN_DIGIT_ID)).await?;
            if elements.is_empty() {
                return Ok(PinAttempt::KeypadMissing);
            }

            let mut keypad: HashMap<String, ElementRef> = HashMap::new();
            for element in elements {
                let text = ctx.ui.get_attribute("text", &element).await?;
                keypad.insert(text, element);
            }

            for digit in digits {
                let element = keypad.get(digit.to_string().as_str()).ok_or_else(|| {
                    UnlockError::ElementNotFound(format!("PIN keypad button '{digit}'"))
                })?;
                ctx.ui.click(element).await?;
            }
        } else {
            for digit in digits {
                let locator = Locator::id(legacy_pin_key_id(digit));
                let Some(element) = ctx.ui.find_element(&locator).await? else {
                    return Ok(PinAttempt::KeypadMissing);
                };
                ctx.ui.click(&element).await?;
            }
        }

        Ok(PinAttempt::Entered)
    }

    /// Type the PIN as key events. No further fallback.
    pub async fn fallback(&self, ctx: &UnlockContext<'_>) -> UnlockResult<()> {
        pin_keyevent_unlock(ctx, self.key).await
    }
}

pub async fn pin_keyevent_unlock(ctx: &UnlockContext<'_>, key: &str) -> UnlockResult<()> {
    dismiss_keyguard(ctx.device).await?;
    for digit in split_key(key) {
        let code = digit_keycode(digit).ok_or_else(|| {
            UnlockError::validation(format!("'{digit}' cannot be typed as a PIN digit"))
        })?;
        ctx.device.keyevent(code).await?;
    }
    wait_for_unlock(ctx.device, ctx.config).await
}

// ── Password ─────────────────────────────────────────────────────────

pub async fn password_unlock(ctx: &UnlockContext<'_>, key: &str) -> UnlockResult<()> {
    dismiss_keyguard(ctx.device).await?;
    let encoded = encode_password(key);
    ctx.device.shell(&["input", "text", &encoded]).await?;
    ctx.pause(ctx.config.input_keys_wait()).await;
    ctx.device.keyevent(KEYCODE_ENTER).await?;
    wait_for_unlock(ctx.device, ctx.config).await
}

// ── Pattern ──────────────────────────────────────────────────────────

pub async fn pattern_unlock(ctx: &UnlockContext<'_>, key: &str) -> UnlockResult<()> {
    dismiss_keyguard(ctx.device).await?;
    let digits = parse_pattern_digits(key)?;

    let api_level = ctx.device.api_level().await?;
    let view_id = pattern_view_id(api_level);
    let view = ctx
        .ui
        .find_element(&Locator::id(view_id))
        .await?
        .ok_or_else(|| UnlockError::ElementNotFound(view_id.to_string()))?;

    let origin = ctx.ui.get_location(&view).await?;
    let size = ctx.ui.get_size(&view).await?;
    let cell_size = f64::from(size.width) / 3.0;
    tracing::debug!(
        "Pattern view at ({}, {}) with cell size {cell_size:.1}",
        origin.x,
        origin.y
    );

    let actions = gesture_actions(&digits, origin, cell_size);
    ctx.ui.perform_touch(&actions).await?;
    ctx.pause(ctx.config.unlock_wait()).await;
    Ok(())
}

// ── Fingerprint ──────────────────────────────────────────────────────

pub async fn fingerprint_unlock(ctx: &UnlockContext<'_>, key: &str) -> UnlockResult<()> {
    if ctx.device.api_level().await? < FINGERPRINT_MIN_API_LEVEL {
        return Err(UnlockError::UnsupportedPlatform(
            "Fingerprint unlock only works for Android 6+ emulators".into(),
        ));
    }
    ctx.device.fingerprint(key.trim()).await?;
    ctx.pause(ctx.config.unlock_wait()).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{DeviceCall, MockDevice, MockUi, UiCall};
    use keyguard_core::types::{Position, Size, TouchAction};

    fn caps(unlock_type: UnlockType, key: &str) -> UnlockCapabilities {
        UnlockCapabilities {
            unlock_type,
            unlock_key: key.into(),
        }
    }

    #[test]
    fn password_encoding() {
        assert_eq!(encode_password("my pass"), "my%spass");
        assert_eq!(encode_password("a  b"), "a%s%sb");
        assert_eq!(encode_password("    "), "%s%s%s%s");
        assert_eq!(encode_password("plain"), "plain");
    }

    #[test]
    fn split_key_drops_whitespace() {
        assert_eq!(split_key(" 12 3 "), vec!['1', '2', '3']);
    }

    #[tokio::test]
    async fn pin_clicks_keypad_in_order() {
        let device = MockDevice::new(29);
        let ui = MockUi::new().with_keypad(PIN_DIGIT_ID);
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        execute(&ctx, &caps(UnlockType::Pin, "2580")).await.unwrap();

        assert_eq!(ui.clicked_texts(), vec!["2", "5", "8", "0"]);
        assert!(device.keyevents().is_empty());
    }

    #[tokio::test]
    async fn pin_falls_back_to_keyevents_without_keypad() {
        let device = MockDevice::new(29);
        let ui = MockUi::new();
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        execute(&ctx, &caps(UnlockType::Pin, "1234")).await.unwrap();

        assert_eq!(device.keyevents(), vec![8, 9, 10, 11]);
        assert!(!ui.calls().iter().any(|c| matches!(c, UiCall::Click(_))));
        let dismissals = device
            .calls()
            .iter()
            .filter(|c| **c == DeviceCall::DismissKeyguard)
            .count();
        assert_eq!(dismissals, 2);
    }

    #[tokio::test]
    async fn legacy_pin_uses_per_digit_ids() {
        let device = MockDevice::new(19);
        let ui = MockUi::new();
        for d in ['4', '2'] {
            ui.add_element(&legacy_pin_key_id(d), &d.to_string(), Position::default(), Size::default());
        }
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        let attempt = PinUnlock::new("42").primary(&ctx).await.unwrap();

        assert_eq!(attempt, PinAttempt::Entered);
        assert_eq!(ui.clicked_texts(), vec!["4", "2"]);
    }

    #[tokio::test]
    async fn legacy_pin_missing_digit_reports_keypad_missing() {
        let device = MockDevice::new(19);
        let ui = MockUi::new();
        ui.add_element(&legacy_pin_key_id('4'), "4", Position::default(), Size::default());
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        let attempt = PinUnlock::new("47").primary(&ctx).await.unwrap();
        assert_eq!(attempt, PinAttempt::KeypadMissing);
    }

    #[tokio::test]
    async fn legacy_pin_missing_digit_falls_back_to_key_events() {
        let device = MockDevice::new(19);
        let ui = MockUi::new();
        ui.add_element(&legacy_pin_key_id('4'), "4", Position::default(), Size::default());
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        execute(&ctx, &caps(UnlockType::Pin, "47")).await.unwrap();

        // The digit found before the gap was already clicked.
        assert_eq!(ui.clicked_texts(), vec!["4"]);
        assert_eq!(device.keyevents(), vec![11, 14]);
    }

    #[tokio::test]
    async fn pin_click_failure_does_not_fall_back() {
        let device = MockDevice::new(29);
        let ui = MockUi::new().with_keypad(PIN_DIGIT_ID).failing_clicks();
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        let err = execute(&ctx, &caps(UnlockType::Pin, "1234")).await.unwrap_err();

        assert!(matches!(err, UnlockError::DeviceCommand(_)));
        assert!(device.keyevents().is_empty());
    }

    #[tokio::test]
    async fn pin_digit_absent_from_keypad_is_an_error() {
        let device = MockDevice::new(29);
        let ui = MockUi::new();
        ui.add_element(PIN_DIGIT_ID, "1", Position::default(), Size::default());
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        let err = execute(&ctx, &caps(UnlockType::Pin, "12")).await.unwrap_err();
        assert!(matches!(err, UnlockError::ElementNotFound(_)));
    }

    #[tokio::test]
    async fn password_types_encoded_text_then_enter() {
        let device = MockDevice::new(30);
        let ui = MockUi::new();
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        execute(&ctx, &caps(UnlockType::Password, "open sesame")).await.unwrap();

        let calls = device.calls();
        let typed = calls
            .iter()
            .position(|c| {
                *c == DeviceCall::Shell(vec!["input".into(), "text".into(), "open%ssesame".into()])
            })
            .expect("input text not sent");
        assert_eq!(calls[typed + 1], DeviceCall::Keyevent(KEYCODE_ENTER));
    }

    #[tokio::test]
    async fn pattern_draws_gesture_over_view() {
        let device = MockDevice::new(30);
        let ui = MockUi::new();
        ui.add_element(
            pattern_view_id(30),
            "",
            Position::new(100, 400),
            Size { width: 90, height: 90 },
        );
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        execute(&ctx, &caps(UnlockType::Pattern, "123")).await.unwrap();

        let touches: Vec<Vec<TouchAction>> = ui
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::PerformTouch(actions) => Some(actions),
                _ => None,
            })
            .collect();
        assert_eq!(touches.len(), 1);
        assert_eq!(
            touches[0],
            vec![
                TouchAction::press(Position::new(115, 415)),
                TouchAction::move_to(Position::new(145, 415)),
                TouchAction::move_to(Position::new(175, 415)),
                TouchAction::Release,
            ]
        );
        // No completion polling after a pattern.
        assert!(!device.calls().contains(&DeviceCall::IsScreenLocked));
    }

    #[tokio::test]
    async fn pattern_uses_legacy_view_below_21() {
        let device = MockDevice::new(19);
        let ui = MockUi::new();
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        let err = execute(&ctx, &caps(UnlockType::Pattern, "123")).await.unwrap_err();

        assert!(err.to_string().contains("com.android.keyguard:id/lockPatternView"));
    }

    #[tokio::test]
    async fn fingerprint_requires_api_23() {
        let device = MockDevice::new(22);
        let ui = MockUi::new();
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        let err = execute(&ctx, &caps(UnlockType::Fingerprint, "1")).await.unwrap_err();
        assert!(matches!(err, UnlockError::UnsupportedPlatform(_)));
        assert!(err.to_string().contains("Android 6+"));
    }

    #[tokio::test]
    async fn fingerprint_touches_sensor() {
        let device = MockDevice::new(23);
        let ui = MockUi::new();
        let config = UnlockConfig::immediate();
        let ctx = UnlockContext { device: &device, ui: &ui, config: &config };

        execute(&ctx, &caps(UnlockType::Fingerprint, "1")).await.unwrap();
        assert!(device.calls().contains(&DeviceCall::Fingerprint("1".into())));
    }
}
