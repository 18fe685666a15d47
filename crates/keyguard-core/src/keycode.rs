//! Android `KeyEvent` codes used while unlocking.

/// `KEYCODE_0`; digits 1..9 follow contiguously.
pub const KEYCODE_DIGIT_0: u32 = 7;
pub const KEYCODE_POWER: u32 = 26;
pub const KEYCODE_ENTER: u32 = 66;
pub const KEYCODE_WAKEUP: u32 = 224;

/// Key code for an ASCII digit, `None` for anything else.
pub fn digit_keycode(c: char) -> Option<u32> {
    c.to_digit(10).map(|d| KEYCODE_DIGIT_0 + d)
}
