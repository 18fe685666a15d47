use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnlockError;

// ── Unlock type ──────────────────────────────────────────────────────

/// How the lock screen should be driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnlockType {
    Pin,
    PinWithKeyEvent,
    Password,
    Pattern,
    Fingerprint,
}

impl UnlockType {
    pub const ALL: [UnlockType; 5] = [
        UnlockType::Pin,
        UnlockType::PinWithKeyEvent,
        UnlockType::Password,
        UnlockType::Pattern,
        UnlockType::Fingerprint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnlockType::Pin => "pin",
            UnlockType::PinWithKeyEvent => "pinWithKeyEvent",
            UnlockType::Password => "password",
            UnlockType::Pattern => "pattern",
            UnlockType::Fingerprint => "fingerprint",
        }
    }

    /// Lock credential kind used by the fast path. Fingerprints have none.
    pub fn credential_type(&self) -> Option<CredentialType> {
        match self {
            UnlockType::Pin | UnlockType::PinWithKeyEvent => Some(CredentialType::Pin),
            UnlockType::Password => Some(CredentialType::Password),
            UnlockType::Pattern => Some(CredentialType::Pattern),
            UnlockType::Fingerprint => None,
        }
    }
}

impl fmt::Display for UnlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnlockType {
    type Err = UnlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(UnlockError::validation(
                "missing unlock type: a non-empty unlock type value must be provided",
            ));
        }
        UnlockType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let supported: Vec<&str> = UnlockType::ALL.iter().map(|t| t.as_str()).collect();
                UnlockError::validation(format!(
                    "Invalid unlock type '{s}'. Only the following unlock types are supported: {}",
                    supported.join(", ")
                ))
            })
    }
}

// ── Credentials ──────────────────────────────────────────────────────

/// Credential kind understood by the device's `locksettings` service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialType {
    Pin,
    Password,
    Pattern,
}

impl CredentialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialType::Pin => "pin",
            CredentialType::Password => "password",
            CredentialType::Pattern => "pattern",
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialType {
    type Err = UnlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pin" => Ok(CredentialType::Pin),
            "password" => Ok(CredentialType::Password),
            "pattern" => Ok(CredentialType::Pattern),
            other => Err(UnlockError::validation(format!(
                "Unknown credential type '{other}'"
            ))),
        }
    }
}

/// Validated unlock request: the type is parsed, the key is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockCapabilities {
    pub unlock_type: UnlockType,
    pub unlock_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastUnlockOptions {
    pub credential: String,
    pub credential_type: CredentialType,
}

// ── Screen geometry ──────────────────────────────────────────────────

/// Screen point in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

// ── UI layer ─────────────────────────────────────────────────────────

/// Opaque handle to an element returned by a [`crate::UiDriver`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub selector: String,
}

impl Locator {
    pub fn id(selector: impl Into<String>) -> Self {
        Self {
            strategy: LocatorStrategy::Id,
            selector: selector.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strategy {
            LocatorStrategy::Id => write!(f, "id={}", self.selector),
        }
    }
}

/// One step of a continuous touch gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "options", rename_all = "camelCase")]
pub enum TouchAction {
    Press {
        x: i32,
        y: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<ElementRef>,
    },
    MoveTo {
        x: i32,
        y: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<ElementRef>,
    },
    Release,
}

impl TouchAction {
    pub fn press(pos: Position) -> Self {
        TouchAction::Press {
            x: pos.x,
            y: pos.y,
            element: None,
        }
    }

    pub fn move_to(pos: Position) -> Self {
        TouchAction::MoveTo {
            x: pos.x,
            y: pos.y,
            element: None,
        }
    }

    /// Target point, `None` for `Release`.
    pub fn position(&self) -> Option<Position> {
        match self {
            TouchAction::Press { x, y, .. } | TouchAction::MoveTo { x, y, .. } => {
                Some(Position::new(*x, *y))
            }
            TouchAction::Release => None,
        }
    }
}
