//! In-memory collaborators that record every call, for testing unlock flows.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use keyguard_core::error::{UnlockError, UnlockResult};
use keyguard_core::types::{CredentialType, ElementRef, Locator, Position, Size, TouchAction};
use keyguard_core::{DeviceControl, UiDriver};

// ── Device ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    IsScreenLocked,
    Keyevent(u32),
    Shell(Vec<String>),
    ApiLevel,
    IsLockEnabled,
    ClearLockCredential(String),
    SetLockCredential(CredentialType, String),
    CycleWakeUp,
    DismissKeyguard,
    Fingerprint(String),
}

/// Scripted [`DeviceControl`].
///
/// Lock-state answers are consumed front to back; the last one repeats.
pub struct MockDevice {
    api_level: u32,
    lock_states: Mutex<VecDeque<bool>>,
    lock_enabled: bool,
    fail_wake_up: bool,
    fail_dismiss: bool,
    fail_restore: bool,
    calls: Mutex<Vec<DeviceCall>>,
}

impl MockDevice {
    pub fn new(api_level: u32) -> Self {
        Self {
            api_level,
            lock_states: Mutex::new(VecDeque::from([false])),
            lock_enabled: false,
            fail_wake_up: false,
            fail_dismiss: false,
            fail_restore: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_lock_states(self, states: &[bool]) -> Self {
        *self.lock_states.lock().unwrap() = states.iter().copied().collect();
        self
    }

    pub fn with_lock_enabled(mut self, enabled: bool) -> Self {
        self.lock_enabled = enabled;
        self
    }

    pub fn failing_wake_up(mut self) -> Self {
        self.fail_wake_up = true;
        self
    }

    pub fn failing_dismiss(mut self) -> Self {
        self.fail_dismiss = true;
        self
    }

    pub fn failing_restore(mut self) -> Self {
        self.fail_restore = true;
        self
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Key codes sent, in order.
    pub fn keyevents(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DeviceCall::Keyevent(code) => Some(code),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DeviceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DeviceControl for MockDevice {
    async fn is_screen_locked(&self) -> UnlockResult<bool> {
        self.record(DeviceCall::IsScreenLocked);
        let mut states = self.lock_states.lock().unwrap();
        let state = if states.len() > 1 {
            states.pop_front()
        } else {
            states.front().copied()
        };
        Ok(state.unwrap_or(false))
    }

    async fn keyevent(&self, code: u32) -> UnlockResult<()> {
        self.record(DeviceCall::Keyevent(code));
        Ok(())
    }

    async fn shell(&self, args: &[&str]) -> UnlockResult<String> {
        self.record(DeviceCall::Shell(args.iter().map(|a| a.to_string()).collect()));
        Ok(String::new())
    }

    async fn api_level(&self) -> UnlockResult<u32> {
        self.record(DeviceCall::ApiLevel);
        Ok(self.api_level)
    }

    async fn is_lock_enabled(&self) -> UnlockResult<bool> {
        self.record(DeviceCall::IsLockEnabled);
        Ok(self.lock_enabled)
    }

    async fn clear_lock_credential(&self, credential: &str) -> UnlockResult<()> {
        self.record(DeviceCall::ClearLockCredential(credential.to_string()));
        Ok(())
    }

    async fn set_lock_credential(
        &self,
        credential_type: CredentialType,
        credential: &str,
    ) -> UnlockResult<()> {
        self.record(DeviceCall::SetLockCredential(credential_type, credential.to_string()));
        if self.fail_restore {
            return Err(UnlockError::device("locksettings: set failed"));
        }
        Ok(())
    }

    async fn cycle_wake_up(&self) -> UnlockResult<()> {
        self.record(DeviceCall::CycleWakeUp);
        if self.fail_wake_up {
            return Err(UnlockError::device("input keyevent: wake up failed"));
        }
        Ok(())
    }

    async fn dismiss_keyguard(&self) -> UnlockResult<()> {
        self.record(DeviceCall::DismissKeyguard);
        if self.fail_dismiss {
            return Err(UnlockError::device("wm dismiss-keyguard failed"));
        }
        Ok(())
    }

    async fn fingerprint(&self, finger_id: &str) -> UnlockResult<()> {
        self.record(DeviceCall::Fingerprint(finger_id.to_string()));
        Ok(())
    }
}

// ── UI ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCall {
    FindElement(String),
    FindElements(String),
    GetAttribute(String, ElementRef),
    Click(ElementRef),
    GetLocation(ElementRef),
    GetSize(ElementRef),
    PerformTouch(Vec<TouchAction>),
}

struct MockElement {
    element: ElementRef,
    selector: String,
    text: String,
    location: Position,
    size: Size,
}

/// [`UiDriver`] backed by a fixed list of elements.
pub struct MockUi {
    elements: Mutex<Vec<MockElement>>,
    fail_clicks: bool,
    calls: Mutex<Vec<UiCall>>,
}

impl Default for MockUi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUi {
    pub fn new() -> Self {
        Self {
            elements: Mutex::new(Vec::new()),
            fail_clicks: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn add_element(
        &self,
        selector: &str,
        text: &str,
        location: Position,
        size: Size,
    ) -> ElementRef {
        let mut elements = self.elements.lock().unwrap();
        let element = ElementRef(format!("element-{}", elements.len() + 1));
        elements.push(MockElement {
            element: element.clone(),
            selector: selector.to_string(),
            text: text.to_string(),
            location,
            size,
        });
        element
    }

    /// Ten digit buttons sharing `selector`, labelled by their text.
    pub fn with_keypad(self, selector: &str) -> Self {
        for (i, digit) in "1234567890".chars().enumerate() {
            let i = i as i32;
            self.add_element(
                selector,
                &digit.to_string(),
                Position::new(100 * (i % 3), 100 * (i / 3)),
                Size { width: 100, height: 100 },
            );
        }
        self
    }

    pub fn failing_clicks(mut self) -> Self {
        self.fail_clicks = true;
        self
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Text of every clicked element, in order.
    pub fn clicked_texts(&self) -> Vec<String> {
        let elements = self.elements.lock().unwrap();
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::Click(el) => elements
                    .iter()
                    .find(|e| e.element == el)
                    .map(|e| e.text.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: UiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn with_element<T>(
        &self,
        element: &ElementRef,
        f: impl FnOnce(&MockElement) -> T,
    ) -> UnlockResult<T> {
        let elements = self.elements.lock().unwrap();
        elements
            .iter()
            .find(|e| &e.element == element)
            .map(f)
            .ok_or_else(|| UnlockError::ElementNotFound(element.0.clone()))
    }
}

#[async_trait]
impl UiDriver for MockUi {
    async fn find_element(&self, locator: &Locator) -> UnlockResult<Option<ElementRef>> {
        self.record(UiCall::FindElement(locator.selector.clone()));
        let elements = self.elements.lock().unwrap();
        Ok(elements
            .iter()
            .find(|e| e.selector == locator.selector)
            .map(|e| e.element.clone()))
    }

    async fn find_elements(&self, locator: &Locator) -> UnlockResult<Vec<ElementRef>> {
        self.record(UiCall::FindElements(locator.selector.clone()));
        let elements = self.elements.lock().unwrap();
        Ok(elements
            .iter()
            .filter(|e| e.selector == locator.selector)
            .map(|e| e.element.clone())
            .collect())
    }

    async fn get_attribute(&self, name: &str, element: &ElementRef) -> UnlockResult<String> {
        self.record(UiCall::GetAttribute(name.to_string(), element.clone()));
        match name {
            "text" => self.with_element(element, |e| e.text.clone()),
            "resource-id" => self.with_element(element, |e| e.selector.clone()),
            other => Err(UnlockError::device(format!("unknown attribute '{other}'"))),
        }
    }

    async fn click(&self, element: &ElementRef) -> UnlockResult<()> {
        self.record(UiCall::Click(element.clone()));
        if self.fail_clicks {
            return Err(UnlockError::device(format!("click on {} failed", element.0)));
        }
        self.with_element(element, |_| ())
    }

    async fn get_location(&self, element: &ElementRef) -> UnlockResult<Position> {
        self.record(UiCall::GetLocation(element.clone()));
        self.with_element(element, |e| e.location)
    }

    async fn get_size(&self, element: &ElementRef) -> UnlockResult<Size> {
        self.record(UiCall::GetSize(element.clone()));
        self.with_element(element, |e| e.size)
    }

    async fn perform_touch(&self, actions: &[TouchAction]) -> UnlockResult<()> {
        self.record(UiCall::PerformTouch(actions.to_vec()));
        Ok(())
    }
}
