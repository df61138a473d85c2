//! Per-device button state storage.
//!
//! [`InputState`] is the store behind a device's two frame buffers.
//! Boolean and float channels occupy independent addressing spaces: the
//! same [`ButtonId`] may hold a boolean and a float value side by side,
//! and reading a button through the accessor that does not match its
//! declared type is a caller error, not something the store detects.
//!
//! Reads of a key that has never been written return the type's zero
//! value (`false` / `0.0`), so a freshly constructed device reports
//! everything released.

use std::collections::HashMap;

use crate::button::ButtonId;

/// Key→value store mapping button ids to boolean and float values.
///
/// Each device owns exactly two of these (current and previous) for
/// its entire lifetime. They are never shared between devices.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    buttons: HashMap<ButtonId, bool>,
    axes: HashMap<ButtonId, f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boolean value of `button` (`false` if never written).
    #[inline]
    pub fn get_bool(&self, button: ButtonId) -> bool {
        self.buttons.get(&button).copied().unwrap_or(false)
    }

    /// Float value of `button` (`0.0` if never written).
    #[inline]
    pub fn get_float(&self, button: ButtonId) -> f32 {
        self.axes.get(&button).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn set_bool(&mut self, button: ButtonId, value: bool) {
        self.buttons.insert(button, value);
    }

    #[inline]
    pub fn set_float(&mut self, button: ButtonId, value: f32) {
        self.axes.insert(button, value);
    }

    /// Overwrites this store with a full snapshot of `other`.
    ///
    /// Every key is copied, including buttons the device has not
    /// touched this frame; existing allocations are reused.
    pub fn copy_from(&mut self, other: &InputState) {
        self.buttons.clone_from(&other.buttons);
        self.axes.clone_from(&other.axes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_keys_read_as_zero() {
        let state = InputState::new();
        assert!(!state.get_bool(ButtonId(3)));
        assert_eq!(state.get_float(ButtonId(3)), 0.0);
    }

    #[test]
    fn bool_and_float_spaces_are_independent() {
        let mut state = InputState::new();
        state.set_bool(ButtonId(0), true);
        state.set_float(ButtonId(0), 0.75);
        assert!(state.get_bool(ButtonId(0)));
        assert_eq!(state.get_float(ButtonId(0)), 0.75);
    }

    #[test]
    fn copy_from_is_a_full_snapshot() {
        let mut current = InputState::new();
        current.set_bool(ButtonId(0), true);
        current.set_float(ButtonId(1), -0.5);

        let mut previous = InputState::new();
        previous.set_bool(ButtonId(7), true);
        previous.copy_from(&current);

        // Stale keys are gone, untouched keys carried over.
        assert!(!previous.get_bool(ButtonId(7)));
        assert!(previous.get_bool(ButtonId(0)));
        assert_eq!(previous.get_float(ButtonId(1)), -0.5);

        // Later writes to the source do not leak into the snapshot.
        current.set_bool(ButtonId(0), false);
        assert!(previous.get_bool(ButtonId(0)));
    }
}
