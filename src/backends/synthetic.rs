//! Feed-driven synthetic device.
//!
//! [`SyntheticDevice`] implements the full backend contract without any
//! hardware behind it: the button layout is declared up front, and
//! values are fed in out-of-band through a cloneable [`SyntheticFeed`]
//! handle. Queued feeds are applied on the device's next poll, so state
//! changes line up with frame boundaries exactly like any other
//! device's.
//!
//! Useful for test rigs, replaying recorded input, and prototyping
//! composite devices.
//!
//! # Example
//! ```
//! use doubletap::backends::synthetic::SyntheticDevice;
//! use doubletap::{DeviceRegistry, DeviceType};
//!
//! let mut pad = SyntheticDevice::new(DeviceType::Pad);
//! let south = pad.add_bool("south");
//! let feed = pad.feed();
//!
//! let mut registry = DeviceRegistry::new();
//! let id = registry.register(Box::new(pad));
//!
//! feed.press(south);
//! registry.update_all(None);
//! assert!(registry.device(id).unwrap().get_bool(south));
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use crate::button::{ButtonId, ButtonSpec, ButtonType};
use crate::delta::PollContext;
use crate::device::{check_all_buttons_down, DeviceBackend, DeviceHealth, DeviceId, DeviceType};
use crate::state::InputState;

#[derive(Debug)]
enum Feed {
    Bool(ButtonId, bool),
    Float(ButtonId, f32),
}

impl Feed {
    fn button(&self) -> ButtonId {
        match *self {
            Feed::Bool(button, _) | Feed::Float(button, _) => button,
        }
    }
}

#[derive(Debug)]
struct Shared {
    queued: Vec<Feed>,
    health: DeviceHealth,
}

/// A device whose input is injected by the application.
///
/// Declare the layout with [`add_bool`](Self::add_bool) /
/// [`add_float`](Self::add_float) before registering; the layout is
/// fixed afterwards, which keeps button validity and typing stable for
/// the device's lifetime. Button ids are assigned contiguously from 0
/// in declaration order.
#[derive(Debug)]
pub struct SyntheticDevice {
    device_type: DeviceType,
    late: bool,
    buttons: Vec<(String, ButtonType)>,
    shared: Arc<Mutex<Shared>>,
}

impl SyntheticDevice {
    /// Creates a device of the given type with no buttons yet.
    pub fn new(device_type: DeviceType) -> Self {
        Self {
            device_type,
            late: false,
            buttons: Vec::new(),
            shared: Arc::new(Mutex::new(Shared {
                queued: Vec::new(),
                health: DeviceHealth::Normal,
            })),
        }
    }

    /// Declares a boolean button and returns its id.
    pub fn add_bool(&mut self, name: &str) -> ButtonId {
        self.add(name, ButtonType::Bool)
    }

    /// Declares a float button and returns its id.
    pub fn add_float(&mut self, name: &str) -> ButtonId {
        self.add(name, ButtonType::Float)
    }

    fn add(&mut self, name: &str, button_type: ButtonType) -> ButtonId {
        let id = ButtonId(self.buttons.len() as u16);
        self.buttons.push((name.to_owned(), button_type));
        id
    }

    /// Marks the device as a late updater, for prototyping composite
    /// devices that read other devices' same-frame state.
    pub fn set_late_update(&mut self, late: bool) {
        self.late = late;
    }

    /// A handle for feeding values once the device has been registered
    /// and is owned by the registry. Handles are cheap to clone.
    pub fn feed(&self) -> SyntheticFeed {
        SyntheticFeed {
            shared: Arc::clone(&self.shared),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // A feeder that panicked mid-push must not wedge the device.
        match self.shared.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DeviceBackend for SyntheticDevice {
    fn device_type(&self) -> DeviceType {
        self.device_type
    }

    fn type_name(&self) -> &'static str {
        "synthetic"
    }

    fn is_valid_button(&self, button: ButtonId) -> bool {
        (button.0 as usize) < self.buttons.len()
    }

    fn button_type(&self, button: ButtonId) -> Option<ButtonType> {
        self.buttons
            .get(button.0 as usize)
            .map(|(_, button_type)| *button_type)
    }

    fn poll(&mut self, ctx: &mut PollContext<'_, '_>) {
        let mut shared = self.lock();
        for feed in shared.queued.drain(..) {
            let button = feed.button();
            debug_assert!(
                (button.0 as usize) < self.buttons.len(),
                "fed undeclared button {button}"
            );
            if (button.0 as usize) >= self.buttons.len() {
                continue;
            }
            match feed {
                Feed::Bool(button, value) => ctx.set_bool(button, value),
                Feed::Float(button, value) => ctx.set_float(button, value),
            }
        }
    }

    fn health(&self) -> DeviceHealth {
        self.lock().health
    }

    fn is_late_update(&self) -> bool {
        self.late
    }

    fn any_button_down(
        &self,
        device: DeviceId,
        state: &InputState,
        out: &mut [ButtonSpec],
    ) -> usize {
        if self.buttons.is_empty() {
            return 0;
        }
        let end = ButtonId(self.buttons.len() as u16 - 1);
        check_all_buttons_down(self, device, state, out, ButtonId(0), end)
    }

    fn button_name(&self, button: ButtonId) -> Option<String> {
        self.buttons
            .get(button.0 as usize)
            .map(|(name, _)| name.clone())
    }

    fn button_by_name(&self, name: &str) -> Option<ButtonId> {
        self.buttons
            .iter()
            .position(|(candidate, _)| candidate == name)
            .map(|index| ButtonId(index as u16))
    }
}

/// Cloneable handle for feeding a [`SyntheticDevice`].
///
/// Feeds are queued and applied in order on the device's next update;
/// nothing is visible to queries before then. Feeding a button that was
/// never declared is a caller error.
#[derive(Clone, Debug)]
pub struct SyntheticFeed {
    shared: Arc<Mutex<Shared>>,
}

impl SyntheticFeed {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        match self.shared.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Queues a boolean value for the next update.
    pub fn set_bool(&self, button: ButtonId, value: bool) {
        self.lock().queued.push(Feed::Bool(button, value));
    }

    /// Queues a float value for the next update.
    pub fn set_float(&self, button: ButtonId, value: f32) {
        self.lock().queued.push(Feed::Float(button, value));
    }

    pub fn press(&self, button: ButtonId) {
        self.set_bool(button, true);
    }

    pub fn release(&self, button: ButtonId) {
        self.set_bool(button, false);
    }

    /// Sets the health the device reports from its next update on.
    /// Handy for simulating disconnects and reconnects.
    pub fn set_health(&self, health: DeviceHealth) {
        self.lock().health = health;
    }
}
