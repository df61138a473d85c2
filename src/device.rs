//! The device base contract.
//!
//! [`Device`] is the uniform surface every input source is queried
//! through. An input source can be anything from a physical mouse or
//! pad to a networked remote or a gesture synthesized from other
//! devices' input; what they share is a set of buttons (identified by
//! [`ButtonId`]) whose current and previous frame values can be read
//! at any time.
//!
//! Concrete sources implement [`DeviceBackend`]: the polling routine,
//! the health probe, and the button metadata. [`Device`] supplies
//! everything shared on top of that: the double-buffered state, the
//! per-frame update cycle, availability gating, and the generic query
//! surface. Devices are constructed and driven only by the
//! [`DeviceRegistry`](crate::manager::DeviceRegistry); user code holds
//! ids and queries through it.
//!
//! # Update cycle
//!
//! Once per logical frame the registry calls [`Device::update`], which:
//!
//! 1. snapshots current state into previous state (a full copy, so
//!    buttons the backend does not touch this frame keep their last
//!    value on both sides);
//! 2. runs [`DeviceBackend::poll`] against the current store through a
//!    [`PollContext`], which reports changed writes to the frame's
//!    optional [`DeltaSink`];
//! 3. re-probes device health, exactly once, so health reads stay
//!    consistent for the rest of the frame.
//!
//! `update` takes `&mut self`: the single-writer-per-frame discipline
//! is enforced by the borrow rules, not by locks.
//!
//! # Availability
//!
//! Queries are always safe to call, every frame, on every device. While
//! a device is [`DeviceHealth::Unavailable`], boolean and float getters
//! return `false` / `0.0` without consulting the stores, so consumers
//! never observe stale values from a dead device and never have to
//! special-case availability themselves. Low battery does not suppress
//! input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::button::{ButtonId, ButtonSpec, ButtonType};
use crate::delta::{DeltaSink, PollContext};
use crate::state::InputState;

/// Registry-assigned device handle.
///
/// Assigned once at registration and never reused while the device is
/// registered.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of an input device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// A mouse/cursor device featuring one pointer.
    Mouse,
    /// A keyboard.
    Keyboard,
    /// A joypad/gamepad.
    Pad,
    /// A touch surface supporting multiple simultaneous pointers.
    Touch,
    /// A generic networked input device.
    Remote,
    /// A gesture device building on top of other input devices.
    Gesture,
    /// A user-defined device.
    Custom,
}

impl DeviceType {
    /// Canonical short name for the type.
    pub fn name(self) -> &'static str {
        match self {
            DeviceType::Mouse => "mouse",
            DeviceType::Keyboard => "keyboard",
            DeviceType::Pad => "pad",
            DeviceType::Touch => "touch",
            DeviceType::Remote => "remote",
            DeviceType::Gesture => "gesture",
            DeviceType::Custom => "custom",
        }
    }
}

/// Operability of a device, independent of its button values.
///
/// Re-probed once per update; there is no terminal state, so a device
/// may come back from `Unavailable` (e.g. a pad reconnecting).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceHealth {
    /// Everything is okay.
    Normal,
    /// Usable, but the device reports low battery.
    LowBattery,
    /// The device is currently not delivering input.
    Unavailable,
}

/// Analog magnitude above which a float button counts as down in
/// any-button-down scans. Magnitude-based so `[-1, 1]` axes and
/// `[0, 1]` triggers behave alike.
pub const ANALOG_DOWN_THRESHOLD: f32 = 0.5;

/// The hardware/protocol side of a device.
///
/// Implementations own how their source is discovered and read; they
/// never touch the frame buffers directly and never learn what the
/// delta sink is for. Register one with
/// [`DeviceRegistry::register`](crate::manager::DeviceRegistry::register)
/// to obtain a driven [`Device`].
pub trait DeviceBackend {
    /// Classification of this device.
    fn device_type(&self) -> DeviceType;

    /// Stable name for the device type.
    fn type_name(&self) -> &'static str {
        self.device_type().name()
    }

    /// Whether `button` addresses a channel on this device.
    ///
    /// Must answer the same for a given id over the device's lifetime.
    fn is_valid_button(&self, button: ButtonId) -> bool;

    /// Value classification of a button; `None` for invalid ids.
    ///
    /// Every valid id has exactly one type, fixed for the device's
    /// lifetime.
    fn button_type(&self, button: ButtonId) -> Option<ButtonType>;

    /// Reads the underlying source and writes this frame's values
    /// through `ctx`.
    fn poll(&mut self, ctx: &mut PollContext<'_, '_>);

    /// Probes the device's operability. Called once per update.
    fn health(&self) -> DeviceHealth;

    /// Whether this device must be updated after all non-late devices
    /// in a frame pass.
    ///
    /// Composite devices that synthesize input from other devices
    /// return `true` here so they observe their dependencies'
    /// already-updated state. Ordering itself is the registry's job.
    fn is_late_update(&self) -> bool {
        false
    }

    /// Writes the buttons currently down into `out`, returning the
    /// count written.
    ///
    /// The default reports nothing; the query is unsupported. Devices
    /// with a contiguous id space typically forward to
    /// [`check_all_buttons_down`]; sparse ones bring their own scan.
    fn any_button_down(
        &self,
        device: DeviceId,
        state: &InputState,
        out: &mut [ButtonSpec],
    ) -> usize {
        let _ = (device, state, out);
        0
    }

    /// Human-readable name of a button, `None` when unsupported.
    /// Informational only.
    fn button_name(&self, button: ButtonId) -> Option<String> {
        let _ = button;
        None
    }

    /// Reverse name lookup, `None` when unknown or unsupported.
    fn button_by_name(&self, name: &str) -> Option<ButtonId> {
        let _ = name;
        None
    }
}

/// Linear down-scan over the inclusive id range `start..=end`.
///
/// Tests every valid id's value in `state` (`true` for bool buttons,
/// magnitude above [`ANALOG_DOWN_THRESHOLD`] for float buttons) and
/// writes hits into `out` until it is full. Returns the count written.
pub fn check_all_buttons_down<B>(
    backend: &B,
    device: DeviceId,
    state: &InputState,
    out: &mut [ButtonSpec],
    start: ButtonId,
    end: ButtonId,
) -> usize
where
    B: DeviceBackend + ?Sized,
{
    let mut written = 0;
    for raw in start.0..=end.0 {
        if written == out.len() {
            break;
        }
        let button = ButtonId(raw);
        if !backend.is_valid_button(button) {
            continue;
        }
        let down = match backend.button_type(button) {
            Some(ButtonType::Bool) => state.get_bool(button),
            Some(ButtonType::Float) => state.get_float(button).abs() > ANALOG_DOWN_THRESHOLD,
            None => false,
        };
        if down {
            out[written] = ButtonSpec { device, button };
            written += 1;
        }
    }
    written
}

/// A registered input device: identity, double-buffered state, cached
/// health, and the backend that feeds it.
///
/// Constructed only by the registry, which assigns the id and the index
/// among same-type devices. See the [module docs](self) for the update
/// and availability contract.
pub struct Device {
    id: DeviceId,
    index: u32,
    health: DeviceHealth,
    current: InputState,
    previous: InputState,
    backend: Box<dyn DeviceBackend>,
}

impl Device {
    pub(crate) fn new(id: DeviceId, index: u32, backend: Box<dyn DeviceBackend>) -> Self {
        let health = backend.health();
        Self {
            id,
            index,
            health,
            current: InputState::new(),
            previous: InputState::new(),
            backend,
        }
    }

    /// Runs one frame of this device.
    ///
    /// After return, the previous store is a frozen snapshot of what
    /// the current store held before this call, the current store holds
    /// this frame's observed values, and [`health`](Self::health) is
    /// freshly probed. Failures do not surface here; they show up as
    /// health.
    pub fn update(&mut self, sink: Option<&mut (dyn DeltaSink + '_)>) {
        self.previous.copy_from(&self.current);

        let mut ctx = PollContext::new(self.id, &mut self.current, sink);
        self.backend.poll(&mut ctx);

        let health = self.backend.health();
        if health != self.health {
            log::debug!(
                "{} device {} health {:?} -> {:?}",
                self.backend.type_name(),
                self.id,
                self.health,
                health
            );
        }
        self.health = health;
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Index among devices of the same type.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn device_type(&self) -> DeviceType {
        self.backend.device_type()
    }

    pub fn type_name(&self) -> &'static str {
        self.backend.type_name()
    }

    /// The backend's late-update scheduling hint.
    pub fn is_late_update(&self) -> bool {
        self.backend.is_late_update()
    }

    /// Health as probed by the last [`update`](Self::update); stable
    /// between updates.
    pub fn health(&self) -> DeviceHealth {
        self.health
    }

    /// Whether queries return live values. Low battery is still
    /// available; only [`DeviceHealth::Unavailable`] suppresses input.
    pub fn is_available(&self) -> bool {
        matches!(self.health, DeviceHealth::Normal | DeviceHealth::LowBattery)
    }

    pub fn is_valid_button(&self, button: ButtonId) -> bool {
        self.backend.is_valid_button(button)
    }

    /// Current value of a boolean button.
    ///
    /// Returns `false` while the device is unavailable. Otherwise
    /// `button` must be valid for this device and declared
    /// [`ButtonType::Bool`].
    pub fn get_bool(&self, button: ButtonId) -> bool {
        if !self.is_available() {
            return false;
        }
        debug_assert!(
            self.is_valid_button(button),
            "invalid button {button} on {} device {}",
            self.type_name(),
            self.id
        );
        self.current.get_bool(button)
    }

    /// Previous-frame value of a boolean button; same contract as
    /// [`get_bool`](Self::get_bool).
    pub fn get_bool_previous(&self, button: ButtonId) -> bool {
        if !self.is_available() {
            return false;
        }
        debug_assert!(
            self.is_valid_button(button),
            "invalid button {button} on {} device {}",
            self.type_name(),
            self.id
        );
        self.previous.get_bool(button)
    }

    /// Current value of a float button.
    ///
    /// Returns `0.0` while the device is unavailable. Otherwise
    /// `button` must be valid for this device and declared
    /// [`ButtonType::Float`].
    pub fn get_float(&self, button: ButtonId) -> f32 {
        if !self.is_available() {
            return 0.0;
        }
        debug_assert!(
            self.is_valid_button(button),
            "invalid button {button} on {} device {}",
            self.type_name(),
            self.id
        );
        self.current.get_float(button)
    }

    /// Previous-frame value of a float button; same contract as
    /// [`get_float`](Self::get_float).
    pub fn get_float_previous(&self, button: ButtonId) -> f32 {
        if !self.is_available() {
            return 0.0;
        }
        debug_assert!(
            self.is_valid_button(button),
            "invalid button {button} on {} device {}",
            self.type_name(),
            self.id
        );
        self.previous.get_float(button)
    }

    /// Buttons currently down, at most `out.len()` of them; returns the
    /// count written. Zero while the device is unavailable or when the
    /// backend does not support the query.
    pub fn any_button_down(&self, out: &mut [ButtonSpec]) -> usize {
        if !self.is_available() {
            return 0;
        }
        self.backend.any_button_down(self.id, &self.current, out)
    }

    /// Human-readable name of a button, if the backend provides one.
    pub fn button_name(&self, button: ButtonId) -> Option<String> {
        self.backend.button_name(button)
    }

    /// Looks a button up by name; `None` if not found or unsupported.
    pub fn button_by_name(&self, name: &str) -> Option<ButtonId> {
        self.backend.button_by_name(name)
    }

    /// Value classification of a button; `None` for invalid ids.
    pub fn button_type(&self, button: ButtonId) -> Option<ButtonType> {
        self.backend.button_type(button)
    }

    /// Read-only view of the current frame's store. Mostly useful to
    /// recording/synchronization consumers.
    pub fn current_state(&self) -> &InputState {
        &self.current
    }

    /// Read-only view of the previous frame's store.
    pub fn previous_state(&self) -> &InputState {
        &self.previous
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("type", &self.type_name())
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::synthetic::{SyntheticDevice, SyntheticFeed};
    use crate::delta::{DeltaLog, StateDelta};

    /// Backend that keeps every trait default.
    struct Bare;

    impl DeviceBackend for Bare {
        fn device_type(&self) -> DeviceType {
            DeviceType::Custom
        }
        fn is_valid_button(&self, _button: ButtonId) -> bool {
            false
        }
        fn button_type(&self, _button: ButtonId) -> Option<ButtonType> {
            None
        }
        fn poll(&mut self, _ctx: &mut PollContext<'_, '_>) {}
        fn health(&self) -> DeviceHealth {
            DeviceHealth::Normal
        }
    }

    fn pad() -> (Device, SyntheticFeed, ButtonId, ButtonId) {
        let mut backend = SyntheticDevice::new(DeviceType::Pad);
        let south = backend.add_bool("south");
        let left_x = backend.add_float("left_x");
        let feed = backend.feed();
        let device = Device::new(DeviceId(0), 0, Box::new(backend));
        (device, feed, south, left_x)
    }

    #[test]
    fn previous_frame_is_a_frozen_snapshot() {
        let (mut device, feed, south, left_x) = pad();

        feed.press(south);
        feed.set_float(left_x, 0.9);
        device.update(None);
        assert!(device.get_bool(south));
        assert!(!device.get_bool_previous(south));

        // Nothing fed this frame: untouched buttons keep their values
        // on both sides of the buffer.
        device.update(None);
        assert!(device.get_bool(south));
        assert!(device.get_bool_previous(south));
        assert_eq!(device.get_float_previous(left_x), 0.9);
    }

    #[test]
    fn press_then_release_is_visible_across_frames() {
        let (mut device, feed, south, _) = pad();

        feed.press(south);
        device.update(None);
        assert!(device.get_bool(south));

        feed.release(south);
        device.update(None);
        assert!(!device.get_bool(south));
        assert!(device.get_bool_previous(south));
    }

    #[test]
    fn unavailable_device_reads_as_neutral() {
        let (mut device, feed, south, left_x) = pad();

        feed.press(south);
        feed.set_float(left_x, 1.0);
        device.update(None);
        assert!(device.get_bool(south));

        feed.set_health(DeviceHealth::Unavailable);
        device.update(None);
        assert!(!device.is_available());
        assert!(!device.get_bool(south));
        assert!(!device.get_bool_previous(south));
        assert_eq!(device.get_float(left_x), 0.0);
        assert_eq!(device.get_float_previous(left_x), 0.0);

        // The stored value survives the outage and reappears on
        // recovery.
        feed.set_health(DeviceHealth::Normal);
        device.update(None);
        assert!(device.get_bool(south));
    }

    #[test]
    fn low_battery_is_still_available() {
        let (mut device, feed, south, _) = pad();

        feed.press(south);
        feed.set_health(DeviceHealth::LowBattery);
        device.update(None);
        assert_eq!(device.health(), DeviceHealth::LowBattery);
        assert!(device.is_available());
        assert!(device.get_bool(south));
    }

    #[test]
    fn health_is_cached_between_updates() {
        let (mut device, feed, _, _) = pad();

        device.update(None);
        assert_eq!(device.health(), DeviceHealth::Normal);

        // Probed again only at the next update.
        feed.set_health(DeviceHealth::Unavailable);
        assert_eq!(device.health(), DeviceHealth::Normal);
        device.update(None);
        assert_eq!(device.health(), DeviceHealth::Unavailable);
    }

    #[test]
    fn any_button_down_respects_the_buffer() {
        let mut backend = SyntheticDevice::new(DeviceType::Pad);
        let a = backend.add_bool("a");
        let b = backend.add_bool("b");
        let trigger = backend.add_float("trigger");
        let left_x = backend.add_float("left_x");
        let feed = backend.feed();
        let mut device = Device::new(DeviceId(0), 0, Box::new(backend));

        feed.press(a);
        feed.press(b);
        feed.set_float(trigger, 0.9);
        feed.set_float(left_x, 0.3); // below the activation threshold
        device.update(None);

        let mut out = [ButtonSpec::default(); 8];
        let n = device.any_button_down(&mut out);
        assert_eq!(n, 3);
        let down: Vec<_> = out[..n].iter().map(|spec| spec.button).collect();
        assert_eq!(down, vec![a, b, trigger]);

        // A smaller buffer truncates the scan.
        let mut two = [ButtonSpec::default(); 2];
        assert_eq!(device.any_button_down(&mut two), 2);

        feed.set_health(DeviceHealth::Unavailable);
        device.update(None);
        assert_eq!(device.any_button_down(&mut out), 0);
    }

    #[test]
    fn analog_threshold_is_exclusive() {
        let mut backend = SyntheticDevice::new(DeviceType::Pad);
        let axis = backend.add_float("axis");
        let feed = backend.feed();
        let mut device = Device::new(DeviceId(0), 0, Box::new(backend));

        feed.set_float(axis, ANALOG_DOWN_THRESHOLD);
        device.update(None);
        let mut out = [ButtonSpec::default(); 4];
        assert_eq!(device.any_button_down(&mut out), 0);

        feed.set_float(axis, -0.51);
        device.update(None);
        assert_eq!(device.any_button_down(&mut out), 1);
    }

    #[test]
    fn button_metadata_is_stable() {
        let (device, _feed, south, left_x) = pad();

        assert_eq!(device.button_type(south), Some(ButtonType::Bool));
        assert_eq!(device.button_type(south), Some(ButtonType::Bool));
        assert_eq!(device.button_type(left_x), Some(ButtonType::Float));
        assert_eq!(device.button_name(south).as_deref(), Some("south"));
        assert_eq!(device.button_by_name("left_x"), Some(left_x));
        assert_eq!(device.button_by_name("invalid"), None);
        assert!(device.is_valid_button(south));
        assert!(!device.is_valid_button(ButtonId(99)));
    }

    #[test]
    fn trait_defaults_report_nothing() {
        let mut device = Device::new(DeviceId(7), 0, Box::new(Bare));
        device.update(None);

        assert!(!device.is_late_update());
        assert_eq!(device.type_name(), "custom");
        assert_eq!(device.button_name(ButtonId(0)), None);
        assert_eq!(device.button_by_name("anything"), None);

        let mut out = [ButtonSpec::default(); 4];
        assert_eq!(device.any_button_down(&mut out), 0);
    }

    #[test]
    fn deltas_flow_through_update() {
        let (mut device, feed, south, left_x) = pad();
        let mut log = DeltaLog::new();

        feed.press(south);
        feed.set_float(left_x, -0.25);
        device.update(Some(&mut log));

        assert_eq!(
            log.take(),
            vec![
                StateDelta::Button {
                    device: DeviceId(0),
                    button: south,
                    old: false,
                    new: true,
                },
                StateDelta::Axis {
                    device: DeviceId(0),
                    button: left_x,
                    old: 0.0,
                    new: -0.25,
                },
            ]
        );

        // Re-feeding the same values produces no deltas.
        feed.press(south);
        device.update(Some(&mut log));
        assert!(log.is_empty());
    }
}
