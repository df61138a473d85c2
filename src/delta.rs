//! Change observation during device updates.
//!
//! Recording and synchronization layers want to see every button value
//! change a device makes, without the device knowing they exist. The
//! pieces here keep those concerns apart:
//!
//! - [`StateDelta`] is one observed change, with the value before and
//!   after.
//! - [`DeltaSink`] is the write-only observer an update pass may carry.
//! - [`PollContext`] is what a backend writes its frame state through;
//!   it forwards each *changed* write to the sink, so polling code
//!   never references the sink at all.
//!
//! [`DeltaLog`] is a trivial bundled sink that collects deltas into a
//! `Vec`, handy for tests and replay rigs. Persistence formats are up
//! to the consumer; `StateDelta` is serde-serializable for that reason.

use serde::{Deserialize, Serialize};

use crate::button::ButtonId;
use crate::device::DeviceId;
use crate::state::InputState;

/// A single observed change to a device's current state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum StateDelta {
    /// A boolean button changed value.
    Button {
        device: DeviceId,
        button: ButtonId,
        old: bool,
        new: bool,
    },
    /// A float button changed value.
    Axis {
        device: DeviceId,
        button: ButtonId,
        old: f32,
        new: f32,
    },
}

/// Write-only observer of state changes made during an update pass.
pub trait DeltaSink {
    fn record(&mut self, delta: StateDelta);
}

/// Sink that collects every recorded delta into a `Vec`.
#[derive(Debug, Default)]
pub struct DeltaLog {
    deltas: Vec<StateDelta>,
}

impl DeltaLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deltas recorded so far, in record order.
    pub fn deltas(&self) -> &[StateDelta] {
        &self.deltas
    }

    /// Takes the recorded deltas, leaving the log empty.
    pub fn take(&mut self) -> Vec<StateDelta> {
        std::mem::take(&mut self.deltas)
    }

    pub fn clear(&mut self) {
        self.deltas.clear();
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

impl DeltaSink for DeltaLog {
    fn record(&mut self, delta: StateDelta) {
        self.deltas.push(delta);
    }
}

/// Write access to a device's current state for one poll.
///
/// Handed to [`DeviceBackend::poll`](crate::device::DeviceBackend::poll)
/// by the device update cycle. Writes that change a value are reported
/// to the sink, if one was supplied for this frame; writes that restate
/// the stored value are not.
pub struct PollContext<'a, 's> {
    device: DeviceId,
    state: &'a mut InputState,
    sink: Option<&'a mut (dyn DeltaSink + 's)>,
}

impl<'a, 's> PollContext<'a, 's> {
    pub fn new(
        device: DeviceId,
        state: &'a mut InputState,
        sink: Option<&'a mut (dyn DeltaSink + 's)>,
    ) -> Self {
        Self {
            device,
            state,
            sink,
        }
    }

    /// Id of the device being polled.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Stored boolean value, as of the last write.
    pub fn get_bool(&self, button: ButtonId) -> bool {
        self.state.get_bool(button)
    }

    /// Stored float value, as of the last write.
    pub fn get_float(&self, button: ButtonId) -> f32 {
        self.state.get_float(button)
    }

    pub fn set_bool(&mut self, button: ButtonId, value: bool) {
        let old = self.state.get_bool(button);
        if old != value {
            if let Some(sink) = self.sink.as_deref_mut() {
                sink.record(StateDelta::Button {
                    device: self.device,
                    button,
                    old,
                    new: value,
                });
            }
        }
        self.state.set_bool(button, value);
    }

    pub fn set_float(&mut self, button: ButtonId, value: f32) {
        let old = self.state.get_float(button);
        if old != value {
            if let Some(sink) = self.sink.as_deref_mut() {
                sink.record(StateDelta::Axis {
                    device: self.device,
                    button,
                    old,
                    new: value,
                });
            }
        }
        self.state.set_float(button, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_writes_reach_the_sink() {
        let mut state = InputState::new();
        let mut log = DeltaLog::new();
        let mut ctx = PollContext::new(DeviceId(4), &mut state, Some(&mut log));

        ctx.set_bool(ButtonId(1), true);
        ctx.set_float(ButtonId(2), 0.5);

        assert_eq!(
            log.deltas(),
            &[
                StateDelta::Button {
                    device: DeviceId(4),
                    button: ButtonId(1),
                    old: false,
                    new: true,
                },
                StateDelta::Axis {
                    device: DeviceId(4),
                    button: ButtonId(2),
                    old: 0.0,
                    new: 0.5,
                },
            ]
        );
    }

    #[test]
    fn restating_a_value_records_nothing() {
        let mut state = InputState::new();
        state.set_bool(ButtonId(1), true);
        state.set_float(ButtonId(2), 0.5);

        let mut log = DeltaLog::new();
        let mut ctx = PollContext::new(DeviceId(0), &mut state, Some(&mut log));
        ctx.set_bool(ButtonId(1), true);
        ctx.set_float(ButtonId(2), 0.5);

        assert!(log.is_empty());
    }

    #[test]
    fn writes_land_without_a_sink() {
        let mut state = InputState::new();
        let mut ctx = PollContext::new(DeviceId(0), &mut state, None);
        ctx.set_bool(ButtonId(0), true);
        assert!(ctx.get_bool(ButtonId(0)));
    }

    #[test]
    fn deltas_serialize_for_external_recorders() {
        let delta = StateDelta::Button {
            device: DeviceId(1),
            button: ButtonId(9),
            old: false,
            new: true,
        };
        let json = serde_json::to_string(&delta).expect("serialize");
        let back: StateDelta = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, delta);
    }

    #[test]
    fn log_take_drains() {
        let mut log = DeltaLog::new();
        log.record(StateDelta::Button {
            device: DeviceId(0),
            button: ButtonId(0),
            old: false,
            new: true,
        });
        assert_eq!(log.len(), 1);
        assert_eq!(log.take().len(), 1);
        assert!(log.is_empty());
    }
}
