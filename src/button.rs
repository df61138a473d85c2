//! Button identity and classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::DeviceId;

/// Identifies a single logical input channel on a device.
///
/// Ids are scoped to one device; whether a given id is valid, and what
/// type of value it carries, is decided by that device and stays fixed
/// for the device's lifetime. There is no crate-wide namespacing of ids
/// across devices.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ButtonId(pub u16);

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value classification of a button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonType {
    /// Digital, either down (`true`) or up (`false`).
    Bool,
    /// Continuous, conventionally normalized to `[-1, 1]` or `[0, 1]`.
    Float,
}

/// A `(device, button)` pair.
///
/// Written by any-button-down scans so callers can tell which device a
/// down button belongs to when querying across several.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub device: DeviceId,
    pub button: ButtonId,
}
