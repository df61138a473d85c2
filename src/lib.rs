//! Doubletap — device abstraction core for input systems.
//!
//! Every input source, from mice, keyboards, pads and touch surfaces
//! to networked remotes, composite gestures and user-defined devices,
//! is queried through one uniform contract: [`Device`]. Each device
//! keeps a double-buffered button store, so the current and previous
//! frame can be compared
//! without missed transitions, and reports every state change to an
//! optional [`DeltaSink`] so recording and synchronization layers can
//! observe updates without devices knowing about them.
//!
//! Concrete sources implement [`DeviceBackend`]; the [`DeviceRegistry`]
//! owns all devices, assigns identity, and drives the per-frame update
//! pass, updating late devices (gestures and other composites) after
//! everything they depend on.
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
//!
//! let pad = registry.device(id).unwrap();
//! assert!(pad.get_bool(south));
//! assert!(!pad.get_bool_previous(south));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backends;
pub mod button;
pub mod delta;
pub mod device;
pub mod manager;
pub mod state;

pub use button::{ButtonId, ButtonSpec, ButtonType};
pub use delta::{DeltaLog, DeltaSink, PollContext, StateDelta};
pub use device::{
    check_all_buttons_down, Device, DeviceBackend, DeviceHealth, DeviceId, DeviceType,
    ANALOG_DOWN_THRESHOLD,
};
pub use manager::{DeviceRegistry, Error};
pub use state::InputState;
