//! Bundled device backends.
//!
//! Implementations of [`DeviceBackend`](crate::device::DeviceBackend)
//! that ship with the crate. Platform polling backends (HID, evdev,
//! XInput, ...) belong in downstream crates; the only bundled backend
//! is the synthetic, feed-driven device.
//!
//! # Feature flags
//! - **`synthetic`** — enables the feed-driven synthetic device
//!   (default in this build).

#[cfg(feature = "synthetic")]
#[cfg_attr(docsrs, doc(cfg(feature = "synthetic")))]
pub mod synthetic;
