//! Device ownership and the per-frame update pass.

use std::collections::HashMap;

use thiserror::Error;

use crate::delta::DeltaSink;
use crate::device::{Device, DeviceBackend, DeviceId, DeviceType};

/// Registry operation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The device id is not (or no longer) registered.
    #[error("unknown device {0}")]
    UnknownDevice(DeviceId),
}

/// Owns every registered [`Device`] and drives the frame cycle.
///
/// The registry is the only way to bring a device to life: registering
/// a backend assigns the device id and the index among same-type
/// devices, both immutable from then on. Ids are allocated
/// monotonically and never handed out twice, even after the original
/// holder is deregistered.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
    next_id: u32,
    per_type: HashMap<DeviceType, u32>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `backend` as a new device and returns its assigned id.
    pub fn register(&mut self, backend: Box<dyn DeviceBackend>) -> DeviceId {
        let id = DeviceId(self.next_id);
        self.next_id += 1;

        let index = self.per_type.entry(backend.device_type()).or_insert(0);
        let assigned = *index;
        *index += 1;

        log::info!(
            "registered {} device {id} (index {assigned})",
            backend.type_name()
        );
        self.devices.push(Device::new(id, assigned, backend));
        id
    }

    /// Drops a device, releasing both its state buffers.
    pub fn deregister(&mut self, id: DeviceId) -> Result<(), Error> {
        let position = self
            .devices
            .iter()
            .position(|device| device.id() == id)
            .ok_or(Error::UnknownDevice(id))?;
        let device = self.devices.remove(position);
        log::info!("deregistered {} device {id}", device.type_name());
        Ok(())
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|device| device.id() == id)
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.iter_mut().find(|device| device.id() == id)
    }

    /// Registered devices, in registration order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Runs one frame: updates every device exactly once, non-late
    /// devices first (in registration order), then every late device.
    ///
    /// Late devices therefore observe their dependencies'
    /// already-updated state within the same frame.
    pub fn update_all(&mut self, mut sink: Option<&mut dyn DeltaSink>) {
        for device in self.devices.iter_mut().filter(|d| !d.is_late_update()) {
            device.update(sink.as_deref_mut());
        }
        for device in self.devices.iter_mut().filter(|d| d.is_late_update()) {
            device.update(sink.as_deref_mut());
        }
    }
}
