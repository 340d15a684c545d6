//! Mode 2 interrupt daisy chain.
//!
//! Z80 family peripherals (CTC, PIO, SIO) are wired in a priority chain:
//! each passes IEI to IEO only while it has nothing pending or under
//! service. The CPU sees one IRQ line; the chain decides which device's
//! vector answers the acknowledge and which device hears `RETI`.

use crate::error::DaisyError;

/// Device has an interrupt pending.
pub const INT_REQ: u8 = 0x01;

/// Device is under service: IEO is low and lower-priority devices are
/// blocked until it sees `RETI`.
pub const INT_IEO: u8 = 0x02;

/// Maximum number of devices on one chain.
pub const MAX_DAISY: usize = 4;

/// A peripheral on the interrupt daisy chain.
pub trait DaisyDevice {
    /// Return to the power-on state.
    fn reset(&mut self);

    /// Current state bits, a combination of [`INT_REQ`] and [`INT_IEO`].
    fn irq_state(&self) -> u8;

    /// The CPU acknowledged this device's request. Returns the vector byte.
    fn interrupt_entry(&mut self) -> u8;

    /// `RETI` was decoded while this device was under service.
    fn interrupt_reti(&mut self);
}

/// Devices in priority order (index 0 is highest) plus the arbitration
/// state the CPU keeps for them.
pub struct DaisyChain {
    devices: Vec<Box<dyn DaisyDevice>>,
    states: [u8; MAX_DAISY],
    request: Option<usize>,
    service: Option<usize>,
}

impl DaisyChain {
    pub fn new(devices: Vec<Box<dyn DaisyDevice>>) -> Result<Self, DaisyError> {
        if devices.len() > MAX_DAISY {
            return Err(DaisyError::TooManyDevices { max: MAX_DAISY, actual: devices.len() });
        }
        Ok(Self { devices, states: [0; MAX_DAISY], request: None, service: None })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Device at `index`, for hosts that need to poke it between slices.
    pub fn device_mut(&mut self, index: usize) -> Option<&mut (dyn DaisyDevice + 'static)> {
        self.devices.get_mut(index).map(|d| d.as_mut())
    }

    /// Latched state bits of every slot, as of the last arbitration.
    #[must_use]
    pub fn states(&self) -> [u8; MAX_DAISY] {
        self.states
    }

    /// Device whose request will answer the next acknowledge.
    #[must_use]
    pub fn request(&self) -> Option<usize> {
        self.request
    }

    /// Highest-priority device currently under service.
    #[must_use]
    pub fn service(&self) -> Option<usize> {
        self.service
    }

    pub(crate) fn reset(&mut self) {
        for device in &mut self.devices {
            device.reset();
        }
        self.states = [0; MAX_DAISY];
        self.request = None;
        self.service = None;
    }

    /// Re-read every device and recompute priority.
    ///
    /// The service device is the highest-priority device under service;
    /// it hears the next `RETI`. The request device is the first device
    /// with a request that is not below a device under service.
    pub(crate) fn arbitrate(&mut self) {
        for (slot, device) in self.states.iter_mut().zip(&self.devices) {
            *slot = device.irq_state();
        }

        let (old_request, old_service) = (self.request, self.service);
        self.request = None;
        self.service = None;
        let mut blocked = false;
        for (idx, &state) in self.states.iter().enumerate().take(self.devices.len()) {
            if !blocked && self.request.is_none() && state & INT_REQ != 0 {
                self.request = Some(idx);
            }
            if state & INT_IEO != 0 {
                if self.service.is_none() {
                    self.service = Some(idx);
                }
                blocked = true;
            }
        }

        if (old_request, old_service) != (self.request, self.service) {
            tracing::trace!(request = ?self.request, service = ?self.service, "daisy chain priority");
        }
    }

    /// Acknowledge the request device, returning its vector.
    pub(crate) fn acknowledge(&mut self) -> Option<u8> {
        let idx = self.request?;
        let vector = self.devices[idx].interrupt_entry();
        self.arbitrate();
        Some(vector)
    }

    /// Forward `RETI` to the device under service.
    pub(crate) fn reti(&mut self) {
        if let Some(idx) = self.service {
            self.devices[idx].interrupt_reti();
            self.arbitrate();
        }
    }

    pub(crate) fn restore(
        &mut self,
        states: [u8; MAX_DAISY],
        request: Option<usize>,
        service: Option<usize>,
    ) {
        self.states = states;
        self.request = request;
        self.service = service;
    }

    pub(crate) fn set_state(&mut self, slot: usize, value: u8) {
        if let Some(state) = self.states.get_mut(slot) {
            *state = value;
        }
    }
}
