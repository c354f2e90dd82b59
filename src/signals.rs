//! Raw USB link signals and the sources that read them.

use embedded_hal::digital::v2::InputPin;

use crate::companion::{CompanionChip, CompanionIo};

/// SUSPENDED bit of the device controller's SIE_STATUS register. Set once
/// the bus has been idle long enough for the host to be considered gone.
pub const SIE_STATUS_SUSPENDED: u32 = 1 << 4;

/// One snapshot of the three link signals, rebuilt on every loop iteration.
/// Nothing here survives across iterations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSignals {
    /// Raw SIE_STATUS register word, printed verbatim in the report line.
    pub sie_status: u32,
    /// SUSPENDED bit of `sie_status`.
    pub bus_suspended: bool,
    /// VBUS sense input reads high.
    pub vbus_present: bool,
    /// The device stack has completed enumeration with a host.
    pub host_session_ready: bool,
}

impl RawSignals {
    pub fn new(sie_status: u32, vbus_present: bool, host_session_ready: bool) -> Self {
        Self {
            sie_status,
            bus_suspended: sie_status & SIE_STATUS_SUSPENDED != 0,
            vbus_present,
            host_session_ready,
        }
    }

    /// Builds a snapshot from plain flags, synthesizing the register word.
    /// Used by fakes and anything without access to the real controller.
    pub fn from_flags(bus_suspended: bool, vbus_present: bool, host_session_ready: bool) -> Self {
        let sie_status = if bus_suspended { SIE_STATUS_SUSPENDED } else { 0 };
        Self::new(sie_status, vbus_present, host_session_ready)
    }
}

/// The variant-independent half of the link state: the device controller's
/// status register and the stack's enumeration state. Implemented by the
/// firmware binary over the real `UsbDevice`; tests substitute fakes.
pub trait UsbLink {
    /// Raw SIE_STATUS register word.
    fn controller_status(&mut self) -> u32;

    /// True once the stack considers itself enumerated by a host.
    fn session_ready(&mut self) -> bool;

    /// Runs the device-stack task for one slice. Called from the idle part
    /// of the monitor loop; readiness is polled, never assumed ordered with
    /// this call.
    fn service(&mut self) {}
}

/// Reads the three raw signals. All reads are non-blocking and infallible;
/// a misconfigured peripheral yields a wrong-but-well-formed value, never an
/// error.
pub trait SignalSource {
    /// Raw device-controller status word.
    fn bus_status(&mut self) -> u32;

    fn vbus_present(&mut self) -> bool;

    fn host_session_ready(&mut self) -> bool;

    /// SUSPENDED bit of the status word.
    fn bus_suspended(&mut self) -> bool {
        self.bus_status() & SIE_STATUS_SUSPENDED != 0
    }

    /// Cooperative hook for the device-stack task, see [`UsbLink::service`].
    fn service(&mut self) {}

    /// One coherent snapshot; the register is read once so the derived
    /// suspend flag and the reported word always agree.
    fn sample(&mut self) -> RawSignals {
        let status = self.bus_status();
        let vbus = self.vbus_present();
        let ready = self.host_session_ready();
        RawSignals::new(status, vbus, ready)
    }
}

/// Signal source for boards with native VBUS sensing on a GPIO input.
pub struct DirectGpioSource<L, V> {
    link: L,
    vbus: V,
}

impl<L, V> DirectGpioSource<L, V>
where
    L: UsbLink,
    V: InputPin,
{
    /// The pin must already be configured as an input.
    pub fn new(link: L, vbus: V) -> Self {
        Self { link, vbus }
    }
}

impl<L, V> SignalSource for DirectGpioSource<L, V>
where
    L: UsbLink,
    V: InputPin,
{
    fn bus_status(&mut self) -> u32 {
        self.link.controller_status()
    }

    fn vbus_present(&mut self) -> bool {
        self.vbus.is_high().unwrap_or(false)
    }

    fn host_session_ready(&mut self) -> bool {
        self.link.session_ready()
    }

    fn service(&mut self) {
        self.link.service();
    }
}

/// Signal source for boards where VBUS sensing is multiplexed through a
/// companion chip. The chip handle is shared with the indicator driver.
pub struct CompanionChipSource<'c, L, C: CompanionIo> {
    link: L,
    chip: &'c CompanionChip<C>,
    vbus_pin: u8,
}

impl<'c, L, C> CompanionChipSource<'c, L, C>
where
    L: UsbLink,
    C: CompanionIo,
{
    pub fn new(link: L, chip: &'c CompanionChip<C>, vbus_pin: u8) -> Self {
        Self {
            link,
            chip,
            vbus_pin,
        }
    }
}

impl<'c, L, C> SignalSource for CompanionChipSource<'c, L, C>
where
    L: UsbLink,
    C: CompanionIo,
{
    fn bus_status(&mut self) -> u32 {
        self.link.controller_status()
    }

    fn vbus_present(&mut self) -> bool {
        self.chip.read_gpio(self.vbus_pin)
    }

    fn host_session_ready(&mut self) -> bool {
        self.link.session_ready()
    }

    fn service(&mut self) {
        self.link.service();
    }
}
