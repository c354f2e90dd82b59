//! USB link diagnostic firmware for the Raspberry Pi Pico.
//!
//! Presents a CDC serial function on the USB port, then reports the link
//! state (stack readiness, SIE suspend status, VBUS sense) once a second on
//! UART0 and mirrors the verdict on the on-board LED.
//!
//! The default build wires the plain Pico (native VBUS sense and LED); the
//! `pico-w` feature selects the companion-chip routing instead.

#![no_std]
#![no_main]

use core::fmt::Write as _;

use panic_rtt_target as _;
use rp2040_hal as hal;
use rtt_target::{rprintln, rtt_init_print};

use hal::clocks::{init_clocks_and_plls, Clock};
use hal::fugit::RateExtU32;
use hal::gpio::Pins;
use hal::pac;
use hal::sio::Sio;
use hal::uart::{DataBits, StopBits, UartConfig, UartPeripheral};
use hal::usb::UsbBus;
use hal::watchdog::Watchdog;

use usb_device::bus::UsbBusAllocator;
use usb_device::device::UsbDeviceState;
use usb_device::prelude::*;
use usbd_serial::SerialPort;

use pico_usb_diag::board::BoardVariant;
use pico_usb_diag::monitor::Monitor;
use pico_usb_diag::signals::UsbLink;

#[cfg(not(feature = "pico-w"))]
use pico_usb_diag::{indicator::GpioIndicator, signals::DirectGpioSource};

#[cfg(feature = "pico-w")]
use hal::gpio::{FunctionI2C, Pin, PullUp};
#[cfg(feature = "pico-w")]
use pcf857x::SlaveAddr;
#[cfg(feature = "pico-w")]
use pico_usb_diag::{
    board::{PICOW_LED_WL_GPIO, PICOW_VBUS_WL_GPIO},
    companion::{CompanionChip, ExpanderIo},
    indicator::CompanionIndicator,
    signals::CompanionChipSource,
};

#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

const XOSC_CRYSTAL_FREQ: u32 = 12_000_000;

/// SIE_STATUS lives at offset 0x50 of the USB controller register block.
const SIE_STATUS_OFFSET: usize = 0x50;

fn read_sie_status() -> u32 {
    let base = pac::USBCTRL_REGS::ptr() as *const u8;
    // Plain volatile read of a status register; always yields a value.
    unsafe { core::ptr::read_volatile(base.add(SIE_STATUS_OFFSET) as *const u32) }
}

/// The CDC device this firmware enumerates as, queried for the
/// variant-independent link signals.
struct CdcLink<'a, B: usb_device::bus::UsbBus> {
    device: UsbDevice<'a, B>,
    serial: SerialPort<'a, B>,
}

impl<'a, B: usb_device::bus::UsbBus> UsbLink for CdcLink<'a, B> {
    fn controller_status(&mut self) -> u32 {
        read_sie_status()
    }

    fn session_ready(&mut self) -> bool {
        self.device.state() == UsbDeviceState::Configured
    }

    fn service(&mut self) {
        if self.device.poll(&mut [&mut self.serial]) {
            // Drain host chatter so the endpoint never backs up.
            let mut buf = [0u8; 64];
            let _ = self.serial.read(&mut buf);
        }
    }
}

#[rp2040_hal::entry]
fn main() -> ! {
    rtt_init_print!();

    rprintln!("USB link diagnostic starting");

    let mut pac = pac::Peripherals::take().unwrap();
    let core = pac::CorePeripherals::take().unwrap();

    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let clocks = init_clocks_and_plls(
        XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let sio = Sio::new(pac.SIO);
    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let uart_pins = (pins.gpio0.into_function(), pins.gpio1.into_function());
    let mut console = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(115_200.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();

    let _ = writeln!(console, "console up");

    let usb_bus = UsbBusAllocator::new(UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        true,
        &mut pac.RESETS,
    ));

    let serial = SerialPort::new(&usb_bus);
    let device = UsbDeviceBuilder::new(&usb_bus, UsbVidPid(0x16c0, 0x27dd))
        .manufacturer("pico-usb-diag")
        .product("USB link diagnostic")
        .serial_number("PICO0001")
        .device_class(usbd_serial::USB_CLASS_CDC)
        .build();

    let delay = cortex_m::delay::Delay::new(core.SYST, clocks.system_clock.freq().to_Hz());

    rprintln!("hardware up, entering monitor loop");

    #[cfg(not(feature = "pico-w"))]
    {
        let vbus = pins.gpio24.into_floating_input();
        let led = pins.gpio25.into_push_pull_output();

        let source = DirectGpioSource::new(CdcLink { device, serial }, vbus);
        let mut monitor = Monitor::new(
            BoardVariant::Pico,
            source,
            Some(GpioIndicator::new(led)),
            console,
            delay,
        );
        monitor.run()
    }

    #[cfg(feature = "pico-w")]
    {
        // The wireless chip that routes VBUS and the LED needs an async
        // driver; a PCF8575 on I2C0 carries the companion I/O until one
        // exists for this blocking firmware.
        let sda: Pin<_, FunctionI2C, PullUp> = pins.gpio4.reconfigure();
        let scl: Pin<_, FunctionI2C, PullUp> = pins.gpio5.reconfigure();
        let i2c = hal::I2C::i2c0(
            pac.I2C0,
            sda,
            scl,
            100.kHz(),
            &mut pac.RESETS,
            &clocks.system_clock,
        );

        let chip = CompanionChip::new(ExpanderIo::new(i2c, SlaveAddr::Default));
        let source =
            CompanionChipSource::new(CdcLink { device, serial }, &chip, PICOW_VBUS_WL_GPIO);
        let indicator = CompanionIndicator::new(&chip, PICOW_LED_WL_GPIO);
        let mut monitor = Monitor::new(BoardVariant::PicoW, source, Some(indicator), console, delay);
        monitor.run()
    }
}
