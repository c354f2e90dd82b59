//! Access to a companion chip that routes GPIOs for the board.
//!
//! Boards like the Pico-W sense VBUS and drive the LED through a separate
//! chip instead of native pins. The chip exposes its GPIOs by index, so the
//! abstraction here is indexed reads and writes rather than pin handles.

use core::cell::RefCell;

use embedded_hal::blocking::i2c::{Read, Write};
use pcf857x::{Pcf8575, PinFlag, SlaveAddr};

/// Indexed GPIO access on a companion chip. Writes are fire-and-forget and
/// a failed read yields `false`; the link monitor has no error path for
/// hardware access.
pub trait CompanionIo {
    fn read_gpio(&mut self, pin: u8) -> bool;

    fn write_gpio(&mut self, pin: u8, high: bool);
}

/// Shares one companion chip between the VBUS source and the indicator.
/// Interior mutability is fine here: the monitor core is single-threaded
/// and the two users never hold a borrow across a suspension point.
pub struct CompanionChip<C: CompanionIo> {
    io: RefCell<C>,
}

impl<C: CompanionIo> CompanionChip<C> {
    pub fn new(io: C) -> Self {
        Self {
            io: RefCell::new(io),
        }
    }

    pub fn read_gpio(&self, pin: u8) -> bool {
        self.io.borrow_mut().read_gpio(pin)
    }

    pub fn write_gpio(&self, pin: u8, high: bool) {
        self.io.borrow_mut().write_gpio(pin, high);
    }

    pub fn into_inner(self) -> C {
        self.io.into_inner()
    }
}

/// Companion I/O over a PCF8575 I2C expander. The port is
/// quasi-bidirectional: a pin read as input must have its output latch
/// high, so the shadow word starts at all-ones and writes only clear the
/// pins actually driven.
pub struct ExpanderIo<I2C> {
    dev: Pcf8575<I2C>,
    shadow: u16,
}

impl<I2C, E> ExpanderIo<I2C>
where
    I2C: Write<Error = E> + Read<Error = E>,
{
    pub fn new(i2c: I2C, address: SlaveAddr) -> Self {
        let mut dev = Pcf8575::new(i2c, address);
        let shadow = 0xffff;
        let _ = dev.set(shadow);
        Self { dev, shadow }
    }
}

/// Maps a pin index to the expander's flag: 0-7 are port 0 (`P0`..`P7`),
/// 8-15 are port 1 (`P10`..`P17`).
fn pin_flag(pin: u8) -> Option<PinFlag> {
    let flag = match pin {
        0 => PinFlag::P0,
        1 => PinFlag::P1,
        2 => PinFlag::P2,
        3 => PinFlag::P3,
        4 => PinFlag::P4,
        5 => PinFlag::P5,
        6 => PinFlag::P6,
        7 => PinFlag::P7,
        8 => PinFlag::P10,
        9 => PinFlag::P11,
        10 => PinFlag::P12,
        11 => PinFlag::P13,
        12 => PinFlag::P14,
        13 => PinFlag::P15,
        14 => PinFlag::P16,
        15 => PinFlag::P17,
        _ => return None,
    };
    Some(flag)
}

impl<I2C, E> CompanionIo for ExpanderIo<I2C>
where
    I2C: Write<Error = E> + Read<Error = E>,
{
    fn read_gpio(&mut self, pin: u8) -> bool {
        let flag = match pin_flag(pin) {
            Some(flag) => flag,
            None => return false,
        };
        match self.dev.get(flag) {
            Ok(bits) => bits & (1 << pin) != 0,
            Err(_) => false,
        }
    }

    fn write_gpio(&mut self, pin: u8, high: bool) {
        if pin_flag(pin).is_none() {
            return;
        }
        if high {
            self.shadow |= 1 << pin;
        } else {
            self.shadow &= !(1 << pin);
        }
        let _ = self.dev.set(self.shadow);
    }
}
