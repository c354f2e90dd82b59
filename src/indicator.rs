//! Visual connection indicator.

use embedded_hal::digital::v2::OutputPin;

use crate::companion::{CompanionChip, CompanionIo};

/// On/off indicator for the connection verdict. The write takes effect
/// immediately and cannot fail observably.
pub trait Indicator {
    fn set_state(&mut self, on: bool);
}

/// Indicator on a native GPIO output, e.g. the plain Pico's LED.
pub struct GpioIndicator<P> {
    pin: P,
}

impl<P: OutputPin> GpioIndicator<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: OutputPin> Indicator for GpioIndicator<P> {
    fn set_state(&mut self, on: bool) {
        let _ = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}

/// Indicator routed through the companion chip, e.g. the Pico-W's LED.
pub struct CompanionIndicator<'c, C: CompanionIo> {
    chip: &'c CompanionChip<C>,
    pin: u8,
}

impl<'c, C: CompanionIo> CompanionIndicator<'c, C> {
    pub fn new(chip: &'c CompanionChip<C>, pin: u8) -> Self {
        Self { chip, pin }
    }
}

impl<'c, C: CompanionIo> Indicator for CompanionIndicator<'c, C> {
    fn set_state(&mut self, on: bool) {
        self.chip.write_gpio(self.pin, on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakePin(Rc<Cell<bool>>);

    impl OutputPin for FakePin {
        type Error = Infallible;

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.set(true);
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.set(false);
            Ok(())
        }
    }

    struct FakeChipIo(u8);

    impl CompanionIo for FakeChipIo {
        fn read_gpio(&mut self, pin: u8) -> bool {
            self.0 & (1 << pin) != 0
        }

        fn write_gpio(&mut self, pin: u8, high: bool) {
            if high {
                self.0 |= 1 << pin;
            } else {
                self.0 &= !(1 << pin);
            }
        }
    }

    #[test]
    fn gpio_indicator_takes_effect_immediately() {
        let state = Rc::new(Cell::new(false));
        let mut led = GpioIndicator::new(FakePin(state.clone()));

        led.set_state(true);
        assert!(state.get());
        led.set_state(false);
        assert!(!state.get());
    }

    #[test]
    fn companion_indicator_writes_the_routed_pin() {
        let chip = CompanionChip::new(FakeChipIo(0));
        let mut led = CompanionIndicator::new(&chip, 0);

        led.set_state(true);
        assert!(chip.read_gpio(0));
        led.set_state(false);
        assert!(!chip.read_gpio(0));
    }
}
