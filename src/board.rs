//! Board variants and their VBUS / LED routing.

/// Pico IP VBUS sense - high if VBUS is present, else low.
pub const PICO_VBUS_GPIO: u8 = 24;
/// On-board LED on the plain Pico.
pub const PICO_LED_GPIO: u8 = 25;
/// Pico-W VBUS sense, routed through the wireless chip.
pub const PICOW_VBUS_WL_GPIO: u8 = 2;
/// Pico-W LED, routed through the wireless chip.
pub const PICOW_LED_WL_GPIO: u8 = 0;

/// Which physical board the firmware runs on. Selected once during
/// initialization; it decides whether VBUS sensing and the LED go through a
/// native GPIO or through the companion chip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardVariant {
    Pico,
    PicoW,
}

impl BoardVariant {
    /// Identifier printed in the diagnostic line.
    pub fn name(self) -> &'static str {
        match self {
            BoardVariant::Pico => "pico",
            BoardVariant::PicoW => "pico_w",
        }
    }

    /// GPIO index carrying the VBUS sense signal for this variant. On the
    /// Pico-W the index is a companion chip pin, not a native one.
    pub fn vbus_gpio(self) -> u8 {
        match self {
            BoardVariant::Pico => PICO_VBUS_GPIO,
            BoardVariant::PicoW => PICOW_VBUS_WL_GPIO,
        }
    }

    /// GPIO index driving the indicator LED for this variant.
    pub fn led_gpio(self) -> u8 {
        match self {
            BoardVariant::Pico => PICO_LED_GPIO,
            BoardVariant::PicoW => PICOW_LED_WL_GPIO,
        }
    }
}
