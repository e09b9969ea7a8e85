//! WS2812 ring on the RMT peripheral via `ws2812-esp32-rmt-driver`.
//!
//! The LED engine hands over a frame already in wire order, three bytes per
//! LED. The driver is a GRB `SmartLedsWrite` writer, so the frame goes
//! through [`grb_writer_pixels`] and reaches the strip byte for byte in
//! either color order.

use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::rmt::RmtChannel;
use smart_leds_trait::SmartLedsWrite;
use ws2812_esp32_rmt_driver::{Ws2812Esp32Rmt, Ws2812Esp32RmtDriverError};

use crate::led::grb_writer_pixels;
use crate::traits::StripDriver;

/// WS2812 output on one RMT channel.
///
/// # Example
///
/// ```ignore
/// use radial_dial::config::ColorOrder;
/// use radial_dial::hal::esp32::Esp32Strip;
/// use radial_dial::led::LedEffectEngine;
///
/// let peripherals = Peripherals::take()?;
/// let strip = Esp32Strip::new(peripherals.rmt.channel0, peripherals.pins.gpio8)?;
/// let mut leds = LedEffectEngine::new(strip, 4, ColorOrder::Grb)?;
/// ```
pub struct Esp32Strip<'d> {
    writer: Ws2812Esp32Rmt<'d>,
}

impl<'d> Esp32Strip<'d> {
    /// Claim an RMT channel and data pin.
    ///
    /// # Errors
    ///
    /// Returns an error if the RMT driver cannot be installed.
    pub fn new<C: RmtChannel>(
        channel: impl Peripheral<P = C> + 'd,
        pin: impl Peripheral<P = impl OutputPin> + 'd,
    ) -> Result<Self, Ws2812Esp32RmtDriverError> {
        let writer = Ws2812Esp32Rmt::new(channel, pin)?;
        Ok(Self { writer })
    }
}

impl StripDriver for Esp32Strip<'_> {
    type Error = Ws2812Esp32RmtDriverError;

    fn write(&mut self, data: &[u8]) -> Result<(), Ws2812Esp32RmtDriverError> {
        self.writer.write(grb_writer_pixels(data))
    }
}
