//! ESP32 hardware abstraction layer for the radial dial.
//!
//! This module provides hardware implementations for an ESP32 board wired
//! to an EC11 rotary encoder and a WS2812 ring.
//!
//! # Hardware Configuration
//!
//! - **Encoder**: EC11 with push button, pulled up, key active low
//! - **LEDs**: WS2812 ring (up to 10 LEDs) driven by the RMT peripheral
//! - **Storage**: the config record lives in one NVS blob
//!
//! The HID endpoint is provided by the board's USB device stack and is not
//! part of this module.
//!
//! # Bring-up
//!
//! ```ignore
//! use esp_idf_hal::peripherals::Peripherals;
//! use esp_idf_svc::log::EspLogger;
//! use esp_idf_svc::nvs::EspDefaultNvsPartition;
//! use radial_dial::hal::esp32::{encoder_pins, Esp32Clock, Esp32Storage, Esp32Strip};
//! use radial_dial::{ColorOrder, ConfigStore, EncoderDecoder, LedEffectEngine, RadialController};
//!
//! esp_idf_svc::sys::link_patches();
//! EspLogger::initialize_default();
//!
//! let p = Peripherals::take()?;
//! let decoder = EncoderDecoder::new(encoder_pins(p.pins.gpio6, p.pins.gpio7, p.pins.gpio10)?);
//! let strip = Esp32Strip::new(p.rmt.channel0, p.pins.gpio8)?;
//! let leds = LedEffectEngine::new(strip, 4, ColorOrder::Grb)?;
//! let store = ConfigStore::new(Esp32Storage::new(EspDefaultNvsPartition::take()?)?);
//!
//! // `usb_hid` comes from the board's USB device stack
//! let tx = RadialTransmitter::new(usb_hid, Esp32Clock::new(), &BUSY);
//! let mut controller = RadialController::new(decoder, tx, leds, store);
//! loop {
//!     controller.tick(Esp32Clock::new().now_ms());
//!     FreeRtos::delay_ms(1);
//! }
//! ```
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for the default GPIO assignments.

mod clock;
mod encoder;
mod storage;
mod strip;

pub use clock::Esp32Clock;
pub use encoder::{encoder_pins, Esp32EncoderPins};
pub use storage::{Esp32Storage, Esp32StorageError};
pub use strip::Esp32Strip;

/// Default pin assignments.
pub mod pins {
    // =========================================================================
    // Rotary Encoder (EC11)
    // =========================================================================

    /// Encoder A phase
    pub const ENC_A: i32 = 6;

    /// Encoder B phase
    pub const ENC_B: i32 = 7;

    /// Encoder push button (active low)
    pub const ENC_KEY: i32 = 10;

    // =========================================================================
    // LED Ring (WS2812)
    // =========================================================================

    /// WS2812 data line
    pub const LED_DATA: i32 = 8;
}
