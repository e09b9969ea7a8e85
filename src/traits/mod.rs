//! Trait definitions for hardware abstraction.
//!
//! This module defines the seams that allow radial-dial to:
//! - Run on different hardware (ESP32, desktop mock)
//! - Keep the decoder, report, LED and config logic free of register access
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`EncoderPins`]: A/B/key pin levels of the rotary encoder
//! - [`StripDriver`]: WS2812 strip output
//! - [`HidEndpoint`]: USB HID interrupt endpoint
//! - [`ConfigStorage`]: EEPROM-style byte storage
//! - [`Clock`]: Time source for `no_std` environments

pub mod hardware;

pub use hardware::*;
