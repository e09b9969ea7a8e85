//! # radial-dial
//!
//! Firmware core for a USB radial controller: a detented rotary encoder
//! with a push button reported to the host as a HID relative dial, plus an
//! addressable LED ring that animates with the dial.
//!
//! ## Features
//!
//! - **Quadrature decoding**: configurable events per detent and phase wiring
//! - **HID reports**: 3-byte radial reports with bounded, single-buffered transmit
//! - **LED effects**: rate-limited hue rotation plus button-driven fades
//! - **Persistent config**: validated, self-healing 32-byte record
//! - **Serial console**: line commands to inspect and change the config
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware seams (pins, strip, endpoint, storage, clock)
//! - `encoder` - Quadrature and key decoding
//! - `report` - HID report encoding and transmission
//! - `led` - LED effect engine
//! - `config` - Device config and its persisted record
//! - `console` - Configuration command interpreter
//! - `controller` - One scheduler tick across all of the above
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use radial_dial::{
//!     BusyFlag, ColorOrder, ConfigStore, EncoderDecoder, LedEffectEngine, RadialController,
//!     RadialTransmitter,
//!     hal::{MockClock, MockEeprom, MockEndpoint, MockPins, MockStrip},
//! };
//!
//! let busy = BusyFlag::new();
//! let mut controller = RadialController::new(
//!     EncoderDecoder::new(MockPins::new()),
//!     RadialTransmitter::new(MockEndpoint::configured(), MockClock::new(), &busy),
//!     LedEffectEngine::new(MockStrip::new(), 4, ColorOrder::Grb).unwrap(),
//!     ConfigStore::new(MockEeprom::erased()),
//! );
//!
//! // Main loop: one tick per millisecond or so
//! for now_ms in 0..100 {
//!     controller.tick(now_ms);
//! }
//! assert_eq!(controller.store().led_count(), 4);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Device config, validation and the persisted record.
pub mod config;
/// Serial configuration console.
pub mod console;
/// Scheduler tick tying all components together.
pub mod controller;
/// Quadrature encoder and key decoder.
pub mod encoder;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// LED ring effect engine.
pub mod led;
/// Radial HID report and transmitter.
pub mod report;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use config::{
    ColorOrder, ConfigError, ConfigStore, DeviceConfig, LoadOutcome, Phase, Sensitivity,
};
pub use console::{Command, ConfigKey, Console, ConsoleError, Reply};
pub use controller::{RadialController, TickSummary};
pub use encoder::{Direction, EncoderDecoder, KeyState};
pub use led::{EffectState, LedEffectEngine, LedError};
pub use report::{BusyFlag, HidError, RadialReport, RadialTransmitter};
pub use traits::{Clock, ConfigStorage, EncoderPins, HidEndpoint, StripDriver};
