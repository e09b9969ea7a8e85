//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `gpio`: Encoder pins over embedded-hal 1.0 inputs (requires `embedded-hal` feature)
//! - `esp32`: ESP-IDF clock, encoder GPIO, RMT WS2812 strip and NVS storage
//!   (requires `esp32` feature)
//! - [`SystemClock`]: `std::time::Instant` clock (requires `std` feature)

pub mod mock;

#[cfg(feature = "embedded-hal")]
pub mod gpio;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "embedded-hal")]
pub use gpio::HalEncoderPins;

#[cfg(feature = "esp32")]
pub use esp32::*;

#[cfg(feature = "std")]
pub use system::SystemClock;

#[cfg(feature = "std")]
mod system {
    use std::time::Instant;

    use crate::traits::Clock;

    /// Monotonic clock counting from its creation.
    #[derive(Debug, Clone, Copy)]
    pub struct SystemClock {
        start: Instant,
    }

    impl SystemClock {
        /// Start a clock at 0 ms.
        pub fn new() -> Self {
            Self {
                start: Instant::now(),
            }
        }
    }

    impl Default for SystemClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for SystemClock {
        fn now_ms(&self) -> u64 {
            self.start.elapsed().as_millis() as u64
        }
    }
}
