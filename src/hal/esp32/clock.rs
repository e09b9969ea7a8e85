//! ESP32 clock implementation using the ESP-IDF high resolution timer.

use crate::traits::Clock;

/// Milliseconds since boot from `esp_timer_get_time()`.
///
/// Drives the LED timings and the report transmit timeout.
///
/// # Example
///
/// ```ignore
/// use radial_dial::hal::esp32::Esp32Clock;
/// use radial_dial::report::{BusyFlag, RadialTransmitter};
///
/// static BUSY: BusyFlag = BusyFlag::new();
/// let tx = RadialTransmitter::new(usb_endpoint, Esp32Clock::new(), &BUSY);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        // Safe: reads a free-running hardware counter
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        (micros / 1000) as u64
    }
}
