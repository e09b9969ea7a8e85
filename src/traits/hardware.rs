//! Hardware abstraction traits for encoder pins, the LED strip, the USB
//! endpoint and persistent storage.
//!
//! These traits are the seams between the firmware core and the platform.
//! Everything behind them (GPIO setup, USB enumeration, endpoint registers,
//! EEPROM cells) is supplied by the board support code.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`EncoderPins`] | Raw levels of the A, B and key pins |
//! | [`StripDriver`] | Push raw GRB/RGB bytes to the physical LEDs |
//! | [`HidEndpoint`] | The HID interrupt endpoint (IN transmit, OUT release) |
//! | [`ConfigStorage`] | Byte-addressed non-volatile memory |
//! | [`Clock`] | Monotonic millisecond time source |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For ESP32 hardware, use the
//! implementations from `hal::esp32` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use radial_dial::traits::{EncoderPins, StripDriver};
//! use radial_dial::hal::{MockPins, MockStrip};
//!
//! let mut pins = MockPins::new();
//! pins.set_levels(false, true);
//! assert!(!pins.read_a());
//! assert!(pins.read_b());
//!
//! let mut strip = MockStrip::new();
//! strip.write(&[0x10, 0x20, 0x30]).unwrap();
//! assert_eq!(strip.last_frame(), &[0x10, 0x20, 0x30]);
//! ```

/// Raw pin levels of a quadrature encoder with push button.
///
/// `true` means the pin reads high. Encoder pins are normally pulled up,
/// so the key is active low.
pub trait EncoderPins {
    /// Level of the A phase.
    fn read_a(&mut self) -> bool;

    /// Level of the B phase.
    fn read_b(&mut self) -> bool;

    /// Level of the push button.
    fn read_key(&mut self) -> bool;
}

/// Driver that pushes a raw frame to an addressable LED strip.
///
/// The frame is already in wire order (GRB or RGB, three bytes per LED).
/// Resolved once at startup, so the LED engine never dispatches on the
/// physical data pin.
pub trait StripDriver {
    /// Error type for strip writes.
    type Error;

    /// Transmit `data` to the strip.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// HID interrupt endpoint used to carry radial reports.
///
/// The busy state of the IN direction is not part of this trait: it is a
/// [`BusyFlag`](crate::report::BusyFlag) shared with the transmit-complete
/// notification.
///
/// # Implementation Notes
///
/// - `begin_transmit()` copies the bytes into the endpoint's transmit
///   buffer, sets the transmit length and arms the endpoint (ACK)
/// - `release_out()` is called after an OUT packet has been consumed and
///   should put the OUT direction back to NAK
pub trait HidEndpoint {
    /// Returns true once the host has selected a configuration.
    fn is_configured(&self) -> bool;

    /// Largest packet the endpoint buffer accepts.
    fn max_packet_size(&self) -> usize {
        64
    }

    /// Load `data` into the IN buffer and start the transmission.
    fn begin_transmit(&mut self, data: &[u8]);

    /// Hand the OUT buffer back after a received packet was processed.
    fn release_out(&mut self) {}
}

/// Byte-addressed non-volatile storage (EEPROM or an emulation of it).
///
/// # Implementation Notes
///
/// - Reads and writes are single bytes at an absolute address
/// - Page-based backends may buffer writes and commit them in `flush()`
pub trait ConfigStorage {
    /// Error type for storage access.
    type Error;

    /// Read one byte.
    fn read_byte(&mut self, addr: u16) -> Result<u8, Self::Error>;

    /// Write one byte.
    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Self::Error>;

    /// Commit buffered writes. Called once after a complete record is written.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for effect timing and the
/// transmit timeout. On desktop, this can wrap `std::time::Instant`. On
/// embedded, use a hardware timer.
///
/// # Example
///
/// ```rust
/// use radial_dial::traits::Clock;
/// use radial_dial::hal::MockClock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullEndpoint;

    impl HidEndpoint for NullEndpoint {
        fn is_configured(&self) -> bool {
            true
        }

        fn begin_transmit(&mut self, _data: &[u8]) {}
    }

    struct CellStorage([u8; 4]);

    impl ConfigStorage for CellStorage {
        type Error = ();

        fn read_byte(&mut self, addr: u16) -> Result<u8, ()> {
            self.0.get(addr as usize).copied().ok_or(())
        }

        fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), ()> {
            let cell = self.0.get_mut(addr as usize).ok_or(())?;
            *cell = value;
            Ok(())
        }
    }

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn endpoint_default_packet_size() {
        assert_eq!(NullEndpoint.max_packet_size(), 64);
    }

    #[test]
    fn storage_default_flush_is_ok() {
        let mut storage = CellStorage([0; 4]);
        storage.write_byte(2, 0xAB).unwrap();
        assert_eq!(storage.read_byte(2), Ok(0xAB));
        assert_eq!(storage.flush(), Ok(()));
        assert_eq!(storage.read_byte(9), Err(()));
    }

    #[test]
    fn clock_by_reference() {
        let clock = FixedClock(42);
        let borrowed = &clock;
        assert_eq!(borrowed.now_ms(), 42);
    }
}
