//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without the dial attached.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockPins`] | [`EncoderPins`] | Settable A/B/key levels |
//! | [`MockStrip`] | [`StripDriver`] | Records every pushed frame |
//! | [`MockEndpoint`] | [`HidEndpoint`] | Captures transmitted reports |
//! | [`MockEeprom`] | [`ConfigStorage`] | 256-byte EEPROM with fault injection |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//!
//! # Example
//!
//! ```rust
//! use radial_dial::encoder::{Direction, EncoderDecoder};
//! use radial_dial::hal::MockPins;
//!
//! let mut decoder = EncoderDecoder::new(MockPins::new());
//!
//! // One clockwise detent: (1,1) -> (0,1) -> (0,0) -> (1,0) -> (1,1)
//! let mut events = 0;
//! for (a, b) in [(false, true), (false, false), (true, false), (true, true)] {
//!     decoder.pins_mut().set_levels(a, b);
//!     decoder.update();
//!     if decoder.direction() == Direction::Cw {
//!         events += 1;
//!     }
//! }
//! assert_eq!(events, 2);
//! ```

use alloc::vec::Vec;

use core::cell::Cell;

use crate::traits::{Clock, ConfigStorage, EncoderPins, HidEndpoint, StripDriver};

// ============================================================================
// Encoder Mocks
// ============================================================================

/// Mock encoder pins.
///
/// All pins idle high (pulled up), so the key starts released.
///
/// # Example
///
/// ```rust
/// use radial_dial::hal::MockPins;
/// use radial_dial::traits::EncoderPins;
///
/// let mut pins = MockPins::new();
/// assert!(pins.read_a() && pins.read_b() && pins.read_key());
///
/// pins.press();
/// assert!(!pins.read_key());
/// pins.release();
/// assert!(pins.read_key());
/// ```
#[derive(Debug, Clone)]
pub struct MockPins {
    /// Level of the A phase.
    pub a: bool,
    /// Level of the B phase.
    pub b: bool,
    /// Level of the key pin (low = pressed).
    pub key: bool,
}

impl MockPins {
    /// Creates pins at rest: everything high.
    pub fn new() -> Self {
        Self {
            a: true,
            b: true,
            key: true,
        }
    }

    /// Set both phase levels.
    pub fn set_levels(&mut self, a: bool, b: bool) {
        self.a = a;
        self.b = b;
    }

    /// Set the raw key level.
    pub fn set_key(&mut self, level: bool) {
        self.key = level;
    }

    /// Pull the key low.
    pub fn press(&mut self) {
        self.key = false;
    }

    /// Let the key float high.
    pub fn release(&mut self) {
        self.key = true;
    }
}

impl Default for MockPins {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderPins for MockPins {
    fn read_a(&mut self) -> bool {
        self.a
    }

    fn read_b(&mut self) -> bool {
        self.b
    }

    fn read_key(&mut self) -> bool {
        self.key
    }
}

// ============================================================================
// LED Mocks
// ============================================================================

/// Mock LED strip.
///
/// Records each frame pushed by the effect engine.
///
/// # Example
///
/// ```rust
/// use radial_dial::hal::MockStrip;
/// use radial_dial::traits::StripDriver;
///
/// let mut strip = MockStrip::new();
/// strip.write(&[1, 2, 3]).unwrap();
/// strip.write(&[4, 5, 6]).unwrap();
///
/// assert_eq!(strip.write_count(), 2);
/// assert_eq!(strip.last_frame(), &[4, 5, 6]);
/// ```
#[derive(Debug, Default)]
pub struct MockStrip {
    /// Every frame written, oldest first.
    pub frames: Vec<Vec<u8>>,
    /// Fail every write when set.
    pub fail_writes: bool,
}

impl MockStrip {
    /// Creates an empty strip.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of the most recent frame, empty if nothing was written.
    pub fn last_frame(&self) -> &[u8] {
        self.frames.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of frames written.
    pub fn write_count(&self) -> usize {
        self.frames.len()
    }
}

impl StripDriver for MockStrip {
    type Error = ();

    fn write(&mut self, data: &[u8]) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.frames.push(data.to_vec());
        Ok(())
    }
}

// ============================================================================
// USB Mocks
// ============================================================================

/// Mock HID endpoint.
///
/// Starts unconfigured; use [`configured()`](Self::configured) for an
/// enumerated device.
///
/// # Example
///
/// ```rust
/// use radial_dial::hal::MockEndpoint;
/// use radial_dial::traits::HidEndpoint;
///
/// let mut ep = MockEndpoint::configured();
/// ep.begin_transmit(&[0x01, 0x00, 0x00]);
/// assert_eq!(ep.last_packet(), Some(&[0x01, 0x00, 0x00][..]));
/// ```
#[derive(Debug)]
pub struct MockEndpoint {
    /// Whether the host has configured the device.
    pub configured: bool,
    /// Reported endpoint buffer size.
    pub max_packet: usize,
    /// Packets handed to `begin_transmit`, oldest first.
    pub sent: Vec<Vec<u8>>,
    /// Number of OUT buffer releases.
    pub out_releases: usize,
}

impl MockEndpoint {
    /// Creates an unconfigured 64-byte endpoint.
    pub fn new() -> Self {
        Self {
            configured: false,
            max_packet: 64,
            sent: Vec::new(),
            out_releases: 0,
        }
    }

    /// Creates an endpoint the host has already configured.
    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Self::new()
        }
    }

    /// The most recently transmitted packet.
    pub fn last_packet(&self) -> Option<&[u8]> {
        self.sent.last().map(Vec::as_slice)
    }
}

impl Default for MockEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl HidEndpoint for MockEndpoint {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn max_packet_size(&self) -> usize {
        self.max_packet
    }

    fn begin_transmit(&mut self, data: &[u8]) {
        self.sent.push(data.to_vec());
    }

    fn release_out(&mut self) {
        self.out_releases += 1;
    }
}

// ============================================================================
// Storage Mocks
// ============================================================================

/// Size of the mock EEPROM.
pub const MOCK_EEPROM_SIZE: usize = 256;

/// Mock EEPROM.
///
/// Out-of-range addresses fail, as do all reads or writes once the matching
/// fault flag is set.
///
/// # Example
///
/// ```rust
/// use radial_dial::hal::MockEeprom;
/// use radial_dial::traits::ConfigStorage;
///
/// let mut eeprom = MockEeprom::erased();
/// assert_eq!(eeprom.read_byte(0).unwrap(), 0xFF);
///
/// eeprom.write_byte(0, 0x42).unwrap();
/// assert_eq!(eeprom.byte(0), 0x42);
/// assert_eq!(eeprom.write_count, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockEeprom {
    cells: [u8; MOCK_EEPROM_SIZE],
    /// Number of successful byte writes.
    pub write_count: usize,
    /// Number of flushes.
    pub flush_count: usize,
    /// Fail every write when set.
    pub fail_writes: bool,
    /// Fail every read when set.
    pub fail_reads: bool,
}

impl MockEeprom {
    /// Creates a zero-filled EEPROM.
    pub fn new() -> Self {
        Self::filled(0x00)
    }

    /// Creates an EEPROM in the erased state (all `0xFF`).
    pub fn erased() -> Self {
        Self::filled(0xFF)
    }

    fn filled(value: u8) -> Self {
        Self {
            cells: [value; MOCK_EEPROM_SIZE],
            write_count: 0,
            flush_count: 0,
            fail_writes: false,
            fail_reads: false,
        }
    }

    /// Copy `data` into the cells starting at `addr`, bypassing counters.
    pub fn preload(&mut self, addr: u16, data: &[u8]) {
        let start = usize::from(addr);
        self.cells[start..start + data.len()].copy_from_slice(data);
    }

    /// Inspect a cell.
    pub fn byte(&self, addr: u16) -> u8 {
        self.cells[usize::from(addr)]
    }
}

impl Default for MockEeprom {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised by [`MockEeprom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEepromError {
    /// Address beyond the mock's size.
    OutOfRange,
    /// Injected fault.
    Injected,
}

impl ConfigStorage for MockEeprom {
    type Error = MockEepromError;

    fn read_byte(&mut self, addr: u16) -> Result<u8, MockEepromError> {
        if self.fail_reads {
            return Err(MockEepromError::Injected);
        }
        self.cells
            .get(usize::from(addr))
            .copied()
            .ok_or(MockEepromError::OutOfRange)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), MockEepromError> {
        if self.fail_writes {
            return Err(MockEepromError::Injected);
        }
        let cell = self
            .cells
            .get_mut(usize::from(addr))
            .ok_or(MockEepromError::OutOfRange)?;
        *cell = value;
        self.write_count += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), MockEepromError> {
        if self.fail_writes {
            return Err(MockEepromError::Injected);
        }
        self.flush_count += 1;
        Ok(())
    }
}

// ============================================================================
// Time Mocks
// ============================================================================

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
/// With [`with_auto_advance`](Self::with_auto_advance) every read moves the
/// clock forward, which lets busy-wait loops run to their deadline.
///
/// # Example
///
/// ```rust
/// use radial_dial::hal::MockClock;
/// use radial_dial::traits::Clock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
///
/// let ticking = MockClock::new().with_auto_advance(10);
/// assert_eq!(ticking.now_ms(), 0);
/// assert_eq!(ticking.now_ms(), 10);
/// ```
#[derive(Debug)]
pub struct MockClock {
    current_ms: Cell<u64>,
    step_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self {
            current_ms: Cell::new(0),
            step_ms: 0,
        }
    }

    /// Advance by `step_ms` after every read.
    pub fn with_auto_advance(mut self, step_ms: u64) -> Self {
        self.step_ms = step_ms;
        self
    }

    /// Sets the current time in milliseconds.
    pub fn set(&self, ms: u64) {
        self.current_ms.set(ms);
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, ms: u64) {
        self.current_ms.set(self.current_ms.get() + ms);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        let now = self.current_ms.get();
        self.current_ms.set(now + self.step_ms);
        now
    }
}

// ============================================================================
// Tests
// ============================================================================
