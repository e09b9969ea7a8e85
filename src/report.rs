//! Radial controller HID report and its single-buffered transmitter.
//!
//! The report is three bytes on the wire:
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | Report ID (`0x01`) |
//! | 1-2 | `button_dial`, little-endian |
//!
//! Bit 0 of `button_dial` is the button; bits 1-15 hold the relative dial
//! value in tenths of a degree as a 15-bit two's-complement field
//! (±3600).
//!
//! [`RadialTransmitter`] pushes reports over a [`HidEndpoint`]. Only one
//! report is ever in flight: the [`BusyFlag`] is raised when a transmission
//! starts and cleared by the endpoint's transmit-complete notification,
//! which may run outside the tick loop.
//!
//! # Example
//!
//! ```rust
//! use radial_dial::report::{BusyFlag, RadialTransmitter};
//! use radial_dial::hal::{MockClock, MockEndpoint};
//!
//! let busy = BusyFlag::new();
//! let mut tx = RadialTransmitter::new(MockEndpoint::configured(), MockClock::new(), &busy);
//!
//! tx.send_delta(true, 400).unwrap(); // clamped to 360 degrees
//! assert_eq!(tx.report().button_dial, 0x1C21);
//! assert_eq!(tx.endpoint().last_packet(), Some(&[0x01, 0x21, 0x1C][..]));
//!
//! // The host has not acknowledged yet
//! assert!(busy.is_set());
//! busy.clear(); // transmit-complete notification
//! ```

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::traits::{Clock, HidEndpoint};

/// Report ID of the radial controller collection.
pub const REPORT_ID: u8 = 0x01;
/// Size of a radial report on the wire.
pub const REPORT_SIZE: usize = 3;
/// Largest dial magnitude in degrees.
pub const DIAL_LIMIT_DEGREES: i16 = 360;
/// Bit mask of the button flag.
pub const BUTTON_MASK: u16 = 0x0001;
/// Bit mask of the dial field.
pub const DIAL_MASK: u16 = 0xFFFE;
/// How long `send_report` waits for the previous report to complete.
pub const SEND_TIMEOUT_MS: u32 = 250;

/// HID report descriptor for the radial controller (System Multi-Axis
/// Controller / Digitizer Puck with one button and a relative dial).
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // USAGE_PAGE (Generic Desktop)
    0x09, 0x0e, // USAGE (System Multi-Axis Controller)
    0xa1, 0x01, // COLLECTION (Application)
    0x85, REPORT_ID, //   REPORT_ID
    0x05, 0x0d, //   USAGE_PAGE (Digitizers)
    0x09, 0x21, //   USAGE (Puck)
    0xa1, 0x00, //   COLLECTION (Physical)
    0x05, 0x09, //     USAGE_PAGE (Buttons)
    0x09, 0x01, //     USAGE (Button 1)
    0x95, 0x01, //     REPORT_COUNT (1)
    0x75, 0x01, //     REPORT_SIZE (1)
    0x15, 0x00, //     LOGICAL_MINIMUM (0)
    0x25, 0x01, //     LOGICAL_MAXIMUM (1)
    0x81, 0x02, //     INPUT (Data,Var,Abs)
    0x05, 0x01, //     USAGE_PAGE (Generic Desktop)
    0x09, 0x37, //     USAGE (Dial)
    0x95, 0x01, //     REPORT_COUNT (1)
    0x75, 0x0f, //     REPORT_SIZE (15)
    0x55, 0x0f, //     UNIT_EXPONENT (-1)
    0x65, 0x14, //     UNIT (Degrees, English Rotation)
    0x36, 0xf0, 0xf1, //     PHYSICAL_MINIMUM (-3600)
    0x46, 0x10, 0x0e, //     PHYSICAL_MAXIMUM (3600)
    0x16, 0xf0, 0xf1, //     LOGICAL_MINIMUM (-3600)
    0x26, 0x10, 0x0e, //     LOGICAL_MAXIMUM (3600)
    0x81, 0x06, //     INPUT (Data,Var,Rel)
    0xc0, //   END_COLLECTION
    0xc0, // END_COLLECTION
];

// ============================================================================
// Report
// ============================================================================

/// The radial controller input report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadialReport {
    /// Always [`REPORT_ID`] once sent.
    pub report_id: u8,
    /// Button flag (bit 0) and dial tenths (bits 1-15).
    pub button_dial: u16,
}

impl Default for RadialReport {
    fn default() -> Self {
        Self {
            report_id: REPORT_ID,
            button_dial: 0,
        }
    }
}

impl RadialReport {
    /// Build a report from a button state and a dial delta in degrees.
    ///
    /// The delta is clamped to ±360 degrees.
    ///
    /// ```
    /// use radial_dial::report::RadialReport;
    ///
    /// let report = RadialReport::new(false, -45);
    /// assert!(!report.button());
    /// assert_eq!(report.dial_tenths(), -450);
    /// ```
    pub fn new(button: bool, degrees: i16) -> Self {
        let mut report = Self::default();
        report.set_button(button);
        report.set_dial_degrees(degrees);
        report
    }

    /// Set or clear the button flag.
    pub fn set_button(&mut self, pressed: bool) {
        if pressed {
            self.button_dial |= BUTTON_MASK;
        } else {
            self.button_dial &= !BUTTON_MASK;
        }
    }

    /// Replace the dial field with `degrees` (clamped) in tenths.
    pub fn set_dial_degrees(&mut self, degrees: i16) {
        let clamped = degrees.clamp(-DIAL_LIMIT_DEGREES, DIAL_LIMIT_DEGREES);
        let tenths = clamped * 10;
        self.button_dial &= BUTTON_MASK;
        self.button_dial |= ((tenths as u16) << 1) & DIAL_MASK;
    }

    /// Button flag.
    #[inline]
    pub fn button(&self) -> bool {
        self.button_dial & BUTTON_MASK != 0
    }

    /// Dial value in tenths of a degree, sign-extended from 15 bits.
    #[inline]
    pub fn dial_tenths(&self) -> i16 {
        (self.button_dial as i16) >> 1
    }

    /// Wire representation.
    pub fn to_bytes(&self) -> [u8; REPORT_SIZE] {
        let [lo, hi] = self.button_dial.to_le_bytes();
        [self.report_id, lo, hi]
    }

    /// Parse a report from wire bytes. Returns `None` if the report ID does
    /// not match or fewer than [`REPORT_SIZE`] bytes are present.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        match data {
            [REPORT_ID, lo, hi, ..] => Some(Self {
                report_id: REPORT_ID,
                button_dial: u16::from_le_bytes([*lo, *hi]),
            }),
            _ => None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure of a report transmission.
///
/// The numeric codes are stable and reported over the diagnostics console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum HidError {
    /// The host has not configured the device yet.
    UsbNotConfigured = 1,
    /// The previous report did not complete within the timeout.
    BufferBusy = 2,
    /// No report was supplied.
    InvalidParam = 3,
    /// The report does not fit the endpoint buffer.
    DataTooLong = 4,
}

impl HidError {
    /// Numeric error code (0 is reserved for "no error").
    #[inline]
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    /// Short machine-readable name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            HidError::UsbNotConfigured => "usb_not_configured",
            HidError::BufferBusy => "buffer_busy",
            HidError::InvalidParam => "invalid_param",
            HidError::DataTooLong => "data_too_long",
        }
    }
}

impl fmt::Display for HidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Busy flag
// ============================================================================

/// "Transmit in progress" flag shared with the transmit-complete handler.
///
/// Raised by the tick loop when a report is armed, cleared from the
/// endpoint's completion notification (typically an interrupt). Usually
/// placed in a `static`:
///
/// ```
/// use radial_dial::report::BusyFlag;
///
/// static EP_IN_BUSY: BusyFlag = BusyFlag::new();
///
/// // USB interrupt, IN transfer complete
/// fn on_in_complete() {
///     EP_IN_BUSY.clear();
/// }
/// # on_in_complete();
/// # assert!(!EP_IN_BUSY.is_set());
/// ```
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicBool);

impl BusyFlag {
    /// A cleared flag.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// True while a transmission is in flight.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark a transmission as started.
    #[inline]
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Mark the transmission as complete.
    #[inline]
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

// ============================================================================
// Transmitter
// ============================================================================

/// Encodes dial events into the process-wide report and sends it.
///
/// # Type Parameters
///
/// - `E`: the HID endpoint ([`HidEndpoint`])
/// - `C`: the clock used for the bounded busy-wait ([`Clock`])
pub struct RadialTransmitter<'a, E: HidEndpoint, C: Clock> {
    endpoint: E,
    clock: C,
    busy: &'a BusyFlag,
    report: RadialReport,
    last_error: Option<HidError>,
    timeout_ms: u32,
}

impl<'a, E: HidEndpoint, C: Clock> RadialTransmitter<'a, E, C> {
    /// Create a transmitter with the default 250 ms send timeout.
    pub fn new(endpoint: E, clock: C, busy: &'a BusyFlag) -> Self {
        Self {
            endpoint,
            clock,
            busy,
            report: RadialReport::default(),
            last_error: None,
            timeout_ms: SEND_TIMEOUT_MS,
        }
    }

    /// Override the send timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Encode a button state and dial delta into the report and send it.
    ///
    /// `degrees` is clamped to ±360 before scaling to tenths.
    pub fn send_delta(&mut self, button: bool, degrees: i16) -> Result<(), HidError> {
        self.report.set_button(button);
        self.report.set_dial_degrees(degrees);
        self.report.report_id = REPORT_ID;
        let report = self.report;
        self.transmit(report)
    }

    /// Send a caller-owned report. Its report ID is forced to [`REPORT_ID`].
    ///
    /// `None` fails with [`HidError::InvalidParam`].
    pub fn send_report(&mut self, report: Option<&mut RadialReport>) -> Result<(), HidError> {
        let Some(report) = report else {
            return self.fail(HidError::InvalidParam);
        };
        report.report_id = REPORT_ID;
        let report = *report;
        self.transmit(report)
    }

    fn transmit(&mut self, report: RadialReport) -> Result<(), HidError> {
        if !self.endpoint.is_configured() {
            return self.fail(HidError::UsbNotConfigured);
        }

        if self.endpoint.max_packet_size() < REPORT_SIZE {
            return self.fail(HidError::DataTooLong);
        }

        if self.busy.is_set() {
            let deadline = self.clock.now_ms() + u64::from(self.timeout_ms);
            while self.busy.is_set() {
                if self.clock.now_ms() >= deadline {
                    return self.fail(HidError::BufferBusy);
                }
                core::hint::spin_loop();
            }
        }

        let bytes = report.to_bytes();
        self.busy.raise();
        self.endpoint.begin_transmit(&bytes);
        self.last_error = None;
        Ok(())
    }

    fn fail(&mut self, error: HidError) -> Result<(), HidError> {
        log::warn!("radial report not sent: {}", error);
        self.last_error = Some(error);
        Err(error)
    }

    /// Apply a host-originated OUT report to the in-memory report.
    ///
    /// Packets with a foreign report ID or fewer than three bytes are
    /// ignored. The OUT buffer is released either way. Returns true if the
    /// report was overwritten.
    pub fn receive_out(&mut self, data: &[u8]) -> bool {
        let applied = match RadialReport::from_bytes(data) {
            Some(report) => {
                self.report = report;
                true
            }
            None => false,
        };
        self.endpoint.release_out();
        applied
    }

    /// Reinitialize the report to its ID with no button or dial value.
    pub fn reset_report(&mut self) {
        self.report = RadialReport::default();
    }

    /// The current in-memory report.
    pub fn report(&self) -> &RadialReport {
        &self.report
    }

    /// Error of the last failed send, `None` after a success.
    pub fn last_error(&self) -> Option<HidError> {
        self.last_error
    }

    /// Numeric form of [`last_error`](Self::last_error) (0 = none).
    pub fn last_error_code(&self) -> u8 {
        self.last_error.map_or(0, |e| e.code())
    }

    /// True while the previous report is still in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    /// Access the endpoint.
    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Mutable access to the endpoint.
    pub fn endpoint_mut(&mut self) -> &mut E {
        &mut self.endpoint
    }
}
