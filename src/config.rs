//! Persistent, validated device configuration.
//!
//! [`DeviceConfig`] is the in-memory image of a fixed 32-byte record kept
//! in EEPROM. [`ConfigStore`] owns one instance and is the only place that
//! reads or writes the record. A config is either fully valid or has just
//! been forced back to [`DeviceConfig::default`]; nothing outside the
//! documented ranges is ever persisted.
//!
//! # Record layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | `version` |
//! | 1 | 1 | `revision` |
//! | 2 | 1 | `led_count` |
//! | 3 | 1 | `color_order` |
//! | 4 | 1 | `brightness` |
//! | 5 | 1 | `effect_mode` |
//! | 6 | 2 | `rotate_interval_ms` (LE) |
//! | 8 | 2 | `fade_duration_ms` (LE) |
//! | 10 | 2 | `rotate_cw` (LE, signed) |
//! | 12 | 2 | `rotate_ccw` (LE, signed) |
//! | 14 | 1 | `step_per_teeth` |
//! | 15 | 1 | `phase` |
//! | 16 | 16 | reserved |
//!
//! # Example
//!
//! ```rust
//! use radial_dial::config::{ConfigError, ConfigStore, LoadOutcome};
//! use radial_dial::hal::MockEeprom;
//!
//! // A blank (all 0xFF) EEPROM fails validation and is healed on load
//! let mut store = ConfigStore::new(MockEeprom::erased());
//! assert_eq!(store.load(), Ok(LoadOutcome::Restored));
//! assert_eq!(store.led_count(), 4);
//!
//! // Setters validate their own field and never auto-persist
//! assert_eq!(store.set_led_count(12), Err(ConfigError::InvalidParam));
//! store.set_led_count(8).unwrap();
//! store.save().unwrap();
//! ```

use core::fmt;

use crate::traits::ConfigStorage;

/// Firmware version written into every saved record.
pub const FIRMWARE_VERSION: u8 = 1;
/// Firmware revision written into every saved record.
pub const FIRMWARE_REVISION: u8 = 0;

/// EEPROM address of the first record byte.
pub const CONFIG_BASE_ADDRESS: u16 = 0;
/// Size of the persisted record in bytes.
pub const CONFIG_RECORD_SIZE: usize = 32;
/// Number of reserved trailing bytes in the record.
pub const RESERVED_SIZE: usize = 16;

/// Smallest supported LED ring.
pub const LED_COUNT_MIN: u8 = 1;
/// Largest supported LED ring.
pub const LED_COUNT_MAX: u8 = 10;
/// Highest brightness level (index into the intensity table).
pub const BRIGHTNESS_MAX: u8 = 4;
/// The only effect mode currently defined.
pub const EFFECT_MODE_DEFAULT: u8 = 0;
/// Default number of LEDs.
pub const LED_COUNT_DEFAULT: u8 = 4;
/// Default brightness level.
pub const BRIGHTNESS_DEFAULT: u8 = 2;
/// Default rotation animation interval.
pub const ROTATE_INTERVAL_DEFAULT: u16 = 50;
/// Default fade duration.
pub const FADE_DURATION_DEFAULT: u16 = 200;
/// Shortest rotation animation interval.
pub const ROTATE_INTERVAL_MIN: u16 = 20;
/// Longest rotation animation interval.
pub const ROTATE_INTERVAL_MAX: u16 = 500;
/// Shortest fade.
pub const FADE_DURATION_MIN: u16 = 100;
/// Longest fade.
pub const FADE_DURATION_MAX: u16 = 300;
/// Smallest magnitude of a per-event rotation angle, in degrees.
pub const ROTATE_ANGLE_MIN: i16 = 1;
/// Largest magnitude of a per-event rotation angle, in degrees.
pub const ROTATE_ANGLE_MAX: i16 = 360;

// ============================================================================
// Enumerated parameters
// ============================================================================

/// Byte order the LED strip expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum ColorOrder {
    /// Green, red, blue (WS2812 default).
    #[default]
    Grb = 0,
    /// Red, green, blue.
    Rgb = 1,
}

impl TryFrom<u8> for ColorOrder {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, ConfigError> {
        match raw {
            0 => Ok(ColorOrder::Grb),
            1 => Ok(ColorOrder::Rgb),
            _ => Err(ConfigError::InvalidParam),
        }
    }
}

/// Which encoder phase leads for clockwise rotation on this board.
///
/// Both wirings are decoded onto the A-leads convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Phase {
    /// A leads B.
    #[default]
    ALeads = 0,
    /// B leads A.
    BLeads = 1,
}

impl TryFrom<u8> for Phase {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, ConfigError> {
        match raw {
            0 => Ok(Phase::ALeads),
            1 => Ok(Phase::BLeads),
            _ => Err(ConfigError::InvalidParam),
        }
    }
}

/// Direction events emitted per detent ("step per teeth").
///
/// `Double` needs a single accumulator count to fire, `Single` needs two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Sensitivity {
    /// One event per detent.
    Single = 1,
    /// Two events per detent.
    #[default]
    Double = 2,
}

impl Sensitivity {
    /// Accumulator magnitude that fires a direction event.
    #[inline]
    pub const fn threshold(self) -> i8 {
        match self {
            Sensitivity::Single => 2,
            Sensitivity::Double => 1,
        }
    }
}

impl TryFrom<u8> for Sensitivity {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, ConfigError> {
        match raw {
            1 => Ok(Sensitivity::Single),
            2 => Ok(Sensitivity::Double),
            _ => Err(ConfigError::InvalidParam),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure of a config operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A field is outside its documented range.
    InvalidParam,
    /// The storage backend failed (the terminal `ERROR` status).
    Storage,
}

impl ConfigError {
    /// Short machine-readable name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidParam => "invalid_param",
            ConfigError::Storage => "storage_error",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a successful [`ConfigStore::load`] went.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The stored record was valid and is now in memory.
    Loaded,
    /// The stored record was invalid; defaults were restored and re-persisted.
    Restored,
}

// ============================================================================
// Field checks
// ============================================================================

fn check_led_count(count: u8) -> Result<(), ConfigError> {
    if (LED_COUNT_MIN..=LED_COUNT_MAX).contains(&count) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam)
    }
}

fn check_brightness(level: u8) -> Result<(), ConfigError> {
    if level <= BRIGHTNESS_MAX {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam)
    }
}

fn check_effect_mode(mode: u8) -> Result<(), ConfigError> {
    if mode == EFFECT_MODE_DEFAULT {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam)
    }
}

pub(crate) fn check_rotate_interval(ms: u16) -> Result<(), ConfigError> {
    if (ROTATE_INTERVAL_MIN..=ROTATE_INTERVAL_MAX).contains(&ms) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam)
    }
}

pub(crate) fn check_fade_duration(ms: u16) -> Result<(), ConfigError> {
    if (FADE_DURATION_MIN..=FADE_DURATION_MAX).contains(&ms) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam)
    }
}

fn check_rotate_cw(degrees: i16) -> Result<(), ConfigError> {
    if (ROTATE_ANGLE_MIN..=ROTATE_ANGLE_MAX).contains(&degrees) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam)
    }
}

fn check_rotate_ccw(degrees: i16) -> Result<(), ConfigError> {
    if (-ROTATE_ANGLE_MAX..=-ROTATE_ANGLE_MIN).contains(&degrees) {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam)
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// In-memory image of the persisted record.
///
/// Fields hold raw values so that a corrupted record can be represented
/// and rejected by [`validate`](Self::validate). Use [`ConfigStore`] for
/// validated access.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Firmware version that wrote the record.
    pub version: u8,
    /// Firmware revision that wrote the record.
    pub revision: u8,
    /// Number of LEDs on the ring (1-10).
    pub led_count: u8,
    /// Raw [`ColorOrder`].
    pub color_order: u8,
    /// Brightness level (0-4).
    pub brightness: u8,
    /// LED effect mode (only 0 is defined).
    pub effect_mode: u8,
    /// Rotation animation interval in milliseconds (20-500).
    pub rotate_interval_ms: u16,
    /// Fade duration in milliseconds (100-300).
    pub fade_duration_ms: u16,
    /// Degrees reported per clockwise event (1 to 360).
    pub rotate_cw: i16,
    /// Degrees reported per counter-clockwise event (-360 to -1).
    pub rotate_ccw: i16,
    /// Raw [`Sensitivity`] (1 or 2).
    pub step_per_teeth: u8,
    /// Raw [`Phase`].
    pub phase: u8,
    /// Reserved tail of the record, zeroed by [`Default`].
    #[cfg_attr(feature = "serde", serde(skip))]
    pub reserved: [u8; RESERVED_SIZE],
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            version: FIRMWARE_VERSION,
            revision: FIRMWARE_REVISION,
            led_count: LED_COUNT_DEFAULT,
            color_order: ColorOrder::Grb as u8,
            brightness: BRIGHTNESS_DEFAULT,
            effect_mode: EFFECT_MODE_DEFAULT,
            rotate_interval_ms: ROTATE_INTERVAL_DEFAULT,
            fade_duration_ms: FADE_DURATION_DEFAULT,
            rotate_cw: 10,
            rotate_ccw: -10,
            step_per_teeth: Sensitivity::Double as u8,
            phase: Phase::ALeads as u8,
            reserved: [0; RESERVED_SIZE],
        }
    }
}

impl DeviceConfig {
    /// Check every field; the first one out of range fails the whole config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_led_count(self.led_count)?;
        ColorOrder::try_from(self.color_order)?;
        check_brightness(self.brightness)?;
        check_effect_mode(self.effect_mode)?;
        check_rotate_interval(self.rotate_interval_ms)?;
        check_fade_duration(self.fade_duration_ms)?;
        check_rotate_cw(self.rotate_cw)?;
        check_rotate_ccw(self.rotate_ccw)?;
        Sensitivity::try_from(self.step_per_teeth)?;
        Phase::try_from(self.phase)?;
        Ok(())
    }

    /// Returns true if [`validate`](Self::validate) passes.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Serialize into the persisted record layout.
    pub fn encode(&self) -> [u8; CONFIG_RECORD_SIZE] {
        let mut out = [0u8; CONFIG_RECORD_SIZE];
        out[0] = self.version;
        out[1] = self.revision;
        out[2] = self.led_count;
        out[3] = self.color_order;
        out[4] = self.brightness;
        out[5] = self.effect_mode;
        out[6..8].copy_from_slice(&self.rotate_interval_ms.to_le_bytes());
        out[8..10].copy_from_slice(&self.fade_duration_ms.to_le_bytes());
        out[10..12].copy_from_slice(&self.rotate_cw.to_le_bytes());
        out[12..14].copy_from_slice(&self.rotate_ccw.to_le_bytes());
        out[14] = self.step_per_teeth;
        out[15] = self.phase;
        out[16..].copy_from_slice(&self.reserved);
        out
    }

    /// Rebuild a config from record bytes without validating it.
    pub fn decode(record: &[u8; CONFIG_RECORD_SIZE]) -> Self {
        let mut reserved = [0u8; RESERVED_SIZE];
        reserved.copy_from_slice(&record[16..]);
        Self {
            version: record[0],
            revision: record[1],
            led_count: record[2],
            color_order: record[3],
            brightness: record[4],
            effect_mode: record[5],
            rotate_interval_ms: u16::from_le_bytes([record[6], record[7]]),
            fade_duration_ms: u16::from_le_bytes([record[8], record[9]]),
            rotate_cw: i16::from_le_bytes([record[10], record[11]]),
            rotate_ccw: i16::from_le_bytes([record[12], record[13]]),
            step_per_teeth: record[14],
            phase: record[15],
            reserved,
        }
    }

    /// Render the config as a JSON object. The reserved bytes are omitted.
    #[cfg(feature = "serde-json-core")]
    pub fn to_json(&self) -> Option<heapless::String<384>> {
        serde_json_core::to_string(self).ok()
    }
}

// ============================================================================
// Config Store
// ============================================================================

/// Owner of the single in-memory config and its persisted record.
///
/// Loaded once at boot with [`load`](Self::load), mutated through the
/// validated setters and persisted only by an explicit [`save`](Self::save).
pub struct ConfigStore<S: ConfigStorage> {
    storage: S,
    config: DeviceConfig,
}

impl<S: ConfigStorage> ConfigStore<S> {
    /// Create a store holding the default config. Nothing is read yet.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: DeviceConfig::default(),
        }
    }

    /// Read the persisted record, healing it if it fails validation.
    ///
    /// An invalid record is replaced by the defaults, which are written
    /// back immediately. `Err(ConfigError::Storage)` means the storage
    /// could not be read or the recovery save failed.
    pub fn load(&mut self) -> Result<LoadOutcome, ConfigError> {
        let mut record = [0u8; CONFIG_RECORD_SIZE];
        for (offset, byte) in record.iter_mut().enumerate() {
            *byte = self
                .storage
                .read_byte(CONFIG_BASE_ADDRESS + offset as u16)
                .map_err(|_| ConfigError::Storage)?;
        }
        self.config = DeviceConfig::decode(&record);

        if let Err(e) = self.validate() {
            log::warn!("stored config rejected ({}), restoring defaults", e);
            self.reset();
            return match self.save() {
                Ok(()) => {
                    log::info!("default config restored");
                    Ok(LoadOutcome::Restored)
                }
                Err(_) => Err(ConfigError::Storage),
            };
        }

        log::debug!(
            "config v{}.{} loaded",
            self.config.version,
            self.config.revision
        );
        Ok(LoadOutcome::Loaded)
    }

    /// Persist the in-memory config.
    ///
    /// Refuses with `InvalidParam` if any field is out of range. The
    /// version and revision are stamped with the running firmware's, both
    /// in the written record and in memory, so `version()` reports what
    /// is stored after a successful save.
    pub fn save(&mut self) -> Result<(), ConfigError> {
        self.validate()?;

        self.config.version = FIRMWARE_VERSION;
        self.config.revision = FIRMWARE_REVISION;

        let record = self.config.encode();
        for (offset, byte) in record.iter().enumerate() {
            self.storage
                .write_byte(CONFIG_BASE_ADDRESS + offset as u16, *byte)
                .map_err(|_| ConfigError::Storage)?;
        }
        self.storage.flush().map_err(|_| ConfigError::Storage)?;
        log::info!("config saved");
        Ok(())
    }

    /// Replace the in-memory config with the fixed defaults.
    pub fn reset(&mut self) {
        self.config = DeviceConfig::default();
    }

    /// Validate the in-memory config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }

    /// The full in-memory config.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Access the storage backend (e.g. for inspection in tests).
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the storage backend.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    /// Version of the firmware that wrote the record.
    pub fn version(&self) -> u8 {
        self.config.version
    }

    /// Revision of the firmware that wrote the record.
    pub fn revision(&self) -> u8 {
        self.config.revision
    }

    /// Number of LEDs on the ring.
    pub fn led_count(&self) -> u8 {
        self.config.led_count
    }

    /// LED byte order.
    pub fn color_order(&self) -> ColorOrder {
        ColorOrder::try_from(self.config.color_order).unwrap_or_default()
    }

    /// Brightness level (0-4).
    pub fn brightness(&self) -> u8 {
        self.config.brightness
    }

    /// LED effect mode.
    pub fn effect_mode(&self) -> u8 {
        self.config.effect_mode
    }

    /// Rotation animation interval in milliseconds.
    pub fn rotate_interval_ms(&self) -> u16 {
        self.config.rotate_interval_ms
    }

    /// Fade duration in milliseconds.
    pub fn fade_duration_ms(&self) -> u16 {
        self.config.fade_duration_ms
    }

    /// Degrees reported per clockwise event.
    pub fn rotate_cw(&self) -> i16 {
        self.config.rotate_cw
    }

    /// Degrees reported per counter-clockwise event (negative).
    pub fn rotate_ccw(&self) -> i16 {
        self.config.rotate_ccw
    }

    /// Direction events per detent.
    pub fn step_per_teeth(&self) -> Sensitivity {
        Sensitivity::try_from(self.config.step_per_teeth).unwrap_or_default()
    }

    /// Encoder phase wiring.
    pub fn phase(&self) -> Phase {
        Phase::try_from(self.config.phase).unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Setters (validate, never persist)
    // ------------------------------------------------------------------

    /// Set the LED count (1-10).
    pub fn set_led_count(&mut self, count: u8) -> Result<(), ConfigError> {
        check_led_count(count)?;
        self.config.led_count = count;
        Ok(())
    }

    /// Set the LED byte order from its raw value (0 = GRB, 1 = RGB).
    pub fn set_color_order(&mut self, order: u8) -> Result<(), ConfigError> {
        let order = ColorOrder::try_from(order)?;
        self.config.color_order = order as u8;
        Ok(())
    }

    /// Set the brightness level (0-4).
    pub fn set_brightness(&mut self, level: u8) -> Result<(), ConfigError> {
        check_brightness(level)?;
        self.config.brightness = level;
        Ok(())
    }

    /// Set the effect mode (only 0 is accepted).
    pub fn set_effect_mode(&mut self, mode: u8) -> Result<(), ConfigError> {
        check_effect_mode(mode)?;
        self.config.effect_mode = mode;
        Ok(())
    }

    /// Set the rotation animation interval (20-500 ms).
    pub fn set_rotate_interval_ms(&mut self, ms: u16) -> Result<(), ConfigError> {
        check_rotate_interval(ms)?;
        self.config.rotate_interval_ms = ms;
        Ok(())
    }

    /// Set the fade duration (100-300 ms).
    pub fn set_fade_duration_ms(&mut self, ms: u16) -> Result<(), ConfigError> {
        check_fade_duration(ms)?;
        self.config.fade_duration_ms = ms;
        Ok(())
    }

    /// Set the clockwise angle (1 to 360 degrees).
    pub fn set_rotate_cw(&mut self, degrees: i16) -> Result<(), ConfigError> {
        check_rotate_cw(degrees)?;
        self.config.rotate_cw = degrees;
        Ok(())
    }

    /// Set the counter-clockwise angle (-360 to -1 degrees).
    pub fn set_rotate_ccw(&mut self, degrees: i16) -> Result<(), ConfigError> {
        check_rotate_ccw(degrees)?;
        self.config.rotate_ccw = degrees;
        Ok(())
    }

    /// Set events per detent from its raw value (1 or 2).
    pub fn set_step_per_teeth(&mut self, step: u8) -> Result<(), ConfigError> {
        let step = Sensitivity::try_from(step)?;
        self.config.step_per_teeth = step as u8;
        Ok(())
    }

    /// Set the phase wiring from its raw value (0 = A leads, 1 = B leads).
    pub fn set_phase(&mut self, phase: u8) -> Result<(), ConfigError> {
        let phase = Phase::try_from(phase)?;
        self.config.phase = phase as u8;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
