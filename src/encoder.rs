//! Quadrature decoder for the detented rotary encoder and its push button.
//!
//! [`EncoderDecoder`] samples the A, B and key pins once per scheduler tick
//! and turns level changes into a [`Direction`] event and a key edge. The
//! results are edge-triggered: `direction()` and `is_key_changed()` only
//! describe the most recent [`update`](EncoderDecoder::update), and an
//! event not consumed before the next tick is lost.
//!
//! # Decoding
//!
//! Whenever A changes, a signed accumulator moves by +1 if B differs from
//! the new A level and by -1 otherwise. Once the accumulator reaches the
//! [`Sensitivity`] threshold a direction fires and the accumulator resets.
//! With [`Phase::BLeads`] the fired direction is mirrored, so both board
//! wirings report the same logical rotation.
//!
//! # Example
//!
//! ```rust
//! use radial_dial::encoder::{Direction, EncoderDecoder};
//! use radial_dial::hal::MockPins;
//!
//! // Pins idle high (pulled up)
//! let mut decoder = EncoderDecoder::new(MockPins::new());
//!
//! // A falls while B is still high: one clockwise count
//! decoder.pins_mut().set_levels(false, true);
//! decoder.update();
//! assert_eq!(decoder.direction(), Direction::Cw);
//!
//! // Direction is not latched
//! decoder.update();
//! assert_eq!(decoder.direction(), Direction::None);
//! ```

use crate::config::{ConfigError, Phase, Sensitivity};
use crate::traits::EncoderPins;

/// Rotation event produced by one decoder tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// No rotation this tick.
    #[default]
    None,
    /// Clockwise.
    Cw,
    /// Counter-clockwise.
    Ccw,
}

impl Direction {
    /// Returns the direction as a lowercase string.
    ///
    /// ```
    /// use radial_dial::encoder::Direction;
    ///
    /// assert_eq!(Direction::Cw.as_str(), "cw");
    /// assert_eq!(Direction::None.as_str(), "none");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::None => "none",
            Direction::Cw => "cw",
            Direction::Ccw => "ccw",
        }
    }

    /// Swap clockwise and counter-clockwise. `None` stays `None`.
    #[inline]
    pub const fn inverted(self) -> Self {
        match self {
            Direction::None => Direction::None,
            Direction::Cw => Direction::Ccw,
            Direction::Ccw => Direction::Cw,
        }
    }

    /// Returns true for `Cw` or `Ccw`.
    #[inline]
    pub const fn is_rotation(&self) -> bool {
        !matches!(self, Direction::None)
    }
}

/// Debounced state of the push button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum KeyState {
    /// Button up.
    #[default]
    Released,
    /// Button down (pin pulled low).
    Pressed,
}

impl KeyState {
    /// Returns true when pressed.
    #[inline]
    pub const fn is_pressed(&self) -> bool {
        matches!(self, KeyState::Pressed)
    }
}

/// Polled quadrature decoder.
///
/// Owns its pins and is the only mutator of its state; all queries are
/// pure reads of the last [`update`](Self::update).
pub struct EncoderDecoder<P: EncoderPins> {
    pins: P,
    last_a: bool,
    last_b: bool,
    last_key: bool,
    accumulator: i8,
    sensitivity: Sensitivity,
    phase: Phase,
    direction: Direction,
    key_state: KeyState,
    key_changed: bool,
}

impl<P: EncoderPins> EncoderDecoder<P> {
    /// Create a decoder with 2x sensitivity and A-leads phase, sampling
    /// the initial pin levels.
    pub fn new(mut pins: P) -> Self {
        let last_a = pins.read_a();
        let last_b = pins.read_b();
        let last_key = pins.read_key();
        Self {
            pins,
            last_a,
            last_b,
            last_key,
            accumulator: 0,
            sensitivity: Sensitivity::Double,
            phase: Phase::ALeads,
            direction: Direction::None,
            key_state: KeyState::Released,
            key_changed: false,
        }
    }

    /// Sample the pins and recompute this tick's events. Call once per tick.
    pub fn update(&mut self) {
        self.direction = Direction::None;

        let a = self.pins.read_a();
        let b = self.pins.read_b();
        let key = self.pins.read_key();

        if a != self.last_a {
            let step = if b != a { 1 } else { -1 };
            self.accumulator = self.accumulator.saturating_add(step);
        }

        let threshold = self.sensitivity.threshold();
        if self.accumulator >= threshold {
            self.direction = Direction::Cw;
            self.accumulator = 0;
        } else if self.accumulator <= -threshold {
            self.direction = Direction::Ccw;
            self.accumulator = 0;
        }

        if self.phase == Phase::BLeads {
            self.direction = self.direction.inverted();
        }

        self.last_a = a;
        self.last_b = b;

        self.key_changed = key != self.last_key;
        if self.key_changed {
            // Active low
            self.key_state = if key {
                KeyState::Released
            } else {
                KeyState::Pressed
            };
            self.last_key = key;
        }

        if self.direction.is_rotation() {
            log::debug!("encoder: {}", self.direction.as_str());
        }
    }

    /// Direction fired by the last update, if any.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current button state.
    #[inline]
    pub fn key_state(&self) -> KeyState {
        self.key_state
    }

    /// True if the last update saw a key edge.
    #[inline]
    pub fn is_key_changed(&self) -> bool {
        self.key_changed
    }

    /// Events per detent.
    #[inline]
    pub fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    /// Phase wiring.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Set events per detent.
    pub fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.sensitivity = sensitivity;
    }

    /// Set events per detent from a raw value (1 or 2). Rejected values
    /// leave the decoder unchanged.
    pub fn set_step_per_teeth(&mut self, step: u8) -> Result<(), ConfigError> {
        self.sensitivity = Sensitivity::try_from(step)?;
        Ok(())
    }

    /// Set the phase wiring.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Set the phase wiring from a raw value (0 or 1). Rejected values
    /// leave the decoder unchanged.
    pub fn set_phase_raw(&mut self, phase: u8) -> Result<(), ConfigError> {
        self.phase = Phase::try_from(phase)?;
        Ok(())
    }

    /// Access the pins.
    pub fn pins(&self) -> &P {
        &self.pins
    }

    /// Mutable access to the pins (used by simulations and tests).
    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockPins;

    /// One detent of clockwise rotation under A-leads wiring, starting
    /// from both phases high.
    const CW_DETENT: [(bool, bool); 4] =
        [(false, true), (false, false), (true, false), (true, true)];

    fn run(decoder: &mut EncoderDecoder<MockPins>, steps: &[(bool, bool)]) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for &(a, b) in steps {
            decoder.pins_mut().set_levels(a, b);
            decoder.update();
            match decoder.direction() {
                Direction::Cw => counts[0] += 1,
                Direction::Ccw => counts[1] += 1,
                Direction::None => {}
            }
        }
        counts
    }

    fn reversed(steps: &[(bool, bool); 4]) -> [(bool, bool); 4] {
        // Walk the same detent backwards, ending at both high again
        [steps[2], steps[1], steps[0], (true, true)]
    }

    #[test]
    fn defaults_after_new() {
        let decoder = EncoderDecoder::new(MockPins::new());
        assert_eq!(decoder.sensitivity(), Sensitivity::Double);
        assert_eq!(decoder.phase(), Phase::ALeads);
        assert_eq!(decoder.direction(), Direction::None);
        assert_eq!(decoder.key_state(), KeyState::Released);
        assert!(!decoder.is_key_changed());
    }

    #[test]
    fn double_sensitivity_fires_twice_per_detent() {
        let mut decoder = EncoderDecoder::new(MockPins::new());
        assert_eq!(run(&mut decoder, &CW_DETENT), [2, 0]);
    }

    #[test]
    fn single_sensitivity_fires_once_per_detent() {
        let mut decoder = EncoderDecoder::new(MockPins::new());
        decoder.set_sensitivity(Sensitivity::Single);
        assert_eq!(run(&mut decoder, &CW_DETENT), [1, 0]);
    }

    #[test]
    fn reverse_rotation_fires_ccw() {
        let mut decoder = EncoderDecoder::new(MockPins::new());
        assert_eq!(run(&mut decoder, &reversed(&CW_DETENT)), [0, 2]);
    }

    #[test]
    fn b_leads_inverts_every_event() {
        for sensitivity in [Sensitivity::Single, Sensitivity::Double] {
            let mut a_leads = EncoderDecoder::new(MockPins::new());
            a_leads.set_sensitivity(sensitivity);
            let mut b_leads = EncoderDecoder::new(MockPins::new());
            b_leads.set_sensitivity(sensitivity);
            b_leads.set_phase(Phase::BLeads);

            let [cw, ccw] = run(&mut a_leads, &CW_DETENT);
            let [inv_cw, inv_ccw] = run(&mut b_leads, &CW_DETENT);
            assert_eq!((cw, ccw), (sensitivity as usize, 0));
            assert_eq!((inv_cw, inv_ccw), (0, sensitivity as usize));
        }
    }

    #[test]
    fn direction_resets_every_tick() {
        let mut decoder = EncoderDecoder::new(MockPins::new());
        decoder.pins_mut().set_levels(false, true);
        decoder.update();
        assert_eq!(decoder.direction(), Direction::Cw);
        decoder.update();
        assert_eq!(decoder.direction(), Direction::None);
    }

    #[test]
    fn b_only_changes_do_not_count() {
        let mut decoder = EncoderDecoder::new(MockPins::new());
        assert_eq!(run(&mut decoder, &[(true, false), (true, true), (true, false)]), [0, 0]);
    }

    #[test]
    fn key_edges_are_reported_once() {
        let mut decoder = EncoderDecoder::new(MockPins::new());

        decoder.pins_mut().set_key(false);
        decoder.update();
        assert!(decoder.is_key_changed());
        assert_eq!(decoder.key_state(), KeyState::Pressed);

        decoder.update();
        assert!(!decoder.is_key_changed());
        assert_eq!(decoder.key_state(), KeyState::Pressed);

        decoder.pins_mut().set_key(true);
        decoder.update();
        assert!(decoder.is_key_changed());
        assert_eq!(decoder.key_state(), KeyState::Released);
    }

    #[test]
    fn initial_levels_are_sampled() {
        let mut pins = MockPins::new();
        pins.set_levels(false, false);
        pins.set_key(false);
        let mut decoder = EncoderDecoder::new(pins);
        // No level change since construction: nothing fires
        decoder.update();
        assert_eq!(decoder.direction(), Direction::None);
        assert!(!decoder.is_key_changed());
    }

    #[test]
    fn raw_setters_reject_invalid_values() {
        let mut decoder = EncoderDecoder::new(MockPins::new());
        assert_eq!(decoder.set_step_per_teeth(3), Err(ConfigError::InvalidParam));
        assert_eq!(decoder.sensitivity(), Sensitivity::Double);
        decoder.set_step_per_teeth(1).unwrap();
        assert_eq!(decoder.sensitivity(), Sensitivity::Single);

        assert_eq!(decoder.set_phase_raw(2), Err(ConfigError::InvalidParam));
        assert_eq!(decoder.phase(), Phase::ALeads);
        decoder.set_phase_raw(1).unwrap();
        assert_eq!(decoder.phase(), Phase::BLeads);
    }

    #[test]
    fn direction_helpers() {
        assert_eq!(Direction::Cw.inverted(), Direction::Ccw);
        assert_eq!(Direction::None.inverted(), Direction::None);
        assert!(Direction::Ccw.is_rotation());
        assert!(!Direction::None.is_rotation());
        assert!(KeyState::Pressed.is_pressed());
    }
}
