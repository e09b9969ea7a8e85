//! [`EncoderPins`] over any three embedded-hal 1.0 input pins.
//!
//! Read errors are reported as a high level, which is the idle state of a
//! pulled-up encoder: a flaky read can never fabricate a key press.

use embedded_hal::digital::InputPin;

use crate::traits::EncoderPins;

/// Encoder A/B/key pins backed by embedded-hal inputs.
///
/// # Example
///
/// ```ignore
/// use radial_dial::encoder::EncoderDecoder;
/// use radial_dial::hal::HalEncoderPins;
///
/// let pins = HalEncoderPins::new(pin_a, pin_b, pin_key);
/// let mut decoder = EncoderDecoder::new(pins);
/// ```
#[derive(Debug)]
pub struct HalEncoderPins<A, B, K> {
    a: A,
    b: B,
    key: K,
}

impl<A, B, K> HalEncoderPins<A, B, K>
where
    A: InputPin,
    B: InputPin,
    K: InputPin,
{
    /// Wrap already configured input pins.
    pub fn new(a: A, b: B, key: K) -> Self {
        Self { a, b, key }
    }

    /// Give the pins back.
    pub fn release(self) -> (A, B, K) {
        (self.a, self.b, self.key)
    }
}

impl<A, B, K> EncoderPins for HalEncoderPins<A, B, K>
where
    A: InputPin,
    B: InputPin,
    K: InputPin,
{
    fn read_a(&mut self) -> bool {
        self.a.is_high().unwrap_or(true)
    }

    fn read_b(&mut self) -> bool {
        self.b.is_high().unwrap_or(true)
    }

    fn read_key(&mut self) -> bool {
        self.key.is_high().unwrap_or(true)
    }
}
