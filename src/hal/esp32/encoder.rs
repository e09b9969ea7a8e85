//! EC11 encoder pins on ESP32 GPIO.
//!
//! # Wiring
//!
//! - A → GPIO6
//! - B → GPIO7
//! - Key → GPIO10
//! - C (common) and the key's other leg → GND
//!
//! The internal pull-ups are enabled, so the key reads low while pressed.

use esp_idf_hal::gpio::{Input, InputPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;

use crate::hal::gpio::HalEncoderPins;

/// Encoder pins as ESP-IDF pin drivers.
pub type Esp32EncoderPins<'d, A, B, K> =
    HalEncoderPins<PinDriver<'d, A, Input>, PinDriver<'d, B, Input>, PinDriver<'d, K, Input>>;

/// Configure the three encoder GPIOs as pulled-up inputs.
///
/// # Example
///
/// ```ignore
/// use radial_dial::encoder::EncoderDecoder;
/// use radial_dial::hal::esp32::encoder_pins;
///
/// let peripherals = Peripherals::take()?;
/// let pins = encoder_pins(
///     peripherals.pins.gpio6,  // A
///     peripherals.pins.gpio7,  // B
///     peripherals.pins.gpio10, // Key
/// )?;
/// let mut decoder = EncoderDecoder::new(pins);
///
/// loop {
///     decoder.update();
///     // ...
/// }
/// ```
///
/// # Errors
///
/// Returns an error if GPIO initialization fails.
pub fn encoder_pins<'d, A, B, K>(
    a_pin: impl Peripheral<P = A> + 'd,
    b_pin: impl Peripheral<P = B> + 'd,
    key_pin: impl Peripheral<P = K> + 'd,
) -> Result<Esp32EncoderPins<'d, A, B, K>, esp_idf_hal::sys::EspError>
where
    A: InputPin + OutputPin,
    B: InputPin + OutputPin,
    K: InputPin + OutputPin,
{
    let mut a = PinDriver::input(a_pin)?;
    let mut b = PinDriver::input(b_pin)?;
    let mut key = PinDriver::input(key_pin)?;

    a.set_pull(Pull::Up)?;
    b.set_pull(Pull::Up)?;
    key.set_pull(Pull::Up)?;

    Ok(HalEncoderPins::new(a, b, key))
}
