//! LED ring effects: a hue rotation that follows the dial and fades
//! triggered by the button.
//!
//! # State Machine
//!
//! ```text
//!            set_fade_out()                 set_fade_in()
//! ROTATING ─────────────────> FADE_OUT ─────────────────> FADE_IN
//!    ^                        (terminal)                     │
//!    └───────────────── fade complete ───────────────────────┘
//! ```
//!
//! The rotation effect walks a 30-step red → green → blue → red gradient
//! around the ring. Fades scale the snapshot taken by
//! [`set_fade_out`](LedEffectEngine::set_fade_out) from black up (fade-in)
//! or down to black (fade-out).
//!
//! # Example
//!
//! ```rust
//! use radial_dial::config::ColorOrder;
//! use radial_dial::encoder::Direction;
//! use radial_dial::hal::MockStrip;
//! use radial_dial::led::{EffectState, LedEffectEngine};
//!
//! let mut leds = LedEffectEngine::new(MockStrip::new(), 4, ColorOrder::Grb).unwrap();
//!
//! leds.on_rotate(Direction::Cw, 0).unwrap();
//! assert_eq!(leds.strip().write_count(), 1);
//!
//! leds.set_fade_out(100);
//! leds.show_fade(300).unwrap();
//! assert_eq!(leds.effect_state(), EffectState::FadeOut);
//! assert!(leds.frame().iter().all(|&b| b == 0));
//! ```

use core::fmt;

use rgb::RGB8;

use crate::config::{
    check_fade_duration, check_rotate_interval, ColorOrder, BRIGHTNESS_DEFAULT, BRIGHTNESS_MAX,
    FADE_DURATION_DEFAULT, LED_COUNT_MAX, ROTATE_INTERVAL_DEFAULT,
};
use crate::encoder::Direction;
use crate::traits::StripDriver;

/// Resolution of the hue gradient.
pub const GRADIENT_STEPS: u8 = 30;
const SEGMENT: u8 = GRADIENT_STEPS / 3;
const STEP_SIZE: u8 = 255 / SEGMENT;

/// Channel ceiling for each brightness level.
pub const BRIGHTNESS_LEVELS: [u8; BRIGHTNESS_MAX as usize + 1] = [0, 80, 120, 160, 200];

/// Bytes in a full-size frame.
pub const FRAME_CAPACITY: usize = LED_COUNT_MAX as usize * 3;

/// Color at `offset` on the red → green → blue → red gradient.
///
/// Offsets wrap at [`GRADIENT_STEPS`].
///
/// ```
/// use radial_dial::led::gradient;
/// use rgb::RGB8;
///
/// assert_eq!(gradient(0), RGB8::new(255, 0, 0));
/// assert_eq!(gradient(10), RGB8::new(0, 255, 0));
/// assert_eq!(gradient(20), RGB8::new(0, 0, 255));
/// ```
pub fn gradient(offset: u8) -> RGB8 {
    let offset = offset % GRADIENT_STEPS;
    let segment = offset / SEGMENT;
    let rising = (offset % SEGMENT) * STEP_SIZE;
    let falling = 255 - rising;
    match segment {
        0 => RGB8::new(falling, rising, 0),
        1 => RGB8::new(0, falling, rising),
        _ => RGB8::new(rising, 0, falling),
    }
}

/// Scale a color by a brightness level (0-4). Levels above the table clamp
/// to the brightest entry.
pub fn apply_brightness(color: RGB8, level: u8) -> RGB8 {
    let index = usize::from(level.min(BRIGHTNESS_MAX));
    let ceiling = BRIGHTNESS_LEVELS[index];
    RGB8::new(
        scale_channel(color.r, ceiling),
        scale_channel(color.g, ceiling),
        scale_channel(color.b, ceiling),
    )
}

#[inline]
fn scale_channel(value: u8, factor: u8) -> u8 {
    (u16::from(value) * u16::from(factor) / 255) as u8
}

/// Pixels that a GRB `smart-leds` writer serializes back into exactly the
/// bytes of `frame`. Lets a wire-order frame pass through such a writer
/// whatever [`ColorOrder`] produced it. A trailing partial pixel is dropped.
///
/// ```
/// use radial_dial::led::grb_writer_pixels;
/// use rgb::RGB8;
///
/// let pixels: Vec<RGB8> = grb_writer_pixels(&[10, 20, 30]).collect();
/// assert_eq!(pixels, [RGB8::new(20, 10, 30)]);
/// ```
pub fn grb_writer_pixels(frame: &[u8]) -> impl Iterator<Item = RGB8> + '_ {
    frame
        .chunks_exact(3)
        .map(|p| RGB8::new(p[1], p[0], p[2]))
}

// ============================================================================
// Types
// ============================================================================

/// Current LED effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectState {
    /// Hue rotation driven by the dial.
    #[default]
    Rotating,
    /// Rising from black to the snapshot; returns to `Rotating` when done.
    FadeIn,
    /// Falling from the snapshot to black; stays here until re-triggered.
    FadeOut,
}

impl EffectState {
    /// Short lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EffectState::Rotating => "rotating",
            EffectState::FadeIn => "fade_in",
            EffectState::FadeOut => "fade_out",
        }
    }
}

/// LED engine setup or parameter error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedError {
    /// More LEDs than the frame buffer holds.
    TooManyLeds,
    /// Parameter outside its range.
    InvalidParam,
}

impl LedError {
    /// Short machine-readable name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LedError::TooManyLeds => "too_many_leds",
            LedError::InvalidParam => "invalid_param",
        }
    }
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Renders the LED ring and pushes frames to a [`StripDriver`].
///
/// Time is passed in by the caller (`now_ms`) so the engine can run from
/// any clock.
pub struct LedEffectEngine<S: StripDriver> {
    strip: S,
    led_count: u8,
    color_order: ColorOrder,
    brightness: u8,
    rotate_interval_ms: u16,
    fade_duration_ms: u16,
    state: EffectState,
    fade_start_ms: u64,
    last_render_ms: Option<u64>,
    counter: u8,
    advance_on: Direction,
    frame: [u8; FRAME_CAPACITY],
    saved: [u8; FRAME_CAPACITY],
}

impl<S: StripDriver> LedEffectEngine<S> {
    /// Create an engine with default brightness and timings.
    ///
    /// # Errors
    ///
    /// [`LedError::TooManyLeds`] if `led_count` exceeds
    /// [`LED_COUNT_MAX`].
    pub fn new(strip: S, led_count: u8, color_order: ColorOrder) -> Result<Self, LedError> {
        if led_count > LED_COUNT_MAX {
            return Err(LedError::TooManyLeds);
        }
        Ok(Self {
            strip,
            led_count,
            color_order,
            brightness: BRIGHTNESS_DEFAULT,
            rotate_interval_ms: ROTATE_INTERVAL_DEFAULT,
            fade_duration_ms: FADE_DURATION_DEFAULT,
            state: EffectState::Rotating,
            fade_start_ms: 0,
            last_render_ms: None,
            counter: 0,
            advance_on: Direction::Ccw,
            frame: [0; FRAME_CAPACITY],
            saved: [0; FRAME_CAPACITY],
        })
    }

    #[inline]
    fn frame_len(&self) -> usize {
        usize::from(self.led_count) * 3
    }

    /// Render the next rotation step if the interval has elapsed.
    ///
    /// The gradient counter moves forward when `direction` matches the
    /// counter direction (see [`set_counter_direction`](Self::set_counter_direction))
    /// and backward otherwise. Returns `Ok(true)` when a frame was pushed.
    pub fn on_rotate(&mut self, direction: Direction, now_ms: u64) -> Result<bool, S::Error> {
        if let Some(last) = self.last_render_ms {
            if now_ms.saturating_sub(last) < u64::from(self.rotate_interval_ms) {
                return Ok(false);
            }
        }
        self.last_render_ms = Some(now_ms);

        self.counter = if direction == self.advance_on {
            (self.counter + 1) % GRADIENT_STEPS
        } else {
            (self.counter + GRADIENT_STEPS - 1) % GRADIENT_STEPS
        };

        let count = u16::from(self.led_count);
        let steps = u16::from(GRADIENT_STEPS);
        for index in 0..self.led_count {
            let spread = u16::from(index) * steps / count;
            let offset = ((u16::from(self.counter) + spread) % steps) as u8;
            let color = apply_brightness(gradient(offset), self.brightness);
            self.set_pixel(index, color);
        }

        self.show()?;
        Ok(true)
    }

    /// Start fading in from black to the last snapshot.
    pub fn set_fade_in(&mut self, now_ms: u64) {
        self.state = EffectState::FadeIn;
        self.fade_start_ms = now_ms;
    }

    /// Snapshot the current frame and start fading it out.
    pub fn set_fade_out(&mut self, now_ms: u64) {
        let len = self.frame_len();
        self.saved[..len].copy_from_slice(&self.frame[..len]);
        self.state = EffectState::FadeOut;
        self.fade_start_ms = now_ms;
    }

    /// Advance an active fade. Does nothing while rotating.
    pub fn show_fade(&mut self, now_ms: u64) -> Result<(), S::Error> {
        if self.state == EffectState::Rotating {
            return Ok(());
        }

        let elapsed = now_ms.saturating_sub(self.fade_start_ms);
        let duration = u64::from(self.fade_duration_ms.max(1));
        let progress = (elapsed * 255 / duration).min(255) as u8;
        let factor = match self.state {
            EffectState::FadeIn => progress,
            _ => 255 - progress,
        };

        // Both buffers share the color order, so bytes scale independently
        let len = self.frame_len();
        for (out, &src) in self.frame[..len].iter_mut().zip(&self.saved[..len]) {
            *out = scale_channel(src, factor);
        }
        self.show()?;

        if elapsed >= duration && self.state == EffectState::FadeIn {
            self.state = EffectState::Rotating;
            log::debug!("led: fade-in complete");
        }
        Ok(())
    }

    /// Write one pixel into the frame (not shown until [`show`](Self::show)).
    /// Out-of-range indices are ignored.
    pub fn set_pixel(&mut self, index: u8, color: RGB8) {
        if index >= self.led_count {
            return;
        }
        let at = usize::from(index) * 3;
        let bytes = match self.color_order {
            ColorOrder::Grb => [color.g, color.r, color.b],
            ColorOrder::Rgb => [color.r, color.g, color.b],
        };
        self.frame[at..at + 3].copy_from_slice(&bytes);
    }

    /// Read one pixel back from the frame.
    pub fn pixel(&self, index: u8) -> Option<RGB8> {
        if index >= self.led_count {
            return None;
        }
        let at = usize::from(index) * 3;
        let p = &self.frame[at..at + 3];
        Some(match self.color_order {
            ColorOrder::Grb => RGB8::new(p[1], p[0], p[2]),
            ColorOrder::Rgb => RGB8::new(p[0], p[1], p[2]),
        })
    }

    /// Paint every LED and show immediately.
    pub fn set_all(&mut self, color: RGB8) -> Result<(), S::Error> {
        for index in 0..self.led_count {
            self.set_pixel(index, color);
        }
        self.show()
    }

    /// Turn every LED off and show immediately.
    pub fn clear(&mut self) -> Result<(), S::Error> {
        self.frame = [0; FRAME_CAPACITY];
        self.show()
    }

    /// Push the frame to the strip.
    pub fn show(&mut self) -> Result<(), S::Error> {
        let len = self.frame_len();
        self.strip.write(&self.frame[..len])
    }

    /// Change ring size and byte order. The frame and fade snapshot are
    /// cleared; nothing is shown until the next render.
    pub fn set_layout(&mut self, led_count: u8, color_order: ColorOrder) -> Result<(), LedError> {
        if led_count > LED_COUNT_MAX {
            return Err(LedError::TooManyLeds);
        }
        if led_count != self.led_count || color_order != self.color_order {
            self.led_count = led_count;
            self.color_order = color_order;
            self.frame = [0; FRAME_CAPACITY];
            self.saved = [0; FRAME_CAPACITY];
        }
        Ok(())
    }

    /// Set brightness level (0-4).
    pub fn set_brightness(&mut self, level: u8) -> Result<(), LedError> {
        if level > BRIGHTNESS_MAX {
            return Err(LedError::InvalidParam);
        }
        self.brightness = level;
        Ok(())
    }

    /// Brightness level.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Set the minimum time between rotation frames (20-500 ms).
    pub fn set_rotate_interval(&mut self, ms: u16) -> Result<(), LedError> {
        check_rotate_interval(ms).map_err(|_| LedError::InvalidParam)?;
        self.rotate_interval_ms = ms;
        Ok(())
    }

    /// Rotation frame interval.
    pub fn rotate_interval(&self) -> u16 {
        self.rotate_interval_ms
    }

    /// Set the fade duration (100-300 ms).
    pub fn set_fade_duration(&mut self, ms: u16) -> Result<(), LedError> {
        check_fade_duration(ms).map_err(|_| LedError::InvalidParam)?;
        self.fade_duration_ms = ms;
        Ok(())
    }

    /// Fade duration.
    pub fn fade_duration(&self) -> u16 {
        self.fade_duration_ms
    }

    /// Choose which dial direction moves the gradient forward. Mount the
    /// ring on the same side as the encoder: `Cw`; opposite side: `Ccw`.
    pub fn set_counter_direction(&mut self, direction: Direction) {
        self.advance_on = direction;
    }

    /// Current effect.
    pub fn effect_state(&self) -> EffectState {
        self.state
    }

    /// Gradient position of LED 0.
    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// Number of LEDs driven.
    pub fn led_count(&self) -> u8 {
        self.led_count
    }

    /// Byte order of the strip.
    pub fn color_order(&self) -> ColorOrder {
        self.color_order
    }

    /// Current frame in wire order.
    pub fn frame(&self) -> &[u8] {
        &self.frame[..self.frame_len()]
    }

    /// Snapshot used by fades, in wire order.
    pub fn snapshot(&self) -> &[u8] {
        &self.saved[..self.frame_len()]
    }

    /// Access the strip driver.
    pub fn strip(&self) -> &S {
        &self.strip
    }

    /// Mutable access to the strip driver.
    pub fn strip_mut(&mut self) -> &mut S {
        &mut self.strip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockStrip;

    fn engine(count: u8, order: ColorOrder) -> LedEffectEngine<MockStrip> {
        let mut leds = LedEffectEngine::new(MockStrip::new(), count, order).unwrap();
        leds.set_brightness(4).unwrap();
        leds
    }

    /// Render with the counter landing back on 0.
    fn render_at_zero(leds: &mut LedEffectEngine<MockStrip>) {
        leds.on_rotate(Direction::Ccw, 0).unwrap();
        leds.on_rotate(Direction::Cw, 1000).unwrap();
        assert_eq!(leds.counter(), 0);
    }

    #[test]
    fn grb_writer_pixels_round_trip_both_orders() {
        for order in [ColorOrder::Grb, ColorOrder::Rgb] {
            let mut leds = engine(3, order);
            render_at_zero(&mut leds);
            // What a GRB writer puts on the wire: g, r, b per pixel
            let wire: Vec<u8> = grb_writer_pixels(leds.frame())
                .flat_map(|p| [p.g, p.r, p.b])
                .collect();
            assert_eq!(wire, leds.frame());
        }
        assert_eq!(grb_writer_pixels(&[1, 2, 3, 4]).count(), 1);
    }

    #[test]
    fn gradient_primaries() {
        assert_eq!(gradient(0), RGB8::new(255, 0, 0));
        assert_eq!(gradient(10), RGB8::new(0, 255, 0));
        assert_eq!(gradient(20), RGB8::new(0, 0, 255));
        assert_eq!(gradient(30), gradient(0));
    }

    #[test]
    fn gradient_is_piecewise_linear() {
        assert_eq!(gradient(1), RGB8::new(230, 25, 0));
        assert_eq!(gradient(9), RGB8::new(30, 225, 0));
        assert_eq!(gradient(15), RGB8::new(0, 130, 125));
        assert_eq!(gradient(29), RGB8::new(225, 0, 30));
    }

    #[test]
    fn brightness_table_scales_channels() {
        let white = RGB8::new(255, 255, 255);
        assert_eq!(apply_brightness(white, 0), RGB8::new(0, 0, 0));
        assert_eq!(apply_brightness(white, 1), RGB8::new(80, 80, 80));
        assert_eq!(apply_brightness(white, 4), RGB8::new(200, 200, 200));
        assert_eq!(apply_brightness(RGB8::new(100, 0, 0), 2), RGB8::new(47, 0, 0));
    }

    #[test]
    fn new_rejects_oversized_ring() {
        assert_eq!(
            LedEffectEngine::new(MockStrip::new(), 11, ColorOrder::Grb).err(),
            Some(LedError::TooManyLeds)
        );
        assert!(LedEffectEngine::new(MockStrip::new(), 10, ColorOrder::Grb).is_ok());
        assert!(LedEffectEngine::new(MockStrip::new(), 0, ColorOrder::Grb).is_ok());
    }

    #[test]
    fn defaults_after_new() {
        let leds = LedEffectEngine::new(MockStrip::new(), 4, ColorOrder::Grb).unwrap();
        assert_eq!(leds.brightness(), 2);
        assert_eq!(leds.rotate_interval(), 50);
        assert_eq!(leds.fade_duration(), 200);
        assert_eq!(leds.effect_state(), EffectState::Rotating);
        assert_eq!(leds.frame().len(), 12);
    }

    #[test]
    fn rotation_spreads_gradient_in_grb_order() {
        let mut leds = engine(3, ColorOrder::Grb);
        render_at_zero(&mut leds);
        // red, green, blue as G-R-B triples
        assert_eq!(leds.strip().last_frame(), &[0, 200, 0, 200, 0, 0, 0, 0, 200]);
        assert_eq!(leds.pixel(0), Some(RGB8::new(200, 0, 0)));
        assert_eq!(leds.pixel(3), None);
    }

    #[test]
    fn rotation_in_rgb_order() {
        let mut leds = engine(3, ColorOrder::Rgb);
        render_at_zero(&mut leds);
        assert_eq!(leds.frame(), &[200, 0, 0, 0, 200, 0, 0, 0, 200]);
    }

    #[test]
    fn counter_direction_convention() {
        let mut leds = engine(1, ColorOrder::Grb);
        leds.on_rotate(Direction::Ccw, 0).unwrap();
        assert_eq!(leds.counter(), 1);
        leds.on_rotate(Direction::None, 100).unwrap();
        leds.on_rotate(Direction::Cw, 200).unwrap();
        assert_eq!(leds.counter(), GRADIENT_STEPS - 1);

        leds.set_counter_direction(Direction::Cw);
        leds.on_rotate(Direction::Cw, 300).unwrap();
        assert_eq!(leds.counter(), 0);
    }

    #[test]
    fn rotation_is_rate_limited() {
        let mut leds = engine(4, ColorOrder::Grb);
        assert!(leds.on_rotate(Direction::Cw, 1000).unwrap());
        assert!(!leds.on_rotate(Direction::Cw, 1049).unwrap());
        assert!(leds.on_rotate(Direction::Cw, 1050).unwrap());
        assert_eq!(leds.strip().write_count(), 2);
    }

    #[test]
    fn fade_out_boundaries() {
        let mut leds = engine(3, ColorOrder::Grb);
        render_at_zero(&mut leds);
        let lit = leds.frame().to_vec();

        leds.set_fade_out(5000);
        assert_eq!(leds.snapshot(), &lit[..]);
        leds.show_fade(5000).unwrap();
        assert_eq!(leds.frame(), &lit[..]);

        leds.show_fade(5200).unwrap();
        assert!(leds.frame().iter().all(|&b| b == 0));
        assert_eq!(leds.effect_state(), EffectState::FadeOut);

        // Terminal until re-triggered
        leds.show_fade(9000).unwrap();
        assert_eq!(leds.effect_state(), EffectState::FadeOut);
    }

    #[test]
    fn fade_in_boundaries_and_completion() {
        let mut leds = engine(3, ColorOrder::Grb);
        render_at_zero(&mut leds);
        let lit = leds.frame().to_vec();
        leds.set_fade_out(5000);
        leds.show_fade(5200).unwrap();

        leds.set_fade_in(6000);
        leds.show_fade(6000).unwrap();
        assert!(leds.frame().iter().all(|&b| b == 0));
        assert_eq!(leds.effect_state(), EffectState::FadeIn);

        leds.show_fade(6100).unwrap();
        // progress = 100 * 255 / 200 = 127
        assert_eq!(leds.pixel(0), Some(RGB8::new(99, 0, 0)));

        leds.show_fade(6200).unwrap();
        assert_eq!(leds.frame(), &lit[..]);
        assert_eq!(leds.effect_state(), EffectState::Rotating);
    }

    #[test]
    fn show_fade_is_idle_while_rotating() {
        let mut leds = engine(4, ColorOrder::Grb);
        leds.show_fade(100).unwrap();
        assert_eq!(leds.strip().write_count(), 0);
    }

    #[test]
    fn rejected_parameters_leave_state() {
        let mut leds = engine(4, ColorOrder::Grb);
        assert_eq!(leds.set_brightness(5), Err(LedError::InvalidParam));
        assert_eq!(leds.brightness(), 4);
        assert_eq!(leds.set_rotate_interval(19), Err(LedError::InvalidParam));
        assert_eq!(leds.set_rotate_interval(501), Err(LedError::InvalidParam));
        assert_eq!(leds.rotate_interval(), 50);
        assert_eq!(leds.set_fade_duration(99), Err(LedError::InvalidParam));
        assert_eq!(leds.set_fade_duration(301), Err(LedError::InvalidParam));
        assert_eq!(leds.fade_duration(), 200);
        leds.set_fade_duration(300).unwrap();
        assert_eq!(leds.fade_duration(), 300);
    }

    #[test]
    fn layout_change_resets_buffers() {
        let mut leds = engine(2, ColorOrder::Grb);
        leds.set_all(RGB8::new(9, 9, 9)).unwrap();
        assert_eq!(leds.set_layout(11, ColorOrder::Rgb), Err(LedError::TooManyLeds));
        assert_eq!(leds.led_count(), 2);

        leds.set_layout(5, ColorOrder::Rgb).unwrap();
        assert_eq!(leds.frame(), &[0; 15]);
        leds.set_pixel(4, RGB8::new(1, 2, 3));
        assert_eq!(&leds.frame()[12..], &[1, 2, 3]);
    }

    #[test]
    fn set_all_and_clear() {
        let mut leds = engine(2, ColorOrder::Grb);
        leds.set_all(RGB8::new(1, 2, 3)).unwrap();
        assert_eq!(leds.strip().last_frame(), &[2, 1, 3, 2, 1, 3]);
        leds.clear().unwrap();
        assert_eq!(leds.strip().last_frame(), &[0; 6]);
        assert_eq!(leds.strip().write_count(), 2);
    }

    #[test]
    fn strip_errors_propagate() {
        let mut leds = engine(2, ColorOrder::Grb);
        leds.strip_mut().fail_writes = true;
        assert_eq!(leds.on_rotate(Direction::Cw, 0), Err(()));
        assert_eq!(leds.show(), Err(()));
    }
}
