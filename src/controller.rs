//! Scheduler tick that wires the decoder, report transmitter, LED ring and
//! config store together.
//!
//! # Overview
//!
//! Each [`tick`](RadialController::tick):
//! - samples the encoder
//! - reports a dial delta for a rotation event, or a zero delta for a
//!   button edge in a tick without rotation
//! - starts a fade-out on press and a fade-in on release
//! - renders the rotation effect while the ring is rotating, then
//!   advances any fade
//!
//! Transmit and strip failures never stop the loop; they are logged and
//! surfaced in the returned [`TickSummary`].
//!
//! # Example
//!
//! ```rust
//! use radial_dial::config::{ColorOrder, ConfigStore};
//! use radial_dial::controller::RadialController;
//! use radial_dial::encoder::EncoderDecoder;
//! use radial_dial::hal::{MockClock, MockEeprom, MockEndpoint, MockPins, MockStrip};
//! use radial_dial::led::LedEffectEngine;
//! use radial_dial::report::{BusyFlag, RadialTransmitter};
//!
//! let busy = BusyFlag::new();
//! let mut controller = RadialController::new(
//!     EncoderDecoder::new(MockPins::new()),
//!     RadialTransmitter::new(MockEndpoint::configured(), MockClock::new(), &busy),
//!     LedEffectEngine::new(MockStrip::new(), 4, ColorOrder::Grb).unwrap(),
//!     ConfigStore::new(MockEeprom::erased()),
//! );
//!
//! // Press the key
//! controller.decoder_mut().pins_mut().press();
//! let summary = controller.tick(0);
//! assert!(summary.key_changed);
//! assert_eq!(summary.reports_sent, 1);
//! assert_eq!(controller.transmitter().report().button_dial, 0x0001);
//! ```

use crate::config::{ConfigError, ConfigStore, LoadOutcome};
use crate::console::{Console, Reply};
use crate::encoder::{Direction, EncoderDecoder};
use crate::led::{EffectState, LedEffectEngine};
use crate::report::{HidError, RadialTransmitter};
use crate::traits::{Clock, ConfigStorage, EncoderPins, HidEndpoint, StripDriver};

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Direction event fired by the decoder.
    pub direction: Direction,
    /// The key changed state.
    pub key_changed: bool,
    /// Reports handed to the endpoint.
    pub reports_sent: u8,
    /// Last transmit failure, if any.
    pub report_error: Option<HidError>,
    /// A frame push failed.
    pub strip_error: bool,
}

/// The dial firmware core.
///
/// # Type Parameters
///
/// - `P`: encoder pins ([`EncoderPins`])
/// - `E`: HID endpoint ([`HidEndpoint`])
/// - `C`: clock for the transmit timeout ([`Clock`])
/// - `S`: LED strip ([`StripDriver`])
/// - `N`: non-volatile storage ([`ConfigStorage`])
pub struct RadialController<'a, P, E, C, S, N>
where
    P: EncoderPins,
    E: HidEndpoint,
    C: Clock,
    S: StripDriver,
    N: ConfigStorage,
{
    decoder: EncoderDecoder<P>,
    transmitter: RadialTransmitter<'a, E, C>,
    leds: LedEffectEngine<S>,
    store: ConfigStore<N>,
    console: Console,
    load_outcome: Result<LoadOutcome, ConfigError>,
    failed_reports: u32,
}

impl<'a, P, E, C, S, N> RadialController<'a, P, E, C, S, N>
where
    P: EncoderPins,
    E: HidEndpoint,
    C: Clock,
    S: StripDriver,
    N: ConfigStorage,
{
    /// Load the config (restoring defaults if the stored record is
    /// invalid) and apply it to the decoder and LED ring.
    pub fn new(
        decoder: EncoderDecoder<P>,
        transmitter: RadialTransmitter<'a, E, C>,
        leds: LedEffectEngine<S>,
        mut store: ConfigStore<N>,
    ) -> Self {
        let load_outcome = store.load();
        match load_outcome {
            Ok(LoadOutcome::Loaded) => log::info!("config loaded"),
            Ok(LoadOutcome::Restored) => log::info!("config restored to defaults"),
            Err(e) => log::warn!("config load failed ({}), running on defaults", e),
        }

        let mut controller = Self {
            decoder,
            transmitter,
            leds,
            store,
            console: Console::new(),
            load_outcome,
            failed_reports: 0,
        };
        controller.apply_config();
        controller
    }

    /// Push the store's values into the decoder and LED ring.
    pub fn apply_config(&mut self) {
        self.decoder.set_sensitivity(self.store.step_per_teeth());
        self.decoder.set_phase(self.store.phase());

        let results = [
            self.leds
                .set_layout(self.store.led_count(), self.store.color_order()),
            self.leds.set_brightness(self.store.brightness()),
            self.leds.set_rotate_interval(self.store.rotate_interval_ms()),
            self.leds.set_fade_duration(self.store.fade_duration_ms()),
        ];
        for e in results.into_iter().filter_map(Result::err) {
            log::warn!("led parameter rejected: {}", e);
        }
    }

    /// Run one scheduler tick.
    pub fn tick(&mut self, now_ms: u64) -> TickSummary {
        let mut summary = TickSummary::default();

        self.decoder.update();
        let direction = self.decoder.direction();
        let pressed = self.decoder.key_state().is_pressed();
        summary.direction = direction;

        let degrees = match direction {
            Direction::Cw => Some(self.store.rotate_cw()),
            Direction::Ccw => Some(self.store.rotate_ccw()),
            Direction::None => None,
        };
        if let Some(degrees) = degrees {
            self.send(pressed, degrees, &mut summary);
        }

        if self.decoder.is_key_changed() {
            summary.key_changed = true;
            // A rotation report already carries the new button bit
            if degrees.is_none() {
                self.send(pressed, 0, &mut summary);
            }
            if pressed {
                self.leds.set_fade_out(now_ms);
            } else {
                self.leds.set_fade_in(now_ms);
            }
        }

        if self.leds.effect_state() == EffectState::Rotating
            && self.leds.on_rotate(direction, now_ms).is_err()
        {
            summary.strip_error = true;
        }
        if self.leds.show_fade(now_ms).is_err() {
            summary.strip_error = true;
        }
        if summary.strip_error {
            log::warn!("led strip write failed");
        }

        summary
    }

    fn send(&mut self, pressed: bool, degrees: i16, summary: &mut TickSummary) {
        match self.transmitter.send_delta(pressed, degrees) {
            Ok(()) => summary.reports_sent += 1,
            Err(e) => {
                self.failed_reports = self.failed_reports.saturating_add(1);
                summary.report_error = Some(e);
            }
        }
    }

    /// Run one console command and re-apply the config.
    pub fn handle_console_line(&mut self, line: &str) -> Reply {
        let reply = self.console.execute(line, &mut self.store);
        self.apply_config();
        reply
    }

    /// Feed raw CDC bytes to the console; `on_reply` receives each reply.
    pub fn feed_console(&mut self, bytes: &[u8], on_reply: impl FnMut(&str, &Reply)) {
        self.console.feed(bytes, &mut self.store, on_reply);
        self.apply_config();
    }

    /// Hand a host OUT report to the transmitter.
    pub fn receive_out(&mut self, data: &[u8]) -> bool {
        self.transmitter.receive_out(data)
    }

    /// Result of the boot-time config load.
    pub fn load_outcome(&self) -> Result<LoadOutcome, ConfigError> {
        self.load_outcome
    }

    /// Reports that failed to send since boot.
    pub fn failed_reports(&self) -> u32 {
        self.failed_reports
    }

    /// The encoder decoder.
    pub fn decoder(&self) -> &EncoderDecoder<P> {
        &self.decoder
    }

    /// Mutable access to the decoder.
    pub fn decoder_mut(&mut self) -> &mut EncoderDecoder<P> {
        &mut self.decoder
    }

    /// The report transmitter.
    pub fn transmitter(&self) -> &RadialTransmitter<'a, E, C> {
        &self.transmitter
    }

    /// Mutable access to the transmitter.
    pub fn transmitter_mut(&mut self) -> &mut RadialTransmitter<'a, E, C> {
        &mut self.transmitter
    }

    /// The LED engine.
    pub fn leds(&self) -> &LedEffectEngine<S> {
        &self.leds
    }

    /// Mutable access to the LED engine.
    pub fn leds_mut(&mut self) -> &mut LedEffectEngine<S> {
        &mut self.leds
    }

    /// The config store.
    pub fn store(&self) -> &ConfigStore<N> {
        &self.store
    }

    /// Mutable access to the config store.
    pub fn store_mut(&mut self) -> &mut ConfigStore<N> {
        &mut self.store
    }

    /// The console session.
    pub fn console(&self) -> &Console {
        &self.console
    }
}
