//! Desktop simulation of the dial firmware with mock hardware.
//!
//! Runs the controller against scripted encoder input and prints every
//! HID report sent to the "host" and every LED frame pushed to the strip.
//! The host acknowledges each report one tick after it is sent.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example desktop_sim
//! ```

use anyhow::{anyhow, Result};
use radial_dial::hal::{MockClock, MockEeprom, MockEndpoint, MockPins, MockStrip};
use radial_dial::{
    BusyFlag, ColorOrder, ConfigStore, EncoderDecoder, LedEffectEngine, RadialController,
    RadialReport, RadialTransmitter,
};

type SimController<'a> =
    RadialController<'a, MockPins, MockEndpoint, MockClock, MockStrip, MockEeprom>;

/// One scripted input step.
#[derive(Clone, Copy)]
enum Input {
    Idle,
    Levels(bool, bool),
    Press,
    Release,
}

const CW_DETENT: [Input; 4] = [
    Input::Levels(false, true),
    Input::Levels(false, false),
    Input::Levels(true, false),
    Input::Levels(true, true),
];

const CCW_DETENT: [Input; 4] = [
    Input::Levels(true, false),
    Input::Levels(false, false),
    Input::Levels(false, true),
    Input::Levels(true, true),
];

fn main() -> Result<()> {
    println!("=================================");
    println!("  radial-dial Desktop Simulation");
    println!("=================================");
    println!();

    let busy = BusyFlag::new();
    let leds = LedEffectEngine::new(MockStrip::new(), 4, ColorOrder::Grb)
        .map_err(|e| anyhow!("led engine: {}", e))?;
    let mut controller = RadialController::new(
        EncoderDecoder::new(MockPins::new()),
        RadialTransmitter::new(MockEndpoint::configured(), MockClock::new(), &busy),
        leds,
        ConfigStore::new(MockEeprom::erased()),
    );

    let outcome = controller
        .load_outcome()
        .map_err(|e| anyhow!("config load: {}", e))?;
    println!("Boot: config {:?}", outcome);

    console(
        &mut controller,
        b"get_config\nconfig_mode_enabled\nset_rotate_cw=15\nset_rotate_ccw=-15\nsave_config\n",
    );

    let mut script = Vec::new();
    script.extend_from_slice(&CW_DETENT);
    script.extend_from_slice(&CW_DETENT);
    script.push(Input::Press);
    script.extend_from_slice(&CCW_DETENT);
    script.extend(core::iter::repeat(Input::Idle).take(10));
    script.push(Input::Release);
    script.extend(core::iter::repeat(Input::Idle).take(25));

    println!();
    println!("Running {} ticks:", script.len());
    let mut reports_seen = 0;
    let mut frames_seen = 0;
    for (i, input) in script.into_iter().enumerate() {
        let now_ms = i as u64 * 10;
        let pins = controller.decoder_mut().pins_mut();
        match input {
            Input::Idle => {}
            Input::Levels(a, b) => pins.set_levels(a, b),
            Input::Press => pins.press(),
            Input::Release => pins.release(),
        }

        let summary = controller.tick(now_ms);
        if let Some(e) = summary.report_error {
            println!("[{:>5} ms] report failed: {}", now_ms, e);
        }

        let sent = &controller.transmitter().endpoint().sent;
        for packet in &sent[reports_seen..] {
            if let Some(report) = RadialReport::from_bytes(packet) {
                println!(
                    "[{:>5} ms] HID  {:02X?}  button={} dial={:+}.{}",
                    now_ms,
                    packet,
                    report.button(),
                    report.dial_tenths() / 10,
                    (report.dial_tenths() % 10).abs()
                );
            }
        }
        reports_seen = sent.len();

        let strip = controller.leds().strip();
        if strip.write_count() > frames_seen {
            println!(
                "[{:>5} ms] LED  {:?} {:02X?}",
                now_ms,
                controller.leds().effect_state(),
                strip.last_frame()
            );
            frames_seen = strip.write_count();
        }

        // Host picked up the report
        busy.clear();
    }

    println!();
    println!(
        "Done: {} reports, {} frames, {} failed sends",
        reports_seen,
        frames_seen,
        controller.failed_reports()
    );
    Ok(())
}

fn console(controller: &mut SimController<'_>, input: &[u8]) {
    controller.feed_console(input, |line, reply| {
        println!("> {}", line);
        for out in reply.lines() {
            println!("  {}", out);
        }
    });
}
