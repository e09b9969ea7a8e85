//! Edge case and boundary condition tests for the dial firmware core

use radial_dial::{
    hal::{MockClock, MockEeprom, MockEndpoint, MockPins, MockStrip},
    BusyFlag, ColorOrder, ConfigError, ConfigStore, Console, Direction, EffectState,
    EncoderDecoder, HidError, LedEffectEngine, LedError, LoadOutcome, RadialReport,
    RadialTransmitter,
};

// ============================================================================
// Report Boundaries
// ============================================================================

#[test]
fn dial_at_full_turn_boundaries() {
    assert_eq!(RadialReport::new(false, 360).dial_tenths(), 3600);
    assert_eq!(RadialReport::new(false, -360).dial_tenths(), -3600);
}

#[test]
fn dial_clamped_beyond_full_turn() {
    assert_eq!(RadialReport::new(false, 361).dial_tenths(), 3600);
    assert_eq!(RadialReport::new(true, i16::MIN).dial_tenths(), -3600);
    assert!(RadialReport::new(true, i16::MIN).button());
}

#[test]
fn zero_delta_keeps_only_button_bit() {
    assert_eq!(RadialReport::new(true, 0).button_dial, 0x0001);
    assert_eq!(RadialReport::new(false, 0).button_dial, 0x0000);
}

#[test]
fn malformed_packets_are_not_reports() {
    assert_eq!(RadialReport::from_bytes(&[]), None);
    assert_eq!(RadialReport::from_bytes(&[0x01, 0x21]), None);
    assert_eq!(RadialReport::from_bytes(&[0x02, 0x21, 0x1C]), None);
}

#[test]
fn short_out_report_still_releases_buffer() {
    let busy = BusyFlag::new();
    let mut tx = RadialTransmitter::new(MockEndpoint::configured(), MockClock::new(), &busy);
    tx.send_delta(true, 90).unwrap();
    let before = *tx.report();

    assert!(!tx.receive_out(&[0x01]));
    assert_eq!(*tx.report(), before);
    assert_eq!(tx.endpoint().out_releases, 1);
}

#[test]
fn endpoint_exactly_report_sized_is_accepted() {
    let busy = BusyFlag::new();
    let mut endpoint = MockEndpoint::configured();
    endpoint.max_packet = 3;
    let mut tx = RadialTransmitter::new(endpoint, MockClock::new(), &busy);
    assert_eq!(tx.send_delta(false, 1), Ok(()));
}

#[test]
fn failed_send_leaves_busy_flag_untouched() {
    let busy = BusyFlag::new();
    let mut tx = RadialTransmitter::new(MockEndpoint::new(), MockClock::new(), &busy);
    assert_eq!(tx.send_delta(false, 10), Err(HidError::UsbNotConfigured));
    assert!(!busy.is_set());
    assert_eq!(tx.last_error_code(), HidError::UsbNotConfigured.code());
}

// ============================================================================
// Encoder Edge Cases
// ============================================================================

#[test]
fn direction_change_mid_detent_cancels_out() {
    let mut decoder = EncoderDecoder::new(MockPins::new());
    decoder.set_step_per_teeth(1).unwrap();

    // One CW count, then back: the accumulator returns to zero
    decoder.pins_mut().set_levels(false, true);
    decoder.update();
    assert_eq!(decoder.direction(), Direction::None);
    decoder.pins_mut().set_levels(true, true);
    decoder.update();
    assert_eq!(decoder.direction(), Direction::None);

    // A fresh single count in either direction does not fire
    decoder.pins_mut().set_levels(false, true);
    decoder.update();
    assert_eq!(decoder.direction(), Direction::None);
}

#[test]
fn key_bounce_reports_every_edge() {
    let mut decoder = EncoderDecoder::new(MockPins::new());
    let mut edges = 0;
    for level in [false, true, false, true] {
        decoder.pins_mut().set_key(level);
        decoder.update();
        if decoder.is_key_changed() {
            edges += 1;
        }
    }
    assert_eq!(edges, 4);
    assert!(!decoder.key_state().is_pressed());
}

#[test]
fn rotation_and_key_edge_in_same_tick() {
    let mut decoder = EncoderDecoder::new(MockPins::new());
    decoder.pins_mut().set_levels(false, true);
    decoder.pins_mut().press();
    decoder.update();
    assert_eq!(decoder.direction(), Direction::Cw);
    assert!(decoder.is_key_changed());
    assert!(decoder.key_state().is_pressed());
}

// ============================================================================
// LED Boundaries
// ============================================================================

#[test]
fn ten_leds_is_the_maximum() {
    assert!(LedEffectEngine::new(MockStrip::new(), 10, ColorOrder::Grb).is_ok());
    assert_eq!(
        LedEffectEngine::new(MockStrip::new(), 11, ColorOrder::Grb).err(),
        Some(LedError::TooManyLeds)
    );
}

#[test]
fn oversized_layout_leaves_engine_unchanged() {
    let mut leds = LedEffectEngine::new(MockStrip::new(), 4, ColorOrder::Grb).unwrap();
    assert_eq!(leds.set_layout(12, ColorOrder::Rgb), Err(LedError::TooManyLeds));
    assert_eq!(leds.led_count(), 4);
    assert_eq!(leds.color_order(), ColorOrder::Grb);
    assert_eq!(leds.frame().len(), 12);
}

#[test]
fn counter_wraps_backwards_from_zero() {
    let mut leds = LedEffectEngine::new(MockStrip::new(), 3, ColorOrder::Grb).unwrap();
    leds.set_counter_direction(Direction::Ccw);
    leds.on_rotate(Direction::Cw, 0).unwrap();
    assert_eq!(leds.counter(), 29);
    leds.on_rotate(Direction::Ccw, 50).unwrap();
    assert_eq!(leds.counter(), 0);
}

#[test]
fn counter_wraps_forwards_past_last_step() {
    let mut leds = LedEffectEngine::new(MockStrip::new(), 3, ColorOrder::Grb).unwrap();
    leds.set_counter_direction(Direction::Cw);
    for i in 0..30 {
        leds.on_rotate(Direction::Cw, i * 50).unwrap();
    }
    assert_eq!(leds.counter(), 0);
}

#[test]
fn render_exactly_at_interval_is_allowed() {
    let mut leds = LedEffectEngine::new(MockStrip::new(), 3, ColorOrder::Grb).unwrap();
    assert_eq!(leds.on_rotate(Direction::None, 1000), Ok(true));
    assert_eq!(leds.on_rotate(Direction::None, 1049), Ok(false));
    assert_eq!(leds.on_rotate(Direction::None, 1050), Ok(true));
}

#[test]
fn brightness_and_timing_limits() {
    let mut leds = LedEffectEngine::new(MockStrip::new(), 3, ColorOrder::Grb).unwrap();
    assert_eq!(leds.set_brightness(4), Ok(()));
    assert_eq!(leds.set_brightness(5), Err(LedError::InvalidParam));
    assert_eq!(leds.brightness(), 4);

    assert_eq!(leds.set_rotate_interval(20), Ok(()));
    assert_eq!(leds.set_rotate_interval(501), Err(LedError::InvalidParam));
    assert_eq!(leds.rotate_interval(), 20);

    assert_eq!(leds.set_fade_duration(300), Ok(()));
    assert_eq!(leds.set_fade_duration(99), Err(LedError::InvalidParam));
    assert_eq!(leds.fade_duration(), 300);
}

#[test]
fn zero_brightness_renders_dark_frame() {
    let mut leds = LedEffectEngine::new(MockStrip::new(), 3, ColorOrder::Grb).unwrap();
    leds.set_brightness(0).unwrap();
    leds.on_rotate(Direction::None, 0).unwrap();
    assert!(leds.frame().iter().all(|&b| b == 0));
}

#[test]
fn fade_out_holds_dark_until_released() {
    let mut leds = LedEffectEngine::new(MockStrip::new(), 3, ColorOrder::Grb).unwrap();
    leds.on_rotate(Direction::None, 0).unwrap();
    leds.set_fade_out(0);
    leds.show_fade(10_000).unwrap();
    assert_eq!(leds.effect_state(), EffectState::FadeOut);
    assert!(leds.frame().iter().all(|&b| b == 0));
}

// ============================================================================
// Config Boundaries
// ============================================================================

#[test]
fn led_count_rejected_value_keeps_previous() {
    let mut store = ConfigStore::new(MockEeprom::erased());
    store.load().unwrap();
    assert_eq!(store.set_led_count(12), Err(ConfigError::InvalidParam));
    assert_eq!(store.set_led_count(0), Err(ConfigError::InvalidParam));
    assert_eq!(store.led_count(), 4);
    assert_eq!(store.set_led_count(10), Ok(()));
    assert_eq!(store.set_led_count(1), Ok(()));
}

#[test]
fn angle_signs_are_enforced() {
    let mut store = ConfigStore::new(MockEeprom::erased());
    assert_eq!(store.set_rotate_cw(0), Err(ConfigError::InvalidParam));
    assert_eq!(store.set_rotate_cw(-10), Err(ConfigError::InvalidParam));
    assert_eq!(store.set_rotate_cw(361), Err(ConfigError::InvalidParam));
    assert_eq!(store.set_rotate_cw(360), Ok(()));

    assert_eq!(store.set_rotate_ccw(0), Err(ConfigError::InvalidParam));
    assert_eq!(store.set_rotate_ccw(10), Err(ConfigError::InvalidParam));
    assert_eq!(store.set_rotate_ccw(-361), Err(ConfigError::InvalidParam));
    assert_eq!(store.set_rotate_ccw(-360), Ok(()));
}

#[test]
fn interval_and_fade_boundaries() {
    let mut store = ConfigStore::new(MockEeprom::erased());
    assert_eq!(store.set_rotate_interval_ms(19), Err(ConfigError::InvalidParam));
    assert_eq!(store.set_rotate_interval_ms(20), Ok(()));
    assert_eq!(store.set_rotate_interval_ms(500), Ok(()));
    assert_eq!(store.set_rotate_interval_ms(501), Err(ConfigError::InvalidParam));

    assert_eq!(store.set_fade_duration_ms(99), Err(ConfigError::InvalidParam));
    assert_eq!(store.set_fade_duration_ms(100), Ok(()));
    assert_eq!(store.set_fade_duration_ms(300), Ok(()));
    assert_eq!(store.set_fade_duration_ms(301), Err(ConfigError::InvalidParam));
}

#[test]
fn one_bad_field_rejects_whole_record() {
    let mut stored = radial_dial::DeviceConfig::default();
    stored.led_count = 7;
    stored.effect_mode = 1;
    let mut eeprom = MockEeprom::new();
    eeprom.preload(0, &stored.encode());

    let mut store = ConfigStore::new(eeprom);
    assert_eq!(store.load(), Ok(LoadOutcome::Restored));
    assert_eq!(store.led_count(), 4);
    assert_eq!(store.effect_mode(), 0);
}

#[test]
fn unreadable_storage_fails_load() {
    let mut eeprom = MockEeprom::erased();
    eeprom.fail_reads = true;
    let mut store = ConfigStore::new(eeprom);
    assert_eq!(store.load(), Err(ConfigError::Storage));
}

#[test]
fn unwritable_storage_fails_recovery_and_save() {
    let mut eeprom = MockEeprom::erased();
    eeprom.fail_writes = true;
    let mut store = ConfigStore::new(eeprom);
    assert_eq!(store.load(), Err(ConfigError::Storage));
    // Defaults are still in memory
    assert_eq!(store.led_count(), 4);
    assert_eq!(store.save(), Err(ConfigError::Storage));
}

#[test]
fn older_version_record_is_restamped_on_save() {
    let mut stored = radial_dial::DeviceConfig::default();
    stored.version = 0;
    stored.revision = 9;
    let mut eeprom = MockEeprom::new();
    eeprom.preload(0, &stored.encode());

    let mut store = ConfigStore::new(eeprom);
    assert_eq!(store.load(), Ok(LoadOutcome::Loaded));
    assert_eq!(store.version(), 0);
    store.save().unwrap();
    assert_eq!(store.version(), radial_dial::config::FIRMWARE_VERSION);
    assert_eq!(store.storage().byte(1), radial_dial::config::FIRMWARE_REVISION);
}

// ============================================================================
// Console Edge Cases
// ============================================================================

#[test]
fn overlong_line_is_rejected_once() {
    let mut console = Console::new();
    let mut store = ConfigStore::new(MockEeprom::erased());
    let mut replies = Vec::new();

    let mut bytes = vec![b'x'; 200];
    bytes.extend_from_slice(b"\nshow_menu\n");
    console.feed(&bytes, &mut store, |_, r| replies.push(r.clone()));

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].as_str(), "error: line_too_long");
    assert!(replies[1].as_str().contains("get_config"));
}

#[test]
fn crlf_line_endings_do_not_double_execute() {
    let mut console = Console::new();
    let mut store = ConfigStore::new(MockEeprom::erased());
    let mut count = 0;
    console.feed(b"config_mode_enabled\r\n", &mut store, |_, _| count += 1);
    assert_eq!(count, 1);
    assert!(console.is_config_mode());
}

#[test]
fn numeric_overflow_is_bad_value() {
    let mut console = Console::new();
    let mut store = ConfigStore::new(MockEeprom::erased());
    console.execute("config_mode_enabled", &mut store);
    assert_eq!(console.execute("set_led_count=300", &mut store).as_str(), "error: bad_value");
    assert_eq!(console.execute("set_rotate_cw=abc", &mut store).as_str(), "error: bad_value");
    assert_eq!(store.led_count(), 4);
}

#[test]
fn leaving_config_mode_locks_setters() {
    let mut console = Console::new();
    let mut store = ConfigStore::new(MockEeprom::erased());
    console.execute("config_mode_enabled", &mut store);
    console.execute("config_mode_disabled", &mut store);
    assert_eq!(
        console.execute("set_brightness=1", &mut store).as_str(),
        "error: config_mode_disabled"
    );
    assert_eq!(store.brightness(), 2);
}
