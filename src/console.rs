//! Line-oriented configuration console carried over the CDC serial port.
//!
//! # Protocol
//!
//! One ASCII command per line (`\n`, `\r` or `\r\n` terminated):
//!
//! | Command | Reply | Needs config mode |
//! |---------|-------|-------------------|
//! | `config_mode_enabled` | `config_mode_enabled_success` | - |
//! | `config_mode_disabled` | `config_mode_disabled_success` | - |
//! | `get_config` | one `key=value` line per field | no |
//! | `show_menu` | command list | no |
//! | `set_<key>=<value>` | `ok` / `error: <reason>` | yes |
//! | `save_config` | `ok` / `error: <reason>` | yes |
//! | `reset_config` | `ok` / `error: <reason>` | yes |
//!
//! Settings go through the validated [`ConfigStore`] setters and are only
//! persisted by `save_config`.
//!
//! # Example
//!
//! ```rust
//! use radial_dial::config::ConfigStore;
//! use radial_dial::console::Console;
//! use radial_dial::hal::MockEeprom;
//!
//! let mut store = ConfigStore::new(MockEeprom::new());
//! let mut console = Console::new();
//!
//! let reply = console.execute("set_brightness=3", &mut store);
//! assert_eq!(reply.as_str(), "error: config_mode_disabled");
//! let reply = console.execute("config_mode_enabled", &mut store);
//! assert_eq!(reply.as_str(), "config_mode_enabled_success");
//! assert_eq!(console.execute("set_brightness=3", &mut store).as_str(), "ok");
//! assert_eq!(store.brightness(), 3);
//! ```

use core::fmt::{self, Write};

use heapless::String;

use crate::config::{ConfigError, ConfigStore};
use crate::traits::ConfigStorage;

/// Longest accepted command line.
pub const LINE_CAPACITY: usize = 64;
/// Largest reply.
pub const REPLY_CAPACITY: usize = 512;

/// A console reply.
pub type Reply = String<REPLY_CAPACITY>;

const MENU: &str = "commands:\n\
config_mode_enabled\n\
config_mode_disabled\n\
get_config\n\
show_menu\n\
set_<key>=<value>\n\
save_config\n\
reset_config\n\
keys: led_count color_order brightness effect_mode rotate_interval \
fade_duration rotate_cw rotate_ccw step_per_teeth phase";

// ============================================================================
// Commands
// ============================================================================

/// A settable config field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    /// `led_count`
    LedCount,
    /// `color_order`
    ColorOrder,
    /// `brightness`
    Brightness,
    /// `effect_mode`
    EffectMode,
    /// `rotate_interval`
    RotateInterval,
    /// `fade_duration`
    FadeDuration,
    /// `rotate_cw`
    RotateCw,
    /// `rotate_ccw`
    RotateCcw,
    /// `step_per_teeth`
    StepPerTeeth,
    /// `phase`
    Phase,
}

impl ConfigKey {
    /// Every key, in `get_config` order.
    pub const ALL: [ConfigKey; 10] = [
        ConfigKey::LedCount,
        ConfigKey::ColorOrder,
        ConfigKey::Brightness,
        ConfigKey::EffectMode,
        ConfigKey::RotateInterval,
        ConfigKey::FadeDuration,
        ConfigKey::RotateCw,
        ConfigKey::RotateCcw,
        ConfigKey::StepPerTeeth,
        ConfigKey::Phase,
    ];

    /// Wire name of the key.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::LedCount => "led_count",
            ConfigKey::ColorOrder => "color_order",
            ConfigKey::Brightness => "brightness",
            ConfigKey::EffectMode => "effect_mode",
            ConfigKey::RotateInterval => "rotate_interval",
            ConfigKey::FadeDuration => "fade_duration",
            ConfigKey::RotateCw => "rotate_cw",
            ConfigKey::RotateCcw => "rotate_ccw",
            ConfigKey::StepPerTeeth => "step_per_teeth",
            ConfigKey::Phase => "phase",
        }
    }

    /// Look a key up by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

/// A parsed console command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// Enter config mode.
    EnableConfigMode,
    /// Leave config mode.
    DisableConfigMode,
    /// Dump every field.
    GetConfig,
    /// List commands.
    ShowMenu,
    /// Change one field in memory.
    Set {
        /// Field to change.
        key: ConfigKey,
        /// Unparsed value text.
        value: &'a str,
    },
    /// Persist the in-memory config.
    Save,
    /// Restore and persist defaults.
    Reset,
}

impl Command<'_> {
    /// True for commands that change the config.
    pub const fn is_mutating(&self) -> bool {
        matches!(self, Command::Set { .. } | Command::Save | Command::Reset)
    }
}

/// Why a console command failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleError {
    /// The line is not a known command.
    UnknownCommand,
    /// `set_` with an unknown key.
    UnknownKey,
    /// The value is not a number of the right type.
    BadValue,
    /// A mutating command outside config mode.
    ConfigModeDisabled,
    /// The line exceeded [`LINE_CAPACITY`].
    LineTooLong,
    /// The config store rejected the request.
    Config(ConfigError),
}

impl ConsoleError {
    /// Reason text sent after `error: `.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConsoleError::UnknownCommand => "unknown_command",
            ConsoleError::UnknownKey => "unknown_key",
            ConsoleError::BadValue => "bad_value",
            ConsoleError::ConfigModeDisabled => "config_mode_disabled",
            ConsoleError::LineTooLong => "line_too_long",
            ConsoleError::Config(e) => e.as_str(),
        }
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ConfigError> for ConsoleError {
    fn from(e: ConfigError) -> Self {
        ConsoleError::Config(e)
    }
}

/// Parse one command line (surrounding whitespace ignored).
///
/// ```
/// use radial_dial::console::{parse_command, Command, ConfigKey, ConsoleError};
///
/// assert_eq!(parse_command("get_config"), Ok(Command::GetConfig));
/// assert_eq!(
///     parse_command("set_rotate_cw=45"),
///     Ok(Command::Set { key: ConfigKey::RotateCw, value: "45" })
/// );
/// assert_eq!(parse_command("set_volume=3"), Err(ConsoleError::UnknownKey));
/// ```
pub fn parse_command(line: &str) -> Result<Command<'_>, ConsoleError> {
    let line = line.trim();
    match line {
        "config_mode_enabled" => return Ok(Command::EnableConfigMode),
        "config_mode_disabled" => return Ok(Command::DisableConfigMode),
        "get_config" => return Ok(Command::GetConfig),
        "show_menu" => return Ok(Command::ShowMenu),
        "save_config" => return Ok(Command::Save),
        "reset_config" => return Ok(Command::Reset),
        _ => {}
    }

    let assignment = line
        .strip_prefix("set_")
        .ok_or(ConsoleError::UnknownCommand)?;
    let (name, value) = assignment
        .split_once('=')
        .ok_or(ConsoleError::UnknownCommand)?;
    let key = ConfigKey::parse(name.trim()).ok_or(ConsoleError::UnknownKey)?;
    Ok(Command::Set {
        key,
        value: value.trim(),
    })
}

fn parse_value<T: core::str::FromStr>(text: &str) -> Result<T, ConsoleError> {
    text.parse().map_err(|_| ConsoleError::BadValue)
}

fn apply_set<S: ConfigStorage>(
    store: &mut ConfigStore<S>,
    key: ConfigKey,
    value: &str,
) -> Result<(), ConsoleError> {
    match key {
        ConfigKey::LedCount => store.set_led_count(parse_value(value)?)?,
        ConfigKey::ColorOrder => store.set_color_order(parse_value(value)?)?,
        ConfigKey::Brightness => store.set_brightness(parse_value(value)?)?,
        ConfigKey::EffectMode => store.set_effect_mode(parse_value(value)?)?,
        ConfigKey::RotateInterval => store.set_rotate_interval_ms(parse_value(value)?)?,
        ConfigKey::FadeDuration => store.set_fade_duration_ms(parse_value(value)?)?,
        ConfigKey::RotateCw => store.set_rotate_cw(parse_value(value)?)?,
        ConfigKey::RotateCcw => store.set_rotate_ccw(parse_value(value)?)?,
        ConfigKey::StepPerTeeth => store.set_step_per_teeth(parse_value(value)?)?,
        ConfigKey::Phase => store.set_phase(parse_value(value)?)?,
    }
    Ok(())
}

fn write_config<S: ConfigStorage>(out: &mut Reply, store: &ConfigStore<S>) -> fmt::Result {
    writeln!(out, "version={}", store.version())?;
    writeln!(out, "revision={}", store.revision())?;
    for key in ConfigKey::ALL {
        write!(out, "{}=", key.as_str())?;
        match key {
            ConfigKey::LedCount => write!(out, "{}", store.led_count())?,
            ConfigKey::ColorOrder => write!(out, "{}", store.color_order() as u8)?,
            ConfigKey::Brightness => write!(out, "{}", store.brightness())?,
            ConfigKey::EffectMode => write!(out, "{}", store.effect_mode())?,
            ConfigKey::RotateInterval => write!(out, "{}", store.rotate_interval_ms())?,
            ConfigKey::FadeDuration => write!(out, "{}", store.fade_duration_ms())?,
            ConfigKey::RotateCw => write!(out, "{}", store.rotate_cw())?,
            ConfigKey::RotateCcw => write!(out, "{}", store.rotate_ccw())?,
            ConfigKey::StepPerTeeth => write!(out, "{}", store.step_per_teeth() as u8)?,
            ConfigKey::Phase => write!(out, "{}", store.phase() as u8)?,
        }
        if key != ConfigKey::Phase {
            out.push('\n').map_err(|_| fmt::Error)?;
        }
    }
    Ok(())
}

fn text(s: &str) -> Reply {
    let mut reply = Reply::new();
    for c in s.chars() {
        if reply.push(c).is_err() {
            break;
        }
    }
    reply
}

fn error_reply(error: ConsoleError) -> Reply {
    let mut reply = Reply::new();
    // Reasons are short; cannot overflow
    let _ = write!(reply, "error: {}", error);
    reply
}

// ============================================================================
// Console
// ============================================================================

/// Console session state: config mode and the partially received line.
#[derive(Debug, Default)]
pub struct Console {
    config_mode: bool,
    line: String<LINE_CAPACITY>,
    overflow: bool,
}

impl Console {
    /// A console outside config mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `config_mode_enabled` was received.
    pub fn is_config_mode(&self) -> bool {
        self.config_mode
    }

    /// Run one complete command line and produce its reply.
    pub fn execute<S: ConfigStorage>(&mut self, line: &str, store: &mut ConfigStore<S>) -> Reply {
        match self.run(line, store) {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("console: '{}' rejected: {}", line.trim(), e);
                error_reply(e)
            }
        }
    }

    fn run<S: ConfigStorage>(
        &mut self,
        line: &str,
        store: &mut ConfigStore<S>,
    ) -> Result<Reply, ConsoleError> {
        let command = parse_command(line)?;
        if command.is_mutating() && !self.config_mode {
            return Err(ConsoleError::ConfigModeDisabled);
        }

        match command {
            Command::EnableConfigMode => {
                self.config_mode = true;
                log::info!("console: config mode enabled");
                Ok(text("config_mode_enabled_success"))
            }
            Command::DisableConfigMode => {
                self.config_mode = false;
                log::info!("console: config mode disabled");
                Ok(text("config_mode_disabled_success"))
            }
            Command::GetConfig => {
                let mut reply = Reply::new();
                write_config(&mut reply, store).map_err(|_| ConsoleError::LineTooLong)?;
                Ok(reply)
            }
            Command::ShowMenu => Ok(text(MENU)),
            Command::Set { key, value } => {
                apply_set(store, key, value)?;
                log::debug!("console: {} = {}", key.as_str(), value);
                Ok(text("ok"))
            }
            Command::Save => {
                store.save()?;
                Ok(text("ok"))
            }
            Command::Reset => {
                store.reset();
                store.save()?;
                Ok(text("ok"))
            }
        }
    }

    /// Feed received serial bytes; `on_reply` is called once per completed
    /// line with the line and its reply. Blank lines are skipped.
    pub fn feed<S: ConfigStorage>(
        &mut self,
        bytes: &[u8],
        store: &mut ConfigStore<S>,
        mut on_reply: impl FnMut(&str, &Reply),
    ) {
        for &byte in bytes {
            match byte {
                b'\r' | b'\n' => {
                    let line = core::mem::take(&mut self.line);
                    if core::mem::take(&mut self.overflow) {
                        on_reply(&line, &error_reply(ConsoleError::LineTooLong));
                    } else if !line.trim().is_empty() {
                        let reply = self.execute(&line, store);
                        on_reply(&line, &reply);
                    }
                }
                _ if self.overflow => {}
                _ => {
                    // Non-ASCII bytes can never form a command
                    let c = if byte.is_ascii() { byte as char } else { '?' };
                    if self.line.push(c).is_err() {
                        self.overflow = true;
                    }
                }
            }
        }
    }
}
