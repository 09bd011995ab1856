/*
 *  config.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, command line
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::metrics::THERMAL_ZONE0;
use crate::services::menu::is_known_action;
use crate::services::MenuItem;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// one entry per attached panel, all driven from the same state
    pub displays: Option<Vec<DisplayConfig>>,
    pub buttons: Option<ButtonConfig>,
    /// local menu entries
    pub menu: Option<Vec<MenuItem>>,
    pub cover_art_timeout_ms: Option<u64>,
    pub thermal_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rotate_deg: Option<u16>,
    pub brightness: Option<u8>,     // 0-255
    pub grayscale: Option<bool>,    // headless only, 4bpp instead of 1bpp
    pub driver: Option<DriverKind>, // <- strongly-typed driver selection
    pub bus: Option<BusConfig>,     // <- i2c wiring
}

/// GPIO wiring for the three front panel buttons
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ButtonConfig {
    pub enabled: Option<bool>,
    pub chip: Option<String>,       // e.g. "/dev/gpiochip0"
    pub prev: Option<u32>,          // line offsets on the chip
    pub next: Option<u32>,
    pub play: Option<u32>,
    pub active_low: Option<bool>,
    pub debounce_ms: Option<u64>,
    pub poll_us: Option<u64>,
}

impl ButtonConfig {
    pub fn enabled(&self) -> bool { self.enabled.unwrap_or(true) }
    pub fn chip(&self) -> &str { self.chip.as_deref().unwrap_or("/dev/gpiochip0") }
    /// prev, next, play
    pub fn lines(&self) -> [u32; 3] {
        [self.prev.unwrap_or(0), self.next.unwrap_or(3), self.play.unwrap_or(2)]
    }
    pub fn active_low(&self) -> bool { self.active_low.unwrap_or(false) }
    pub fn debounce(&self) -> Duration { Duration::from_millis(self.debounce_ms.unwrap_or(10)) }
    pub fn poll_interval(&self) -> Duration { Duration::from_micros(self.poll_us.unwrap_or(500)) }
}

impl Config {
    /// Displays to drive; a lone SSD1306 on /dev/i2c-1 when none configured
    pub fn displays(&self) -> Vec<DisplayConfig> {
        match self.displays.as_ref() {
            Some(list) if !list.is_empty() => list.clone(),
            _ => vec![DisplayConfig {
                driver: Some(DriverKind::Ssd1306),
                bus: Some(BusConfig::I2c { bus: "/dev/i2c-1".to_string(), address: 0x3C }),
                ..Default::default()
            }],
        }
    }

    pub fn buttons(&self) -> ButtonConfig {
        self.buttons.clone().unwrap_or_default()
    }

    pub fn cover_art_timeout(&self) -> Duration {
        Duration::from_millis(self.cover_art_timeout_ms.unwrap_or(2000))
    }

    pub fn thermal_path(&self) -> PathBuf {
        self.thermal_path.clone().unwrap_or_else(|| PathBuf::from(THERMAL_ZONE0))
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "mpdgui", about = "Music player display", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// shorthand for --log-level debug
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// drive a headless surface instead of the configured panel
    #[arg(long, action = ArgAction::SetTrue)]
    pub headless: bool,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub display_rotate_deg: Option<u16>,
    /// ignore the GPIO buttons
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_buttons: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Layer the YAML file and `cli` over the defaults.
pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/mpdgui/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/mpdgui/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/mpdgui.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["mpdgui.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()            { dst.log_level = src.log_level; }
    if src.displays.is_some()             { dst.displays = src.displays; }
    if src.menu.is_some()                 { dst.menu = src.menu; }
    if src.cover_art_timeout_ms.is_some() { dst.cover_art_timeout_ms = src.cover_art_timeout_ms; }
    if src.thermal_path.is_some()         { dst.thermal_path = src.thermal_path; }
    match (&mut dst.buttons, src.buttons) {
        (None, Some(b)) => dst.buttons = Some(b),
        (Some(d), Some(s)) => merge_buttons(d, s),
        _ => {}
    }
}

fn merge_buttons(dst: &mut ButtonConfig, src: ButtonConfig) {
    if src.enabled.is_some()     { dst.enabled = src.enabled; }
    if src.chip.is_some()        { dst.chip = src.chip; }
    if src.prev.is_some()        { dst.prev = src.prev; }
    if src.next.is_some()        { dst.next = src.next; }
    if src.play.is_some()        { dst.play = src.play; }
    if src.active_low.is_some()  { dst.active_low = src.active_low; }
    if src.debounce_ms.is_some() { dst.debounce_ms = src.debounce_ms; }
    if src.poll_us.is_some()     { dst.poll_us = src.poll_us; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.debug               { cfg.log_level = Some("debug".to_string()); }
    if cli.no_buttons {
        cfg.buttons.get_or_insert_with(ButtonConfig::default).enabled = Some(false);
    }

    let any_case = cli.headless
        || cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.display_rotate_deg.is_some();
    if !any_case {
        return;
    }

    // overrides land on the first panel
    let mut displays = cfg.displays();
    if let Some(display) = displays.first_mut() {
        if cli.headless {
            display.driver = Some(DriverKind::Headless);
            display.bus = None;
        }
        if cli.display_width.is_some()       { display.width = cli.display_width; }
        if cli.display_height.is_some()      { display.height = cli.display_height; }
        if cli.display_rotate_deg.is_some()  { display.rotate_deg = cli.display_rotate_deg; }
    }
    cfg.displays = Some(displays);
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    for display in cfg.displays() {
        if let (Some(w), Some(h)) = (display.width, display.height) {
            if w == 0 || h == 0 {
                return Err(ConfigError::Validation("display width/height must be > 0".into()));
            }
        }
        if let Some(rot) = display.rotate_deg {
            match rot {
                0 | 90 | 180 | 270 => {},
                _ => return Err(ConfigError::Validation("display rotate_deg must be 0|90|180|270".into()))
            }
        }
        if matches!(display.driver, Some(DriverKind::Ssd1306)) && display.bus.is_none() {
            return Err(ConfigError::Validation("ssd1306 display needs an i2c bus".into()));
        }
    }
    let buttons = cfg.buttons();
    let [prev, next, play] = buttons.lines();
    if prev == next || prev == play || next == play {
        return Err(ConfigError::Validation("button lines must be distinct".into()));
    }
    if cfg.cover_art_timeout_ms == Some(0) {
        return Err(ConfigError::Validation("cover_art_timeout_ms must be > 0".into()));
    }
    for item in cfg.menu.iter().flatten() {
        if !is_known_action(&item.action) {
            return Err(ConfigError::Validation(format!(
                "menu entry '{}' has unknown action '{}'", item.label, item.action
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    I2c {
        bus: String,        // e.g. "/dev/i2c-1"
        address: u8,        // e.g. 0x3C (I2C addresses are 7-bit, stored in u8)
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Ssd1306,
    Headless,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
log_level: info
displays:
  - driver: ssd1306
    width: 128
    height: 32
    bus:
      type: i2c
      bus: /dev/i2c-0
      address: 61
  - driver: headless
    width: 240
    height: 240
    grayscale: true
buttons:
  active_low: true
  debounce_ms: 20
menu:
  - label: Cover art
    action: coverart
cover_art_timeout_ms: 1500
"#;

    #[test]
    fn test_parse_yaml() {
        let cfg = parse_yaml(SAMPLE).unwrap();
        let displays = cfg.displays();
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].bus, Some(BusConfig::I2c { bus: "/dev/i2c-0".into(), address: 0x3D }));
        assert_eq!(displays[1].driver, Some(DriverKind::Headless));
        assert_eq!(cfg.buttons().debounce(), Duration::from_millis(20));
        assert!(cfg.buttons().active_low());
        assert_eq!(cfg.buttons().lines(), [0, 3, 2]);
        assert_eq!(cfg.cover_art_timeout(), Duration::from_millis(1500));
        assert_eq!(cfg.menu.as_ref().map(|m| m.len()), Some(1));
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.displays().len(), 1);
        assert_eq!(cfg.displays()[0].driver, Some(DriverKind::Ssd1306));
        assert_eq!(cfg.buttons().chip(), "/dev/gpiochip0");
        assert_eq!(cfg.buttons().poll_interval(), Duration::from_micros(500));
        assert_eq!(cfg.cover_art_timeout(), Duration::from_secs(2));
        assert_eq!(cfg.thermal_path(), PathBuf::from(THERMAL_ZONE0));
    }

    #[test]
    fn test_merge_buttons_field_by_field() {
        let mut cfg = Config {
            buttons: Some(ButtonConfig { chip: Some("/dev/gpiochip1".into()), ..Default::default() }),
            ..Default::default()
        };
        merge(&mut cfg, Config {
            buttons: Some(ButtonConfig { play: Some(7), ..Default::default() }),
            ..Default::default()
        });
        assert_eq!(cfg.buttons().chip(), "/dev/gpiochip1");
        assert_eq!(cfg.buttons().lines(), [0, 3, 7]);
    }

    #[test]
    fn test_cli_overrides() {
        let mut cfg = parse_yaml(SAMPLE).unwrap();
        let cli = Cli {
            headless: true,
            display_width: Some(256),
            display_height: Some(64),
            no_buttons: true,
            debug: true,
            ..Default::default()
        };
        apply_cli_overrides(&mut cfg, &cli);
        let first = &cfg.displays()[0];
        assert_eq!(first.driver, Some(DriverKind::Headless));
        assert_eq!(first.bus, None);
        assert_eq!((first.width, first.height), (Some(256), Some(64)));
        assert!(!cfg.buttons().enabled());
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = Config {
            displays: Some(vec![DisplayConfig { driver: Some(DriverKind::Headless), rotate_deg: Some(45), ..Default::default() }]),
            ..Default::default()
        };
        assert!(validate(&cfg).is_err());

        let cfg = Config {
            displays: Some(vec![DisplayConfig { driver: Some(DriverKind::Ssd1306), ..Default::default() }]),
            ..Default::default()
        };
        assert!(validate(&cfg).is_err());

        let cfg = Config {
            buttons: Some(ButtonConfig { next: Some(0), ..Default::default() }),
            ..Default::default()
        };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_validate_menu_actions() {
        let mut cfg = parse_yaml(SAMPLE).unwrap();
        assert!(validate(&cfg).is_ok());

        cfg.menu = Some(vec![MenuItem::new("Next", "next"), MenuItem::new("Quieter", "volume-")]);
        assert!(validate(&cfg).is_ok());

        cfg.menu = Some(vec![MenuItem::new("Shuffle", "shuffle")]);
        match validate(&cfg) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("'shuffle'"), "{}", msg),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_explicit_file() {
        let cli = Cli { config: Some(PathBuf::from("/nonexistent/mpdgui.yaml")), ..Default::default() };
        assert!(matches!(load_with(&cli), Err(ConfigError::Validation(_))));
    }
}
