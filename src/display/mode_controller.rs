/*
 *  display/mode_controller.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display mode controller - picks the active widget set and its cadence
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

use super::DisplayMode;
use std::time::Duration;

/// Refresh cadence per mode
#[derive(Debug, Clone)]
pub struct ModeControllerConfig {
    pub song_info_interval: Duration,
    pub idle_interval: Duration,
    pub volume_interval: Duration,
    pub menu_interval: Duration,
    pub cover_art_interval: Duration,
}

impl Default for ModeControllerConfig {
    fn default() -> Self {
        Self {
            song_info_interval: Duration::from_millis(100),
            idle_interval: Duration::from_millis(250),
            volume_interval: Duration::from_millis(50),
            menu_interval: Duration::from_millis(250),
            cover_art_interval: Duration::from_millis(250),
        }
    }
}

/// Everything the mode decision depends on, sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeInputs {
    /// transport state is "play"
    pub playing: bool,
    pub volume_active: bool,
    pub menu_open: bool,
    pub cover_art: bool,
}

/// Priority: CoverArt > Volume > Menu > SongInfo (playing) or Idle
pub fn resolve_mode(inputs: ModeInputs) -> DisplayMode {
    if inputs.cover_art {
        DisplayMode::CoverArt
    } else if inputs.volume_active {
        DisplayMode::Volume
    } else if inputs.menu_open {
        DisplayMode::Menu
    } else if inputs.playing {
        DisplayMode::SongInfo
    } else {
        DisplayMode::Idle
    }
}

/// Display mode controller - tracks the active mode and reports changes
pub struct DisplayModeController {
    config: ModeControllerConfig,
    current_mode: DisplayMode,
}

impl DisplayModeController {
    /// Create a new display mode controller, starting in `DisplayMode::None`
    pub fn new(config: ModeControllerConfig) -> Self {
        Self {
            config,
            current_mode: DisplayMode::None,
        }
    }

    /// Get current display mode
    pub fn current_mode(&self) -> DisplayMode {
        self.current_mode
    }

    /// Determine and update display mode from this tick's inputs
    /// Returns true if mode changed
    pub fn update_mode(&mut self, inputs: ModeInputs) -> bool {
        let new_mode = resolve_mode(inputs);

        if new_mode != self.current_mode {
            log::info!("Display mode changed: {:?} -> {:?}", self.current_mode, new_mode);
            self.current_mode = new_mode;
            true
        } else {
            false
        }
    }

    /// Time to wait before the next tick in the current mode
    pub fn cadence(&self) -> Duration {
        match self.current_mode {
            DisplayMode::SongInfo => self.config.song_info_interval,
            DisplayMode::Volume => self.config.volume_interval,
            DisplayMode::Menu => self.config.menu_interval,
            DisplayMode::CoverArt => self.config.cover_art_interval,
            DisplayMode::Idle | DisplayMode::None => self.config.idle_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_priority() {
        let all = ModeInputs { playing: true, volume_active: true, menu_open: true, cover_art: true };
        assert_eq!(resolve_mode(all), DisplayMode::CoverArt);

        let no_art = ModeInputs { cover_art: false, ..all };
        assert_eq!(resolve_mode(no_art), DisplayMode::Volume);

        let menu = ModeInputs { volume_active: false, ..no_art };
        assert_eq!(resolve_mode(menu), DisplayMode::Menu);

        let playing = ModeInputs { menu_open: false, ..menu };
        assert_eq!(resolve_mode(playing), DisplayMode::SongInfo);

        assert_eq!(resolve_mode(ModeInputs::default()), DisplayMode::Idle);
    }

    #[test]
    fn test_mode_change_detection() {
        let mut controller = DisplayModeController::new(ModeControllerConfig::default());
        assert_eq!(controller.current_mode(), DisplayMode::None);

        // first tick always leaves None
        assert!(controller.update_mode(ModeInputs::default()));
        assert_eq!(controller.current_mode(), DisplayMode::Idle);
        assert!(!controller.update_mode(ModeInputs::default()));

        let playing = ModeInputs { playing: true, ..Default::default() };
        assert!(controller.update_mode(playing));
        assert_eq!(controller.current_mode(), DisplayMode::SongInfo);
        assert!(!controller.update_mode(playing));
    }

    #[test]
    fn test_cadence_per_mode() {
        let mut controller = DisplayModeController::new(ModeControllerConfig::default());
        controller.update_mode(ModeInputs { playing: true, ..Default::default() });
        assert_eq!(controller.cadence(), Duration::from_millis(100));
        controller.update_mode(ModeInputs { volume_active: true, ..Default::default() });
        assert_eq!(controller.cadence(), Duration::from_millis(50));
        controller.update_mode(ModeInputs { menu_open: true, ..Default::default() });
        assert_eq!(controller.cadence(), Duration::from_millis(250));
        controller.update_mode(ModeInputs::default());
        assert_eq!(controller.cadence(), Duration::from_millis(250));
    }
}
