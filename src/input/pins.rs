/*
 *  input/pins.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Button level sources: GPIO character device lines or virtual pins
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

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use linux_embedded_hal::gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use log::info;

use super::button::Button;
use super::InputError;

const CONSUMER: &str = "mpdgui";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl From<u8> for Level {
    fn from(value: u8) -> Self {
        if value == 0 { Level::Low } else { Level::High }
    }
}

/// Anything that can report the raw level of a button line
pub trait PinSource: Send {
    fn level(&mut self, button: Button) -> Result<Level, InputError>;
}

/// Three input lines requested from a gpiochip
pub struct GpioPins {
    lines: [LineHandle; 3],
}

impl GpioPins {
    /// Request `offsets` (prev, next, play) as inputs on `chip`
    pub fn open(chip: &Path, offsets: [u32; 3]) -> Result<Self, InputError> {
        let mut chip = Chip::new(chip)?;
        let mut request = |offset: u32| -> Result<LineHandle, InputError> {
            let line = chip.get_line(offset)?;
            Ok(line.request(LineRequestFlags::INPUT, 0, CONSUMER)?)
        };
        let lines = [request(offsets[0])?, request(offsets[1])?, request(offsets[2])?];
        info!("Buttons on lines prev {} next {} play {}", offsets[0], offsets[1], offsets[2]);
        Ok(Self { lines })
    }
}

impl PinSource for GpioPins {
    fn level(&mut self, button: Button) -> Result<Level, InputError> {
        Ok(Level::from(self.lines[button.index()].get_value()?))
    }
}

/// In-memory pins, driven by tests or when no GPIO is configured
#[derive(Debug, Clone, Default)]
pub struct VirtualPins(Arc<Mutex<[Level; 3]>>);

impl VirtualPins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, button: Button, level: Level) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)[button.index()] = level;
    }

    /// Drive the line high, i.e. pressed on active-high wiring
    pub fn press(&self, button: Button) {
        self.set(button, Level::High);
    }

    pub fn release(&self, button: Button) {
        self.set(button, Level::Low);
    }
}

impl PinSource for VirtualPins {
    fn level(&mut self, button: Button) -> Result<Level, InputError> {
        Ok(self.0.lock().unwrap_or_else(PoisonError::into_inner)[button.index()])
    }
}
