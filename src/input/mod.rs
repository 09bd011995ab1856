/*
 *  input/mod.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Button input subsystem
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

pub mod button;
pub mod intent;
pub mod pins;
pub mod controller;

use thiserror::Error;

pub use button::{Button, Gesture};
pub use intent::{ButtonIntent, IntentHandle, IntentState};
pub use pins::{GpioPins, Level, PinSource, VirtualPins};
pub use controller::{InputController, InputHandle};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] linux_embedded_hal::gpio_cdev::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
