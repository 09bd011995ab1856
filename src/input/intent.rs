/*
 *  input/intent.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Button intent state shared by the input poller and the render loop
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

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::button::Button;

/// One button as the application sees it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonIntent {
    pub held: bool,
    pub pressed_at: Option<Instant>,
    /// a long press already fired for the current press
    pub consumed: bool,
}

impl ButtonIntent {
    /// How long the button has been down, None when released
    pub fn held_for(&self, now: Instant) -> Option<Duration> {
        match (self.held, self.pressed_at) {
            (true, Some(t)) => Some(now.saturating_duration_since(t)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentState {
    pub buttons: [ButtonIntent; 3],
    pub volume_active: bool,
    pub menu_open: bool,
    pub cover_art: bool,
}

impl IntentState {
    pub fn button(&self, button: Button) -> &ButtonIntent {
        &self.buttons[button.index()]
    }

    pub fn button_mut(&mut self, button: Button) -> &mut ButtonIntent {
        &mut self.buttons[button.index()]
    }

    /// +1 while Next is held, -1 while Prev is held
    pub fn volume_delta(&self) -> i32 {
        i32::from(self.button(Button::Next).held) - i32::from(self.button(Button::Prev).held)
    }
}

/// Cloneable handle to the one lock guarding the intent state
#[derive(Debug, Clone, Default)]
pub struct IntentHandle(Arc<Mutex<IntentState>>);

impl IntentHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent copy of the whole state
    pub fn snapshot(&self) -> IntentState {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Mutate under the lock
    pub fn update<R>(&self, f: impl FnOnce(&mut IntentState) -> R) -> R {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}
