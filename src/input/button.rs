/*
 *  input/button.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Front panel buttons and the gestures they produce
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

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Prev,
    Next,
    Play,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Prev, Button::Next, Button::Play];

    /// Slot in per-button arrays
    pub fn index(self) -> usize {
        match self {
            Button::Prev => 0,
            Button::Next => 1,
            Button::Play => 2,
        }
    }

    /// Hold time that turns a press into a long press
    pub fn long_press_threshold(self) -> Duration {
        match self {
            Button::Prev | Button::Next => Duration::from_millis(300),
            Button::Play => Duration::from_millis(1000),
        }
    }
}

/// What the render loop is told about a completed or held press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    ShortPress(Button),
    LongPress(Button),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_cover_all() {
        let idx: Vec<usize> = Button::ALL.iter().map(|b| b.index()).collect();
        assert_eq!(idx, [0, 1, 2]);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(Button::Prev.long_press_threshold(), Duration::from_millis(300));
        assert_eq!(Button::Next.long_press_threshold(), Duration::from_millis(300));
        assert_eq!(Button::Play.long_press_threshold(), Duration::from_secs(1));
    }
}
