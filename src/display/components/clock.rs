/*
 *  display/components/clock.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Clock, date and CPU temperature readouts
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

use std::fmt::Write;
use std::path::PathBuf;

use arrayvec::ArrayString;
use chrono::{Datelike, Local, Timelike};
use embedded_graphics::primitives::Rectangle;

use crate::display::color::Color;
use crate::display::components::scrollers::{Align, TextPainter, TextStyle};
use crate::display::error::DisplayError;
use crate::display::font::MonoFontRenderer;
use crate::display::traits::Surface;
use crate::metrics;

/// Widest string the clock can show, used to size its face
pub const CLOCK_SAMPLE: &str = "88:88";

/// "HH:MM", the colon blanked on odd seconds
pub fn clock_text<T: Timelike>(t: &T) -> ArrayString<8> {
    let mut s = ArrayString::new();
    let sep = if t.second() % 2 == 1 { ' ' } else { ':' };
    let _ = write!(s, "{:02}{}{:02}", t.hour(), sep, t.minute());
    s
}

/// "YYYY/MM/DD"
pub fn date_text<D: Datelike>(d: &D) -> ArrayString<16> {
    let mut s = ArrayString::new();
    let _ = write!(s, "{:04}/{:02}/{:02}", d.year(), d.month(), d.day());
    s
}

/// Local time, centered in its box, redrawn when the string changes
#[derive(Debug)]
pub struct ClockLabel {
    painter: TextPainter,
    shown: Option<ArrayString<8>>,
}

impl ClockLabel {
    pub fn new(rect: Rectangle, font: MonoFontRenderer) -> Self {
        Self {
            painter: TextPainter::new(rect).with_font(font).centered_vertically(),
            shown: None,
        }
    }

    pub fn rect(&self) -> Rectangle {
        self.painter.rect()
    }

    pub fn update(&mut self, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        self.show(clock_text(&Local::now()), surface)
    }

    fn show(&mut self, text: ArrayString<8>, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        if self.shown == Some(text) {
            return Ok(());
        }
        let style = TextStyle { color: Color::White, align: Align::Center, highlight: false };
        self.painter.paint(&text, style, surface)?;
        self.shown = Some(text);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.shown = None;
        self.painter.reset();
    }
}

/// Local date, redrawn when the string changes
#[derive(Debug)]
pub struct DateLabel {
    painter: TextPainter,
    shown: Option<ArrayString<16>>,
}

impl DateLabel {
    pub fn new(rect: Rectangle) -> Self {
        Self { painter: TextPainter::new(rect).centered_vertically(), shown: None }
    }

    pub fn rect(&self) -> Rectangle {
        self.painter.rect()
    }

    pub fn update(&mut self, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        let text = date_text(&Local::now());
        if self.shown != Some(text) {
            let style = TextStyle { color: Color::White, align: Align::Left, highlight: false };
            self.painter.paint(&text, style, surface)?;
            self.shown = Some(text);
        }
        self.painter.scroll(surface)
    }

    pub fn reset(&mut self) {
        self.shown = None;
        self.painter.reset();
    }
}

/// Sensor reading formatted as "cpu 48.3 C"
pub fn cpu_temp_text(celsius: Option<f32>) -> ArrayString<16> {
    let mut s = ArrayString::new();
    let _ = match celsius {
        Some(t) => write!(s, "cpu {:.1} C", t),
        None => write!(s, "cpu --.- C"),
    };
    s
}

/// CPU temperature; the sensor is read and the box redrawn on every call
#[derive(Debug)]
pub struct CpuTemperatureLabel {
    path: PathBuf,
    align: Align,
    painter: TextPainter,
}

impl CpuTemperatureLabel {
    pub fn new(rect: Rectangle, path: PathBuf) -> Self {
        Self { path, align: Align::Left, painter: TextPainter::new(rect) }
    }

    pub fn right_aligned(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    pub fn rect(&self) -> Rectangle {
        self.painter.rect()
    }

    pub fn update(&mut self, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        let text = cpu_temp_text(metrics::cpu_temp_celsius(&self.path).ok());
        let style = TextStyle { color: Color::White, align: self.align, highlight: false };
        self.painter.paint(&text, style, surface)?;
        self.painter.scroll(surface)
    }

    pub fn reset(&mut self) {
        self.painter.reset();
    }
}
