/*
 *  display/components/indicators.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Playback progress bar and the menu scroll markers
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

use embedded_graphics::pixelcolor::Gray8;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, Triangle};

use crate::display::color::Color;
use crate::display::error::DisplayError;
use crate::display::traits::Surface;
use crate::snapshot::Snapshot;
use crate::vframebuf::Bitmap;

/// Elapsed over total time, redrawn every update.
///
/// Bars three or more pixels tall get a gray outline with the fill inset
/// by one pixel; thinner bars are a plain fill from the left edge.
#[derive(Debug)]
pub struct ProgressBar {
    rect: Rectangle,
    scratch: Option<Bitmap>,
}

impl ProgressBar {
    pub fn new(rect: Rectangle) -> Self {
        Self { rect, scratch: None }
    }

    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    /// Elapsed fraction in 0..=1; missing elapsed is 0, missing or
    /// non-positive duration is 1
    pub fn ratio(snapshot: &Snapshot) -> f32 {
        let elapsed = snapshot.number("elapsed").unwrap_or(0.0);
        let duration = snapshot
            .number("Time")
            .filter(|d| *d > 0.0)
            .unwrap_or(1.0);
        (elapsed / duration).clamp(0.0, 1.0)
    }

    /// Width of the filled part for a bar of this size
    pub fn fill_width(&self, ratio: f32) -> u32 {
        let Size { width, height } = self.rect.size;
        let track = if height >= 3 { width.saturating_sub(2) } else { width.saturating_sub(1) };
        (track as f32 * ratio) as u32
    }

    pub fn update(&mut self, snapshot: &Snapshot, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        let Size { width, height } = self.rect.size;
        if width == 0 || height == 0 {
            return Ok(());
        }
        let fill = self.fill_width(Self::ratio(snapshot));
        let bar = self.scratch.get_or_insert_with(|| Bitmap::new(width, height, Gray8::BLACK));
        bar.clear_color(Gray8::BLACK);

        // drawing into a VarFrameBuf cannot fail
        if height >= 3 {
            let _ = Rectangle::new(Point::zero(), self.rect.size)
                .into_styled(PrimitiveStyle::with_stroke(Color::Gray.to_gray8(), 1))
                .draw(bar);
            let _ = Rectangle::new(Point::new(1, 1), Size::new(fill, height - 2))
                .into_styled(PrimitiveStyle::with_fill(Gray8::WHITE))
                .draw(bar);
        } else {
            let _ = Rectangle::new(Point::zero(), Size::new(fill, height))
                .into_styled(PrimitiveStyle::with_fill(Gray8::WHITE))
                .draw(bar);
        }

        surface.write_region(self.rect.top_left.x, self.rect.top_left.y, bar)
    }

    pub fn reset(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerDirection {
    /// apex at the top, more entries above
    Up,
    /// apex at the bottom, more entries below
    Down,
}

/// Filled triangle shown while the bound key is non-empty
#[derive(Debug)]
pub struct SelectionMarker {
    tag: String,
    rect: Rectangle,
    direction: MarkerDirection,
    scratch: Option<Bitmap>,
}

impl SelectionMarker {
    pub fn new(tag: &str, rect: Rectangle, direction: MarkerDirection) -> Self {
        Self { tag: tag.to_string(), rect, direction, scratch: None }
    }

    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    pub fn update(&mut self, snapshot: &Snapshot, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        let Size { width, height } = self.rect.size;
        if width == 0 || height == 0 {
            return Ok(());
        }
        let marker = self.scratch.get_or_insert_with(|| Bitmap::new(width, height, Gray8::BLACK));
        marker.clear_color(Gray8::BLACK);

        if !snapshot.get(&self.tag).is_empty() {
            let (dx, dy) = (width as i32 - 1, height as i32 - 1);
            let triangle = match self.direction {
                MarkerDirection::Up => {
                    Triangle::new(Point::new(0, dy), Point::new(dx, dy), Point::new(dx / 2, 0))
                }
                MarkerDirection::Down => {
                    Triangle::new(Point::new(0, 0), Point::new(dx, 0), Point::new(dx / 2, dy))
                }
            };
            let _ = triangle
                .into_styled(PrimitiveStyle::with_fill(Gray8::WHITE))
                .draw(marker);
        }

        surface.write_region(self.rect.top_left.x, self.rect.top_left.y, marker)
    }

    pub fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::components::scrollers::area;
    use crate::display::drivers::mock::MockDriver;

    fn lit_in_row(surface: &MockDriver, y: i32, xs: std::ops::Range<i32>) -> usize {
        let fb = surface.framebuffer();
        xs.filter(|&x| fb.luma_at(x, y) == Some(255)).count()
    }

    #[test]
    fn test_quarter_progress_tall_bar() {
        let mut surface = MockDriver::new_with_size(128, 64);
        let mut bar = ProgressBar::new(area(0, 10, 100, 4));
        let snap: Snapshot = [("elapsed", "30"), ("Time", "120")].into_iter().collect();
        bar.update(&snap, &mut surface).unwrap();

        // interior row: 24 filled pixels starting at x = 1
        assert_eq!(bar.fill_width(ProgressBar::ratio(&snap)), 24);
        assert_eq!(lit_in_row(&surface, 11, 1..99), 24);
        assert_eq!(surface.framebuffer().luma_at(25, 11), Some(0));
        // outline is gray, at the mono threshold it shows
        assert_eq!(surface.framebuffer().luma_at(0, 10), Some(255));
    }

    #[test]
    fn test_thin_bar_plain_fill() {
        let mut surface = MockDriver::new_with_size(128, 64);
        let mut bar = ProgressBar::new(area(0, 0, 101, 1));
        let snap: Snapshot = [("elapsed", "60"), ("Time", "120")].into_iter().collect();
        bar.update(&snap, &mut surface).unwrap();
        assert_eq!(lit_in_row(&surface, 0, 0..101), 50);
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(ProgressBar::ratio(&Snapshot::new()), 0.0);
        let snap: Snapshot = [("elapsed", "0.5")].into_iter().collect();
        assert_eq!(ProgressBar::ratio(&snap), 0.5);
        let snap: Snapshot = [("elapsed", "5"), ("Time", "0")].into_iter().collect();
        assert_eq!(ProgressBar::ratio(&snap), 1.0);
    }

    #[test]
    fn test_progress_blits_every_call() {
        let mut surface = MockDriver::new_with_size(128, 64);
        let mut bar = ProgressBar::new(area(0, 0, 50, 2));
        let snap = Snapshot::new();
        bar.update(&snap, &mut surface).unwrap();
        bar.update(&snap, &mut surface).unwrap();
        assert_eq!(surface.state().lock().unwrap().blit_count, 2);
    }

    #[test]
    fn test_marker_directions() {
        let snap: Snapshot = [("MarkerTop", "1")].into_iter().collect();

        let mut surface = MockDriver::new_with_size(32, 16);
        let mut up = SelectionMarker::new("MarkerTop", area(0, 0, 13, 6), MarkerDirection::Up);
        up.update(&snap, &mut surface).unwrap();
        // apex up: bottom row wider than top row
        assert!(lit_in_row(&surface, 5, 0..13) > lit_in_row(&surface, 0, 0..13));
        assert_eq!(surface.framebuffer().luma_at(6, 0), Some(255));

        let mut surface = MockDriver::new_with_size(32, 16);
        let mut down = SelectionMarker::new("MarkerTop", area(0, 0, 13, 6), MarkerDirection::Down);
        down.update(&snap, &mut surface).unwrap();
        assert!(lit_in_row(&surface, 0, 0..13) > lit_in_row(&surface, 5, 0..13));
    }

    #[test]
    fn test_marker_hidden_when_empty() {
        let mut surface = MockDriver::new_with_size(32, 16);
        let mut marker = SelectionMarker::new("MarkerBottom", area(0, 0, 7, 3), MarkerDirection::Down);
        marker.update(&Snapshot::new(), &mut surface).unwrap();
        assert_eq!(surface.count_on_pixels(), 0);
        assert_eq!(surface.state().lock().unwrap().blit_count, 1);
    }
}
