/*
 *  display/components/scrollers.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Marquee scrolling and the shared text painter used by every label
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
use embedded_graphics::primitives::Rectangle;

use crate::display::color::Color;
use crate::display::error::DisplayError;
use crate::display::font::{FontRenderer, MonoFontRenderer};
use crate::display::traits::Surface;
use crate::vframebuf::Bitmap;

/// Horizontal scroll state for content wider than its box.
///
/// Restarting parks the content at the left edge and sets the offset to
/// the box width; each tick draws at `min(offset, 0)` and then steps the
/// offset left, so the text rests for a while before it moves. Once the
/// tail has left the box the offset wraps back to the box width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marquee {
    offset: i32,
    box_width: i32,
    content_width: i32,
    step: i32,
}

impl Marquee {
    pub fn new() -> Self {
        Self::default()
    }

    /// `surface_width` sets the step: one pixel per tick up to 240 wide
    pub fn restart(&mut self, box_width: u32, content_width: u32, surface_width: u32) {
        self.box_width = box_width as i32;
        self.content_width = content_width as i32;
        self.step = surface_width.div_ceil(240).max(1) as i32;
        self.offset = self.box_width;
    }

    /// Scrolling only happens when the content overflows
    pub fn is_active(&self) -> bool {
        self.content_width > self.box_width
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    /// Draw position for this frame, then advance
    pub fn tick(&mut self) -> i32 {
        let x = self.offset.min(0);
        self.offset -= self.step;
        if self.offset < -self.content_width {
            self.offset = self.box_width;
        }
        x
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

/// How one paint of a text box should look
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub color: Color,
    pub align: Align,
    pub highlight: bool,
}

/// Renders text into a fixed box: a content strip sized to the text, a
/// lazily allocated box-sized scratch area, and a marquee for overflow.
#[derive(Debug)]
pub struct TextPainter {
    rect: Rectangle,
    font: MonoFontRenderer,
    valign_center: bool,
    strip: Option<Bitmap>,
    area: Option<Bitmap>,
    marquee: Marquee,
}

impl TextPainter {
    pub fn new(rect: Rectangle) -> Self {
        Self {
            rect,
            font: MonoFontRenderer::for_height(rect.size.height),
            valign_center: false,
            strip: None,
            area: None,
            marquee: Marquee::new(),
        }
    }

    /// Center the glyph cell vertically in the box
    pub fn centered_vertically(mut self) -> Self {
        self.valign_center = true;
        self
    }

    /// Explicit face, e.g. a clock sized from a sample string
    pub fn with_font(mut self, font: MonoFontRenderer) -> Self {
        self.font = font;
        self
    }

    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    pub fn marquee(&self) -> &Marquee {
        &self.marquee
    }

    /// Zero sized boxes draw nothing
    pub fn is_degenerate(&self) -> bool {
        self.rect.size.width == 0 || self.rect.size.height == 0
    }

    /// Render `text` and blit the whole box.
    pub fn paint(&mut self, text: &str, style: TextStyle, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        if self.is_degenerate() {
            return Ok(());
        }
        let Size { width: w, height: h } = self.rect.size;
        let bounds = self.font.measure(text);
        let y = if self.valign_center {
            (h as i32 - bounds.height as i32) / 2
        } else {
            0
        };

        let mut strip = Bitmap::new(bounds.width, h, Gray8::BLACK);
        if surface.color_depth().bits_per_pixel() > 1 {
            let color = if style.highlight { Color::White } else { style.color };
            self.font.rasterize(text, color.to_gray8(), &mut strip, Point::new(0, y));
        } else {
            // 1bpp ignores color, highlight is a negative of the strip
            self.font.rasterize(text, Gray8::WHITE, &mut strip, Point::new(0, y));
            if style.highlight {
                strip.invert();
            }
        }

        let x = match style.align {
            Align::Right if bounds.width < w => (w - bounds.width) as i32,
            Align::Center if bounds.width < w => (w / 2 - bounds.width / 2) as i32,
            _ => 0,
        };

        let area = self.area.get_or_insert_with(|| Bitmap::new(w, h, Gray8::BLACK));
        area.clear_color(Gray8::BLACK);
        area.blit(x, 0, &strip);
        surface.write_region(self.rect.top_left.x, self.rect.top_left.y, area)?;

        self.marquee.restart(w, bounds.width, surface.size().0);
        self.strip = Some(strip);
        Ok(())
    }

    /// Advance the marquee and redraw when the content overflows.
    pub fn scroll(&mut self, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        if !self.marquee.is_active() {
            return Ok(());
        }
        let (Some(strip), Some(area)) = (self.strip.as_ref(), self.area.as_mut()) else {
            return Ok(());
        };
        let x = self.marquee.tick();
        area.clear_color(Gray8::BLACK);
        area.blit(x, 0, strip);
        surface.write_region(self.rect.top_left.x, self.rect.top_left.y, area)
    }

    /// Drop the rendered strip; the next paint starts over
    pub fn reset(&mut self) {
        self.strip = None;
        self.marquee = Marquee::new();
    }
}

/// Box from signed layout arithmetic, negative extents clamp to zero
pub fn area(x: i32, y: i32, w: i32, h: i32) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(w.max(0) as u32, h.max(0) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::MockDriver;
    use crate::display::traits::ColorDepth;

    #[test]
    fn test_marquee_rests_then_scrolls() {
        let mut m = Marquee::new();
        m.restart(100, 150, 128);
        assert!(m.is_active());
        assert_eq!(m.step(), 1);
        assert_eq!(m.offset(), 100);

        // content sits at x = 0 until the offset runs out
        for _ in 0..=100 {
            assert_eq!(m.tick(), 0);
        }
        assert_eq!(m.tick(), -1);
        assert_eq!(m.tick(), -2);
    }

    #[test]
    fn test_marquee_wraps_after_tail_leaves() {
        let mut m = Marquee::new();
        m.restart(10, 20, 128);
        let mut last = m.offset();
        let mut wrapped = false;
        for _ in 0..40 {
            m.tick();
            if m.offset() > last {
                assert_eq!(m.offset(), 10);
                wrapped = true;
                break;
            }
            // non-increasing between restarts
            assert!(m.offset() <= last);
            last = m.offset();
        }
        assert!(wrapped);
        assert!(last >= -20);
    }

    #[test]
    fn test_marquee_step_follows_surface_width() {
        let mut m = Marquee::new();
        // a narrow box on a wide panel moves as fast as a wide one
        m.restart(100, 900, 480);
        assert_eq!(m.step(), 2);
        m.restart(100, 900, 241);
        assert_eq!(m.step(), 2);
        m.restart(480, 900, 240);
        assert_eq!(m.step(), 1);
        m.restart(50, 20, 128);
        assert!(!m.is_active());
    }

    #[test]
    fn test_painter_steps_by_surface_width() {
        let mut surface = MockDriver::new_with_size(256, 64);
        let mut painter = TextPainter::new(area(0, 0, 30, 10));
        let style = TextStyle { color: Color::White, align: Align::Left, highlight: false };
        painter.paint("far too long for the box", style, &mut surface).unwrap();
        assert_eq!(painter.marquee().step(), 2);
    }

    #[test]
    fn test_paint_right_aligns_short_text() {
        let mut surface = MockDriver::new_with_size(128, 64);
        let mut painter = TextPainter::new(area(0, 0, 100, 10));
        let style = TextStyle { color: Color::White, align: Align::Right, highlight: false };
        painter.paint("ab", style, &mut surface).unwrap();

        // two 6px cells hugging the right edge
        let fb = surface.framebuffer();
        let lit_left = (0..88).flat_map(|x| (0..10).map(move |y| (x, y)))
            .filter(|&(x, y)| fb.luma_at(x, y) == Some(255))
            .count();
        assert_eq!(lit_left, 0);
        assert!(surface.count_on_pixels() > 0);
        assert!(!painter.marquee().is_active());
    }

    #[test]
    fn test_highlight_inverts_on_mono() {
        let mut surface = MockDriver::new_with_size(64, 10);
        let mut painter = TextPainter::new(area(0, 0, 64, 10));
        let style = TextStyle { color: Color::MENU, align: Align::Left, highlight: true };
        painter.paint("    ", style, &mut surface).unwrap();
        // blank text, inverted: a solid 24x10 bar
        assert_eq!(surface.count_on_pixels(), 24 * 10);
    }

    #[test]
    fn test_highlight_uses_white_on_gray() {
        let mut surface = MockDriver::with_depth(64, 10, ColorDepth::Gray4);
        let mut painter = TextPainter::new(area(0, 0, 64, 10));
        let style = TextStyle { color: Color::MENU, align: Align::Left, highlight: true };
        painter.paint("H", style, &mut surface).unwrap();
        let fb = surface.framebuffer();
        let brightest = (0..6).flat_map(|x| (0..10).map(move |y| (x, y)))
            .filter_map(|(x, y)| fb.luma_at(x, y))
            .max();
        assert_eq!(brightest, Some(255));
    }

    #[test]
    fn test_degenerate_box_draws_nothing() {
        let mut surface = MockDriver::new_with_size(32, 32);
        let mut painter = TextPainter::new(area(0, 0, 0, 10));
        let style = TextStyle { color: Color::White, align: Align::Left, highlight: false };
        painter.paint("abc", style, &mut surface).unwrap();
        painter.scroll(&mut surface).unwrap();
        assert_eq!(surface.state().lock().unwrap().blit_count, 0);
    }
}
