/*
 *  display/font.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text measurement and rasterization for widget scratch bitmaps
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

use embedded_graphics::{
    mono_font::{iso_8859_1, MonoFont, MonoTextStyle},
    pixelcolor::Gray8,
    prelude::*,
    text::{renderer::TextRenderer, Baseline, Text},
};

use crate::vframebuf::Bitmap;

/// Extent of rendered text, origin at the top-left of the first glyph cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBounds {
    pub width: u32,
    pub height: u32,
}

/// Measures and draws a single line of text.
pub trait FontRenderer {
    fn measure(&self, text: &str) -> TextBounds;

    /// Draw `text` with its top-left at `origin`; glyph pixels are written
    /// in `color`, background is left untouched.
    fn rasterize(&self, text: &str, color: Gray8, target: &mut Bitmap, origin: Point);
}

// smallest to largest, the renderer picks the tallest that fits the box
const FONTS: [&MonoFont<'static>; 8] = [
    &iso_8859_1::FONT_4X6,
    &iso_8859_1::FONT_5X8,
    &iso_8859_1::FONT_6X10,
    &iso_8859_1::FONT_6X13,
    &iso_8859_1::FONT_7X14,
    &iso_8859_1::FONT_9X15,
    &iso_8859_1::FONT_9X18,
    &iso_8859_1::FONT_10X20,
];

/// Fixed pitch renderer over the embedded-graphics mono fonts
#[derive(Clone, Copy)]
pub struct MonoFontRenderer {
    font: &'static MonoFont<'static>,
}

impl MonoFontRenderer {
    /// Largest face whose cell height fits in `px`, the smallest otherwise
    pub fn for_height(px: u32) -> Self {
        let font = FONTS
            .iter()
            .rev()
            .find(|f| f.character_size.height <= px)
            .copied()
            .unwrap_or(FONTS[0]);
        Self { font }
    }

    /// Largest face that fits `sample` inside `width` x `height`
    pub fn fitting(sample: &str, width: u32, height: u32) -> Self {
        FONTS
            .iter()
            .rev()
            .map(|f| Self { font: *f })
            .find(|r| r.line_height() <= height && r.measure(sample).width <= width)
            .unwrap_or(Self { font: FONTS[0] })
    }

    pub fn line_height(&self) -> u32 {
        self.font.character_size.height
    }
}

impl std::fmt::Debug for MonoFontRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size = self.font.character_size;
        write!(f, "MonoFontRenderer({}x{})", size.width, size.height)
    }
}

impl FontRenderer for MonoFontRenderer {
    fn measure(&self, text: &str) -> TextBounds {
        if text.is_empty() {
            return TextBounds { width: 0, height: self.line_height() };
        }
        let style = MonoTextStyle::new(self.font, Gray8::WHITE);
        let metrics = style.measure_string(text, Point::zero(), Baseline::Top);
        TextBounds {
            width: metrics.bounding_box.size.width,
            height: self.line_height(),
        }
    }

    fn rasterize(&self, text: &str, color: Gray8, target: &mut Bitmap, origin: Point) {
        let style = MonoTextStyle::new(self.font, color);
        // drawing into a VarFrameBuf cannot fail
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(target);
    }
}
