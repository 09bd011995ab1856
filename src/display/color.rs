/*
 *  display/color.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Color values shared by widgets, converted per panel depth
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

use embedded_graphics::pixelcolor::{BinaryColor, Gray4, Gray8, GrayColor};

/// Universal color value that adapts to display capabilities
///
/// Widgets render into 8-bit luma scratch bitmaps; the surface converts
/// those to its own depth when the region is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Black/Off (0% intensity)
    Black,

    /// Dark gray (33% intensity)
    DarkGray,

    /// Gray (50% intensity)
    Gray,

    /// Light gray (67% intensity)
    LightGray,

    /// White/On (100% intensity)
    White,

    /// Custom grayscale value (0-255)
    Grayscale(u8),
}

impl Color {
    pub const OFF: Color = Color::Black;
    pub const ON: Color = Color::White;

    /// Song title accent (the blue of the color panels, as luma)
    pub const ACCENT: Color = Color::Grayscale(112);

    /// Menu entries are drawn a little dimmer than the title
    pub const MENU: Color = Color::Grayscale(170);

    /// Tint used when the network has no usable address
    pub const WARNING: Color = Color::Grayscale(166);

    /// Convert to BinaryColor for monochrome displays
    pub fn to_binary(&self) -> BinaryColor {
        if self.luminance() >= 128 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        }
    }

    /// Convert to Gray4 (4-bit grayscale: 0-15)
    pub fn to_gray4(&self) -> Gray4 {
        Gray4::new(((self.luminance() as u16 * 15) / 255) as u8)
    }

    /// Convert to the 8-bit luma used by scratch bitmaps
    pub fn to_gray8(&self) -> Gray8 {
        Gray8::new(self.luminance())
    }

    /// Get luminance value (0-255)
    pub fn luminance(&self) -> u8 {
        match self {
            Color::Black => 0,
            Color::DarkGray => 85,
            Color::Gray => 128,
            Color::LightGray => 170,
            Color::White => 255,
            Color::Grayscale(val) => *val,
        }
    }
}

/// Map a scratch pixel onto a monochrome panel
#[inline]
pub fn luma_to_binary(px: Gray8) -> BinaryColor {
    if px.luma() >= 128 {
        BinaryColor::On
    } else {
        BinaryColor::Off
    }
}

/// Map a scratch pixel onto a 16 level panel
#[inline]
pub fn luma_to_gray4(px: Gray8) -> Gray4 {
    Gray4::new(px.luma() >> 4)
}
