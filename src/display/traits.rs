/*
 *  display/traits.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for the drawing surface abstraction
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

use crate::display::error::DisplayError;
use crate::vframebuf::Bitmap;

/// Color depth capabilities of different display drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// Monochrome displays (1-bit per pixel)
    /// Used by: SSD1306, SSD1309, SH1106
    Monochrome,

    /// 4-bit grayscale (16 levels)
    /// Used by: SSD1322
    Gray4,
}

impl ColorDepth {
    /// Bits per pixel for this depth
    pub fn bits_per_pixel(&self) -> u8 {
        match self {
            ColorDepth::Monochrome => 1,
            ColorDepth::Gray4 => 4,
        }
    }
}

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Color depth (monochrome or grayscale)
    pub color_depth: ColorDepth,
}

/// A rectangular pixel buffer owned by a display driver.
///
/// Widgets never touch the panel directly: they blit regions into the
/// surface and the render loop flushes it on the mode cadence. Every
/// write is clipped to the surface bounds, so negative offsets and
/// oversized regions are legal.
pub trait Surface: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn size(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Color depth of the panel
    fn color_depth(&self) -> ColorDepth {
        self.capabilities().color_depth
    }

    /// Initialize the display hardware
    ///
    /// A failure here is fatal at startup.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Switch the panel on after initialization
    fn display_on(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Set display brightness (0-255), applied by drivers during `init`
    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError>;

    /// Blank the buffered contents (does not push to the panel)
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Transfer the buffered pixels to the panel
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Copy `region` into the buffer with its top-left corner at (x, y),
    /// clipping anything outside the surface.
    fn write_region(&mut self, x: i32, y: i32, region: &Bitmap) -> Result<(), DisplayError>;
}

/// Type alias for boxed surfaces
pub type BoxedSurface = Box<dyn Surface>;
