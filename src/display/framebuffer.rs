/*
 *  display/framebuffer.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel-depth framebuffer with enum dispatch for different color types
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

use embedded_graphics::prelude::*;
use embedded_graphics::pixelcolor::{BinaryColor, Gray4};
use crate::vframebuf::{Bitmap, VarFrameBuf};
use crate::display::color::{luma_to_binary, luma_to_gray4};
use crate::display::traits::{DisplayCapabilities, ColorDepth};

/// Enum dispatch for the panel pixel format
///
/// The correct variant is selected at initialization time based on the
/// display capabilities. Widgets hand over 8-bit luma regions which are
/// converted here, thresholded at 128 on monochrome panels.
#[derive(Debug, Clone)]
pub enum FrameBuffer {
    /// Monochrome framebuffer (1-bit per pixel)
    Mono(VarFrameBuf<BinaryColor>),

    /// 4-bit grayscale framebuffer (16 levels)
    Gray4(VarFrameBuf<Gray4>),
}

impl FrameBuffer {
    /// Create a new framebuffer based on display capabilities
    pub fn new(capabilities: &DisplayCapabilities) -> Self {
        match capabilities.color_depth {
            ColorDepth::Monochrome => {
                FrameBuffer::Mono(VarFrameBuf::new(
                    capabilities.width,
                    capabilities.height,
                    BinaryColor::Off,
                ))
            }
            ColorDepth::Gray4 => {
                FrameBuffer::Gray4(VarFrameBuf::new(
                    capabilities.width,
                    capabilities.height,
                    Gray4::new(0),
                ))
            }
        }
    }

    /// Get dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            FrameBuffer::Mono(fb) => (fb.width() as u32, fb.height() as u32),
            FrameBuffer::Gray4(fb) => (fb.width() as u32, fb.height() as u32),
        }
    }

    /// Clear the framebuffer
    pub fn clear(&mut self) {
        match self {
            FrameBuffer::Mono(fb) => fb.clear(BinaryColor::Off).ok(),
            FrameBuffer::Gray4(fb) => fb.clear(Gray4::new(0)).ok(),
        };
    }

    /// Copy a luma region into the buffer, clipped to the panel
    pub fn blit(&mut self, x: i32, y: i32, region: &Bitmap) {
        match self {
            FrameBuffer::Mono(fb) => fb.blit_with(x, y, region, luma_to_binary),
            FrameBuffer::Gray4(fb) => fb.blit_with(x, y, region, luma_to_gray4),
        }
    }

    /// Get immutable reference to monochrome framebuffer
    pub fn as_mono(&self) -> Option<&VarFrameBuf<BinaryColor>> {
        match self {
            FrameBuffer::Mono(fb) => Some(fb),
            _ => None,
        }
    }

    /// Pixel brightness scaled back to 0-255, None outside the panel
    pub fn luma_at(&self, x: i32, y: i32) -> Option<u8> {
        match self {
            FrameBuffer::Mono(fb) => fb.get(x, y).map(|c| if c.is_on() { 255 } else { 0 }),
            FrameBuffer::Gray4(fb) => fb.get(x, y).map(|c| c.luma() * 17),
        }
    }

    /// Count of pixels that are not fully off
    pub fn count_lit(&self) -> usize {
        match self {
            FrameBuffer::Mono(fb) => fb.as_slice().iter().filter(|c| c.is_on()).count(),
            FrameBuffer::Gray4(fb) => fb.as_slice().iter().filter(|c| c.luma() > 0).count(),
        }
    }
}
