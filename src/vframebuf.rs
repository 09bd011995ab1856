/*
 *  vframebuf.rs
 *
 *  mpdgui - music player display
 *	(c) 2020-26 Stuart Hunter
 *
 *	Runtime-sized pixel buffers, the scratch bitmaps widgets render into
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{Gray8, GrayColor, PixelColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// 8-bit luma scratch bitmap, converted to the panel depth on blit
pub type Bitmap = VarFrameBuf<Gray8>;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone, PartialEq)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor + Clone> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    /// Pixel at (x,y), None when outside the buffer
    pub fn get(&self, x: i32, y: i32) -> Option<C> {
        self.idx(Point::new(x, y)).map(|i| self.buf[i])
    }

    /// Copy `src` with its top-left corner at (x,y), clipped to this buffer.
    pub fn blit(&mut self, x: i32, y: i32, src: &VarFrameBuf<C>) {
        self.blit_with(x, y, src, |c| c);
    }

    /// Clipped copy with a per-pixel color conversion
    pub fn blit_with<S, F>(&mut self, x: i32, y: i32, src: &VarFrameBuf<S>, mut convert: F)
    where
        S: PixelColor,
        F: FnMut(S) -> C,
    {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + src.w as i32).min(self.w as i32);
        let y1 = (y + src.h as i32).min(self.h as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for dy in y0..y1 {
            let sy = (dy - y) as usize;
            let srow = sy * src.w;
            let drow = dy as usize * self.w;
            for dx in x0..x1 {
                let sx = (dx - x) as usize;
                self.buf[drow + dx as usize] = convert(src.buf[srow + sx]);
            }
        }
    }

    /// Every pixel with its position, row major
    pub fn pixels(&self) -> impl Iterator<Item = Pixel<C>> + '_ {
        let w = self.w.max(1);
        self.buf.iter().enumerate().map(move |(i, c)| {
            Pixel(Point::new((i % w) as i32, (i / w) as i32), *c)
        })
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl VarFrameBuf<Gray8> {
    /// Build a luma bitmap from raw 8-bit samples; None on a size mismatch
    pub fn from_luma(width: u32, height: u32, data: &[u8]) -> Option<Self> {
        let (w, h) = (width as usize, height as usize);
        if data.len() != w * h {
            return None;
        }
        Some(Self { buf: data.iter().map(|v| Gray8::new(*v)).collect(), w, h })
    }

    /// Photographic negative, used for highlighted text on 1bpp panels
    pub fn invert(&mut self) {
        for px in self.buf.iter_mut() {
            *px = Gray8::new(255 - px.luma());
        }
    }

    /// Number of pixels at or above the mono threshold
    pub fn count_lit(&self) -> usize {
        self.buf.iter().filter(|px| px.luma() >= 128).count()
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor + Clone> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // area may hang off any edge, walk it and drop what is outside
        let Size { width, height } = area.size;
        if width == 0 || height == 0 { return Ok(()); }
        let mut it = colors.into_iter();
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let Some(c) = it.next() else { return Ok(()); };
                if let Some(i) = self.idx(area.top_left + Point::new(col, row)) {
                    self.buf[i] = c;
                }
            }
        }
        Ok(())
    }
}
