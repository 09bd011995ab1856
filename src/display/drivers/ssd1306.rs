/*
 *  display/drivers/ssd1306.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 OLED display driver implementation
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

use linux_embedded_hal::I2cdev;
use ssd1306::{
    mode::{BufferedGraphicsMode, DisplayConfig as _},
    prelude::*,
    size::{DisplaySize128x64, DisplaySize128x32},
    I2CDisplayInterface,
    Ssd1306,
};

use embedded_graphics::prelude::*;

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{Surface, DisplayCapabilities, ColorDepth};
use crate::vframebuf::Bitmap;

use log::info;

/// SSD1306 display driver wrapper
pub struct Ssd1306Driver {
    /// The underlying ssd1306 driver
    display: Ssd1306Variants,

    /// Framebuffer widgets blit into
    framebuffer: FrameBuffer,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Brightness applied after init
    brightness: Option<u8>,
}

/// Enum to handle different SSD1306 display sizes
enum Ssd1306Variants {
    Size128x64(Ssd1306<I2CInterface<I2cdev>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>),
    Size128x32(Ssd1306<I2CInterface<I2cdev>, DisplaySize128x32, BufferedGraphicsMode<DisplaySize128x32>>),
}

fn rotation_for(degrees: u16) -> Result<DisplayRotation, DisplayError> {
    match degrees {
        0 => Ok(DisplayRotation::Rotate0),
        90 => Ok(DisplayRotation::Rotate90),
        180 => Ok(DisplayRotation::Rotate180),
        270 => Ok(DisplayRotation::Rotate270),
        _ => Err(DisplayError::InvalidRotation(degrees)),
    }
}

fn brightness_for(value: u8) -> Brightness {
    match value {
        0..=63 => Brightness::DIMMEST,
        64..=127 => Brightness::DIM,
        128..=191 => Brightness::NORMAL,
        _ => Brightness::BRIGHTEST,
    }
}

impl Ssd1306Driver {
    /// Create a new SSD1306 driver using I2C
    ///
    /// # Arguments
    ///
    /// * `i2c_bus_path` - Path to I2C device (e.g., "/dev/i2c-1")
    /// * `address` - I2C address (typically 0x3C or 0x3D)
    /// * `config` - Display configuration
    ///
    /// The panel is not touched until `init()`.
    pub fn new_i2c(
        i2c_bus_path: &str,
        address: u8,
        config: &DisplayConfig,
    ) -> Result<Self, DisplayError> {
        info!("Opening SSD1306 on {} at address 0x{:02X}", i2c_bus_path, address);

        let i2c = I2cdev::new(i2c_bus_path)
            .map_err(|e| DisplayError::Bus(format!("{}: {}", i2c_bus_path, e)))?;

        let width = config.width.unwrap_or(128);
        let height = config.height.unwrap_or(64);
        let degrees = config.rotate_deg.unwrap_or(0);
        let rotation = rotation_for(degrees)?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);

        let display = match (width, height) {
            (128, 64) => Ssd1306Variants::Size128x64(
                Ssd1306::new(interface, DisplaySize128x64, rotation).into_buffered_graphics_mode(),
            ),
            (128, 32) => Ssd1306Variants::Size128x32(
                Ssd1306::new(interface, DisplaySize128x32, rotation).into_buffered_graphics_mode(),
            ),
            _ => return Err(DisplayError::UnsupportedGeometry { width, height }),
        };

        // quarter turns swap the logical geometry
        let (width, height) = if degrees == 90 || degrees == 270 {
            (height, width)
        } else {
            (width, height)
        };

        let capabilities = DisplayCapabilities {
            width,
            height,
            color_depth: ColorDepth::Monochrome,
        };

        Ok(Self {
            display,
            framebuffer: FrameBuffer::new(&capabilities),
            capabilities,
            brightness: config.brightness,
        })
    }
}

impl Surface for Ssd1306Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => display.init()?,
            Ssd1306Variants::Size128x32(display) => display.init()?,
        }
        if let Some(brightness) = self.brightness {
            self.set_brightness(brightness)?;
        }
        info!("SSD1306 initialized successfully ({}x{})", self.capabilities.width, self.capabilities.height);
        Ok(())
    }

    fn display_on(&mut self) -> Result<(), DisplayError> {
        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => display.set_display_on(true)?,
            Ssd1306Variants::Size128x32(display) => display.set_display_on(true)?,
        }
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        let brightness = brightness_for(value);
        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => display.set_brightness(brightness)?,
            Ssd1306Variants::Size128x32(display) => display.set_brightness(brightness)?,
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.framebuffer.clear();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let Some(fb) = self.framebuffer.as_mono() else {
            return Err(DisplayError::DepthMismatch);
        };
        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => {
                display.draw_iter(fb.pixels())?;
                display.flush()?;
            }
            Ssd1306Variants::Size128x32(display) => {
                display.draw_iter(fb.pixels())?;
                display.flush()?;
            }
        }
        Ok(())
    }

    fn write_region(&mut self, x: i32, y: i32, region: &Bitmap) -> Result<(), DisplayError> {
        self.framebuffer.blit(x, y, region);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_mapping() {
        assert!(matches!(rotation_for(180), Ok(DisplayRotation::Rotate180)));
        assert!(matches!(rotation_for(45), Err(DisplayError::InvalidRotation(45))));
        assert!(matches!(rotation_for(0), Ok(DisplayRotation::Rotate0)));
    }
}
