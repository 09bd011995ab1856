/*
 *  display/drivers/mock.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Headless display driver, used for testing and for running without a panel
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

use embedded_graphics::primitives::Rectangle;
use embedded_graphics::prelude::*;

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::framebuffer::FrameBuffer;
use crate::display::traits::{Surface, DisplayCapabilities, ColorDepth};
use crate::vframebuf::Bitmap;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock display driver
///
/// This driver simulates a display without requiring hardware. It backs
/// the `headless` driver kind and every render test.
///
/// The mock records all operations and publishes the flushed frame into
/// shared state so tests can inspect it after the driver has been boxed
/// and handed to the display manager.
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// Framebuffer for drawing operations
    framebuffer: FrameBuffer,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Brightness applied on init, as a panel would
    brightness: Option<u8>,

    /// Shared state for testing
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of times flush() was called
    pub flush_count: usize,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Number of write_region() calls
    pub blit_count: usize,

    /// Bounds of the most recent region write
    pub last_region: Option<Rectangle>,

    /// Last brightness value set
    pub last_brightness: Option<u8>,

    /// Whether the driver is initialized
    pub is_initialized: bool,

    /// Whether display_on() has been issued
    pub is_on: bool,

    /// The frame as of the last successful flush
    pub panel: Option<FrameBuffer>,

    /// Simulate failures (for error testing)
    pub simulate_flush_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriverState {
    /// Brightness of a pixel on the last flushed frame
    pub fn panel_luma(&self, x: i32, y: i32) -> Option<u8> {
        self.panel.as_ref().and_then(|fb| fb.luma_at(x, y))
    }

    /// Lit pixels on the last flushed frame
    pub fn panel_lit(&self) -> usize {
        self.panel.as_ref().map(|fb| fb.count_lit()).unwrap_or(0)
    }
}

impl MockDriver {
    /// Create a mock driver from display configuration
    pub fn new(config: &DisplayConfig) -> Self {
        let width = config.width.unwrap_or(128);
        let height = config.height.unwrap_or(64);
        let color_depth = if config.grayscale.unwrap_or(false) {
            ColorDepth::Gray4
        } else {
            ColorDepth::Monochrome
        };
        Self {
            brightness: config.brightness,
            ..Self::with_depth(width, height, color_depth)
        }
    }

    /// Create a monochrome mock driver with specific dimensions
    pub fn new_with_size(width: u32, height: u32) -> Self {
        Self::with_depth(width, height, ColorDepth::Monochrome)
    }

    /// Create a mock driver with specific dimensions and depth
    pub fn with_depth(width: u32, height: u32, color_depth: ColorDepth) -> Self {
        let capabilities = DisplayCapabilities {
            width,
            height,
            color_depth,
        };
        Self {
            framebuffer: FrameBuffer::new(&capabilities),
            capabilities,
            brightness: None,
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    /// The working buffer, before flush
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// Count number of lit pixels in the working buffer
    pub fn count_on_pixels(&self) -> usize {
        self.framebuffer.count_lit()
    }

    fn lock(&self) -> MutexGuard<'_, MockDriverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Surface for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();

        if state.simulate_init_failure {
            return Err(DisplayError::Init("simulated".to_string()));
        }

        state.init_count += 1;
        state.is_initialized = true;
        state.last_brightness = self.brightness;
        Ok(())
    }

    fn display_on(&mut self) -> Result<(), DisplayError> {
        self.lock().is_on = true;
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        self.lock().last_brightness = Some(value);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.lock().clear_count += 1;
        self.framebuffer.clear();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let snapshot = self.framebuffer.clone();
        let mut state = self.lock();

        if state.simulate_flush_failure {
            return Err(DisplayError::Flush("simulated".to_string()));
        }

        state.flush_count += 1;
        state.panel = Some(snapshot);
        Ok(())
    }

    fn write_region(&mut self, x: i32, y: i32, region: &Bitmap) -> Result<(), DisplayError> {
        self.framebuffer.blit(x, y, region);
        let mut state = self.lock();
        state.blit_count += 1;
        state.last_region = Some(Rectangle::new(Point::new(x, y), region.size()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Gray8;

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::new_with_size(128, 64);
        assert_eq!(driver.capabilities().width, 128);
        assert_eq!(driver.capabilities().height, 64);
        assert_eq!(driver.color_depth(), ColorDepth::Monochrome);
        assert_eq!(driver.count_on_pixels(), 0);
    }

    #[test]
    fn test_mock_driver_from_config() {
        let config = DisplayConfig {
            width: Some(256),
            height: Some(64),
            grayscale: Some(true),
            ..Default::default()
        };
        let driver = MockDriver::new(&config);
        assert_eq!(driver.size(), (256, 64));
        assert_eq!(driver.color_depth().bits_per_pixel(), 4);
    }

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::new_with_size(128, 64);

        let state = driver.state();
        assert_eq!(state.lock().unwrap().init_count, 0);
        assert!(!state.lock().unwrap().is_initialized);

        driver.init().unwrap();
        driver.display_on().unwrap();

        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(state.lock().unwrap().is_initialized);
        assert!(state.lock().unwrap().is_on);
    }

    #[test]
    fn test_write_region_then_flush() {
        let mut driver = MockDriver::new_with_size(16, 8);
        let state = driver.state();

        driver.write_region(-2, 6, &Bitmap::new(4, 4, Gray8::WHITE)).unwrap();
        assert_eq!(driver.count_on_pixels(), 4);
        assert_eq!(state.lock().unwrap().panel_lit(), 0);

        driver.flush().unwrap();
        let st = state.lock().unwrap();
        assert_eq!(st.blit_count, 1);
        assert_eq!(st.flush_count, 1);
        assert_eq!(st.panel_lit(), 4);
        assert_eq!(st.panel_luma(0, 7), Some(255));
        assert_eq!(st.last_region, Some(Rectangle::new(Point::new(-2, 6), Size::new(4, 4))));
    }

    #[test]
    fn test_mock_driver_clear() {
        let mut driver = MockDriver::new_with_size(128, 64);
        driver.write_region(0, 0, &Bitmap::new(10, 10, Gray8::WHITE)).unwrap();
        assert!(driver.count_on_pixels() > 0);

        driver.clear().unwrap();

        assert_eq!(driver.count_on_pixels(), 0);
        assert_eq!(driver.state().lock().unwrap().clear_count, 1);
    }

    #[test]
    fn test_configured_brightness_applied_on_init() {
        let config = DisplayConfig { brightness: Some(200), ..Default::default() };
        let mut driver = MockDriver::new(&config);
        let state = driver.state();
        assert_eq!(state.lock().unwrap().last_brightness, None);
        driver.init().unwrap();
        assert_eq!(state.lock().unwrap().last_brightness, Some(200));

        driver.set_brightness(10).unwrap();
        assert_eq!(state.lock().unwrap().last_brightness, Some(10));
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::new_with_size(128, 64);

        driver.state().lock().unwrap().simulate_flush_failure = true;
        assert!(driver.flush().is_err());

        driver.state().lock().unwrap().simulate_flush_failure = false;
        assert!(driver.flush().is_ok());

        driver.state().lock().unwrap().simulate_init_failure = true;
        assert!(driver.init().is_err());
    }
}
