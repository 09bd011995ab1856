/*
 *  display/factory.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Factory for creating display surfaces from configuration
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

use crate::config::{DisplayConfig, DriverKind, BusConfig};
use crate::display::drivers::mock::MockDriver;
use crate::display::error::DisplayFactoryError;
use crate::display::traits::BoxedSurface;
use log::info;

#[cfg(feature = "driver-ssd1306")]
use crate::display::drivers::ssd1306::Ssd1306Driver;

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create a display surface from configuration
    ///
    /// Examines the driver kind and bus configuration and builds the matching
    /// surface. Hardware is opened here but not initialized; the display
    /// manager calls `init()` on every surface at startup.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = DisplayConfig {
    ///     driver: Some(DriverKind::Ssd1306),
    ///     bus: Some(BusConfig::I2c {
    ///         bus: "/dev/i2c-1".to_string(),
    ///         address: 0x3C,
    ///     }),
    ///     ..Default::default()
    /// };
    ///
    /// let surface = DisplayDriverFactory::create_from_config(&config)?;
    /// ```
    pub fn create_from_config(
        config: &DisplayConfig
    ) -> Result<BoxedSurface, DisplayFactoryError> {
        Self::validate_config(config)?;
        let driver_kind = config.driver
            .ok_or(DisplayFactoryError::NoDriverSpecified)?;

        match (driver_kind, config.bus.as_ref()) {
            (DriverKind::Headless, _) => {
                let driver = MockDriver::new(config);
                let (w, h) = (config.width.unwrap_or(128), config.height.unwrap_or(64));
                info!("Creating headless surface {}x{}", w, h);
                Ok(Box::new(driver))
            }

            #[cfg(feature = "driver-ssd1306")]
            (DriverKind::Ssd1306, Some(BusConfig::I2c { bus, address })) => {
                Ok(Box::new(Ssd1306Driver::new_i2c(bus, *address, config)?))
            }

            #[cfg(not(feature = "driver-ssd1306"))]
            (DriverKind::Ssd1306, Some(_)) => {
                Err(DisplayFactoryError::Invalid(
                    "SSD1306 driver not enabled. Enable with --features driver-ssd1306".to_string()
                ))
            }

            (DriverKind::Ssd1306, None) => Err(DisplayFactoryError::NoBusConfiguration),
        }
    }

    /// Validate a configuration without creating a driver
    ///
    /// This is useful for checking configuration at startup before attempting
    /// to initialize hardware.
    pub fn validate_config(config: &DisplayConfig) -> Result<(), DisplayFactoryError> {
        let driver_kind = config.driver
            .ok_or(DisplayFactoryError::NoDriverSpecified)?;

        if driver_kind == DriverKind::Ssd1306 && config.bus.is_none() {
            return Err(DisplayFactoryError::NoBusConfiguration);
        }

        if let Some(rotation) = config.rotate_deg {
            if rotation != 0 && rotation != 90 && rotation != 180 && rotation != 270 {
                return Err(DisplayFactoryError::Invalid(
                    format!("rotate_deg {} (must be 0, 90, 180, or 270)", rotation)
                ));
            }
        }

        if config.width == Some(0) || config.height == Some(0) {
            return Err(DisplayFactoryError::Invalid("zero sized display".to_string()));
        }

        Ok(())
    }
}
