/*
 *  display/error.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Errors raised by panels, surfaces and the driver factory
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

use thiserror::Error;

/// What can go wrong between a widget blit and the glass
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("panel init failed: {0}")]
    Init(String),

    /// bus device could not be opened
    #[error("bus error: {0}")]
    Bus(String),

    #[error("unsupported panel geometry {width}x{height}")]
    UnsupportedGeometry { width: u32, height: u32 },

    #[error("invalid rotation {0}, expected 0, 90, 180 or 270")]
    InvalidRotation(u16),

    /// framebuffer depth does not match what the panel takes
    #[error("framebuffer depth does not match the panel")]
    DepthMismatch,

    // display_interface errors are not std errors, so no #[source]
    #[error("display interface error: {0:?}")]
    Interface(display_interface::DisplayError),

    #[error("flush failed: {0}")]
    Flush(String),

    #[error("no displays configured")]
    NoDisplays,
}

impl From<display_interface::DisplayError> for DisplayError {
    fn from(err: display_interface::DisplayError) -> Self {
        DisplayError::Interface(err)
    }
}

/// Building a surface from a `DisplayConfig`
#[derive(Debug, Error)]
pub enum DisplayFactoryError {
    #[error("no display driver configured")]
    NoDriverSpecified,

    #[error("driver needs a bus section")]
    NoBusConfiguration,

    #[error("invalid display config: {0}")]
    Invalid(String),

    /// the driver was chosen but the panel could not be opened
    #[error("opening display: {0}")]
    Open(#[from] DisplayError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_open_failure_keeps_cause() {
        let err = DisplayFactoryError::from(DisplayError::Bus("/dev/i2c-9: no such file".into()));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "opening display: bus error: /dev/i2c-9: no such file");
        assert!(DisplayFactoryError::NoDriverSpecified.source().is_none());
    }

    #[test]
    fn test_geometry_message() {
        let err = DisplayError::UnsupportedGeometry { width: 96, height: 16 };
        assert_eq!(err.to_string(), "unsupported panel geometry 96x16");
    }
}
