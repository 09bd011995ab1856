/*
 *  display/mod.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - surfaces, widgets, layouts and mode selection
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod framebuffer;
pub mod factory;
pub mod color;
pub mod font;

// Display drivers, the mock is always built
pub mod drivers;

// Layout builders per mode
pub mod layout;

// Display manager
pub mod manager;

// UI components
pub mod components;

// Display mode controller
pub mod mode_controller;

// Re-exports for convenience
pub use traits::{BoxedSurface, ColorDepth, DisplayCapabilities, Surface};
pub use error::{DisplayError, DisplayFactoryError};
pub use framebuffer::FrameBuffer;
pub use factory::DisplayDriverFactory;
pub use layout::{build_layout, Layout, LayoutCategory, LayoutContext};
pub use manager::DisplayManager;
pub use color::Color;
pub use components::{Widget, WidgetKind};
pub use mode_controller::{resolve_mode, DisplayModeController, ModeControllerConfig, ModeInputs};

/// Display mode enum - which widget set is active
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum DisplayMode {
    #[default]
    None,       // before the first tick
    Idle,       // Stopped or paused, clock and host details
    SongInfo,   // Now Playing
    Volume,     // Volume adjust while Prev/Next held
    Menu,       // Local menu open
    CoverArt,   // Full screen album art
}

// Re-export driver types when features are enabled
#[cfg(feature = "driver-ssd1306")]
pub use drivers::ssd1306::Ssd1306Driver;

pub use drivers::mock::MockDriver;
