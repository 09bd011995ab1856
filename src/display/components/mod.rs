/*
 *  display/components/mod.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  UI components for display rendering
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

pub mod scrollers;
pub mod labels;
pub mod indicators;
pub mod clock;
pub mod cover;

use embedded_graphics::primitives::Rectangle;

use crate::display::error::DisplayError;
use crate::display::traits::Surface;
use crate::snapshot::Snapshot;

// Re-exports
pub use scrollers::{area, Align, Marquee, TextPainter, TextStyle};
pub use labels::{AddressLookup, NetworkAddressLabel, TextLabel, TextSource, ADDRESS_REFRESH};
pub use indicators::{MarkerDirection, ProgressBar, SelectionMarker};
pub use clock::{ClockLabel, CpuTemperatureLabel, DateLabel};
pub use cover::CoverImage;

/// Discriminant of a [`Widget`], handy for assertions and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    ScrollingLabel,
    StaticLabel,
    NetworkAddress,
    ProgressBar,
    SelectionMarker,
    CoverImage,
    CpuTemperature,
    Date,
    Clock,
}

/// Every drawable the layouts can place
#[derive(Debug)]
pub enum Widget {
    ScrollingLabel(TextLabel),
    StaticLabel(TextLabel),
    NetworkAddress(NetworkAddressLabel),
    ProgressBar(ProgressBar),
    SelectionMarker(SelectionMarker),
    CoverImage(CoverImage),
    CpuTemperature(CpuTemperatureLabel),
    Date(DateLabel),
    Clock(ClockLabel),
}

impl Widget {
    pub fn rect(&self) -> Rectangle {
        match self {
            Widget::ScrollingLabel(w) | Widget::StaticLabel(w) => w.rect(),
            Widget::NetworkAddress(w) => w.rect(),
            Widget::ProgressBar(w) => w.rect(),
            Widget::SelectionMarker(w) => w.rect(),
            Widget::CoverImage(w) => w.rect(),
            Widget::CpuTemperature(w) => w.rect(),
            Widget::Date(w) => w.rect(),
            Widget::Clock(w) => w.rect(),
        }
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            Widget::ScrollingLabel(_) => WidgetKind::ScrollingLabel,
            Widget::StaticLabel(_) => WidgetKind::StaticLabel,
            Widget::NetworkAddress(_) => WidgetKind::NetworkAddress,
            Widget::ProgressBar(_) => WidgetKind::ProgressBar,
            Widget::SelectionMarker(_) => WidgetKind::SelectionMarker,
            Widget::CoverImage(_) => WidgetKind::CoverImage,
            Widget::CpuTemperature(_) => WidgetKind::CpuTemperature,
            Widget::Date(_) => WidgetKind::Date,
            Widget::Clock(_) => WidgetKind::Clock,
        }
    }

    /// Bring the widget's region up to date with `snapshot`
    pub fn update(&mut self, snapshot: &Snapshot, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        match self {
            Widget::ScrollingLabel(w) | Widget::StaticLabel(w) => w.update(snapshot, surface),
            Widget::NetworkAddress(w) => w.update(surface),
            Widget::ProgressBar(w) => w.update(snapshot, surface),
            Widget::SelectionMarker(w) => w.update(snapshot, surface),
            Widget::CoverImage(w) => w.update(surface),
            Widget::CpuTemperature(w) => w.update(surface),
            Widget::Date(w) => w.update(surface),
            Widget::Clock(w) => w.update(surface),
        }
    }

    /// Forget what was drawn so the next update repaints
    pub fn reset(&mut self) {
        match self {
            Widget::ScrollingLabel(w) | Widget::StaticLabel(w) => w.reset(),
            Widget::NetworkAddress(w) => w.reset(),
            Widget::ProgressBar(w) => w.reset(),
            Widget::SelectionMarker(w) => w.reset(),
            Widget::CoverImage(w) => w.reset(),
            Widget::CpuTemperature(w) => w.reset(),
            Widget::Date(w) => w.reset(),
            Widget::Clock(w) => w.reset(),
        }
    }
}
