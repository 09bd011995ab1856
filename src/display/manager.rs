/*
 *  display/manager.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display manager - owns the surfaces and their per-mode widget sets
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

use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::display::components::Widget;
use crate::display::layout::{build_layout, LayoutCategory, LayoutContext};
use crate::display::{BoxedSurface, DisplayError, DisplayMode};
use crate::services::CoverArtFanout;
use crate::snapshot::Snapshot;

/// Frame timing for the render loop
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    /// Total frame time (widgets + flush)
    pub frame_time_us: u64,

    /// Time spent updating widgets
    pub render_time_us: u64,

    /// Time spent flushing to hardware
    pub transfer_time_us: u64,

    /// Frame counter for averaging
    pub frame_count: u64,

    /// Average frame time, (last + current) / 2
    pub avg_frame_time_us: u64,

    /// Budget for one frame, the cadence of the active mode
    pub target_frame_time_us: u64,
}

impl PerformanceMetrics {
    pub fn new(budget: Duration) -> Self {
        Self {
            frame_time_us: 0,
            render_time_us: 0,
            transfer_time_us: 0,
            frame_count: 0,
            avg_frame_time_us: 0,
            target_frame_time_us: budget.as_micros() as u64,
        }
    }

    pub fn set_budget(&mut self, budget: Duration) {
        self.target_frame_time_us = budget.as_micros() as u64;
    }

    pub fn record_frame(&mut self, render_time_us: u64, transfer_time_us: u64) {
        self.render_time_us = render_time_us;
        self.transfer_time_us = transfer_time_us;
        self.frame_time_us = render_time_us + transfer_time_us;
        self.frame_count += 1;

        if self.avg_frame_time_us == 0 {
            self.avg_frame_time_us = self.frame_time_us;
        } else {
            self.avg_frame_time_us = (self.avg_frame_time_us + self.frame_time_us) / 2;
        }

        // Warn if the frame ate the whole budget
        if self.target_frame_time_us > 0 && self.frame_time_us > self.target_frame_time_us {
            warn!("Frame time {}μs exceeds budget {}μs (render: {}μs, transfer: {}μs)",
                  self.frame_time_us, self.target_frame_time_us,
                  render_time_us, transfer_time_us);
        }
    }

    pub fn fps(&self) -> f32 {
        if self.avg_frame_time_us == 0 {
            0.0
        } else {
            1_000_000.0 / self.avg_frame_time_us as f32
        }
    }
}

/// Pre-built widget sets, one per drawable mode
#[derive(Debug, Default)]
struct ModeWidgets {
    song_info: Vec<Widget>,
    idle: Vec<Widget>,
    volume: Vec<Widget>,
    menu: Vec<Widget>,
    cover_art: Vec<Widget>,
}

impl ModeWidgets {
    /// Returns the sets and the menu row count for this geometry
    fn build(width: u32, height: u32, ctx: &LayoutContext) -> (Self, usize) {
        let menu = build_layout(width, height, DisplayMode::Menu, ctx);
        let widgets = Self {
            song_info: build_layout(width, height, DisplayMode::SongInfo, ctx).widgets,
            idle: build_layout(width, height, DisplayMode::Idle, ctx).widgets,
            volume: build_layout(width, height, DisplayMode::Volume, ctx).widgets,
            menu: menu.widgets,
            cover_art: build_layout(width, height, DisplayMode::CoverArt, ctx).widgets,
        };
        (widgets, menu.menu_rows)
    }

    fn for_mode(&mut self, mode: DisplayMode) -> &mut [Widget] {
        match mode {
            DisplayMode::None => &mut [],
            DisplayMode::SongInfo => &mut self.song_info,
            DisplayMode::Idle => &mut self.idle,
            DisplayMode::Volume => &mut self.volume,
            DisplayMode::Menu => &mut self.menu,
            DisplayMode::CoverArt => &mut self.cover_art,
        }
    }

    fn all_mut(&mut self) -> impl Iterator<Item = &mut Widget> {
        self.song_info
            .iter_mut()
            .chain(self.idle.iter_mut())
            .chain(self.volume.iter_mut())
            .chain(self.menu.iter_mut())
            .chain(self.cover_art.iter_mut())
    }
}

struct DisplaySlot {
    surface: BoxedSurface,
    widgets: ModeWidgets,
    menu_rows: usize,
}

/// Drives every attached display.
///
/// Each surface is initialised, cleared and switched on once, then gets its
/// own widget set per mode sized to its geometry, with its own tap on the
/// shared cover art source. Rendering a mode updates
/// that mode's widgets on every surface and flushes; failures are logged
/// and the loop carries on.
pub struct DisplayManager {
    displays: Vec<DisplaySlot>,
    metrics: PerformanceMetrics,
}

impl DisplayManager {
    /// Initialise `surfaces` and build their widget sets.
    ///
    /// Any init failure is returned, there is no partial start.
    pub fn new(surfaces: Vec<BoxedSurface>, ctx: &LayoutContext) -> Result<Self, DisplayError> {
        if surfaces.is_empty() {
            return Err(DisplayError::NoDisplays);
        }

        let cover_art = CoverArtFanout::new(ctx.cover_art.clone());
        let mut displays = Vec::with_capacity(surfaces.len());
        for mut surface in surfaces {
            surface.init()?;
            surface.clear()?;
            surface.flush()?;
            surface.display_on()?;

            let (width, height) = surface.size();
            let slot_ctx = LayoutContext { cover_art: cover_art.tap(), ..ctx.clone() };
            let (widgets, menu_rows) = ModeWidgets::build(width, height, &slot_ctx);
            info!("Display: {}x{} {:?}, Layout: {:?}, menu rows {}",
                  width, height, surface.color_depth(),
                  LayoutCategory::for_size(width, height), menu_rows);

            displays.push(DisplaySlot { surface, widgets, menu_rows });
        }

        Ok(Self {
            displays,
            metrics: PerformanceMetrics::new(Duration::from_millis(250)),
        })
    }

    pub fn display_count(&self) -> usize {
        self.displays.len()
    }

    /// Menu page size: the smallest row count across displays
    pub fn menu_rows(&self) -> usize {
        self.displays.iter().map(|d| d.menu_rows).min().unwrap_or(0)
    }

    pub fn performance_metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn set_frame_budget(&mut self, budget: Duration) {
        self.metrics.set_budget(budget);
    }

    /// Entering a new mode: every widget of every mode forgets its cache
    /// and every surface is blanked.
    pub fn switch_mode(&mut self, mode: DisplayMode) {
        debug!("Switching widgets to {:?} (render headroom {:.0} fps)", mode, self.metrics.fps());
        for slot in &mut self.displays {
            slot.widgets.all_mut().for_each(Widget::reset);
            if let Err(e) = slot.surface.clear() {
                warn!("Display clear failed: {}", e);
            }
        }
    }

    /// Update the widgets of `mode` from `snapshot` and flush
    pub fn render(&mut self, mode: DisplayMode, snapshot: &Snapshot) {
        let frame_start = Instant::now();
        for slot in &mut self.displays {
            for widget in slot.widgets.for_mode(mode) {
                if let Err(e) = widget.update(snapshot, slot.surface.as_mut()) {
                    warn!("{:?} update failed: {}", widget.kind(), e);
                }
            }
        }
        let render_time = frame_start.elapsed();

        let transfer_start = Instant::now();
        for slot in &mut self.displays {
            if let Err(e) = slot.surface.flush() {
                error!("Display flush failed: {}", e);
            }
        }
        self.metrics.record_frame(
            render_time.as_micros() as u64,
            transfer_start.elapsed().as_micros() as u64,
        );
    }

    /// Blank every panel, used at shutdown
    pub fn clear_all(&mut self) {
        for slot in &mut self.displays {
            let cleared = slot.surface.clear().and_then(|_| slot.surface.flush());
            if let Err(e) = cleared {
                error!("Display clear failed: {}", e);
            }
        }
    }
}
