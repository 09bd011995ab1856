/*
 *  display/layout.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Adaptive layout system - widget placement per display mode and geometry
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

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::display::color::Color;
use crate::display::components::clock::CLOCK_SAMPLE;
use crate::display::components::{
    area, AddressLookup, ClockLabel, CoverImage, CpuTemperatureLabel, DateLabel, MarkerDirection,
    NetworkAddressLabel, ProgressBar, SelectionMarker, TextLabel, Widget,
};
use crate::display::font::{FontRenderer, MonoFontRenderer};
use crate::display::DisplayMode;
use crate::metrics;
use crate::services::CoverArtSource;

/// Most menu rows any template shows
pub const MAX_MENU_ROWS: usize = 7;

/// Layout category based on display geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutCategory {
    /// Landscape, taller than 64 pixels (e.g. 320x240)
    WideTall,

    /// Landscape, 33 to 64 pixels tall (e.g. 128x64, 256x64)
    WideShort,

    /// Landscape strip, 32 pixels or less (e.g. 128x32)
    Strip,

    /// Width equals height (e.g. 128x128, 240x240)
    Square,

    /// Taller than wide
    Portrait,
}

impl LayoutCategory {
    /// Pick the template family for a display size
    pub fn for_size(width: u32, height: u32) -> Self {
        if height < width {
            if height > 64 {
                LayoutCategory::WideTall
            } else if height > 32 {
                LayoutCategory::WideShort
            } else {
                LayoutCategory::Strip
            }
        } else if width == height {
            LayoutCategory::Square
        } else {
            LayoutCategory::Portrait
        }
    }
}

/// Collaborators the widgets need beyond their geometry
#[derive(Clone)]
pub struct LayoutContext {
    pub cover_art: Arc<dyn CoverArtSource>,
    pub cover_art_timeout: Duration,
    pub thermal_path: PathBuf,
    pub address_lookup: AddressLookup,
}

impl LayoutContext {
    pub fn new(cover_art: Arc<dyn CoverArtSource>) -> Self {
        Self {
            cover_art,
            cover_art_timeout: Duration::from_millis(2000),
            thermal_path: PathBuf::from(metrics::THERMAL_ZONE0),
            address_lookup: metrics::local_address,
        }
    }

    fn cover(&self, x: i32, y: i32, size: i32, border: bool) -> Widget {
        Widget::CoverImage(CoverImage::new(
            area(x, y, size, size),
            border,
            self.cover_art.clone(),
            self.cover_art_timeout,
        ))
    }

    fn cpu(&self, x: i32, y: i32, w: i32, h: i32) -> CpuTemperatureLabel {
        CpuTemperatureLabel::new(area(x, y, w, h), self.thermal_path.clone())
    }
}

/// Widgets for one mode on one display, in draw order
#[derive(Debug, Default)]
pub struct Layout {
    pub widgets: Vec<Widget>,
    /// visible list rows, non-zero for the menu only
    pub menu_rows: usize,
}

fn label(tag: &str, color: Color, x: i32, y: i32, w: i32, h: i32) -> Widget {
    Widget::ScrollingLabel(TextLabel::tagged(tag, color, area(x, y, w, h)))
}

fn right_label(tag: &str, color: Color, x: i32, y: i32, w: i32, h: i32) -> Widget {
    Widget::ScrollingLabel(TextLabel::tagged(tag, color, area(x, y, w, h)).right_aligned())
}

fn progress(x: i32, y: i32, w: i32, h: i32) -> Widget {
    Widget::ProgressBar(ProgressBar::new(area(x, y, w, h)))
}

/// Build the widget set for `mode` on a `width` x `height` display.
///
/// Same inputs, same widgets: geometry is integer arithmetic on the size
/// only, scaled against a reference height per template.
pub fn build_layout(width: u32, height: u32, mode: DisplayMode, ctx: &LayoutContext) -> Layout {
    let (w, h) = (width as i32, height as i32);
    let category = LayoutCategory::for_size(width, height);
    match mode {
        DisplayMode::None => Layout::default(),
        DisplayMode::SongInfo => Layout { widgets: song_info(w, h, category, ctx), menu_rows: 0 },
        DisplayMode::Idle => Layout { widgets: idle(w, h, ctx), menu_rows: 0 },
        DisplayMode::Volume => Layout { widgets: volume(w, h), menu_rows: 0 },
        DisplayMode::Menu => menu(w, h, category),
        DisplayMode::CoverArt => Layout { widgets: cover_art(w, h, ctx), menu_rows: 0 },
    }
}

fn song_info(w: i32, h: i32, category: LayoutCategory, ctx: &LayoutContext) -> Vec<Widget> {
    let mut widgets = Vec::new();
    match category {
        LayoutCategory::WideTall => {
            let m = 2;
            let big = 48 * h / 240;
            let med = 36 * h / 240;
            let sml = 28 * h / 240;
            let ind = 4 * h / 240;

            let mut x = m;
            let mut y = m;
            widgets.push(label("Title", Color::ACCENT, x, y, w - 2 * x, big));
            y += big + 2;
            widgets.push(progress(x, y, w - 2 * x, ind));
            y += ind + 2;
            widgets.push(label("Artist", Color::White, x, y, w - 2 * x, med));
            y += med + 2;

            x = m * 2;
            let csz = h - y - m * 2;
            widgets.push(ctx.cover(x, y, csz, true));
            x += csz + 8;
            widgets.push(label("Album", Color::White, x, y, w - x, med));
            y += med + 2;
            widgets.push(label("Date", Color::White, x, y, w - x, med));
            y += med + 2;
            widgets.push(label("audio", Color::White, x, h - sml - m, w - x, sml));
            widgets.push(Widget::CpuTemperature(ctx.cpu(x, y, w - x, med)));
        }
        LayoutCategory::WideShort => {
            let big = 18 * h / 64;
            let sml = 12 * h / 64;
            let med = (h - big - sml - 2) / 2;

            let mut x = 0;
            let mut y = 0;
            widgets.push(label("Title", Color::White, x, y, w, big));
            y += big;
            widgets.push(progress(x, y, w, 1));
            y += 2;

            let csz = h - y;
            widgets.push(ctx.cover(x, y, csz, true));
            x += csz + 4;
            widgets.push(label("Artist", Color::White, x, y, w - x, med));
            y += med;
            widgets.push(label("Album", Color::White, x, y, w - x, med));
            widgets.push(label("audio", Color::White, x, h - sml, w - x, sml));
        }
        LayoutCategory::Strip => {
            let big = 16 * h / 32;
            let med = h - big - 2;

            widgets.push(label("Title", Color::White, 0, 0, w, big));
            widgets.push(progress(0, big, w, 1));
            widgets.push(label("Artist", Color::White, 0, big + 2, w, med));
        }
        LayoutCategory::Square => {
            let m = 2;
            let big = 36 * h / 240;
            let med = 32 * h / 240;
            let sml = 20 * h / 240;
            let ind = 6 * h / 240;

            let mut x = m;
            let mut y = m;
            widgets.push(label("Title", Color::ACCENT, x, y, w - 2 * x, big));
            y += big + 2;
            widgets.push(progress(x, y, w - 2 * x, ind));
            y += ind + 2;
            widgets.push(label("Album", Color::White, x, y, w - 2 * x, med));
            y += med + 2;
            widgets.push(label("Artist", Color::White, x, y, w - 2 * x, med));
            y += med + 2;

            x = m * 2;
            let csz = h - y - m * 2;
            widgets.push(ctx.cover(x, y, csz, true));
            x += csz + 8;
            // format details stacked against the bottom edge
            widgets.push(label("trackType", Color::White, x, h - sml * 3 - med - m * 4, w - x, med));
            widgets.push(label("samplerate", Color::White, x, h - sml * 3 - m * 3, w - x, sml));
            widgets.push(label("bitdepth", Color::White, x, h - sml * 2 - m * 2, w - x, sml));
            widgets.push(Widget::CpuTemperature(ctx.cpu(x, h - sml - m, w - x, sml)));
        }
        LayoutCategory::Portrait => {
            let m = 2;
            let big = 36 * h / 320;
            let med = 28 * h / 320;
            let sml = 24 * h / 320;
            let ind = 4 * h / 320;

            let x = m;
            let mut y = m;
            widgets.push(label("Title", Color::ACCENT, x, y, w - 2 * x, big));
            y += big + 2;
            widgets.push(progress(x, y, w - 2 * x, ind));
            y += ind + 2;
            widgets.push(right_label("Artist", Color::White, x, y, w - 2 * x, med));
            y += med + 2;

            let csz = (h - y - 4 - med - 2 - sml).min(w);
            widgets.push(ctx.cover((w - csz) / 2, y, csz, true));
            y += csz + 4;
            widgets.push(label("Album", Color::White, x, y, w - 2 * x, med));
            widgets.push(right_label("audio", Color::White, x, h - sml, w - 2 * x, sml));
        }
    }
    widgets
}

fn idle(w: i32, h: i32, ctx: &LayoutContext) -> Vec<Widget> {
    let mut widgets = Vec::new();

    // the clock takes the tallest face whose "88:88" fits the width
    let tallest = MonoFontRenderer::for_height(h as u32);
    let (font, font_height) = if tallest.measure(CLOCK_SAMPLE).width as i32 <= w {
        (tallest, h)
    } else {
        let font = MonoFontRenderer::fitting(CLOCK_SAMPLE, w as u32, h as u32);
        (font, font.line_height() as i32)
    };
    let face = font.measure(CLOCK_SAMPLE);
    let (cx, cy) = (face.width as i32, face.height as i32);

    let x = (w - cx) / 2;
    let top = (h - cy) / 2;
    widgets.push(Widget::Clock(ClockLabel::new(area(x, top, cx, cy), font)));
    let mut y = top + cy;

    let x = 4;
    let date_h = (font_height * 4 / 10).min(top);
    widgets.push(Widget::Date(DateLabel::new(area(x, top - date_h, w - x, date_h))));

    // address and temperature share what is left below the clock
    let row_h = (font_height * 4 / 10).min((h - y) / 2);
    widgets.push(Widget::NetworkAddress(NetworkAddressLabel::new(
        area(0, y, w - x, row_h),
        ctx.address_lookup,
    )));
    y += row_h;
    widgets.push(Widget::CpuTemperature(ctx.cpu(0, y, w - x, row_h).right_aligned()));

    if h >= 200 {
        widgets.push(label("hostname", Color::White, 0, h - 16, w / 2, 16));
        let x = w / 2;
        widgets.push(right_label("connected", Color::White, x, h - 16, w - x, 16));
    }
    widgets
}

fn volume(w: i32, h: i32) -> Vec<Widget> {
    let m = 4;
    let (oy, cy) = if w <= h {
        let band = w * 2 / 3;
        ((h - band) / 2, band)
    } else {
        (0, h)
    };

    vec![
        Widget::StaticLabel(TextLabel::fixed("volume", Color::White, area(m, oy, w - 2 * m, cy * 6 / 16))),
        right_label("volume", Color::White, 0, oy + cy * 6 / 16, w - 2 * m, cy * 10 / 16),
    ]
}

fn menu(w: i32, h: i32, category: LayoutCategory) -> Layout {
    struct MenuMetrics {
        margin: i32,
        title: i32,
        row: i32,
        indicator: i32,
        indicator_gap: i32,
        mark: (i32, i32),
        row_gap: i32,
        tail_gap: i32,
    }

    let mm = if category == LayoutCategory::Square {
        let ind = 6 * h / 240;
        MenuMetrics {
            margin: 2,
            title: 36 * h / 240,
            row: 24 * h / 240,
            indicator: ind,
            indicator_gap: ind + 2,
            mark: (13, 6),
            row_gap: 1,
            tail_gap: 0,
        }
    } else {
        MenuMetrics {
            margin: 0,
            title: 16 * h / 64,
            row: 12 * h / 64,
            indicator: 1,
            indicator_gap: 3,
            mark: (7, 3),
            row_gap: 0,
            tail_gap: 2,
        }
    };

    let mut widgets = Vec::new();
    let x = mm.margin;
    let mut y = mm.margin;
    let (mark_dx, mark_dy) = mm.mark;

    widgets.push(label("MenuTitle", Color::ACCENT, x, y, w - 2 * x, mm.title));
    y += mm.title + if mm.margin > 0 { 2 } else { 0 };
    widgets.push(progress(x, y, w - 2 * x, mm.indicator));
    y += mm.indicator_gap;
    widgets.push(Widget::SelectionMarker(SelectionMarker::new(
        "MarkerTop",
        area(w / 2 - mark_dx / 2, y, mark_dx, mark_dy),
        MarkerDirection::Up,
    )));
    y += mark_dy;

    // as many rows as fit above the bottom marker
    let pitch = (mm.row + mm.row_gap).max(1);
    let rows = ((h - y - mark_dy - mm.tail_gap) / pitch).clamp(1, MAX_MENU_ROWS as i32);
    for n in 1..=rows {
        widgets.push(label(&format!("MenuList{}", n), Color::MENU, x, y, w - 2 * x, mm.row));
        y += pitch;
    }
    y += mm.tail_gap;
    widgets.push(Widget::SelectionMarker(SelectionMarker::new(
        "MarkerBottom",
        area(w / 2 - mark_dx / 2, y, mark_dx, mark_dy),
        MarkerDirection::Down,
    )));

    Layout { widgets, menu_rows: rows as usize }
}

fn cover_art(w: i32, h: i32, ctx: &LayoutContext) -> Vec<Widget> {
    let side = w.min(h);
    vec![ctx.cover((w - side) / 2, (h - side) / 2, side, false)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::components::WidgetKind;
    use crate::services::LocalCoverArt;
    use embedded_graphics::primitives::Rectangle;
    use embedded_graphics::prelude::*;

    fn ctx() -> LayoutContext {
        let mut ctx = LayoutContext::new(Arc::new(LocalCoverArt::default()));
        ctx.address_lookup = || None;
        ctx
    }

    fn shape(layout: &Layout) -> Vec<(WidgetKind, Rectangle)> {
        layout.widgets.iter().map(|w| (w.kind(), w.rect())).collect()
    }

    fn inside(layout: &Layout, width: u32, height: u32) -> bool {
        let screen = Rectangle::new(Point::zero(), Size::new(width, height));
        layout.widgets.iter().all(|w| {
            let r = w.rect();
            r.size.width == 0
                || r.size.height == 0
                || (screen.contains(r.top_left) && r.bottom_right().is_some_and(|p| screen.contains(p)))
        })
    }

    const MODES: [DisplayMode; 5] = [
        DisplayMode::SongInfo,
        DisplayMode::Idle,
        DisplayMode::Volume,
        DisplayMode::Menu,
        DisplayMode::CoverArt,
    ];

    #[test]
    fn test_categories() {
        assert_eq!(LayoutCategory::for_size(320, 240), LayoutCategory::WideTall);
        assert_eq!(LayoutCategory::for_size(128, 64), LayoutCategory::WideShort);
        assert_eq!(LayoutCategory::for_size(256, 64), LayoutCategory::WideShort);
        assert_eq!(LayoutCategory::for_size(128, 32), LayoutCategory::Strip);
        assert_eq!(LayoutCategory::for_size(240, 240), LayoutCategory::Square);
        assert_eq!(LayoutCategory::for_size(240, 320), LayoutCategory::Portrait);
    }

    #[test]
    fn test_deterministic() {
        let ctx = ctx();
        for (w, h) in [(128, 64), (128, 32), (240, 240), (240, 320), (320, 240)] {
            for mode in MODES {
                let a = build_layout(w, h, mode, &ctx);
                let b = build_layout(w, h, mode, &ctx);
                assert_eq!(shape(&a), shape(&b));
                assert_eq!(a.menu_rows, b.menu_rows);
            }
        }
    }

    #[test]
    fn test_small_oled_fits_screen() {
        let ctx = ctx();
        for (w, h) in [(128, 64), (256, 64), (128, 32)] {
            for mode in MODES {
                assert!(inside(&build_layout(w, h, mode, &ctx), w, h), "{:?} {}x{}", mode, w, h);
            }
        }
    }

    #[test]
    fn test_song_info_128x64() {
        let layout = build_layout(128, 64, DisplayMode::SongInfo, &ctx());
        let shape = shape(&layout);
        assert_eq!(shape[0], (WidgetKind::ScrollingLabel, area(0, 0, 128, 18)));
        assert_eq!(shape[1], (WidgetKind::ProgressBar, area(0, 18, 128, 1)));
        assert_eq!(shape[2], (WidgetKind::CoverImage, area(0, 20, 44, 44)));
        assert_eq!(shape[3].1, area(48, 20, 80, 16));
        assert_eq!(shape[5].1, area(48, 52, 80, 12));
    }

    #[test]
    fn test_idle_128x64() {
        let layout = build_layout(128, 64, DisplayMode::Idle, &ctx());
        let kinds: Vec<_> = layout.widgets.iter().map(|w| w.kind()).collect();
        assert_eq!(
            kinds,
            [WidgetKind::Clock, WidgetKind::Date, WidgetKind::NetworkAddress, WidgetKind::CpuTemperature]
        );
        // 10x20 face, centered
        assert_eq!(layout.widgets[0].rect(), area(39, 22, 50, 20));
        assert_eq!(layout.widgets[2].rect(), area(0, 42, 124, 11));
        assert_eq!(layout.widgets[3].rect(), area(0, 53, 124, 11));
    }

    #[test]
    fn test_idle_tall_adds_status_strip() {
        let layout = build_layout(240, 240, DisplayMode::Idle, &ctx());
        assert_eq!(layout.widgets.len(), 6);
        assert_eq!(layout.widgets[4].rect(), area(0, 224, 120, 16));
    }

    #[test]
    fn test_menu_rows() {
        let ctx = ctx();
        assert_eq!(build_layout(128, 64, DisplayMode::Menu, &ctx).menu_rows, 3);
        assert_eq!(build_layout(256, 64, DisplayMode::Menu, &ctx).menu_rows, 3);
        assert_eq!(build_layout(240, 240, DisplayMode::Menu, &ctx).menu_rows, 7);
        assert_eq!(build_layout(128, 64, DisplayMode::SongInfo, &ctx).menu_rows, 0);

        let layout = build_layout(128, 64, DisplayMode::Menu, &ctx);
        let markers = layout
            .widgets
            .iter()
            .filter(|w| w.kind() == WidgetKind::SelectionMarker)
            .count();
        assert_eq!(markers, 2);
        assert_eq!(layout.widgets.last().map(|w| w.rect()), Some(area(61, 60, 7, 3)));
    }

    #[test]
    fn test_volume_portrait_band() {
        let layout = build_layout(240, 320, DisplayMode::Volume, &ctx());
        // 160px band centered vertically
        assert_eq!(layout.widgets[0].rect(), area(4, 80, 232, 60));
        assert_eq!(layout.widgets[1].rect(), area(0, 140, 232, 100));
    }

    #[test]
    fn test_cover_art_largest_square() {
        let ctx = ctx();
        assert_eq!(build_layout(128, 64, DisplayMode::CoverArt, &ctx).widgets[0].rect(), area(32, 0, 64, 64));
        assert_eq!(build_layout(240, 320, DisplayMode::CoverArt, &ctx).widgets[0].rect(), area(0, 40, 240, 240));
        assert!(build_layout(128, 64, DisplayMode::None, &ctx).widgets.is_empty());
    }
}
