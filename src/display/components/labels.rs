/*
 *  display/components/labels.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text labels bound to snapshot keys, fixed captions and the IP address
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

use std::net::IpAddr;
use std::time::{Duration, Instant};

use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::display::color::Color;
use crate::display::components::scrollers::{Align, TextPainter, TextStyle};
use crate::display::error::DisplayError;
use crate::display::traits::Surface;
use crate::snapshot::Snapshot;

/// Where a label gets its text from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// value of a snapshot key, plus its `_attr` companion
    Tag(String),
    /// constant caption
    Fixed(String),
}

/// A single line of text in a box, redrawn when the text or its
/// attributes change and scrolled while it overflows.
#[derive(Debug)]
pub struct TextLabel {
    source: TextSource,
    color: Color,
    align: Align,
    painter: TextPainter,
    shown: Option<(String, String)>,
}

impl TextLabel {
    /// Label showing the value of snapshot key `tag`
    pub fn tagged(tag: &str, color: Color, rect: Rectangle) -> Self {
        Self::new(TextSource::Tag(tag.to_string()), color, rect)
    }

    /// Label showing a constant caption
    pub fn fixed(text: &str, color: Color, rect: Rectangle) -> Self {
        Self::new(TextSource::Fixed(text.to_string()), color, rect)
    }

    fn new(source: TextSource, color: Color, rect: Rectangle) -> Self {
        Self {
            source,
            color,
            align: Align::Left,
            painter: TextPainter::new(rect),
            shown: None,
        }
    }

    /// Right-align text that fits the box
    pub fn right_aligned(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    pub fn rect(&self) -> Rectangle {
        self.painter.rect()
    }

    pub fn source(&self) -> &TextSource {
        &self.source
    }

    fn resolve<'a>(&'a self, snapshot: &'a Snapshot) -> (&'a str, &'a str) {
        match &self.source {
            TextSource::Tag(tag) => (snapshot.get(tag), snapshot.attr(tag)),
            TextSource::Fixed(text) => (text.as_str(), ""),
        }
    }

    pub fn update(&mut self, snapshot: &Snapshot, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        if self.painter.is_degenerate() {
            return Ok(());
        }
        let (text, attr) = self.resolve(snapshot);
        let unchanged = matches!(&self.shown, Some((t, a)) if t == text && a == attr);
        if !unchanged {
            let style = TextStyle {
                color: self.color,
                align: if attr.contains('C') { Align::Center } else { self.align },
                highlight: attr.contains('H'),
            };
            let shown = (text.to_string(), attr.to_string());
            self.painter.paint(&shown.0, style, surface)?;
            self.shown = Some(shown);
        }
        self.painter.scroll(surface)
    }

    pub fn reset(&mut self) {
        self.shown = None;
        self.painter.reset();
    }
}

/// How the address label finds the host address
pub type AddressLookup = fn() -> Option<IpAddr>;

/// Seconds between address lookups
pub const ADDRESS_REFRESH: Duration = Duration::from_secs(10);

const NO_ADDRESS: &str = "127.0.0.1";

/// Shows the host's primary address, tinted when there is no usable one
#[derive(Debug)]
pub struct NetworkAddressLabel {
    lookup: AddressLookup,
    last_checked: Option<Instant>,
    address: String,
    usable: bool,
    painter: TextPainter,
    shown: Option<String>,
}

impl NetworkAddressLabel {
    pub fn new(rect: Rectangle, lookup: AddressLookup) -> Self {
        Self {
            lookup,
            last_checked: None,
            address: NO_ADDRESS.to_string(),
            usable: false,
            painter: TextPainter::new(rect),
            shown: None,
        }
    }

    pub fn rect(&self) -> Rectangle {
        self.painter.rect()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// A lookup is due on first use and every `ADDRESS_REFRESH` after
    pub fn refresh_due(&self, now: Instant) -> bool {
        match self.last_checked {
            None => true,
            Some(t) => now.saturating_duration_since(t) >= ADDRESS_REFRESH,
        }
    }

    fn refresh(&mut self, now: Instant) {
        self.last_checked = Some(now);
        match (self.lookup)() {
            Some(ip) => {
                self.usable = !ip.is_loopback() && !ip.is_unspecified();
                self.address = ip.to_string();
            }
            None => {
                self.usable = false;
                self.address = NO_ADDRESS.to_string();
            }
        }
        debug!("Address lookup: {} (usable {})", self.address, self.usable);
    }

    pub fn update(&mut self, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        self.update_at(Instant::now(), surface)
    }

    pub fn update_at(&mut self, now: Instant, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        if self.painter.is_degenerate() {
            return Ok(());
        }
        if self.refresh_due(now) {
            self.refresh(now);
        }
        if self.shown.as_deref() != Some(self.address.as_str()) {
            let style = TextStyle {
                color: if self.usable { Color::White } else { Color::WARNING },
                align: Align::Right,
                highlight: false,
            };
            self.painter.paint(&self.address, style, surface)?;
            self.shown = Some(self.address.clone());
        }
        self.painter.scroll(surface)
    }

    pub fn reset(&mut self) {
        self.shown = None;
        self.painter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::components::scrollers::area;
    use crate::display::drivers::mock::MockDriver;
    use crate::display::font::{FontRenderer, MonoFontRenderer};
    use crate::display::traits::ColorDepth;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn blits(surface: &MockDriver) -> usize {
        surface.state().lock().unwrap().blit_count
    }

    #[test]
    fn test_redraw_only_on_change() {
        let mut surface = MockDriver::new_with_size(128, 64);
        let mut label = TextLabel::tagged("Title", Color::White, area(0, 0, 128, 16));
        let snap: Snapshot = [("Title", "Blue")].into_iter().collect();

        label.update(&snap, &mut surface).unwrap();
        label.update(&snap, &mut surface).unwrap();
        assert_eq!(blits(&surface), 1);

        let snap: Snapshot = [("Title", "Blue"), ("Title_attr", "H")].into_iter().collect();
        label.update(&snap, &mut surface).unwrap();
        assert_eq!(blits(&surface), 2);

        label.reset();
        label.update(&snap, &mut surface).unwrap();
        assert_eq!(blits(&surface), 3);
    }

    #[test]
    fn test_overflow_blits_every_call() {
        let mut surface = MockDriver::new_with_size(128, 64);
        let mut label = TextLabel::tagged("Artist", Color::White, area(0, 0, 30, 10));
        let snap: Snapshot = [("Artist", "Miles Davis Quintet")].into_iter().collect();
        label.update(&snap, &mut surface).unwrap();
        // first paint plus the first marquee frame
        assert_eq!(blits(&surface), 2);
        label.update(&snap, &mut surface).unwrap();
        assert_eq!(blits(&surface), 3);
    }

    #[test]
    fn test_fixed_caption_ignores_snapshot() {
        let mut surface = MockDriver::new_with_size(128, 64);
        let mut label = TextLabel::fixed("volume", Color::White, area(4, 4, 100, 12));
        label.update(&Snapshot::new(), &mut surface).unwrap();
        let snap: Snapshot = [("volume", "40")].into_iter().collect();
        label.update(&snap, &mut surface).unwrap();
        assert_eq!(blits(&surface), 1);
        assert!(surface.count_on_pixels() > 0);
    }

    static LOOKUPS: AtomicUsize = AtomicUsize::new(0);

    fn counting_lookup() -> Option<IpAddr> {
        LOOKUPS.fetch_add(1, Ordering::SeqCst);
        Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)))
    }

    #[test]
    fn test_address_rate_limited() {
        let mut surface = MockDriver::new_with_size(128, 64);
        let mut label = NetworkAddressLabel::new(area(0, 40, 124, 12), counting_lookup);
        let t0 = Instant::now();
        label.update_at(t0, &mut surface).unwrap();
        label.update_at(t0 + Duration::from_secs(3), &mut surface).unwrap();
        label.update_at(t0 + Duration::from_secs(9), &mut surface).unwrap();
        assert_eq!(LOOKUPS.load(Ordering::SeqCst), 1);
        assert_eq!(label.address(), "192.168.1.20");
        assert!(!label.refresh_due(t0 + Duration::from_millis(9999)));
        assert!(label.refresh_due(t0 + ADDRESS_REFRESH));

        label.update_at(t0 + ADDRESS_REFRESH, &mut surface).unwrap();
        assert_eq!(LOOKUPS.load(Ordering::SeqCst), 2);
        // same address, nothing redrawn
        assert_eq!(blits(&surface), 1);
    }

    #[test]
    fn test_no_address_is_loopback() {
        let mut surface = MockDriver::new_with_size(128, 64);
        let mut label = NetworkAddressLabel::new(area(0, 0, 124, 12), || None);
        label.update(&mut surface).unwrap();
        assert_eq!(label.address(), "127.0.0.1");
        assert!(!label.usable);
    }

    #[test]
    fn test_marquee_wraps_once_text_has_left() {
        let text = "Miles Davis Quintet";
        let cw = MonoFontRenderer::for_height(10).measure(text).width as i32;
        let mut surface = MockDriver::new_with_size(128, 64);
        let mut label = TextLabel::tagged("Artist", Color::White, area(0, 0, 30, 10));
        let snap: Snapshot = [("Artist", text)].into_iter().collect();

        let mut offsets = Vec::new();
        while offsets.len() < 200 && offsets.last() != Some(&-cw) {
            label.update(&snap, &mut surface).unwrap();
            offsets.push(label.painter.marquee().offset());
        }
        assert_eq!(offsets.first(), Some(&29));
        assert!(offsets.windows(2).all(|w| w[1] == w[0] - 1));
        assert_eq!(offsets.last(), Some(&-cw));

        // this frame draws the text fully out of the box, then wraps
        label.update(&snap, &mut surface).unwrap();
        assert_eq!(label.painter.marquee().offset(), 30);
        assert_eq!(surface.count_on_pixels(), 0);

        label.update(&snap, &mut surface).unwrap();
        assert_eq!(label.painter.marquee().offset(), 29);
        assert!(surface.count_on_pixels() > 0);
    }

    fn brightest_address_pixel(lookup: AddressLookup) -> u8 {
        let mut surface = MockDriver::with_depth(128, 64, ColorDepth::Gray4);
        let mut label = NetworkAddressLabel::new(area(0, 0, 124, 12), lookup);
        label.update(&mut surface).unwrap();
        let fb = surface.framebuffer();
        (0..124)
            .flat_map(|x| (0..12).map(move |y| (x, y)))
            .filter_map(|(x, y)| fb.luma_at(x, y))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_unusable_address_drawn_in_warning_tint() {
        // WARNING quantised to 4 bits
        assert_eq!(brightest_address_pixel(|| None), 170);
        assert_eq!(brightest_address_pixel(|| Some(IpAddr::V4(Ipv4Addr::LOCALHOST))), 170);
        assert_eq!(brightest_address_pixel(|| Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)))), 255);
    }
}
