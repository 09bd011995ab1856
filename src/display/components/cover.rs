/*
 *  display/components/cover.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Album cover widget, fetch and decode run on a worker thread
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

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Gray8;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use image::imageops::FilterType;
use log::{debug, warn};

use crate::display::error::DisplayError;
use crate::display::font::{FontRenderer, MonoFontRenderer};
use crate::display::traits::Surface;
use crate::services::CoverArtSource;
use crate::vframebuf::Bitmap;

const PLACEHOLDER: &str = "NoImage";

/// Decode `bytes` and stretch to exactly `width` x `height` luma pixels
pub fn decode_cover(bytes: &[u8], width: u32, height: u32) -> Option<Bitmap> {
    if bytes.is_empty() || width == 0 || height == 0 {
        return None;
    }
    let img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!("Cover art decode failed: {}", e);
            return None;
        }
    };
    let luma = img.resize_exact(width, height, FilterType::Triangle).to_luma8();
    Bitmap::from_luma(width, height, luma.as_raw())
}

enum CoverResponse {
    /// player has nothing new, keep what is on screen
    Unchanged,
    /// fresh art, None when it could not be decoded
    Art(Option<Bitmap>),
}

/// Requests and replies carry the widget's generation; a reset bumps it
/// so answers to requests made before the reset are dropped.
struct CoverRequest {
    generation: u64,
    force: bool,
}

struct CoverReply {
    generation: u64,
    response: CoverResponse,
}

struct CoverWorker {
    requests: Sender<CoverRequest>,
    responses: Receiver<CoverReply>,
}

impl CoverWorker {
    // one thread per widget, exits when the widget drops its sender
    fn spawn(source: Arc<dyn CoverArtSource>, width: u32, height: u32) -> Option<Self> {
        let (req_tx, req_rx) = mpsc::channel::<CoverRequest>();
        let (resp_tx, resp_rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("cover-art".to_string())
            .spawn(move || {
                while let Ok(CoverRequest { generation, force }) = req_rx.recv() {
                    let fetch = source.pull(force);
                    let response = if fetch.changed {
                        CoverResponse::Art(decode_cover(&fetch.bytes, width, height))
                    } else {
                        CoverResponse::Unchanged
                    };
                    if resp_tx.send(CoverReply { generation, response }).is_err() {
                        break;
                    }
                }
            });
        match spawned {
            Ok(_) => Some(Self { requests: req_tx, responses: resp_rx }),
            Err(e) => {
                warn!("Cover art worker failed to start: {}", e);
                None
            }
        }
    }
}

/// Album art in a box, optionally framed by a one pixel border.
///
/// Every update asks the worker for art, forcing a fetch while nothing is
/// cached. A request that outlives the timeout shows the placeholder; its
/// answer is still used once it arrives.
pub struct CoverImage {
    rect: Rectangle,
    border: bool,
    source: Arc<dyn CoverArtSource>,
    timeout: Duration,
    worker: Option<CoverWorker>,
    generation: u64,
    pending: Option<Instant>,
    timed_out: bool,
    cached: bool,
    frame: Option<Bitmap>,
}

impl std::fmt::Debug for CoverImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverImage")
            .field("rect", &self.rect)
            .field("border", &self.border)
            .field("cached", &self.cached)
            .finish()
    }
}

impl CoverImage {
    pub fn new(rect: Rectangle, border: bool, source: Arc<dyn CoverArtSource>, timeout: Duration) -> Self {
        Self {
            rect,
            border,
            source,
            timeout,
            worker: None,
            generation: 0,
            pending: None,
            timed_out: false,
            cached: false,
            frame: None,
        }
    }

    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    /// Whether the box currently holds decoded art
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    fn inner_size(&self) -> Size {
        let inset = if self.border { 2 } else { 0 };
        Size::new(
            self.rect.size.width.saturating_sub(inset),
            self.rect.size.height.saturating_sub(inset),
        )
    }

    pub fn update(&mut self, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        self.update_at(Instant::now(), surface)
    }

    pub fn update_at(&mut self, now: Instant, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        let Size { width, height } = self.inner_size();
        if width == 0 || height == 0 {
            return Ok(());
        }
        if self.worker.is_none() {
            self.worker = CoverWorker::spawn(self.source.clone(), width, height);
            self.pending = None;
        }
        let Some(worker) = self.worker.as_ref() else {
            return Ok(());
        };

        let reply = loop {
            match worker.responses.try_recv() {
                Ok(reply) if reply.generation != self.generation => {
                    debug!("Dropping cover art requested before reset");
                }
                other => break other,
            }
        };

        match reply {
            Ok(CoverReply { response, .. }) => {
                self.pending = None;
                self.timed_out = false;
                match response {
                    CoverResponse::Unchanged => {}
                    CoverResponse::Art(Some(art)) => self.draw_art(&art, surface)?,
                    CoverResponse::Art(None) => self.draw_placeholder(surface)?,
                }
            }
            Err(TryRecvError::Empty) => {
                let overdue = self
                    .pending
                    .is_some_and(|t| now.saturating_duration_since(t) >= self.timeout);
                if overdue && !self.timed_out {
                    warn!("Cover art fetch exceeded {:?}", self.timeout);
                    self.timed_out = true;
                    self.draw_placeholder(surface)?;
                }
            }
            Err(TryRecvError::Disconnected) => {
                debug!("Cover art worker gone, restarting");
                self.worker = None;
                self.pending = None;
                return Ok(());
            }
        }

        if self.pending.is_none() {
            if let Some(worker) = self.worker.as_ref() {
                let request = CoverRequest { generation: self.generation, force: !self.cached };
                if worker.requests.send(request).is_ok() {
                    self.pending = Some(now);
                }
            }
        }
        Ok(())
    }

    fn blank_frame(&mut self) -> &mut Bitmap {
        let Size { width, height } = self.rect.size;
        let border = self.border;
        let frame = self.frame.get_or_insert_with(|| Bitmap::new(width, height, Gray8::BLACK));
        frame.clear_color(Gray8::BLACK);
        if border {
            let _ = Rectangle::new(Point::zero(), Size::new(width, height))
                .into_styled(PrimitiveStyle::with_stroke(Gray8::WHITE, 1))
                .draw(frame);
        }
        frame
    }

    fn draw_art(&mut self, art: &Bitmap, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        let origin = if self.border { 1 } else { 0 };
        let top_left = self.rect.top_left;
        let frame = self.blank_frame();
        frame.blit(origin, origin, art);
        surface.write_region(top_left.x, top_left.y, frame)?;
        self.cached = true;
        Ok(())
    }

    fn draw_placeholder(&mut self, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        let Size { width, height } = self.rect.size;
        let top_left = self.rect.top_left;
        let font = MonoFontRenderer::for_height(height / 4);
        let bounds = font.measure(PLACEHOLDER);
        let frame = self.blank_frame();
        let at = Point::new(
            (width as i32 - bounds.width as i32) / 2,
            (height as i32 - bounds.height as i32) / 2,
        );
        font.rasterize(PLACEHOLDER, Gray8::WHITE, frame, at);
        surface.write_region(top_left.x, top_left.y, frame)?;
        self.cached = false;
        Ok(())
    }

    /// Forget what is on screen: the next update asks for a forced fetch
    /// and anything still in flight is ignored.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
        self.cached = false;
        self.timed_out = false;
        if let Some(worker) = self.worker.as_ref() {
            while worker.responses.try_recv().is_ok() {}
        }
    }
}
