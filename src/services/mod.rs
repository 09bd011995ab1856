/*
 *  services/mod.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Collaborator services the display talks to: the player and the menu
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

use std::str::FromStr;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snapshot::Snapshot;

pub mod local;
pub mod menu;

pub use local::{LocalCoverArt, LocalPlayer};
pub use menu::ListMenu;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("player not connected")]
    NotConnected,
    #[error("no cover art available")]
    NoCoverArt,
    #[error("unknown menu action '{0}'")]
    UnknownAction(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// Transport control and state of the music player backend.
///
/// The change flag is one-shot: the render loop reads `has_changed()`,
/// pulls a fresh `snapshot()` and calls `reset_changed()`.
pub trait PlayerService: Send {
    fn connect(&mut self) -> Result<(), ServiceError>;
    fn has_changed(&self) -> bool;
    fn reset_changed(&mut self);
    fn snapshot(&self) -> Snapshot;

    fn prev(&mut self) -> Result<(), ServiceError>;
    fn next(&mut self) -> Result<(), ServiceError>;
    fn toggle(&mut self) -> Result<(), ServiceError>;

    /// Nudge the volume by `delta` steps, returning the resulting level
    fn adjust_volume(&mut self, delta: i32) -> Result<i32, ServiceError>;

    /// Handle used by cover widgets, fetched off the render thread
    fn cover_art(&self) -> Arc<dyn CoverArtSource>;
}

/// Result of a cover art pull; `changed` false means keep what is shown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverArtFetch {
    pub bytes: Vec<u8>,
    pub changed: bool,
}

pub trait CoverArtSource: Send + Sync {
    fn has_new_cover_art(&self) -> bool;
    fn fetch_cover_art(&self) -> Result<Vec<u8>, ServiceError>;

    /// Fetch when forced or when the player reports new art.
    fn pull(&self, force: bool) -> CoverArtFetch {
        if force || self.has_new_cover_art() {
            match self.fetch_cover_art() {
                Ok(bytes) => return CoverArtFetch { bytes, changed: true },
                Err(e) => debug!("Cover art fetch failed: {}", e),
            }
        }
        CoverArtFetch::default()
    }
}

/// Shares one cover art source between several widgets.
///
/// The source's new-art flag is one-shot, so the first widget to look
/// would hide the change from the rest. The hub copies it onto a flag
/// per tap and each tap clears only its own.
pub struct CoverArtFanout {
    source: Arc<dyn CoverArtSource>,
    fresh: Mutex<Vec<bool>>,
}

impl CoverArtFanout {
    pub fn new(source: Arc<dyn CoverArtSource>) -> Arc<Self> {
        Arc::new(Self { source, fresh: Mutex::new(Vec::new()) })
    }

    /// A new consumer; it starts out with nothing to report
    pub fn tap(self: &Arc<Self>) -> Arc<dyn CoverArtSource> {
        let mut fresh = self.lock();
        fresh.push(false);
        Arc::new(CoverArtTap { hub: self.clone(), index: fresh.len() - 1 })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<bool>> {
        self.fresh.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // move the source flag onto every tap
    fn sync(&self, fresh: &mut [bool]) {
        if self.source.has_new_cover_art() {
            fresh.iter_mut().for_each(|f| *f = true);
        }
    }
}

struct CoverArtTap {
    hub: Arc<CoverArtFanout>,
    index: usize,
}

impl CoverArtSource for CoverArtTap {
    fn has_new_cover_art(&self) -> bool {
        let mut fresh = self.hub.lock();
        self.hub.sync(&mut fresh);
        fresh.get(self.index).copied().unwrap_or(false)
    }

    fn fetch_cover_art(&self) -> Result<Vec<u8>, ServiceError> {
        let mut fresh = self.hub.lock();
        self.hub.sync(&mut fresh);
        if let Some(flag) = fresh.get_mut(self.index) {
            *flag = false;
        }
        self.hub.source.fetch_cover_art()
    }
}

/// Entry of the local menu; `action` is dispatched on execute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub action: String,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self { label: label.into(), action: action.into() }
    }
}

/// Transport commands a menu entry can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Play,
    Pause,
    Toggle,
    Next,
    Prev,
    VolumeUp,
    VolumeDown,
}

impl FromStr for PlayerAction {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "toggle" => Ok(Self::Toggle),
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "volume+" => Ok(Self::VolumeUp),
            "volume-" => Ok(Self::VolumeDown),
            other => Err(ServiceError::UnknownAction(other.to_string())),
        }
    }
}

/// Things the menu asks the application to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// show the cover art screen
    CoverArtRequested,
    Player(PlayerAction),
}

pub trait MenuService: Send {
    /// Page size, the smallest row count over all attached displays
    fn set_visible_rows(&mut self, rows: usize);
    fn is_open(&self) -> bool;
    fn open(&mut self);
    fn close(&mut self);
    fn prev(&mut self);
    fn next(&mut self);
    fn execute(&mut self);

    fn has_changed(&self) -> bool;
    fn reset_changed(&mut self);
    fn snapshot(&self) -> Snapshot;

    /// Queue of events produced by `execute`, drained once per tick
    fn subscribe(&mut self) -> Receiver<MenuEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Flaky {
        fresh: AtomicBool,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CoverArtSource for Flaky {
        fn has_new_cover_art(&self) -> bool {
            self.fresh.load(Ordering::SeqCst)
        }
        fn fetch_cover_art(&self) -> Result<Vec<u8>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail { Err(ServiceError::NoCoverArt) } else { Ok(vec![1, 2, 3]) }
        }
    }

    #[test]
    fn test_pull_gating() {
        let src = Flaky { fresh: AtomicBool::new(false), fail: false, calls: AtomicUsize::new(0) };
        assert!(!src.pull(false).changed);
        assert_eq!(src.calls.load(Ordering::SeqCst), 0);

        let forced = src.pull(true);
        assert!(forced.changed);
        assert_eq!(forced.bytes, vec![1, 2, 3]);

        src.fresh.store(true, Ordering::SeqCst);
        assert!(src.pull(false).changed);
        assert_eq!(src.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_pull_failure_is_unchanged() {
        let src = Flaky { fresh: AtomicBool::new(true), fail: true, calls: AtomicUsize::new(0) };
        assert_eq!(src.pull(true), CoverArtFetch::default());
    }
    #[test]
    fn test_fanout_reports_new_art_to_every_tap() {
        let art = Arc::new(LocalCoverArt::default());
        let hub = CoverArtFanout::new(art.clone());
        let (a, b) = (hub.tap(), hub.tap());
        assert!(!a.pull(false).changed);

        art.set(vec![7]);
        let first = a.pull(false);
        assert_eq!(first, CoverArtFetch { bytes: vec![7], changed: true });
        // the source flag is gone but b still sees the change, once
        assert!(!art.has_new_cover_art());
        assert!(b.pull(false).changed);
        assert!(!b.pull(false).changed);
        assert!(!a.pull(false).changed);
    }

    #[test]
    fn test_action_names() {
        assert_eq!("volume+".parse::<PlayerAction>().ok(), Some(PlayerAction::VolumeUp));
        assert_eq!("pause".parse::<PlayerAction>().ok(), Some(PlayerAction::Pause));
        assert!(matches!(
            "shuffle".parse::<PlayerAction>(),
            Err(ServiceError::UnknownAction(name)) if name == "shuffle"
        ));
    }
}
