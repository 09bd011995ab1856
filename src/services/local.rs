/*
 *  services/local.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-process player used when no backend is attached
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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info};

use crate::metrics;
use crate::services::{CoverArtSource, PlayerService, ServiceError};
use crate::snapshot::Snapshot;

pub const VOLUME_MIN: i32 = 0;
pub const VOLUME_MAX: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    Stop,
    Play,
    Pause,
}

impl Transport {
    fn as_str(&self) -> &'static str {
        match self {
            Transport::Stop => "stop",
            Transport::Play => "play",
            Transport::Pause => "pause",
        }
    }
}

/// Cover art held in memory, flagged fresh whenever it is replaced
#[derive(Debug, Default)]
pub struct LocalCoverArt {
    bytes: Mutex<Option<Vec<u8>>>,
    fresh: AtomicBool,
}

impl LocalCoverArt {
    pub fn set(&self, bytes: Vec<u8>) {
        *self.bytes.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        self.fresh.store(true, Ordering::Release);
    }
}

impl CoverArtSource for LocalCoverArt {
    fn has_new_cover_art(&self) -> bool {
        self.fresh.load(Ordering::Acquire)
    }

    fn fetch_cover_art(&self) -> Result<Vec<u8>, ServiceError> {
        self.fresh.store(false, Ordering::Release);
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ServiceError::NoCoverArt)
    }
}

/// Player with no backend: transport state, a volume level and
/// whatever track details the caller sets.
#[derive(Debug)]
pub struct LocalPlayer {
    transport: Transport,
    volume: i32,
    changed: bool,
    connected: bool,
    track: Snapshot,
    cover: Arc<LocalCoverArt>,
}

impl Default for LocalPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalPlayer {
    pub fn new() -> Self {
        Self {
            transport: Transport::Stop,
            volume: 50,
            changed: false,
            connected: false,
            track: Snapshot::new(),
            cover: Arc::new(LocalCoverArt::default()),
        }
    }

    /// Replace a track field (Title, Artist, Album...)
    pub fn set_track_field(&mut self, key: &str, value: &str) {
        self.track.insert(key, value);
        self.changed = true;
    }

    pub fn set_cover_art(&self, bytes: Vec<u8>) {
        self.cover.set(bytes);
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }

    pub fn is_playing(&self) -> bool {
        self.transport == Transport::Play
    }
}

impl PlayerService for LocalPlayer {
    fn connect(&mut self) -> Result<(), ServiceError> {
        info!("Local player ready");
        self.connected = true;
        self.changed = true;
        Ok(())
    }

    fn has_changed(&self) -> bool {
        self.changed
    }

    fn reset_changed(&mut self) {
        self.changed = false;
    }

    fn snapshot(&self) -> Snapshot {
        let mut snap = self.track.clone();
        snap.insert("state", self.transport.as_str());
        snap.insert("volume", self.volume.to_string());
        snap.insert("hostname", metrics::hostname());
        snap.insert("connected", if self.connected { "local" } else { "offline" });
        snap
    }

    fn prev(&mut self) -> Result<(), ServiceError> {
        if !self.connected {
            return Err(ServiceError::NotConnected);
        }
        debug!("prev: no queue, restarting track");
        self.track.insert("elapsed", "0");
        self.changed = true;
        Ok(())
    }

    fn next(&mut self) -> Result<(), ServiceError> {
        if !self.connected {
            return Err(ServiceError::NotConnected);
        }
        debug!("next: no queue, stopping");
        self.transport = Transport::Stop;
        self.changed = true;
        Ok(())
    }

    fn toggle(&mut self) -> Result<(), ServiceError> {
        if !self.connected {
            return Err(ServiceError::NotConnected);
        }
        self.transport = match self.transport {
            Transport::Play => Transport::Pause,
            Transport::Pause | Transport::Stop => Transport::Play,
        };
        debug!("toggle -> {}", self.transport.as_str());
        self.changed = true;
        Ok(())
    }

    fn adjust_volume(&mut self, delta: i32) -> Result<i32, ServiceError> {
        let level = (self.volume + delta).clamp(VOLUME_MIN, VOLUME_MAX);
        if level != self.volume {
            self.volume = level;
            self.changed = true;
        }
        Ok(level)
    }

    fn cover_art(&self) -> Arc<dyn CoverArtSource> {
        self.cover.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_need_connect() {
        let mut player = LocalPlayer::new();
        assert!(matches!(player.toggle(), Err(ServiceError::NotConnected)));
        player.connect().unwrap();
        assert!(player.has_changed());
        player.reset_changed();
        player.toggle().unwrap();
        assert!(player.is_playing());
        assert!(player.has_changed());
        assert_eq!(player.snapshot().get("state"), "play");
        player.toggle().unwrap();
        assert_eq!(player.snapshot().get("state"), "pause");
    }

    #[test]
    fn test_volume_clamps() {
        let mut player = LocalPlayer::new();
        assert_eq!(player.adjust_volume(0).unwrap(), 50);
        assert!(!player.has_changed());
        for _ in 0..60 {
            player.adjust_volume(1).unwrap();
        }
        assert_eq!(player.volume(), VOLUME_MAX);
        assert_eq!(player.adjust_volume(-200).unwrap(), VOLUME_MIN);
        assert_eq!(player.snapshot().get("volume"), "0");
    }

    #[test]
    fn test_cover_art_is_fresh_once() {
        let player = LocalPlayer::new();
        let art = player.cover_art();
        assert!(!art.has_new_cover_art());
        assert!(art.fetch_cover_art().is_err());

        player.set_cover_art(vec![0xFF, 0xD8]);
        assert!(art.has_new_cover_art());
        assert_eq!(art.pull(false).bytes, vec![0xFF, 0xD8]);
        assert!(!art.pull(false).changed);
        assert!(art.pull(true).changed);
    }

    #[test]
    fn test_snapshot_keys() {
        let mut player = LocalPlayer::new();
        player.set_track_field("Title", "So What");
        let snap = player.snapshot();
        assert_eq!(snap.get("Title"), "So What");
        assert_eq!(snap.get("connected"), "offline");
        assert!(!snap.get("hostname").is_empty());
    }
}
