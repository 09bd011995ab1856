/*
 *  gui.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Application context and the render loop
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

use std::sync::mpsc::Receiver;
use std::time::Duration;

use log::{debug, info, warn};

use crate::display::{
    DisplayManager, DisplayMode, DisplayModeController, ModeControllerConfig, ModeInputs,
};
use crate::input::{Button, Gesture, IntentHandle};
use crate::services::{MenuEvent, MenuService, PlayerAction, PlayerService, ServiceError};
use crate::snapshot::Snapshot;

/// Volume change of one menu "volume+" or "volume-"
pub const MENU_VOLUME_STEP: i32 = 5;

/// Whether the rest of the tick runs after gestures are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// menu closed by a long press, start over on the next tick
    Restart,
}

/// Everything the render loop owns: displays, services, the shared intent
/// state and the gesture queue from the input poller.
pub struct Gui {
    displays: DisplayManager,
    player: Box<dyn PlayerService>,
    menu: Box<dyn MenuService>,
    menu_events: Receiver<MenuEvent>,
    intent: IntentHandle,
    gestures: Receiver<Gesture>,
    controller: DisplayModeController,
    info: Snapshot,
    menu_info: Snapshot,
}

fn log_failure(what: &str, result: Result<(), ServiceError>) {
    if let Err(e) = result {
        warn!("{} failed: {}", what, e);
    }
}

impl Gui {
    pub fn new(
        displays: DisplayManager,
        player: Box<dyn PlayerService>,
        mut menu: Box<dyn MenuService>,
        intent: IntentHandle,
        gestures: Receiver<Gesture>,
        config: ModeControllerConfig,
    ) -> Self {
        menu.set_visible_rows(displays.menu_rows());
        let menu_events = menu.subscribe();
        Self {
            displays,
            player,
            menu,
            menu_events,
            intent,
            gestures,
            controller: DisplayModeController::new(config),
            info: Snapshot::new(),
            menu_info: Snapshot::new(),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.controller.current_mode()
    }

    /// Latest player snapshot, including the live volume level
    pub fn info(&self) -> &Snapshot {
        &self.info
    }

    pub fn displays_mut(&mut self) -> &mut DisplayManager {
        &mut self.displays
    }

    fn handle_gestures(&mut self) -> Flow {
        while let Ok(gesture) = self.gestures.try_recv() {
            debug!("Handling {:?}", gesture);
            match gesture {
                Gesture::ShortPress(Button::Prev) => {
                    if self.menu.is_open() {
                        self.menu.prev();
                    } else {
                        log_failure("Previous track", self.player.prev());
                    }
                }
                Gesture::ShortPress(Button::Next) => {
                    if self.menu.is_open() {
                        self.menu.next();
                    } else {
                        log_failure("Next track", self.player.next());
                    }
                }
                Gesture::ShortPress(Button::Play) => {
                    let dismissed = self.intent.update(|s| std::mem::take(&mut s.cover_art));
                    if dismissed {
                        debug!("Cover art dismissed");
                    } else if self.menu.is_open() {
                        self.menu.execute();
                    } else {
                        log_failure("Play/pause", self.player.toggle());
                    }
                }
                Gesture::LongPress(Button::Play) => {
                    if self.menu.is_open() {
                        self.menu.close();
                        self.sync_menu_flag();
                        return Flow::Restart;
                    }
                    self.menu.open();
                }
                // volume mode is entered by the poller itself
                Gesture::LongPress(button) => debug!("{:?} held, adjusting volume", button),
            }
        }
        self.sync_menu_flag();
        Flow::Continue
    }

    fn sync_menu_flag(&mut self) {
        let open = self.menu.is_open();
        self.intent.update(|s| s.menu_open = open);
    }

    fn handle_menu_events(&mut self) {
        while let Ok(event) = self.menu_events.try_recv() {
            match event {
                MenuEvent::CoverArtRequested => {
                    info!("Cover art requested");
                    self.intent.update(|s| s.cover_art = true);
                }
                MenuEvent::Player(action) => self.apply_action(action),
            }
        }
    }

    fn apply_action(&mut self, action: PlayerAction) {
        info!("Menu action {:?}", action);
        let playing = self.info.get("state") == "play";
        match action {
            PlayerAction::Play if playing => {}
            PlayerAction::Pause if !playing => {}
            PlayerAction::Play | PlayerAction::Pause | PlayerAction::Toggle => {
                log_failure("Play/pause", self.player.toggle())
            }
            PlayerAction::Next => log_failure("Next track", self.player.next()),
            PlayerAction::Prev => log_failure("Previous track", self.player.prev()),
            PlayerAction::VolumeUp | PlayerAction::VolumeDown => {
                let delta = if action == PlayerAction::VolumeUp { MENU_VOLUME_STEP } else { -MENU_VOLUME_STEP };
                match self.player.adjust_volume(delta) {
                    Ok(level) => self.info.insert("volume", level.to_string()),
                    Err(e) => warn!("Volume adjust failed: {}", e),
                }
            }
        }
    }

    /// One pass of the render loop; returns how long to wait before the next
    pub fn tick(&mut self) -> Duration {
        if self.player.has_changed() {
            self.info = self.player.snapshot();
            self.player.reset_changed();
        }

        if self.handle_gestures() == Flow::Restart {
            return Duration::ZERO;
        }
        self.handle_menu_events();

        let intent = self.intent.snapshot();
        let inputs = ModeInputs {
            playing: self.info.get("state") == "play",
            volume_active: intent.volume_active,
            menu_open: intent.menu_open,
            cover_art: intent.cover_art,
        };
        let changed = self.controller.update_mode(inputs);
        let mode = self.controller.current_mode();

        if mode == DisplayMode::Volume {
            match self.player.adjust_volume(intent.volume_delta()) {
                Ok(level) => self.info.insert("volume", level.to_string()),
                Err(e) => warn!("Volume adjust failed: {}", e),
            }
        }

        if changed {
            self.displays.switch_mode(mode);
            self.displays.set_frame_budget(self.controller.cadence());
        }

        if mode == DisplayMode::Menu && self.menu.has_changed() {
            self.menu_info = self.menu.snapshot();
            self.menu.reset_changed();
        }

        let snapshot = if mode == DisplayMode::Menu { &self.menu_info } else { &self.info };
        self.displays.render(mode, snapshot);

        self.controller.cadence()
    }

    /// Connect to the player and tick forever
    pub async fn run(&mut self) {
        if let Err(e) = self.player.connect() {
            warn!("Player connect failed: {}", e);
        }
        loop {
            let wait = self.tick();
            tokio::time::sleep(wait).await;
        }
    }
}
