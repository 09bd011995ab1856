/*
 *  main.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Startup, logging, signals and shutdown
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

use std::path::Path;
use std::sync::mpsc;

use anyhow::Context;
use env_logger::Env;
use log::{error, info};
use tokio::signal::unix::{signal, SignalKind};

use mpdgui::config;
use mpdgui::display::{DisplayDriverFactory, DisplayManager, LayoutContext, ModeControllerConfig};
use mpdgui::input::{GpioPins, InputController, IntentHandle, PinSource, VirtualPins};
use mpdgui::services::{ListMenu, LocalPlayer, PlayerService};
use mpdgui::Gui;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP, whichever comes first.
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load().context("loading configuration")?;

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} - music player display", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    // backend
    let player = LocalPlayer::new();
    let mut ctx = LayoutContext::new(player.cover_art());
    ctx.cover_art_timeout = cfg.cover_art_timeout();
    ctx.thermal_path = cfg.thermal_path();

    // panels, any init failure ends the process
    let mut surfaces = Vec::new();
    for display in cfg.displays() {
        let surface = DisplayDriverFactory::create_from_config(&display)
            .context("creating display driver")?;
        surfaces.push(surface);
    }
    let displays = DisplayManager::new(surfaces, &ctx).context("initializing displays")?;

    let items = cfg.menu.clone().unwrap_or_else(ListMenu::default_items);
    let menu = ListMenu::new("Menu", items);

    // buttons
    let buttons = cfg.buttons();
    let pins: Box<dyn PinSource> = if buttons.enabled() {
        Box::new(
            GpioPins::open(Path::new(buttons.chip()), buttons.lines())
                .with_context(|| format!("opening buttons on {}", buttons.chip()))?,
        )
    } else {
        info!("Buttons disabled");
        Box::new(VirtualPins::new())
    };
    let intent = IntentHandle::new();
    let (gesture_tx, gesture_rx) = mpsc::channel();
    let mut input = InputController::new(pins, intent.clone(), gesture_tx)
        .with_debounce(buttons.debounce())
        .active_low(buttons.active_low())
        .spawn(buttons.poll_interval())
        .context("starting button poller")?;

    let mut gui = Gui::new(
        displays,
        Box::new(player),
        Box::new(menu),
        intent,
        gesture_rx,
        ModeControllerConfig::default(),
    );

    tokio::select! {
        res = signal_handler() => {
            if let Err(e) = res {
                error!("Signal handler failed: {}", e);
            }
        }
        _ = gui.run() => {}
    }

    info!("Shutting down");
    input.shutdown();
    gui.displays_mut().clear_all();
    Ok(())
}
