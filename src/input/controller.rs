/*
 *  input/controller.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Button poller: debounce, press/release tracking, long press detection
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

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::button::{Button, Gesture};
use super::intent::IntentHandle;
use super::pins::{Level, PinSource};

/// Time-based edge filter for one line.
///
/// A level change is accepted only once the previous accepted change is at
/// least `window` old; anything sooner is contact bounce.
#[derive(Debug, Clone, Copy, Default)]
struct Debouncer {
    pressed: bool,
    last_change: Option<Instant>,
}

impl Debouncer {
    /// Some(new state) when a change is committed
    fn sample(&mut self, pressed: bool, now: Instant, window: Duration) -> Option<bool> {
        if pressed == self.pressed {
            return None;
        }
        if let Some(last) = self.last_change
            && now.saturating_duration_since(last) < window
        {
            return None;
        }
        self.pressed = pressed;
        self.last_change = Some(now);
        Some(pressed)
    }
}

/// Polls the three buttons and turns levels into intent and gestures.
///
/// Press: the button is marked held with its timestamp. Prev or Next held
/// past 0.3s enters volume mode (not while the menu is open) and the press
/// is consumed; Play held past 1s is a long press (not while adjusting
/// volume). Release clears the held flag and, unless the press was
/// consumed, reports a short press. Prev/Next releases always leave
/// volume mode.
pub struct InputController {
    pins: Box<dyn PinSource>,
    intent: IntentHandle,
    gestures: Sender<Gesture>,
    debounce: Duration,
    active_low: bool,
    channels: [Debouncer; 3],
    faulted: [bool; 3],
}

impl InputController {
    pub fn new(pins: Box<dyn PinSource>, intent: IntentHandle, gestures: Sender<Gesture>) -> Self {
        Self {
            pins,
            intent,
            gestures,
            debounce: Duration::ZERO,
            active_low: false,
            channels: [Debouncer::default(); 3],
            faulted: [false; 3],
        }
    }

    /// Ignore level changes closer together than `window`
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    /// Buttons pull the line low when pressed
    pub fn active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    /// One polling pass at time `now`
    pub fn poll(&mut self, now: Instant) {
        for button in Button::ALL {
            let i = button.index();
            let level = match self.pins.level(button) {
                Ok(level) => {
                    self.faulted[i] = false;
                    level
                }
                Err(e) => {
                    if !self.faulted[i] {
                        warn!("Reading {:?} button failed: {}", button, e);
                        self.faulted[i] = true;
                    }
                    continue;
                }
            };
            let pressed = (level == Level::Low) == self.active_low;
            match self.channels[i].sample(pressed, now, self.debounce) {
                Some(true) => self.on_press(button, now),
                Some(false) => self.on_release(button),
                None => {}
            }
        }
        self.check_holds(now);
    }

    fn emit(&self, gesture: Gesture) {
        debug!("Gesture {:?}", gesture);
        if self.gestures.send(gesture).is_err() {
            debug!("Gesture receiver gone, dropping {:?}", gesture);
        }
    }

    fn on_press(&mut self, button: Button, now: Instant) {
        debug!("{:?} down", button);
        self.intent.update(|s| {
            if button != Button::Play {
                s.volume_active = false;
            }
            let b = s.button_mut(button);
            b.held = true;
            b.pressed_at = Some(now);
            b.consumed = false;
        });
    }

    fn on_release(&mut self, button: Button) {
        debug!("{:?} up", button);
        let short = self.intent.update(|s| {
            let consumed = s.button(button).consumed;
            s.button_mut(button).held = false;
            match button {
                Button::Prev | Button::Next => {
                    let short = !consumed && !s.volume_active;
                    s.volume_active = false;
                    short
                }
                Button::Play => !consumed,
            }
        });
        if short {
            self.emit(Gesture::ShortPress(button));
        }
    }

    fn check_holds(&mut self, now: Instant) {
        let mut fired = Vec::new();
        self.intent.update(|s| {
            for button in Button::ALL {
                let b = *s.button(button);
                let long = b.held_for(now).is_some_and(|d| d >= button.long_press_threshold());
                if !long || b.consumed {
                    continue;
                }
                match button {
                    Button::Prev | Button::Next => {
                        if s.menu_open {
                            continue;
                        }
                        s.button_mut(button).consumed = true;
                        if !s.volume_active {
                            s.volume_active = true;
                            fired.push(Gesture::LongPress(button));
                        }
                    }
                    Button::Play => {
                        if s.volume_active {
                            continue;
                        }
                        s.button_mut(button).consumed = true;
                        fired.push(Gesture::LongPress(button));
                    }
                }
            }
        });
        for gesture in fired {
            self.emit(gesture);
        }
    }

    /// Run the poller on its own thread until the handle is shut down
    pub fn spawn(mut self, poll_interval: Duration) -> io::Result<InputHandle> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let join = thread::Builder::new()
            .name("input".to_string())
            .spawn(move || {
                info!("Button poller started ({:?} interval)", poll_interval);
                while !flag.load(Ordering::Relaxed) {
                    self.poll(Instant::now());
                    thread::sleep(poll_interval);
                }
                info!("Button poller stopped");
            })?;
        Ok(InputHandle { stop, join: Some(join) })
    }
}

/// Owner of the poller thread; dropping it stops the thread
pub struct InputHandle {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl InputHandle {
    /// Raise the stop flag and wait for the thread
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("Button poller panicked");
            }
        }
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::pins::VirtualPins;
    use std::sync::mpsc::{self, Receiver};

    struct Rig {
        pins: VirtualPins,
        intent: IntentHandle,
        gestures: Receiver<Gesture>,
        ctl: InputController,
        t0: Instant,
    }

    impl Rig {
        fn new() -> Self {
            let pins = VirtualPins::new();
            let intent = IntentHandle::new();
            let (tx, rx) = mpsc::channel();
            let ctl = InputController::new(Box::new(pins.clone()), intent.clone(), tx);
            Self { pins, intent, gestures: rx, ctl, t0: Instant::now() }
        }

        fn at(&mut self, ms: u64) {
            self.ctl.poll(self.t0 + Duration::from_millis(ms));
        }

        fn drain(&self) -> Vec<Gesture> {
            self.gestures.try_iter().collect()
        }
    }

    #[test]
    fn test_quick_prev_is_short_press() {
        let mut rig = Rig::new();
        rig.pins.press(Button::Prev);
        rig.at(0);
        assert!(rig.intent.snapshot().button(Button::Prev).held);
        rig.at(100);
        rig.pins.release(Button::Prev);
        rig.at(200);
        assert_eq!(rig.drain(), [Gesture::ShortPress(Button::Prev)]);
        let s = rig.intent.snapshot();
        assert!(!s.volume_active);
        assert!(!s.button(Button::Prev).held);
    }

    #[test]
    fn test_prev_hold_enters_volume_once() {
        let mut rig = Rig::new();
        rig.pins.press(Button::Prev);
        rig.at(0);
        rig.at(299);
        assert!(!rig.intent.snapshot().volume_active);
        // sub-millisecond polling must not re-fire
        for us in 0..2000u64 {
            rig.ctl.poll(rig.t0 + Duration::from_millis(300) + Duration::from_micros(us * 500));
        }
        assert!(rig.intent.snapshot().volume_active);
        assert_eq!(rig.drain(), [Gesture::LongPress(Button::Prev)]);

        rig.pins.release(Button::Prev);
        rig.at(1500);
        // release leaves volume mode without a track change
        assert!(rig.drain().is_empty());
        assert!(!rig.intent.snapshot().volume_active);
    }

    #[test]
    fn test_no_volume_while_menu_open() {
        let mut rig = Rig::new();
        rig.intent.update(|s| s.menu_open = true);
        rig.pins.press(Button::Next);
        rig.at(0);
        rig.at(800);
        assert!(!rig.intent.snapshot().volume_active);
        rig.pins.release(Button::Next);
        rig.at(900);
        assert_eq!(rig.drain(), [Gesture::ShortPress(Button::Next)]);
    }

    #[test]
    fn test_play_long_press_suppresses_short() {
        let mut rig = Rig::new();
        rig.pins.press(Button::Play);
        rig.at(0);
        rig.at(999);
        assert!(rig.drain().is_empty());
        rig.at(1000);
        rig.at(1500);
        assert_eq!(rig.drain(), [Gesture::LongPress(Button::Play)]);
        rig.pins.release(Button::Play);
        rig.at(1600);
        assert!(rig.drain().is_empty());
    }

    #[test]
    fn test_play_hold_ignored_during_volume() {
        let mut rig = Rig::new();
        rig.intent.update(|s| s.volume_active = true);
        rig.pins.press(Button::Play);
        rig.at(0);
        rig.at(1200);
        assert!(rig.drain().is_empty());
        rig.pins.release(Button::Play);
        rig.at(1300);
        assert_eq!(rig.drain(), [Gesture::ShortPress(Button::Play)]);
    }

    #[test]
    fn test_press_clears_volume() {
        let mut rig = Rig::new();
        rig.intent.update(|s| s.volume_active = true);
        rig.pins.press(Button::Next);
        rig.at(0);
        assert!(!rig.intent.snapshot().volume_active);
    }

    #[test]
    fn test_debounce_rejects_bounce() {
        let mut rig = Rig::new();
        rig.ctl = InputController::new(
            Box::new(rig.pins.clone()),
            rig.intent.clone(),
            {
                let (tx, rx) = mpsc::channel();
                rig.gestures = rx;
                tx
            },
        )
        .with_debounce(Duration::from_millis(10));

        rig.pins.press(Button::Play);
        rig.at(0);
        rig.pins.release(Button::Play);
        rig.at(3);
        rig.pins.press(Button::Play);
        rig.at(6);
        // bounce never registered as a release
        assert!(rig.drain().is_empty());
        assert!(rig.intent.snapshot().button(Button::Play).held);

        rig.pins.release(Button::Play);
        rig.at(50);
        assert_eq!(rig.drain(), [Gesture::ShortPress(Button::Play)]);
    }

    #[test]
    fn test_active_low_wiring() {
        let mut rig = Rig::new();
        rig.ctl = InputController::new(Box::new(rig.pins.clone()), rig.intent.clone(), {
            let (tx, rx) = mpsc::channel();
            rig.gestures = rx;
            tx
        })
        .active_low(true);
        // all lines idle high
        for b in Button::ALL {
            rig.pins.set(b, Level::High);
        }
        rig.at(0);
        assert!(!rig.intent.snapshot().button(Button::Play).held);
        rig.pins.set(Button::Play, Level::Low);
        rig.at(10);
        assert!(rig.intent.snapshot().button(Button::Play).held);
    }

    #[test]
    fn test_thread_stops_on_shutdown() {
        let pins = VirtualPins::new();
        let (tx, rx) = mpsc::channel();
        let ctl = InputController::new(Box::new(pins.clone()), IntentHandle::new(), tx);
        let mut handle = ctl.spawn(Duration::from_millis(1)).unwrap();
        pins.press(Button::Play);
        thread::sleep(Duration::from_millis(20));
        pins.release(Button::Play);
        thread::sleep(Duration::from_millis(20));
        handle.shutdown();
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [Gesture::ShortPress(Button::Play)]);
    }
}
