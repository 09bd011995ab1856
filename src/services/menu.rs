/*
 *  services/menu.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Flat, paged menu driven by the front panel buttons
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

use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, info, warn};

use crate::services::{MenuEvent, MenuItem, MenuService, PlayerAction};
use crate::snapshot::Snapshot;

pub const ACTION_COVER_ART: &str = "coverart";
pub const ACTION_CLOSE: &str = "close";

/// Whether `action` is something a menu entry can do
pub fn is_known_action(action: &str) -> bool {
    matches!(action, ACTION_COVER_ART | ACTION_CLOSE) || action.parse::<PlayerAction>().is_ok()
}

/// A single list of items shown a page at a time.
///
/// Publishes `MenuTitle`, `MenuList1..rows` (the selected row carries
/// `_attr` "H"), `MarkerTop`/`MarkerBottom` when more items sit above or
/// below the page, and `elapsed`/`Time` as the position indicator.
pub struct ListMenu {
    title: String,
    items: Vec<MenuItem>,
    selected: usize,
    top: usize,
    rows: usize,
    open: bool,
    changed: bool,
    listeners: Vec<Sender<MenuEvent>>,
}

impl ListMenu {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            title: title.into(),
            items,
            selected: 0,
            top: 0,
            rows: 3,
            open: false,
            changed: false,
            listeners: Vec::new(),
        }
    }

    /// Menu used when the configuration has none
    pub fn default_items() -> Vec<MenuItem> {
        vec![
            MenuItem::new("Cover art", ACTION_COVER_ART),
            MenuItem::new("Close", ACTION_CLOSE),
        ]
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn emit(&mut self, event: MenuEvent) {
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }

    // keep the selection inside the visible page
    fn scroll_to_selection(&mut self) {
        if self.selected < self.top {
            self.top = self.selected;
        } else if self.selected >= self.top + self.rows {
            self.top = self.selected + 1 - self.rows;
        }
    }
}

impl MenuService for ListMenu {
    fn set_visible_rows(&mut self, rows: usize) {
        self.rows = rows.max(1);
        self.scroll_to_selection();
        self.changed = true;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self) {
        info!("Menu opened");
        self.open = true;
        self.changed = true;
    }

    fn close(&mut self) {
        info!("Menu closed");
        self.open = false;
        self.changed = true;
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_to_selection();
            self.changed = true;
        }
    }

    fn next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
            self.scroll_to_selection();
            self.changed = true;
        }
    }

    fn execute(&mut self) {
        let Some(item) = self.items.get(self.selected) else {
            return;
        };
        debug!("Menu execute: {} ({})", item.label, item.action);
        match item.action.as_str() {
            ACTION_CLOSE => self.close(),
            ACTION_COVER_ART => self.emit(MenuEvent::CoverArtRequested),
            other => match other.parse::<PlayerAction>() {
                Ok(action) => self.emit(MenuEvent::Player(action)),
                Err(e) => warn!("Menu entry '{}': {}", item.label, e),
            },
        }
    }

    fn has_changed(&self) -> bool {
        self.changed
    }

    fn reset_changed(&mut self) {
        self.changed = false;
    }

    fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::new();
        snap.insert("MenuTitle", self.title.as_str());
        for row in 0..self.rows {
            let key = format!("MenuList{}", row + 1);
            let index = self.top + row;
            let label = self.items.get(index).map(|i| i.label.as_str()).unwrap_or("");
            snap.insert(key.as_str(), label);
            if index == self.selected && !label.is_empty() {
                snap.insert(format!("{key}_attr"), "H");
            }
        }
        snap.insert("MarkerTop", if self.top > 0 { "1" } else { "" });
        let more_below = self.top + self.rows < self.items.len();
        snap.insert("MarkerBottom", if more_below { "1" } else { "" });
        snap.insert("elapsed", (self.selected + 1).to_string());
        snap.insert("Time", self.items.len().max(1).to_string());
        snap
    }

    fn subscribe(&mut self) -> Receiver<MenuEvent> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(n: usize) -> ListMenu {
        let items = (0..n).map(|i| MenuItem::new(format!("item {i}"), format!("a{i}"))).collect();
        ListMenu::new("Menu", items)
    }

    #[test]
    fn test_paging_and_markers() {
        let mut m = menu(5);
        m.set_visible_rows(3);
        let snap = m.snapshot();
        assert_eq!(snap.get("MenuList1"), "item 0");
        assert_eq!(snap.attr("MenuList1"), "H");
        assert_eq!(snap.get("MarkerTop"), "");
        assert_eq!(snap.get("MarkerBottom"), "1");

        for _ in 0..3 {
            m.next();
        }
        let snap = m.snapshot();
        assert_eq!(m.selected(), 3);
        assert_eq!(snap.get("MenuList1"), "item 1");
        assert_eq!(snap.get("MenuList3"), "item 3");
        assert_eq!(snap.attr("MenuList3"), "H");
        assert_eq!(snap.attr("MenuList1"), "");
        assert_eq!(snap.get("MarkerTop"), "1");
        assert_eq!(snap.get("MarkerBottom"), "1");
        assert_eq!(snap.get("elapsed"), "4");
        assert_eq!(snap.get("Time"), "5");
    }

    #[test]
    fn test_selection_stops_at_ends() {
        let mut m = menu(2);
        m.prev();
        assert_eq!(m.selected(), 0);
        m.next();
        m.next();
        assert_eq!(m.selected(), 1);
        assert_eq!(m.snapshot().get("MenuList3"), "");
    }

    #[test]
    fn test_execute_emits_events() {
        let mut m = ListMenu::new("Menu", ListMenu::default_items());
        let rx = m.subscribe();
        m.open();
        m.execute();
        assert_eq!(rx.try_recv().ok(), Some(MenuEvent::CoverArtRequested));

        m.next();
        m.execute();
        assert!(!m.is_open());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_execute_player_actions() {
        let items = vec![MenuItem::new("Louder", "volume+"), MenuItem::new("Dance", "shuffle")];
        let mut m = ListMenu::new("Menu", items);
        let rx = m.subscribe();
        m.execute();
        assert_eq!(rx.try_recv().ok(), Some(MenuEvent::Player(PlayerAction::VolumeUp)));
        // unknown entries do nothing
        m.next();
        m.execute();
        assert!(rx.try_recv().is_err());

        assert!(is_known_action("close"));
        assert!(is_known_action("prev"));
        assert!(!is_known_action("shuffle"));
    }

    #[test]
    fn test_changed_flag() {
        let mut m = menu(3);
        assert!(!m.has_changed());
        m.open();
        assert!(m.has_changed());
        m.reset_changed();
        m.prev();
        assert!(!m.has_changed());
        m.next();
        assert!(m.has_changed());
    }
}
