/*
 *  snapshot.rs
 *
 *  mpdgui - music player display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Flat key/value view of player or menu state handed to widgets
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

use std::collections::HashMap;

/// Suffix of the companion key carrying render attributes for a field
pub const ATTR_SUFFIX: &str = "_attr";

/// String to string map; missing keys read as empty.
///
/// Known keys: `state`, `Title`, `Artist`, `Album`, `Date`, `audio`,
/// `trackType`, `samplerate`, `bitdepth`, `Time`, `elapsed`, `volume`,
/// `hostname`, `connected`, `MenuTitle`, `MenuList1..N`, `MarkerTop`,
/// `MarkerBottom`, and any `<key>_attr`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    fields: HashMap<String, String>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`, "" when absent
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    /// Attribute string for `key` ("H" highlight, "C" centre)
    pub fn attr(&self, key: &str) -> &str {
        self.fields
            .get(&format!("{key}{ATTR_SUFFIX}"))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Numeric value for `key`, None when absent or not a finite number
    pub fn number(&self, key: &str) -> Option<f32> {
        self.fields
            .get(key)
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|v| v.is_finite())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.fields.remove(key);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
