/*
 *  metrics.rs
 *
 *  mpdgui - music player display
 *	(c) 2020-26 Stuart Hunter
 *
 *	Host readings shown on the idle and song screens
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
//! Small readers over /proc and /sys files.

use std::fs;
use std::io;
use std::net::IpAddr;
use std::path::Path;

/// First thermal zone, reported in millidegrees Celsius
pub const THERMAL_ZONE0: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Reads the first float value from a given file path.
pub fn read_first_float_from_file(path: &Path) -> io::Result<f32> {
    let content = fs::read_to_string(path)?;
    let first_word = content.split_whitespace().next().unwrap_or("");
    first_word.parse::<f32>().map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// CPU temperature in Celsius from a millidegree sensor file
pub fn cpu_temp_celsius(path: &Path) -> io::Result<f32> {
    read_first_float_from_file(path).map(|millideg| millideg / 1000.0)
}

/// Kernel host name, "localhost" when it cannot be read
pub fn hostname() -> String {
    fs::read_to_string("/proc/sys/kernel/hostname")
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Primary local address, if the host has one
pub fn local_address() -> Option<IpAddr> {
    local_ip_address::local_ip().ok()
}
