// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort normalization of user-typed ride times.
//!
//! Recognized inputs are folded to a canonical presentation (`Now`,
//! `Later`, or a 12-hour clock like `03:15 PM`); anything else is passed
//! through verbatim. Normalization never fails.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

static CLOCK_MERIDIEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[:.](\d{2})\s*(am|pm)$").unwrap());
static HOUR_MERIDIEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s*(am|pm)$").unwrap());
static CLOCK_24H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[:.](\d{2})$").unwrap());

/// Normalize a ride-time string.
///
/// Matching is case- and whitespace-insensitive. Unrecognized input is
/// returned unchanged so the booking still records what the user said.
pub fn normalize(input: &str) -> String {
    let folded = input.trim().to_lowercase();
    match folded.as_str() {
        "now" => return "Now".to_string(),
        "later" => return "Later".to_string(),
        _ => {}
    }
    match parse_clock(&folded) {
        Some(time) => time.format("%I:%M %p").to_string(),
        None => input.to_string(),
    }
}

fn parse_clock(folded: &str) -> Option<NaiveTime> {
    if let Some(caps) = CLOCK_MERIDIEM.captures(folded) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        return twelve_hour(hour, minute, &caps[3]);
    }
    if let Some(caps) = HOUR_MERIDIEM.captures(folded) {
        let hour: u32 = caps[1].parse().ok()?;
        return twelve_hour(hour, 0, &caps[2]);
    }
    if let Some(caps) = CLOCK_24H.captures(folded) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }
    None
}

fn twelve_hour(hour: u32, minute: u32, meridiem: &str) -> Option<NaiveTime> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour24 = match (meridiem, hour) {
        ("am", 12) => 0,
        ("am", h) => h,
        ("pm", 12) => 12,
        (_, h) => h + 12,
    };
    NaiveTime::from_hms_opt(hour24, minute, 0)
}
