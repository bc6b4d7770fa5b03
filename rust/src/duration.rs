//! Step duration parsing and ISO 8601 rendering.
//!
//! Upstream durations are meant to be ISO 8601 (`PT1H30M`) but loose text
//! such as `1h30min` or `45 minutes` shows up often enough to accept it too.

use std::sync::OnceLock;

use chrono::Duration;
use regex::Regex;

fn iso8601_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^P(?:(\d+(?:\.\d+)?)D)?(?:T(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
        )
        .expect("valid ISO 8601 duration pattern")
    })
}

fn loose_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+(?:[.,]\d+)?)\s*(\p{Alphabetic}+)").expect("valid loose duration pattern")
    })
}

/// Seconds per unit word, or None for words that are not time units.
fn unit_seconds(word: &str) -> Option<f64> {
    match word {
        "d" | "day" | "days" | "jour" | "jours" | "j" => Some(86_400.0),
        "h" | "hr" | "hrs" | "hour" | "hours" | "heure" | "heures" => Some(3_600.0),
        "m" | "min" | "mins" | "minute" | "minutes" | "mn" => Some(60.0),
        "s" | "sec" | "secs" | "second" | "seconds" | "seconde" | "secondes" => Some(1.0),
        _ => None,
    }
}

fn to_duration(seconds: f64) -> Option<Duration> {
    if !seconds.is_finite() || seconds < 0.0 || seconds > i64::MAX as f64 / 1_000.0 {
        return None;
    }
    Duration::try_milliseconds((seconds * 1_000.0).round() as i64)
}

fn parse_iso8601(text: &str) -> Option<Duration> {
    let caps = iso8601_pattern().captures(text)?;
    let scales = [86_400.0, 3_600.0, 60.0, 1.0];
    let mut seconds = 0.0;
    let mut any = false;
    for (group, scale) in (1..=4).zip(scales) {
        if let Some(m) = caps.get(group) {
            seconds += m.as_str().parse::<f64>().ok()? * scale;
            any = true;
        }
    }
    if !any {
        return None;
    }
    to_duration(seconds)
}

fn parse_loose(text: &str) -> Option<Duration> {
    let lowered = text.to_lowercase();
    if let Ok(minutes) = lowered.replace(',', ".").parse::<f64>() {
        return to_duration(minutes * 60.0);
    }
    let mut seconds = 0.0;
    let mut any = false;
    for caps in loose_pattern().captures_iter(&lowered) {
        let Some(scale) = unit_seconds(&caps[2]) else {
            continue;
        };
        let value: f64 = caps[1].replace(',', ".").parse().ok()?;
        seconds += value * scale;
        any = true;
    }
    if !any {
        return None;
    }
    to_duration(seconds)
}

/// Parse a step duration.
///
/// Returns None for empty or unrecognizable text; the scheduler then applies
/// its fallback duration.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    parse_iso8601(text).or_else(|| parse_loose(text))
}

/// Parse a step duration straight to minutes.
pub fn parse_duration_minutes(text: &str) -> Option<f64> {
    parse_duration(text).map(duration_minutes)
}

pub fn duration_minutes(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 60_000.0
}

/// Render minutes as an ISO 8601 duration (`PT<H>H<M>M`), rounded to the whole minute.
///
/// Zero components are omitted; zero overall renders as `PT0M`.
pub fn minutes_to_iso8601(minutes: f64) -> String {
    let total = if minutes.is_finite() && minutes > 0.0 {
        minutes.round() as i64
    } else {
        0
    };
    let (hours, mins) = (total / 60, total % 60);
    match (hours, mins) {
        (0, m) => format!("PT{}M", m),
        (h, 0) => format!("PT{}H", h),
        (h, m) => format!("PT{}H{}M", h, m),
    }
}
