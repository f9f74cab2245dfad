//! Bare coordinate text: decimal pairs, degrees-minutes and
//! degrees-minutes-seconds with signs or hemisphere letters.
//!
//! Unlike the link inputs this one must match the whole trimmed text, so a
//! sentence that merely contains two numbers is never mistaken for a
//! position.

use std::sync::LazyLock;

use geoshare_core::{is_valid_lat_lon, Position};
use regex::{Captures, Regex};

use crate::coords::{parse_number, NUM};
use crate::input::{Input, InputId, ParseUriResult};
use crate::uri::Uri;

/// Degrees with optional minutes and seconds. Captures: degrees, minutes,
/// seconds.
const DMS: &str = r#"(-?\d{1,3}(?:\.\d+)?)\s*°?\s*(?:(\d{1,2}(?:\.\d+)?)\s*['′’]\s*)?(?:(\d{1,2}(?:\.\d+)?)\s*(?:"|″|”|'')\s*)?"#;

static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({NUM})\s*°?\s*(?:[,;]\s*|\s+)({NUM})\s*°?$")).expect("valid regex")
});

/// `N 50° 7′ 24″, E 11° 7′ 24″`
static LEADING_HEMISPHERE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^([NS])\s*{DMS},?\s*([EW])\s*{DMS}$")).expect("valid regex")
});

/// `50° 7′ 24″ N, 11° 7′ 24″ E`
static TRAILING_HEMISPHERE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^{DMS}([NS])\s*,?\s*{DMS}([EW])$")).expect("valid regex")
});

/// `-50° 7′ 24″, 11° 7′ 24″`
static SIGNED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{DMS},\s*{DMS}$")).expect("valid regex"));

static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    let forms = [
        &DECIMAL_RE,
        &LEADING_HEMISPHERE_RE,
        &TRAILING_HEMISPHERE_RE,
        &SIGNED_RE,
    ]
    .iter()
    .map(|re| {
        let pattern = re.as_str();
        let pattern = pattern.strip_prefix("(?i)").unwrap_or(pattern);
        format!("(?:{})", &pattern[1..pattern.len() - 1])
    })
    .collect::<Vec<_>>()
    .join("|");
    Regex::new(&format!(r"(?i)^\s*(?:{forms})\s*$")).expect("valid regex")
});

pub static INPUT: Input = Input {
    id: InputId::Coordinates,
    name: "Coordinates",
    examples: &[
        "50.123456, -11.123456",
        "50.123456 -11.123456",
        "50° 7′ 24.442″ N, 11° 7′ 24.442″ W",
        "N 50° 7.4074′, E 14° 25.2′",
        "-33° 51′ 24″, 151° 12′ 55″",
    ],
    schemes: &[],
    uri_pattern: &URI_RE,
    short_uri: None,
    parse_uri,
    parse_html: None,
};

/// Converts one degrees/minutes/seconds triple starting at capture `first`.
/// Minutes and seconds must stay below 60.
fn component(caps: &Captures<'_>, first: usize) -> Option<f64> {
    let raw_degrees = caps.get(first)?.as_str();
    let degrees = parse_number(raw_degrees)?;
    let part = |i: usize| -> Option<f64> {
        match caps.get(i) {
            Some(m) => parse_number(m.as_str()).filter(|v| *v < 60.0),
            None => Some(0.0),
        }
    };
    let minutes = part(first + 1)?;
    let seconds = part(first + 2)?;
    let value = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    Some(if raw_degrees.starts_with('-') {
        -value
    } else {
        value
    })
}

fn hemisphere_sign(letter: &str) -> f64 {
    if letter.eq_ignore_ascii_case("s") || letter.eq_ignore_ascii_case("w") {
        -1.0
    } else {
        1.0
    }
}

fn parse_text(text: &str) -> Option<(f64, f64)> {
    let text = text.trim();
    let (lat, lon) = if let Some(caps) = DECIMAL_RE.captures(text) {
        (parse_number(&caps[1])?, parse_number(&caps[2])?)
    } else if let Some(caps) = LEADING_HEMISPHERE_RE.captures(text) {
        (
            hemisphere_sign(&caps[1]) * component(&caps, 2)?.abs(),
            hemisphere_sign(&caps[5]) * component(&caps, 6)?.abs(),
        )
    } else if let Some(caps) = TRAILING_HEMISPHERE_RE.captures(text) {
        (
            hemisphere_sign(&caps[4]) * component(&caps, 1)?.abs(),
            hemisphere_sign(&caps[8]) * component(&caps, 5)?.abs(),
        )
    } else if let Some(caps) = SIGNED_RE.captures(text) {
        (component(&caps, 1)?, component(&caps, 4)?)
    } else {
        return None;
    };
    is_valid_lat_lon(lat, lon).then_some((lat, lon))
}

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let position = parse_text(uri.path())
        .map(|(lat, lon)| Position::from_coords(lat, lon))
        .unwrap_or_default();
    ParseUriResult::new(position)
}
