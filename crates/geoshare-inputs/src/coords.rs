//! Shared number and coordinate-pair grammar for the service parsers.

use std::sync::LazyLock;

use geoshare_core::is_valid_lat_lon;
use regex::Regex;

/// A signed decimal number as it appears in map links.
pub(crate) const NUM: &str = r"[+-]?\d{1,3}(?:\.\d+)?";

static LAT_LON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*({NUM})\s*,\s*({NUM})\s*$")).expect("valid regex")
});

static LAT_LON_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)^\s*({NUM})\s*,\s*({NUM})\s*(?:\((.*)\))?\s*$"))
        .expect("valid regex")
});

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validates a latitude/longitude pair given as separate strings.
pub(crate) fn lat_lon(lat: &str, lon: &str) -> Option<(f64, f64)> {
    let lat = parse_number(lat)?;
    let lon = parse_number(lon)?;
    is_valid_lat_lon(lat, lon).then_some((lat, lon))
}

/// `"LAT,LON"`, nothing else.
pub(crate) fn parse_lat_lon(text: &str) -> Option<(f64, f64)> {
    let caps = LAT_LON_RE.captures(text)?;
    lat_lon(&caps[1], &caps[2])
}

/// `"LON,LAT"`, the order used by Yandex, Amap and 2GIS.
pub(crate) fn parse_lon_lat(text: &str) -> Option<(f64, f64)> {
    let caps = LAT_LON_RE.captures(text)?;
    lat_lon(&caps[2], &caps[1])
}

/// `"LAT,LON"` optionally followed by a parenthesized label.
pub(crate) fn parse_lat_lon_label(text: &str) -> Option<(f64, f64, Option<String>)> {
    let caps = LAT_LON_LABEL_RE.captures(text)?;
    let (lat, lon) = lat_lon(&caps[1], &caps[2])?;
    let label = caps
        .get(3)
        .map(|m| m.as_str().trim().to_owned())
        .filter(|s| !s.is_empty());
    Some((lat, lon, label))
}

/// A zoom level; anything outside `0..=23` is ignored.
pub(crate) fn parse_zoom(text: &str) -> Option<f64> {
    let text = text.trim().trim_end_matches(['z', 'Z']);
    parse_number(text).filter(|z| (0.0..=23.0).contains(z))
}

/// Non-blank text, trimmed.
pub(crate) fn text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
