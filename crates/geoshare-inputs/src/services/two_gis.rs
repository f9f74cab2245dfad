//! 2GIS and Urbi links. Coordinates are written LON,LAT.
//!
//! Coordinates: `/directions/points/` route > a `LON,LAT` path segment >
//! `m=LON,LAT/ZOOM`. Firm pages without coordinates are scraped.

use std::sync::LazyLock;

use geoshare_core::{Point, Position};
use regex::Regex;

use crate::coords::{lat_lon, parse_lon_lat, parse_zoom, NUM};
use crate::input::{Input, InputId, ParseHtmlResult, ParseUriResult, ShortUri, ShortUriMethod};
use crate::services::{short_pattern, web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    web_pattern(r"(?:[a-z0-9-]+\.)*2gis(?:\.[a-z]{2,3}){1,2}|maps\.urbi\.ae")
});

static SHORT_URI_RE: LazyLock<Regex> = LazyLock::new(|| short_pattern(r"go\.2gis\.com"));

pub static INPUT: Input = Input {
    id: InputId::TwoGis,
    name: "2GIS / Urbi",
    examples: &[
        "https://2gis.ru/moscow/geo/70000001/37.620393,55.75396",
        "https://2gis.ae/dubai/search/Burj%20Khalifa?m=55.274%2C25.1972%2F16",
        "https://2gis.ru/moscow/directions/points/37.62,55.75%3B70000001%7C30.31,59.93",
        "https://maps.urbi.ae/dubai/firm/70000001019423640",
        "https://go.2gis.com/k4bd7",
    ],
    schemes: WEB_SCHEMES,
    uri_pattern: &URI_RE,
    short_uri: Some(ShortUri {
        pattern: &SHORT_URI_RE,
        method: ShortUriMethod::Head,
    }),
    parse_uri,
    parse_html: Some(parse_html),
};

/// `LON,LAT` optionally followed by `;OBJECT_ID`.
fn parse_route_point(value: &str) -> Option<Point> {
    let coords = value.split(';').next()?;
    parse_lon_lat(coords).map(|(lat, lon)| Point::new(lat, lon))
}

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let segments = uri.path_segments();

    if let Some(i) = segments
        .windows(2)
        .position(|w| w[0] == "directions" && w[1] == "points")
    {
        let points: Vec<Point> = segments
            .get(i + 2)
            .map(|route| route.split('|').filter_map(parse_route_point).collect())
            .unwrap_or_default();
        if !points.is_empty() {
            return ParseUriResult::new(Position::from_points(points));
        }
    }

    let map = uri.query_param("m").and_then(|m| {
        let (coords, zoom) = m.split_once('/').unwrap_or((m, ""));
        let (lat, lon) = parse_lon_lat(coords)?;
        Some((lat, lon, parse_zoom(zoom)))
    });
    let coords = segments
        .iter()
        .find_map(|s| parse_lon_lat(s))
        .or_else(|| map.map(|(lat, lon, _)| (lat, lon)));
    let zoom = map.and_then(|(_, _, zoom)| zoom);

    let search = segments
        .iter()
        .position(|s| s == "search")
        .and_then(|i| segments.get(i + 1))
        .cloned();

    let position = match coords {
        Some((lat, lon)) => Position::from_coords(lat, lon),
        None => Position::new(),
    }
    .with_q(search)
    .with_zoom(zoom);

    let result = ParseUriResult::new(position);
    if segments.iter().any(|s| s == "firm") {
        result.with_html_fallback(uri.as_str())
    } else {
        result
    }
}

static HTML_POINT_LAT_LON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#""point"\s*:\s*\{{\s*"lat"\s*:\s*({NUM})\s*,\s*"lon"\s*:\s*({NUM})"#
    ))
    .expect("valid regex")
});

static HTML_POINT_LON_LAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#""point"\s*:\s*\{{\s*"lon"\s*:\s*({NUM})\s*,\s*"lat"\s*:\s*({NUM})"#
    ))
    .expect("valid regex")
});

fn parse_html(html: &str) -> ParseHtmlResult {
    let coords = HTML_POINT_LAT_LON_RE
        .captures(html)
        .and_then(|caps| lat_lon(&caps[1], &caps[2]))
        .or_else(|| {
            HTML_POINT_LON_LAT_RE
                .captures(html)
                .and_then(|caps| lat_lon(&caps[2], &caps[1]))
        });
    coords
        .map(|(lat, lon)| ParseHtmlResult::new(Position::from_coords(lat, lon)))
        .unwrap_or_default()
}
