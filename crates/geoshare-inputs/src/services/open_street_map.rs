//! OpenStreetMap links.
//!
//! Coordinates: `/directions?route=` > `mlat`/`mlon` > `#map=Z/LAT/LON` >
//! `lat`/`lon`. `/go/` short links decode offline; `/node/ID` links are
//! resolved through the API's XML.

use std::sync::LazyLock;

use geoshare_core::{Point, Position};
use regex::Regex;

use crate::coords::{lat_lon, parse_lat_lon, parse_zoom, text, NUM};
use crate::input::{Input, InputId, ParseHtmlResult, ParseUriResult};
use crate::services::{web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| web_pattern(r"(?:[a-z0-9-]+\.)*(?:openstreetmap\.org|osm\.org)(?:[/?#]|$)"));

pub static INPUT: Input = Input {
    id: InputId::OpenStreetMap,
    name: "OpenStreetMap",
    examples: &[
        "https://www.openstreetmap.org/?mlat=51.5&mlon=-0.1#map=15/51.5/-0.1",
        "https://www.openstreetmap.org/#map=16/50.0800/14.4200",
        "https://osm.org/go/euut9uGP--",
        "https://www.openstreetmap.org/directions?engine=fossgis_osrm_car&route=50.08%2C14.42%3B50.1%2C14.5",
        "https://www.openstreetmap.org/node/240109189",
    ],
    schemes: WEB_SCHEMES,
    uri_pattern: &URI_RE,
    short_uri: None,
    parse_uri,
    parse_html: Some(parse_html),
};

const SHORTLINK_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_~";

/// Decodes an `osm.org/go/` short code into `(lat, lon, zoom)`.
///
/// Each character carries three interleaved bits of x and y; every
/// trailing `-` lowers the zoom by one.
fn decode_shortlink(code: &str) -> Option<(f64, f64, f64)> {
    let mut x: u64 = 0;
    let mut y: u64 = 0;
    let mut z: i32 = 0;
    let mut z_offset: i32 = 0;
    for c in code.bytes() {
        let c = if c == b'@' { b'~' } else { c };
        let Some(t) = SHORTLINK_ALPHABET.iter().position(|&a| a == c) else {
            z_offset -= 1;
            continue;
        };
        let mut t = t as u64;
        for _ in 0..3 {
            x = (x << 1) | ((t >> 5) & 1);
            t <<= 1;
            y = (y << 1) | ((t >> 5) & 1);
            t <<= 1;
        }
        z += 3;
        if z > 32 {
            return None;
        }
    }
    if z == 0 {
        return None;
    }
    let shift = u32::try_from(32 - z).ok()?;
    x <<= shift;
    y <<= shift;
    #[allow(clippy::cast_precision_loss)]
    let (lon, lat) = (
        x as f64 * 360.0 / 4_294_967_296.0 - 180.0,
        y as f64 * 180.0 / 4_294_967_296.0 - 90.0,
    );
    let zoom = f64::from(z - 8 - z_offset.rem_euclid(3));
    Some((lat, lon, zoom))
}

fn parse_map_fragment(value: &str) -> Option<(f64, f64, Option<f64>)> {
    let mut parts = value.split('/');
    let zoom = parts.next().and_then(parse_zoom);
    let (lat, lon) = lat_lon(parts.next()?, parts.next()?)?;
    Some((lat, lon, zoom))
}

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let segments = uri.path_segments();
    let q = text(uri.query_param("query"));

    if let [go, code] = segments.as_slice() {
        if go == "go" {
            return match decode_shortlink(code) {
                Some((lat, lon, zoom)) => ParseUriResult::new(
                    Position::from_coords(lat, lon).with_zoom(Some(zoom)),
                ),
                None => ParseUriResult::default(),
            };
        }
    }

    if segments.first().is_some_and(|s| s == "directions") {
        let points: Vec<Point> = uri
            .query_param("route")
            .map(|route| {
                route
                    .split(';')
                    .filter_map(parse_lat_lon)
                    .map(|(lat, lon)| Point::new(lat, lon))
                    .collect()
            })
            .unwrap_or_default();
        if !points.is_empty() {
            return ParseUriResult::new(Position::from_points(points));
        }
    }

    let fragment = uri.fragment_param("map").and_then(|m| parse_map_fragment(&m));
    let coords = uri
        .query_param("mlat")
        .zip(uri.query_param("mlon"))
        .and_then(|(lat, lon)| lat_lon(lat, lon))
        .or_else(|| fragment.map(|(lat, lon, _)| (lat, lon)))
        .or_else(|| {
            uri.query_param("lat")
                .zip(uri.query_param("lon"))
                .and_then(|(lat, lon)| lat_lon(lat, lon))
        });
    let zoom = uri
        .query_param("zoom")
        .and_then(parse_zoom)
        .or_else(|| fragment.and_then(|(_, _, zoom)| zoom));

    let position = match coords {
        Some((lat, lon)) => Position::from_coords(lat, lon),
        None => Position::new(),
    }
    .with_q(q)
    .with_zoom(zoom);

    let result = ParseUriResult::new(position);
    match segments.as_slice() {
        [node, id, ..] if node == "node" && id.bytes().all(|b| b.is_ascii_digit()) => {
            result.with_html_fallback(format!("https://www.openstreetmap.org/api/0.6/node/{id}"))
        }
        _ => result,
    }
}

static NODE_LAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"<node\b[^>]*\slat="({NUM})""#)).expect("valid regex")
});

static NODE_LON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"<node\b[^>]*\slon="({NUM})""#)).expect("valid regex")
});

/// Reads the `lat`/`lon` attributes of an API `<node>` element.
fn parse_html(xml: &str) -> ParseHtmlResult {
    let lat = NODE_LAT_RE.captures(xml);
    let lon = NODE_LON_RE.captures(xml);
    lat.zip(lon)
        .and_then(|(lat, lon)| lat_lon(&lat[1], &lon[1]))
        .map(|(lat, lon)| ParseHtmlResult::new(Position::from_coords(lat, lon)))
        .unwrap_or_default()
}
