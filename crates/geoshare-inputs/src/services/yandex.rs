//! Yandex Maps links. Yandex writes coordinates LON,LAT except in `rtext`.
//!
//! Coordinates: `rtext` route > `pt` pins > `whatshere[point]` > `ll`.
//! Organization pages (`/org/...`, `oid=`) are scraped for their pin.

use std::sync::LazyLock;

use geoshare_core::{Point, Position};
use regex::Regex;

use crate::coords::{lat_lon, parse_lat_lon, parse_lon_lat, parse_zoom, text, NUM};
use crate::input::{Input, InputId, ParseHtmlResult, ParseUriResult, ShortUri, ShortUriMethod};
use crate::services::{web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

const TLD: &str = r"(?:\.[a-z]{2,3}){1,2}";

static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    web_pattern(&format!(
        r"(?:[a-z0-9-]+\.)*yandex{TLD}/(?:web-)?maps|maps\.yandex{TLD}"
    ))
});

static SHORT_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^https?://(?:[a-z0-9-]+\.)*yandex{TLD}/maps/-/[^/?#\s]+/?(?:[?#]\S*)?$"
    ))
    .expect("valid regex")
});

pub static INPUT: Input = Input {
    id: InputId::Yandex,
    name: "Yandex Maps",
    examples: &[
        "https://yandex.ru/maps/?ll=37.617635%2C55.755814&z=12",
        "https://yandex.com/maps/?pt=30.3351,59.9343&z=14&l=map",
        "https://yandex.ru/maps/?rtext=55.75,37.62~59.93,30.31&rtt=auto",
        "https://yandex.com.tr/maps/org/galata_kulesi/1234567890/",
        "https://yandex.ru/maps/-/CDuWbM2a",
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

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let zoom = uri
        .query_param("z")
        .or_else(|| uri.query_param("whatshere[zoom]"))
        .and_then(parse_zoom);
    let q = text(uri.query_param("text"));

    let route: Vec<Point> = uri
        .query_param("rtext")
        .map(|rtext| {
            rtext
                .split('~')
                .filter_map(parse_lat_lon)
                .map(|(lat, lon)| Point::new(lat, lon))
                .collect()
        })
        .unwrap_or_default();
    if !route.is_empty() {
        return ParseUriResult::new(Position::from_points(route).with_q(q).with_zoom(zoom));
    }

    let pins: Vec<Point> = uri
        .query_param("pt")
        .map(|pt| {
            pt.split('~')
                .filter_map(|pin| {
                    // A pin may carry a style suffix: `LON,LAT,pm2rdm`.
                    let mut parts = pin.splitn(3, ',');
                    let lon = parts.next()?;
                    let lat = parts.next()?;
                    lat_lon(lat, lon)
                })
                .map(|(lat, lon)| Point::new(lat, lon))
                .collect()
        })
        .unwrap_or_default();

    let mut position = match pins.len() {
        0 => uri
            .query_param("whatshere[point]")
            .and_then(parse_lon_lat)
            .or_else(|| uri.query_param("ll").and_then(parse_lon_lat))
            .map_or_else(Position::new, |(lat, lon)| Position::from_coords(lat, lon)),
        1 => Position::from_coords(pins[0].lat, pins[0].lon),
        _ => Position::from_points(pins),
    };
    position = position.with_q(q).with_zoom(zoom);

    let result = ParseUriResult::new(position);
    let is_org = uri.path_segments().iter().any(|s| s == "org") || uri.has_query_param("oid");
    if is_org {
        result.with_html_fallback(uri.as_str())
    } else {
        result
    }
}

static HTML_DATA_COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"data-coordinates="({NUM}),({NUM})""#)).expect("valid regex")
});

static HTML_JSON_COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#""coordinates"\s*:\s*\[\s*({NUM})\s*,\s*({NUM})\s*\]"#))
        .expect("valid regex")
});

fn parse_html(html: &str) -> ParseHtmlResult {
    HTML_DATA_COORDS_RE
        .captures(html)
        .or_else(|| HTML_JSON_COORDS_RE.captures(html))
        .and_then(|caps| lat_lon(&caps[2], &caps[1]))
        .map(|(lat, lon)| ParseHtmlResult::new(Position::from_coords(lat, lon)))
        .unwrap_or_default()
}
