//! Google Maps links, short links and place pages.
//!
//! Coordinates are taken from the first source present, in this order:
//! `/dir/` waypoints, the `data=` `!3d…!4d…` pin, a coordinate
//! `q`/`query`/`destination`/`daddr`, `ll`, `center`, `viewpoint`, the
//! `@LAT,LON` viewport, and finally `/place/LAT,LON` or `/search/LAT,LON`.
//! Text comes from `destination`, `q`, `query`, `daddr`, `/place/NAME`,
//! `/search/TEXT` and the last `/dir/` waypoint, in that order.

use std::sync::LazyLock;

use geoshare_core::{Point, Position};
use regex::Regex;

use crate::coords::{lat_lon, parse_lat_lon, parse_zoom, NUM};
use crate::input::{Input, InputId, ParseHtmlResult, ParseUriResult, ShortUri, ShortUriMethod};
use crate::services::{short_pattern, unescape_html, web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    web_pattern(
        r"(?:[a-z0-9-]+\.)*google(?:\.[a-z]{2,3}){1,2}/maps|maps\.google(?:\.[a-z]{2,3}){1,2}|maps\.app\.goo\.gl/|goo\.gl/maps/|g\.co/kgs/",
    )
});

static SHORT_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| short_pattern(r"maps\.app\.goo\.gl|goo\.gl/maps|g\.co/kgs"));

pub static INPUT: Input = Input {
    id: InputId::GoogleMaps,
    name: "Google Maps",
    examples: &[
        "https://www.google.com/maps/place/Pozna%C5%84+Old+Town/@52.4083009,16.929066,17z/data=!3m1!4b1!4m6!3m5!1s0x47045b4d0b9c5c3f:0x8f5c2d7c1f0a3c1e!8m2!3d52.4084126!4d16.9320261",
        "https://maps.google.com/?q=48.8584,2.2945&z=15",
        "https://www.google.de/maps/dir/52.5163,13.3777/52.5200,13.4050/",
        "https://maps.app.goo.gl/TmbeHMiLEfTBws9EA",
        "goo.gl/maps/aB3dE",
        "https://g.co/kgs/yT9m2kP",
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

static DATA_PIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"!3d({NUM})!4d({NUM})")).expect("valid regex")
});

static VIEWPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^@({NUM}),({NUM})(?:,(\d+(?:\.\d+)?)z)?")).expect("valid regex")
});

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let segments = uri.path_segments();
    // `maps.google.com/?q=...` has no `maps` segment.
    let rest: Vec<&str> = match segments.iter().position(|s| s == "maps") {
        Some(i) => segments[i + 1..].iter().map(String::as_str).collect(),
        None => segments.iter().map(String::as_str).collect(),
    };

    let viewport = rest
        .iter()
        .find_map(|s| VIEWPORT_RE.captures(s))
        .and_then(|caps| {
            let (lat, lon) = lat_lon(&caps[1], &caps[2])?;
            Some((lat, lon, caps.get(3).and_then(|z| parse_zoom(z.as_str()))))
        });
    let zoom = uri
        .query_param("z")
        .or_else(|| uri.query_param("zoom"))
        .and_then(parse_zoom)
        .or_else(|| viewport.and_then(|(_, _, z)| z));

    // `/dir/A/B/...`: every coordinate waypoint becomes a route point; a
    // text destination is treated like `/place/NAME`.
    let mut destination = None;
    if rest.first() == Some(&"dir") {
        let waypoints: Vec<&str> = rest[1..]
            .iter()
            .copied()
            .take_while(|s| !s.starts_with('@') && !s.starts_with("data="))
            .collect();
        let points: Vec<Point> = waypoints
            .iter()
            .filter_map(|s| parse_lat_lon(s))
            .map(|(lat, lon)| Point::new(lat, lon))
            .collect();
        if !points.is_empty() {
            return ParseUriResult::new(Position::from_points(points).with_zoom(zoom));
        }
        destination = waypoints.last().map(|s| (*s).to_owned());
    }

    let place = segment_after(&rest, "place");
    let search = segment_after(&rest, "search");

    let mut position = Position::new();
    if let Some((lat, lon)) = data_pin(uri, &rest)
        .or_else(|| {
            ["q", "query", "destination", "daddr"]
                .iter()
                .find_map(|key| uri.query_param(key).and_then(parse_lat_lon))
        })
        .or_else(|| uri.query_param("ll").and_then(parse_lat_lon))
        .or_else(|| uri.query_param("center").and_then(parse_lat_lon))
        .or_else(|| uri.query_param("viewpoint").and_then(parse_lat_lon))
        .or_else(|| viewport.map(|(lat, lon, _)| (lat, lon)))
        .or_else(|| place.as_deref().and_then(parse_lat_lon))
        .or_else(|| search.as_deref().and_then(parse_lat_lon))
    {
        position = position.with_coords(lat, lon);
    }

    let query_text = ["destination", "q", "query", "daddr"]
        .iter()
        .filter_map(|key| uri.query_param(key))
        .find(|value| !value.trim().is_empty() && parse_lat_lon(value).is_none())
        .map(str::to_owned);
    let path_text = place
        .or(search)
        .or(destination)
        .filter(|s| parse_lat_lon(s).is_none())
        .map(|s| s.replace('+', " "));
    position = position.with_q(query_text.or(path_text)).with_zoom(zoom);

    let result = ParseUriResult::new(position);
    if result.position.q.is_some()
        || uri.has_query_param("cid")
        || uri.has_query_param("ftid")
    {
        result.with_html_fallback(uri.as_str())
    } else {
        result
    }
}

fn segment_after(segments: &[&str], key: &str) -> Option<String> {
    let i = segments.iter().position(|s| *s == key)?;
    segments
        .get(i + 1)
        .filter(|s| !s.starts_with('@') && !s.starts_with("data="))
        .map(|s| (*s).to_owned())
}

/// The `!3dLAT!4dLON` marker inside a `data=` segment or parameter.
fn data_pin(uri: &Uri, segments: &[&str]) -> Option<(f64, f64)> {
    segments
        .iter()
        .filter(|s| s.starts_with("data="))
        .map(|s| (*s).to_owned())
        .chain(uri.query_param("data").map(str::to_owned))
        .find_map(|data| {
            let caps = DATA_PIN_RE.captures_iter(&data).last()?;
            lat_lon(&caps[1], &caps[2])
        })
}

static HTML_PIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\[null,null,({NUM}),({NUM})\]")).expect("valid regex")
});

static HTML_STATIC_MAP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:markers|center)=({NUM})%2C({NUM})")).expect("valid regex")
});

static HTML_APP_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"APP_INITIALIZATION_STATE=\[\[\[[-\d.e]+,({NUM}),({NUM})\]"
    ))
    .expect("valid regex")
});

static HTML_VIEWPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"/@({NUM}),({NUM}),(\d+(?:\.\d+)?)z")).expect("valid regex")
});

static HTML_PLACE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="((?:https?://[^"/]*google[^"/]*)?/maps/place/[^"]+)""#)
        .expect("valid regex")
});

fn parse_html(html: &str) -> ParseHtmlResult {
    if let Some(caps) = HTML_PIN_RE.captures(html) {
        if let Some((lat, lon)) = lat_lon(&caps[1], &caps[2]) {
            return ParseHtmlResult::new(Position::from_coords(lat, lon));
        }
    }
    if let Some(caps) = HTML_STATIC_MAP_RE.captures(html) {
        if let Some((lat, lon)) = lat_lon(&caps[1], &caps[2]) {
            return ParseHtmlResult::new(Position::from_coords(lat, lon));
        }
    }
    if let Some(caps) = HTML_APP_STATE_RE.captures(html) {
        if let Some((lat, lon)) = lat_lon(&caps[2], &caps[1]) {
            return ParseHtmlResult::new(Position::from_coords(lat, lon));
        }
    }
    if let Some(caps) = HTML_VIEWPORT_RE.captures(html) {
        if let Some((lat, lon)) = lat_lon(&caps[1], &caps[2]) {
            let zoom = parse_zoom(&caps[3]);
            return ParseHtmlResult::new(Position::from_coords(lat, lon).with_zoom(zoom));
        }
    }
    if let Some(caps) = HTML_PLACE_LINK_RE.captures(html) {
        return ParseHtmlResult::redirect(unescape_html(&caps[1]));
    }
    ParseHtmlResult::default()
}

#[cfg(test)]
#[path = "google_maps_test.rs"]
mod tests;
