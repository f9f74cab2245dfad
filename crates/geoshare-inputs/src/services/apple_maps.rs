//! Apple Maps links.
//!
//! Coordinates: `ll` > `center` > `coordinate` > `sll` > a coordinate `q`
//! or `daddr`. Text: `q` > `address` > `daddr` > `name`; when coordinates
//! are present the text is the place name rather than a query.

use std::sync::LazyLock;

use geoshare_core::Position;
use regex::Regex;

use crate::coords::{lat_lon, parse_lat_lon, parse_zoom, text, NUM};
use crate::input::{Input, InputId, ParseHtmlResult, ParseUriResult, ShortUri, ShortUriMethod};
use crate::services::{short_pattern, web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> = LazyLock::new(|| web_pattern(r"maps\.apple\.com|maps\.apple/p/"));

static SHORT_URI_RE: LazyLock<Regex> = LazyLock::new(|| short_pattern(r"maps\.apple/p"));

pub static INPUT: Input = Input {
    id: InputId::AppleMaps,
    name: "Apple Maps",
    examples: &[
        "https://maps.apple.com/?ll=50.894967,4.341626&q=Atomium&z=16",
        "https://maps.apple.com/?address=Hauptstra%C3%9Fe+1,+Berlin",
        "https://maps.apple.com/place?auid=1234567890123456789",
        "https://maps.apple/p/QJcE3l5Aw1yRSc",
    ],
    schemes: WEB_SCHEMES,
    uri_pattern: &URI_RE,
    short_uri: Some(ShortUri {
        pattern: &SHORT_URI_RE,
        method: ShortUriMethod::Get,
    }),
    parse_uri,
    parse_html: Some(parse_html),
};

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let coords = ["ll", "center", "coordinate", "sll"]
        .iter()
        .find_map(|key| uri.query_param(key).and_then(parse_lat_lon))
        .or_else(|| {
            ["q", "daddr"]
                .iter()
                .find_map(|key| uri.query_param(key).and_then(parse_lat_lon))
        });

    let label = ["q", "address", "daddr", "name"]
        .iter()
        .filter_map(|key| uri.query_param(key))
        .find(|value| parse_lat_lon(value).is_none())
        .and_then(|value| text(Some(value)));

    let zoom = uri.query_param("z").and_then(parse_zoom);
    let position = match coords {
        Some((lat, lon)) => Position::from_coords(lat, lon).with_name(label),
        None => Position::new().with_q(label),
    }
    .with_zoom(zoom);

    let result = ParseUriResult::new(position);
    if uri.has_query_param("auid") || uri.has_query_param("place-id") {
        result.with_html_fallback(uri.as_str())
    } else {
        result
    }
}

static HTML_LAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"<meta\s+property="place:location:latitude"\s+content="({NUM})""#
    ))
    .expect("valid regex")
});

static HTML_LON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"<meta\s+property="place:location:longitude"\s+content="({NUM})""#
    ))
    .expect("valid regex")
});

fn parse_html(html: &str) -> ParseHtmlResult {
    let lat = HTML_LAT_RE.captures(html);
    let lon = HTML_LON_RE.captures(html);
    match (lat, lon) {
        (Some(lat), Some(lon)) => match lat_lon(&lat[1], &lon[1]) {
            Some((lat, lon)) => ParseHtmlResult::new(Position::from_coords(lat, lon)),
            None => ParseHtmlResult::default(),
        },
        _ => ParseHtmlResult::default(),
    }
}
