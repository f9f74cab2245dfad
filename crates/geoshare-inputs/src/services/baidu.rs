//! Baidu Maps links.
//!
//! Baidu publishes BD-09 coordinates by default; they are shifted to GCJ-02
//! here and tagged as such. `coord_type=gcj02` and `coord_type=wgs84` are
//! taken as-is. Mercator `@x,y` viewports are not supported.

use std::sync::LazyLock;

use geoshare_core::srs::bd09_to_gcj02;
use geoshare_core::{Position, Srs};
use regex::Regex;

use crate::coords::{parse_lat_lon, parse_lon_lat, parse_zoom, text};
use crate::input::{Input, InputId, ParseUriResult, ShortUri, ShortUriMethod};
use crate::services::{web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| web_pattern(r"(?:[a-z0-9-]+\.)?map\.baidu\.com"));

/// Baidu short links may carry a two-character bucket before the token.
static SHORT_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://j\.map\.baidu\.com/(?:[^/?#\s]+/)?[^/?#\s]+/?(?:[?#]\S*)?$")
        .expect("valid regex")
});

pub static INPUT: Input = Input {
    id: InputId::Baidu,
    name: "Baidu Maps",
    examples: &[
        "https://api.map.baidu.com/marker?location=39.915,116.404&title=Tiananmen&output=html",
        "https://map.baidu.com/search/%E6%95%85%E5%AE%AB/",
        "http://j.map.baidu.com/4d/bOc",
    ],
    schemes: WEB_SCHEMES,
    uri_pattern: &URI_RE,
    short_uri: Some(ShortUri {
        pattern: &SHORT_URI_RE,
        method: ShortUriMethod::Get,
    }),
    parse_uri,
    parse_html: None,
};

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let coords = uri
        .query_param("location")
        .and_then(parse_lat_lon)
        .or_else(|| uri.query_param("latlng").and_then(parse_lat_lon))
        .or_else(|| uri.query_param("center").and_then(parse_lon_lat));

    let segments = uri.path_segments();
    let search = match segments.as_slice() {
        [first, second, ..] if first == "search" => Some(second.clone()),
        _ => None,
    };
    let q = ["wd", "word", "query"]
        .iter()
        .find_map(|key| text(uri.query_param(key)))
        .or_else(|| text(search.as_deref()));
    let name = text(uri.query_param("title"));
    let zoom = uri.query_param("zoom").and_then(parse_zoom);

    let position = match coords {
        Some((lat, lon)) => {
            let coord_type = uri
                .query_param("coord_type")
                .map(str::to_ascii_lowercase);
            let (srs, lat, lon) = match coord_type.as_deref() {
                Some("wgs84") => (Srs::Wgs84, lat, lon),
                Some("gcj02") => (Srs::Gcj02, lat, lon),
                _ => {
                    let (lat, lon) = bd09_to_gcj02(lat, lon);
                    (Srs::Gcj02, lat, lon)
                }
            };
            Position::from_coords(lat, lon).with_srs(srs)
        }
        None => Position::new(),
    };
    ParseUriResult::new(position.with_q(q).with_name(name).with_zoom(zoom))
}
