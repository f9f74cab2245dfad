//! Amap (Gaode) links. All coordinates are GCJ-02.
//!
//! Coordinates: `position` (LON,LAT) > `p=ID,LAT,LON,NAME` >
//! `q=LAT,LON,NAME` > `lnglat` (LON,LAT) > `lng` + `lat`.

use std::sync::LazyLock;

use geoshare_core::{Position, Srs};
use regex::Regex;

use crate::coords::{lat_lon, parse_lon_lat, parse_zoom, text};
use crate::input::{Input, InputId, ParseUriResult, ShortUri, ShortUriMethod};
use crate::services::{short_pattern, web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> = LazyLock::new(|| web_pattern(r"(?:[a-z0-9-]+\.)*amap\.com"));

static SHORT_URI_RE: LazyLock<Regex> = LazyLock::new(|| short_pattern(r"surl\.amap\.com"));

pub static INPUT: Input = Input {
    id: InputId::Amap,
    name: "Amap",
    examples: &[
        "https://uri.amap.com/marker?position=116.473195,39.993253&name=Wangjing",
        "https://m.amap.com/share/index/p=B000A7BD6C,39.9087,116.3975,Tiananmen",
        "https://ditu.amap.com/search?query=%E5%A4%A9%E5%AE%89%E9%97%A8",
        "https://surl.amap.com/2bQc9Xm1eZ",
    ],
    schemes: WEB_SCHEMES,
    uri_pattern: &URI_RE,
    short_uri: Some(ShortUri {
        pattern: &SHORT_URI_RE,
        method: ShortUriMethod::Head,
    }),
    parse_uri,
    parse_html: None,
};

/// `ID,LAT,LON[,NAME]`, as found in `p=` parameters and share paths.
fn parse_poi(value: &str) -> Option<(f64, f64, Option<String>)> {
    let mut parts = value.splitn(4, ',');
    let _id = parts.next()?;
    let (lat, lon) = lat_lon(parts.next()?, parts.next()?)?;
    Some((lat, lon, text(parts.next())))
}

/// `LAT,LON[,NAME]`.
fn parse_q(value: &str) -> Option<(f64, f64, Option<String>)> {
    let mut parts = value.splitn(3, ',');
    let (lat, lon) = lat_lon(parts.next()?, parts.next()?)?;
    Some((lat, lon, text(parts.next())))
}

fn parse_uri(uri: &Uri) -> ParseUriResult {
    // Share links put `p=...` in the path rather than the query.
    let path_poi = uri
        .path_segments()
        .iter()
        .find_map(|s| s.strip_prefix("p=").and_then(parse_poi));

    let coords = uri
        .query_param("position")
        .and_then(parse_lon_lat)
        .map(|(lat, lon)| (lat, lon, None))
        .or_else(|| uri.query_param("p").and_then(parse_poi))
        .or(path_poi)
        .or_else(|| uri.query_param("q").and_then(parse_q))
        .or_else(|| {
            uri.query_param("lnglat")
                .and_then(parse_lon_lat)
                .map(|(lat, lon)| (lat, lon, None))
        })
        .or_else(|| {
            let (lat, lon) = lat_lon(uri.query_param("lat")?, uri.query_param("lng")?)?;
            Some((lat, lon, None))
        });

    let q = ["keywords", "query"]
        .iter()
        .find_map(|key| text(uri.query_param(key)));
    let zoom = uri.query_param("zoom").and_then(parse_zoom);

    let position = match coords {
        Some((lat, lon, label)) => Position::from_coords(lat, lon)
            .with_srs(Srs::Gcj02)
            .with_name(label),
        None => Position::new(),
    }
    .with_name(text(uri.query_param("name")))
    .with_q(q)
    .with_zoom(zoom);
    ParseUriResult::new(position)
}
