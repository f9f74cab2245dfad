//! Tencent (QQ) Maps links. All coordinates are GCJ-02.

use std::sync::LazyLock;

use geoshare_core::{Position, Srs};
use regex::Regex;

use crate::coords::{lat_lon, parse_lat_lon, parse_zoom, text, NUM};
use crate::input::{Input, InputId, ParseUriResult};
use crate::services::{web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| web_pattern(r"(?:[a-z0-9-]+\.)?map\.qq\.com"));

pub static INPUT: Input = Input {
    id: InputId::Tencent,
    name: "Tencent Maps",
    examples: &[
        "https://apis.map.qq.com/uri/v1/marker?marker=coord:39.892326,116.342763;title:Sunny%20Park&referer=x",
        "https://map.qq.com/?type=marker&pointx=116.3972&pointy=39.9088&zoom=16",
        "https://map.qq.com/?keyword=%E5%A4%A9%E5%9D%9B",
    ],
    schemes: WEB_SCHEMES,
    uri_pattern: &URI_RE,
    short_uri: None,
    parse_uri,
    parse_html: None,
};

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"coord:\s*({NUM})\s*,\s*({NUM})(?:.*?;title:([^;]*))?"
    ))
    .expect("valid regex")
});

/// `marker=coord:LAT,LON;title:NAME` > `pointy`/`pointx` > `center`.
fn parse_uri(uri: &Uri) -> ParseUriResult {
    let marker = uri.query_param("marker").and_then(|marker| {
        let caps = MARKER_RE.captures(marker)?;
        let (lat, lon) = lat_lon(&caps[1], &caps[2])?;
        Some((lat, lon, text(caps.get(3).map(|m| m.as_str()))))
    });
    let coords = marker
        .or_else(|| {
            let (lat, lon) = lat_lon(uri.query_param("pointy")?, uri.query_param("pointx")?)?;
            Some((lat, lon, None))
        })
        .or_else(|| {
            let (lat, lon) = uri.query_param("center").and_then(parse_lat_lon)?;
            Some((lat, lon, None))
        });

    let q = text(uri.query_param("keyword"));
    let zoom = uri.query_param("zoom").and_then(parse_zoom);
    let position = match coords {
        Some((lat, lon, name)) => Position::from_coords(lat, lon)
            .with_srs(Srs::Gcj02)
            .with_name(name),
        None => Position::new(),
    }
    .with_q(q)
    .with_zoom(zoom);
    ParseUriResult::new(position)
}
