//! `geo:` URIs (RFC 5870 plus the Android `q=` extension).

use std::sync::LazyLock;

use geoshare_core::Position;
use regex::Regex;

use crate::coords::{parse_lat_lon, parse_lat_lon_label, parse_zoom, text};
use crate::input::{Input, InputId, ParseUriResult};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgeo:\S+").expect("valid regex"));

pub static INPUT: Input = Input {
    id: InputId::Geo,
    name: "geo: URI",
    examples: &[
        "geo:50.123456,-11.123456?q=foo%20bar&z=3.4",
        "geo:0,0?q=52.5,13.4(Brandenburg%20Gate)",
    ],
    schemes: &["geo"],
    uri_pattern: &URI_RE,
    short_uri: None,
    parse_uri,
    parse_html: None,
};

/// `q=LAT,LON(NAME)` wins over the path coordinates; a `0,0` path means
/// "no coordinates".
fn parse_uri(uri: &Uri) -> ParseUriResult {
    let mut position = Position::new();

    // Drop `;crs=...;u=...` parameters.
    let path = uri.path().split(';').next().unwrap_or_default();
    if let Some((lat, lon)) = parse_lat_lon(&crate::uri::decode_component(path)) {
        if lat != 0.0 || lon != 0.0 {
            position = position.with_coords(lat, lon);
        }
    }

    if let Some(q) = uri.query_param("q") {
        match parse_lat_lon_label(q) {
            Some((lat, lon, label)) => {
                position = position.with_coords(lat, lon).with_name(label);
            }
            None => position = position.with_q(text(Some(q))),
        }
    }

    let zoom = uri.query_param("z").and_then(parse_zoom);
    ParseUriResult::new(position.with_zoom(zoom))
}
