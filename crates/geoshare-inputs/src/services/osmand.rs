//! OsmAnd share links: `pin` > `lat`/`lon` > `#Z/LAT/LON`.

use std::sync::LazyLock;

use geoshare_core::Position;
use regex::Regex;

use crate::coords::{lat_lon, parse_lat_lon, parse_zoom, text};
use crate::input::{Input, InputId, ParseUriResult};
use crate::services::{web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> = LazyLock::new(|| web_pattern(r"(?:[a-z0-9-]+\.)*osmand\.net"));

pub static INPUT: Input = Input {
    id: InputId::OsmAnd,
    name: "OsmAnd",
    examples: &[
        "https://osmand.net/map?pin=52.51628,13.37771#15/52.51628/13.37771",
        "https://osmand.net/go?lat=52.51628&lon=13.37771&z=16&name=Brandenburger%20Tor",
    ],
    schemes: WEB_SCHEMES,
    uri_pattern: &URI_RE,
    short_uri: None,
    parse_uri,
    parse_html: None,
};

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let fragment: Vec<&str> = uri.fragment().split('/').collect();
    let fragment_coords = match fragment.as_slice() {
        [zoom, lat, lon] => lat_lon(lat, lon).map(|(lat, lon)| (lat, lon, parse_zoom(zoom))),
        _ => None,
    };

    let coords = uri
        .query_param("pin")
        .and_then(parse_lat_lon)
        .or_else(|| {
            uri.query_param("lat")
                .zip(uri.query_param("lon"))
                .and_then(|(lat, lon)| lat_lon(lat, lon))
        })
        .or_else(|| fragment_coords.map(|(lat, lon, _)| (lat, lon)));
    let zoom = uri
        .query_param("z")
        .and_then(parse_zoom)
        .or_else(|| fragment_coords.and_then(|(_, _, zoom)| zoom));

    let position = match coords {
        Some((lat, lon)) => Position::from_coords(lat, lon),
        None => Position::new(),
    }
    .with_name(text(uri.query_param("name")))
    .with_zoom(zoom);
    ParseUriResult::new(position)
}
