//! Magic Earth links, both `magicearth://` and the web form.
//!
//! Coordinates: `lat`/`lon` > a coordinate `daddr`. Text: `q` > `daddr`.

use std::sync::LazyLock;

use geoshare_core::Position;
use regex::Regex;

use crate::coords::{lat_lon, parse_lat_lon, parse_zoom, text};
use crate::input::{Input, InputId, ParseUriResult};
use crate::services::SCHEME;
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:magicearth://|{SCHEME}(?:[a-z0-9-]+\.)*magicearth\.com)\S*"
    ))
    .expect("valid regex")
});

pub static INPUT: Input = Input {
    id: InputId::MagicEarth,
    name: "Magic Earth",
    examples: &[
        "https://magicearth.com/?show_on_map&lat=48.85649&lon=2.35216&name=H%C3%B4tel+de+Ville",
        "magicearth://?drive_to&daddr=48.85649,2.35216",
        "https://magicearth.com/?q=Louvre",
    ],
    schemes: &["https", "http", "magicearth"],
    uri_pattern: &URI_RE,
    short_uri: None,
    parse_uri,
    parse_html: None,
};

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let daddr = uri.query_param("daddr");
    let coords = uri
        .query_param("lat")
        .zip(uri.query_param("lon"))
        .and_then(|(lat, lon)| lat_lon(lat, lon))
        .or_else(|| daddr.and_then(parse_lat_lon));

    let q = text(uri.query_param("q")).or_else(|| {
        daddr
            .filter(|d| parse_lat_lon(d).is_none())
            .and_then(|d| text(Some(d)))
    });
    let zoom = uri
        .query_param("z")
        .or_else(|| uri.query_param("zoom"))
        .and_then(parse_zoom);

    let position = match coords {
        Some((lat, lon)) => Position::from_coords(lat, lon),
        None => Position::new(),
    }
    .with_name(text(uri.query_param("name")))
    .with_q(q)
    .with_zoom(zoom);
    ParseUriResult::new(position)
}
