//! Mapy.cz / Mapy.com links: `source=coor&id=LON,LAT` > `x`/`y`.

use std::sync::LazyLock;

use geoshare_core::Position;
use regex::Regex;

use crate::coords::{lat_lon, parse_lon_lat, parse_zoom, text};
use crate::input::{Input, InputId, ParseUriResult, ShortUri, ShortUriMethod};
use crate::services::{short_pattern, web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| web_pattern(r"(?:[a-z0-9-]+\.)*mapy\.(?:cz|com)(?:[/?#]|$)"));

static SHORT_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| short_pattern(r"(?:[a-z0-9-]+\.)*mapy\.(?:cz|com)/s"));

pub static INPUT: Input = Input {
    id: InputId::Mapy,
    name: "Mapy.com",
    examples: &[
        "https://mapy.cz/zakladni?x=14.4378&y=50.0755&z=15",
        "https://en.mapy.com/en/?source=coor&id=14.4210,50.0870&x=14.4&y=50.0&z=17",
        "https://mapy.cz/s/gacatokobu",
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

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let source_coords = (uri.query_param("source") == Some("coor"))
        .then(|| uri.query_param("id").and_then(parse_lon_lat))
        .flatten();
    let coords = source_coords.or_else(|| {
        uri.query_param("y")
            .zip(uri.query_param("x"))
            .and_then(|(lat, lon)| lat_lon(lat, lon))
    });

    let position = match coords {
        Some((lat, lon)) => Position::from_coords(lat, lon),
        None => Position::new(),
    }
    .with_q(text(uri.query_param("q")))
    .with_zoom(uri.query_param("z").and_then(parse_zoom));
    ParseUriResult::new(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Position {
        let uri = INPUT.to_uri(INPUT.matches(raw).unwrap()).unwrap();
        INPUT.parse_uri(&uri).position
    }

    #[test]
    fn x_y_are_lon_lat() {
        let position = parse(INPUT.examples[0]);
        assert_eq!((position.lat, position.lon), (Some(50.0755), Some(14.4378)));
        assert_eq!(position.zoom, Some(15.0));
    }

    #[test]
    fn source_coor_beats_x_y() {
        let position = parse(INPUT.examples[1]);
        assert_eq!((position.lat, position.lon), (Some(50.087), Some(14.421)));
    }

    #[test]
    fn non_coordinate_source_is_ignored() {
        let position = parse("https://mapy.cz/?source=firm&id=123&x=1&y=2");
        assert_eq!((position.lat, position.lon), (Some(2.0), Some(1.0)));
    }

    #[test]
    fn text_query() {
        let position = parse("https://mapy.cz/?q=Karl%C5%AFv%20most");
        assert_eq!(position.q.as_deref(), Some("Karlův most"));
    }

    #[test]
    fn short_link() {
        let uri = INPUT.to_uri(INPUT.examples[2]).unwrap();
        assert!(INPUT.is_short_uri(&uri));
        let full = INPUT.to_uri(INPUT.examples[0]).unwrap();
        assert!(!INPUT.is_short_uri(&full));
    }
}
