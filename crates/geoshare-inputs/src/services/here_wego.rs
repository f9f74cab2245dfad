//! HERE WeGo links.
//!
//! Coordinates: `/directions/` waypoints > `/l/LAT,LON,NAME` >
//! `map=LAT,LON,ZOOM`. Text from `q`.

use std::sync::LazyLock;

use geoshare_core::{Point, Position};
use regex::Regex;

use crate::coords::{lat_lon, parse_zoom, text, NUM};
use crate::input::{Input, InputId, ParseUriResult, ShortUri, ShortUriMethod};
use crate::services::{short_pattern, web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| web_pattern(r"(?:[a-z0-9-]+\.)*(?:wego\.here\.com|share\.here\.com|her\.is/)"));

static SHORT_URI_RE: LazyLock<Regex> = LazyLock::new(|| short_pattern(r"her\.is"));

pub static INPUT: Input = Input {
    id: InputId::HereWeGo,
    name: "HERE WeGo",
    examples: &[
        "https://share.here.com/l/52.51628,13.37771,Brandenburger%20Tor?z=16",
        "https://wego.here.com/?map=50.0755,14.4378,15,normal",
        "https://wego.here.com/directions/drive/start:52.5,13.4/Hamburg:53.55,9.99",
        "https://her.is/3xYzAbC",
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

/// `NAME:LAT,LON` or `LAT,LON` waypoint segments.
static WAYPOINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:^|:)({NUM}),({NUM})$")).expect("valid regex")
});

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let segments = uri.path_segments();
    let q = text(uri.query_param("q"));
    let zoom = uri.query_param("z").and_then(parse_zoom);

    if segments.first().is_some_and(|s| s == "directions") {
        let points: Vec<Point> = segments
            .iter()
            .skip(1)
            .filter_map(|s| WAYPOINT_RE.captures(s))
            .filter_map(|caps| lat_lon(&caps[1], &caps[2]))
            .map(|(lat, lon)| Point::new(lat, lon))
            .collect();
        if !points.is_empty() {
            return ParseUriResult::new(Position::from_points(points).with_zoom(zoom));
        }
    }

    // `/l/LAT,LON,NAME`; the name may itself contain commas.
    if let [l, rest] = segments.as_slice() {
        if l == "l" {
            let mut parts = rest.splitn(3, ',');
            if let (Some(lat), Some(lon)) = (parts.next(), parts.next()) {
                if let Some((lat, lon)) = lat_lon(lat, lon) {
                    let name = text(parts.next());
                    return ParseUriResult::new(
                        Position::from_coords(lat, lon)
                            .with_name(name)
                            .with_q(q)
                            .with_zoom(zoom),
                    );
                }
            }
        }
    }

    let map = uri.query_param("map").and_then(|map| {
        let mut parts = map.split(',');
        let (lat, lon) = lat_lon(parts.next()?, parts.next()?)?;
        Some((lat, lon, parts.next().and_then(parse_zoom)))
    });
    let position = match map {
        Some((lat, lon, map_zoom)) => Position::from_coords(lat, lon).with_zoom(map_zoom),
        None => Position::new(),
    }
    .with_q(q)
    .with_zoom(zoom);
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
    fn share_location_with_name() {
        let position = parse(INPUT.examples[0]);
        assert_eq!(
            (position.lat, position.lon),
            (Some(52.516_28), Some(13.377_71))
        );
        assert_eq!(position.name.as_deref(), Some("Brandenburger Tor"));
        assert_eq!(position.zoom, Some(16.0));
    }

    #[test]
    fn map_parameter_with_zoom() {
        let position = parse(INPUT.examples[1]);
        assert_eq!((position.lat, position.lon), (Some(50.0755), Some(14.4378)));
        assert_eq!(position.zoom, Some(15.0));
    }

    #[test]
    fn directions_become_points() {
        let position = parse(INPUT.examples[2]);
        assert_eq!(
            position.points,
            vec![Point::new(52.5, 13.4), Point::new(53.55, 9.99)]
        );
    }

    #[test]
    fn text_query() {
        let position = parse("https://wego.here.com/search?q=Charles%20Bridge");
        assert_eq!(position.q.as_deref(), Some("Charles Bridge"));
    }

    #[test]
    fn short_link() {
        let uri = INPUT.to_uri(INPUT.examples[3]).unwrap();
        assert!(INPUT.is_short_uri(&uri));
    }
}
