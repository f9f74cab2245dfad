//! Waze links.
//!
//! `/ul/h<geohash>` links decode offline. Otherwise coordinates come from
//! `ll`, `to=ll.LAT,LON` or `latlng`, in that order. Venue links
//! (`venue_id`, `to=place.ID`) are resolved from the live-map page.

use std::sync::LazyLock;

use geoshare_core::Position;
use regex::Regex;

use crate::coords::{lat_lon, parse_lat_lon, parse_zoom, text, NUM};
use crate::input::{Input, InputId, ParseHtmlResult, ParseUriResult};
use crate::services::{web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> = LazyLock::new(|| web_pattern(r"(?:[a-z0-9-]+\.)*waze\.com/"));

pub static INPUT: Input = Input {
    id: InputId::Waze,
    name: "Waze",
    examples: &[
        "https://waze.com/ul/hdr5ru7v2",
        "https://ul.waze.com/ul?ll=45.69063,-120.81098&navigate=yes&zoom=17",
        "https://www.waze.com/live-map/directions?to=ll.40.758,-73.9855",
        "https://www.waze.com/ul?venue_id=183894452.1839010060.260192",
    ],
    schemes: WEB_SCHEMES,
    uri_pattern: &URI_RE,
    short_uri: None,
    parse_uri,
    parse_html: Some(parse_html),
};

const GEOHASH_ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Decodes a geohash to the center of its cell.
fn decode_geohash(hash: &str) -> Option<(f64, f64)> {
    let mut lat = (-90.0_f64, 90.0_f64);
    let mut lon = (-180.0_f64, 180.0_f64);
    let mut even = true;
    for c in hash.bytes() {
        let value = GEOHASH_ALPHABET
            .iter()
            .position(|&a| a == c.to_ascii_lowercase())?;
        for mask in [16, 8, 4, 2, 1] {
            let range = if even { &mut lon } else { &mut lat };
            let mid = (range.0 + range.1) / 2.0;
            if value & mask == 0 {
                range.1 = mid;
            } else {
                range.0 = mid;
            }
            even = !even;
        }
    }
    if hash.is_empty() {
        return None;
    }
    Some(((lat.0 + lat.1) / 2.0, (lon.0 + lon.1) / 2.0))
}

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let segments = uri.path_segments();
    let zoom = uri
        .query_param("zoom")
        .or_else(|| uri.query_param("z"))
        .and_then(parse_zoom);
    let q = text(uri.query_param("q"));

    let geohash = match segments.as_slice() {
        [ul, hash] if ul == "ul" && hash.len() > 1 && hash.starts_with('h') => {
            decode_geohash(&hash[1..])
        }
        _ => None,
    };
    let to = uri.query_param("to");
    let coords = geohash
        .or_else(|| uri.query_param("ll").and_then(parse_lat_lon))
        .or_else(|| {
            to.and_then(|to| to.strip_prefix("ll."))
                .and_then(parse_lat_lon)
        })
        .or_else(|| uri.query_param("latlng").and_then(parse_lat_lon));

    let position = match coords {
        Some((lat, lon)) => Position::from_coords(lat, lon),
        None => Position::new(),
    }
    .with_q(q)
    .with_zoom(zoom);

    let result = ParseUriResult::new(position);
    let is_venue = uri.has_query_param("venue_id")
        || to.is_some_and(|to| to.starts_with("place."));
    if is_venue {
        result.with_html_fallback(uri.as_str())
    } else {
        result
    }
}

static HTML_LAT_LNG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#""latLng"\s*:\s*\{{\s*"lat"\s*:\s*({NUM})\s*,\s*"lng"\s*:\s*({NUM})"#
    ))
    .expect("valid regex")
});

fn parse_html(html: &str) -> ParseHtmlResult {
    HTML_LAT_LNG_RE
        .captures(html)
        .and_then(|caps| lat_lon(&caps[1], &caps[2]))
        .map(|(lat, lon)| ParseHtmlResult::new(Position::from_coords(lat, lon)))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ParseUriResult {
        let uri = INPUT.to_uri(INPUT.matches(raw).unwrap()).unwrap();
        INPUT.parse_uri(&uri)
    }

    #[test]
    fn geohash_link_decodes_offline() {
        let position = parse("https://waze.com/ul/hdr5ru7v2").position;
        let (lat, lon) = (position.lat.unwrap(), position.lon.unwrap());
        assert!((lat - 40.757_989_88).abs() < 1e-7, "{lat}");
        assert!((lon - -73.985_538_48).abs() < 1e-7, "{lon}");
    }

    #[test]
    fn geohash_rejects_invalid_characters() {
        assert_eq!(decode_geohash("dr5a"), None);
        assert_eq!(decode_geohash(""), None);
    }

    #[test]
    fn ll_with_zoom() {
        let position = parse(INPUT.examples[1]).position;
        assert_eq!(
            (position.lat, position.lon),
            (Some(45.690_63), Some(-120.810_98))
        );
        assert_eq!(position.zoom, Some(17.0));
    }

    #[test]
    fn to_ll_is_used_without_ll() {
        let position = parse(INPUT.examples[2]).position;
        assert_eq!((position.lat, position.lon), (Some(40.758), Some(-73.9855)));
    }

    #[test]
    fn ll_beats_latlng() {
        let position = parse("https://www.waze.com/ul?latlng=1,2&ll=3,4").position;
        assert_eq!((position.lat, position.lon), (Some(3.0), Some(4.0)));
    }

    #[test]
    fn text_query() {
        let position = parse("https://waze.com/ul?q=Times%20Square").position;
        assert_eq!(position.q.as_deref(), Some("Times Square"));
    }

    #[test]
    fn venue_needs_html() {
        let result = parse(INPUT.examples[3]);
        assert_eq!(result.html_url.as_deref(), Some(INPUT.examples[3]));
    }

    #[test]
    fn place_destination_needs_html() {
        let result = parse("https://www.waze.com/live-map/directions?to=place.ChIJ123");
        assert!(result.html_url.is_some());
    }

    #[test]
    fn html_lat_lng() {
        let html = r#"{"venue":{"latLng":{"lat":40.758,"lng":-73.9855},"name":"x"}}"#;
        assert_eq!(
            parse_html(html).position,
            Position::from_coords(40.758, -73.9855)
        );
    }
}
