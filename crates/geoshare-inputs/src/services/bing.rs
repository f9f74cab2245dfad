//! Bing Maps links.
//!
//! Coordinates: `rtp` route > `sp=point.LAT_LON_NAME` > `cp=LAT~LON`.
//! Zoom from `lvl`, text from `q` or `where1`.

use std::sync::LazyLock;

use geoshare_core::{Point, Position};
use regex::Regex;

use crate::coords::{lat_lon, parse_zoom, text, NUM};
use crate::input::{Input, InputId, ParseUriResult};
use crate::services::{web_pattern, WEB_SCHEMES};
use crate::uri::Uri;

static URI_RE: LazyLock<Regex> = LazyLock::new(|| web_pattern(r"(?:[a-z0-9-]+\.)*bing\.com/maps"));

pub static INPUT: Input = Input {
    id: InputId::Bing,
    name: "Bing Maps",
    examples: &[
        "https://www.bing.com/maps?cp=47.6062~-122.3321&lvl=12",
        "https://www.bing.com/maps?sp=point.47.6205_-122.3493_Space%20Needle",
        "https://bing.com/maps/default.aspx?rtp=pos.47.6_-122.33~pos.45.52_-122.68_Portland",
        "https://www.bing.com/maps?q=Pike+Place+Market",
    ],
    schemes: WEB_SCHEMES,
    uri_pattern: &URI_RE,
    short_uri: None,
    parse_uri,
    parse_html: None,
};

/// `point.LAT_LON[_NAME]` or `pos.LAT_LON[_NAME]`.
static WAYPOINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?:point|pos)\.({NUM})_({NUM})(?:_(.*))?$")).expect("valid regex")
});

fn parse_waypoint(value: &str) -> Option<Point> {
    let caps = WAYPOINT_RE.captures(value)?;
    let (lat, lon) = lat_lon(&caps[1], &caps[2])?;
    Some(Point::new(lat, lon).with_name(text(caps.get(3).map(|m| m.as_str()))))
}

fn parse_uri(uri: &Uri) -> ParseUriResult {
    let zoom = uri.query_param("lvl").and_then(parse_zoom);
    let q = ["q", "where1"]
        .iter()
        .find_map(|key| text(uri.query_param(key)));

    // `adr.` waypoints carry only an address and are skipped.
    let route: Vec<Point> = uri
        .query_param("rtp")
        .map(|rtp| rtp.split('~').filter_map(parse_waypoint).collect())
        .unwrap_or_default();
    if !route.is_empty() {
        return ParseUriResult::new(Position::from_points(route).with_zoom(zoom));
    }

    let position = if let Some(point) = uri.query_param("sp").and_then(parse_waypoint) {
        Position::from_coords(point.lat, point.lon).with_name(point.name)
    } else if let Some((lat, lon)) = uri
        .query_param("cp")
        .and_then(|cp| cp.split_once('~'))
        .and_then(|(lat, lon)| lat_lon(lat, lon))
    {
        Position::from_coords(lat, lon)
    } else {
        Position::new()
    };
    ParseUriResult::new(position.with_q(q).with_zoom(zoom))
}
