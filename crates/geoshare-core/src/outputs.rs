//! Text, links and files generated from a parsed [`Position`].
//!
//! Every builder works on the WGS-84 view of the position; GCJ-02 inputs are
//! shifted here and nowhere else.

use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use quick_xml::escape::escape;

use crate::point::{format_coord, Point};
use crate::position::Position;

/// Characters escaped inside a query-parameter value.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'(')
    .add(b')')
    .add(b'+')
    .add(b',')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const GPX_CREATOR: &str = "geoshare";

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

fn coords_pair(point: &Point) -> String {
    format!("{},{}", format_coord(point.lat), format_coord(point.lon))
}

/// The single point an output should target, already in WGS-84.
fn target(position: &Position) -> Option<Point> {
    position.to_wgs84().main_point()
}

/// The free text describing the position, query before name.
fn text(position: &Position) -> Option<&str> {
    position.q.as_deref().or(position.name.as_deref())
}

/// `"50.123456, -11.123456"`
#[must_use]
pub fn coordinates_decimal(position: &Position) -> Option<String> {
    let point = target(position)?;
    Some(format!(
        "{}, {}",
        format_coord(point.lat),
        format_coord(point.lon)
    ))
}

/// `"50° 7′ 24.442″ N, 11° 7′ 24.442″ W"`
#[must_use]
pub fn coordinates_degrees_minutes_seconds(position: &Position) -> Option<String> {
    let point = target(position)?;
    let lat_hemisphere = if point.lat < 0.0 { 'S' } else { 'N' };
    let lon_hemisphere = if point.lon < 0.0 { 'W' } else { 'E' };
    Some(format!(
        "{} {lat_hemisphere}, {} {lon_hemisphere}",
        degrees_minutes_seconds(point.lat),
        degrees_minutes_seconds(point.lon)
    ))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn degrees_minutes_seconds(value: f64) -> String {
    // Rounding once in milliseconds of arc lets 59.9996″ carry into the
    // minutes instead of printing 60″.
    let total_ms = (value.abs() * 3_600_000.0).round() as u64;
    let degrees = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms % 60_000) as f64 / 1000.0;
    let seconds = format!("{seconds:.3}");
    let seconds = seconds.trim_end_matches('0').trim_end_matches('.');
    format!("{degrees}° {minutes}′ {seconds}″")
}

/// A `geo:` URI that the geo input parses back into an equivalent position.
///
/// Query-only positions are written as `geo:0,0?q=...`; a name without a
/// query travels as the `q=LAT,LON(NAME)` label.
#[must_use]
pub fn geo_uri(position: &Position) -> Option<String> {
    let mut params = Vec::new();
    let uri = if let Some(point) = target(position) {
        let coords = coords_pair(&point);
        if let Some(q) = &position.q {
            params.push(format!("q={}", encode(q)));
        } else if let Some(name) = &point.name {
            params.push(format!("q={coords}({})", encode(name)));
        }
        if let Some(zoom) = point.zoom {
            params.push(format!("z={}", format_coord(zoom)));
        }
        format!("geo:{coords}")
    } else {
        params.push(format!("q={}", encode(text(position)?)));
        if let Some(zoom) = position.zoom {
            params.push(format!("z={}", format_coord(zoom)));
        }
        "geo:0,0".to_owned()
    };
    if params.is_empty() {
        Some(uri)
    } else {
        Some(format!("{uri}?{}", params.join("&")))
    }
}

#[must_use]
pub fn google_maps_url(position: &Position) -> Option<String> {
    if let Some(point) = target(position) {
        let mut url = format!("https://www.google.com/maps?q={}", coords_pair(&point));
        if let Some(zoom) = point.zoom {
            url.push_str(&format!("&z={}", format_coord(zoom)));
        }
        return Some(url);
    }
    Some(format!("https://www.google.com/maps?q={}", encode(text(position)?)))
}

#[must_use]
pub fn google_maps_navigation_url(position: &Position) -> Option<String> {
    let destination = match target(position) {
        Some(point) => coords_pair(&point),
        None => encode(text(position)?),
    };
    Some(format!(
        "https://www.google.com/maps/dir/?api=1&destination={destination}"
    ))
}

#[must_use]
pub fn apple_maps_url(position: &Position) -> Option<String> {
    if let Some(point) = target(position) {
        let mut url = format!("https://maps.apple.com/?ll={}", coords_pair(&point));
        if let Some(label) = point.name.as_deref().or(position.q.as_deref()) {
            url.push_str(&format!("&q={}", encode(label)));
        }
        if let Some(zoom) = point.zoom {
            url.push_str(&format!("&z={}", format_coord(zoom)));
        }
        return Some(url);
    }
    Some(format!("https://maps.apple.com/?q={}", encode(text(position)?)))
}

#[must_use]
pub fn apple_maps_navigation_url(position: &Position) -> Option<String> {
    let destination = match target(position) {
        Some(point) => coords_pair(&point),
        None => encode(text(position)?),
    };
    Some(format!("https://maps.apple.com/?daddr={destination}"))
}

#[must_use]
pub fn magic_earth_url(position: &Position) -> Option<String> {
    if let Some(point) = target(position) {
        let mut url = format!(
            "magicearth://?show_on_map&lat={}&lon={}",
            format_coord(point.lat),
            format_coord(point.lon)
        );
        if let Some(name) = point.name.as_deref().or(position.q.as_deref()) {
            url.push_str(&format!("&name={}", encode(name)));
        }
        return Some(url);
    }
    Some(format!("magicearth://?q={}", encode(text(position)?)))
}

#[must_use]
pub fn magic_earth_navigation_url(position: &Position) -> Option<String> {
    let point = target(position)?;
    Some(format!(
        "magicearth://?drive_to&lat={}&lon={}",
        format_coord(point.lat),
        format_coord(point.lon)
    ))
}

fn gpx_document(time: DateTime<Utc>, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <gpx xmlns=\"http://www.topografix.com/GPX/1/1\" version=\"1.1\" creator=\"{GPX_CREATOR}\">\n\
         <metadata><time>{}</time></metadata>\n\
         {body}\
         </gpx>\n",
        time.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

fn gpx_point(tag: &str, point: &Point) -> String {
    let attrs = format!(
        "lat=\"{}\" lon=\"{}\"",
        format_coord(point.lat),
        format_coord(point.lon)
    );
    match &point.name {
        Some(name) => format!("<{tag} {attrs}><name>{}</name></{tag}>\n", escape(name)),
        None => format!("<{tag} {attrs}/>\n"),
    }
}

/// One `<wpt>` per point of the position.
#[must_use]
pub fn gpx_waypoints(position: &Position, time: DateTime<Utc>) -> Option<String> {
    let points = position.to_wgs84().all_points();
    if points.is_empty() {
        return None;
    }
    let body: String = points.iter().map(|p| gpx_point("wpt", p)).collect();
    Some(gpx_document(time, &body))
}

/// A `<rte>` starting at `start` (the device location) and visiting every
/// point of the position.
#[must_use]
pub fn gpx_route(position: &Position, start: &Point, time: DateTime<Utc>) -> Option<String> {
    let points = position.to_wgs84().all_points();
    if points.is_empty() {
        return None;
    }
    let mut body = String::from("<rte>\n");
    body.push_str(&gpx_point("rtept", start));
    for point in &points {
        body.push_str(&gpx_point("rtept", point));
    }
    body.push_str("</rte>\n");
    Some(gpx_document(time, &body))
}

#[cfg(test)]
#[path = "outputs_test.rs"]
mod tests;
