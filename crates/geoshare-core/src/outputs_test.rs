use chrono::TimeZone;

use super::*;
use crate::srs::Srs;

fn sample() -> Position {
    Position::from_coords(50.123_456, -11.123_456)
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
}

#[test]
fn coordinates_decimal_formats_pair() {
    assert_eq!(
        coordinates_decimal(&sample()).as_deref(),
        Some("50.123456, -11.123456")
    );
}

#[test]
fn coordinates_decimal_is_none_for_query_only() {
    assert_eq!(coordinates_decimal(&Position::from_query("Berlin")), None);
}

#[test]
fn coordinates_dms_uses_hemisphere_letters() {
    assert_eq!(
        coordinates_degrees_minutes_seconds(&sample()).as_deref(),
        Some("50° 7′ 24.442″ N, 11° 7′ 24.442″ W")
    );
}

#[test]
fn coordinates_dms_carries_rounded_seconds() {
    // 59.99999″ rounds up into a full minute.
    let position = Position::from_coords(-10.016_666_664, 20.5);
    assert_eq!(
        coordinates_degrees_minutes_seconds(&position).as_deref(),
        Some("10° 1′ 0″ S, 20° 30′ 0″ E")
    );
}

#[test]
fn geo_uri_with_query_and_zoom() {
    let position = sample()
        .with_q(Some("foo bar".to_owned()))
        .with_zoom(Some(3.4));
    assert_eq!(
        geo_uri(&position).as_deref(),
        Some("geo:50.123456,-11.123456?q=foo%20bar&z=3.4")
    );
}

#[test]
fn geo_uri_puts_name_into_label() {
    let position = Position::from_coords(1.5, 2.5).with_name(Some("Café (main)".to_owned()));
    assert_eq!(
        geo_uri(&position).as_deref(),
        Some("geo:1.5,2.5?q=1.5,2.5(Caf%C3%A9%20%28main%29)")
    );
}

#[test]
fn geo_uri_without_params() {
    assert_eq!(
        geo_uri(&Position::from_coords(1.0, -2.0)).as_deref(),
        Some("geo:1,-2")
    );
}

#[test]
fn geo_uri_for_query_only_uses_zero_coordinates() {
    assert_eq!(
        geo_uri(&Position::from_query("Central Park")).as_deref(),
        Some("geo:0,0?q=Central%20Park")
    );
}

#[test]
fn geo_uri_is_none_for_empty_position() {
    assert_eq!(geo_uri(&Position::new()), None);
}

#[test]
fn geo_uri_targets_route_destination() {
    let position = Position::from_points(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
    assert_eq!(geo_uri(&position).as_deref(), Some("geo:3,4"));
}

#[test]
fn outputs_shift_gcj02_to_wgs84() {
    let position = Position::from_coords(39.909_187, 116.397_455).with_srs(Srs::Gcj02);
    let text = coordinates_decimal(&position).unwrap();
    assert!(text.starts_with("39.90778"), "got {text}");
}

#[test]
fn google_maps_url_with_zoom() {
    let position = sample().with_zoom(Some(3.4));
    assert_eq!(
        google_maps_url(&position).as_deref(),
        Some("https://www.google.com/maps?q=50.123456,-11.123456&z=3.4")
    );
}

#[test]
fn google_maps_url_for_query() {
    assert_eq!(
        google_maps_url(&Position::from_query("Eiffel Tower")).as_deref(),
        Some("https://www.google.com/maps?q=Eiffel%20Tower")
    );
}

#[test]
fn google_maps_navigation_url_uses_destination() {
    assert_eq!(
        google_maps_navigation_url(&sample()).as_deref(),
        Some("https://www.google.com/maps/dir/?api=1&destination=50.123456,-11.123456")
    );
}

#[test]
fn apple_maps_url_labels_with_name() {
    let position = sample().with_name(Some("Pin".to_owned()));
    assert_eq!(
        apple_maps_url(&position).as_deref(),
        Some("https://maps.apple.com/?ll=50.123456,-11.123456&q=Pin")
    );
}

#[test]
fn apple_maps_navigation_url_for_query() {
    assert_eq!(
        apple_maps_navigation_url(&Position::from_query("Paris")).as_deref(),
        Some("https://maps.apple.com/?daddr=Paris")
    );
}

#[test]
fn magic_earth_urls() {
    assert_eq!(
        magic_earth_url(&sample()).as_deref(),
        Some("magicearth://?show_on_map&lat=50.123456&lon=-11.123456")
    );
    assert_eq!(
        magic_earth_navigation_url(&sample()).as_deref(),
        Some("magicearth://?drive_to&lat=50.123456&lon=-11.123456")
    );
    assert_eq!(magic_earth_navigation_url(&Position::from_query("x")), None);
}

#[test]
fn gpx_waypoints_lists_every_point() {
    let position = Position::from_points(vec![
        Point::new(1.0, 2.0).with_name(Some("A & B".to_owned())),
        Point::new(3.0, 4.0),
    ]);
    let gpx = gpx_waypoints(&position, fixed_time()).unwrap();
    assert!(gpx.starts_with("<?xml version=\"1.0\""));
    assert!(gpx.contains("<time>2024-05-01T12:30:00Z</time>"));
    assert!(gpx.contains("<wpt lat=\"1\" lon=\"2\"><name>A &amp; B</name></wpt>"));
    assert!(gpx.contains("<wpt lat=\"3\" lon=\"4\"/>"));
    assert!(gpx.trim_end().ends_with("</gpx>"));
}

#[test]
fn gpx_waypoints_is_none_without_coordinates() {
    assert_eq!(gpx_waypoints(&Position::from_query("x"), fixed_time()), None);
}

#[test]
fn gpx_route_starts_at_device_location() {
    let start = Point::new(10.0, 20.0);
    let gpx = gpx_route(&sample(), &start, fixed_time()).unwrap();
    let first = gpx.find("<rtept lat=\"10\" lon=\"20\"/>").unwrap();
    let second = gpx.find("<rtept lat=\"50.123456\" lon=\"-11.123456\"/>").unwrap();
    assert!(first < second);
    assert!(gpx.contains("<rte>") && gpx.contains("</rte>"));
}
