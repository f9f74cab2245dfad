use super::*;

fn parse(raw: &str) -> ParseUriResult {
    let found = INPUT.matches(raw).expect("google maps link");
    let uri = INPUT.to_uri(found).expect("valid uri");
    INPUT.parse_uri(&uri)
}

#[test]
fn place_link_prefers_data_pin_over_viewport() {
    let result = parse(INPUT.examples[0]);
    let position = result.position;
    assert_eq!(position.lat, Some(52.408_412_6));
    assert_eq!(position.lon, Some(16.932_026_1));
    assert_eq!(position.zoom, Some(17.0));
    assert_eq!(position.q.as_deref(), Some("Poznań Old Town"));
    assert_eq!(result.html_url, None);
}

#[test]
fn coordinate_query_with_zoom() {
    let position = parse("https://maps.google.com/?q=48.8584,2.2945&z=15").position;
    assert_eq!(position.lat, Some(48.8584));
    assert_eq!(position.lon, Some(2.2945));
    assert_eq!(position.zoom, Some(15.0));
    assert_eq!(position.q, None);
}

#[test]
fn ll_beats_center() {
    let position = parse("https://www.google.com/maps?center=1,2&ll=3,4").position;
    assert_eq!((position.lat, position.lon), (Some(3.0), Some(4.0)));
}

#[test]
fn q_beats_viewpoint() {
    let position =
        parse("https://www.google.com/maps/@?api=1&map_action=pano&viewpoint=1,2&q=5,6").position;
    assert_eq!((position.lat, position.lon), (Some(5.0), Some(6.0)));
}

#[test]
fn coordinate_destination_used_when_q_is_text() {
    let position =
        parse("https://www.google.com/maps/dir/?api=1&q=Cafe&destination=10.5,20.5").position;
    assert_eq!((position.lat, position.lon), (Some(10.5), Some(20.5)));
    assert_eq!(position.q.as_deref(), Some("Cafe"));
}

#[test]
fn coordinate_daddr_is_used_when_q_is_text() {
    let position = parse("https://maps.google.com/maps?q=Cafe&daddr=10.5,20.5").position;
    assert_eq!((position.lat, position.lon), (Some(10.5), Some(20.5)));
    assert_eq!(position.q.as_deref(), Some("Cafe"));
}

#[test]
fn viewport_only_link() {
    let position = parse("https://www.google.com/maps/@52.5,13.4,11.5z").position;
    assert_eq!((position.lat, position.lon), (Some(52.5), Some(13.4)));
    assert_eq!(position.zoom, Some(11.5));
}

#[test]
fn directions_become_points() {
    let position = parse("https://www.google.de/maps/dir/52.5163,13.3777/52.5200,13.4050/").position;
    assert_eq!(position.points.len(), 2);
    assert_eq!(position.points[1], Point::new(52.52, 13.405));
    assert_eq!(position.lat, None);
}

#[test]
fn text_directions_ask_for_html() {
    let result = parse("https://www.google.com/maps/dir/Berlin/Hamburg+Hbf/");
    assert_eq!(result.position.q.as_deref(), Some("Hamburg Hbf"));
    assert!(result.html_url.is_some());
}

#[test]
fn destination_text_beats_q_text() {
    let position = parse("https://www.google.com/maps?q=Cafe&destination=Museum").position;
    assert_eq!(position.q.as_deref(), Some("Museum"));
}

#[test]
fn place_name_without_coordinates_needs_html() {
    let result = parse("https://www.google.com/maps/place/Eiffel+Tower/");
    assert!(result.position.is_query_only());
    assert_eq!(result.position.q.as_deref(), Some("Eiffel Tower"));
    assert_eq!(
        result.html_url.as_deref(),
        Some("https://www.google.com/maps/place/Eiffel+Tower/")
    );
}

#[test]
fn place_coordinates_in_path() {
    let position = parse("https://www.google.com/maps/place/48.85,2.29").position;
    assert_eq!((position.lat, position.lon), (Some(48.85), Some(2.29)));
    assert_eq!(position.q, None);
}

#[test]
fn search_text() {
    let position = parse("https://www.google.com/maps/search/pizza+near+me").position;
    assert_eq!(position.q.as_deref(), Some("pizza near me"));
}

#[test]
fn cid_link_needs_html() {
    let result = parse("https://maps.google.com/?cid=1234567890");
    assert!(result.position.is_empty());
    assert_eq!(
        result.html_url.as_deref(),
        Some("https://maps.google.com/?cid=1234567890")
    );
}

#[test]
fn link_without_anything_is_empty() {
    let result = parse("https://maps.google.com/foo-redirect");
    assert!(result.position.is_empty());
    assert_eq!(result.html_url, None);
}

#[test]
fn found_in_chat_message() {
    let found = INPUT
        .matches("Look here: https://maps.app.goo.gl/TmbeHMiLEfTBws9EA see you")
        .unwrap();
    assert_eq!(found, "https://maps.app.goo.gl/TmbeHMiLEfTBws9EA");
}

#[test]
fn short_links_are_recognized() {
    for raw in [
        "https://maps.app.goo.gl/TmbeHMiLEfTBws9EA",
        "https://maps.app.goo.gl/TmbeHMiLEfTBws9EA?g_st=ic",
        "goo.gl/maps/aB3dE",
        "https://g.co/kgs/yT9m2kP",
    ] {
        let uri = INPUT.to_uri(INPUT.matches(raw).unwrap()).unwrap();
        assert!(INPUT.is_short_uri(&uri), "{raw}");
    }
}

#[test]
fn full_links_are_not_short() {
    let uri = INPUT
        .to_uri("https://www.google.com/maps/place/Eiffel+Tower/")
        .unwrap();
    assert!(!INPUT.is_short_uri(&uri));
}

#[test]
fn foreign_scheme_is_rejected() {
    assert!(INPUT.to_uri("ftp://maps.google.com/?q=1,2").is_none());
}

#[test]
fn html_null_pin() {
    let html = r#"<script>window.x=[null,null,48.8583701,2.2944813]</script>"#;
    let result = parse_html(html);
    assert_eq!(result.position, Position::from_coords(48.858_370_1, 2.294_481_3));
}

#[test]
fn html_static_map_marker() {
    let html = r#"<meta content="https://maps.google.com/maps/api/staticmap?center=48.85%2C2.29&amp;zoom=15">"#;
    let result = parse_html(html);
    assert_eq!(result.position, Position::from_coords(48.85, 2.29));
}

#[test]
fn html_app_state_is_lon_lat() {
    let html = "APP_INITIALIZATION_STATE=[[[5000.1,2.2945,48.8584],[0,0,0]]]";
    let result = parse_html(html);
    assert_eq!(result.position, Position::from_coords(48.8584, 2.2945));
}

#[test]
fn html_place_link_becomes_redirect() {
    let html = r#"<a href="/maps/place/Eiffel+Tower/data=!4m2?entry=ttu&amp;g_ep=x">"#;
    let result = parse_html(html);
    assert!(result.position.is_empty());
    assert_eq!(
        result.redirect_url.as_deref(),
        Some("/maps/place/Eiffel+Tower/data=!4m2?entry=ttu&g_ep=x")
    );
}

#[test]
fn html_without_coordinates() {
    assert_eq!(parse_html("<html></html>"), ParseHtmlResult::default());
}
