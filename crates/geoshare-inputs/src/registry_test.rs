use super::*;

#[test]
fn every_example_matches_only_its_own_input() {
    for owner in INPUTS {
        for example in owner.examples {
            let matching: Vec<InputId> = INPUTS
                .iter()
                .filter(|input| input.matches(example).is_some())
                .map(|input| input.id)
                .collect();
            assert_eq!(
                matching,
                vec![owner.id],
                "{example} should match only {}",
                owner.id
            );
        }
    }
}

#[test]
fn every_example_resolves_to_its_own_input() {
    for owner in INPUTS {
        for example in owner.examples {
            let (input, _) = find_uri(example)
                .unwrap_or_else(|| panic!("{example} did not match any input"));
            assert_eq!(input.id, owner.id, "{example}");
        }
    }
}

#[test]
fn every_example_parses_to_something_or_needs_the_network() {
    for owner in INPUTS {
        for example in owner.examples {
            let (input, uri) = find_uri(example).unwrap();
            if input.is_short_uri(&uri) {
                continue;
            }
            let result = input.parse_uri(&uri);
            assert!(
                !result.position.is_empty() || result.html_url.is_some(),
                "{example} produced nothing"
            );
        }
    }
}

#[test]
fn links_are_found_inside_surrounding_text() {
    let text = "Meet me here: https://maps.apple.com/?ll=50.894967,4.341626&q=Atomium see you";
    let (input, uri) = find_uri(text).unwrap();
    assert_eq!(input.id, InputId::AppleMaps);
    assert_eq!(
        uri.as_str(),
        "https://maps.apple.com/?ll=50.894967,4.341626&q=Atomium"
    );
}

#[test]
fn link_ending_a_sentence_drops_the_full_stop() {
    let (input, uri) = find_uri("Meet here: https://maps.google.com/?q=48.8584,2.2945.").unwrap();
    assert_eq!(input.id, InputId::GoogleMaps);
    assert_eq!(uri.as_str(), "https://maps.google.com/?q=48.8584,2.2945");

    let result = input.parse_uri(&uri);
    assert_eq!(
        (result.position.lat, result.position.lon),
        (Some(48.8584), Some(2.2945))
    );
    assert!(result.html_url.is_none());
}

#[test]
fn link_in_parentheses_drops_the_closing_bracket() {
    let (input, uri) = find_uri("(https://maps.apple.com/?ll=50.894967,4.341626)").unwrap();
    assert_eq!(input.id, InputId::AppleMaps);
    assert_eq!(uri.as_str(), "https://maps.apple.com/?ll=50.894967,4.341626");
    let position = input.parse_uri(&uri).position;
    assert_eq!(
        (position.lat, position.lon),
        (Some(50.894_967), Some(4.341_626))
    );
}

#[test]
fn labelled_geo_uri_keeps_its_brackets() {
    let (input, uri) = find_uri("Home is geo:52.5,13.4?q=52.5,13.4(Home).").unwrap();
    assert_eq!(input.id, InputId::Geo);
    assert_eq!(uri.as_str(), "geo:52.5,13.4?q=52.5,13.4(Home)");
}

#[test]
fn schemeless_links_get_https() {
    let (input, uri) = find_uri("osm.org/go/euut9uGP--").unwrap();
    assert_eq!(input.id, InputId::OpenStreetMap);
    assert_eq!(uri.scheme(), "https");
}

#[test]
fn blank_and_unknown_text_match_nothing() {
    assert!(find_uri("   ").is_none());
    assert!(find_uri("https://example.com/somewhere").is_none());
    assert!(find_uri("no link here").is_none());
}

#[test]
fn registry_order_ends_with_coordinates() {
    let ids: Vec<InputId> = INPUTS.iter().map(|input| input.id).collect();
    assert_eq!(ids.first(), Some(&InputId::Geo));
    assert_eq!(ids.last(), Some(&InputId::Coordinates));
}

#[test]
fn lookup_by_id_returns_the_registered_input() {
    for registered in INPUTS {
        assert!(std::ptr::eq(input(registered.id), registered));
    }
}

#[test]
fn every_short_link_example_is_recognized() {
    let short_examples = [
        "https://maps.app.goo.gl/TmbeHMiLEfTBws9EA",
        "https://maps.apple/p/QJcE3l5Aw1yRSc",
        "http://j.map.baidu.com/4d/bOc",
        "https://surl.amap.com/2bQc9Xm1eZ",
        "https://yandex.ru/maps/-/CDuWbM2a",
        "https://her.is/3xYzAbC",
        "https://mapy.cz/s/gacatokobu",
        "https://go.2gis.com/k4bd7",
    ];
    for example in short_examples {
        let (input, uri) = find_uri(example).unwrap();
        assert!(input.is_short_uri(&uri), "{example} should be a short link");
    }
}
