//! The ordered list of inputs. The first input whose pattern matches wins,
//! so the free-text coordinates input stays last.

use crate::input::{Input, InputId};
use crate::services::{
    amap, apple_maps, baidu, bing, coordinates, ge0, geo, google_maps, here_wego, magic_earth,
    mapy, open_street_map, osmand, tencent, two_gis, waze, yandex,
};
use crate::uri::Uri;

pub static INPUTS: [&Input; 17] = [
    &geo::INPUT,
    &ge0::INPUT,
    &google_maps::INPUT,
    &apple_maps::INPUT,
    &waze::INPUT,
    &baidu::INPUT,
    &amap::INPUT,
    &tencent::INPUT,
    &yandex::INPUT,
    &open_street_map::INPUT,
    &osmand::INPUT,
    &here_wego::INPUT,
    &mapy::INPUT,
    &two_gis::INPUT,
    &magic_earth::INPUT,
    &bing::INPUT,
    &coordinates::INPUT,
];

#[must_use]
pub fn input(id: InputId) -> &'static Input {
    match id {
        InputId::Geo => &geo::INPUT,
        InputId::Ge0 => &ge0::INPUT,
        InputId::GoogleMaps => &google_maps::INPUT,
        InputId::AppleMaps => &apple_maps::INPUT,
        InputId::Waze => &waze::INPUT,
        InputId::Baidu => &baidu::INPUT,
        InputId::Amap => &amap::INPUT,
        InputId::Tencent => &tencent::INPUT,
        InputId::Yandex => &yandex::INPUT,
        InputId::OpenStreetMap => &open_street_map::INPUT,
        InputId::OsmAnd => &osmand::INPUT,
        InputId::HereWeGo => &here_wego::INPUT,
        InputId::Mapy => &mapy::INPUT,
        InputId::TwoGis => &two_gis::INPUT,
        InputId::MagicEarth => &magic_earth::INPUT,
        InputId::Bing => &bing::INPUT,
        InputId::Coordinates => &coordinates::INPUT,
    }
}

/// Finds the first input that recognizes a link (or coordinate text) inside
/// `text` and returns it with the normalized URI.
///
/// An input whose pattern matches but whose scheme check rejects the match
/// does not stop the search.
#[must_use]
pub fn find_uri(text: &str) -> Option<(&'static Input, Uri)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let found = INPUTS.iter().find_map(|input| {
        let uri = input.to_uri(input.matches(text)?)?;
        Some((*input, uri))
    });
    match &found {
        Some((input, uri)) => tracing::debug!(input = %input.id, %uri, "matched input"),
        None => tracing::debug!(len = text.len(), "no input matched"),
    }
    found
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
