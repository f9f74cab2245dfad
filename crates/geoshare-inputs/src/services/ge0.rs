//! MAPS.ME / Organic Maps / CoMaps `ge0` links.
//!
//! The first path token encodes zoom and coordinates in a URL-safe base64
//! alphabet; it decodes offline.

use std::sync::LazyLock;

use geoshare_core::Position;
use regex::Regex;

use crate::input::{Input, InputId, ParseUriResult};
use crate::services::SCHEME;
use crate::uri::{decode_component, Uri};

static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:ge0://|{SCHEME}(?:www\.)?(?:ge0\.me|omaps\.app|comaps\.at)/)\S+"
    ))
    .expect("valid regex")
});

pub static INPUT: Input = Input {
    id: InputId::Ge0,
    name: "Organic Maps / MAPS.ME",
    examples: &[
        "ge0://wtdde-dJP7/London",
        "https://omaps.app/44e5woAITD/Red_Square",
        "http://ge0.me/odO_il1a3x/Sydney_Opera_House",
        "comaps.at/wtdde-dJP7",
    ],
    schemes: &["ge0", "https", "http"],
    uri_pattern: &URI_RE,
    short_uri: None,
    parse_uri,
    parse_html: None,
};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const MAX_POINT_BYTES: u32 = 10;
const MAX_COORD_BITS: u32 = 30;

fn parse_uri(uri: &Uri) -> ParseUriResult {
    // `ge0://TOKEN/NAME` carries the token as the authority.
    let (token, name) = if uri.scheme() == "ge0" {
        (uri.authority(), uri.path().trim_start_matches('/'))
    } else {
        let path = uri.path().trim_start_matches('/');
        path.split_once('/').unwrap_or((path, ""))
    };

    let Some((lat, lon, zoom)) = decode(token) else {
        return ParseUriResult::default();
    };
    let name = decode_component(name.trim_end_matches('/')).replace('_', " ");
    ParseUriResult::new(
        Position::from_coords(lat, lon)
            .with_zoom(Some(zoom))
            .with_name(Some(name)),
    )
}

fn digit(c: u8) -> Option<u32> {
    ALPHABET
        .iter()
        .position(|&a| a == c)
        .and_then(|i| u32::try_from(i).ok())
}

/// Decodes a ge0 token into `(lat, lon, zoom)`.
fn decode(token: &str) -> Option<(f64, f64, f64)> {
    let bytes = token.as_bytes();
    let (&zoom_char, coords) = bytes.split_first()?;
    if coords.is_empty() {
        return None;
    }
    let zoom = f64::from(digit(zoom_char)?) / 4.0 + 4.0;

    let mut lat: u32 = 0;
    let mut lon: u32 = 0;
    let mut shift = MAX_COORD_BITS - 3;
    let mut used = 0;
    for &c in coords.iter().take(MAX_POINT_BYTES as usize - 1) {
        let a = digit(c)?;
        let lat_bits = (((a >> 5) & 1) << 2) | (((a >> 3) & 1) << 1) | ((a >> 1) & 1);
        let lon_bits = (((a >> 4) & 1) << 2) | (((a >> 2) & 1) << 1) | (a & 1);
        lat |= lat_bits << shift;
        lon |= lon_bits << shift;
        shift = shift.saturating_sub(3);
        used += 1;
    }

    // Center of the square the truncated code describes.
    let middle = 1u32 << (3 * (MAX_POINT_BYTES - used) - 1);
    let max = f64::from((1u32 << MAX_COORD_BITS) - 1);
    let lat = f64::from(lat + middle) / max * 180.0 - 90.0;
    let lon = f64::from(lon + middle) / max * 360.0 - 180.0;
    geoshare_core::is_valid_lat_lon(lat, lon).then_some((lat, lon, zoom))
}
