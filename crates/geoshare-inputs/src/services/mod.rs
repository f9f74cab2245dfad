//! One module per map service. Each exposes a static [`Input`](crate::Input).

pub mod amap;
pub mod apple_maps;
pub mod baidu;
pub mod bing;
pub mod coordinates;
pub mod ge0;
pub mod geo;
pub mod google_maps;
pub mod here_wego;
pub mod magic_earth;
pub mod mapy;
pub mod open_street_map;
pub mod osmand;
pub mod tencent;
pub mod two_gis;
pub mod waze;
pub mod yandex;

use regex::Regex;

/// Optional explicit scheme in front of a web link.
pub(crate) const SCHEME: &str = r"(?:[a-z][a-z0-9+.\-]*://)?";

pub(crate) const WEB_SCHEMES: &[&str] = &["https", "http"];

/// Case-insensitive search pattern for a web link on `hosts` (a regex
/// alternation), with anything up to the next whitespace.
pub(crate) fn web_pattern(hosts: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{SCHEME}(?:{hosts})\S*")).expect("valid regex")
}

/// Anchored pattern for a short link: `prefix` followed by one opaque token
/// segment and an optional query or fragment.
pub(crate) fn short_pattern(prefix: &str) -> Regex {
    Regex::new(&format!(r"(?i)^https?://(?:{prefix})/[^/?#\s]+/?(?:[?#]\S*)?$"))
        .expect("valid regex")
}

/// Decodes the few HTML entities that appear inside scraped attribute values.
pub(crate) fn unescape_html(value: &str) -> String {
    value
        .replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("\\u0026", "&")
        .replace("\\/", "/")
}
