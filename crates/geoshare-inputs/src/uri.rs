//! Lenient URI splitting and per-component percent-decoding.
//!
//! Map links pasted by users are frequently not valid RFC 3986 URIs (raw
//! spaces, unescaped brackets, stray `%` signs), so this module never
//! rejects a component. A component that fails to decode is kept verbatim.

use std::borrow::Cow;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

/// RFC 3986 appendix B.
static URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?:([A-Za-z][A-Za-z0-9+.\-]*):)?(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$")
        .expect("valid regex")
});

/// A URI split into its components.
///
/// `scheme` and `host` are lower-cased; `authority`, `path` and `fragment`
/// are kept raw. Query parameters are decoded once, at parse time, and keep
/// their original order so that the first occurrence of a key wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Uri {
    raw: String,
    scheme: String,
    authority: String,
    host: String,
    path: String,
    raw_query: String,
    query: Vec<(String, String)>,
    fragment: String,
}

impl Uri {
    /// Splits `raw` into components. Returns `None` only for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let caps = URI_RE.captures(raw)?;
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        let authority = group(2).to_owned();
        let raw_query = group(4).to_owned();
        Some(Self {
            raw: raw.to_owned(),
            scheme: group(1).to_ascii_lowercase(),
            host: host_from_authority(&authority),
            authority,
            path: group(3).to_owned(),
            query: parse_query(&raw_query),
            raw_query,
            fragment: group(5).to_owned(),
        })
    }

    /// Wraps free text that is not a URI at all (e.g. a coordinate pair).
    /// The whole text becomes the path.
    #[must_use]
    pub fn opaque(text: &str) -> Self {
        Self {
            raw: text.to_owned(),
            scheme: String::new(),
            authority: String::new(),
            host: String::new(),
            path: text.to_owned(),
            raw_query: String::new(),
            query: Vec::new(),
            fragment: String::new(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Decoded value of the first `key` parameter.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first key in `keys` that is present, in `keys` order.
    #[must_use]
    pub fn first_query_param(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.query_param(key))
    }

    #[must_use]
    pub fn has_query_param(&self, key: &str) -> bool {
        self.query_param(key).is_some()
    }

    #[must_use]
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    /// Parameters of a `key=value&...` style fragment such as OSM's
    /// `#map=15/50.08/14.42`.
    #[must_use]
    pub fn fragment_param(&self, key: &str) -> Option<String> {
        parse_query(&self.fragment)
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Non-empty path segments, percent-decoded.
    #[must_use]
    pub fn path_segments(&self) -> Vec<String> {
        self.path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| decode_component(s).into_owned())
            .collect()
    }
}

impl std::fmt::Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn host_from_authority(authority: &str) -> String {
    let without_userinfo = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let without_port = match without_userinfo.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => without_userinfo,
    };
    without_port.to_ascii_lowercase()
}

/// Percent-decodes a path or fragment component. Invalid UTF-8 after
/// decoding leaves the component untouched.
#[must_use]
pub fn decode_component(raw: &str) -> Cow<'_, str> {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(raw),
    }
}

/// Percent-decodes a query component, treating `+` as a space first.
#[must_use]
pub fn decode_query_component(raw: &str) -> String {
    if raw.contains('+') {
        decode_component(&raw.replace('+', " ")).into_owned()
    } else {
        decode_component(raw).into_owned()
    }
}

/// Splits a query string into decoded `(key, value)` pairs, keeping order
/// and duplicates. A parameter without `=` gets an empty value.
#[must_use]
pub fn parse_query(raw_query: &str) -> Vec<(String, String)> {
    raw_query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_query_component(key), decode_query_component(value))
        })
        .collect()
}

#[cfg(test)]
#[path = "uri_test.rs"]
mod tests;
