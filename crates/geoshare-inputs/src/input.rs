use std::fmt;
use std::sync::LazyLock;

use geoshare_core::Position;
use regex::Regex;

use crate::uri::Uri;

/// Stable identifier of every registered input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputId {
    Geo,
    Ge0,
    GoogleMaps,
    AppleMaps,
    Waze,
    Baidu,
    Amap,
    Tencent,
    Yandex,
    OpenStreetMap,
    OsmAnd,
    HereWeGo,
    Mapy,
    TwoGis,
    MagicEarth,
    Bing,
    Coordinates,
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Geo => "geo",
            Self::Ge0 => "ge0",
            Self::GoogleMaps => "google-maps",
            Self::AppleMaps => "apple-maps",
            Self::Waze => "waze",
            Self::Baidu => "baidu",
            Self::Amap => "amap",
            Self::Tencent => "tencent",
            Self::Yandex => "yandex",
            Self::OpenStreetMap => "openstreetmap",
            Self::OsmAnd => "osmand",
            Self::HereWeGo => "here-wego",
            Self::Mapy => "mapy",
            Self::TwoGis => "2gis",
            Self::MagicEarth => "magic-earth",
            Self::Bing => "bing",
            Self::Coordinates => "coordinates",
        };
        f.write_str(s)
    }
}

/// How a short link is dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortUriMethod {
    /// Read the `Location` header of a non-followed `HEAD` response.
    Head,
    /// Follow redirects with `GET` and take the final URL.
    Get,
}

/// A service's short-link sub-grammar. The pattern is matched against the
/// full normalized URI, so it is anchored and stricter than the input's
/// URI pattern.
#[derive(Debug, Clone, Copy)]
pub struct ShortUri {
    pub pattern: &'static LazyLock<Regex>,
    pub method: ShortUriMethod,
}

/// Outcome of parsing a link without touching the network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseUriResult {
    pub position: Position,
    /// Page to fetch and scrape when the link alone is not enough.
    pub html_url: Option<String>,
}

impl ParseUriResult {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            position,
            html_url: None,
        }
    }

    /// Attaches `url` as the HTML fallback unless the position already
    /// carries coordinates.
    #[must_use]
    pub fn with_html_fallback(mut self, url: impl Into<String>) -> Self {
        if !self.position.is_resolved() {
            self.html_url = Some(url.into());
        }
        self
    }
}

/// Outcome of scraping a fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseHtmlResult {
    pub position: Position,
    /// A further link found on the page, possibly relative to the page URL.
    pub redirect_url: Option<String>,
}

impl ParseHtmlResult {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            position,
            redirect_url: None,
        }
    }

    #[must_use]
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            position: Position::new(),
            redirect_url: Some(url.into()),
        }
    }
}

/// One map service's grammar and parsers.
///
/// Inputs are plain data so the registry can be a static, ordered list.
/// `schemes` lists the URI schemes the service accepts; an empty list marks
/// a free-text input that is matched against the whole trimmed text.
#[derive(Debug)]
pub struct Input {
    pub id: InputId,
    pub name: &'static str,
    pub examples: &'static [&'static str],
    pub schemes: &'static [&'static str],
    pub uri_pattern: &'static LazyLock<Regex>,
    pub short_uri: Option<ShortUri>,
    pub parse_uri: fn(&Uri) -> ParseUriResult,
    pub parse_html: Option<fn(&str) -> ParseHtmlResult>,
}

impl Input {
    /// The substring of `text` this input recognizes, if any.
    ///
    /// Links lose trailing sentence punctuation and unbalanced closing
    /// brackets, so `(see https://...).` yields the bare link.
    #[must_use]
    pub fn matches<'t>(&self, text: &'t str) -> Option<&'t str> {
        let found = self.uri_pattern.find(text)?.as_str();
        if self.schemes.is_empty() {
            return Some(found);
        }
        Some(trim_link_end(found)).filter(|link| !link.is_empty())
    }

    /// Normalizes a matched substring into a [`Uri`].
    ///
    /// A scheme-less link gets `https://` when the input accepts it; a link
    /// whose scheme the input doesn't accept yields `None`.
    #[must_use]
    pub fn to_uri(&self, found: &str) -> Option<Uri> {
        if self.schemes.is_empty() {
            return Some(Uri::opaque(found.trim()));
        }
        let uri = if self.has_explicit_scheme(found) {
            Uri::parse(found)?
        } else if self.schemes.contains(&"https") {
            Uri::parse(&format!("https://{found}"))?
        } else {
            return None;
        };
        self.schemes.contains(&uri.scheme()).then_some(uri)
    }

    fn has_explicit_scheme(&self, found: &str) -> bool {
        let head = found.split(['?', '#']).next().unwrap_or(found);
        if let Some(i) = head.find("://") {
            return !head[..i].contains('/');
        }
        self.schemes.iter().any(|scheme| {
            found.len() > scheme.len()
                && found.as_bytes()[scheme.len()] == b':'
                && found[..scheme.len()].eq_ignore_ascii_case(scheme)
        })
    }

    #[must_use]
    pub fn has_short_uri(&self) -> bool {
        self.short_uri.is_some()
    }

    #[must_use]
    pub fn is_short_uri(&self, uri: &Uri) -> bool {
        self.short_uri
            .is_some_and(|short| short.pattern.is_match(uri.as_str()))
    }

    /// Method used to dereference this input's short links.
    #[must_use]
    pub fn short_uri_method(&self) -> Option<ShortUriMethod> {
        self.short_uri.map(|short| short.method)
    }

    #[must_use]
    pub fn parse_uri(&self, uri: &Uri) -> ParseUriResult {
        (self.parse_uri)(uri)
    }

    #[must_use]
    pub fn has_html(&self) -> bool {
        self.parse_html.is_some()
    }

    /// Scrapes `bytes` with this input's HTML parser. Inputs without one
    /// return an empty result.
    #[must_use]
    pub fn parse_html(&self, bytes: &[u8]) -> ParseHtmlResult {
        match self.parse_html {
            Some(parse) => parse(&String::from_utf8_lossy(bytes)),
            None => ParseHtmlResult::default(),
        }
    }
}

fn trim_link_end(link: &str) -> &str {
    let mut end = link;
    while let Some(last) = end.chars().next_back() {
        let unbalanced = |open: char| end.matches(open).count() < end.matches(last).count();
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '"' | '\'' | '>' => true,
            ')' => unbalanced('('),
            ']' => unbalanced('['),
            '}' => unbalanced('{'),
            _ => false,
        };
        if !strip {
            break;
        }
        end = &end[..end.len() - last.len_utf8()];
    }
    end
}
