//! Map-link grammars.
//!
//! Every supported map service is an [`Input`]: a URI pattern that finds the
//! link inside arbitrary text, an optional short-link sub-pattern, a pure
//! `parse_uri` and, for services whose links don't always carry
//! coordinates, a regex-based `parse_html` scraper. [`registry`] holds them
//! in match order. Nothing in this crate touches the network.

pub(crate) mod coords;
pub mod input;
pub mod registry;
pub mod services;
pub mod uri;

pub use input::{Input, InputId, ParseHtmlResult, ParseUriResult, ShortUri, ShortUriMethod};
pub use registry::{find_uri, input, INPUTS};
pub use uri::Uri;
