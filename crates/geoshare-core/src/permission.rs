use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether the engine may connect to a map service on the user's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Always,
    Ask,
    Never,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Always => write!(f, "always"),
            Permission::Ask => write!(f, "ask"),
            Permission::Never => write!(f, "never"),
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Permission::Always),
            "ask" => Ok(Permission::Ask),
            "never" => Ok(Permission::Never),
            other => Err(format!(
                "unknown permission '{other}' (expected always, ask or never)"
            )),
        }
    }
}
