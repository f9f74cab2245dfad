//! The post-conversion action a user picked as their default.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "package", rename_all = "kebab-case")]
pub enum Automation {
    #[default]
    Noop,
    CopyCoordsDec,
    CopyCoordsDms,
    CopyGeoUri,
    CopyGoogleMapsUrl,
    CopyGoogleMapsNavigateUrl,
    CopyAppleMapsUrl,
    CopyMagicEarthUrl,
    /// Show the position in an installed app, identified by its package name.
    OpenApp(String),
    /// Start navigation to the position in an installed app.
    NavigateApp(String),
    Share,
    SaveGpx,
    /// Save a GPX route from the device location to the position.
    SaveGpxRoute,
}

impl Automation {
    /// Automations that hand control to another app run after a grace period
    /// so the user can still cancel them.
    #[must_use]
    pub fn is_delayed(&self) -> bool {
        matches!(self, Automation::OpenApp(_) | Automation::NavigateApp(_))
    }

    #[must_use]
    pub fn needs_location(&self) -> bool {
        matches!(self, Automation::SaveGpxRoute)
    }
}

impl std::fmt::Display for Automation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Automation::Noop => write!(f, "noop"),
            Automation::CopyCoordsDec => write!(f, "copy-coords-dec"),
            Automation::CopyCoordsDms => write!(f, "copy-coords-dms"),
            Automation::CopyGeoUri => write!(f, "copy-geo-uri"),
            Automation::CopyGoogleMapsUrl => write!(f, "copy-google-maps-url"),
            Automation::CopyGoogleMapsNavigateUrl => write!(f, "copy-google-maps-navigate-url"),
            Automation::CopyAppleMapsUrl => write!(f, "copy-apple-maps-url"),
            Automation::CopyMagicEarthUrl => write!(f, "copy-magic-earth-url"),
            Automation::OpenApp(package) => write!(f, "open-app:{package}"),
            Automation::NavigateApp(package) => write!(f, "navigate-app:{package}"),
            Automation::Share => write!(f, "share"),
            Automation::SaveGpx => write!(f, "save-gpx"),
            Automation::SaveGpxRoute => write!(f, "save-gpx-route"),
        }
    }
}

impl FromStr for Automation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((kind, package)) = s.split_once(':') {
            let package = package.trim();
            if package.is_empty() {
                return Err(format!("automation '{s}' is missing a package name"));
            }
            return match kind {
                "open-app" => Ok(Automation::OpenApp(package.to_owned())),
                "navigate-app" => Ok(Automation::NavigateApp(package.to_owned())),
                other => Err(format!("unknown automation '{other}'")),
            };
        }
        match s {
            "noop" => Ok(Automation::Noop),
            "copy-coords-dec" => Ok(Automation::CopyCoordsDec),
            "copy-coords-dms" => Ok(Automation::CopyCoordsDms),
            "copy-geo-uri" => Ok(Automation::CopyGeoUri),
            "copy-google-maps-url" => Ok(Automation::CopyGoogleMapsUrl),
            "copy-google-maps-navigate-url" => Ok(Automation::CopyGoogleMapsNavigateUrl),
            "copy-apple-maps-url" => Ok(Automation::CopyAppleMapsUrl),
            "copy-magic-earth-url" => Ok(Automation::CopyMagicEarthUrl),
            "share" => Ok(Automation::Share),
            "save-gpx" => Ok(Automation::SaveGpx),
            "save-gpx-route" => Ok(Automation::SaveGpxRoute),
            other => Err(format!("unknown automation '{other}'")),
        }
    }
}
