use serde::{Deserialize, Serialize};

/// Maximum number of decimal places kept when a coordinate is rendered.
const COORD_DECIMALS: usize = 7;

/// A single geographic coordinate in the reference system of the
/// [`Position`](crate::Position) that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Point {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            zoom: None,
            name: None,
        }
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: Option<f64>) -> Self {
        self.zoom = zoom;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|n| !n.is_empty());
        self
    }

    /// `true` when both components are finite and inside the WGS-84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_valid_lat_lon(self.lat, self.lon)
    }
}

#[must_use]
pub fn is_valid_lat_lon(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

/// Renders a coordinate or zoom value with at most seven decimals and no
/// trailing zeros: `50.1234560` becomes `"50.123456"`, `3.0` becomes `"3"`.
#[must_use]
pub fn format_coord(value: f64) -> String {
    let fixed = format!("{:.*}", COORD_DECIMALS, value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_owned(),
        other => other.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_coord_trims_trailing_zeros() {
        assert_eq!(format_coord(50.123_456), "50.123456");
        assert_eq!(format_coord(-11.1), "-11.1");
        assert_eq!(format_coord(3.0), "3");
    }

    #[test]
    fn format_coord_rounds_to_seven_decimals() {
        assert_eq!(format_coord(1.123_456_789), "1.1234568");
    }

    #[test]
    fn format_coord_normalizes_negative_zero() {
        assert_eq!(format_coord(-0.000_000_01), "0");
    }

    #[test]
    fn with_name_drops_empty_names() {
        let point = Point::new(1.0, 2.0).with_name(Some(String::new()));
        assert_eq!(point.name, None);
    }

    #[test]
    fn validity_checks_ranges() {
        assert!(Point::new(90.0, -180.0).is_valid());
        assert!(!Point::new(90.1, 0.0).is_valid());
        assert!(!Point::new(0.0, 181.0).is_valid());
        assert!(!Point::new(f64::NAN, 0.0).is_valid());
    }
}
