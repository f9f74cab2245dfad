//! The result of parsing one map link.

use serde::{Deserialize, Serialize};

use crate::point::Point;
use crate::srs::{gcj02_to_wgs84, Srs};

/// A parsed location: a coordinate pair, a list of points, a free-text
/// query, or any combination of these.
///
/// A position is *resolved* when it has a coordinate pair or at least one
/// point; *query-only* when it carries only `q` or `name`; otherwise empty.
/// Multi-point results (routes, place lists) live in `points` and leave the
/// single-point fields alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub srs: Srs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
}

impl Position {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_coords(lat: f64, lon: f64) -> Self {
        Self::new().with_coords(lat, lon)
    }

    #[must_use]
    pub fn from_query(q: impl Into<String>) -> Self {
        Self::new().with_q(Some(q.into()))
    }

    #[must_use]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_srs(mut self, srs: Srs) -> Self {
        self.srs = srs;
        self
    }

    #[must_use]
    pub fn with_coords(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    /// Sets the zoom unless `zoom` is `None`, so later sources can't erase
    /// an earlier one.
    #[must_use]
    pub fn with_zoom(mut self, zoom: Option<f64>) -> Self {
        if zoom.is_some() {
            self.zoom = zoom;
        }
        self
    }

    /// Sets the query unless `q` is `None` or blank.
    #[must_use]
    pub fn with_q(mut self, q: Option<String>) -> Self {
        if let Some(q) = q.filter(|q| !q.trim().is_empty()) {
            self.q = Some(q);
        }
        self
    }

    /// Sets the name unless `name` is `None` or blank.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            self.name = Some(name);
        }
        self
    }

    #[must_use]
    pub fn has_coords(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.has_coords() || !self.points.is_empty()
    }

    #[must_use]
    pub fn is_query_only(&self) -> bool {
        !self.is_resolved() && (self.q.is_some() || self.name.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.is_resolved() && self.q.is_none() && self.name.is_none()
    }

    /// The point an action should target: the single coordinate pair if
    /// present, otherwise the last point (a route's destination).
    #[must_use]
    pub fn main_point(&self) -> Option<Point> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(
                Point::new(lat, lon)
                    .with_zoom(self.zoom)
                    .with_name(self.name.clone()),
            ),
            _ => self.points.last().cloned(),
        }
    }

    /// Every coordinate carried by the position, single pair first.
    #[must_use]
    pub fn all_points(&self) -> Vec<Point> {
        if self.points.is_empty() {
            self.main_point().into_iter().collect()
        } else {
            self.points.clone()
        }
    }

    /// A copy with every coordinate shifted to WGS-84.
    #[must_use]
    pub fn to_wgs84(&self) -> Position {
        if self.srs == Srs::Wgs84 {
            return self.clone();
        }
        let mut converted = self.clone();
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            let (lat, lon) = gcj02_to_wgs84(lat, lon);
            converted.lat = Some(lat);
            converted.lon = Some(lon);
        }
        for point in &mut converted.points {
            let (lat, lon) = gcj02_to_wgs84(point.lat, point.lon);
            point.lat = lat;
            point.lon = lon;
        }
        converted.srs = Srs::Wgs84;
        converted
    }
}
