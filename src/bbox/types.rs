//! Coordinate, rectangle and region types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;

/// Errors raised while turning raw corners into a query region.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundsError {
    /// A lat/lng token is not a finite number, or is out of range.
    #[error("invalid coordinate for {field}: {value:?}")]
    InvalidCoordinate { field: String, value: String },

    /// The corners do not describe a north-east / south-west rectangle.
    #[error("malformed rectangle: {0}")]
    MalformedRectangle(String),
}

impl BoundsError {
    pub(crate) fn invalid(field: impl Into<String>, value: impl fmt::Display) -> Self {
        BoundsError::InvalidCoordinate {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

/// A single loosely typed scalar, as it arrives from query strings or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Parse into a finite degree value. `field` names the scalar in errors.
    pub fn to_degrees(&self, field: &str) -> Result<f64, BoundsError> {
        let value = match self {
            Scalar::Number(n) => *n,
            Scalar::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(BoundsError::invalid(field, s));
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| BoundsError::invalid(field, s))?
            }
        };

        if !value.is_finite() {
            return Err(BoundsError::invalid(field, self));
        }
        Ok(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// Unparsed corner: `lat` and `lng` may be numbers or numeric text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: Scalar,
    pub lng: Scalar,
}

impl Coordinate {
    pub fn new(lat: impl Into<Scalar>, lng: impl Into<Scalar>) -> Self {
        Self {
            lat: lat.into(),
            lng: lng.into(),
        }
    }

    /// Split a `"<lat>,<lng>"` query value into a coordinate.
    ///
    /// Exactly two comma separated tokens are required; the tokens themselves
    /// are only checked later, by [`Coordinate::resolve`].
    pub fn from_pair_str(field: &str, raw: &str) -> Result<Self, BoundsError> {
        let mut parts = raw.split(',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(lat), Some(lng), None) => Ok(Self::new(lat, lng)),
            _ => Err(BoundsError::invalid(field, raw)),
        }
    }

    /// Parse both scalars and range-check them. `field` prefixes error names,
    /// e.g. `topRight` yields `topRight.lat`.
    pub fn resolve(&self, field: &str) -> Result<LatLng, BoundsError> {
        let lat_field = format!("{}.lat", field);
        let lng_field = format!("{}.lng", field);

        let lat = self.lat.to_degrees(&lat_field)?;
        let lng = self.lng.to_degrees(&lng_field)?;

        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(BoundsError::invalid(lat_field, lat));
        }
        if !(MIN_LNG..=MAX_LNG).contains(&lng) {
            return Err(BoundsError::invalid(lng_field, lng));
        }

        Ok(LatLng { lat, lng })
    }
}

/// A parsed, range-checked coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// `[lng, lat]`, the GeoJSON position order.
    pub fn position(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// Axis-aligned box given by its north-east and south-west corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    top_right: LatLng,
    bottom_left: LatLng,
}

impl Rectangle {
    /// Zero-area boxes and boxes crossing the antimeridian are rejected.
    pub fn new(top_right: LatLng, bottom_left: LatLng) -> Result<Self, BoundsError> {
        if top_right.lat <= bottom_left.lat {
            return Err(BoundsError::MalformedRectangle(format!(
                "topRight latitude {} must be north of bottomLeft latitude {}",
                top_right.lat, bottom_left.lat
            )));
        }
        if top_right.lng <= bottom_left.lng {
            return Err(BoundsError::MalformedRectangle(format!(
                "topRight longitude {} must be east of bottomLeft longitude {}",
                top_right.lng, bottom_left.lng
            )));
        }
        Ok(Self {
            top_right,
            bottom_left,
        })
    }

    /// Closed ring: bottom-left, top-left, top-right, bottom-right, bottom-left.
    pub fn ring(&self) -> [[f64; 2]; 5] {
        let tr = self.top_right;
        let bl = self.bottom_left;
        [
            [bl.lng, bl.lat],
            [bl.lng, tr.lat],
            [tr.lng, tr.lat],
            [tr.lng, bl.lat],
            [bl.lng, bl.lat],
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonKind {
    Polygon,
}

/// GeoJSON polygon with a single outer ring, used as a containment filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    #[serde(rename = "type")]
    kind: PolygonKind,
    coordinates: Vec<Vec<[f64; 2]>>,
}

impl Region {
    pub fn from_rectangle(rect: &Rectangle) -> Self {
        Self {
            kind: PolygonKind::Polygon,
            coordinates: vec![rect.ring().to_vec()],
        }
    }

    /// The outer ring as `[lng, lat]` positions.
    pub fn ring(&self) -> &[[f64; 2]] {
        self.coordinates.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn to_polygon(&self) -> geo::Polygon<f64> {
        let exterior: Vec<geo::Coord<f64>> = self
            .ring()
            .iter()
            .map(|[x, y]| geo::Coord { x: *x, y: *y })
            .collect();
        geo::Polygon::new(geo::LineString::new(exterior), vec![])
    }
}
