//! Bounding-box resolution
//!
//! Turns two user supplied corners into a closed GeoJSON polygon that the
//! store can use as a "point within polygon" filter.

mod types;

pub use types::{
    BoundsError, Coordinate, LatLng, PolygonKind, Rectangle, Region, Scalar, MAX_LAT, MAX_LNG,
    MIN_LAT, MIN_LNG,
};

use crate::database::models::GeoPoint;
use geo::Intersects;

/// Builds the query region for a `topRight` / `bottomLeft` pair.
///
/// Every scalar is parsed explicitly; anything that is not a finite,
/// in-range number fails with [`BoundsError::InvalidCoordinate`] and corners
/// that are not strictly north-east / south-west fail with
/// [`BoundsError::MalformedRectangle`].
pub fn build_region(top_right: &Coordinate, bottom_left: &Coordinate) -> Result<Region, BoundsError> {
    let tr = top_right.resolve("topRight")?;
    let bl = bottom_left.resolve("bottomLeft")?;
    let rect = Rectangle::new(tr, bl)?;
    Ok(Region::from_rectangle(&rect))
}

/// Parses the two `"<lat>,<lng>"` query values and builds the region.
pub fn region_from_query(top_right: &str, bottom_left: &str) -> Result<Region, BoundsError> {
    let tr = Coordinate::from_pair_str("topRight", top_right)?;
    let bl = Coordinate::from_pair_str("bottomLeft", bottom_left)?;
    build_region(&tr, &bl)
}

/// Containment check used by stores without a native geo predicate.
/// Points on the boundary count as inside.
pub fn region_contains(region: &Region, point: &GeoPoint) -> bool {
    let [lng, lat] = point.coordinates;
    region.to_polygon().intersects(&geo::Point::new(lng, lat))
}

#[cfg(test)]
mod tests;
