//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::coord::LatLng;

/// The geographic rectangle covered by a raster, in degrees.
///
/// The box is derived from a [`Georeference`](crate::Georeference) and the
/// raster dimensions, so `min_lng <= max_lng` and `min_lat <= max_lat` always
/// hold for boxes produced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

/// How coordinates lying exactly on the southern or eastern edge are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// All four edges are inclusive; a point on the southern or eastern edge
    /// samples the last row or column.
    #[default]
    Clamp,
    /// The southern and eastern edges belong to the neighbouring raster and
    /// are reported as out of bounds.
    Exclusive,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Check if a point lies within this bbox, edges included.
    ///
    /// Any NaN component makes the check fail.
    pub fn contains(&self, coord: LatLng) -> bool {
        coord.lat >= self.min_lat
            && coord.lat <= self.max_lat
            && coord.lng >= self.min_lng
            && coord.lng <= self.max_lng
    }

    /// Check if a point lies within this bbox, treating the southern and
    /// eastern edges as outside.
    pub fn contains_half_open(&self, coord: LatLng) -> bool {
        coord.lat > self.min_lat
            && coord.lat <= self.max_lat
            && coord.lng >= self.min_lng
            && coord.lng < self.max_lng
    }

    /// Bounds check according to an [`EdgePolicy`].
    pub fn admits(&self, coord: LatLng, policy: EdgePolicy) -> bool {
        match policy {
            EdgePolicy::Clamp => self.contains(coord),
            EdgePolicy::Exclusive => self.contains_half_open(coord),
        }
    }

    /// Get the center point of the bounding box.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lng [{}, {}] lat [{}, {}]",
            self.min_lng, self.max_lng, self.min_lat, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_edges_inclusive() {
        let bbox = BoundingBox::new(10.0, 48.0, 12.0, 50.0);

        assert!(bbox.contains(LatLng::new(50.0, 10.0)));
        assert!(bbox.contains(LatLng::new(48.0, 12.0)));
        assert!(bbox.contains(LatLng::new(49.0, 11.0)));
        assert!(!bbox.contains(LatLng::new(50.0001, 11.0)));
        assert!(!bbox.contains(LatLng::new(49.0, 9.9999)));
    }

    #[test]
    fn test_half_open_drops_south_and_east_edges() {
        let bbox = BoundingBox::new(10.0, 48.0, 12.0, 50.0);

        assert!(bbox.contains_half_open(LatLng::new(50.0, 10.0)));
        assert!(!bbox.contains_half_open(LatLng::new(48.0, 11.0)));
        assert!(!bbox.contains_half_open(LatLng::new(49.0, 12.0)));
    }

    #[test]
    fn test_nan_is_never_contained() {
        let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
        assert!(!bbox.contains(LatLng::new(f64::NAN, 0.0)));
        assert!(!bbox.admits(LatLng::new(0.0, f64::NAN), EdgePolicy::Exclusive));
    }

    #[test]
    fn test_center() {
        let bbox = BoundingBox::new(10.0, 48.0, 12.0, 50.0);
        assert_eq!(bbox.center(), LatLng::new(49.0, 11.0));
        assert_eq!(bbox.width(), 2.0);
        assert_eq!(bbox.height(), 2.0);
    }
}
