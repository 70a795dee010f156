//! Geographic points and great-circle distance.

use crate::coords::{parse_lat_lon, CoordsError};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Sentinel for coordinates that could not be parsed; never valid
    pub const INVALID: GeoPoint = GeoPoint {
        latitude: 1000.0,
        longitude: 1000.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parse a coordinate string such as `"47.99, 7.84"` or `"N 47 59.9 E 7 50.5"`
    pub fn parse(input: &str) -> Result<Self, CoordsError> {
        let (latitude, longitude) = parse_lat_lon(input)?;
        Ok(Self::new(latitude, longitude))
    }

    /// Parse, falling back to [`GeoPoint::INVALID`] on failure
    ///
    /// The error is handed back alongside the sentinel so the caller can
    /// report it without aborting.
    pub fn parse_or_invalid(input: &str) -> (Self, Option<CoordsError>) {
        match Self::parse(input) {
            Ok(point) => (point, None),
            Err(err) => (Self::INVALID, Some(err)),
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in kilometers
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance(self, other)
    }
}

/// Haversine great-circle distance in kilometers
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon2 = b.longitude.to_radians();

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
