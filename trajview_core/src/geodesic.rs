//! Geodesic displacement between two geolocated points.
//!
//! Both endpoints are first resolved to absolute coordinates by walking their
//! local east/north offset along the surface. The displacement is then the
//! great-circle distance `d` and initial bearing `b` from `from` to `to`,
//! projected onto a tangent plane at `from`:
//!
//! ```text
//! dx = d * sin(b)    (east)
//! dy = d * cos(b)    (north)
//! dz = Δaltitude     (up)
//! ```

use geo::{
    GeodesicBearing, GeodesicDestination, GeodesicDistance, HaversineBearing,
    HaversineDestination, HaversineDistance, Point,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

/// Earth model used for distance, bearing and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceModel {
    /// Spherical earth with mean radius (haversine + forward azimuth)
    #[default]
    Haversine,

    /// WGS84 ellipsoid (Karney's geodesic algorithms)
    Geodesic,
}

impl DistanceModel {
    /// Point reached from `origin` after `distance` meters on `bearing` degrees.
    pub fn destination(self, origin: Point<f64>, bearing: f64, distance: f64) -> Point<f64> {
        match self {
            DistanceModel::Haversine => origin.haversine_destination(bearing, distance),
            DistanceModel::Geodesic => origin.geodesic_destination(bearing, distance),
        }
    }

    /// Surface distance in meters.
    pub fn distance(self, a: Point<f64>, b: Point<f64>) -> f64 {
        match self {
            DistanceModel::Haversine => a.haversine_distance(&b),
            DistanceModel::Geodesic => a.geodesic_distance(&b),
        }
    }

    /// Initial bearing from `a` to `b`, degrees clockwise from north.
    pub fn bearing(self, a: Point<f64>, b: Point<f64>) -> f64 {
        match self {
            DistanceModel::Haversine => a.haversine_bearing(b),
            DistanceModel::Geodesic => a.geodesic_bearing(b),
        }
    }

    /// Resolves the local offset of `point` into an absolute anchor.
    ///
    /// The returned point carries a zero offset.
    pub fn resolve(self, point: &GeoPoint) -> GeoPoint {
        let anchor = Point::new(point.longitude, point.latitude);
        let surface = point.x.hypot(point.y);
        let moved = if surface > 0.0 {
            let bearing = point.x.atan2(point.y).to_degrees();
            self.destination(anchor, bearing, surface)
        } else {
            anchor
        };
        GeoPoint::new(moved.x(), moved.y(), point.altitude + point.z)
    }

    /// East/north/up displacement in meters from `from` to `to`.
    pub fn displacement(self, from: &GeoPoint, to: &GeoPoint) -> Vector3<f64> {
        let from = self.resolve(from);
        let to = self.resolve(to);
        let dz = to.altitude - from.altitude;

        let a = Point::new(from.longitude, from.latitude);
        let b = Point::new(to.longitude, to.latitude);
        let distance = self.distance(a, b);
        if distance == 0.0 {
            // bearing is undefined for coincident points
            return Vector3::new(0.0, 0.0, dz);
        }

        let bearing = self.bearing(a, b).to_radians();
        Vector3::new(distance * bearing.sin(), distance * bearing.cos(), dz)
    }
}

/// Displacement from `from` to `to` on the spherical model.
pub fn displacement(from: &GeoPoint, to: &GeoPoint) -> Vector3<f64> {
    DistanceModel::Haversine.displacement(from, to)
}
