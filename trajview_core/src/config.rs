//! Configuration for trajectory construction.

use serde::{Deserialize, Serialize};

pub use crate::geodesic::DistanceModel;

/// Configuration for the TrajectoryBuilder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// Earth model for geodesic displacement (default: spherical haversine)
    pub distance_model: DistanceModel,
}

impl TrajectoryConfig {
    /// Configuration using the WGS84 ellipsoid.
    pub fn ellipsoidal() -> Self {
        Self {
            distance_model: DistanceModel::Geodesic,
        }
    }
}
