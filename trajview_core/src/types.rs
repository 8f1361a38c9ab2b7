//! Core data types: poses, geodetic points and tracked object records.
//!
//! Field names on the wire follow the camelCase shape produced by the data
//! loading layer. Missing numeric fields deserialize as 0.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ============================================================================
// GEODETIC POINT
// ============================================================================

/// A geodetic anchor plus a local Cartesian offset in meters.
///
/// The offset is east/north/up relative to the anchor, so `(x, y, z)` moves the
/// point along the surface before any distance or bearing is measured.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoPoint {
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Altitude in meters
    pub altitude: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GeoPoint {
    /// Creates a point at the given anchor with no local offset.
    pub fn new(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude,
            ..Default::default()
        }
    }

    /// Returns a copy moved by a local offset in meters.
    pub fn with_offset(mut self, x: f64, y: f64, z: f64) -> Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    /// Local offset as a vector.
    pub fn offset(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

// ============================================================================
// POSE
// ============================================================================

/// A 6-DoF pose anchored to a geodetic location.
///
/// Position `(x, y, z)` is only meaningful relative to the pose's own anchor.
/// Orientation angles are radians, applied as yaw about Z, then pitch about Y,
/// then roll about X.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Altitude in meters
    pub altitude: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Pose {
    /// The zero pose: no anchor, no offset, no rotation.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Creates a pose at a geodetic anchor with zero offset and orientation.
    pub fn at(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude,
            ..Default::default()
        }
    }

    /// Returns a copy with the given local offset.
    pub fn with_offset(mut self, x: f64, y: f64, z: f64) -> Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    /// Returns a copy with the given orientation (radians).
    pub fn with_orientation(mut self, roll: f64, pitch: f64, yaw: f64) -> Self {
        self.roll = roll;
        self.pitch = pitch;
        self.yaw = yaw;
        self
    }

    /// Same orientation, local offset cleared.
    pub fn at_origin(&self) -> Self {
        self.with_offset(0.0, 0.0, 0.0)
    }

    /// Local offset as a vector.
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Geodetic location of this pose (anchor plus local offset).
    pub fn geo_point(&self) -> GeoPoint {
        GeoPoint {
            longitude: self.longitude,
            latitude: self.latitude,
            altitude: self.altitude,
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

/// One entry of pose-frame storage: `{ "pose": { ... } }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseFrame {
    pub pose: Pose,
}

impl From<Pose> for PoseFrame {
    fn from(pose: Pose) -> Self {
        Self { pose }
    }
}

// ============================================================================
// TRACKED OBJECTS
// ============================================================================

/// Opaque identifier of a tracked object, stable across frames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectId {
    Number(u64),
    Text(String),
}

impl From<u64> for ObjectId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectId::Number(n) => write!(f, "{}", n),
            ObjectId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A tracked object as observed in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    pub id: ObjectId,

    /// Offset in meters relative to the platform pose of the frame
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,

    /// First frame the object exists in (inclusive)
    pub first_frame: usize,

    /// Frame right after the object disappears (exclusive)
    pub last_frame: usize,
}

impl ObjectRecord {
    /// Creates a record with a zero offset.
    pub fn new(id: impl Into<ObjectId>, first_frame: usize, last_frame: usize) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            first_frame,
            last_frame,
        }
    }

    /// Returns a copy with the given offset.
    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    /// Offset relative to the platform as a vector.
    pub fn offset(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Whether `frame` lies in `[first_frame, last_frame)`.
    pub fn is_alive_at(&self, frame: usize) -> bool {
        frame >= self.first_frame && frame < self.last_frame
    }
}

/// The ordered object records of one frame.
pub type ObjectFrame = Vec<ObjectRecord>;
