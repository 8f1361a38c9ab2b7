//! TrajView Core - Reference-Frame Trajectories for Geolocated Platforms
//!
//! Turns per-frame geodetic poses and per-frame object offsets into motion
//! paths expressed in the local frame of one reference pose, so renderers
//! never handle geodetic coordinates:
//! 1. **Rigid poses**: 6-DoF transform composition and inversion
//! 2. **Geodesic displacement**: great-circle distance and bearing, no flat earth
//! 3. **Frame lookup**: one interface over array and map frame storage
//!
//! # Example
//!
//! ```
//! use trajview_core::{build_pose_trajectory, Pose, PoseFrame};
//!
//! let poses: Vec<PoseFrame> = (0..3)
//!     .map(|i| PoseFrame::from(Pose::at(0.0, 0.0001 * i as f64, 0.0)))
//!     .collect();
//!
//! let trajectory = build_pose_trajectory(&poses, 0, 3).unwrap();
//! assert_eq!(trajectory.len(), 3);
//! ```

pub mod config;
pub mod error;
pub mod frame_index;
pub mod geodesic;
pub mod relativize;
pub mod rigid_pose;
pub mod trajectory;
pub mod types;
pub mod validation;

// Re-export key types for convenience
pub use config::{DistanceModel, TrajectoryConfig};
pub use error::{Result, TrajectoryError};
pub use frame_index::{find_by_id, objects_at_frame, FrameLookup};
pub use geodesic::displacement;
pub use relativize::relativize;
pub use rigid_pose::{invert, relative_transform, transformation_matrix};
pub use trajectory::{build_object_trajectory, build_pose_trajectory, Trajectory, TrajectoryBuilder};
pub use types::{GeoPoint, ObjectFrame, ObjectId, ObjectRecord, Pose, PoseFrame};
