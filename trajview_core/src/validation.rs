//! Opt-in input validation.
//!
//! The builders never call these: malformed numbers flow through the math
//! untouched. Loaders that want to reject bad frames early run them first.

use crate::error::{Result, TrajectoryError};
use crate::frame_index::FrameLookup;
use crate::types::{ObjectRecord, Pose, PoseFrame};

fn finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TrajectoryError::invalid(format!("{} is not finite ({})", name, value)))
    }
}

/// Rejects non-finite fields and out-of-range geodetic angles.
pub fn validate_pose(pose: &Pose) -> Result<()> {
    let fields = [
        ("x", pose.x),
        ("y", pose.y),
        ("z", pose.z),
        ("longitude", pose.longitude),
        ("latitude", pose.latitude),
        ("altitude", pose.altitude),
        ("roll", pose.roll),
        ("pitch", pose.pitch),
        ("yaw", pose.yaw),
    ];
    for (name, value) in fields {
        finite(name, value)?;
    }

    if !(-90.0..=90.0).contains(&pose.latitude) {
        return Err(TrajectoryError::invalid(format!(
            "latitude {} outside [-90, 90]",
            pose.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&pose.longitude) {
        return Err(TrajectoryError::invalid(format!(
            "longitude {} outside [-180, 180]",
            pose.longitude
        )));
    }
    Ok(())
}

/// Rejects non-finite offsets and inverted lifetimes.
pub fn validate_object(object: &ObjectRecord) -> Result<()> {
    finite("x", object.x)?;
    finite("y", object.y)?;
    finite("z", object.z)?;

    if object.last_frame < object.first_frame {
        return Err(TrajectoryError::invalid(format!(
            "object {} ends (frame {}) before it starts (frame {})",
            object.id, object.last_frame, object.first_frame
        )));
    }
    Ok(())
}

/// Validates every stored pose in frame order.
///
/// Gaps in keyed storage are skipped; cost follows the number of entries,
/// not the highest frame number.
pub fn validate_pose_frames<P>(poses: &P) -> Result<()>
where
    P: FrameLookup<PoseFrame> + ?Sized,
{
    for (frame, entry) in poses.stored_frames() {
        validate_pose(&entry.pose)
            .map_err(|e| TrajectoryError::invalid(format!("frame {}: {}", frame, e)))?;
    }
    Ok(())
}
