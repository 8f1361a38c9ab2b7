//! The "TRAJECTORY" Engine - reference-frame motion paths
//!
//! Builds trajectories for the sensor platform and for the objects it
//! tracks. Every point of one trajectory is expressed in the local frame of a
//! single reference pose: the platform pose of the start frame.
//!
//! Pipeline for an object trajectory:
//! 1. Reference pose lookup (start frame)
//! 2. Lifetime clipping (`[first_frame, last_frame)` ∩ `[start, end)`)
//! 3. Identity resolution (object record per frame)
//! 4. Reprojection (current platform frame → reference frame)

use std::ops::Range;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::TrajectoryConfig;
use crate::error::Result;
use crate::frame_index::{require_object, FrameLookup};
use crate::rigid_pose::relative_isometry;
use crate::types::{ObjectFrame, ObjectId, ObjectRecord, PoseFrame};

// ============================================================================
// TRAJECTORY
// ============================================================================

/// An ordered run of points in one reference frame, one point per frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    /// Absolute frame number of the first point
    first_frame: usize,

    /// Points in frame order, meters
    points: Vec<Point3<f64>>,
}

impl Trajectory {
    pub fn new(first_frame: usize, points: Vec<Point3<f64>>) -> Self {
        Self {
            first_frame,
            points,
        }
    }

    /// Absolute frame number of the first point.
    pub fn first_frame(&self) -> usize {
        self.first_frame
    }

    /// Absolute frames covered, one per point.
    pub fn frames(&self) -> Range<usize> {
        self.first_frame..self.first_frame + self.points.len()
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3<f64>> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<Point3<f64>> {
        self.points
    }

    /// Sum of the straight segment lengths between consecutive points.
    pub fn path_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).norm())
            .sum()
    }
}

impl IntoIterator for Trajectory {
    type Item = Point3<f64>;
    type IntoIter = std::vec::IntoIter<Point3<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Point3<f64>;
    type IntoIter = std::slice::Iter<'a, Point3<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builds platform and object trajectories from frame storage.
///
/// Stateless apart from its configuration; one builder can serve any number
/// of concurrent calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrajectoryBuilder {
    config: TrajectoryConfig,
}

impl TrajectoryBuilder {
    pub fn new(config: TrajectoryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrajectoryConfig {
        &self.config
    }

    /// Platform self-trajectory over `[start_frame, end_frame)`.
    ///
    /// `end_frame` is clipped to the pose storage. The reference pose is
    /// `poses[start_frame]`, so the first point is always the origin.
    ///
    /// # Errors
    /// `FrameOutOfRange` when `start_frame` has no pose, `FrameMissing` for a
    /// gap in keyed storage inside the range.
    pub fn build_pose_trajectory<P>(
        &self,
        poses: &P,
        start_frame: usize,
        end_frame: usize,
    ) -> Result<Trajectory>
    where
        P: FrameLookup<PoseFrame> + ?Sized,
    {
        let reference = poses.require_frame(start_frame)?.pose;
        let limit = end_frame.min(poses.frame_limit());
        debug!(start_frame, end_frame, limit, "Building pose trajectory");

        // displacement is already measured from the reference location, so
        // only its orientation is undone
        let to_reference = reference.at_origin().isometry().inverse();
        let origin = reference.geo_point();
        let model = self.config.distance_model;

        let points = (start_frame..limit)
            .map(|frame| {
                let pose = poses.require_frame(frame)?.pose;
                let offset = model.displacement(&origin, &pose.geo_point());
                Ok(to_reference * Point3::from(offset))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Trajectory::new(start_frame, points))
    }

    /// Trajectory of `target` in the frame of the start-frame platform pose.
    ///
    /// The frame range is clipped to `end_frame`, `target.last_frame` and
    /// `target.first_frame`. Each object offset is given relative to the
    /// platform pose of its own frame and is reprojected into the reference
    /// frame in one step.
    ///
    /// # Errors
    /// `ObjectNotFound` when the object is missing from a frame inside its
    /// clipped lifetime. Frames are never skipped.
    pub fn build_object_trajectory<O, P>(
        &self,
        target: &ObjectRecord,
        object_frames: &O,
        pose_frames: &P,
        start_frame: usize,
        end_frame: usize,
    ) -> Result<Trajectory>
    where
        O: FrameLookup<ObjectFrame> + ?Sized,
        P: FrameLookup<PoseFrame> + ?Sized,
    {
        let reference = pose_frames.require_frame(start_frame)?.pose;
        let limit = end_frame.min(target.last_frame);
        let first = start_frame.max(target.first_frame);
        debug!(
            object = %target.id,
            start_frame,
            first,
            limit,
            "Building object trajectory"
        );

        let model = self.config.distance_model;
        let mut points = Vec::with_capacity(limit.saturating_sub(first));

        for frame in first..limit {
            let record = require_object(object_frames, frame, &target.id)?;
            let current = pose_frames.require_frame(frame)?.pose;

            let to_reference = relative_isometry(model, &current, &reference);
            let point = to_reference * Point3::from(record.offset());
            trace!(frame, x = point.x, y = point.y, z = point.z, "Object point");

            points.push(point);
        }

        Ok(Trajectory::new(first, points))
    }

    /// One trajectory per object present in the start frame, in start-frame order.
    pub fn build_object_trajectories<O, P>(
        &self,
        object_frames: &O,
        pose_frames: &P,
        start_frame: usize,
        end_frame: usize,
    ) -> Result<Vec<(ObjectId, Trajectory)>>
    where
        O: FrameLookup<ObjectFrame> + ?Sized,
        P: FrameLookup<PoseFrame> + ?Sized,
    {
        object_frames
            .require_frame(start_frame)?
            .iter()
            .map(|target| {
                let trajectory = self.build_object_trajectory(
                    target,
                    object_frames,
                    pose_frames,
                    start_frame,
                    end_frame,
                )?;
                Ok((target.id.clone(), trajectory))
            })
            .collect()
    }
}

/// [`TrajectoryBuilder::build_pose_trajectory`] with the default configuration.
pub fn build_pose_trajectory<P>(poses: &P, start_frame: usize, end_frame: usize) -> Result<Trajectory>
where
    P: FrameLookup<PoseFrame> + ?Sized,
{
    TrajectoryBuilder::default().build_pose_trajectory(poses, start_frame, end_frame)
}

/// [`TrajectoryBuilder::build_object_trajectory`] with the default configuration.
pub fn build_object_trajectory<O, P>(
    target: &ObjectRecord,
    object_frames: &O,
    pose_frames: &P,
    start_frame: usize,
    end_frame: usize,
) -> Result<Trajectory>
where
    O: FrameLookup<ObjectFrame> + ?Sized,
    P: FrameLookup<PoseFrame> + ?Sized,
{
    TrajectoryBuilder::default().build_object_trajectory(
        target,
        object_frames,
        pose_frames,
        start_frame,
        end_frame,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrajectoryError;
    use crate::types::Pose;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::f64::consts::FRAC_PI_2;

    /// Meters per degree along the equator on the mean-radius sphere.
    const METERS_PER_DEGREE: f64 = 111_195.08;

    fn northbound(count: usize, yaw: f64) -> Vec<PoseFrame> {
        (0..count)
            .map(|i| {
                PoseFrame::from(Pose::at(7.0, 0.0001 * i as f64, 100.0).with_orientation(0.0, 0.0, yaw))
            })
            .collect()
    }

    /// Platform moving 10m east per frame along the equator, turning 0.1 rad per frame.
    fn turning_platform(count: usize) -> Vec<PoseFrame> {
        (0..count)
            .map(|i| {
                let longitude = 10.0 * i as f64 / METERS_PER_DEGREE;
                PoseFrame::from(
                    Pose::at(longitude, 0.0, 0.0).with_orientation(0.0, 0.0, 0.1 * i as f64),
                )
            })
            .collect()
    }

    /// Per-frame offsets of a fixed world point seen from `turning_platform`.
    fn fixed_object(world: Vector3<f64>, count: usize, lifetime: Range<usize>) -> Vec<ObjectFrame> {
        (0..count)
            .map(|i| {
                if !lifetime.contains(&i) {
                    return vec![];
                }
                let platform = Vector3::new(10.0 * i as f64, 0.0, 0.0);
                let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.1 * i as f64);
                let local = rotation.inverse() * (world - platform);
                vec![ObjectRecord::new(42u64, lifetime.start, lifetime.end).at(
                    local.x, local.y, local.z,
                )]
            })
            .collect()
    }

    #[test]
    fn test_single_frame_is_origin() {
        let poses = northbound(5, 0.7);
        for start in 0..5 {
            let trajectory = build_pose_trajectory(&poses, start, start + 1).unwrap();
            assert_eq!(trajectory.points(), &[Point3::origin()]);
        }
    }

    #[test]
    fn test_single_frame_is_origin_with_local_offset() {
        let poses = vec![PoseFrame::from(
            Pose::at(2.35, 48.85, 35.0)
                .with_offset(12.0, -7.0, 1.5)
                .with_orientation(0.2, -0.1, 1.3),
        )];
        let trajectory = build_pose_trajectory(&poses, 0, 1).unwrap();
        assert_eq!(trajectory.points(), &[Point3::origin()]);
    }

    #[test]
    fn test_northbound_pose_trajectory() {
        let poses = northbound(4, 0.0);
        let trajectory = build_pose_trajectory(&poses, 0, 4).unwrap();

        assert_eq!(trajectory.len(), 4);
        for (i, p) in trajectory.iter().enumerate() {
            assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
            assert_relative_eq!(p.y, 0.0001 * METERS_PER_DEGREE * i as f64, epsilon = 1e-3);
            assert_relative_eq!(p.z, 0.0, epsilon = 1e-9);
        }
        assert_relative_eq!(trajectory.path_length(), 3.0 * 11.1195, epsilon = 1e-2);
    }

    #[test]
    fn test_reference_orientation_applied() {
        // platform facing north: forward motion lands on its local +x axis
        let poses = northbound(3, FRAC_PI_2);
        let trajectory = build_pose_trajectory(&poses, 0, 3).unwrap();

        let last = trajectory.points()[2];
        assert_relative_eq!(last.x, 2.0 * 0.0001 * METERS_PER_DEGREE, epsilon = 1e-3);
        assert_relative_eq!(last.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_end_frame_clipped_to_storage() {
        let poses = northbound(6, 0.3);
        let clipped = build_pose_trajectory(&poses, 2, 100).unwrap();
        let exact = build_pose_trajectory(&poses, 2, 6).unwrap();
        assert_eq!(clipped, exact);
        assert_eq!(clipped.frames(), 2..6);
    }

    #[test]
    fn test_start_frame_out_of_range() {
        let poses = northbound(3, 0.0);
        assert_eq!(
            build_pose_trajectory(&poses, 3, 5),
            Err(TrajectoryError::FrameOutOfRange { frame: 3, available: 3 })
        );
    }

    #[test]
    fn test_pose_storage_uniformity() {
        let sequential = northbound(5, 0.4);
        let keyed: BTreeMap<usize, PoseFrame> = sequential.iter().copied().enumerate().collect();

        assert_eq!(
            build_pose_trajectory(&sequential, 1, 5).unwrap(),
            build_pose_trajectory(&keyed, 1, 5).unwrap()
        );
    }

    #[test]
    fn test_extreme_frame_key_reports_gap() {
        let mut keyed = std::collections::HashMap::new();
        keyed.insert(0usize, PoseFrame::from(Pose::at(7.0, 0.0, 100.0)));
        keyed.insert(usize::MAX, PoseFrame::from(Pose::at(7.0, 0.001, 100.0)));

        assert_eq!(
            build_pose_trajectory(&keyed, 0, 2),
            Err(TrajectoryError::FrameMissing { frame: 1 })
        );
        assert_eq!(build_pose_trajectory(&keyed, 0, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_object_fixed_in_world_stays_put() {
        let world = Vector3::new(100.0, 20.0, 1.0);
        let poses = turning_platform(10);
        let objects = fixed_object(world, 10, 0..10);
        let target = objects[0][0].clone();

        let trajectory = build_object_trajectory(&target, &objects, &poses, 0, 10).unwrap();
        assert_eq!(trajectory.len(), 10);
        for p in &trajectory {
            assert_relative_eq!(p.coords, world, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_object_trajectory_in_later_reference_frame() {
        let world = Vector3::new(60.0, -15.0, 0.0);
        let poses = turning_platform(8);
        let objects = fixed_object(world, 8, 0..8);
        let target = objects[0][0].clone();

        // reference is the platform at frame 3: 30m east, yawed 0.3 rad
        let reference = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.3);
        let expected = reference.inverse() * (world - Vector3::new(30.0, 0.0, 0.0));

        let trajectory = build_object_trajectory(&target, &objects, &poses, 3, 8).unwrap();
        assert_eq!(trajectory.frames(), 3..8);
        for p in &trajectory {
            assert_relative_eq!(p.coords, expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_object_lifetime_clipping() {
        let poses = turning_platform(10);
        let objects = fixed_object(Vector3::new(5.0, 5.0, 0.0), 10, 2..5);
        let target = objects[2][0].clone();

        let trajectory = build_object_trajectory(&target, &objects, &poses, 0, 10).unwrap();
        assert_eq!(trajectory.frames(), 2..5);

        let tail = build_object_trajectory(&target, &objects, &poses, 3, 4).unwrap();
        assert_eq!(tail.frames(), 3..4);

        let after = build_object_trajectory(&target, &objects, &poses, 6, 10).unwrap();
        assert!(after.is_empty());
    }

    #[test]
    fn test_missing_object_fails_loudly() {
        let poses = turning_platform(5);
        let mut objects = fixed_object(Vector3::new(5.0, 0.0, 0.0), 5, 0..5);
        objects[2].clear();
        let target = objects[0][0].clone();

        assert_eq!(
            build_object_trajectory(&target, &objects, &poses, 0, 5),
            Err(TrajectoryError::object_not_found(42u64, 2))
        );
    }

    #[test]
    fn test_object_storage_uniformity() {
        let poses = turning_platform(6);
        let objects = fixed_object(Vector3::new(30.0, 10.0, 0.0), 6, 1..6);
        let keyed_objects: BTreeMap<usize, ObjectFrame> =
            objects.iter().cloned().enumerate().collect();
        let keyed_poses: BTreeMap<usize, PoseFrame> = poses.iter().copied().enumerate().collect();
        let target = objects[1][0].clone();

        assert_eq!(
            build_object_trajectory(&target, &objects, &poses, 0, 6).unwrap(),
            build_object_trajectory(&target, &keyed_objects, &keyed_poses, 0, 6).unwrap()
        );
    }

    #[test]
    fn test_batch_follows_start_frame_order() {
        let poses = turning_platform(4);
        let mut objects = fixed_object(Vector3::new(30.0, 10.0, 0.0), 4, 0..4);
        for (i, frame) in objects.iter_mut().enumerate() {
            frame.insert(0, ObjectRecord::new("sign", 0, 2).at(1.0, 2.0, 0.0));
            if i >= 2 {
                frame.remove(0);
            }
        }

        let batch = TrajectoryBuilder::default()
            .build_object_trajectories(&objects, &poses, 0, 4)
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].0, ObjectId::from("sign"));
        assert_eq!(batch[0].1.frames(), 0..2);
        assert_eq!(batch[1].0, ObjectId::from(42u64));
        assert_eq!(batch[1].1.frames(), 0..4);
    }

    #[test]
    fn test_ellipsoidal_builder_close_to_spherical() {
        let poses = northbound(20, 0.2);
        let sphere = build_pose_trajectory(&poses, 0, 20).unwrap();
        let ellipsoid = TrajectoryBuilder::new(TrajectoryConfig::ellipsoidal())
            .build_pose_trajectory(&poses, 0, 20)
            .unwrap();

        assert_eq!(sphere.len(), ellipsoid.len());
        let (a, b) = (sphere.points()[19], ellipsoid.points()[19]);
        assert!((a - b).norm() / a.coords.norm() < 0.01);
    }

    proptest! {
        #[test]
        fn prop_pose_end_clipping(start in 0usize..8, overshoot in 0usize..50) {
            let poses = northbound(8, 1.1);
            prop_assert_eq!(
                build_pose_trajectory(&poses, start, 8 + overshoot).unwrap(),
                build_pose_trajectory(&poses, start, 8).unwrap()
            );
        }

        #[test]
        fn prop_object_points_inside_lifetime(
            first in 0usize..12,
            span in 0usize..12,
            start in 0usize..12,
            end in 0usize..16,
        ) {
            let last = (first + span).min(12);
            let poses = turning_platform(12);
            let objects = fixed_object(Vector3::new(40.0, 0.0, 0.0), 12, first..last);
            let target = ObjectRecord::new(42u64, first, last);

            let trajectory = build_object_trajectory(&target, &objects, &poses, start, end).unwrap();
            for frame in trajectory.frames() {
                prop_assert!(frame >= first && frame < last);
                prop_assert!(frame >= start && frame < end);
            }
        }
    }
}
