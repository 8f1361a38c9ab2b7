//! Ground truth oracle for simulation.
//!
//! The Oracle maintains the "God's eye view" of a drive:
//! - True platform positions and orientations in an East-North-Up frame
//!   anchored at the drive origin
//! - True object positions (constant-velocity kinematics) and lifetimes
//! - Observed frame data: geodetic poses and noisy platform-relative offsets

use geo::Point;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use trajview_core::{DistanceModel, GeoPoint, ObjectFrame, ObjectRecord, Pose, PoseFrame};

use crate::error::SimError;
use crate::scenarios::{MotionProfile, PoseEncoding};

/// True platform state at one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformState {
    /// Position [east, north, up] in meters from the origin
    pub position: Vector3<f64>,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl PlatformState {
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(self.roll, self.pitch, self.yaw)
    }
}

/// A ground truth object in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthObject {
    /// Unique object ID
    pub id: u64,

    /// Position at frame 0 [east, north, up] in meters from the origin
    pub position: Vector3<f64>,

    /// Velocity in m/s
    pub velocity: Vector3<f64>,

    /// First frame the object is observed (inclusive)
    pub first_frame: usize,

    /// Frame after the last observation (exclusive)
    pub last_frame: usize,
}

impl GroundTruthObject {
    /// True position at `frame`.
    pub fn position_at(&self, frame: usize, dt: f64) -> Vector3<f64> {
        self.position + self.velocity * (frame as f64 * dt)
    }

    pub fn is_alive_at(&self, frame: usize) -> bool {
        frame >= self.first_frame && frame < self.last_frame
    }

    /// Descriptor handed to the trajectory builder.
    pub fn record(&self) -> ObjectRecord {
        ObjectRecord::new(self.id, self.first_frame, self.last_frame)
    }
}

/// The Oracle - maintains ground truth and generates observed frames.
pub struct Oracle {
    /// RNG for spawning and noise
    physics_rng: ChaCha8Rng,

    /// Geodetic origin of the ENU frame
    origin: GeoPoint,

    /// Seconds between frames
    dt: f64,

    /// Platform state per frame
    platform: Vec<PlatformState>,

    /// All ground truth objects
    objects: Vec<GroundTruthObject>,

    /// Next object ID
    next_id: u64,

    /// Offset noise standard deviation (meters)
    position_noise_std: f64,
}

impl Oracle {
    /// Creates a new Oracle with the given physics seed.
    pub fn new(physics_seed: u64, origin: GeoPoint, dt: f64) -> Self {
        Self {
            physics_rng: ChaCha8Rng::seed_from_u64(physics_seed),
            origin,
            dt,
            platform: Vec::new(),
            objects: Vec::new(),
            next_id: 0,
            position_noise_std: 0.0,
        }
    }

    /// Sets the offset noise standard deviation.
    pub fn set_position_noise(&mut self, std_dev: f64) {
        self.position_noise_std = std_dev;
    }

    /// The physics RNG, for scenario setup.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.physics_rng
    }

    /// Integrates the platform for `frames` frames starting at the origin.
    ///
    /// The platform moves along its own local x axis, so pitch and heading
    /// both shape the path.
    pub fn drive(&mut self, motion: &MotionProfile, initial_yaw: f64, frames: usize) {
        self.platform.clear();

        let mut state = PlatformState {
            position: Vector3::zeros(),
            roll: motion.roll,
            pitch: motion.pitch,
            yaw: initial_yaw,
        };

        for _ in 0..frames {
            self.platform.push(state);
            let forward = state.rotation() * Vector3::x();
            state.position += forward * (motion.speed * self.dt);
            state.yaw += motion.yaw_rate * self.dt;
        }
    }

    /// Spawns a new object and returns its ID.
    pub fn spawn_object(
        &mut self,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        first_frame: usize,
        last_frame: usize,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.objects.push(GroundTruthObject {
            id,
            position,
            velocity,
            first_frame,
            last_frame,
        });

        id
    }

    pub fn platform(&self) -> &[PlatformState] {
        &self.platform
    }

    pub fn objects(&self) -> &[GroundTruthObject] {
        &self.objects
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Geodetic pose frames for the recorded drive.
    pub fn pose_frames(&self, encoding: PoseEncoding, model: DistanceModel) -> Vec<PoseFrame> {
        let origin = Point::new(self.origin.longitude, self.origin.latitude);

        self.platform
            .iter()
            .map(|state| {
                let [east, north, up] = [state.position.x, state.position.y, state.position.z];
                let pose = match encoding {
                    PoseEncoding::Anchor => {
                        let surface = east.hypot(north);
                        let anchor = if surface > 0.0 {
                            model.destination(origin, east.atan2(north).to_degrees(), surface)
                        } else {
                            origin
                        };
                        Pose::at(anchor.x(), anchor.y(), self.origin.altitude + up)
                    }
                    PoseEncoding::LocalOffset => {
                        Pose::at(self.origin.longitude, self.origin.latitude, self.origin.altitude)
                            .with_offset(east, north, up)
                    }
                };
                PoseFrame::from(pose.with_orientation(state.roll, state.pitch, state.yaw))
            })
            .collect()
    }

    /// Observed object frames: offsets relative to the platform of each frame.
    ///
    /// Gaussian noise is drawn per axis from the physics RNG.
    pub fn object_frames(&mut self) -> Result<Vec<ObjectFrame>, SimError> {
        let normal = Normal::new(0.0, self.position_noise_std)
            .map_err(|e| SimError::config(format!("invalid noise: {}", e)))?;

        let mut frames = Vec::with_capacity(self.platform.len());
        for (frame, state) in self.platform.iter().enumerate() {
            let inverse = state.rotation().inverse();
            let mut observed = Vec::new();

            for object in self.objects.iter().filter(|o| o.is_alive_at(frame)) {
                let world = object.position_at(frame, self.dt);
                let noise = Vector3::new(
                    normal.sample(&mut self.physics_rng),
                    normal.sample(&mut self.physics_rng),
                    normal.sample(&mut self.physics_rng),
                );
                let local = inverse * (world - state.position) + noise;
                observed.push(object.record().at(local.x, local.y, local.z));
            }
            frames.push(observed);
        }

        Ok(frames)
    }

    /// True platform positions in the frame of the platform at `start_frame`.
    pub fn platform_truth(&self, start_frame: usize) -> Vec<Point3<f64>> {
        let reference = &self.platform[start_frame];
        let inverse = reference.rotation().inverse();

        self.platform[start_frame..]
            .iter()
            .map(|state| Point3::from(inverse * (state.position - reference.position)))
            .collect()
    }

    /// True position of `object` at `frame` in the frame of the platform at `start_frame`.
    pub fn object_truth(&self, object: &GroundTruthObject, start_frame: usize, frame: usize) -> Point3<f64> {
        let reference = &self.platform[start_frame];
        let world = object.position_at(frame, self.dt);
        Point3::from(reference.rotation().inverse() * (world - reference.position))
    }
}
