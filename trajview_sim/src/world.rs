//! SimWorld - generated frame data for one scenario run.

use crate::error::SimError;
use crate::oracle::Oracle;
use crate::scenarios::ScenarioId;

use nalgebra::{UnitQuaternion, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use trajview_core::{DistanceModel, GeoPoint, ObjectFrame, PoseFrame};

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Number of frames to generate
    pub frames: usize,

    /// Frame rate in Hz
    pub frame_rate_hz: f64,

    /// Geodetic origin of the drive
    pub origin: GeoPoint,

    /// Number of tracked objects to spawn
    pub num_objects: usize,

    /// Standard deviation of the noise added to object offsets (meters)
    pub sensor_noise_std: f64,

    /// Largest acceptable point error against ground truth (meters)
    pub tolerance_m: f64,

    /// Reference frame for every built trajectory
    pub start_frame: usize,

    /// Earth model used both to generate poses and to build trajectories
    pub distance_model: DistanceModel,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            frames: 200,
            frame_rate_hz: 10.0,
            origin: GeoPoint::new(-122.4194, 37.7749, 16.0), // San Francisco
            num_objects: 6,
            sensor_noise_std: 0.05,
            tolerance_m: 0.5,
            start_frame: 0,
            distance_model: DistanceModel::Haversine,
        }
    }
}

impl SimConfig {
    /// Rejects configurations no scenario can run with.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.frames == 0 {
            return Err(SimError::config("frames must be positive"));
        }
        if self.start_frame >= self.frames {
            return Err(SimError::config(format!(
                "start_frame {} must be below frames {}",
                self.start_frame, self.frames
            )));
        }
        if !(self.frame_rate_hz > 0.0) {
            return Err(SimError::config("frame_rate_hz must be positive"));
        }
        if !(self.sensor_noise_std >= 0.0) {
            return Err(SimError::config("sensor_noise_std must be non-negative"));
        }
        Ok(())
    }

    /// Seconds between frames.
    pub fn dt(&self) -> f64 {
        1.0 / self.frame_rate_hz
    }
}

/// The SimWorld - ground truth plus the frame data handed to the builder.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Scenario the world was generated for
    pub scenario: ScenarioId,

    /// Ground truth oracle
    pub oracle: Oracle,

    /// Platform poses, one per frame
    pub pose_frames: Vec<PoseFrame>,

    /// Observed object offsets, one list per frame
    pub object_frames: Vec<ObjectFrame>,
}

impl SimWorld {
    /// Generates the drive, spawns objects and records the observed frames.
    pub fn new(config: SimConfig, scenario: ScenarioId) -> Result<Self, SimError> {
        config.validate()?;

        // Physics seed kept apart from the master seed so that adding
        // subsystems later does not shift the drive
        let physics_seed = config.seed.wrapping_mul(0x9e3779b97f4a7c15);
        let mut oracle = Oracle::new(physics_seed, config.origin, config.dt());
        oracle.set_position_noise(config.sensor_noise_std);

        let initial_yaw = oracle.rng().gen_range(-std::f64::consts::PI..std::f64::consts::PI);
        oracle.drive(&scenario.motion(), initial_yaw, config.frames);
        spawn_objects(&mut oracle, &config, scenario, initial_yaw);

        let pose_frames = oracle.pose_frames(scenario.pose_encoding(), config.distance_model);
        let object_frames = oracle.object_frames()?;

        Ok(Self {
            config,
            scenario,
            oracle,
            pose_frames,
            object_frames,
        })
    }
}

/// Places objects ahead of the platform's starting pose.
fn spawn_objects(oracle: &mut Oracle, config: &SimConfig, scenario: ScenarioId, heading: f64) {
    let frames = config.frames;
    let speed = scenario.motion().speed;
    let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, heading);

    for _ in 0..config.num_objects {
        let rng = oracle.rng();
        let forward = rng.gen_range(10.0..120.0);
        let lateral = rng.gen_range(-20.0..20.0);
        let up = rng.gen_range(0.0..2.0);
        let along = if scenario.has_partial_lifetimes() {
            rng.gen_range(speed..speed + 8.0)
        } else {
            rng.gen_range(0.0..speed)
        };
        let drift = rng.gen_range(-1.0..1.0);

        let (first_frame, last_frame) = if scenario.has_partial_lifetimes() {
            let first = rng.gen_range(0..frames.div_ceil(2));
            let last = rng.gen_range(first + 1..=frames);
            (first, last)
        } else {
            (0, frames)
        };

        let position = rotation * Vector3::new(forward, lateral, up);
        let velocity = rotation * Vector3::new(along, drift, 0.0);
        oracle.spawn_object(position, velocity, first_frame, last_frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configs_rejected() {
        let config = SimConfig {
            frames: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimConfig {
            start_frame: 200,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimConfig {
            sensor_noise_std: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_world_shapes() {
        let world = SimWorld::new(SimConfig::default(), ScenarioId::Overtake).unwrap();
        assert_eq!(world.pose_frames.len(), 200);
        assert_eq!(world.object_frames.len(), 200);
        assert_eq!(world.oracle.objects().len(), 6);

        for object in world.oracle.objects() {
            assert!(object.first_frame < object.last_frame);
            assert!(object.last_frame <= 200);
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = SimWorld::new(SimConfig::default(), ScenarioId::TurningDrive).unwrap();
        let b = SimWorld::new(SimConfig::default(), ScenarioId::TurningDrive).unwrap();
        assert_eq!(a.pose_frames, b.pose_frames);
        assert_eq!(a.object_frames, b.object_frames);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: SimConfig = serde_json::from_str(r#"{"seed": 7, "frames": 50}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.frames, 50);
        assert_eq!(config.num_objects, SimConfig::default().num_objects);
    }
}
