//! JSON exporter for trajectory plots.
//!
//! Writes built trajectories next to their ground truth so runs can be
//! inspected offline.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use trajview_core::Trajectory;

use crate::error::SimError;

/// A point in the reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointExport {
    pub frame: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PointExport {
    pub fn new(frame: usize, point: &Point3<f64>) -> Self {
        Self {
            frame,
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }
}

/// One built trajectory and the matching ground truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryExport {
    /// "platform" or the object ID
    pub id: String,

    pub built: Vec<PointExport>,

    pub truth: Vec<PointExport>,

    /// Path length of the built trajectory (meters)
    pub path_length: f64,
}

impl TrajectoryExport {
    pub fn new(id: &str, trajectory: &Trajectory, truth: &[Point3<f64>]) -> Self {
        let built = trajectory
            .frames()
            .zip(trajectory.iter())
            .map(|(frame, point)| PointExport::new(frame, point))
            .collect();
        let truth = trajectory
            .frames()
            .zip(truth)
            .map(|(frame, point)| PointExport::new(frame, point))
            .collect();

        Self {
            id: id.to_string(),
            built,
            truth,
            path_length: trajectory.path_length(),
        }
    }
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Platform self-trajectory
    pub platform: TrajectoryExport,

    /// Object trajectories, in spawn order
    pub objects: Vec<TrajectoryExport>,

    /// Final results
    pub passed: bool,

    /// RMS point error if any points were compared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rms_error: Option<f64>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            platform: TrajectoryExport::default(),
            objects: Vec::new(),
            passed: false,
            rms_error: None,
        }
    }

    /// Finalizes the export. A NaN error is dropped.
    pub fn finalize(&mut self, passed: bool, rms_error: f64) {
        self.passed = passed;
        self.rms_error = (!rms_error.is_nan()).then_some(rms_error);
    }

    /// Number of trajectories in the export, platform included.
    pub fn trajectory_count(&self) -> usize {
        1 + self.objects.len()
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_export_frames() {
        let trajectory = Trajectory::new(
            4,
            vec![Point3::origin(), Point3::new(3.0, 4.0, 0.0)],
        );
        let truth = [Point3::origin(), Point3::new(3.0, 4.1, 0.0)];

        let export = TrajectoryExport::new("7", &trajectory, &truth);
        assert_eq!(export.built.len(), 2);
        assert_eq!(export.built[1].frame, 5);
        assert_eq!(export.truth[1].y, 4.1);
        assert_eq!(export.path_length, 5.0);
    }

    #[test]
    fn test_finalize_drops_nan() {
        let mut export = SimExport::new("overtake", 1);
        export.finalize(false, f64::NAN);
        assert_eq!(export.rms_error, None);

        let json = serde_json::to_value(&export).unwrap();
        assert!(json.get("rms_error").is_none());
        assert_eq!(json["platform"]["id"], "");
    }

    #[test]
    fn test_write_to_file() {
        let mut export = SimExport::new("straight_drive", 42);
        export.finalize(true, 0.03);

        let path = std::env::temp_dir().join(format!("trajview_export_{}.json", std::process::id()));
        export.write_to_file(&path).unwrap();

        let read: SimExport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.scenario, "straight_drive");
        assert_eq!(read.rms_error, Some(0.03));
        std::fs::remove_file(&path).unwrap();
    }
}
