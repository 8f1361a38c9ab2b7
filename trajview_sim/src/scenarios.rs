//! Drive scenarios for the trajectory harness.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// TV-001: constant heading, objects ahead for the whole run
    StraightDrive,

    /// TV-002: constant yaw rate with banking
    TurningDrive,

    /// TV-003: pitched climb, pose carried entirely in the local offset
    HillClimb,

    /// TV-004: objects appearing and disappearing mid-run
    Overtake,

    /// TV-005: frame-keyed storage with gaps instead of arrays
    MapStorage,
}

/// Platform kinematics for a scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProfile {
    /// Forward speed along the platform's local x axis (m/s)
    pub speed: f64,

    /// Heading change per second (rad/s)
    pub yaw_rate: f64,

    /// Constant pitch (rad); negative pitch points the nose up
    pub pitch: f64,

    /// Constant roll (rad)
    pub roll: f64,
}

/// How platform positions are written into pose frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseEncoding {
    /// Each frame's geodetic anchor is the platform location; offset is zero
    Anchor,

    /// Every frame shares the origin anchor; the platform location lives in (x, y, z)
    LocalOffset,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::StraightDrive,
            ScenarioId::TurningDrive,
            ScenarioId::HillClimb,
            ScenarioId::Overtake,
            ScenarioId::MapStorage,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::StraightDrive => "straight_drive",
            ScenarioId::TurningDrive => "turning_drive",
            ScenarioId::HillClimb => "hill_climb",
            ScenarioId::Overtake => "overtake",
            ScenarioId::MapStorage => "map_storage",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::StraightDrive => "15 m/s on a fixed heading, objects tracked for the whole run",
            ScenarioId::TurningDrive => "Constant 0.1 rad/s turn with 0.03 rad bank",
            ScenarioId::HillClimb => "Nose-up climb with the pose stored as a local offset",
            ScenarioId::Overtake => "Faster objects entering and leaving the frame range",
            ScenarioId::MapStorage => "Frame-keyed maps with empty frames omitted",
        }
    }

    pub fn motion(&self) -> MotionProfile {
        match self {
            ScenarioId::StraightDrive | ScenarioId::MapStorage => MotionProfile {
                speed: 15.0,
                yaw_rate: 0.0,
                pitch: 0.0,
                roll: 0.0,
            },
            ScenarioId::TurningDrive => MotionProfile {
                speed: 15.0,
                yaw_rate: 0.1,
                pitch: 0.0,
                roll: 0.03,
            },
            ScenarioId::HillClimb => MotionProfile {
                speed: 8.0,
                yaw_rate: 0.02,
                pitch: -0.08,
                roll: 0.0,
            },
            ScenarioId::Overtake => MotionProfile {
                speed: 20.0,
                yaw_rate: -0.03,
                pitch: 0.0,
                roll: 0.0,
            },
        }
    }

    pub fn pose_encoding(&self) -> PoseEncoding {
        match self {
            ScenarioId::HillClimb => PoseEncoding::LocalOffset,
            _ => PoseEncoding::Anchor,
        }
    }

    /// Whether objects get lifetimes shorter than the run.
    pub fn has_partial_lifetimes(&self) -> bool {
        matches!(self, ScenarioId::Overtake | ScenarioId::MapStorage)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl serde::Serialize for ScenarioId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "straight_drive" | "straight" | "tv-001" => Ok(ScenarioId::StraightDrive),
            "turning_drive" | "turning" | "tv-002" => Ok(ScenarioId::TurningDrive),
            "hill_climb" | "hill" | "tv-003" => Ok(ScenarioId::HillClimb),
            "overtake" | "tv-004" => Ok(ScenarioId::Overtake),
            "map_storage" | "map" | "tv-005" => Ok(ScenarioId::MapStorage),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
