//! TrajView Deterministic Scenario Harness
//!
//! Generates complete drives from a single 64-bit seed, feeds the recorded
//! frames through `trajview_core` and checks every built trajectory against
//! ground truth.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         SimWorld                            │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ Oracle (ChaCha8 RNG, ENU ground truth)               │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │ pose frames                 │ object frames         │
//! │  ┌────▼──────────────────────────────▼────┐                 │
//! │  │        trajview_core::TrajectoryBuilder│                 │
//! │  └────────────────────────────────────────┘                 │
//! │       │ trajectories                                        │
//! │  ┌────▼────────────┐     ┌──────────────┐                   │
//! │  │ ScenarioRunner  │────►│  SimExport   │                   │
//! │  │ (RMS/max error) │     │  (JSON)      │                   │
//! │  └─────────────────┘     └──────────────┘                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use trajview_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42, 200).run(ScenarioId::TurningDrive);
//! assert!(result.passed);
//! ```

pub mod error;
pub mod exporter;
pub mod oracle;
pub mod runner;
pub mod scenarios;
mod world;

pub use error::SimError;
pub use exporter::{PointExport, SimExport, TrajectoryExport};
pub use oracle::{GroundTruthObject, Oracle, PlatformState};
pub use runner::{ErrorStats, ScenarioResult, ScenarioRunner};
pub use world::{SimConfig, SimWorld};
