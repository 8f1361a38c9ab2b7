//! TrajView scenario harness CLI
//!
//! Run deterministic trajectory scenarios against ground truth.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use trajview_core::DistanceModel;
use trajview_sim::scenarios::ScenarioId;
use trajview_sim::{ScenarioResult, ScenarioRunner, SimConfig, SimError};

/// TrajView deterministic scenario CLI
#[derive(Parser, Debug)]
#[command(name = "trajview-sim")]
#[command(about = "Run deterministic trajectory scenarios for TrajView", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (straight_drive, turning_drive, hill_climb, overtake, map_storage, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Frames per drive
    #[arg(short, long)]
    frames: Option<usize>,

    /// Reference frame for built trajectories
    #[arg(long)]
    start_frame: Option<usize>,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Use the WGS84 ellipsoid instead of the sphere
    #[arg(long)]
    ellipsoid: bool,

    /// JSON file with a base SimConfig; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export trajectories and ground truth to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,
}

impl Args {
    fn sim_config(&self, seed: u64) -> Result<SimConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            None => SimConfig::default(),
        };
        config.seed = seed;
        if let Some(frames) = self.frames {
            config.frames = frames;
        }
        if let Some(start_frame) = self.start_frame {
            config.start_frame = start_frame;
        }
        if self.ellipsoid {
            config.distance_model = DistanceModel::Geodesic;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Default directive for `--verbose`; `RUST_LOG` overrides it when set.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

fn report(result: &ScenarioResult) {
    if result.passed {
        info!(
            "✓ {} (seed={}) PASSED  rms={:.3}m max={:.3}m over {} points",
            result.scenario, result.seed, result.rms_error, result.max_error, result.points
        );
    } else {
        error!(
            "✗ {} (seed={}) FAILED: {}",
            result.scenario,
            result.seed,
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
    }
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(args.verbose))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("TrajView scenario harness v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(scenario) => vec![scenario],
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Available scenarios: straight_drive, turning_drive, hill_climb, overtake, map_storage, all");
                std::process::exit(1);
            }
        }
    };

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }

        let outcome = args
            .sim_config(base_seed)
            .and_then(|config| ScenarioRunner::with_config(config).run_with_export(scenarios[0]))
            .and_then(|(result, export)| {
                export.write_to_file(export_path)?;
                info!(
                    "Exported {} trajectories to {}",
                    export.trajectory_count(),
                    export_path.display()
                );
                Ok(result)
            });

        match outcome {
            Ok(result) => {
                report(&result);
                if !result.passed {
                    std::process::exit(1);
                }
            }
            Err(e) => {
                error!("✗ {} FAILED: {}", scenarios[0], e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Run scenarios
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let config = match args.sim_config(seed) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        let runner = ScenarioRunner::with_config(config);

        for scenario in &scenarios {
            let result = runner.run(*scenario);
            if !args.json {
                report(&result);
            }
            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let failed_count = all_results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": all_results,
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to serialize summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario,
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        assert_eq!(default_directive(true), "debug");
        assert_eq!(default_directive(false), "info");
        for verbose in [true, false] {
            assert!(EnvFilter::try_new(default_directive(verbose)).is_ok());
        }
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["trajview-sim", "--frames", "80", "--start-frame", "10", "--ellipsoid"]);
        let config = args.sim_config(9).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.frames, 80);
        assert_eq!(config.start_frame, 10);
        assert_eq!(config.distance_model, DistanceModel::Geodesic);
    }
}
