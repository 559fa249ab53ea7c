use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use metroplan::{
    clock::Pacing,
    engine::{EngineBuilder, EngineSettings, RunState},
    scenario::ScenarioLoader,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "metroplan urban planning loop runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/riverside.yaml")]
    scenario: PathBuf,

    /// Override the iteration cap (uses scenario default when omitted)
    #[arg(long)]
    iterations: Option<u32>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the cycle snapshot interval (0 disables snapshots)
    #[arg(long)]
    snapshot_interval: Option<u32>,

    /// Directory for cycle snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Serve the live viewer instead of running headless
    #[arg(long)]
    serve: bool,

    /// Viewer bind host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Viewer bind port
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }

    let max_iterations = scenario.iterations(cli.iterations);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshots.interval);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from(scenario.snapshots.output_dir.clone()));
    let pacing = scenario.pacing.to_pacing();

    if cli.serve {
        let config = WebServerConfig {
            scenario,
            max_iterations,
            snapshot_interval,
            snapshot_dir,
            pacing,
            host: cli.host,
            port: cli.port,
        };
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        return runtime.block_on(web::run(config));
    }

    let city = scenario.build_city();
    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        max_iterations,
        snapshot_interval,
        snapshot_dir,
    };

    let mut engine = EngineBuilder::new(settings)
        .with_standard_stages()
        .with_pacing(pacing)
        .build();

    let outcome = engine.run(&city)?;
    match outcome.state {
        RunState::Approved { iteration } => println!(
            "Scenario '{}' approved a plan on cycle {} of {}.",
            scenario.name, iteration, max_iterations
        ),
        RunState::Exhausted => println!(
            "Scenario '{}' exhausted {} cycles without an approval.",
            scenario.name, max_iterations
        ),
    }
    Ok(())
}
