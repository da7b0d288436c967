use manybodies::{ScenarioConfig, Scenario, LogPresenter};
use manybodies::{run_headless, bench_workers};

use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Run a many-body gravity scenario without a window")]
struct Args {
    /// Scenario file, looked up under `scenarios/` when not found as given
    #[arg(short, default_value = "collapse.yaml")]
    file_name: String,

    /// Override the number of frames to run
    #[arg(long)]
    frames: Option<u64>,

    /// Override the worker count
    #[arg(long)]
    workers: Option<usize>,

    /// Log a summary every N frames
    #[arg(long, default_value_t = 60)]
    log_every: u64,

    /// Time a step for several worker counts instead of running the scenario
    #[arg(long)]
    bench: bool,
}

fn scenario_path(file_name: &str) -> PathBuf {
    let direct = PathBuf::from(file_name);
    if direct.exists() {
        return direct;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = scenario_path(file_name);
    let scenario_cfg = ScenarioConfig::from_path(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;

    log::debug!("{:?}", scenario_cfg.engine);

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_workers(2000, &[1, 2, 4, 8], 5)?;
        return Ok(());
    }

    let mut scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    if let Some(workers) = args.workers {
        scenario_cfg.engine.workers = workers;
    }

    let mut scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario")?;
    let frames = args.frames.unwrap_or(scenario.parameters.frames);

    let mut presenter = LogPresenter::new(args.log_every);
    // a failed step leaves no usable buffer, stop here
    run_headless(&mut scenario, &mut presenter, frames).context("simulation aborted")?;

    log::info!("done after {} frames", scenario.frame().generation());
    Ok(())
}
