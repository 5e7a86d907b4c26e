use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use photon_swarm::{open_sensor, PhotonSwarm, SensorKind, SensorOptions, SwarmConfig};
use tracing::info;

/// Frame interval of the headless runner, about 60 frames per second.
const HEADLESS_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Parser, Debug)]
#[command(
    name = "photon-swarm",
    version,
    about = "Ambient light visualisation for round displays"
)]
struct Cli {
    /// JSON configuration file; defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Light sensor to listen to.
    #[arg(long, value_enum, default_value_t = SensorKind::Simulated)]
    sensor: SensorKind,

    /// Reading reported by the fixed sensor, in lux.
    #[arg(long, default_value_t = 500.0)]
    lux: f32,

    /// Root of the IIO device tree searched for an ambient light sensor.
    #[arg(long)]
    iio_root: Option<PathBuf>,

    /// Seed for photon spawns and the simulated sensor.
    #[arg(long)]
    seed: Option<u64>,

    /// Run this many frames without a window, then exit.
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Write the last headless frame to this PNG file.
    #[arg(long, value_name = "PNG", requires = "headless")]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SwarmConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SwarmConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let options = SensorOptions {
        lux: cli.lux,
        iio_root: cli.iio_root.clone(),
        seed: config.seed,
    };
    let sensor = open_sensor(cli.sensor, &options);
    let mut swarm =
        PhotonSwarm::with_sensor(config, sensor).context("invalid swarm configuration")?;

    match cli.headless {
        Some(frames) => {
            let summary = swarm.run_headless(frames, HEADLESS_FRAME_INTERVAL);
            info!(
                frames = summary.frames,
                hits = summary.hits,
                readings = summary.readings,
                active = summary.final_active_count,
                "headless run finished"
            );
            if let Some(path) = &cli.snapshot {
                swarm
                    .save_snapshot(path)
                    .with_context(|| format!("writing snapshot to {}", path.display()))?;
            }
        }
        None => photon_swarm::window::run(swarm).context("window runner failed")?,
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
