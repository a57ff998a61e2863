use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gal_orbits::{
    config::GalOrbitsConfig,
    integrator::{GalacticModelIntegrator, OrbitIntegrator},
    node::{PlaybackNode, PlaybackOutcome},
    player::TrajectoryPlayer,
    publisher::JsonLinesPublisher,
    trajectories::{trajectory_file::TrajectoryFile, TimeDirection, TrajectoryTable},
};

#[derive(Parser)]
#[command(name = "gal_orbits")]
#[command(about = "Integrate a Galactic orbit from sky observables and play it back at a fixed rate")]
struct Cli {
    /// YAML parameter file (flat or ROS 2 layout); defaults are used when omitted
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,

    /// Play a precomputed CSV trajectory instead of integrating one
    #[arg(short, long)]
    trajectory: Option<Utf8PathBuf>,

    /// Override the playback rate (Hz)
    #[arg(long)]
    publish_freq: Option<f64>,

    /// Also write the trajectory to this CSV file before playback
    #[arg(long)]
    save_trajectory: Option<Utf8PathBuf>,

    /// Log filter, e.g. "info" or "gal_orbits=trace"; RUST_LOG is used when omitted
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<GalOrbitsConfig> {
    let mut config = match &cli.config {
        Some(path) => GalOrbitsConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => GalOrbitsConfig::default(),
    };

    if let Some(freq) = cli.publish_freq {
        config.publish_freq = freq;
        config.validate().context("Invalid --publish-freq")?;
    }
    Ok(config)
}

fn build_table(cli: &Cli, config: &GalOrbitsConfig) -> Result<TrajectoryTable> {
    let direction = TimeDirection::from_reverse(config.reverse()?);

    if let Some(path) = &cli.trajectory {
        let table = TrajectoryTable::new_from_csv(path, direction)
            .with_context(|| format!("Failed to read trajectory from {path}"))?;
        debug!(rows = table.len(), %path, "trajectory loaded");
        return Ok(table);
    }

    let request = config
        .to_observational_input()?
        .integration_request()
        .context("Invalid observational input")?;
    debug!(
        pm_l_cosb = request.pm_l_cosb,
        pm_b = request.pm_b,
        "proper motion in Galactic frame"
    );

    let table = GalacticModelIntegrator::new(config.n_samples)
        .integrate(&request)
        .context("Orbit integration failed")?;
    debug!(rows = table.len(), "orbit integrated");
    Ok(table)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let config = load_config(&cli)?;
    info!("Starting gal_orbits");

    let table = build_table(&cli, &config)?;
    if let Some(path) = &cli.save_trajectory {
        table
            .write_csv(path)
            .with_context(|| format!("Failed to write trajectory to {path}"))?;
        info!(%path, rows = table.len(), "trajectory saved");
    }

    let player = TrajectoryPlayer::new(table);
    let publisher = JsonLinesPublisher::new(config.topic.clone(), std::io::stdout());
    let node = PlaybackNode::new(player, Box::new(publisher), config.publish_freq)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    match node.spin(shutdown).await.context("Playback failed")? {
        PlaybackOutcome::Completed { emitted } => debug!(emitted, "playback completed"),
        PlaybackOutcome::Cancelled { emitted } => {
            info!(emitted, "Interrupted, shutting down")
        }
    }
    Ok(())
}
