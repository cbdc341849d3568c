#![deny(clippy::all, clippy::pedantic)]

mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rigid::{Physics, PhysicsConfig};
use tracing_subscriber::EnvFilter;

use crate::scene::SceneKind;

/// Steps a built-in rigid body scene at a fixed timestep.
#[derive(Parser, Debug)]
#[command(name = "rigid_sim", version, about)]
struct Args {
    /// Scene to simulate.
    #[arg(long, value_enum, default_value_t = SceneKind::Drop)]
    scene: SceneKind,
    /// Number of steps to run.
    #[arg(long, default_value_t = 600)]
    steps: u32,
    /// Fixed timestep in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Overrides the configured gravity.
    #[arg(long, allow_hyphen_values = true)]
    gravity: Option<f32>,
    /// Overrides the configured collision margin.
    #[arg(long, allow_hyphen_values = true)]
    margin: Option<f32>,
    /// JSON file with physics tunables; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log progress every N steps (0 disables).
    #[arg(long, default_value_t = 60)]
    log_every: u32,
}

fn load_config(args: &Args) -> Result<PhysicsConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => PhysicsConfig::default(),
    };
    if let Some(gravity) = args.gravity {
        config.gravity = gravity;
    }
    if let Some(margin) = args.margin {
        config.margin = margin;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut physics = Physics::with_config(config).context("invalid physics configuration")?;
    let mut bodies = args.scene.build().context("building scene")?;

    tracing::info!(
        scene = ?args.scene,
        bodies = bodies.len(),
        steps = args.steps,
        dt = args.dt,
        "starting simulation"
    );
    for step in 1..=args.steps {
        physics.step(&mut bodies, args.dt);
        if args.log_every > 0 && step % args.log_every == 0 {
            let awake = bodies
                .iter()
                .filter(|b| b.is_movable() && b.linear_velocity().length() > 0.05)
                .count();
            tracing::info!(step, pairs = physics.pair_count(), awake, "progress");
        }
    }

    for body in bodies.iter().filter(|b| b.is_movable()) {
        tracing::info!(
            id = %body.id(),
            position = ?body.position(),
            velocity = ?body.linear_velocity(),
            "final state"
        );
    }
    tracing::info!("simulation finished after {} steps", args.steps);
    Ok(())
}
