use std::time::Duration;

use anyhow::Context;
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;

use realm_core::engine::{EngineConfig, SimulationPlugin};
use realm_core::logging::init_tracing;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => EngineConfig::default(),
    };
    init_tracing(&config.tracing);
    tracing::info!(
        seed = config.seed,
        location = %config.start_location.label(),
        "Starting headless simulation"
    );

    let step = Duration::from_secs_f32(config.tick_secs());
    App::new()
        // headless, fixed loop at the configured tick rate
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(step)))
        .add_plugins(SimulationPlugin { config })
        .run();
    Ok(())
}
