use bevy::prelude::*;
use std::sync::{Arc, RwLock};

use crate::engine::config::EngineConfig;
use crate::engine::input::InputSnapshot;
use crate::engine::GameSession;

/// Drives a [`GameSession`] from the bevy `Update` schedule
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: EngineConfig,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let mut session = GameSession::new(self.config.clone());
        if let Err(err) = session.start() {
            tracing::error!(%err, "Failed to generate the starting location");
        }

        app.insert_resource(SessionResource(Arc::new(RwLock::new(session))))
            .init_resource::<InputResource>()
            .add_systems(Update, simulation_tick_system);
    }
}

/// Shared handle so a presentation layer can read views between ticks
#[derive(Resource, Clone)]
pub struct SessionResource(pub Arc<RwLock<GameSession>>);

/// Latest input, written by whatever owns the devices
#[derive(Resource, Default)]
pub struct InputResource(pub InputSnapshot);

fn simulation_tick_system(
    time: Res<Time>,
    input: Res<InputResource>,
    session: Res<SessionResource>,
) {
    if let Ok(mut session) = session.0.write() {
        session.tick(&input.0, time.delta_secs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineState;
    use crate::world::Location;

    #[test]
    fn test_plugin_starts_session() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(SimulationPlugin {
            config: EngineConfig {
                map_width: 32,
                map_height: 32,
                start_location: Location::Town,
                ..EngineConfig::default()
            },
        });
        app.update();
        app.update();

        let handle = app.world().resource::<SessionResource>().clone();
        let session = handle.0.read().unwrap();
        assert_eq!(session.state(), EngineState::Active);
        assert!(session.tick_count() >= 1);
    }
}
