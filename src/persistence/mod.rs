//! Save snapshot shape handed to the persistence collaborator.
//!
//! The engine only produces and consumes [`SaveData`]; where it is stored is
//! the collaborator's business. `write_save` / `read_save` cover the common
//! case of a JSON file on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::config::Settings;
use crate::player::party::Companion;
use crate::player::Player;
use crate::world::Location;

/// Everything needed to rebuild a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub player: Player,
    pub party: Vec<Companion>,
    pub settings: Settings,
    pub location: Location,
    /// World seed, so revisited locations regenerate identically
    pub seed: u64,
    /// Overworld chunk a portal returns to
    pub last_world: Location,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Save IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Save format error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn write_save(path: impl AsRef<Path>, data: &SaveData) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path.as_ref(), json)?;
    tracing::info!(path = %path.as_ref().display(), "Game saved");
    Ok(())
}

pub fn read_save(path: impl AsRef<Path>) -> Result<SaveData, PersistenceError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let data = serde_json::from_str(&text)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use crate::player::Job;
    use bevy::math::Vec2;

    fn sample() -> SaveData {
        let mut player = Player::new(EntityId(1), Job::Ranger, Vec2::new(64.0, 64.0));
        player.gold = 321;
        player.level = 4;
        SaveData {
            player,
            party: Vec::new(),
            settings: Settings::default(),
            location: Location::Mine {
                level: 2,
                max_depth: 4,
            },
            seed: 7,
            last_world: Location::World {
                chunk_x: 1,
                chunk_y: 0,
            },
        }
    }

    #[test]
    fn test_save_file_restores_player() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot1.json");
        write_save(&path, &sample()).unwrap();

        let loaded = read_save(&path).unwrap();
        assert_eq!(loaded.player.gold, 321);
        assert_eq!(loaded.player.job, Job::Ranger);
        assert_eq!(loaded.location.depth(), 2);
        assert_eq!(loaded.player.hotbar, sample().player.hotbar);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_save(dir.path().join("nope.json"));
        assert!(matches!(result, Err(PersistenceError::Io(_))));
    }

    #[test]
    fn test_garbage_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_save(&path), Err(PersistenceError::Json(_))));
    }
}
