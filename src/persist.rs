//! Save files.
//!
//! A save is one JSON document holding the NPC registry, the player and the
//! conversation history (plus the scene cache). Loading parses the whole
//! file before anything is handed back, so a bad file never leaves the game
//! half-restored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

use crate::memory::History;
use crate::npc::NpcRegistry;
use crate::types::PlayerState;
use crate::world::SceneCache;

pub const DEFAULT_SAVE_FILE: &str = "savegame.json";

/// Current save file version
const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

impl PersistError {
    /// True when there simply is no save yet
    pub fn is_missing(&self) -> bool {
        matches!(self, PersistError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

fn current_version() -> u32 {
    SAVE_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    #[serde(default = "current_version")]
    pub version: u32,

    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,

    pub npc_data: NpcRegistry,
    pub player_state: PlayerState,
    pub history: History,

    #[serde(default)]
    pub scenes: SceneCache,
}

impl SaveData {
    pub fn new(
        npc_data: NpcRegistry,
        player_state: PlayerState,
        history: History,
        scenes: SceneCache,
    ) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            npc_data,
            player_state,
            history,
            scenes,
        }
    }

    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).await?;
        log::info!("Saved game to {:?}", path.as_ref());
        Ok(())
    }

    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path.as_ref()).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        log::info!("Loaded game from {:?}", path.as_ref());
        Ok(saved)
    }
}
