use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The six character attributes, in display order
pub const ATTRIBUTES: [&str; 6] = ["STR", "DEX", "CON", "INT", "WIS", "CHA"];

/// Who authored a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn sent to or received from the oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Durable persona of a named character the player has talked to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub bio: String,
    pub backstory: String,
    pub affinity: u32,
}

impl Npc {
    /// Creates a new NPC with no affinity yet
    pub fn new(bio: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            bio: bio.into(),
            backstory: backstory.into(),
            affinity: 0,
        }
    }
}

/// Everything the game knows about the player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub stats: BTreeMap<String, i32>,
    pub inventory: Vec<String>,
    pub journal: Vec<String>,
    /// Locations in first-visit order
    pub visited_locations: Vec<String>,
    /// Undirected adjacency: every edge is stored in both directions
    pub map_graph: BTreeMap<String, BTreeSet<String>>,
    pub current_location: String,
}

impl PlayerState {
    /// Creates a fresh player with the given attribute scores
    pub fn with_stats(stats: impl IntoIterator<Item = (String, i32)>) -> Self {
        Self {
            stats: stats.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Looks up an attribute by name, ignoring case
    pub fn stat(&self, name: &str) -> Option<i32> {
        self.stats.get(&name.to_ascii_uppercase()).copied()
    }
}
