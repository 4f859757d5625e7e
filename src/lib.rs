//! # Realmweaver
//!
//! The state-keeping core of an open-ended text adventure narrated by a
//! stateless LLM.
//!
//! The model forgets everything between calls, so continuity has to be
//! rebuilt on every request. This crate does that bookkeeping:
//!
//! - **Context window**: history is replayed to the model and summarized once it grows too long
//! - **World map**: an undirected graph of visited places with cached scene descriptions
//! - **NPC personas**: a character's bio and backstory are generated once, then reused
//! - **Scene introspection**: exits, people and objects are pulled out of free text on demand
//! - **Command engine**: one line of input in, narration and status out
//! - **Save files**: the whole session round-trips through a single JSON file
//!
//! ## Example
//!
//! ```rust,no_run
//! use realmweaver::{AdventureEngine, Config, llm::OpenAiClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let llm = OpenAiClient::new(&config.api_key).with_model(&config.model);
//! let mut engine = AdventureEngine::new(llm, &config)?;
//!
//! for output in engine.new_game("a rainy harbor town").await {
//!     println!("{}", output);
//! }
//! let turn = engine.handle_input("go to the lighthouse").await;
//! for output in turn.outputs {
//!     println!("{}", output);
//! }
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod dice;
pub mod engine;
pub mod introspect;
pub mod llm;
pub mod memory;
pub mod npc;
pub mod parser;
pub mod persist;
pub mod prompts;
pub mod testing;
pub mod types;
pub mod world;

// Re-export main types for convenience
pub use command::{Command, InputError};
pub use config::{Config, ConfigError};
pub use engine::{AdventureEngine, MenuChoice, Output, Session, Turn};
pub use llm::{LlmClient, Oracle, OracleError, SamplingParams};
pub use memory::{ContextWindow, History};
pub use npc::{Conversation, NpcRegistry};
pub use persist::{PersistError, SaveData};
pub use types::{Message, Npc, PlayerState, Role};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
