//! Named characters the player has spoken with.
//!
//! A persona is generated the first time the player talks to someone and
//! never regenerated, which keeps a character's identity stable even though
//! the oracle itself forgets everything between calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::llm::Oracle;
use crate::memory::History;
use crate::parser::{normalize_text, parse_persona};
use crate::prompts::templates::BACKSTORY_FALLBACK;
use crate::prompts::PromptBuilder;
use crate::types::{Message, Npc};

/// How many recent history messages are shown to the oracle when inventing a persona
pub const PERSONA_CONTEXT: usize = 6;

/// Lines that end a conversation (compared case-insensitively)
pub const FAREWELLS: [&str; 3] = ["goodbye", "exit", "bye"];

/// Personas keyed by the character's full name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NpcRegistry {
    npcs: BTreeMap<String, Npc>,
}

impl NpcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Npc> {
        self.npcs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.npcs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Npc)> {
        self.npcs.iter()
    }

    /// Register `npc` under `name` unless someone already holds that name
    pub fn register(&mut self, name: impl Into<String>, npc: Npc) -> bool {
        let name = name.into();
        if self.npcs.contains_key(&name) {
            return false;
        }
        self.npcs.insert(name, npc);
        true
    }

    /// Return the persona for `name`, asking the oracle to invent one first if needed.
    ///
    /// Exactly one oracle call is made the first time a name is seen and none
    /// afterwards. This never fails: missing fields fall back to fixed text.
    pub async fn ensure(
        &mut self,
        name: &str,
        history: &History,
        oracle: &Oracle,
        prompts: &PromptBuilder,
    ) -> &Npc {
        if !self.npcs.contains_key(name) {
            log::info!("Creating persona for {}", name);
            let request = prompts.persona(history.recent(PERSONA_CONTEXT), name);
            let reply = oracle.generate(&request).await;
            self.npcs.insert(name.to_string(), persona_from_reply(name, &reply));
        }
        &self.npcs[name]
    }

    /// Record a finished conversation. Returns the new affinity, or `None`
    /// if `name` is not registered.
    pub fn complete_conversation(&mut self, name: &str) -> Option<u32> {
        let npc = self.npcs.get_mut(name)?;
        npc.affinity += 1;
        log::debug!("Affinity with {} is now {}", name, npc.affinity);
        Some(npc.affinity)
    }
}

/// Build a persona from a labeled reply, filling gaps with fixed defaults
pub fn persona_from_reply(name: &str, reply: &str) -> Npc {
    let fields = parse_persona(reply);
    if fields.bio.is_none() || fields.backstory.is_none() {
        log::warn!("Persona reply for {} was missing labels, using fallbacks", name);
    }
    Npc::new(
        fields
            .bio
            .unwrap_or_else(|| format!("{}, a person of note.", name)),
        fields
            .backstory
            .unwrap_or_else(|| BACKSTORY_FALLBACK.to_string()),
    )
}

pub fn is_farewell(line: &str) -> bool {
    FAREWELLS.iter().any(|f| line.eq_ignore_ascii_case(f))
}

/// What the character said back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// The conversation continues
    Reply(String),
    /// The player said goodbye; this is the character's parting line
    Farewell(String),
}

/// A private back-and-forth with one character.
///
/// Runs beside the main history and is thrown away when it ends.
#[derive(Debug, Clone)]
pub struct Conversation {
    name: String,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn begin(name: impl Into<String>, npc: &Npc, prompts: &PromptBuilder) -> Self {
        let name = name.into();
        let messages = vec![prompts.npc_system(&name, npc)];
        Self { name, messages }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Send one line from the player. Blank lines are ignored.
    pub async fn say(&mut self, line: &str, oracle: &Oracle) -> Option<Exchange> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        self.messages.push(Message::user(line));
        let reply = normalize_text(&oracle.generate(&self.messages).await);

        if is_farewell(line) {
            return Some(Exchange::Farewell(reply));
        }
        self.messages.push(Message::assistant(reply.clone()));
        Some(Exchange::Reply(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedOracle;

    #[test]
    fn persona_fallbacks() {
        let npc = persona_from_reply("Selene the Librarian", "She smiles and says nothing.");
        assert_eq!(npc.bio, "Selene the Librarian, a person of note.");
        assert_eq!(npc.backstory, BACKSTORY_FALLBACK);
        assert_eq!(npc.affinity, 0);
    }

    #[test]
    fn farewell_is_exact_and_case_insensitive() {
        assert!(is_farewell("Goodbye"));
        assert!(is_farewell("BYE"));
        assert!(!is_farewell("bye then"));
        assert!(!is_farewell("quit"));
    }

    #[tokio::test]
    async fn ensure_calls_oracle_once() {
        let script = ScriptedOracle::with_replies([
            "BIO: Selene, archivist of the Drowned Library.\nBACKSTORY: She catalogued every flood. She trusts no river.",
        ]);
        let oracle = Oracle::new(script.clone());
        let prompts = PromptBuilder::default();
        let history = History::from(vec![Message::assistant("Selene looks up from her desk.")]);
        let mut registry = NpcRegistry::new();

        let first = registry.ensure("Selene", &history, &oracle, &prompts).await.clone();
        let second = registry.ensure("Selene", &history, &oracle, &prompts).await.clone();

        assert_eq!(script.call_count(), 1);
        assert_eq!(first, second);
        assert_eq!(first.bio, "Selene, archivist of the Drowned Library.");
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn persona_request_sees_only_recent_history() {
        let script = ScriptedOracle::new();
        let oracle = Oracle::new(script.clone());
        let history = History::from(
            (0..9)
                .map(|i| Message::assistant(format!("turn {i}")))
                .collect::<Vec<_>>(),
        );
        let mut registry = NpcRegistry::new();
        registry
            .ensure("Orrin", &history, &oracle, &PromptBuilder::default())
            .await;

        let request = script.last_request().unwrap();
        assert_eq!(request.len(), PERSONA_CONTEXT + 1);
        assert_eq!(request[0].content, "turn 3");
        assert!(request[6].content.contains("'Orrin'"));
    }

    #[test]
    fn register_twice_is_noop() {
        let mut registry = NpcRegistry::new();
        assert!(registry.register("Orrin", Npc::new("A ferryman.", "Old. Tired.")));
        assert!(!registry.register("Orrin", Npc::new("Someone else.", "New. Different.")));
        assert_eq!(registry.get("Orrin").unwrap().bio, "A ferryman.");
    }

    #[tokio::test]
    async fn conversation_ends_on_farewell() {
        let script = ScriptedOracle::with_replies(["Welcome, traveler.", "Safe roads to you."]);
        let oracle = Oracle::new(script.clone());
        let npc = Npc::new("A ferryman.", "He rows. He listens.");
        let mut conversation = Conversation::begin("Orrin", &npc, &PromptBuilder::default());

        assert_eq!(conversation.say("   ", &oracle).await, None);
        assert_eq!(
            conversation.say("Hello there", &oracle).await,
            Some(Exchange::Reply("Welcome, traveler.".into()))
        );
        assert_eq!(
            conversation.say("Bye", &oracle).await,
            Some(Exchange::Farewell("Safe roads to you.".into()))
        );

        // system + hello + reply + bye
        let last = script.last_request().unwrap();
        assert_eq!(last.len(), 4);
        assert_eq!(last[3], Message::user("Bye"));
    }

    #[test]
    fn affinity_only_moves_on_completion() {
        let mut registry = NpcRegistry::new();
        registry.register("Orrin", Npc::new("A ferryman.", "Old. Tired."));
        assert_eq!(registry.complete_conversation("Orrin"), Some(1));
        assert_eq!(registry.complete_conversation("Orrin"), Some(2));
        assert_eq!(registry.complete_conversation("Nobody"), None);
    }
}
