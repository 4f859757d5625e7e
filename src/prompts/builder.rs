use anyhow::Result;
use std::path::Path;

use super::loader::PromptLoader;
use super::templates::{
    BEGIN_ADVENTURE, HINT_REQUEST, NPC_SYSTEM, PERSONA_REQUEST, SUMMARY_DEFAULT, SYSTEM_DEFAULT,
};
use crate::types::{Message, Npc};

/// Assembles the message lists sent to the oracle
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system: String,
    summary: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            system: SYSTEM_DEFAULT.to_string(),
            summary: SUMMARY_DEFAULT.to_string(),
        }
    }
}

impl PromptBuilder {
    /// Build with any overrides found under `data_path`
    pub fn from_data_dir(data_path: impl AsRef<Path>) -> Result<Self> {
        let loader = PromptLoader::new(data_path);
        Ok(Self {
            system: loader.load_system()?,
            summary: loader.load_summary()?,
        })
    }

    /// First two messages of a brand new adventure
    pub fn opening(&self, start: &str) -> Vec<Message> {
        vec![
            Message::system(self.system.clone()),
            Message::user(format!("{}{}", BEGIN_ADVENTURE, start)),
        ]
    }

    /// Summarization request for the aged head of the history
    pub fn summarize(&self, head: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(head.len() + 1);
        messages.push(Message::system(self.summary.clone()));
        messages.extend_from_slice(head);
        messages
    }

    /// Ask for a labeled persona of `name` given some recent context
    pub fn persona(&self, recent: &[Message], name: &str) -> Vec<Message> {
        with_request(recent, PERSONA_REQUEST.replace("{name}", name))
    }

    /// System turn that puts the oracle in character
    pub fn npc_system(&self, name: &str, npc: &Npc) -> Message {
        Message::system(
            NPC_SYSTEM
                .replace("{name}", name)
                .replace("{bio}", &npc.bio)
                .replace("{backstory}", &npc.backstory),
        )
    }

    /// A one-off question appended to the history without persisting it
    pub fn side_query(&self, history: &[Message], instruction: &str) -> Vec<Message> {
        with_request(history, instruction)
    }

    pub fn hint(&self, history: &[Message], location: &str) -> Vec<Message> {
        with_request(history, HINT_REQUEST.replace("{location}", location))
    }
}

fn with_request(context: &[Message], request: impl Into<String>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(context.len() + 1);
    messages.extend_from_slice(context);
    messages.push(Message::user(request));
    messages
}
