//! Asks the oracle what is in the current scene.
//!
//! Each question is a throwaway request layered on top of the history; the
//! question and answer are never stored. Answers are snapshots and do not
//! touch the map or the NPC registry.

use crate::llm::Oracle;
use crate::parser::parse_list;
use crate::prompts::templates::{LIST_EXITS, LIST_ITEMS, LIST_NPCS};
use crate::prompts::PromptBuilder;
use crate::types::Message;

/// The three things we ask about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyKind {
    Exits,
    Npcs,
    Items,
}

impl SurveyKind {
    pub fn instruction(self) -> &'static str {
        match self {
            SurveyKind::Exits => LIST_EXITS,
            SurveyKind::Npcs => LIST_NPCS,
            SurveyKind::Items => LIST_ITEMS,
        }
    }
}

/// One side-query against the current history
pub async fn list(
    kind: SurveyKind,
    history: &[Message],
    oracle: &Oracle,
    prompts: &PromptBuilder,
) -> Vec<String> {
    let reply = oracle
        .generate(&prompts.side_query(history, kind.instruction()))
        .await;
    parse_list(&reply)
}

/// What the oracle says is around the player right now
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneSurvey {
    pub exits: Vec<String>,
    pub npcs: Vec<String>,
    pub items: Vec<String>,
}

impl SceneSurvey {
    /// Ask all three questions, one after another
    pub async fn take(history: &[Message], oracle: &Oracle, prompts: &PromptBuilder) -> Self {
        Self {
            exits: list(SurveyKind::Exits, history, oracle, prompts).await,
            npcs: list(SurveyKind::Npcs, history, oracle, prompts).await,
            items: list(SurveyKind::Items, history, oracle, prompts).await,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Exits: {}", join_or_none(&self.exits)),
            format!("NPCs here: {}", join_or_none(&self.npcs)),
            format!("Items here: {}", join_or_none(&self.items)),
        ]
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}
