use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::command::{Command, InputError, HELP};
use crate::config::Config;
use crate::dice::{roll_attributes, StatCheck};
use crate::introspect::{self, SceneSurvey, SurveyKind};
use crate::llm::{LlmClient, Oracle};
use crate::memory::{ContextWindow, History};
use crate::npc::{Conversation, Exchange, NpcRegistry};
use crate::parser::normalize_text;
use crate::persist::{PersistError, SaveData};
use crate::prompts::PromptBuilder;
use crate::types::{Message, PlayerState, Role, ATTRIBUTES};
use crate::world::{describe_map, SceneCache};

/// Used when the player does not say where the story begins
pub const DEFAULT_START: &str = "Year 1372, in the misty Isle of Everdawn";

/// Choice made on the title screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    NewGame,
    LoadGame,
    Quit,
}

impl MenuChoice {
    /// Anything unrecognised starts a new game
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "2" | "load" => MenuChoice::LoadGame,
            "3" | "quit" | "exit" => MenuChoice::Quit,
            _ => MenuChoice::NewGame,
        }
    }
}

/// Everything that makes up one playthrough
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub history: History,
    pub player: PlayerState,
    pub npcs: NpcRegistry,
    pub scenes: SceneCache,
    /// Descriptions of things the player has examined, by target
    pub examined: BTreeMap<String, String>,
}

impl Session {
    fn fresh(rng: &mut StdRng) -> Self {
        Self {
            player: PlayerState::with_stats(roll_attributes(rng)),
            ..Self::default()
        }
    }

    fn to_save(&self) -> SaveData {
        SaveData::new(
            self.npcs.clone(),
            self.player.clone(),
            self.history.clone(),
            self.scenes.clone(),
        )
    }
}

impl From<SaveData> for Session {
    fn from(save: SaveData) -> Self {
        Self {
            history: save.history,
            player: save.player_state,
            npcs: save.npc_data,
            scenes: save.scenes,
            examined: BTreeMap::new(),
        }
    }
}

/// A piece of text for the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Story text from the narrator
    Narration(String),
    /// A line spoken by a character in conversation
    Speech { speaker: String, text: String },
    /// Local information: stats, maps, lists
    Info(String),
    /// Status changes such as saving or entering a conversation
    Notice(String),
    /// Usage errors and recoverable failures
    Warning(String),
}

impl Output {
    pub fn text(&self) -> &str {
        match self {
            Output::Narration(text)
            | Output::Speech { text, .. }
            | Output::Info(text)
            | Output::Notice(text)
            | Output::Warning(text) => text,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Speech { speaker, text } => write!(f, "{}: {}", speaker, text),
            other => write!(f, "{}", other.text()),
        }
    }
}

/// Result of handling one line of input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Turn {
    pub outputs: Vec<Output>,
    /// The player asked to quit
    pub finished: bool,
}

impl Turn {
    fn single(output: Output) -> Self {
        Self {
            outputs: vec![output],
            finished: false,
        }
    }
}

enum Mode {
    Exploring,
    Talking(Conversation),
}

/// Drives a game: parses commands, talks to the oracle and keeps the
/// session consistent between turns.
pub struct AdventureEngine {
    oracle: Oracle,
    prompts: PromptBuilder,
    window: ContextWindow,
    prune_enabled: bool,
    save_path: PathBuf,
    session: Session,
    mode: Mode,
    rng: StdRng,
}

impl AdventureEngine {
    /// Create an engine around the given backend
    pub fn new(llm_client: impl LlmClient + 'static, config: &Config) -> Result<Self> {
        let prompts = PromptBuilder::from_data_dir(&config.data_dir)?;
        let oracle = Oracle::new(llm_client).with_retry(config.retry);

        Ok(Self {
            oracle,
            prompts,
            window: config.window,
            prune_enabled: config.prune_enabled,
            save_path: config.save_path.clone(),
            session: Session::default(),
            mode: Mode::Exploring,
            rng: StdRng::from_entropy(),
        })
    }

    /// Use a fixed seed for dice and starting attributes
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn prune_enabled(&self) -> bool {
        self.prune_enabled
    }

    /// Name of the character being talked to, if a conversation is open
    pub fn talking_to(&self) -> Option<&str> {
        match &self.mode {
            Mode::Talking(conversation) => Some(conversation.name()),
            Mode::Exploring => None,
        }
    }

    /// Whether there is a story to continue
    pub fn has_story(&self) -> bool {
        !self.session.history.is_empty()
    }

    /// Input prompt shown before each line
    pub fn prompt(&self) -> String {
        if self.talking_to().is_some() {
            return "You: ".to_string();
        }
        match self.session.player.current_location.as_str() {
            "" => "> ".to_string(),
            location => format!("{}> ", location),
        }
    }

    /// Start over from `start`, which names when and where the story begins
    pub async fn new_game(&mut self, start: &str) -> Vec<Output> {
        let start = match start.trim() {
            "" => DEFAULT_START,
            start => start,
        };
        log::info!("Starting a new game at {}", start);

        let mut session = Session::fresh(&mut self.rng);
        session.history = History::from(self.prompts.opening(start));

        let intro = normalize_text(&self.oracle.generate(session.history.messages()).await);
        session.history.push(Message::assistant(intro.clone()));
        session.player.move_to(start);
        session.scenes.insert(start.to_string(), intro.clone());

        self.session = session;
        self.mode = Mode::Exploring;
        vec![Output::Narration(intro), Output::Info(HELP.to_string())]
    }

    /// Replace the whole session with the save file's contents.
    ///
    /// On error nothing is changed.
    pub async fn load_game(&mut self) -> Result<Vec<Output>, PersistError> {
        let save = SaveData::load_json(&self.save_path).await?;
        self.session = Session::from(save);
        self.mode = Mode::Exploring;

        let mut outputs = vec![Output::Notice(format!(
            "Game loaded from {}.",
            self.save_path.display()
        ))];
        if let Some(last) = self.session.history.last() {
            if last.role == Role::Assistant {
                outputs.push(Output::Narration(last.content.clone()));
            }
        }
        Ok(outputs)
    }

    /// Write the current session to the save file
    pub async fn save_game(&self) -> Result<(), PersistError> {
        self.session.to_save().save_json(&self.save_path).await
    }

    /// Resolve `roll <stat> [dc]` against the player's attributes
    pub fn roll_check(&mut self, stat: &str, dc: Option<i32>) -> Result<StatCheck, InputError> {
        let score = self
            .session
            .player
            .stat(stat)
            .ok_or_else(|| InputError::UnknownStat(stat.to_string()))?;
        Ok(StatCheck::roll(score, dc, &mut self.rng))
    }

    /// Handle one line typed by the player
    pub async fn handle_input(&mut self, line: &str) -> Turn {
        let line = line.trim();
        if line.is_empty() {
            return Turn::default();
        }

        if matches!(self.mode, Mode::Talking(_)) {
            return self.converse(line).await;
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => return Turn::single(Output::Warning(e.to_string())),
        };

        if let Command::SetPrune(enabled) = command {
            self.prune_enabled = enabled;
            let state = if enabled { "enabled" } else { "disabled" };
            return Turn::single(Output::Notice(format!("History summarization {}.", state)));
        }

        let mut turn = Turn::default();
        if self.prune_enabled
            && self
                .window
                .compact(&mut self.session.history, &self.oracle, &self.prompts)
                .await
        {
            turn.outputs
                .push(Output::Notice("[History pruned and summarized]".to_string()));
        }

        self.dispatch(command, line, &mut turn).await;
        turn
    }

    async fn dispatch(&mut self, command: Command, line: &str, turn: &mut Turn) {
        let out = &mut turn.outputs;
        match command {
            // handled before compaction
            Command::SetPrune(_) => {}

            Command::Quit => {
                out.push(Output::Notice("Farewell, traveler!".to_string()));
                turn.finished = true;
            }
            Command::Help => out.push(Output::Info(HELP.to_string())),
            Command::Inventory => {
                let inventory = &self.session.player.inventory;
                let items = if inventory.is_empty() {
                    "Empty".to_string()
                } else {
                    inventory.join(", ")
                };
                out.push(Output::Info(format!("Inventory: {}", items)));
            }
            Command::Stats => out.push(Output::Info(self.stats_text())),
            Command::Journal => {
                let mut lines = vec!["Journal Entries:".to_string()];
                lines.extend(self.session.player.journal.iter().map(|e| format!(" - {}", e)));
                out.push(Output::Info(lines.join("\n")));
            }
            Command::Save => match self.save_game().await {
                Ok(()) => out.push(Output::Notice(format!(
                    "Game saved to {}.",
                    self.save_path.display()
                ))),
                Err(e) => {
                    log::error!("Save failed: {}", e);
                    out.push(Output::Warning(format!("Could not save the game: {}", e)));
                }
            },
            Command::Load => match self.load_game().await {
                Ok(outputs) => out.extend(outputs),
                Err(e) if e.is_missing() => {
                    out.push(Output::Warning("No save file found.".to_string()))
                }
                Err(e) => {
                    log::error!("Load failed: {}", e);
                    out.push(Output::Warning(format!("Could not load the save file: {}", e)));
                }
            },
            Command::Hint => {
                let request = self.prompts.hint(
                    self.session.history.messages(),
                    &self.session.player.current_location,
                );
                let hint = normalize_text(&self.oracle.generate(&request).await);
                out.push(Output::Info(format!("Hint: {}", hint)));
            }
            Command::Roll { stat, dc } => match self.roll_check(&stat, dc) {
                Ok(check) => out.push(Output::Info(check.to_string())),
                Err(e) => out.push(Output::Warning(e.to_string())),
            },
            Command::Map(target) => {
                let target =
                    target.unwrap_or_else(|| self.session.player.current_location.clone());
                let lines = describe_map(&self.session.player, &self.session.scenes, &target);
                out.push(Output::Info(lines.join("\n")));
            }
            Command::ListNpcs => {
                let npcs = introspect::list(
                    SurveyKind::Npcs,
                    self.session.history.messages(),
                    &self.oracle,
                    &self.prompts,
                )
                .await;
                if npcs.is_empty() {
                    out.push(Output::Info("There's no one here to talk to.".to_string()));
                } else {
                    out.push(Output::Info(format!("You can talk to: {}", npcs.join(", "))));
                }
            }
            Command::Talk(name) => {
                let npc = self
                    .session
                    .npcs
                    .ensure(&name, &self.session.history, &self.oracle, &self.prompts)
                    .await
                    .clone();
                out.push(Output::Notice(format!(
                    "You begin talking with {}. (type 'goodbye' to end)",
                    name
                )));
                self.mode = Mode::Talking(Conversation::begin(name, &npc, &self.prompts));
            }
            Command::Look => {
                out.push(Output::Narration(self.narrate(line).await));
                self.survey(out).await;
            }
            Command::Examine(target) => {
                let description = self.narrate(line).await;
                out.push(Output::Narration(description.clone()));
                self.session
                    .player
                    .journal
                    .push(format!("Examined {}.", target));
                self.session.examined.insert(target, description);
            }
            Command::Move(destination) => {
                self.session.player.move_to(&destination);
                let arrival = self.narrate(line).await;
                out.push(Output::Narration(arrival.clone()));
                self.session.scenes.insert(destination, arrival);
                self.survey(out).await;
            }
            Command::Say(_) => out.push(Output::Narration(self.narrate(line).await)),
        }
    }

    /// Record the player's line, ask the narrator, record the reply
    async fn narrate(&mut self, line: &str) -> String {
        self.session.history.push(Message::user(line));
        let reply = normalize_text(&self.oracle.generate(self.session.history.messages()).await);
        self.session.history.push(Message::assistant(reply.clone()));
        reply
    }

    async fn survey(&self, out: &mut Vec<Output>) {
        let survey =
            SceneSurvey::take(self.session.history.messages(), &self.oracle, &self.prompts).await;
        out.extend(survey.lines().into_iter().map(Output::Info));
    }

    async fn converse(&mut self, line: &str) -> Turn {
        let Mode::Talking(mut conversation) = std::mem::replace(&mut self.mode, Mode::Exploring)
        else {
            return Turn::default();
        };
        let speaker = conversation.name().to_string();

        match conversation.say(line, &self.oracle).await {
            None => {
                self.mode = Mode::Talking(conversation);
                Turn::default()
            }
            Some(Exchange::Reply(text)) => {
                self.mode = Mode::Talking(conversation);
                Turn::single(Output::Speech { speaker, text })
            }
            Some(Exchange::Farewell(text)) => {
                self.session.npcs.complete_conversation(&speaker);
                Turn {
                    outputs: vec![
                        Output::Speech { speaker, text },
                        Output::Notice(
                            "Conversation ended. You return to exploration.".to_string(),
                        ),
                    ],
                    finished: false,
                }
            }
        }
    }

    fn stats_text(&self) -> String {
        ATTRIBUTES
            .iter()
            .filter_map(|name| {
                self.session
                    .player
                    .stats
                    .get(*name)
                    .map(|value| format!(" {}: {}", name, value))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
