//! Turns a line of player input into a [`Command`].
//!
//! Matching is case-insensitive and the first rule that matches wins, in
//! this order: settings, built-ins, `roll`, `map`, `talk to`, `look`,
//! `examine`, movement, and finally free text for the narrator.

use thiserror::Error;

use crate::parser::title_case;
use crate::world::cardinal;

/// Input that was recognised but could not be carried out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown stat '{0}'.")]
    UnknownStat(String),
}

const EXAMINE_VERBS: [&str; 3] = ["examine", "look at", "inspect"];
const MOVE_VERBS: [&str; 3] = ["go to", "move to", "travel to"];

/// If `lc` is `verb` alone or `verb` followed by whitespace, return the rest of
/// the original `input`, trimmed
fn argument<'a>(input: &'a str, lc: &str, verb: &str) -> Option<&'a str> {
    let rest = lc.strip_prefix(verb)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(input[verb.len()..].trim())
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetPrune(bool),
    Quit,
    Help,
    Inventory,
    Stats,
    Journal,
    Save,
    Load,
    Hint,
    Roll { stat: String, dc: Option<i32> },
    Map(Option<String>),
    ListNpcs,
    Talk(String),
    Look,
    Examine(String),
    Move(String),
    Say(String),
}

impl Command {
    /// Parse a trimmed, non-empty line
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let input = input.trim();
        // ASCII lowering keeps byte offsets aligned with `input`
        let lc = input.to_ascii_lowercase();

        if lc.starts_with("set prune") {
            let parts: Vec<&str> = lc.split_whitespace().collect();
            return match parts.as_slice() {
                [_, _, "on"] => Ok(Command::SetPrune(true)),
                [_, _, "off"] => Ok(Command::SetPrune(false)),
                _ => Err(InputError::Usage("set prune on|off")),
            };
        }

        match lc.as_str() {
            "quit" | "exit" | "stop" => return Ok(Command::Quit),
            "help" | "?" => return Ok(Command::Help),
            "inventory" => return Ok(Command::Inventory),
            "stats" => return Ok(Command::Stats),
            "journal" => return Ok(Command::Journal),
            "save" => return Ok(Command::Save),
            "load" => return Ok(Command::Load),
            "hint" => return Ok(Command::Hint),
            _ => {}
        }

        if let Some(args) = argument(input, &lc, "roll") {
            let mut parts = args.split_whitespace();
            let stat = parts
                .next()
                .ok_or(InputError::Usage("roll <stat> [DC]"))?
                .to_ascii_uppercase();
            // A DC that is not a number is ignored rather than rejected
            let dc = parts.next().and_then(|dc| dc.parse().ok());
            return Ok(Command::Roll { stat, dc });
        }

        if let Some(target) = argument(input, &lc, "map") {
            return Ok(Command::Map(
                (!target.is_empty()).then(|| title_case(target)),
            ));
        }

        if let Some(name) = argument(input, &lc, "talk to") {
            if name.is_empty() {
                return Ok(Command::ListNpcs);
            }
            return Ok(Command::Talk(name.to_string()));
        }

        if matches!(lc.as_str(), "look" | "observe" | "where") {
            return Ok(Command::Look);
        }

        for verb in EXAMINE_VERBS {
            if let Some(target) = argument(input, &lc, verb) {
                if target.is_empty() {
                    return Err(InputError::Usage("examine <object>"));
                }
                return Ok(Command::Examine(target.to_string()));
            }
        }

        for verb in MOVE_VERBS {
            if let Some(place) = argument(input, &lc, verb) {
                if place.is_empty() {
                    return Err(InputError::Usage("go to <location>"));
                }
                return Ok(Command::Move(title_case(place)));
            }
        }
        if let Some(direction) = cardinal(&lc) {
            return Ok(Command::Move(direction.to_string()));
        }

        Ok(Command::Say(input.to_string()))
    }
}

pub const HELP: &str = "\
Available commands:
  go to/move to/travel to <location>  - Move to a place
  north/south/east/west               - Move in a cardinal direction
  look / observe / where              - Describe your surroundings
  examine/look at/inspect <object>    - Inspect something
  talk to                             - List NPCs here
  talk to <NPC name>                  - Start a conversation (say 'goodbye' to end)
  inventory                           - Show your items
  stats                               - Show your character stats
  journal                             - Show your journal entries
  save / load                         - Save or load your game
  map [<location>]                    - Show the map (default: current location)
  hint                                - Get an in-game hint
  set prune on|off                    - Enable/disable history summarization
  roll <STAT> [DC]                    - Perform a d20 attribute check
  help / ?                            - Show this help text
  quit / exit / stop                  - End the adventure";
