//! End-to-end game flows against a scripted oracle.

use std::path::Path;
use std::time::Duration;

use realmweaver::llm::RetryPolicy;
use realmweaver::memory::SUMMARY_PREFIX;
use realmweaver::testing::{ScriptedOracle, DEFAULT_SCRIPTED_REPLY};
use realmweaver::{AdventureEngine, Config, Message, Output, Role};

const START: &str = "Harbor of Sighs";

fn config(dir: &Path) -> Config {
    Config {
        save_path: dir.join("savegame.json"),
        data_dir: dir.to_path_buf(),
        retry: RetryPolicy {
            attempts: 1,
            backoff: Duration::ZERO,
            attempt_timeout: Duration::from_secs(5),
        },
        ..Config::default()
    }
}

async fn started(dir: &Path, script: &ScriptedOracle) -> AdventureEngine {
    script.push_reply("Gulls wheel over a grey harbor.");
    let mut engine = AdventureEngine::new(script.clone(), &config(dir))
        .unwrap()
        .with_seed(42);
    engine.new_game(START).await;
    engine
}

fn texts(outputs: &[Output]) -> Vec<&str> {
    outputs.iter().map(Output::text).collect()
}

#[tokio::test]
async fn new_game_sets_the_scene() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    script.push_reply("\r\n\nGulls wheel over a grey harbor.\n\n\n");
    let mut engine = AdventureEngine::new(script.clone(), &config(dir.path())).unwrap();

    let outputs = engine.new_game("  ").await;
    let session = engine.session();

    assert_eq!(
        outputs[0],
        Output::Narration("Gulls wheel over a grey harbor.".into())
    );
    assert_eq!(session.player.current_location, realmweaver::engine::DEFAULT_START);
    assert_eq!(session.player.visited_locations.len(), 1);
    assert!(session.player.map_graph.is_empty());
    assert_eq!(session.player.stats.len(), 6);

    let history = session.history.messages();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].role, Role::System);
    assert!(history[1].content.starts_with("Begin the adventure: Year 1372"));
    assert_eq!(history[2], Message::assistant("Gulls wheel over a grey harbor."));
    assert_eq!(engine.prompt(), format!("{}> ", realmweaver::engine::DEFAULT_START));
}

#[tokio::test]
async fn moving_links_places_and_surveys_the_scene() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;

    script.push_reply("Stalls of fish and rope crowd the square.");
    script.push_reply("Back to the harbor, Lighthouse road.");
    script.push_reply("Mara the Fishwife");
    script.push_reply("none");

    let turn = engine.handle_input("go to the fish MARKET").await;
    let session = engine.session();

    assert_eq!(
        texts(&turn.outputs),
        vec![
            "Stalls of fish and rope crowd the square.",
            "Exits: Back to the harbor, Lighthouse road",
            "NPCs here: Mara the Fishwife",
            "Items here: None",
        ]
    );
    assert_eq!(session.player.current_location, "The Fish Market");
    assert!(session.player.map_graph[START].contains("The Fish Market"));
    assert!(session.player.map_graph["The Fish Market"].contains(START));
    assert_eq!(
        session.scenes["The Fish Market"],
        "Stalls of fish and rope crowd the square."
    );

    // side queries are never stored
    assert_eq!(session.history.len(), 5);
    assert_eq!(session.history.messages()[3], Message::user("go to the fish MARKET"));
    // introspection does not create personas
    assert!(session.npcs.is_empty());
    assert_eq!(script.call_count(), 5);
}

#[tokio::test]
async fn cardinal_direction_moves() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;

    engine.handle_input("north").await;
    engine.handle_input("SOUTH").await;

    let player = &engine.session().player;
    assert_eq!(player.visited_locations, vec![START, "North", "South"]);
    assert_eq!(player.current_location, "South");
    assert!(player.map_graph["North"].contains("South"));
}

#[tokio::test]
async fn conversation_is_isolated_and_raises_affinity() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;
    let history_before = engine.session().history.clone();

    script.push_reply("BIO: Selene, keeper of the tide charts.\nBACKSTORY: She mapped every reef. She never sails.");
    let turn = engine.handle_input("talk to Selene").await;
    assert!(matches!(&turn.outputs[0], Output::Notice(text) if text.contains("Selene")));
    assert_eq!(engine.talking_to(), Some("Selene"));
    assert_eq!(engine.prompt(), "You: ");

    // built-in commands are just speech while talking
    script.push_reply("Stats? I only track tides.");
    let turn = engine.handle_input("stats").await;
    assert_eq!(
        turn.outputs,
        vec![Output::Speech {
            speaker: "Selene".into(),
            text: "Stats? I only track tides.".into()
        }]
    );
    assert_eq!(engine.session().npcs.get("Selene").unwrap().affinity, 0);

    script.push_reply("Fair winds.");
    let turn = engine.handle_input("GoodBye").await;
    assert_eq!(turn.outputs.len(), 2);
    assert!(!turn.finished);
    assert_eq!(engine.talking_to(), None);

    let session = engine.session();
    let selene = session.npcs.get("Selene").unwrap();
    assert_eq!(selene.affinity, 1);
    assert_eq!(selene.bio, "Selene, keeper of the tide charts.");
    assert_eq!(session.history, history_before);

    // the persona is reused: no new BIO request, just the farewell
    let calls = script.call_count();
    engine.handle_input("talk to Selene").await;
    assert_eq!(script.call_count(), calls);
    engine.handle_input("bye").await;
    assert_eq!(script.call_count(), calls + 1);

    let selene = engine.session().npcs.get("Selene").unwrap();
    assert_eq!(selene.affinity, 2);
    assert_eq!(selene.backstory, "She mapped every reef. She never sails.");

    // the conversation opens with the persona as a system turn
    let farewell_request = script.last_request().unwrap();
    assert_eq!(farewell_request[0].role, Role::System);
    assert!(farewell_request[0].content.contains("You are Selene."));
    assert_eq!(farewell_request.len(), 2);
}

#[tokio::test]
async fn other_commands_leave_affinity_alone() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;

    engine.handle_input("talk to Orrin").await;
    engine.handle_input("exit").await;
    for line in ["look", "examine Orrin", "go to dock", "hint", "roll cha 10", "talk to"] {
        engine.handle_input(line).await;
    }
    assert_eq!(engine.session().npcs.get("Orrin").unwrap().affinity, 1);
}

#[tokio::test]
async fn bare_talk_to_lists_without_registering() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;

    script.push_reply("Mara the Fishwife, none, Old Tam.");
    let turn = engine.handle_input("Talk To").await;
    assert_eq!(
        texts(&turn.outputs),
        vec!["You can talk to: Mara the Fishwife, Old Tam"]
    );

    script.push_reply("None");
    let turn = engine.handle_input("talk to").await;
    assert_eq!(texts(&turn.outputs), vec!["There's no one here to talk to."]);
    assert!(engine.session().npcs.is_empty());
    assert_eq!(engine.session().history.len(), 3);
}

#[tokio::test]
async fn examine_records_journal_and_description() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;

    script.push_reply("A brass key, green with age.");
    engine.handle_input("look at Brass Key").await;

    let session = engine.session();
    assert_eq!(session.player.journal, vec!["Examined Brass Key."]);
    assert_eq!(session.examined["Brass Key"], "A brass key, green with age.");
    assert_eq!(session.history.len(), 5);

    let turn = engine.handle_input("inspect").await;
    assert_eq!(texts(&turn.outputs), vec!["Usage: examine <object>"]);
    assert_eq!(engine.session().history.len(), 5);
}

#[tokio::test]
async fn local_commands_make_no_oracle_calls() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;
    let calls = script.call_count();

    let turn = engine.handle_input("roll str 5").await;
    assert!(turn.outputs[0].text().starts_with("Rolled 1d20"));

    let turn = engine.handle_input("roll luck").await;
    assert_eq!(texts(&turn.outputs), vec!["Unknown stat 'LUCK'."]);

    let turn = engine.handle_input("inventory").await;
    assert_eq!(texts(&turn.outputs), vec!["Inventory: Empty"]);

    let turn = engine.handle_input("stats").await;
    assert!(turn.outputs[0].text().starts_with(" STR: "));

    let turn = engine.handle_input("map").await;
    let map = turn.outputs[0].text();
    assert!(map.starts_with(&format!("Map for '{}':", START)));
    assert!(map.contains(&format!("No map connections for '{}'.", START)));
    assert!(map.contains("  Gulls wheel over a grey harbor."));

    let turn = engine.handle_input("set prune off").await;
    assert_eq!(texts(&turn.outputs), vec!["History summarization disabled."]);
    assert!(!engine.prune_enabled());

    engine.handle_input("journal").await;
    engine.handle_input("help").await;
    assert_eq!(script.call_count(), calls);
}

#[tokio::test]
async fn hint_is_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;

    script.push_reply("Try the lighthouse.");
    let turn = engine.handle_input("hint").await;

    assert_eq!(texts(&turn.outputs), vec!["Hint: Try the lighthouse."]);
    assert_eq!(engine.session().history.len(), 3);
    let request = script.last_request().unwrap();
    assert_eq!(
        request.last().unwrap().content,
        format!("I'm stuck at {}. Please give me a hint.", START)
    );
}

#[tokio::test]
async fn long_sessions_are_compacted_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;

    for i in 0..14 {
        let turn = engine.handle_input(&format!("whistle tune {i}")).await;
        assert_eq!(turn.outputs.len(), 1);
    }
    assert_eq!(engine.session().history.len(), 31);

    script.push_reply("The traveler whistled at length.");
    let turn = engine.handle_input("whistle once more").await;

    assert_eq!(
        turn.outputs[0],
        Output::Notice("[History pruned and summarized]".into())
    );
    let history = engine.session().history.messages();
    assert_eq!(history.len(), 13);
    assert_eq!(
        history[0].content,
        format!("{}The traveler whistled at length.", SUMMARY_PREFIX)
    );
    assert_eq!(history[10].content, DEFAULT_SCRIPTED_REPLY);
    assert_eq!(history[11], Message::user("whistle once more"));
}

#[tokio::test]
async fn history_grows_when_pruning_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;

    engine.handle_input("set prune off").await;
    for i in 0..20 {
        engine.handle_input(&format!("hum {i}")).await;
    }
    assert_eq!(engine.session().history.len(), 43);
}

#[tokio::test]
async fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;

    engine.handle_input("go to lighthouse").await;
    engine.handle_input("talk to Keeper Ansel").await;
    engine.handle_input("bye").await;
    let turn = engine.handle_input("save").await;
    assert!(matches!(&turn.outputs[0], Output::Notice(text) if text.starts_with("Game saved")));
    let saved = engine.session().clone();

    let mut restored = AdventureEngine::new(script.clone(), &config(dir.path())).unwrap();
    let outputs = restored.load_game().await.unwrap();

    let session = restored.session();
    assert_eq!(session.npcs, saved.npcs);
    assert_eq!(session.player, saved.player);
    assert_eq!(session.history, saved.history);
    assert_eq!(session.scenes, saved.scenes);
    assert_eq!(session.npcs.get("Keeper Ansel").unwrap().affinity, 1);
    assert_eq!(
        outputs.last(),
        Some(&Output::Narration(saved.history.last().unwrap().content.clone()))
    );
}

#[tokio::test]
async fn failed_load_keeps_the_current_game() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;
    let before = engine.session().clone();

    let turn = engine.handle_input("load").await;
    assert_eq!(texts(&turn.outputs), vec!["No save file found."]);
    assert_eq!(engine.session(), &before);

    std::fs::write(dir.path().join("savegame.json"), "{ broken").unwrap();
    let turn = engine.handle_input("load").await;
    assert!(matches!(&turn.outputs[0], Output::Warning(_)));
    assert_eq!(engine.session(), &before);
}

#[tokio::test]
async fn quit_finishes_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let script = ScriptedOracle::new();
    let mut engine = started(dir.path(), &script).await;

    let turn = engine.handle_input("  Stop ").await;
    assert!(turn.finished);
    assert_eq!(texts(&turn.outputs), vec!["Farewell, traveler!"]);
    assert!(engine.handle_input("   ").await.outputs.is_empty());
}
