//! Location tracking and the player's map of how places connect.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::PlayerState;

/// Last generated description of each location
pub type SceneCache = BTreeMap<String, String>;

/// Undirected adjacency map of known locations
pub type MapGraph = BTreeMap<String, BTreeSet<String>>;

const BRANCH: &str = "├─ ";
const LAST_BRANCH: &str = "└─ ";
const PIPE: &str = "│  ";
const GAP: &str = "   ";

impl PlayerState {
    /// Move to `destination`, linking it to the current location.
    ///
    /// The first move of a game records no edge. Re-walking a known path is
    /// a no-op for the graph.
    pub fn move_to(&mut self, destination: &str) {
        if !self.current_location.is_empty() && self.current_location != destination {
            let from = self.current_location.clone();
            connect(&mut self.map_graph, &from, destination);
        }

        self.current_location = destination.to_string();
        if !self.visited_locations.iter().any(|v| v == destination) {
            self.visited_locations.push(destination.to_string());
        }
        log::debug!("Player is now at {}", destination);
    }
}

/// Insert the edge `a <-> b`
pub fn connect(graph: &mut MapGraph, a: &str, b: &str) {
    graph.entry(a.to_string()).or_default().insert(b.to_string());
    graph.entry(b.to_string()).or_default().insert(a.to_string());
}

/// Draw the graph as a tree rooted at `root`.
///
/// Returns `None` when `root` has no recorded connections. Each location
/// appears at most once; children are listed alphabetically.
pub fn render_tree(graph: &MapGraph, root: &str) -> Option<Vec<String>> {
    if graph.get(root).map_or(true, BTreeSet::is_empty) {
        return None;
    }

    let mut lines = vec![root.to_string()];
    let mut seen = BTreeSet::from([root.to_string()]);
    draw_children(graph, root, "", &mut seen, &mut lines);
    Some(lines)
}

fn draw_children(
    graph: &MapGraph,
    node: &str,
    prefix: &str,
    seen: &mut BTreeSet<String>,
    lines: &mut Vec<String>,
) {
    let Some(neighbours) = graph.get(node) else {
        return;
    };

    // Claim every child before descending so a sibling is never redrawn
    // inside another sibling's subtree.
    let children: Vec<&String> = neighbours.iter().filter(|n| !seen.contains(*n)).collect();
    for child in &children {
        seen.insert((*child).clone());
    }

    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        lines.push(format!(
            "{}{}{}",
            prefix,
            if last { LAST_BRANCH } else { BRANCH },
            child
        ));
        let next_prefix = format!("{}{}", prefix, if last { GAP } else { PIPE });
        draw_children(graph, child, &next_prefix, seen, lines);
    }
}

/// Cardinal direction words that count as movement on their own
pub fn cardinal(token: &str) -> Option<&'static str> {
    match token.to_ascii_lowercase().as_str() {
        "north" => Some("North"),
        "south" => Some("South"),
        "east" => Some("East"),
        "west" => Some("West"),
        _ => None,
    }
}

/// Text for the `map` command
pub fn describe_map(player: &PlayerState, scenes: &SceneCache, target: &str) -> Vec<String> {
    let mut lines = vec![format!("Map for '{}':", target)];

    if player.visited_locations.is_empty() {
        lines.push("No visited locations yet.".to_string());
    } else {
        lines.push(format!("Visited: {}", player.visited_locations.join(", ")));
    }

    match render_tree(&player.map_graph, target) {
        Some(tree) => lines.extend(tree),
        None => lines.push(format!("No map connections for '{}'.", target)),
    }

    if let Some(scene) = scenes.get(target) {
        lines.push(String::new());
        lines.push(format!("Details for '{}':", target));
        lines.extend(scene.lines().map(|line| format!("  {}", line)));
    }
    lines
}
