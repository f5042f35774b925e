//! `wheelpin show` command.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::Position;
use crate::pairing::{controller_position, is_pair_geometry};
use crate::rules::RuleId;
use crate::store::{GroupId, LinkGroup, LinkGroupStore};

use super::open_store;

/// A group as printed by `show --json`.
#[derive(Debug, Serialize)]
pub struct GroupSummary {
    /// Group identifier.
    pub group: GroupId,
    /// Members in position order.
    pub members: Vec<Position>,
    /// Controller positions of the member pairs.
    pub controllers: Vec<Position>,
    /// Preferences sorted by input.
    pub preferences: BTreeMap<String, RuleId>,
}

impl GroupSummary {
    fn of(group: &LinkGroup) -> Self {
        let members: Vec<Position> = group.members.iter().copied().collect();
        let mut controllers = Vec::new();
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if is_pair_geometry(*a, *b) {
                    controllers.extend(controller_position(*a, *b));
                }
            }
        }
        Self {
            group: group.id.clone(),
            members,
            controllers,
            preferences: group.preferences.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }
}

/// Execute the `show` command.
///
/// With a position, shows that device's group; otherwise every group.
///
/// # Errors
///
/// Returns an error string if the store cannot be loaded or JSON encoding
/// fails.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    position: Option<Position>,
    json: bool,
) -> Result<(), String> {
    let store = open_store(ctx, settings)?;
    let output = if json { render_json(&store, position)? } else { render_text(&store, position) };
    println!("{output}");
    Ok(())
}

fn summaries(store: &LinkGroupStore<'_>, position: Option<Position>) -> Vec<GroupSummary> {
    match position {
        Some(p) => store.group(p).map(GroupSummary::of).into_iter().collect(),
        None => store.groups().into_iter().map(GroupSummary::of).collect(),
    }
}

fn render_json(store: &LinkGroupStore<'_>, position: Option<Position>) -> Result<String, String> {
    let groups = summaries(store, position);
    let result = match position {
        Some(_) => serde_json::to_string_pretty(&groups.first()),
        None => serde_json::to_string_pretty(&groups),
    };
    result.map_err(|e| format!("Failed to encode JSON: {e}"))
}

fn render_text(store: &LinkGroupStore<'_>, position: Option<Position>) -> String {
    let groups = summaries(store, position);
    if groups.is_empty() {
        return match position {
            Some(p) => format!("Device at {p} is not linked."),
            None => "No linked devices.".to_string(),
        };
    }

    let mut lines = Vec::new();
    for summary in &groups {
        let members: Vec<String> = summary.members.iter().map(ToString::to_string).collect();
        let controllers: Vec<String> =
            summary.controllers.iter().map(ToString::to_string).collect();
        lines.push(format!("Group {}", summary.group));
        lines.push(format!("  Members: {}", members.join("  ")));
        if !controllers.is_empty() {
            lines.push(format!("  Controllers: {}", controllers.join("  ")));
        }
        if summary.preferences.is_empty() {
            lines.push("  No preferences.".to_string());
        } else {
            lines.push("  Preferences:".to_string());
            let width = summary.preferences.keys().map(String::len).max().unwrap_or(0);
            for (input, rule) in &summary.preferences {
                lines.push(format!("    {input:<width$}  -> {rule}"));
            }
        }
    }

    if position.is_none() {
        lines.push(format!(
            "\n{} group(s), {} linked device(s), {} active controller(s).",
            groups.len(),
            store.linked_count(),
            store.cache().len()
        ));
    }
    lines.join("\n")
}
