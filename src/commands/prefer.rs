//! `wheelpin prefer` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::Position;
use crate::ports::RuleCatalog;
use crate::rules::RuleId;

use super::open_bridge;

/// Execute the `prefer` command.
///
/// The rule must be one the world considers applicable to `input`.
///
/// # Errors
///
/// Returns an error string if the rule does not accept the input, the
/// device is not linked, or loading or saving fails.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    position: Position,
    input: &str,
    rule: &RuleId,
) -> Result<(), String> {
    let mut bridge = open_bridge(ctx, settings)?;
    if bridge.world().find_applicable(input, rule).is_none() {
        return Err(format!("Rule {rule} does not accept input '{input}'"));
    }
    bridge
        .on_preference_set(position, input, rule.clone())
        .map_err(|e| format!("Cannot set preference: {e}"))?;
    bridge.save(&settings.store_path).map_err(|e| e.to_string())?;

    let group = bridge.store().group(position).map(|g| g.id.to_string()).unwrap_or_default();
    println!("Group {group}: {input} -> {rule}");
    if !bridge.world().conflicts().is_ambiguous(input) {
        println!("Note: '{input}' has only one distinct result; the preference has no effect yet.");
    }
    Ok(())
}
