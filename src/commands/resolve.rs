//! `wheelpin resolve` command.

use serde::Serialize;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::Position;
use crate::host::HostBridge;
use crate::resolve::Resolution;
use crate::rules::{Rule, RuleId};
use crate::world::World;

use super::open_bridge;

/// Result of a simulated selection, as printed by `resolve --json`.
#[derive(Debug, Serialize)]
pub struct SelectionReport {
    /// Where the selection was raised.
    pub controller: Position,
    /// The host's default pick.
    pub default: RuleId,
    /// The rule the host ends up applying.
    pub selected: RuleId,
    /// Whether a preference replaced the default.
    pub overridden: bool,
    /// Why the default was kept, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Execute the `resolve` command.
///
/// Without `--default`, the host's default is the first rule in the world
/// accepting the first non-empty input.
///
/// # Errors
///
/// Returns an error string if the world or store cannot be loaded or the
/// default rule cannot be determined.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    controller: Position,
    default: Option<&RuleId>,
    inputs: &[String],
    json: bool,
) -> Result<(), String> {
    let mut bridge = open_bridge(ctx, settings)?;
    let report = simulate(&mut bridge, controller, default, inputs)?;
    if json {
        let encoded = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to encode JSON: {e}"))?;
        println!("{encoded}");
    } else {
        println!("{}", render_text(&report));
    }
    Ok(())
}

fn default_rule(
    world: &World,
    default: Option<&RuleId>,
    inputs: &[String],
) -> Result<Rule, String> {
    match default {
        Some(id) => world.rule(id).cloned().ok_or_else(|| format!("Unknown rule {id}")),
        None => {
            let input = inputs
                .iter()
                .find(|i| !i.is_empty())
                .ok_or_else(|| "No input given".to_string())?;
            world
                .default_rule(input)
                .cloned()
                .ok_or_else(|| format!("No rule accepts input '{input}'"))
        }
    }
}

fn simulate(
    bridge: &mut HostBridge<'_, World>,
    controller: Position,
    default: Option<&RuleId>,
    inputs: &[String],
) -> Result<SelectionReport, String> {
    let default = default_rule(bridge.world(), default, inputs)?;
    let resolution = bridge.explain_selection(controller, &default, inputs);
    let (selected, reason) = match resolution {
        Resolution::Override(rule) => (rule.id, None),
        Resolution::Default(why) => (default.id.clone(), Some(why.to_string())),
    };
    Ok(SelectionReport {
        controller,
        overridden: selected != default.id,
        default: default.id,
        selected,
        reason,
    })
}

fn render_text(report: &SelectionReport) -> String {
    match &report.reason {
        None => format!(
            "{}: {} (overrides {})",
            report.controller, report.selected, report.default
        ),
        Some(reason) => {
            format!("{}: {} (default kept: {reason})", report.controller, report.selected)
        }
    }
}
