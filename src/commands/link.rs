//! `wheelpin link` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::Position;
use crate::pairing::controller_position;
use crate::store::LinkOutcome;

use super::open_bridge;

/// Execute the `link` command.
///
/// # Errors
///
/// Returns an error string if the world or store cannot be loaded, the
/// link is rejected, or saving fails. A rejection carries the pairing
/// reason verbatim.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    a: Position,
    b: Position,
) -> Result<(), String> {
    let mut bridge = open_bridge(ctx, settings)?;
    let outcome =
        bridge.on_link_requested(a, b).map_err(|e| format!("Cannot link {a} and {b}: {e}"))?;
    bridge.save(&settings.store_path).map_err(|e| e.to_string())?;
    println!("{}", describe(&outcome, a, b));
    Ok(())
}

fn describe(outcome: &LinkOutcome, a: Position, b: Position) -> String {
    let controller = controller_position(a, b)
        .map(|c| format!(" (controller at {c})"))
        .unwrap_or_default();
    match outcome {
        LinkOutcome::Created(group) => format!("Linked {a} and {b} as group {group}{controller}"),
        LinkOutcome::Joined(group) => format!("Joined {a} and {b} in group {group}{controller}"),
        LinkOutcome::Merged { into, absorbed } => {
            format!("Merged group {absorbed} into {into}{controller}")
        }
        LinkOutcome::Unchanged(group) => format!("{a} and {b} are already linked in group {group}"),
    }
}
