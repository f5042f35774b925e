//! `wheelpin check` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::pairing;
use crate::ports::RuleCatalog;
use crate::store::LinkGroupStore;
use crate::world::World;

use super::{open_store, open_world};

/// Problems found by `check`.
#[derive(Debug, Default)]
struct Findings {
    /// Cache or link problems; these fail the command.
    errors: Vec<String>,
    /// Preferences whose rule the world no longer offers.
    warnings: Vec<String>,
}

/// Execute the `check` command.
///
/// Audits the active-pair cache against a recomputation from the index,
/// then checks every stored link and preference against the world.
/// Dangling preferences are reported but kept.
///
/// # Errors
///
/// Returns an error string if loading fails or any cache or link problem is
/// found.
pub fn run(ctx: &ServiceContext, settings: &Settings) -> Result<(), String> {
    let store = open_store(ctx, settings)?;
    let world = open_world(ctx, settings)?;
    let findings = audit(&store, &world);

    for warning in &findings.warnings {
        println!("warning: {warning}");
    }
    for error in &findings.errors {
        println!("error: {error}");
    }
    if !findings.errors.is_empty() {
        return Err(format!("Check failed with {} problem(s)", findings.errors.len()));
    }
    println!(
        "OK: {} group(s), {} active controller(s), cache consistent.",
        store.groups().len(),
        store.cache().len()
    );
    Ok(())
}

fn audit(store: &LinkGroupStore<'_>, world: &World) -> Findings {
    let mut findings = Findings::default();

    let cache = store.audit_cache();
    for controller in &cache.missing {
        findings.errors.push(format!("controller {controller} missing from the active-pair cache"));
    }
    for controller in &cache.stale {
        findings.errors.push(format!("controller {controller} is active but has no pair"));
    }

    for group in store.groups() {
        let members: Vec<_> = group.members.iter().copied().collect();
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if !pairing::is_pair_geometry(*a, *b) {
                    continue;
                }
                if let Some(reason) = pairing::reason_invalid(world, *a, *b) {
                    findings.errors.push(format!("group {}: {a} and {b}: {reason}", group.id));
                }
            }
        }

        let mut preferences: Vec<_> = group.preferences.iter().collect();
        preferences.sort();
        for (input, rule) in preferences {
            if world.find_applicable(input, rule).is_none() {
                findings.warnings.push(format!(
                    "group {}: preferred rule {rule} for '{input}' is not applicable",
                    group.id
                ));
            }
        }
    }

    findings
}
