//! Command dispatch and handlers.

pub mod check;
pub mod clear;
pub mod conflicts;
pub mod link;
pub mod prefer;
pub mod resolve;
pub mod show;
pub mod targets;
pub mod unlink;

use crate::adapters::live::LiveFileSystem;
use crate::cli::Command;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::host::HostBridge;
use crate::store::LinkGroupStore;
use crate::world::World;

/// Dispatch a parsed command to its handler.
///
/// Settings come from the environment and the optional config file; the
/// service context is live, logging to stderr at the configured level.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the selected
/// command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let settings = Settings::load(&LiveFileSystem).map_err(|e| e.to_string())?;
    let ctx = ServiceContext::live(settings.log_level);
    dispatch_with_context(command, &ctx, &settings)
}

/// Dispatch a command with the given service context and settings.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    settings: &Settings,
) -> Result<(), String> {
    match command {
        Command::Link { a, b } => link::run(ctx, settings, *a, *b),
        Command::Unlink { position } => unlink::run(ctx, settings, *position),
        Command::Prefer { position, input, rule } => {
            prefer::run(ctx, settings, *position, input, rule)
        }
        Command::Clear { position, input } => clear::run(ctx, settings, *position, input),
        Command::Show { position, json } => show::run(ctx, settings, *position, *json),
        Command::Targets { position } => targets::run(ctx, settings, *position),
        Command::Resolve { controller, default, inputs, json } => {
            resolve::run(ctx, settings, *controller, default.as_ref(), inputs, *json)
        }
        Command::Conflicts { input } => conflicts::run(ctx, settings, input.as_deref()),
        Command::Check => check::run(ctx, settings),
    }
}

/// Loads the persisted store (empty when none was saved yet).
fn open_store<'a>(
    ctx: &'a ServiceContext,
    settings: &Settings,
) -> Result<LinkGroupStore<'a>, String> {
    LinkGroupStore::load(ctx, settings.policy, &settings.store_path).map_err(|e| e.to_string())
}

fn open_world(ctx: &ServiceContext, settings: &Settings) -> Result<World, String> {
    World::load(ctx, &settings.world_path).map_err(|e| e.to_string())
}

fn open_bridge<'a>(
    ctx: &'a ServiceContext,
    settings: &Settings,
) -> Result<HostBridge<'a, World>, String> {
    let world = open_world(ctx, settings)?;
    HostBridge::load(ctx, world, settings.policy, &settings.store_path).map_err(|e| e.to_string())
}

/// Saves the store if a mutation left it dirty.
fn save_store(store: &mut LinkGroupStore<'_>, settings: &Settings) -> Result<(), String> {
    if store.is_dirty() {
        store.save(&settings.store_path).map_err(|e| e.to_string())?;
    }
    Ok(())
}
