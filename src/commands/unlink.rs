//! `wheelpin unlink` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::Position;

use super::{open_store, save_store};

/// Execute the `unlink` command.
///
/// Unlinking a device that is not linked is not an error.
///
/// # Errors
///
/// Returns an error string if the store cannot be loaded or saved.
pub fn run(ctx: &ServiceContext, settings: &Settings, position: Position) -> Result<(), String> {
    let mut store = open_store(ctx, settings)?;
    match store.unlink(position) {
        Some(dissolved) => {
            save_store(&mut store, settings)?;
            let released: Vec<String> =
                dissolved.released.iter().map(ToString::to_string).collect();
            println!(
                "Dissolved group {}: released {} ({} preference(s) dropped)",
                dissolved.group,
                released.join(", "),
                dissolved.preferences_dropped
            );
        }
        None => println!("Device at {position} is not linked."),
    }
    Ok(())
}
