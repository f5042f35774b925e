//! `wheelpin clear` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::Position;

use super::{open_store, save_store};

/// Execute the `clear` command.
///
/// # Errors
///
/// Returns an error string if the store cannot be loaded or saved.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    position: Position,
    input: &str,
) -> Result<(), String> {
    let mut store = open_store(ctx, settings)?;
    if store.clear_preference(position, input) {
        save_store(&mut store, settings)?;
        println!("Cleared preference for '{input}' at {position}.");
    } else {
        println!("No preference for '{input}' at {position}.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, settings};
    use super::super::{link, open_store, prefer};
    use super::*;

    #[test]
    fn clears_a_saved_preference() {
        let ctx = context();
        let settings = settings();
        link::run(&ctx, &settings, Position::new(0, 0, 0), Position::new(2, 0, 0)).unwrap();
        prefer::run(
            &ctx,
            &settings,
            Position::new(0, 0, 0),
            "ore_raw",
            &"mod:recipe_b".parse().unwrap(),
        )
        .unwrap();

        run(&ctx, &settings, Position::new(2, 0, 0), "ore_raw").unwrap();

        let store = open_store(&ctx, &settings).unwrap();
        assert!(store.preference(Position::new(0, 0, 0), "ore_raw").is_none());
        assert!(store.is_linked(Position::new(0, 0, 0)));
    }

    #[test]
    fn clearing_nothing_is_not_an_error() {
        let ctx = context();
        assert!(run(&ctx, &settings(), Position::new(0, 0, 0), "ore_raw").is_ok());
    }
}
