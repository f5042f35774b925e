//! `wheelpin targets` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::grid::Position;
use crate::pairing::{controller_position, find_invalid_targets, find_valid_targets, reason_invalid};
use crate::ports::DeviceView;
use crate::store::LinkGroupStore;
use crate::world::World;

use super::{open_store, open_world};

/// Execute the `targets` command.
///
/// # Errors
///
/// Returns an error string if the world or store cannot be loaded, or no
/// pairable device stands at `position`.
pub fn run(ctx: &ServiceContext, settings: &Settings, position: Position) -> Result<(), String> {
    let world = open_world(ctx, settings)?;
    let store = open_store(ctx, settings)?;
    println!("{}", render(&world, &store, position, settings.search_radius)?);
    Ok(())
}

fn render(
    world: &World,
    store: &LinkGroupStore<'_>,
    origin: Position,
    radius: i32,
) -> Result<String, String> {
    let Some(axis) = world.rotation_axis(origin) else {
        return Err(format!("No pairable device at {origin}"));
    };
    let linked = |p: Position| if store.is_linked(p) { " [linked]" } else { "" };

    let valid = find_valid_targets(world, origin);
    let invalid = find_invalid_targets(world, origin, &valid, radius);

    let mut lines = vec![format!("Device at {origin} (axis {axis}){}", linked(origin))];
    if valid.is_empty() {
        lines.push("No valid targets.".to_string());
    } else {
        lines.push("Valid targets:".to_string());
        for target in &valid {
            let controller = controller_position(origin, *target)
                .map(|c| format!(" (controller at {c})"))
                .unwrap_or_default();
            lines.push(format!("  {target}{controller}{}", linked(*target)));
        }
    }
    if !invalid.is_empty() {
        lines.push(format!("Invalid devices within {radius}:"));
        for target in &invalid {
            let reason = reason_invalid(world, origin, *target)
                .map_or_else(String::new, |r| format!(": {r}"));
            lines.push(format!("  {target}{reason}"));
        }
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::context;
    use super::*;
    use crate::grid::Axis;
    use crate::store::LinkPolicy;
    use crate::world::{DeviceRecord, WorldFile};

    fn world() -> World {
        let devices = [
            ((0, 0, 0), Axis::Y),
            ((2, 0, 0), Axis::Y),
            ((0, 2, 0), Axis::Y),
            ((1, 0, 1), Axis::Y),
        ]
        .into_iter()
        .map(|((x, y, z), axis)| DeviceRecord { position: Position::new(x, y, z), axis })
        .collect();
        World::from_file(WorldFile { devices, rules: vec![] })
    }

    #[test]
    fn lists_valid_and_invalid_targets_with_reasons() {
        let ctx = context();
        let store = LinkGroupStore::new(&ctx, LinkPolicy::Pairwise);
        let text = render(&world(), &store, Position::new(0, 0, 0), 3).unwrap();

        assert!(text.starts_with("Device at 0,0,0 (axis y)"));
        assert!(text.contains("  2,0,0 (controller at 1,0,0)"));
        assert!(text.contains(
            "  0,2,0: devices are aligned along their rotation axis (y) - must be perpendicular"
        ));
        assert!(text.contains("  1,0,1: devices are not in a straight line along one axis"));
    }

    #[test]
    fn linked_devices_are_marked() {
        let ctx = context();
        let world = world();
        let mut store = LinkGroupStore::new(&ctx, LinkPolicy::Pairwise);
        store.link(&world, Position::new(0, 0, 0), Position::new(2, 0, 0)).unwrap();
        let text = render(&world, &store, Position::new(0, 0, 0), 3).unwrap();
        assert!(text.contains("(axis y) [linked]"));
        assert!(text.contains("(controller at 1,0,0) [linked]"));
    }

    #[test]
    fn empty_position_is_an_error() {
        let ctx = context();
        let store = LinkGroupStore::new(&ctx, LinkPolicy::Pairwise);
        let err = render(&world(), &store, Position::new(7, 7, 7), 3).unwrap_err();
        assert_eq!(err, "No pairable device at 7,7,7");
    }
}
