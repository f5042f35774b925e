//! `wheelpin conflicts` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::rules::ConflictIndex;

use super::open_world;

/// Execute the `conflicts` command.
///
/// # Errors
///
/// Returns an error string if the world cannot be loaded.
pub fn run(ctx: &ServiceContext, settings: &Settings, input: Option<&str>) -> Result<(), String> {
    let world = open_world(ctx, settings)?;
    println!("{}", render(world.conflicts(), input));
    Ok(())
}

fn render(index: &ConflictIndex, input: Option<&str>) -> String {
    if let Some(input) = input {
        if !index.is_ambiguous(input) {
            return format!("Input '{input}' is not ambiguous.");
        }
        let mut lines = vec![format!("Rules for '{input}':")];
        for conflict in index.conflicts_for(input) {
            lines.push(format!("  {}  -> {}", conflict.rule_id, conflict.outputs.join(", ")));
        }
        return lines.join("\n");
    }

    if index.is_empty() {
        return "No ambiguous inputs.".to_string();
    }
    let width = index.inputs().map(str::len).max().unwrap_or(5).max(5);
    let mut lines = vec![
        format!("{:<width$}  RULES", "INPUT"),
        format!("{:-<width$}  -----", ""),
    ];
    for name in index.inputs() {
        lines.push(format!("{name:<width$}  {}", index.conflicts_for(name).len()));
    }
    lines.push(format!("\n{} ambiguous input(s).", index.len()));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, RuleOutput};

    fn rule(id: &str, input: &str, item: &str) -> Rule {
        Rule {
            id: id.parse().unwrap(),
            inputs: vec![input.to_string()],
            outputs: vec![RuleOutput { item: item.to_string(), count: 1, chance: 1.0 }],
        }
    }

    fn index() -> ConflictIndex {
        ConflictIndex::build(&[
            rule("mod:recipe_a", "ore_raw", "gem"),
            rule("mod:recipe_b", "ore_raw", "dust"),
            rule("mod:smelt", "sand", "glass"),
        ])
    }

    #[test]
    fn table_lists_ambiguous_inputs() {
        let text = render(&index(), None);
        assert!(text.contains("ore_raw  2"));
        assert!(!text.contains("sand"));
        assert!(text.ends_with("1 ambiguous input(s)."));
    }

    #[test]
    fn single_input_lists_its_rules() {
        let text = render(&index(), Some("ore_raw"));
        assert!(text.starts_with("Rules for 'ore_raw':"));
        assert!(text.contains("  mod:recipe_a  -> "));
        assert!(text.contains("  mod:recipe_b  -> "));
        assert_eq!(render(&index(), Some("sand")), "Input 'sand' is not ambiguous.");
    }

    #[test]
    fn empty_index() {
        assert_eq!(render(&ConflictIndex::default(), None), "No ambiguous inputs.");
    }
}
