//! Neighbour and input selection for one selection event.

use crate::grid::Position;
use crate::rules::HostRule;

use super::PairLookup;

/// The first linked device adjacent to `controller`.
///
/// Neighbours are visited in [`Direction::ALL`](crate::grid::Direction::ALL)
/// order, so the choice is deterministic when both members of a pair are
/// linked (which is the normal case).
pub fn find_linked_neighbor<L: PairLookup + ?Sized>(
    lookup: &L,
    controller: Position,
) -> Option<Position> {
    controller.neighbors().find(|n| lookup.is_linked(*n))
}

/// The input key used for preference lookup: the first non-empty one the
/// pending rule accepts.
pub fn select_input<'i, R: HostRule + ?Sized>(
    pending: &R,
    possible_inputs: &'i [String],
) -> Option<&'i str> {
    possible_inputs
        .iter()
        .map(String::as_str)
        .find(|key| !key.is_empty() && pending.accepts_input(key))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::CountingLookup;
    use super::*;
    use crate::rules::{Rule, RuleId};

    #[test]
    fn neighbor_order_is_fixed() {
        let lookup = CountingLookup {
            linked: [
                (Position::new(0, 0, 0), Default::default()),
                (Position::new(2, 0, 0), Default::default()),
                (Position::new(1, -1, 0), Default::default()),
            ]
            .into_iter()
            .collect(),
            ..CountingLookup::default()
        };
        // Down is visited before West.
        assert_eq!(
            find_linked_neighbor(&lookup, Position::new(1, 0, 0)),
            Some(Position::new(1, -1, 0))
        );
    }

    #[test]
    fn no_linked_neighbor() {
        let lookup = CountingLookup::default();
        assert_eq!(find_linked_neighbor(&lookup, Position::new(1, 0, 0)), None);
    }

    #[test]
    fn first_non_empty_input_wins() {
        let id: RuleId = "mod:any".parse().unwrap();
        let keys = vec![String::new(), "ore".to_string(), "dust".to_string()];
        assert_eq!(select_input(&id, &keys), Some("ore"));
        assert_eq!(select_input(&id, &[]), None);
    }

    #[test]
    fn inputs_the_pending_rule_rejects_are_skipped() {
        let rule = Rule {
            id: "mod:crush".parse().unwrap(),
            inputs: vec!["dust".to_string()],
            outputs: vec![],
        };
        let keys = vec!["ore".to_string(), "dust".to_string()];
        assert_eq!(select_input(&rule, &keys), Some("dust"));
    }
}
