//! Host-facing wrapper around [`resolve`](super::resolve).
//!
//! The hook never lets a fault escape into the host's selection routine:
//! panics from the catalog or lookup are caught and turned into a
//! passthrough, and every fault is reported at most once per controller.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

use crate::grid::Position;
use crate::ports::{EventLog, Level, RuleCatalog};
use crate::rules::HostRule;

use super::{resolve, PairLookup, Passthrough, Resolution};

/// Fault-contained, logging resolution entry point.
pub struct ResolutionHook<'a> {
    log: &'a dyn EventLog,
    reported: Mutex<HashSet<(Position, String)>>,
}

impl<'a> ResolutionHook<'a> {
    /// Creates a hook reporting to `log`.
    pub fn new(log: &'a dyn EventLog) -> Self {
        Self { log, reported: Mutex::new(HashSet::new()) }
    }

    /// Resolves one selection event, containing any fault.
    pub fn resolve<L, C>(
        &self,
        lookup: &L,
        catalog: &C,
        controller: Position,
        default: &C::Rule,
        possible_inputs: &[String],
    ) -> Resolution<C::Rule>
    where
        L: PairLookup + ?Sized,
        C: RuleCatalog + ?Sized,
    {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            resolve(lookup, catalog, controller, default, possible_inputs)
        }));
        let resolution = attempt.unwrap_or_else(|payload| {
            Resolution::Default(Passthrough::Fault(panic_message(&*payload)))
        });
        self.report(controller, default, &resolution);
        resolution
    }

    /// Resolves and returns the rule the host should use.
    pub fn select<L, C>(
        &self,
        lookup: &L,
        catalog: &C,
        controller: Position,
        default: C::Rule,
        possible_inputs: &[String],
    ) -> C::Rule
    where
        L: PairLookup + ?Sized,
        C: RuleCatalog + ?Sized,
    {
        self.resolve(lookup, catalog, controller, &default, possible_inputs).into_rule(default)
    }

    /// Forgets which faults were reported so they are logged again.
    pub fn reset_reports(&self) {
        self.reported.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn report<R: HostRule>(&self, controller: Position, default: &R, resolution: &Resolution<R>) {
        match resolution {
            Resolution::Override(rule) => {
                if self.log.enabled(Level::Debug) {
                    self.log.debug(&format!(
                        "Controller {controller}: {} overrides {}",
                        rule.rule_id(),
                        default.rule_id()
                    ));
                }
            }
            Resolution::Default(Passthrough::NoLinkedNeighbor) => {
                if self.first_report(controller, "stale") {
                    self.log.warn(&format!(
                        "Active-pair cache lists {controller} but no neighbor is linked; rebuilding"
                    ));
                }
            }
            Resolution::Default(Passthrough::Dangling(id)) => {
                if self.first_report(controller, id.as_str()) {
                    self.log.warn(&format!(
                        "Preferred rule {id} at {controller} is not applicable; using {}",
                        default.rule_id()
                    ));
                }
            }
            Resolution::Default(Passthrough::Fault(message)) => {
                if self.first_report(controller, "fault") {
                    self.log.error(&format!(
                        "Resolution at {controller} failed: {message}; keeping default"
                    ));
                }
            }
            Resolution::Default(_) => {}
        }
    }

    fn first_report(&self, controller: Position, kind: &str) -> bool {
        self.reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((controller, kind.to_string()))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}
