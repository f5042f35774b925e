//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::grid::Position;
use crate::rules::RuleId;

/// Top-level CLI parser for `wheelpin`.
#[derive(Debug, Parser)]
#[command(
    name = "wheelpin",
    version,
    about = "Link device pairs and pin their preferred transformation rules"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
///
/// Positions are written `x,y,z`.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Link the devices at two positions.
    Link {
        /// First device.
        #[arg(allow_hyphen_values = true)]
        a: Position,
        /// Second device; its group survives a merge.
        #[arg(allow_hyphen_values = true)]
        b: Position,
    },
    /// Dissolve the group a device belongs to.
    Unlink {
        /// Any member of the group.
        #[arg(allow_hyphen_values = true)]
        position: Position,
    },
    /// Record the preferred rule for an input.
    Prefer {
        /// Any member of the group.
        #[arg(allow_hyphen_values = true)]
        position: Position,
        /// Input key.
        input: String,
        /// Preferred rule identifier.
        rule: RuleId,
    },
    /// Remove the preferred rule for an input.
    Clear {
        /// Any member of the group.
        #[arg(allow_hyphen_values = true)]
        position: Position,
        /// Input key.
        input: String,
    },
    /// Show linked groups, or the group of one device.
    Show {
        /// Device to show; all groups when omitted.
        #[arg(allow_hyphen_values = true)]
        position: Option<Position>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// List the devices a device can and cannot pair with.
    Targets {
        /// Origin device.
        #[arg(allow_hyphen_values = true)]
        position: Position,
    },
    /// Simulate an ambiguous selection at a controller position.
    Resolve {
        /// Controller (midpoint) position.
        #[arg(allow_hyphen_values = true)]
        controller: Position,
        /// The host's default pick; the first rule accepting the input when
        /// omitted.
        #[arg(long)]
        default: Option<RuleId>,
        /// Candidate input keys, in order.
        #[arg(long = "input", required = true, num_args = 1..)]
        inputs: Vec<String>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// List inputs whose rules disagree on outputs.
    Conflicts {
        /// Only show this input.
        input: Option<String>,
    },
    /// Audit the active-pair cache and stored links against the world.
    Check,
}
