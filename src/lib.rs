//! Linked device pairs and their pinned transformation rules.
//!
//! A host engine picks one of several equally valid rules whenever an input
//! is ambiguous. `wheelpin` lets a user link two devices into a pair, record
//! a preferred rule per input for that pair, and substitutes the preference
//! whenever the host raises an ambiguous selection between them.
//!
//! - [`pairing`] decides which positions may form a pair.
//! - [`store`] keeps link groups, their preferences and the active-pair
//!   cache.
//! - [`resolve`] turns a selection event into an override or a passthrough.
//! - [`host`] and [`shared`] are the integration surfaces.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod grid;
pub mod host;
pub mod pairing;
pub mod ports;
pub mod resolve;
pub mod rules;
pub mod shared;
pub mod store;
pub mod world;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}
