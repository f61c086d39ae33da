//! Command-line configuration surface for the Guinea bot.

mod bootstrap_helpers;
mod cli_args;

pub use bootstrap_helpers::init_tracing;
pub use cli_args::Cli;
