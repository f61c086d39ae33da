//! Discord gateway runtime for the Guinea bot.
//!
//! Bridges serenity's gateway events and HTTP client onto the platform-neutral
//! workflow in `guinea-workflow`.

mod discord_runtime;

pub use discord_runtime::{gateway_intents, run_discord_bot, DiscordRuntimeConfig};
