use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use guinea_discord_runtime::DiscordRuntimeConfig;
use guinea_workflow::{
    parse_id_set, parse_optional_id, CommandAccess, TriggerConfig, WorkflowSettings,
};

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_archive_minutes(value: &str) -> Result<u16, String> {
    let parsed = value
        .parse::<u16>()
        .map_err(|error| format!("failed to parse minutes: {error}"))?;
    if !matches!(parsed, 60 | 1_440 | 4_320 | 10_080) {
        return Err("value must be one of 60, 1440, 4320, 10080".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "guinea-bot",
    about = "Discord party-recruitment bot: reaction-triggered threads and participant lists",
    version
)]
pub struct Cli {
    #[arg(
        long = "discord-token",
        env = "DISCORD_TOKEN",
        hide_env_values = true,
        help = "Discord bot token"
    )]
    pub discord_token: String,

    // Identifier settings stay strings so malformed values degrade to "unset"
    // instead of aborting startup.
    #[arg(
        long = "trigger-channel-id",
        env = "TRIGGER_CHANNEL_ID",
        help = "Channel (and its threads) where reactions start recruitment threads"
    )]
    pub trigger_channel_id: Option<String>,

    #[arg(
        long = "participate-emoji-id",
        env = "PARTICIPATE_EMOJI_ID",
        help = "Custom emoji id that starts threads; unset disables thread creation"
    )]
    pub participate_emoji_id: Option<String>,

    #[arg(
        long = "command-channel-ids",
        env = "COMMAND_CHANNEL_IDS",
        help = "Channel ids allowed to run informational commands; empty allows all"
    )]
    pub command_channel_ids: Option<String>,

    #[arg(
        long = "thread-map-path",
        env = "GUINEA_THREAD_MAP_PATH",
        default_value = "thread_map.json",
        help = "JSON file mapping created thread ids to their origin message ids"
    )]
    pub thread_map_path: PathBuf,

    #[arg(
        long = "patch-notes-path",
        env = "GUINEA_PATCH_NOTES_PATH",
        default_value = "update_log.json",
        help = "JSON list of {date, desc} entries shown by the update command"
    )]
    pub patch_notes_path: PathBuf,

    #[arg(
        long = "request-timeout-ms",
        env = "GUINEA_REQUEST_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Deadline for each Discord request issued by the workflow"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "auto-archive-minutes",
        env = "GUINEA_AUTO_ARCHIVE_MINUTES",
        default_value_t = 60,
        value_parser = parse_archive_minutes,
        help = "Inactivity period after which created threads are archived"
    )]
    pub auto_archive_minutes: u16,
}

impl Cli {
    pub fn trigger_config(&self) -> TriggerConfig {
        TriggerConfig::new(
            parse_optional_id(self.participate_emoji_id.as_deref()),
            parse_optional_id(self.trigger_channel_id.as_deref()),
        )
    }

    pub fn command_access(&self) -> CommandAccess {
        CommandAccess::new(parse_id_set(self.command_channel_ids.as_deref()))
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            auto_archive_minutes: self.auto_archive_minutes,
        }
    }

    pub fn runtime_config(&self) -> DiscordRuntimeConfig {
        DiscordRuntimeConfig {
            token: self.discord_token.trim().to_string(),
            trigger: self.trigger_config(),
            settings: self.workflow_settings(),
            command_access: self.command_access(),
            thread_map_path: self.thread_map_path.clone(),
            patch_notes_path: self.patch_notes_path.clone(),
        }
    }
}
