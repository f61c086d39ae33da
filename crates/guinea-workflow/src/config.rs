//! Trigger configuration and lenient parsing of identifier settings.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::ids::{ChannelId, EmojiId};

/// Parses an optional identifier setting; blank or malformed values mean unset.
pub fn parse_optional_id(raw: Option<&str>) -> Option<u64> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<u64>().ok())
}

/// Parses a comma- and/or whitespace-separated identifier list, dropping
/// tokens that are not integers.
pub fn parse_id_set(raw: Option<&str>) -> BTreeSet<u64> {
    raw.unwrap_or_default()
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<u64>().ok())
        .collect()
}

/// What qualifies a reaction as a thread trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerConfig {
    /// `None` disables the feature.
    pub emoji_id: Option<EmojiId>,
    /// `None` applies the feature to every channel.
    pub channel_id: Option<ChannelId>,
}

impl TriggerConfig {
    pub fn new(emoji_id: Option<u64>, channel_id: Option<u64>) -> Self {
        Self {
            emoji_id: emoji_id.map(EmojiId::new),
            channel_id: channel_id.map(ChannelId::new),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.emoji_id.is_some()
    }
}

/// Operational knobs for platform calls made by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub request_timeout: Duration,
    pub auto_archive_minutes: u16,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            auto_archive_minutes: 60,
        }
    }
}
