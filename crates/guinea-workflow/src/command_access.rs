//! Channel allowlist for administrative and informational commands.

use std::collections::BTreeSet;

use crate::ids::ChannelId;

pub const COMMAND_CHANNEL_DENIED_TEXT: &str = "이 채널에서는 사용할 수 없는 명령입니다.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandAccess {
    channel_ids: BTreeSet<ChannelId>,
}

impl CommandAccess {
    pub fn new(channel_ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            channel_ids: channel_ids.into_iter().map(ChannelId::new).collect(),
        }
    }

    /// An empty allowlist leaves every channel authorized.
    pub fn is_authorized(&self, channel_id: ChannelId) -> bool {
        self.channel_ids.is_empty() || self.channel_ids.contains(&channel_id)
    }

    pub fn channel_ids(&self) -> &BTreeSet<ChannelId> {
        &self.channel_ids
    }
}
