//! Chat platform payloads and the request seam the workflow calls through.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::ids::{ChannelId, EmojiId, GuildId, MessageId, UserId};

/// Failure of a single platform request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("resource not found")]
    NotFound,
    #[error("missing permission: {detail}")]
    Forbidden { detail: String },
    #[error("request failed with status {status} (code {code:?}): {message}")]
    Http {
        status: u16,
        code: Option<i64>,
        message: String,
    },
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
    #[error("transport error: {0}")]
    Transport(String),
}

impl PlatformError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}

/// Runs one platform request under a deadline.
pub async fn call_with_timeout<T, F>(
    operation: &'static str,
    timeout: Duration,
    request: F,
) -> Result<T, PlatformError>
where
    F: Future<Output = Result<T, PlatformError>>,
{
    match tokio::time::timeout(timeout, request).await {
        Ok(result) => result,
        Err(_elapsed) => Err(PlatformError::Timeout {
            operation,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    /// Account name.
    pub name: String,
    pub global_name: Option<String>,
    pub bot: bool,
}

impl UserProfile {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub user: UserProfile,
    pub nick: Option<String>,
}

impl MemberProfile {
    /// In-guild display name: nickname, then global name, then account name.
    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.nick.as_deref())
            .or_else(|| non_blank(self.user.global_name.as_deref()))
            .or_else(|| non_blank(Some(self.user.name.as_str())))
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Thread,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub guild_id: Option<GuildId>,
    /// Parent channel of a thread. Always `None` for non-thread channels.
    pub parent_id: Option<ChannelId>,
    pub kind: ChannelKind,
}

impl ChannelInfo {
    pub fn is_thread(&self) -> bool {
        self.kind == ChannelKind::Thread
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionEmoji {
    Custom {
        id: EmojiId,
        name: Option<String>,
        animated: bool,
    },
    Unicode(String),
}

impl ReactionEmoji {
    pub fn custom_id(&self) -> Option<EmojiId> {
        match self {
            Self::Custom { id, .. } => Some(*id),
            Self::Unicode(_) => None,
        }
    }
}

/// One entry of a message's reaction summary list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionSummary {
    pub emoji: ReactionEmoji,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSnapshot {
    pub id: MessageId,
    pub channel_id: ChannelId,
    /// Thread already started from this message, if any.
    pub thread_id: Option<ChannelId>,
    pub reactions: Vec<ReactionSummary>,
}

/// A fetched message together with the channel it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    pub message: MessageSnapshot,
    pub channel: ChannelInfo,
}

/// A reaction-add event as delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub user_id: UserId,
    /// `None` for unicode emoji.
    pub emoji_id: Option<EmojiId>,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub guild_id: Option<GuildId>,
    pub member: Option<MemberProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateThreadRequest {
    pub anchor_channel_id: ChannelId,
    pub message_id: MessageId,
    pub name: String,
    pub auto_archive_minutes: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    pub id: ChannelId,
    pub guild_id: Option<GuildId>,
}

impl ThreadRef {
    pub fn jump_url(&self) -> String {
        match self.guild_id {
            Some(guild_id) => format!("https://discord.com/channels/{guild_id}/{}", self.id),
            None => format!("https://discord.com/channels/@me/{}", self.id),
        }
    }
}

#[async_trait]
/// Requests the workflow issues against the chat platform.
pub trait ChatPlatform: Send + Sync {
    async fn fetch_channel(&self, channel_id: ChannelId) -> Result<ChannelInfo, PlatformError>;

    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<MessageSnapshot, PlatformError>;

    async fn fetch_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<MemberProfile, PlatformError>;

    async fn fetch_user(&self, user_id: UserId) -> Result<UserProfile, PlatformError>;

    async fn create_thread(&self, request: CreateThreadRequest)
        -> Result<ThreadRef, PlatformError>;

    async fn send_message(&self, channel_id: ChannelId, content: &str)
        -> Result<(), PlatformError>;

    /// Every user currently reacting with `emoji` on the message.
    async fn reaction_users(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &ReactionEmoji,
    ) -> Result<Vec<UserProfile>, PlatformError>;
}
