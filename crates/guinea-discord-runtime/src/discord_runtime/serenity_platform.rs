//! `ChatPlatform` over serenity's HTTP client, plus payload conversions.

use std::sync::Arc;

use async_trait::async_trait;
use guinea_workflow::{
    ChannelId, ChannelInfo, ChannelKind, ChatPlatform, CreateThreadRequest, EmojiId, GuildId,
    MemberProfile, MessageId, MessageSnapshot, PlatformError, ReactionEmoji, ReactionEvent,
    ReactionSummary, ThreadRef, UserId, UserProfile,
};
use serenity::all::{
    AutoArchiveDuration, Channel, ChannelType, CreateThread, GuildChannel, Member, Message,
    PartialChannel, Reaction, ReactionType, User,
};
use serenity::http::{Http, HttpError};
use serenity::model::id as discord;

/// Discord returns at most this many reactors per page.
const REACTION_PAGE_SIZE: u8 = 100;
const MISSING_ACCESS_CODE: isize = 50_001;
const MISSING_PERMISSIONS_CODE: isize = 50_013;

pub(super) struct SerenityPlatform {
    http: Arc<Http>,
}

impl SerenityPlatform {
    pub(super) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    async fn fetch_channel(&self, channel_id: ChannelId) -> Result<ChannelInfo, PlatformError> {
        let channel = self
            .http
            .get_channel(discord::ChannelId::new(channel_id.get()))
            .await
            .map_err(platform_error)?;
        Ok(channel_info(&channel))
    }

    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<MessageSnapshot, PlatformError> {
        let message = self
            .http
            .get_message(
                discord::ChannelId::new(channel_id.get()),
                discord::MessageId::new(message_id.get()),
            )
            .await
            .map_err(platform_error)?;
        Ok(message_snapshot(&message))
    }

    async fn fetch_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<MemberProfile, PlatformError> {
        let member = self
            .http
            .get_member(
                discord::GuildId::new(guild_id.get()),
                discord::UserId::new(user_id.get()),
            )
            .await
            .map_err(platform_error)?;
        Ok(member_profile(&member))
    }

    async fn fetch_user(&self, user_id: UserId) -> Result<UserProfile, PlatformError> {
        let user = self
            .http
            .get_user(discord::UserId::new(user_id.get()))
            .await
            .map_err(platform_error)?;
        Ok(user_profile(&user))
    }

    async fn create_thread(
        &self,
        request: CreateThreadRequest,
    ) -> Result<ThreadRef, PlatformError> {
        let builder = CreateThread::new(request.name)
            .auto_archive_duration(archive_duration(request.auto_archive_minutes));
        let thread = discord::ChannelId::new(request.anchor_channel_id.get())
            .create_thread_from_message(
                self.http.as_ref(),
                discord::MessageId::new(request.message_id.get()),
                builder,
            )
            .await
            .map_err(platform_error)?;
        Ok(thread_ref(&thread))
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), PlatformError> {
        discord::ChannelId::new(channel_id.get())
            .say(self.http.as_ref(), content)
            .await
            .map(|_| ())
            .map_err(platform_error)
    }

    async fn reaction_users(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &ReactionEmoji,
    ) -> Result<Vec<UserProfile>, PlatformError> {
        let channel_id = discord::ChannelId::new(channel_id.get());
        let message_id = discord::MessageId::new(message_id.get());
        let reaction_type = reaction_type(emoji);
        let mut users = Vec::new();
        let mut after: Option<u64> = None;
        loop {
            let page = self
                .http
                .get_reaction_users(
                    channel_id,
                    message_id,
                    &reaction_type,
                    REACTION_PAGE_SIZE,
                    after,
                )
                .await
                .map_err(platform_error)?;
            let page_len = page.len();
            after = page.last().map(|user| user.id.get());
            users.extend(page.iter().map(user_profile));
            if page_len < usize::from(REACTION_PAGE_SIZE) || after.is_none() {
                break;
            }
        }
        Ok(users)
    }
}

pub(super) fn platform_error(error: serenity::Error) -> PlatformError {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => classify_http_failure(
            response.status_code.as_u16(),
            response.error.code,
            response.error.message,
        ),
        other => PlatformError::Transport(other.to_string()),
    }
}

pub(super) fn classify_http_failure(status: u16, code: isize, message: String) -> PlatformError {
    if status == 403 || code == MISSING_ACCESS_CODE || code == MISSING_PERMISSIONS_CODE {
        return PlatformError::Forbidden {
            detail: format!("{message} (status {status}, code {code})"),
        };
    }
    if status == 404 {
        return PlatformError::NotFound;
    }
    PlatformError::Http {
        status,
        code: i64::try_from(code).ok(),
        message,
    }
}

pub(super) fn archive_duration(minutes: u16) -> AutoArchiveDuration {
    match minutes {
        0..=60 => AutoArchiveDuration::OneHour,
        61..=1_440 => AutoArchiveDuration::OneDay,
        1_441..=4_320 => AutoArchiveDuration::ThreeDays,
        _ => AutoArchiveDuration::OneWeek,
    }
}

pub(super) fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread => {
            ChannelKind::Thread
        }
        ChannelType::Text | ChannelType::News => ChannelKind::Text,
        _ => ChannelKind::Other,
    }
}

/// Serenity reports a category as `parent_id` for plain text channels; only a
/// thread's parent counts here.
fn thread_parent(kind: ChannelKind, parent_id: Option<discord::ChannelId>) -> Option<ChannelId> {
    match kind {
        ChannelKind::Thread => parent_id.map(|id| ChannelId::new(id.get())),
        ChannelKind::Text | ChannelKind::Other => None,
    }
}

fn guild_channel_info(channel: &GuildChannel) -> ChannelInfo {
    let kind = channel_kind(channel.kind);
    ChannelInfo {
        id: ChannelId::new(channel.id.get()),
        guild_id: Some(GuildId::new(channel.guild_id.get())),
        parent_id: thread_parent(kind, channel.parent_id),
        kind,
    }
}

pub(super) fn channel_info(channel: &Channel) -> ChannelInfo {
    match channel {
        Channel::Guild(guild_channel) => guild_channel_info(guild_channel),
        other => ChannelInfo {
            id: ChannelId::new(other.id().get()),
            guild_id: None,
            parent_id: None,
            kind: ChannelKind::Other,
        },
    }
}

pub(super) fn partial_channel_info(
    channel: &PartialChannel,
    guild_id: Option<discord::GuildId>,
) -> ChannelInfo {
    let kind = channel_kind(channel.kind);
    ChannelInfo {
        id: ChannelId::new(channel.id.get()),
        guild_id: guild_id.map(|id| GuildId::new(id.get())),
        parent_id: thread_parent(kind, channel.parent_id),
        kind,
    }
}

fn thread_ref(thread: &GuildChannel) -> ThreadRef {
    ThreadRef {
        id: ChannelId::new(thread.id.get()),
        guild_id: Some(GuildId::new(thread.guild_id.get())),
    }
}

pub(super) fn user_profile(user: &User) -> UserProfile {
    UserProfile {
        id: UserId::new(user.id.get()),
        name: user.name.clone(),
        global_name: user.global_name.clone(),
        bot: user.bot,
    }
}

pub(super) fn member_profile(member: &Member) -> MemberProfile {
    MemberProfile {
        user: user_profile(&member.user),
        nick: member.nick.clone(),
    }
}

pub(super) fn reaction_emoji(reaction_type: &ReactionType) -> ReactionEmoji {
    match reaction_type {
        ReactionType::Custom { animated, id, name } => ReactionEmoji::Custom {
            id: EmojiId::new(id.get()),
            name: name.clone(),
            animated: *animated,
        },
        ReactionType::Unicode(value) => ReactionEmoji::Unicode(value.clone()),
        other => ReactionEmoji::Unicode(other.to_string()),
    }
}

pub(super) fn reaction_type(emoji: &ReactionEmoji) -> ReactionType {
    match emoji {
        ReactionEmoji::Custom { id, name, animated } => ReactionType::Custom {
            animated: *animated,
            id: discord::EmojiId::new(id.get()),
            name: name.clone(),
        },
        ReactionEmoji::Unicode(value) => ReactionType::Unicode(value.clone()),
    }
}

fn message_snapshot(message: &Message) -> MessageSnapshot {
    MessageSnapshot {
        id: MessageId::new(message.id.get()),
        channel_id: ChannelId::new(message.channel_id.get()),
        thread_id: message
            .thread
            .as_ref()
            .map(|thread| ChannelId::new(thread.id.get())),
        reactions: message
            .reactions
            .iter()
            .map(|reaction| ReactionSummary {
                emoji: reaction_emoji(&reaction.reaction_type),
                count: reaction.count,
            })
            .collect(),
    }
}

/// Converts a gateway reaction; events without a reacting user are dropped.
pub(super) fn reaction_event(reaction: &Reaction) -> Option<ReactionEvent> {
    let user_id = reaction.user_id?;
    Some(ReactionEvent {
        user_id: UserId::new(user_id.get()),
        emoji_id: reaction_emoji(&reaction.emoji).custom_id(),
        channel_id: ChannelId::new(reaction.channel_id.get()),
        message_id: MessageId::new(reaction.message_id.get()),
        guild_id: reaction.guild_id.map(|id| GuildId::new(id.get())),
        member: reaction.member.as_ref().map(member_profile),
    })
}
