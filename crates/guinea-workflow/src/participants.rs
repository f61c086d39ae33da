//! `참여자` command: lists the users currently reacting with the participate
//! emoji on a thread's origin message.

use tracing::{debug, warn};

use crate::ids::MessageId;
use crate::platform::{call_with_timeout, ChannelInfo, ChatPlatform};
use crate::provisioner::ThreadWorkflow;

pub const NOT_IN_THREAD_TEXT: &str = "이 명령은 스레드 내에서만 사용 가능합니다.";
pub const ORIGIN_NOT_FOUND_TEXT: &str =
    "님아. 혹시 기존 메세지를 삭제하셨나요? 스레드가 올바르게 생성됐는지 확인하세요.";
pub const PARTICIPANTS_UNAVAILABLE_TEXT: &str = "참여자 리스트를 불러올 수 없습니다.";
pub const NO_PARTICIPANTS_YET_TEXT: &str = "아직 참여자가 없습니다.";
const EMPTY_LIST_MARKER: &str = "없음";

/// Text reply to a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub content: String,
    /// Visible only to the invoking user.
    pub ephemeral: bool,
}

impl CommandReply {
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

pub fn render_participant_list(mentions: &[String]) -> String {
    let joined = mentions.join(" ");
    let listed = if joined.is_empty() {
        EMPTY_LIST_MARKER
    } else {
        joined.as_str()
    };
    format!("**현재 참여 인원:** {listed}")
}

impl ThreadWorkflow {
    /// Reads live reaction state for the thread the command was invoked in.
    pub async fn list_participants<P>(&self, platform: &P, channel: &ChannelInfo) -> CommandReply
    where
        P: ChatPlatform + ?Sized,
    {
        if !channel.is_thread() {
            return CommandReply::ephemeral(NOT_IN_THREAD_TEXT);
        }
        let Some(origin_message_id) = self.store().origin_for(channel.id.get()) else {
            debug!(thread_id = %channel.id, "no origin mapping for thread");
            return CommandReply::ephemeral(ORIGIN_NOT_FOUND_TEXT);
        };
        let origin_message_id = MessageId::new(origin_message_id);
        let Some(parent_id) = channel.parent_id else {
            warn!(thread_id = %channel.id, "thread has no parent channel");
            return CommandReply::ephemeral(PARTICIPANTS_UNAVAILABLE_TEXT);
        };

        let timeout = self.settings().request_timeout;
        let message = call_with_timeout(
            "fetch_message",
            timeout,
            platform.fetch_message(parent_id, origin_message_id),
        )
        .await;
        let message = match message {
            Ok(message) => message,
            Err(error) => {
                warn!(
                    thread_id = %channel.id,
                    message_id = %origin_message_id,
                    error = %error,
                    "failed to load origin message"
                );
                return CommandReply::ephemeral(PARTICIPANTS_UNAVAILABLE_TEXT);
            }
        };

        let Some(emoji_id) = self.config().emoji_id else {
            return CommandReply::public(NO_PARTICIPANTS_YET_TEXT);
        };
        let Some(summary) = message
            .reactions
            .iter()
            .find(|summary| summary.emoji.custom_id() == Some(emoji_id))
        else {
            return CommandReply::public(NO_PARTICIPANTS_YET_TEXT);
        };

        let users = call_with_timeout(
            "reaction_users",
            timeout,
            platform.reaction_users(parent_id, origin_message_id, &summary.emoji),
        )
        .await;
        match users {
            Ok(users) => {
                let mentions = users
                    .iter()
                    .filter(|user| !user.bot)
                    .map(|user| user.mention())
                    .collect::<Vec<_>>();
                CommandReply::public(render_participant_list(&mentions))
            }
            Err(error) => {
                warn!(
                    thread_id = %channel.id,
                    message_id = %origin_message_id,
                    error = %error,
                    "failed to enumerate reactors"
                );
                CommandReply::ephemeral(PARTICIPANTS_UNAVAILABLE_TEXT)
            }
        }
    }
}
