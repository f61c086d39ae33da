//! Display-name, mention, and thread-name helpers for the provisioner.

use crate::ids::{ChannelId, UserId};
use crate::platform::{non_blank, ChannelInfo, MemberProfile, UserProfile};

/// Thread names are cut to this many characters, under the platform's 100 limit.
pub const THREAD_NAME_MAX_CHARS: usize = 90;

/// First non-blank of member display name, global name, account name, then `user-<id>`.
pub fn resolve_display_name(
    user_id: UserId,
    member: Option<&MemberProfile>,
    user: Option<&UserProfile>,
) -> String {
    member
        .and_then(MemberProfile::display_name)
        .or_else(|| user.and_then(|user| non_blank(user.global_name.as_deref())))
        .or_else(|| user.and_then(|user| non_blank(Some(user.name.as_str()))))
        .map(str::to_string)
        .unwrap_or_else(|| format!("user-{user_id}"))
}

/// Mention for the reacting user. Member and raw-user mentions share the `<@id>` form.
pub fn resolve_mention(user_id: UserId, member: Option<&MemberProfile>) -> String {
    match member {
        Some(member) => member.user.mention(),
        None => format!("<@{user_id}>"),
    }
}

pub fn build_thread_name(display_name: &str) -> String {
    let raw = format!("{display_name}님의 파티 모집 스레드 🎮");
    let flattened = raw.replace("\r\n", " ").replace(['\n', '\r'], " ");
    flattened
        .trim()
        .chars()
        .take(THREAD_NAME_MAX_CHARS)
        .collect()
}

/// Threads are started from the parent channel when the message lives in a thread.
pub fn base_channel_for(channel: &ChannelInfo) -> ChannelId {
    channel.parent_id.unwrap_or(channel.id)
}
