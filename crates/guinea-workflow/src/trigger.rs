//! Decides whether a reaction event should start a recruitment thread.

use crate::config::TriggerConfig;
use crate::ids::UserId;
use crate::platform::{MessageContext, ReactionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SelfReaction,
    FeatureDisabled,
    EmojiMismatch,
    MessageUnavailable,
    ChannelNotEligible,
    ThreadAlreadyExists,
    CreationInFlight,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelfReaction => "self_reaction",
            Self::FeatureDisabled => "feature_disabled",
            Self::EmojiMismatch => "emoji_mismatch",
            Self::MessageUnavailable => "message_unavailable",
            Self::ChannelNotEligible => "channel_not_eligible",
            Self::ThreadAlreadyExists => "thread_already_exists",
            Self::CreationInFlight => "creation_in_flight",
        }
    }
}

/// Checks that need nothing beyond the event itself.
pub fn screen_event(
    event: &ReactionEvent,
    config: &TriggerConfig,
    bot_user_id: Option<UserId>,
) -> Result<(), SkipReason> {
    if bot_user_id == Some(event.user_id) {
        return Err(SkipReason::SelfReaction);
    }
    let Some(expected) = config.emoji_id else {
        return Err(SkipReason::FeatureDisabled);
    };
    if event.emoji_id != Some(expected) {
        return Err(SkipReason::EmojiMismatch);
    }
    Ok(())
}

/// Full evaluation. `message` is `None` when the target message could not be fetched.
pub fn evaluate(
    event: &ReactionEvent,
    config: &TriggerConfig,
    bot_user_id: Option<UserId>,
    message: Option<&MessageContext>,
) -> Result<(), SkipReason> {
    screen_event(event, config, bot_user_id)?;
    let Some(context) = message else {
        return Err(SkipReason::MessageUnavailable);
    };
    if let Some(trigger_channel) = config.channel_id {
        let channel = &context.channel;
        if channel.id != trigger_channel && channel.parent_id != Some(trigger_channel) {
            return Err(SkipReason::ChannelNotEligible);
        }
    }
    if context.message.thread_id.is_some() {
        return Err(SkipReason::ThreadAlreadyExists);
    }
    Ok(())
}

pub fn qualifies(
    event: &ReactionEvent,
    config: &TriggerConfig,
    bot_user_id: Option<UserId>,
    message: Option<&MessageContext>,
) -> bool {
    evaluate(event, config, bot_user_id, message).is_ok()
}
