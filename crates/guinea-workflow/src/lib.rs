//! Reaction-triggered thread provisioning for the Guinea party-recruitment bot.
//!
//! The crate is platform-neutral: every remote call goes through the
//! [`ChatPlatform`] trait, and the Discord adapter lives in
//! `guinea-discord-runtime`.

pub mod command_access;
pub mod config;
pub mod identity;
pub mod ids;
pub mod participants;
pub mod patch_notes;
pub mod platform;
pub mod provisioner;
pub mod trigger;

pub use command_access::{CommandAccess, COMMAND_CHANNEL_DENIED_TEXT};
pub use config::{parse_id_set, parse_optional_id, TriggerConfig, WorkflowSettings};
pub use identity::{
    base_channel_for, build_thread_name, resolve_display_name, resolve_mention,
    THREAD_NAME_MAX_CHARS,
};
pub use ids::{ChannelId, EmojiId, GuildId, MessageId, ThreadId, UserId};
pub use participants::{
    render_participant_list, CommandReply, NOT_IN_THREAD_TEXT, NO_PARTICIPANTS_YET_TEXT,
    ORIGIN_NOT_FOUND_TEXT, PARTICIPANTS_UNAVAILABLE_TEXT,
};
pub use patch_notes::{
    load_patch_notes, parse_note_date, render_patch_notes, PatchNote, PatchNoteField,
    PatchNotesError, PatchNotesView,
};
pub use platform::{
    call_with_timeout, ChannelInfo, ChannelKind, ChatPlatform, CreateThreadRequest,
    MemberProfile, MessageContext, MessageSnapshot, PlatformError, ReactionEmoji, ReactionEvent,
    ReactionSummary, ThreadRef, UserProfile,
};
pub use provisioner::{ProvisionFailure, ProvisionReport, ReactionOutcome, ThreadWorkflow};
pub use trigger::{evaluate, qualifies, screen_event, SkipReason};
