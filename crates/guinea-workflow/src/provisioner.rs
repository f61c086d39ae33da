//! Reaction handling: trigger evaluation, thread creation, mapping persistence,
//! and confirmation notices.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use guinea_store::ThreadMapStore;
use tracing::{debug, error, info, warn};

use crate::config::{TriggerConfig, WorkflowSettings};
use crate::identity::{base_channel_for, build_thread_name, resolve_display_name, resolve_mention};
use crate::ids::{ChannelId, MessageId, UserId};
use crate::platform::{
    call_with_timeout, ChatPlatform, CreateThreadRequest, MemberProfile, MessageContext,
    PlatformError, ReactionEvent, ThreadRef, UserProfile,
};
use crate::trigger::{evaluate, screen_event, SkipReason};

/// Why thread creation was abandoned after the trigger qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionFailure {
    /// The bot lacks the grant to start threads in the base channel.
    Forbidden(PlatformError),
    Request(PlatformError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub thread: ThreadRef,
    pub origin_message_id: MessageId,
    pub base_channel_id: ChannelId,
    pub display_name: String,
    pub thread_name: String,
    pub mapping_persisted: bool,
    pub notifications_sent: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionOutcome {
    Skipped(SkipReason),
    Provisioned(ProvisionReport),
    Aborted(ProvisionFailure),
}

/// Shared state for reaction and command handling.
///
/// Holds the mapping store and the configuration; the platform is passed per
/// call so adapters can hand over whatever client the current event carries.
#[derive(Debug)]
pub struct ThreadWorkflow {
    config: TriggerConfig,
    settings: WorkflowSettings,
    store: Arc<ThreadMapStore>,
    in_flight: Mutex<HashSet<MessageId>>,
}

struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<MessageId>>,
    message_id: MessageId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.message_id);
    }
}

impl ThreadWorkflow {
    pub fn new(
        config: TriggerConfig,
        settings: WorkflowSettings,
        store: Arc<ThreadMapStore>,
    ) -> Self {
        Self {
            config,
            settings,
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn store(&self) -> &ThreadMapStore {
        &self.store
    }

    /// Entry point for a reaction-add event.
    pub async fn handle_reaction<P>(
        &self,
        platform: &P,
        event: &ReactionEvent,
        bot_user_id: Option<UserId>,
    ) -> ReactionOutcome
    where
        P: ChatPlatform + ?Sized,
    {
        if let Err(reason) = screen_event(event, &self.config, bot_user_id) {
            debug!(
                message_id = %event.message_id,
                reason = reason.as_str(),
                "reaction ignored"
            );
            return ReactionOutcome::Skipped(reason);
        }

        // Held across the fetch so a later claimant always sees fresh message state.
        let Some(_guard) = self.claim(event.message_id) else {
            debug!(
                message_id = %event.message_id,
                "thread creation already in flight for message"
            );
            return ReactionOutcome::Skipped(SkipReason::CreationInFlight);
        };

        let context = self.load_message_context(platform, event).await;
        if let Err(reason) = evaluate(event, &self.config, bot_user_id, context.as_ref()) {
            debug!(
                message_id = %event.message_id,
                channel_id = %event.channel_id,
                reason = reason.as_str(),
                "reaction did not qualify"
            );
            return ReactionOutcome::Skipped(reason);
        }
        let Some(context) = context else {
            return ReactionOutcome::Skipped(SkipReason::MessageUnavailable);
        };

        match self.provision(platform, &context, event).await {
            Ok(report) => ReactionOutcome::Provisioned(report),
            Err(failure) => ReactionOutcome::Aborted(failure),
        }
    }

    /// Creates the thread for a qualifying reaction and records the mapping.
    pub async fn provision<P>(
        &self,
        platform: &P,
        context: &MessageContext,
        event: &ReactionEvent,
    ) -> Result<ProvisionReport, ProvisionFailure>
    where
        P: ChatPlatform + ?Sized,
    {
        let (member, user) = self.resolve_reactor(platform, event).await;
        let display_name = resolve_display_name(event.user_id, member.as_ref(), user.as_ref());
        let mention = resolve_mention(event.user_id, member.as_ref());
        let thread_name = build_thread_name(&display_name);
        let base_channel_id = base_channel_for(&context.channel);
        let origin_message_id = context.message.id;

        let request = CreateThreadRequest {
            anchor_channel_id: base_channel_id,
            message_id: origin_message_id,
            name: thread_name.clone(),
            auto_archive_minutes: self.settings.auto_archive_minutes,
        };
        let created = call_with_timeout(
            "create_thread",
            self.settings.request_timeout,
            platform.create_thread(request),
        )
        .await;
        let thread = match created {
            Ok(thread) => thread,
            Err(error) if error.is_forbidden() => {
                warn!(
                    channel_id = %base_channel_id,
                    message_id = %origin_message_id,
                    error = %error,
                    "missing permission to create thread"
                );
                return Err(ProvisionFailure::Forbidden(error));
            }
            Err(error) => {
                log_request_failure(&error, base_channel_id, origin_message_id);
                return Err(ProvisionFailure::Request(error));
            }
        };

        let mapping_persisted = match self.store.record(thread.id.get(), origin_message_id.get()) {
            Ok(()) => true,
            Err(error) => {
                error!(
                    thread_id = %thread.id,
                    message_id = %origin_message_id,
                    error = %format!("{error:#}"),
                    "failed to persist thread mapping"
                );
                false
            }
        };
        info!(
            thread_id = %thread.id,
            message_id = %origin_message_id,
            channel_id = %base_channel_id,
            reactor_id = %event.user_id,
            "recruitment thread created"
        );

        let mut notifications_sent = 0;
        let in_thread = format!("{mention}님이 파티 모집 스레드를 시작했습니다!");
        if self.notify(platform, thread.id, &in_thread).await {
            notifications_sent += 1;
        }
        let in_base = format!(
            "{display_name}님의 파티 모집 스레드가 생성되었습니다: {}",
            thread.jump_url()
        );
        if self.notify(platform, base_channel_id, &in_base).await {
            notifications_sent += 1;
        }

        Ok(ProvisionReport {
            thread,
            origin_message_id,
            base_channel_id,
            display_name,
            thread_name,
            mapping_persisted,
            notifications_sent,
        })
    }

    async fn load_message_context<P>(
        &self,
        platform: &P,
        event: &ReactionEvent,
    ) -> Option<MessageContext>
    where
        P: ChatPlatform + ?Sized,
    {
        let timeout = self.settings.request_timeout;
        let channel = call_with_timeout(
            "fetch_channel",
            timeout,
            platform.fetch_channel(event.channel_id),
        )
        .await;
        let channel = match channel {
            Ok(channel) => channel,
            Err(error) => {
                debug!(channel_id = %event.channel_id, error = %error, "channel lookup failed");
                return None;
            }
        };
        let message = call_with_timeout(
            "fetch_message",
            timeout,
            platform.fetch_message(event.channel_id, event.message_id),
        )
        .await;
        match message {
            Ok(message) => Some(MessageContext { message, channel }),
            Err(error) => {
                debug!(message_id = %event.message_id, error = %error, "message lookup failed");
                None
            }
        }
    }

    async fn resolve_reactor<P>(
        &self,
        platform: &P,
        event: &ReactionEvent,
    ) -> (Option<MemberProfile>, Option<UserProfile>)
    where
        P: ChatPlatform + ?Sized,
    {
        let timeout = self.settings.request_timeout;
        let mut member = event.member.clone();
        if member.is_none() {
            if let Some(guild_id) = event.guild_id {
                member = call_with_timeout(
                    "fetch_member",
                    timeout,
                    platform.fetch_member(guild_id, event.user_id),
                )
                .await
                .map_err(|error| {
                    debug!(user_id = %event.user_id, error = %error, "member lookup missed");
                })
                .ok();
            }
        }
        if let Some(member) = member {
            let user = member.user.clone();
            return (Some(member), Some(user));
        }
        let user = call_with_timeout("fetch_user", timeout, platform.fetch_user(event.user_id))
            .await
            .map_err(|error| {
                debug!(user_id = %event.user_id, error = %error, "user lookup missed");
            })
            .ok();
        (None, user)
    }

    async fn notify<P>(&self, platform: &P, channel_id: ChannelId, content: &str) -> bool
    where
        P: ChatPlatform + ?Sized,
    {
        let sent = call_with_timeout(
            "send_message",
            self.settings.request_timeout,
            platform.send_message(channel_id, content),
        )
        .await;
        match sent {
            Ok(()) => true,
            Err(error) => {
                warn!(channel_id = %channel_id, error = %error, "failed to send thread notice");
                false
            }
        }
    }

    fn claim(&self, message_id: MessageId) -> Option<InFlightGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(message_id) {
            return None;
        }
        Some(InFlightGuard {
            in_flight: &self.in_flight,
            message_id,
        })
    }
}

fn log_request_failure(error: &PlatformError, channel_id: ChannelId, message_id: MessageId) {
    match error {
        PlatformError::Http {
            status,
            code,
            message,
        } => error!(
            channel_id = %channel_id,
            message_id = %message_id,
            status = *status,
            code = ?code,
            detail = %message,
            "thread creation request failed"
        ),
        other => error!(
            channel_id = %channel_id,
            message_id = %message_id,
            error = %other,
            "thread creation request failed"
        ),
    }
}
