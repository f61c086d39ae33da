use std::{collections::HashMap, path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use guinea_store::ThreadMapStore;
use guinea_workflow::{
    ChannelId, ChannelInfo, ChannelKind, ChatPlatform, CreateThreadRequest, EmojiId, GuildId,
    MemberProfile, MessageId, MessageSnapshot, PlatformError, ProvisionFailure, ReactionEmoji,
    ReactionEvent, ReactionOutcome, ReactionSummary, SkipReason, ThreadRef, ThreadWorkflow,
    TriggerConfig, UserId, UserProfile, WorkflowSettings, NOT_IN_THREAD_TEXT,
    NO_PARTICIPANTS_YET_TEXT, ORIGIN_NOT_FOUND_TEXT, PARTICIPANTS_UNAVAILABLE_TEXT,
};
use tokio::sync::Mutex as AsyncMutex;

const GUILD: GuildId = GuildId::new(9);
const BOT: UserId = UserId::new(1);
const TRIGGER_CHANNEL: ChannelId = ChannelId::new(100);
const ORIGIN: MessageId = MessageId::new(500);
const PARTICIPATE_EMOJI: u64 = 555;

#[derive(Default)]
struct PlatformState {
    channels: HashMap<ChannelId, ChannelInfo>,
    messages: HashMap<MessageId, MessageSnapshot>,
    members: HashMap<UserId, MemberProfile>,
    users: HashMap<UserId, UserProfile>,
    reactors: HashMap<MessageId, Vec<UserProfile>>,
    created_threads: Vec<CreateThreadRequest>,
    sent: Vec<(ChannelId, String)>,
    message_fetches: usize,
    reaction_reads: usize,
    deny_thread_creation: bool,
    create_delay: Option<Duration>,
    /// Delays the nth message fetch after its snapshot is taken.
    slow_message_fetch: Option<(usize, Duration)>,
    next_thread_id: u64,
}

/// In-memory platform that behaves like a single guild.
struct ScriptedPlatform {
    state: AsyncMutex<PlatformState>,
}

impl ScriptedPlatform {
    fn new() -> Self {
        Self {
            state: AsyncMutex::new(PlatformState {
                next_thread_id: 1_000,
                ..PlatformState::default()
            }),
        }
    }

    async fn add_channel(&self, id: ChannelId, parent_id: Option<ChannelId>) {
        let kind = if parent_id.is_some() {
            ChannelKind::Thread
        } else {
            ChannelKind::Text
        };
        self.state.lock().await.channels.insert(
            id,
            ChannelInfo {
                id,
                guild_id: Some(GUILD),
                parent_id,
                kind,
            },
        );
    }

    async fn add_message(&self, id: MessageId, channel_id: ChannelId) {
        self.state.lock().await.messages.insert(
            id,
            MessageSnapshot {
                id,
                channel_id,
                thread_id: None,
                reactions: vec![ReactionSummary {
                    emoji: participate_emoji(),
                    count: 1,
                }],
            },
        );
    }

    async fn thread_requests(&self) -> Vec<CreateThreadRequest> {
        self.state.lock().await.created_threads.clone()
    }

    async fn sent(&self) -> Vec<(ChannelId, String)> {
        self.state.lock().await.sent.clone()
    }
}

#[async_trait]
impl ChatPlatform for ScriptedPlatform {
    async fn fetch_channel(&self, channel_id: ChannelId) -> Result<ChannelInfo, PlatformError> {
        self.state
            .lock()
            .await
            .channels
            .get(&channel_id)
            .cloned()
            .ok_or(PlatformError::NotFound)
    }

    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<MessageSnapshot, PlatformError> {
        let (snapshot, delay) = {
            let mut state = self.state.lock().await;
            state.message_fetches += 1;
            let snapshot = state
                .messages
                .get(&message_id)
                .filter(|message| message.channel_id == channel_id)
                .cloned()
                .ok_or(PlatformError::NotFound);
            let delay = state
                .slow_message_fetch
                .filter(|(nth, _)| *nth == state.message_fetches)
                .map(|(_, delay)| delay);
            (snapshot, delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        snapshot
    }

    async fn fetch_member(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
    ) -> Result<MemberProfile, PlatformError> {
        self.state
            .lock()
            .await
            .members
            .get(&user_id)
            .cloned()
            .ok_or(PlatformError::NotFound)
    }

    async fn fetch_user(&self, user_id: UserId) -> Result<UserProfile, PlatformError> {
        self.state
            .lock()
            .await
            .users
            .get(&user_id)
            .cloned()
            .ok_or(PlatformError::NotFound)
    }

    async fn create_thread(
        &self,
        request: CreateThreadRequest,
    ) -> Result<ThreadRef, PlatformError> {
        let delay = self.state.lock().await.create_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().await;
        if state.deny_thread_creation {
            return Err(PlatformError::Forbidden {
                detail: "Missing Permissions".to_string(),
            });
        }
        let thread_id = ChannelId::new(state.next_thread_id);
        let Some(message) = state.messages.get_mut(&request.message_id) else {
            return Err(PlatformError::NotFound);
        };
        if message.thread_id.is_some() {
            return Err(PlatformError::Http {
                status: 400,
                code: Some(160_004),
                message: "A thread has already been created for this message".to_string(),
            });
        }
        message.thread_id = Some(thread_id);
        state.next_thread_id += 1;
        state.channels.insert(
            thread_id,
            ChannelInfo {
                id: thread_id,
                guild_id: Some(GUILD),
                parent_id: Some(request.anchor_channel_id),
                kind: ChannelKind::Thread,
            },
        );
        state.created_threads.push(request);
        Ok(ThreadRef {
            id: thread_id,
            guild_id: Some(GUILD),
        })
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), PlatformError> {
        self.state
            .lock()
            .await
            .sent
            .push((channel_id, content.to_string()));
        Ok(())
    }

    async fn reaction_users(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        emoji: &ReactionEmoji,
    ) -> Result<Vec<UserProfile>, PlatformError> {
        let mut state = self.state.lock().await;
        state.reaction_reads += 1;
        if emoji.custom_id() != Some(EmojiId::new(PARTICIPATE_EMOJI)) {
            return Ok(Vec::new());
        }
        Ok(state.reactors.get(&message_id).cloned().unwrap_or_default())
    }
}

fn participate_emoji() -> ReactionEmoji {
    ReactionEmoji::Custom {
        id: EmojiId::new(PARTICIPATE_EMOJI),
        name: Some("join".to_string()),
        animated: false,
    }
}

fn user(id: u64, name: &str, bot: bool) -> UserProfile {
    UserProfile {
        id: UserId::new(id),
        name: name.to_string(),
        global_name: None,
        bot,
    }
}

fn member(id: u64, nick: &str) -> MemberProfile {
    MemberProfile {
        user: user(id, "account", false),
        nick: Some(nick.to_string()),
    }
}

fn reaction(user_id: u64, emoji: u64, member: Option<MemberProfile>) -> ReactionEvent {
    ReactionEvent {
        user_id: UserId::new(user_id),
        emoji_id: Some(EmojiId::new(emoji)),
        channel_id: TRIGGER_CHANNEL,
        message_id: ORIGIN,
        guild_id: Some(GUILD),
        member,
    }
}

fn workflow(map_path: &Path) -> ThreadWorkflow {
    ThreadWorkflow::new(
        TriggerConfig::new(Some(PARTICIPATE_EMOJI), Some(TRIGGER_CHANNEL.get())),
        WorkflowSettings {
            request_timeout: Duration::from_secs(2),
            auto_archive_minutes: 60,
        },
        Arc::new(ThreadMapStore::load(map_path)),
    )
}

async fn trigger_channel_platform() -> ScriptedPlatform {
    let platform = ScriptedPlatform::new();
    platform.add_channel(TRIGGER_CHANNEL, None).await;
    platform.add_message(ORIGIN, TRIGGER_CHANNEL).await;
    platform
}

fn read_map_file(path: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(path).expect("mapping file exists");
    serde_json::from_str(&raw).expect("mapping file is json")
}

#[tokio::test]
async fn qualifying_reaction_creates_thread_persists_mapping_and_notifies() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let map_path = tempdir.path().join("thread_map.json");
    let workflow = workflow(&map_path);
    let platform = trigger_channel_platform().await;

    let outcome = workflow
        .handle_reaction(
            &platform,
            &reaction(2, PARTICIPATE_EMOJI, Some(member(2, "기니"))),
            Some(BOT),
        )
        .await;

    let ReactionOutcome::Provisioned(report) = outcome else {
        panic!("expected provisioned outcome, got {outcome:?}");
    };
    assert_eq!(report.thread.id, ChannelId::new(1_000));
    assert!(report.mapping_persisted);
    assert_eq!(report.notifications_sent, 2);

    let requests = platform.thread_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].anchor_channel_id, TRIGGER_CHANNEL);
    assert_eq!(requests[0].message_id, ORIGIN);
    assert_eq!(requests[0].name, "기니님의 파티 모집 스레드 🎮");
    assert_eq!(requests[0].auto_archive_minutes, 60);

    assert_eq!(workflow.store().origin_for(1_000), Some(ORIGIN.get()));
    assert_eq!(read_map_file(&map_path)["1000"], serde_json::json!(500));

    let sent = platform.sent().await;
    assert_eq!(
        sent,
        vec![
            (
                ChannelId::new(1_000),
                "<@2>님이 파티 모집 스레드를 시작했습니다!".to_string()
            ),
            (
                TRIGGER_CHANNEL,
                "기니님의 파티 모집 스레드가 생성되었습니다: https://discord.com/channels/9/1000"
                    .to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn bot_reaction_creates_nothing() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let map_path = tempdir.path().join("thread_map.json");
    let workflow = workflow(&map_path);
    let platform = trigger_channel_platform().await;

    let outcome = workflow
        .handle_reaction(&platform, &reaction(BOT.get(), PARTICIPATE_EMOJI, None), Some(BOT))
        .await;

    assert_eq!(outcome, ReactionOutcome::Skipped(SkipReason::SelfReaction));
    assert!(platform.thread_requests().await.is_empty());
    assert!(workflow.store().is_empty());
    assert!(!map_path.exists());
}

#[tokio::test]
async fn other_emoji_is_ignored_before_any_lookup() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;

    let outcome = workflow
        .handle_reaction(&platform, &reaction(2, 556, None), Some(BOT))
        .await;

    assert_eq!(outcome, ReactionOutcome::Skipped(SkipReason::EmojiMismatch));
    assert_eq!(platform.state.lock().await.message_fetches, 0);
}

#[tokio::test]
async fn repeated_reactions_create_exactly_one_thread() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let map_path = tempdir.path().join("thread_map.json");
    let workflow = workflow(&map_path);
    let platform = trigger_channel_platform().await;

    let first = workflow
        .handle_reaction(
            &platform,
            &reaction(2, PARTICIPATE_EMOJI, Some(member(2, "a"))),
            Some(BOT),
        )
        .await;
    let second = workflow
        .handle_reaction(
            &platform,
            &reaction(3, PARTICIPATE_EMOJI, Some(member(3, "b"))),
            Some(BOT),
        )
        .await;

    assert!(matches!(first, ReactionOutcome::Provisioned(_)));
    assert_eq!(second, ReactionOutcome::Skipped(SkipReason::ThreadAlreadyExists));
    assert_eq!(platform.thread_requests().await.len(), 1);
    assert_eq!(workflow.store().len(), 1);
    assert_eq!(read_map_file(&map_path).as_object().map(|map| map.len()), Some(1));
}

#[tokio::test]
async fn racing_reactions_on_one_message_issue_a_single_creation_call() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;
    platform.state.lock().await.create_delay = Some(Duration::from_millis(50));

    let first_event = reaction(2, PARTICIPATE_EMOJI, None);
    let second_event = reaction(3, PARTICIPATE_EMOJI, None);
    let (first, second) = tokio::join!(
        workflow.handle_reaction(&platform, &first_event, Some(BOT)),
        workflow.handle_reaction(&platform, &second_event, Some(BOT)),
    );

    let provisioned = [&first, &second]
        .iter()
        .filter(|outcome| matches!(outcome, ReactionOutcome::Provisioned(_)))
        .count();
    assert_eq!(provisioned, 1);
    assert!([&first, &second].iter().any(|outcome| matches!(
        outcome,
        ReactionOutcome::Skipped(SkipReason::CreationInFlight | SkipReason::ThreadAlreadyExists)
    )));
    assert_eq!(platform.thread_requests().await.len(), 1);
    assert_eq!(workflow.store().len(), 1);
}

#[tokio::test]
async fn stale_fetch_outliving_first_attempt_does_not_create_again() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;
    {
        let mut state = platform.state.lock().await;
        state.create_delay = Some(Duration::from_millis(50));
        state.slow_message_fetch = Some((2, Duration::from_millis(200)));
    }

    let first_event = reaction(2, PARTICIPATE_EMOJI, None);
    let second_event = reaction(3, PARTICIPATE_EMOJI, None);
    let (first, second) = tokio::join!(
        workflow.handle_reaction(&platform, &first_event, Some(BOT)),
        workflow.handle_reaction(&platform, &second_event, Some(BOT)),
    );

    assert!(matches!(first, ReactionOutcome::Provisioned(_)));
    assert_eq!(second, ReactionOutcome::Skipped(SkipReason::CreationInFlight));
    assert_eq!(platform.thread_requests().await.len(), 1);
    assert_eq!(workflow.store().len(), 1);

    let late = workflow
        .handle_reaction(&platform, &reaction(4, PARTICIPATE_EMOJI, None), Some(BOT))
        .await;
    assert_eq!(late, ReactionOutcome::Skipped(SkipReason::ThreadAlreadyExists));
    assert_eq!(platform.thread_requests().await.len(), 1);
}

#[tokio::test]
async fn reaction_in_sub_thread_anchors_on_parent_channel() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = ScriptedPlatform::new();
    let sub_thread = ChannelId::new(101);
    platform.add_channel(TRIGGER_CHANNEL, None).await;
    platform.add_channel(sub_thread, Some(TRIGGER_CHANNEL)).await;
    platform.add_message(ORIGIN, sub_thread).await;

    let mut event = reaction(2, PARTICIPATE_EMOJI, Some(member(2, "c")));
    event.channel_id = sub_thread;
    let outcome = workflow.handle_reaction(&platform, &event, Some(BOT)).await;

    assert!(matches!(outcome, ReactionOutcome::Provisioned(_)));
    let requests = platform.thread_requests().await;
    assert_eq!(requests[0].anchor_channel_id, TRIGGER_CHANNEL);
    let sent = platform.sent().await;
    assert_eq!(sent[1].0, TRIGGER_CHANNEL);
}

#[tokio::test]
async fn reaction_outside_trigger_channel_is_ignored() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = ScriptedPlatform::new();
    let elsewhere = ChannelId::new(300);
    platform.add_channel(elsewhere, None).await;
    platform.add_message(ORIGIN, elsewhere).await;

    let mut event = reaction(2, PARTICIPATE_EMOJI, None);
    event.channel_id = elsewhere;
    let outcome = workflow.handle_reaction(&platform, &event, Some(BOT)).await;

    assert_eq!(outcome, ReactionOutcome::Skipped(SkipReason::ChannelNotEligible));
    assert!(platform.thread_requests().await.is_empty());
}

#[tokio::test]
async fn deleted_message_fails_closed() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = ScriptedPlatform::new();
    platform.add_channel(TRIGGER_CHANNEL, None).await;

    let outcome = workflow
        .handle_reaction(&platform, &reaction(2, PARTICIPATE_EMOJI, None), Some(BOT))
        .await;

    assert_eq!(outcome, ReactionOutcome::Skipped(SkipReason::MessageUnavailable));
    assert!(platform.sent().await.is_empty());
}

#[tokio::test]
async fn permission_denied_aborts_without_mapping_or_notices() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let map_path = tempdir.path().join("thread_map.json");
    let workflow = workflow(&map_path);
    let platform = trigger_channel_platform().await;
    platform.state.lock().await.deny_thread_creation = true;

    let outcome = workflow
        .handle_reaction(&platform, &reaction(2, PARTICIPATE_EMOJI, None), Some(BOT))
        .await;

    assert!(matches!(
        outcome,
        ReactionOutcome::Aborted(ProvisionFailure::Forbidden(_))
    ));
    assert!(workflow.store().is_empty());
    assert!(!map_path.exists());
    assert!(platform.sent().await.is_empty());
}

#[tokio::test]
async fn member_lookup_miss_falls_back_to_user_profile() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;
    platform.state.lock().await.users.insert(
        UserId::new(4),
        UserProfile {
            id: UserId::new(4),
            name: "left_guild".to_string(),
            global_name: Some("Former Member".to_string()),
            bot: false,
        },
    );

    let outcome = workflow
        .handle_reaction(&platform, &reaction(4, PARTICIPATE_EMOJI, None), Some(BOT))
        .await;

    let ReactionOutcome::Provisioned(report) = outcome else {
        panic!("expected provisioned outcome, got {outcome:?}");
    };
    assert_eq!(report.display_name, "Former Member");
    let sent = platform.sent().await;
    assert_eq!(sent[0].1, "<@4>님이 파티 모집 스레드를 시작했습니다!");
}

#[tokio::test]
async fn unknown_user_gets_synthesized_name() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;

    let outcome = workflow
        .handle_reaction(&platform, &reaction(77, PARTICIPATE_EMOJI, None), Some(BOT))
        .await;

    let ReactionOutcome::Provisioned(report) = outcome else {
        panic!("expected provisioned outcome, got {outcome:?}");
    };
    assert_eq!(report.display_name, "user-77");
    assert_eq!(report.thread_name, "user-77님의 파티 모집 스레드 🎮");
}

#[tokio::test]
async fn missing_mapping_file_starts_empty_and_is_created_on_first_thread() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let map_path = tempdir.path().join("state").join("thread_map.json");
    assert!(!map_path.exists());
    let workflow = workflow(&map_path);
    assert!(workflow.store().is_empty());
    let platform = trigger_channel_platform().await;

    let outcome = workflow
        .handle_reaction(&platform, &reaction(2, PARTICIPATE_EMOJI, None), Some(BOT))
        .await;

    assert!(matches!(outcome, ReactionOutcome::Provisioned(_)));
    assert!(map_path.exists());
    let reloaded = ThreadMapStore::load(&map_path);
    assert_eq!(reloaded.origin_for(1_000), Some(ORIGIN.get()));
}

#[tokio::test]
async fn participant_query_without_mapping_skips_platform_reads() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;
    let thread = ChannelInfo {
        id: ChannelId::new(4_242),
        guild_id: Some(GUILD),
        parent_id: Some(TRIGGER_CHANNEL),
        kind: ChannelKind::Thread,
    };

    let reply = workflow.list_participants(&platform, &thread).await;

    assert_eq!(reply.content, ORIGIN_NOT_FOUND_TEXT);
    assert!(reply.ephemeral);
    let state = platform.state.lock().await;
    assert_eq!(state.reaction_reads, 0);
    assert_eq!(state.message_fetches, 0);
}

#[tokio::test]
async fn participant_query_outside_thread_is_guidance_only() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;
    let text_channel = platform.fetch_channel(TRIGGER_CHANNEL).await.expect("channel");

    let reply = workflow.list_participants(&platform, &text_channel).await;

    assert_eq!(reply.content, NOT_IN_THREAD_TEXT);
    assert!(reply.ephemeral);
}

async fn provisioned_thread(workflow: &ThreadWorkflow, platform: &ScriptedPlatform) -> ChannelInfo {
    let outcome = workflow
        .handle_reaction(platform, &reaction(11, PARTICIPATE_EMOJI, None), Some(BOT))
        .await;
    let ReactionOutcome::Provisioned(report) = outcome else {
        panic!("expected provisioned outcome, got {outcome:?}");
    };
    platform
        .fetch_channel(report.thread.id)
        .await
        .expect("thread channel registered")
}

#[tokio::test]
async fn participant_query_lists_current_non_bot_reactors() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;
    let thread = provisioned_thread(&workflow, &platform).await;
    platform.state.lock().await.reactors.insert(
        ORIGIN,
        vec![
            user(11, "a", false),
            user(BOT.get(), "guinea", true),
            user(12, "b", false),
            user(13, "c", false),
        ],
    );

    let reply = workflow.list_participants(&platform, &thread).await;

    assert_eq!(reply.content, "**현재 참여 인원:** <@11> <@12> <@13>");
    assert!(!reply.ephemeral);
}

#[tokio::test]
async fn participant_query_reflects_unreacted_users() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;
    let thread = provisioned_thread(&workflow, &platform).await;
    platform
        .state
        .lock()
        .await
        .reactors
        .insert(ORIGIN, vec![user(BOT.get(), "guinea", true)]);

    let reply = workflow.list_participants(&platform, &thread).await;

    assert_eq!(reply.content, "**현재 참여 인원:** 없음");
}

#[tokio::test]
async fn participant_query_without_matching_reaction_reports_none_yet() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;
    let thread = provisioned_thread(&workflow, &platform).await;
    if let Some(message) = platform.state.lock().await.messages.get_mut(&ORIGIN) {
        message.reactions = vec![ReactionSummary {
            emoji: ReactionEmoji::Unicode("🎮".to_string()),
            count: 2,
        }];
    }

    let reply = workflow.list_participants(&platform, &thread).await;

    assert_eq!(reply.content, NO_PARTICIPANTS_YET_TEXT);
    assert!(!reply.ephemeral);
    assert_eq!(platform.state.lock().await.reaction_reads, 0);
}

#[tokio::test]
async fn participant_query_with_deleted_origin_reports_unavailable() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let workflow = workflow(&tempdir.path().join("thread_map.json"));
    let platform = trigger_channel_platform().await;
    let thread = provisioned_thread(&workflow, &platform).await;
    platform.state.lock().await.messages.remove(&ORIGIN);

    let reply = workflow.list_participants(&platform, &thread).await;

    assert_eq!(reply.content, PARTICIPANTS_UNAVAILABLE_TEXT);
    assert!(reply.ephemeral);
}

#[tokio::test]
async fn mapping_survives_restart_for_participant_queries() {
    let tempdir = tempfile::tempdir().expect("tempdir");
    let map_path = tempdir.path().join("thread_map.json");
    let platform = trigger_channel_platform().await;
    let thread = {
        let first_run = workflow(&map_path);
        provisioned_thread(&first_run, &platform).await
    };
    platform
        .state
        .lock()
        .await
        .reactors
        .insert(ORIGIN, vec![user(11, "a", false)]);

    let restarted = workflow(&map_path);
    let reply = restarted.list_participants(&platform, &thread).await;

    assert_eq!(reply.content, "**현재 참여 인원:** <@11>");
}
