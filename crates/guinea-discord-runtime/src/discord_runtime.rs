//! Gateway client setup and event dispatch.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::{Context as _, Result};
use guinea_store::ThreadMapStore;
use guinea_workflow::{
    CommandAccess, ReactionOutcome, ThreadWorkflow, TriggerConfig, UserId, WorkflowSettings,
};
use serenity::all::{Client, Context, EventHandler, GatewayIntents, Interaction, Reaction, Ready};
use serenity::async_trait;
use tracing::{debug, error, info, warn};

mod discord_commands;
mod serenity_platform;

use discord_commands::{handle_command, register_commands};
use serenity_platform::{reaction_event, SerenityPlatform};

/// Runtime configuration for the Discord gateway loop.
#[derive(Debug, Clone)]
pub struct DiscordRuntimeConfig {
    pub token: String,
    pub trigger: TriggerConfig,
    pub settings: WorkflowSettings,
    pub command_access: CommandAccess,
    pub thread_map_path: PathBuf,
    pub patch_notes_path: PathBuf,
}

pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT
}

/// Connects to the gateway and processes events until shutdown.
pub async fn run_discord_bot(config: DiscordRuntimeConfig) -> Result<()> {
    let store = Arc::new(ThreadMapStore::load(config.thread_map_path.clone()));
    if !config.trigger.is_enabled() {
        warn!("participate emoji is not configured; thread creation is disabled");
    }
    info!(
        trigger_channel_id = ?config.trigger.channel_id,
        emoji_id = ?config.trigger.emoji_id,
        command_channels = config.command_access.channel_ids().len(),
        mapped_threads = store.len(),
        "starting discord runtime"
    );

    let workflow = Arc::new(ThreadWorkflow::new(
        config.trigger.clone(),
        config.settings,
        store,
    ));
    let handler = GuineaHandler {
        workflow,
        command_access: config.command_access.clone(),
        patch_notes_path: config.patch_notes_path.clone(),
        bot_user_id: OnceLock::new(),
    };

    let mut client = Client::builder(&config.token, gateway_intents())
        .event_handler(handler)
        .await
        .context("failed to build discord client")?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            shard_manager.shutdown_all().await;
        }
    });

    client
        .start()
        .await
        .context("discord gateway client stopped with an error")
}

struct GuineaHandler {
    workflow: Arc<ThreadWorkflow>,
    command_access: CommandAccess,
    patch_notes_path: PathBuf,
    bot_user_id: OnceLock<UserId>,
}

#[async_trait]
impl EventHandler for GuineaHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let bot_user_id = UserId::new(ready.user.id.get());
        // Reconnects report the same identity.
        let _ = self.bot_user_id.set(bot_user_id);
        info!(user = %ready.user.name, user_id = %bot_user_id, "logged in");
        register_commands(&ctx.http).await;
    }

    async fn reaction_add(&self, ctx: Context, add_reaction: Reaction) {
        let Some(event) = reaction_event(&add_reaction) else {
            debug!(message_id = %add_reaction.message_id, "reaction without user id ignored");
            return;
        };
        let platform = SerenityPlatform::new(Arc::clone(&ctx.http));
        let outcome = self
            .workflow
            .handle_reaction(&platform, &event, self.bot_user_id.get().copied())
            .await;
        match outcome {
            ReactionOutcome::Skipped(_) => {}
            ReactionOutcome::Provisioned(report) => info!(
                thread_id = %report.thread.id,
                message_id = %report.origin_message_id,
                mapping_persisted = report.mapping_persisted,
                notifications_sent = report.notifications_sent,
                "reaction handled"
            ),
            ReactionOutcome::Aborted(failure) => error!(
                message_id = %event.message_id,
                failure = ?failure,
                "thread provisioning aborted"
            ),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            handle_command(self, &ctx, &command).await;
        }
    }
}
