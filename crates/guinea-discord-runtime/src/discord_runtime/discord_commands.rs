//! Slash command registration and dispatch.

use std::sync::Arc;

use guinea_workflow::{
    load_patch_notes, render_patch_notes, ChannelId, ChatPlatform, CommandReply, PatchNotesView,
    COMMAND_CHANNEL_DENIED_TEXT, PARTICIPANTS_UNAVAILABLE_TEXT,
};
use serenity::all::{
    Command, CommandInteraction, Context, CreateCommand, CreateEmbed, CreateEmbedFooter,
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::http::Http;
use tracing::{debug, info, warn};

use super::serenity_platform::{partial_channel_info, SerenityPlatform};
use super::GuineaHandler;

pub(super) const PARTICIPANTS_COMMAND: &str = "참여자";
pub(super) const UPDATE_COMMAND: &str = "업데이트";

pub(super) fn command_definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(PARTICIPANTS_COMMAND)
            .description("현재 스레드의 참여자 리스트를 보여줍니다"),
        CreateCommand::new(UPDATE_COMMAND).description("최신 봇 패치노트/새 기능 안내"),
    ]
}

pub(super) async fn register_commands(http: &Http) {
    match Command::set_global_commands(http, command_definitions()).await {
        Ok(commands) => info!(count = commands.len(), "registered slash commands"),
        Err(error) => warn!(error = %error, "failed to register slash commands"),
    }
}

pub(super) async fn handle_command(
    handler: &GuineaHandler,
    ctx: &Context,
    command: &CommandInteraction,
) {
    let response = match command.data.name.as_str() {
        PARTICIPANTS_COMMAND => {
            // The query can outlast the initial response window.
            if let Err(error) = command.defer(&ctx.http).await {
                warn!(error = %error, "failed to defer participants command");
                return;
            }
            let platform = SerenityPlatform::new(Arc::clone(&ctx.http));
            let reply = match invocation_channel(&platform, command).await {
                Some(channel) => handler.workflow.list_participants(&platform, &channel).await,
                None => CommandReply::ephemeral(PARTICIPANTS_UNAVAILABLE_TEXT),
            };
            deliver_deferred(ctx, command, reply).await;
            return;
        }
        UPDATE_COMMAND => {
            let channel_id = ChannelId::new(command.channel_id.get());
            if handler.command_access.is_authorized(channel_id) {
                match load_patch_notes(&handler.patch_notes_path) {
                    Ok(notes) => embed_response(&render_patch_notes(&notes)),
                    Err(error) => {
                        warn!(error = %error, "patch notes unavailable");
                        text_response(error.reply())
                    }
                }
            } else {
                debug!(channel_id = %channel_id, "command used outside authorized channels");
                text_response(CommandReply::ephemeral(COMMAND_CHANNEL_DENIED_TEXT))
            }
        }
        other => {
            debug!(command = other, "unknown command ignored");
            return;
        }
    };

    if let Err(error) = command.create_response(&ctx.http, response).await {
        warn!(
            command = %command.data.name,
            error = %error,
            "failed to respond to command"
        );
    }
}

async fn invocation_channel(
    platform: &SerenityPlatform,
    command: &CommandInteraction,
) -> Option<guinea_workflow::ChannelInfo> {
    if let Some(channel) = &command.channel {
        return Some(partial_channel_info(channel, command.guild_id));
    }
    platform
        .fetch_channel(ChannelId::new(command.channel_id.get()))
        .await
        .map_err(|error| {
            warn!(
                channel_id = %command.channel_id,
                error = %error,
                "failed to resolve command channel"
            );
        })
        .ok()
}

/// Reply to a deferred command: public replies replace the placeholder,
/// ephemeral ones remove it and follow up privately.
pub(super) enum DeferredReply {
    Edit(EditInteractionResponse),
    Followup(CreateInteractionResponseFollowup),
}

pub(super) fn deferred_reply(reply: CommandReply) -> DeferredReply {
    if reply.ephemeral {
        DeferredReply::Followup(
            CreateInteractionResponseFollowup::new()
                .content(reply.content)
                .ephemeral(true),
        )
    } else {
        DeferredReply::Edit(EditInteractionResponse::new().content(reply.content))
    }
}

async fn deliver_deferred(ctx: &Context, command: &CommandInteraction, reply: CommandReply) {
    let delivered = match deferred_reply(reply) {
        DeferredReply::Edit(edit) => command.edit_response(&ctx.http, edit).await.map(|_| ()),
        DeferredReply::Followup(followup) => {
            if let Err(error) = command.delete_response(&ctx.http).await {
                debug!(error = %error, "failed to remove deferred placeholder");
            }
            command
                .create_followup(&ctx.http, followup)
                .await
                .map(|_| ())
        }
    };
    if let Err(error) = delivered {
        warn!(
            command = %command.data.name,
            error = %error,
            "failed to deliver deferred reply"
        );
    }
}

fn text_response(reply: CommandReply) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(reply.content)
            .ephemeral(reply.ephemeral),
    )
}

pub(super) fn patch_notes_embed(view: &PatchNotesView) -> CreateEmbed {
    let embed = CreateEmbed::new()
        .title(view.title.as_str())
        .description(view.description.as_str())
        .colour(view.colour)
        .thumbnail(view.thumbnail_url.as_str())
        .footer(CreateEmbedFooter::new(view.footer.as_str()));
    view.fields.iter().fold(embed, |embed, field| {
        embed.field(field.name.as_str(), field.value.as_str(), false)
    })
}

fn embed_response(view: &PatchNotesView) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new().embed(patch_notes_embed(view)),
    )
}
