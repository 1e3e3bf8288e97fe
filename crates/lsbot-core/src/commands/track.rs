//! `/track`: keep count of how far the group is through airing shows.
//!
//! The slash command only opens a form; all state changes happen when the form
//! comes back as a modal submission with one of the `track …` custom ids.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::{
    commands::{
        schema::{CommandSchema, OptionSchema},
        CommandContext, ModalContext, ModalHandler, SlashCommand, UNKNOWN_COMMAND,
    },
    config::Config,
    domain::RoleId,
    errors::Error,
    messaging::types::{Modal, Reply, TextInput},
    ports::show_url,
    store::models::{NewTrackedShow, TrackedShow},
    Result,
};

pub const MODAL_ADD: &str = "track add";
pub const MODAL_REMOVE: &str = "track remove";
pub const MODAL_CHECK: &str = "track check";
pub const FIELD_ANIME: &str = "anime";
pub const FIELD_EPISODE: &str = "episode";

const ANIME_LABEL: &str = "MyAnimeList ID (https://myanimelist.net/)";
const EPISODE_LABEL: &str = "How many episodes have we watched?";

pub struct TrackCommand;

#[async_trait]
impl SlashCommand for TrackCommand {
    fn schema(&self) -> CommandSchema {
        CommandSchema::new(
            "track",
            "Handle show tracking.",
            vec![
                OptionSchema::subcommand("add", "Start tracking a show.", vec![]),
                OptionSchema::subcommand("remove", "Stop tracking a show.", vec![]),
                OptionSchema::subcommand("check", "Check the status of a show.", vec![]),
            ],
        )
    }

    fn permissions(&self, cfg: &Config) -> Vec<RoleId> {
        cfg.weeb_role_id.into_iter().collect()
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<()> {
        info!(subcommand = ?ctx.invocation.subcommand, "track command");

        let modal = match ctx.invocation.subcommand.as_deref() {
            Some("add") => Modal {
                custom_id: MODAL_ADD.to_string(),
                title: "Add Show".to_string(),
                inputs: vec![
                    TextInput::short(FIELD_ANIME, ANIME_LABEL),
                    TextInput::short(FIELD_EPISODE, EPISODE_LABEL),
                ],
            },
            Some("remove") => Modal {
                custom_id: MODAL_REMOVE.to_string(),
                title: "Remove Show".to_string(),
                inputs: vec![TextInput::short(FIELD_ANIME, ANIME_LABEL)],
            },
            Some("check") => Modal {
                custom_id: MODAL_CHECK.to_string(),
                title: "Check Show".to_string(),
                inputs: vec![TextInput::short(FIELD_ANIME, ANIME_LABEL)],
            },
            _ => return ctx.unknown_subcommand().await,
        };
        ctx.responder.show_modal(modal).await
    }

    fn modal_handler(&self) -> Option<&dyn ModalHandler> {
        Some(self)
    }
}

#[async_trait]
impl ModalHandler for TrackCommand {
    async fn submit(&self, ctx: &ModalContext<'_>) -> Result<()> {
        info!(custom_id = %ctx.submission.custom_id, "track modal");

        match ctx.submission.custom_id.as_str() {
            MODAL_ADD => on_add(ctx).await,
            MODAL_REMOVE => on_remove(ctx).await,
            MODAL_CHECK => on_check(ctx).await,
            other => {
                warn!(custom_id = other, "unrecognized track modal");
                ctx.responder.reply(Reply::ephemeral(UNKNOWN_COMMAND)).await
            }
        }
    }
}

/// Parse a base-10 integer field. On failure the submitter is told which input was bad.
async fn numeric_field(ctx: &ModalContext<'_>, id: &str) -> Result<i64> {
    let raw = ctx.submission.field(id).unwrap_or_default().trim();
    match raw.parse::<i64>() {
        Ok(v) => Ok(v),
        Err(_) => {
            ctx.responder
                .reply(Reply::ephemeral(format!("'{raw}' is not a valid number.")))
                .await?;
            Err(Error::Validation(format!("field '{id}' is not a number: '{raw}'")))
        }
    }
}

async fn on_add(ctx: &ModalContext<'_>) -> Result<()> {
    let show_id = numeric_field(ctx, FIELD_ANIME).await?;
    let watched = numeric_field(ctx, FIELD_EPISODE).await?;
    let url = show_url(show_id);

    let details = match ctx.state.anime.get_anime(show_id).await {
        Ok(d) => d,
        Err(e) => {
            warn!(show_id, error = %e, "anime lookup failed");
            return ctx
                .responder
                .reply(Reply::public(format!("Failed to track show: {e}")))
                .await;
        }
    };

    let upserted = ctx
        .state
        .store
        .upsert_show(NewTrackedShow {
            show_id,
            name: details.name.clone(),
            episodes_watched: watched,
            latest_episode: details.episodes,
            airing: details.airing,
        })
        .await;

    let content = match upserted {
        Ok(show) => format!(
            "Tracking show [{}]({url}).  Episodes watched: `{}`",
            show.name, show.episodes_watched
        ),
        Err(e) => {
            warn!(show_id, error = %e, "failed to store tracked show");
            format!("Failed to track show [{}]({url}): {e}", details.name)
        }
    };
    ctx.responder.reply(Reply::public(content)).await
}

async fn on_remove(ctx: &ModalContext<'_>) -> Result<()> {
    let show_id = numeric_field(ctx, FIELD_ANIME).await?;
    let store = &ctx.state.store;

    let removed: Result<Option<TrackedShow>> = async {
        let Some(show) = store.find_show(show_id).await? else {
            return Ok(None);
        };
        store.delete_show(show_id).await?;
        Ok(Some(show))
    }
    .await;

    let reply = match removed {
        Ok(Some(show)) => Reply::public(format!(
            "Stopped tracking [{}]({}) after watching `{}` episodes.",
            show.name,
            show_url(show_id),
            show.episodes_watched
        )),
        Ok(None) => Reply::ephemeral("Failed to stop tracking show.  Is the show being tracked?"),
        Err(e) => {
            error!(show_id, error = %e, "failed to stop tracking show");
            Reply::ephemeral("Failed to stop tracking show.")
        }
    };
    ctx.responder.reply(reply).await
}

async fn on_check(ctx: &ModalContext<'_>) -> Result<()> {
    let show_id = numeric_field(ctx, FIELD_ANIME).await?;

    let reply = match ctx.state.store.find_show(show_id).await {
        Ok(Some(show)) => Reply::ephemeral(format!(
            "We have watched `{}` episodes of [{}]({}).  Last episode was watched {}.",
            show.episodes_watched,
            show.name,
            show_url(show_id),
            show.updated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        )),
        Ok(None) => Reply::ephemeral("Failed to check show.  Is the show being tracked?"),
        Err(e) => {
            error!(show_id, error = %e, "failed to check tracked show");
            Reply::ephemeral("Failed to check show.")
        }
    };
    ctx.responder.reply(reply).await
}
