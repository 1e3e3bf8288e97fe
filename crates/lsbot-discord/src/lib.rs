//! Discord adapter (serenity).
//!
//! This crate implements the `lsbot-core` gateway and responder ports over the
//! Discord HTTP API and feeds gateway events into the core dispatcher.

use std::sync::Arc;

use async_trait::async_trait;

use serenity::all::{
    ChannelId as SerenityChannelId, Command, CommandId, CommandInteraction, CreateInteractionResponse,
    CreateInteractionResponseFollowup, GuildId as SerenityGuildId, Http, ModalInteraction,
    UserId as SerenityUserId,
};

pub mod convert;
pub mod handler;
pub mod router;

use lsbot_core::{
    commands::schema::{CommandSchema, RegisteredCommand},
    domain::{ChannelId, GuildId, RoleId, UserId},
    errors::Error,
    messaging::{
        port::{GatewayPort, InteractionResponder},
        types::{Modal, Reply},
    },
    Result,
};

/// Discord application-command permission type for roles.
const ROLE_PERMISSION_TYPE: u8 = 1;

#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn map_err(e: serenity::Error) -> Error {
        Error::External(format!("discord error: {e}"))
    }
}

/// Discord ids are non-zero; a zero id can only come from bad input.
fn nonzero(kind: &str, id: u64) -> Result<u64> {
    if id == 0 {
        return Err(Error::Validation(format!("{kind} id must be non-zero")));
    }
    Ok(id)
}

#[async_trait]
impl GatewayPort for DiscordGateway {
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<()> {
        let channel = SerenityChannelId::new(nonzero("channel", channel.0)?);
        channel
            .say(self.http.as_ref(), content)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn display_name(&self, user: UserId) -> Result<String> {
        let id = SerenityUserId::new(nonzero("user", user.0)?);
        let u = self.http.get_user(id).await.map_err(Self::map_err)?;
        Ok(u.name)
    }

    async fn overwrite_commands(
        &self,
        commands: &[CommandSchema],
    ) -> Result<Vec<RegisteredCommand>> {
        let payload: Vec<_> = commands.iter().map(convert::create_command).collect();
        let created = Command::set_global_commands(self.http.as_ref(), payload)
            .await
            .map_err(Self::map_err)?;

        Ok(created
            .into_iter()
            .map(|c| RegisteredCommand {
                id: c.id.get(),
                name: c.name,
            })
            .collect())
    }

    /// `PUT /applications/{app}/guilds/{guild}/commands/{id}/permissions`.
    ///
    /// API v10 only accepts this with an OAuth2 Bearer token carrying the
    /// `applications.commands.permissions.update` scope. Sent with the bot token it
    /// is rejected, so deploy logs one failure per gated command and the guild
    /// keeps whatever permissions were set in the server's integration settings.
    async fn set_command_permissions(
        &self,
        guild: GuildId,
        command: &RegisteredCommand,
        roles: &[RoleId],
    ) -> Result<()> {
        let guild = SerenityGuildId::new(nonzero("guild", guild.0)?);
        let command_id = CommandId::new(nonzero("command", command.id)?);
        let permissions: Vec<serde_json::Value> = roles
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.0.to_string(),
                    "type": ROLE_PERMISSION_TYPE,
                    "permission": true,
                })
            })
            .collect();
        let body = serde_json::json!({ "permissions": permissions });

        self.http
            .edit_guild_command_permissions(guild, command_id, &body)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}

enum Target<'a> {
    Command(&'a CommandInteraction),
    Modal(&'a ModalInteraction),
    /// Pings, component clicks, autocomplete: nothing the core answers.
    Unanswerable,
}

/// Responds to one slash-command or modal-submit interaction.
pub struct DiscordResponder<'a> {
    http: &'a Http,
    target: Target<'a>,
}

impl<'a> DiscordResponder<'a> {
    pub fn command(http: &'a Http, interaction: &'a CommandInteraction) -> Self {
        Self {
            http,
            target: Target::Command(interaction),
        }
    }

    pub fn modal(http: &'a Http, interaction: &'a ModalInteraction) -> Self {
        Self {
            http,
            target: Target::Modal(interaction),
        }
    }

    /// Responder for interaction kinds the core only logs; every response is an error.
    pub fn unanswerable(http: &'a Http) -> Self {
        Self {
            http,
            target: Target::Unanswerable,
        }
    }

    async fn respond(&self, response: CreateInteractionResponse) -> Result<()> {
        let res = match self.target {
            Target::Command(i) => i.create_response(self.http, response).await,
            Target::Modal(i) => i.create_response(self.http, response).await,
            Target::Unanswerable => return Err(unanswerable()),
        };
        res.map_err(DiscordGateway::map_err)
    }
}

#[async_trait]
impl InteractionResponder for DiscordResponder<'_> {
    async fn reply(&self, reply: Reply) -> Result<()> {
        self.respond(CreateInteractionResponse::Message(
            convert::response_message(reply),
        ))
        .await
    }

    async fn follow_up(&self, reply: Reply) -> Result<()> {
        let follow: CreateInteractionResponseFollowup = convert::follow_up(reply);
        let res = match self.target {
            Target::Command(i) => i.create_followup(self.http, follow).await,
            Target::Modal(i) => i.create_followup(self.http, follow).await,
            Target::Unanswerable => return Err(unanswerable()),
        };
        res.map(|_| ()).map_err(DiscordGateway::map_err)
    }

    async fn show_modal(&self, modal: Modal) -> Result<()> {
        match self.target {
            Target::Command(_) => {
                self.respond(CreateInteractionResponse::Modal(convert::create_modal(modal)))
                    .await
            }
            Target::Modal(_) => Err(Error::External(
                "a modal cannot be shown in response to a modal".to_string(),
            )),
            Target::Unanswerable => Err(unanswerable()),
        }
    }
}

fn unanswerable() -> Error {
    Error::External("this interaction kind cannot be answered".to_string())
}
