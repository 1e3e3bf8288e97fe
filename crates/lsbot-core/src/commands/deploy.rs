//! `{prefix}deploy`: publish the registry's slash commands.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::{
    commands::{MessageCommand, MessageContext},
    Result,
};

pub struct DeployCommand;

#[async_trait]
impl MessageCommand for DeployCommand {
    fn name(&self) -> &'static str {
        "Deploy"
    }

    async fn execute(&self, ctx: &MessageContext<'_>) -> Result<()> {
        let author = ctx.message.author_id;
        let cfg = &ctx.state.cfg;
        if !cfg.is_owner(author) {
            warn!(user = %author, "deploy requested by non-owner, ignoring");
            return Ok(());
        }

        info!(user = %author, "deploy called");

        let schemas = ctx.registry.schemas();
        let registered = match ctx.gateway.overwrite_commands(&schemas).await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "failed to register commands");
                return ctx
                    .gateway
                    .send_message(ctx.message.channel_id, "Failed to deploy commands.")
                    .await;
            }
        };

        if let Some(guild) = cfg.guild_id {
            for cmd in ctx.registry.slash_commands() {
                let roles = cmd.permissions(cfg);
                if roles.is_empty() {
                    continue;
                }
                let name = cmd.schema().name;
                let Some(remote) = registered.iter().find(|r| r.name == name) else {
                    warn!(command = %name, "command missing from registration result");
                    continue;
                };
                match ctx.gateway.set_command_permissions(guild, remote, &roles).await {
                    Ok(()) => info!(command = %remote.name, guild = guild.0, "set command permissions"),
                    Err(e) => error!(
                        command = %remote.name,
                        guild = guild.0,
                        error = %e,
                        "failed to set command permissions"
                    ),
                }
            }
        }

        info!(count = registered.len(), "commands deployed");
        ctx.gateway
            .send_message(
                ctx.message.channel_id,
                &format!("Deployed {} command(s).", registered.len()),
            )
            .await
    }
}
