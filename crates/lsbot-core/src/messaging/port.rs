use async_trait::async_trait;

use crate::{
    commands::schema::{CommandSchema, RegisteredCommand},
    domain::{ChannelId, GuildId, RoleId, UserId},
    messaging::types::{Modal, Reply},
    Result,
};

/// Bot-wide session port: everything a handler or task may ask of the gateway
/// that is not tied to one interaction.
#[async_trait]
pub trait GatewayPort: Send + Sync {
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<()>;

    /// Human-readable name for export files (`@name`).
    async fn display_name(&self, user: UserId) -> Result<String>;

    /// Bulk-replace the global command set (PUT semantics). Returns what the
    /// platform now has registered, in the same order.
    async fn overwrite_commands(&self, commands: &[CommandSchema])
        -> Result<Vec<RegisteredCommand>>;

    async fn set_command_permissions(
        &self,
        guild: GuildId,
        command: &RegisteredCommand,
        roles: &[RoleId],
    ) -> Result<()>;
}

/// Reply channel for a single interaction.
///
/// `reply` and `show_modal` are the initial response (exactly one per
/// interaction); `follow_up` may be called any number of times afterwards.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    async fn reply(&self, reply: Reply) -> Result<()>;
    async fn follow_up(&self, reply: Reply) -> Result<()>;
    async fn show_modal(&self, modal: Modal) -> Result<()>;
}
