//! Slash-command and message-command handlers plus the registry that maps
//! normalized names to them.

use async_trait::async_trait;

use crate::{
    config::Config,
    domain::{RoleId, UserId},
    errors::Error,
    messaging::{
        port::{GatewayPort, InteractionResponder},
        types::{CommandInvocation, ModalSubmission, Reply, TextMessage},
    },
    state::AppState,
    Result,
};

pub mod deploy;
pub mod list;
mod names;
pub mod points;
pub mod registry;
pub mod schema;
pub mod track;

pub use registry::CommandRegistry;
use schema::CommandSchema;

pub const UNKNOWN_COMMAND: &str = "Unknown command.";

/// Everything a slash command sees while it runs.
pub struct CommandContext<'a> {
    pub state: &'a AppState,
    pub gateway: &'a dyn GatewayPort,
    pub responder: &'a dyn InteractionResponder,
    pub invocation: &'a CommandInvocation,
}

pub struct ModalContext<'a> {
    pub state: &'a AppState,
    pub gateway: &'a dyn GatewayPort,
    pub responder: &'a dyn InteractionResponder,
    pub submission: &'a ModalSubmission,
}

pub struct MessageContext<'a> {
    pub state: &'a AppState,
    pub gateway: &'a dyn GatewayPort,
    pub registry: &'a CommandRegistry,
    pub message: &'a TextMessage,
    /// Whitespace-separated tokens after the prefix, command name included.
    pub args: &'a [String],
}

#[async_trait]
pub trait SlashCommand: Send + Sync {
    fn schema(&self) -> CommandSchema;

    /// Roles allowed to use the command in the operator guild. Empty means no override.
    fn permissions(&self, _cfg: &Config) -> Vec<RoleId> {
        Vec::new()
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<()>;

    fn modal_handler(&self) -> Option<&dyn ModalHandler> {
        None
    }
}

#[async_trait]
pub trait ModalHandler: Send + Sync {
    async fn submit(&self, ctx: &ModalContext<'_>) -> Result<()>;
}

#[async_trait]
pub trait MessageCommand: Send + Sync {
    /// Already in dispatch form (`Deploy`).
    fn name(&self) -> &'static str;

    async fn execute(&self, ctx: &MessageContext<'_>) -> Result<()>;
}

impl CommandContext<'_> {
    pub fn caller(&self) -> UserId {
        self.invocation.caller
    }

    pub fn required_user(&self, name: &str) -> Result<UserId> {
        self.invocation
            .user_option(name)
            .ok_or_else(|| Error::Validation(format!("missing '{name}' option")))
    }

    pub fn required_integer(&self, name: &str) -> Result<i64> {
        self.invocation
            .integer_option(name)
            .ok_or_else(|| Error::Validation(format!("missing '{name}' option")))
    }

    pub async fn unknown_subcommand(&self) -> Result<()> {
        tracing::error!(
            command = %self.invocation.name,
            subcommand = ?self.invocation.subcommand,
            "unrecognized sub-command"
        );
        self.responder.reply(Reply::ephemeral(UNKNOWN_COMMAND)).await
    }
}
