//! Routes gateway events to registered handlers.
//!
//! The adapter converts platform events into [`TextMessage`] /
//! [`IncomingInteraction`] and calls into the [`Dispatcher`]. Handler errors
//! stop here: they are logged and reported as [`DispatchOutcome::Failed`].

use std::sync::{Arc, OnceLock};

use tracing::{debug, error, info, warn};

use crate::{
    commands::{
        registry::{capitalize, modal_command_name, normalize_command_name},
        CommandContext, CommandRegistry, MessageContext, ModalContext,
    },
    errors::Error,
    messaging::{
        port::{GatewayPort, InteractionResponder},
        types::{IncomingInteraction, TextMessage},
    },
    scheduler::Scheduler,
    state::AppState,
    updates, Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not addressed to the bot (bot author, missing prefix, empty, or a no-op interaction kind).
    Ignored,
    NotFound(String),
    Handled(String),
    Failed(String),
    NoModalHandler(String),
}

#[derive(Clone, Debug)]
pub struct ReadyInfo {
    pub user_name: String,
    pub guild_count: usize,
}

pub struct Dispatcher {
    state: AppState,
    registry: CommandRegistry,
    scheduler: OnceLock<Scheduler>,
}

impl Dispatcher {
    pub fn new(state: AppState, registry: CommandRegistry) -> Self {
        Self {
            state,
            registry,
            scheduler: OnceLock::new(),
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Gateway ready. Starts the periodic tasks the first time only; returns whether it did.
    pub fn on_ready(&self, info: ReadyInfo, gateway: Arc<dyn GatewayPort>) -> bool {
        info!(user = %info.user_name, guilds = info.guild_count, "bot ready");

        let mut started = false;
        self.scheduler.get_or_init(|| {
            let scheduler = Scheduler::new(updates::all(&self.state, gateway));
            started = scheduler.start();
            scheduler
        });
        if !started {
            debug!("ready received again, scheduler already running");
        }
        started
    }

    pub async fn shutdown(&self) {
        if let Some(s) = self.scheduler.get() {
            s.stop().await;
        }
    }

    pub async fn on_message(&self, gateway: &dyn GatewayPort, msg: &TextMessage) -> DispatchOutcome {
        if msg.author_is_bot {
            return DispatchOutcome::Ignored;
        }
        let Some(rest) = msg.content.strip_prefix(self.state.cfg.prefix.as_str()) else {
            return DispatchOutcome::Ignored;
        };

        let args: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
        let Some(first) = args.first() else {
            return DispatchOutcome::Ignored;
        };

        let name = capitalize(first);
        info!(author = %msg.author_id, command = %name, "received message command");

        let Some(cmd) = self.registry.message(&name) else {
            warn!(command = %name, "failed to match message command");
            return DispatchOutcome::NotFound(name);
        };

        let ctx = MessageContext {
            state: &self.state,
            gateway,
            registry: &self.registry,
            message: msg,
            args: &args,
        };
        finish(name, cmd.execute(&ctx).await)
    }

    pub async fn on_interaction(
        &self,
        gateway: &dyn GatewayPort,
        responder: &dyn InteractionResponder,
        interaction: &IncomingInteraction,
    ) -> DispatchOutcome {
        match interaction {
            IncomingInteraction::Command(inv) => {
                let name = normalize_command_name(&inv.name);
                info!(command = %name, caller = %inv.caller, subcommand = ?inv.subcommand, "received command interaction");

                let Some(cmd) = self.registry.slash(&name) else {
                    warn!(command = %name, "failed to match slash command");
                    return DispatchOutcome::NotFound(name);
                };
                let ctx = CommandContext {
                    state: &self.state,
                    gateway,
                    responder,
                    invocation: inv,
                };
                finish(name, cmd.execute(&ctx).await)
            }
            IncomingInteraction::ModalSubmit(sub) => {
                info!(custom_id = %sub.custom_id, caller = %sub.caller, "received modal submission");

                let Some(name) = modal_command_name(&sub.custom_id) else {
                    warn!("modal submission without custom id");
                    return DispatchOutcome::Ignored;
                };
                let Some(cmd) = self.registry.slash(&name) else {
                    warn!(command = %name, "failed to match modal to a command");
                    return DispatchOutcome::NotFound(name);
                };
                let Some(handler) = cmd.modal_handler() else {
                    error!(command = %name, "command has no modal handler");
                    return DispatchOutcome::NoModalHandler(name);
                };
                let ctx = ModalContext {
                    state: &self.state,
                    gateway,
                    responder,
                    submission: sub,
                };
                finish(name, handler.submit(&ctx).await)
            }
            IncomingInteraction::Other { kind } => {
                debug!(kind = %kind, "ignoring interaction");
                DispatchOutcome::Ignored
            }
        }
    }
}

fn finish(name: String, res: Result<()>) -> DispatchOutcome {
    match res {
        Ok(()) => DispatchOutcome::Handled(name),
        Err(Error::Validation(msg)) => {
            warn!(command = %name, reason = %msg, "rejected invalid input");
            DispatchOutcome::Failed(name)
        }
        Err(e) => {
            error!(command = %name, error = %e, "handler failed");
            DispatchOutcome::Failed(name)
        }
    }
}
