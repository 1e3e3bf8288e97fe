use std::sync::Arc;

use serenity::{
    all::{Context, EventHandler, Interaction, Message, Ready},
    async_trait,
};
use tracing::debug;

use lsbot_core::{
    dispatch::{DispatchOutcome, Dispatcher, ReadyInfo},
    messaging::types::IncomingInteraction,
};

use crate::{convert, DiscordGateway, DiscordResponder};

/// Serenity event handler: converts gateway events and hands them to the dispatcher.
pub struct Handler {
    dispatcher: Arc<Dispatcher>,
}

impl Handler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let info = ReadyInfo {
            user_name: ready.user.name.clone(),
            guild_count: ready.guilds.len(),
        };
        self.dispatcher
            .on_ready(info, Arc::new(DiscordGateway::new(ctx.http.clone())));
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let gateway = DiscordGateway::new(ctx.http.clone());
        let outcome = self
            .dispatcher
            .on_message(&gateway, &convert::text_message(&msg))
            .await;
        log_outcome(&outcome);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let gateway = DiscordGateway::new(ctx.http.clone());

        let outcome = match &interaction {
            Interaction::Command(cmd) => {
                let responder = DiscordResponder::command(&ctx.http, cmd);
                let incoming = IncomingInteraction::Command(convert::command_invocation(cmd));
                self.dispatcher
                    .on_interaction(&gateway, &responder, &incoming)
                    .await
            }
            Interaction::Modal(modal) => {
                let responder = DiscordResponder::modal(&ctx.http, modal);
                let incoming = IncomingInteraction::ModalSubmit(convert::modal_submission(modal));
                self.dispatcher
                    .on_interaction(&gateway, &responder, &incoming)
                    .await
            }
            other => {
                let responder = DiscordResponder::unanswerable(&ctx.http);
                let incoming = convert::other_interaction(other);
                self.dispatcher
                    .on_interaction(&gateway, &responder, &incoming)
                    .await
            }
        };
        log_outcome(&outcome);
    }
}

fn log_outcome(outcome: &DispatchOutcome) {
    if !matches!(outcome, DispatchOutcome::Ignored) {
        debug!(?outcome, "dispatch finished");
    }
}
