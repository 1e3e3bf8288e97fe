use std::sync::Arc;

use serenity::{
    all::{ApplicationId, GatewayIntents},
    Client,
};
use tracing::{error, info};

use lsbot_core::{config::Config, dispatch::Dispatcher};

use crate::handler::Handler;

pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Connect to the gateway and run until the connection ends or Ctrl-C.
pub async fn run(cfg: Arc<Config>, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let mut client = Client::builder(&cfg.bot_token, intents())
        .event_handler(Handler::new(dispatcher.clone()))
        .application_id(ApplicationId::new(cfg.client_id))
        .await?;

    let shard_manager = client.shard_manager.clone();
    let stopper = dispatcher.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            return;
        }
        info!("shutdown requested");
        stopper.shutdown().await;
        shard_manager.shutdown_all().await;
    });

    info!(prefix = %cfg.prefix, "connecting to discord");
    let res = client.start().await;
    dispatcher.shutdown().await;
    res?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_cover_guild_and_direct_messages() {
        let i = intents();
        assert!(i.contains(GatewayIntents::GUILD_MESSAGES));
        assert!(i.contains(GatewayIntents::DIRECT_MESSAGES));
        assert!(i.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(!i.contains(GatewayIntents::GUILD_PRESENCES));
    }
}
