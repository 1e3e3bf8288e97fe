use std::sync::Arc;

use lsbot_core::{
    commands::CommandRegistry,
    config::Config,
    dispatch::Dispatcher,
    ports::PasteService,
    state::AppState,
    store::Store,
};
use lsbot_jikan::JikanClient;
use lsbot_pastebin::PastebinClient;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), lsbot_core::Error> {
    lsbot_core::logging::init("lsbot")?;

    let cfg = Arc::new(Config::load()?);
    let store = Store::open(&cfg.database_path).await?;

    let anime = Arc::new(JikanClient::new(&cfg.jikan_base_url, cfg.http_timeout)?);
    let paste: Option<Arc<dyn PasteService>> = match &cfg.pastebin_api_key {
        Some(key) => Some(Arc::new(PastebinClient::new(key, cfg.http_timeout)?)),
        None => {
            warn!("PASTEBIN_API_KEY not set, exports will not be uploaded");
            None
        }
    };

    let state = AppState {
        cfg: cfg.clone(),
        store,
        anime,
        paste,
    };
    let dispatcher = Arc::new(Dispatcher::new(state, CommandRegistry::standard()));

    lsbot_discord::router::run(cfg, dispatcher)
        .await
        .map_err(|e| lsbot_core::Error::External(format!("discord bot failed: {e}")))?;

    Ok(())
}
