use std::sync::Arc;

use crate::{
    config::Config,
    ports::{AnimeLookup, PasteService},
    store::Store,
};

/// Long-lived dependencies shared by every handler and scheduled task.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub store: Store,
    pub anime: Arc<dyn AnimeLookup>,
    /// `None` when no paste-service key is configured.
    pub paste: Option<Arc<dyn PasteService>>,
}
