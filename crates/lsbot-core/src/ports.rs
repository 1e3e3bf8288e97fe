use async_trait::async_trait;

use crate::Result;

/// What the bot needs to know about a show from the metadata service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimeDetails {
    pub name: String,
    pub airing: bool,
    /// Episode count as reported; `-1` when unknown.
    pub episodes: i64,
}

impl AnimeDetails {
    pub const UNKNOWN_NAME: &'static str = "N/A";
    pub const UNKNOWN_EPISODES: i64 = -1;
}

/// Port for the anime-metadata service (MyAnimeList ids).
#[async_trait]
pub trait AnimeLookup: Send + Sync {
    async fn get_anime(&self, show_id: i64) -> Result<AnimeDetails>;
}

/// Port for a paste-hosting service. Returns the public URL of the paste.
#[async_trait]
pub trait PasteService: Send + Sync {
    async fn create_paste(&self, title: &str, body: &str) -> Result<String>;
}

pub fn show_url(show_id: i64) -> String {
    format!("https://myanimelist.net/anime/{show_id}")
}
