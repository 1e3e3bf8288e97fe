//! Jikan adapter (unofficial MyAnimeList API, v4).
//!
//! Implements the core `AnimeLookup` port with a single `GET /anime/{id}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use lsbot_core::{
    errors::Error,
    ports::{AnimeDetails, AnimeLookup},
    Result,
};

#[derive(Clone, Debug)]
pub struct JikanClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AnimeResponse {
    data: Option<AnimeData>,
}

#[derive(Debug, Deserialize)]
struct AnimeData {
    title_english: Option<String>,
    airing: Option<bool>,
    episodes: Option<i64>,
}

impl JikanClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("jikan client build error: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn anime_url(&self, show_id: i64) -> String {
        format!("{}/anime/{show_id}", self.base_url)
    }
}

#[async_trait]
impl AnimeLookup for JikanClient {
    async fn get_anime(&self, show_id: i64) -> Result<AnimeDetails> {
        let url = self.anime_url(show_id);
        debug!(%url, "jikan request");

        let resp = self.http.get(&url).send().await.map_err(|e| {
            error!(show_id, error = %e, "failed to find anime");
            Error::External(format!("jikan request error: {e}"))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            error!(show_id, %status, "failed to find anime");
            return Err(Error::External(format!(
                "jikan lookup of {show_id} failed: {status}"
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::External(format!("jikan body error: {e}")))?;
        parse_anime(&body)
    }
}

/// Extract what the bot needs from an `/anime/{id}` response.
///
/// Missing or empty values fall back to `N/A`, not airing, and `-1` episodes.
pub fn parse_anime(body: &str) -> Result<AnimeDetails> {
    let resp: AnimeResponse = serde_json::from_str(body)?;
    let data = resp
        .data
        .ok_or_else(|| Error::External("jikan response has no data".to_string()))?;

    Ok(AnimeDetails {
        name: data
            .title_english
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| AnimeDetails::UNKNOWN_NAME.to_string()),
        airing: data.airing.unwrap_or(false),
        episodes: data
            .episodes
            .filter(|n| *n > 0)
            .unwrap_or(AnimeDetails::UNKNOWN_EPISODES),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_response() {
        let body = r#"{
            "data": {
                "mal_id": 5114,
                "title": "Fullmetal Alchemist: Brotherhood",
                "title_english": "Fullmetal Alchemist: Brotherhood",
                "airing": false,
                "episodes": 64
            }
        }"#;
        let d = parse_anime(body).unwrap();
        assert_eq!(d.name, "Fullmetal Alchemist: Brotherhood");
        assert!(!d.airing);
        assert_eq!(d.episodes, 64);
    }

    #[test]
    fn missing_fields_fall_back() {
        let body = r#"{"data": {"title_english": null, "airing": true, "episodes": null}}"#;
        let d = parse_anime(body).unwrap();
        assert_eq!(d.name, "N/A");
        assert!(d.airing);
        assert_eq!(d.episodes, -1);

        let d = parse_anime(r#"{"data": {"title_english": "", "episodes": 0}}"#).unwrap();
        assert_eq!(d.name, "N/A");
        assert!(!d.airing);
        assert_eq!(d.episodes, -1);
    }

    #[test]
    fn malformed_bodies_are_errors() {
        assert!(matches!(parse_anime("not json"), Err(Error::Json(_))));
        assert!(matches!(
            parse_anime(r#"{"status": 404}"#),
            Err(Error::External(_))
        ));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let c = JikanClient::new("https://api.jikan.moe/v4/", Duration::from_secs(1)).unwrap();
        assert_eq!(c.anime_url(1), "https://api.jikan.moe/v4/anime/1");
    }

    #[tokio::test]
    async fn connection_failure_is_external() {
        let c = JikanClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        assert!(matches!(c.get_anime(1).await, Err(Error::External(_))));
    }
}
