//! Pastebin adapter.
//!
//! Implements the core `PasteService` port with the form-encoded `api_post.php` call.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use lsbot_core::{errors::Error, ports::PasteService, Result};

pub const API_URL: &str = "https://pastebin.com/api/api_post.php";

#[derive(Clone, Debug)]
pub struct PastebinClient {
    api_key: String,
    endpoint: String,
    http: reqwest::Client,
}

impl PastebinClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("pastebin client build error: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            endpoint: API_URL.to_string(),
            http,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Unlisted paste that expires after a day.
    fn form<'a>(&'a self, title: &'a str, body: &'a str) -> [(&'static str, &'a str); 6] {
        [
            ("api_dev_key", self.api_key.as_str()),
            ("api_option", "paste"),
            ("api_paste_code", body),
            ("api_paste_name", title),
            ("api_paste_private", "1"),
            ("api_paste_expire_date", "1D"),
        ]
    }
}

#[async_trait]
impl PasteService for PastebinClient {
    async fn create_paste(&self, title: &str, body: &str) -> Result<String> {
        let resp = self
            .http
            .post(&self.endpoint)
            .form(&self.form(title, body))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to create paste");
                Error::External(format!("pastebin request error: {e}"))
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::External(format!("pastebin body error: {e}")))?;

        let url = paste_url(status.is_success(), &text)?;
        info!(%url, "created paste");
        Ok(url)
    }
}

/// Pastebin answers `200 OK` with an error sentence on bad requests, so the body
/// has to look like a URL to count as success.
fn paste_url(ok_status: bool, body: &str) -> Result<String> {
    let body = body.trim();
    if ok_status && body.starts_with("http") {
        return Ok(body.to_string());
    }
    error!(body = %body.chars().take(200).collect::<String>(), "failed to create paste");
    Err(Error::External(format!(
        "pastebin rejected paste: {}",
        body.chars().take(200).collect::<String>()
    )))
}
