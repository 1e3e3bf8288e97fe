use std::{env, path::PathBuf, time::Duration};

use crate::{
    domain::{ChannelId, GuildId, RoleId, UserId},
    errors::Error,
    Result,
};

const DEFAULT_DATABASE_PATH: &str = "database.db";
const DEFAULT_JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";
const DEFAULT_TRACK_UPDATE_SECS: u64 = 5 * 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Typed configuration, read from the environment (and `.env` when present).
#[derive(Clone, Debug)]
pub struct Config {
    // Required
    pub bot_token: String,
    pub prefix: String,
    pub client_id: u64,

    // Operator guild + permission gating
    pub guild_id: Option<GuildId>,
    pub member_role_id: Option<RoleId>,
    pub weeb_role_id: Option<RoleId>,
    pub owner_ids: Vec<UserId>,

    // Display / announcements
    pub list_emoji: String,
    pub announce_channel_id: Option<ChannelId>,

    // Storage
    pub database_path: PathBuf,

    // External services
    pub pastebin_api_key: Option<String>,
    pub jikan_base_url: String,
    pub http_timeout: Duration,

    // Scheduled updates
    pub track_update_interval: Duration,
}

impl Config {
    /// Load from the process environment, honoring `.env` without overriding
    /// variables that are already set.
    pub fn load() -> Result<Self> {
        // A missing .env is the normal production case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let bot_token = get("BOT_TOKEN").ok_or_else(|| missing("BOT_TOKEN"))?;
        let prefix = get("PREFIX").ok_or_else(|| missing("PREFIX"))?;
        let client_id = get("CLIENT_ID")
            .ok_or_else(|| missing("CLIENT_ID"))
            .and_then(|v| parse_id("CLIENT_ID", &v))?;

        let guild_id = optional_id(&get, "GUILD_ID")?.map(GuildId);
        let member_role_id = optional_id(&get, "MEMBER_ROLE_ID")?.map(RoleId);
        let weeb_role_id = optional_id(&get, "WEEB_ROLE_ID")?.map(RoleId);
        let owner_ids = parse_csv_u64("BOT_OWNER_IDS", get("BOT_OWNER_IDS"))?
            .into_iter()
            .map(UserId)
            .collect();

        let list_emoji = get("THE_LIST_EMOJI").unwrap_or_default();
        let announce_channel_id = optional_id(&get, "WEEB_CHANNEL_ID")?.map(ChannelId);

        let database_path =
            PathBuf::from(get("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.into()));

        let pastebin_api_key = get("PASTEBIN_API_KEY");
        let jikan_base_url = get("JIKAN_BASE_URL")
            .unwrap_or_else(|| DEFAULT_JIKAN_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();
        let http_timeout = Duration::from_secs(
            optional_u64(&get, "HTTP_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        let track_secs =
            optional_u64(&get, "TRACK_UPDATE_INTERVAL_SECS")?.unwrap_or(DEFAULT_TRACK_UPDATE_SECS);
        if track_secs == 0 {
            return Err(Error::Config(
                "TRACK_UPDATE_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bot_token,
            prefix,
            client_id,
            guild_id,
            member_role_id,
            weeb_role_id,
            owner_ids,
            list_emoji,
            announce_channel_id,
            database_path,
            pastebin_api_key,
            jikan_base_url,
            http_timeout,
            track_update_interval: Duration::from_secs(track_secs),
        })
    }

    /// `**The List**` followed by the configured emoji, if any.
    pub fn list_label(&self) -> String {
        if self.list_emoji.is_empty() {
            "**The List**".to_string()
        } else {
            format!("**The List** {}", self.list_emoji)
        }
    }

    /// Whether `user` may run privileged message commands. An empty owner list means everyone.
    pub fn is_owner(&self, user: UserId) -> bool {
        self.owner_ids.is_empty() || self.owner_ids.contains(&user)
    }
}

fn missing(key: &str) -> Error {
    Error::Config(format!("{key} environment variable is required"))
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn parse_u64(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{key} must be a numeric id, got '{raw}'")))
}

/// Discord snowflakes are never zero.
fn parse_id(key: &str, raw: &str) -> Result<u64> {
    match parse_u64(key, raw)? {
        0 => Err(Error::Config(format!("{key} must be a non-zero id"))),
        id => Ok(id),
    }
}

fn optional_id(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    get(key).map(|v| parse_id(key, &v)).transpose()
}

fn optional_u64(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    get(key).map(|v| parse_u64(key, &v)).transpose()
}

fn parse_csv_u64(key: &str, v: Option<String>) -> Result<Vec<u64>> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| parse_id(key, s))
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        bot_token: "x".to_string(),
        prefix: "!".to_string(),
        client_id: 1,
        guild_id: None,
        member_role_id: None,
        weeb_role_id: None,
        owner_ids: vec![],
        list_emoji: String::new(),
        announce_channel_id: Some(ChannelId(500)),
        database_path: ":memory:".into(),
        pastebin_api_key: None,
        jikan_base_url: DEFAULT_JIKAN_BASE_URL.to_string(),
        http_timeout: Duration::from_secs(1),
        track_update_interval: Duration::from_secs(300),
    }
}
