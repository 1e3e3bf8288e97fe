/// Core error type for the bot.
///
/// Adapter crates map their specific errors (serenity, reqwest) into this type so
/// handlers can decide between a generic apology and a targeted reply.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// User input that could not be interpreted (e.g. a non-numeric modal field).
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
