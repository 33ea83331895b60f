use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DiscordApiError {
    #[error("Could not initialize the Discord client. {0}")]
    Initialization(String),
    #[error("Error sending request to Discord. {0}")]
    RequestError(String),
    #[error("Discord did not respond in time. {0}")]
    Timeout(String),
    /// Discord refused the action, typically because the recipient's privacy settings block DMs from the bot.
    /// Callers use this to decide whether a fallback channel is worth trying.
    #[error("Discord refused the request. {0}")]
    Forbidden(String),
    #[error("Discord returned an error. Code: {status}, Message: {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not deserialize Discord response. {0}")]
    JsonError(String),
}
