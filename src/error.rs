/// Failure kinds surfaced by every public operation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Operation needs a prior login, or was given conflicting/missing tokens.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The provider (or the login UI) rejected the request.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Response parsed but lacked a field the flow depends on.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The user dismissed the interactive login.
    #[error("Login cancelled by user")]
    Cancelled,

    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// `true` when the user walked away from an interactive login.
    ///
    /// Callers usually treat this as a non-event rather than a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Non-2xx response whose body could not be interpreted.
#[derive(Debug, thiserror::Error)]
#[error("HTTP {status}: {body}")]
pub struct HttpStatus {
    pub status: u16,
    pub body: String,
}

impl From<HttpStatus> for Error {
    fn from(e: HttpStatus) -> Self {
        Self::Transport(Box::new(e))
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Box::new(e))
    }
}
