use thiserror::Error;

#[derive(Debug, Error)]
pub enum FnosError {
    /// The client has no usable session; callers may `reconnect()` and retry.
    #[error("Not connected to fnOS")]
    NotConnected,

    #[error("fnOS API error: {0}")]
    Api(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Integration not ready: {0}")]
    NotReady(#[source] Box<FnosError>),

    #[error("Refresh timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("HTTP server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FnosError {
    pub fn is_not_connected(&self) -> bool {
        matches!(self, FnosError::NotConnected)
    }

    /// Wraps a setup-time failure so the caller knows to retry later.
    pub fn not_ready(err: FnosError) -> Self {
        match err {
            FnosError::NotReady(_) => err,
            other => FnosError::NotReady(Box::new(other)),
        }
    }
}

pub type Result<T> = std::result::Result<T, FnosError>;

/// Outcome of validating user-supplied connection settings.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Cannot connect to fnOS: {0}")]
    CannotConnect(String),

    #[error("Invalid authentication: {0}")]
    InvalidAuth(String),

    #[error("Invalid setup input: {0}")]
    InvalidInput(String),
}

impl SetupError {
    /// Stable error key for user-facing forms.
    pub fn key(&self) -> &'static str {
        match self {
            SetupError::CannotConnect(_) => "cannot_connect",
            SetupError::InvalidAuth(_) => "invalid_auth",
            SetupError::InvalidInput(_) => "invalid_input",
        }
    }
}
