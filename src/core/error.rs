use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport failure against '{origin}': {message}")]
    Transport { origin: String, message: String },

    #[error("Unresolvable redirect: {0}")]
    RedirectUnresolvable(String),

    #[error("{message}")]
    Application {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    #[error("Request deadline of {0:?} exceeded")]
    DeadlineExceeded(std::time::Duration),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// True when no HTTP response reached the client.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status carried by an application error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
