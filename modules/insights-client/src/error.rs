use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Parse error: {0}")]
    Decode(#[from] serde_json::Error),
}
