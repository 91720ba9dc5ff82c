use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwError {
    #[error("Channel failure: {0}")]
    ChannelFailure(String),
    #[error("Timed out in {phase} after {attempts} attempts")]
    Timeout { phase: &'static str, attempts: u32 },
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Payload too large: {len} bytes, at most {max} fit in one transfer")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SwError {
    /// Whether the whole transfer should be abandoned (as opposed to retried
    /// under a fresh outer deadline).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SwError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, SwError>;
