use crate::error::{Result, SwError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub codec: CodecConfig,
    pub arq: ArqConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Emit input bytes that collide with the escape range behind the
    /// literal-escape token instead of raw.
    pub escape_reserved: bool,
}

/// Stop-and-wait transport settings. All timeouts are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArqConfig {
    pub chunk_size: u8,
    pub header_ack_timeout_ms: u64,
    pub chunk_ack_timeout_ms: u64,
    pub listen_timeout_ms: u64,
    pub chunk_receive_timeout_ms: u64,
    pub max_header_attempts: u32,
    pub max_listen_attempts: u32,
    pub max_chunk_attempts: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self { escape_reserved: true }
    }
}

impl Default for ArqConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            header_ack_timeout_ms: 2_000,
            chunk_ack_timeout_ms: 10_000,
            listen_timeout_ms: 2_000,
            chunk_receive_timeout_ms: 5_000,
            max_header_attempts: 30,
            max_listen_attempts: 300,
            max_chunk_attempts: 8,
        }
    }
}

impl ArqConfig {
    pub fn header_ack_timeout(&self) -> Duration {
        Duration::from_millis(self.header_ack_timeout_ms)
    }

    pub fn chunk_ack_timeout(&self) -> Duration {
        Duration::from_millis(self.chunk_ack_timeout_ms)
    }

    pub fn listen_timeout(&self) -> Duration {
        Duration::from_millis(self.listen_timeout_ms)
    }

    pub fn chunk_receive_timeout(&self) -> Duration {
        Duration::from_millis(self.chunk_receive_timeout_ms)
    }

    /// Reject settings under which the protocol cannot make progress.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SwError::InvalidConfig("chunk_size must be nonzero".into()));
        }
        if self.chunk_receive_timeout_ms >= self.chunk_ack_timeout_ms {
            return Err(SwError::InvalidConfig(format!(
                "chunk_receive_timeout_ms ({}) must be shorter than chunk_ack_timeout_ms ({})",
                self.chunk_receive_timeout_ms, self.chunk_ack_timeout_ms
            )));
        }
        if self.max_header_attempts == 0 || self.max_listen_attempts == 0 || self.max_chunk_attempts == 0 {
            return Err(SwError::InvalidConfig("attempt limits must be at least 1".into()));
        }
        Ok(())
    }
}

impl SignalConfig {
    /// Parse a (possibly partial) JSON document; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: SignalConfig = serde_json::from_str(text)?;
        config.arq.validate()?;
        Ok(config)
    }
}
