use async_trait::async_trait;
use std::time::Duration;
use sw_core::{Result as SwResult, SwError};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The deadline passed: not enough bytes arrived, or a send stalled.
    #[error("timed out")]
    Timeout,
    /// The medium is gone; retrying will not help.
    #[error("{0}")]
    Failure(String),
}

/// Best-effort byte transport shared by both transfer roles. Frames may be
/// dropped silently; only an outright failure is reported as such.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send(&self, bytes: &[u8]) -> Result<(), ChannelError>;

    /// Wait until at least `min_bytes` have arrived and return everything read,
    /// or give up after `timeout`.
    async fn receive_at_least(&self, min_bytes: usize, timeout: Duration) -> Result<Vec<u8>, ChannelError>;
}

/// Send one frame. A send that times out counts as a lost frame and is left
/// to the ack timeout of the caller.
pub(crate) async fn send_frame<C: Channel + ?Sized>(channel: &C, frame: &[u8]) -> SwResult<()> {
    match channel.send(frame).await {
        Ok(()) => Ok(()),
        Err(ChannelError::Timeout) => {
            warn!(len = frame.len(), "send timed out, frame counted as lost");
            Ok(())
        }
        Err(ChannelError::Failure(reason)) => Err(SwError::ChannelFailure(reason)),
    }
}
