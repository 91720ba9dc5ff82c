use crate::channel::{send_frame, Channel, ChannelError};
use crate::frame::{chunk_ack, decode_ack, TransferHeader, ACK_LEN, HEADER_ACK};
use std::time::Duration;
use sw_core::{ArqConfig, Result, SwError};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReport {
    pub chunk_count: usize,
    pub bytes: usize,
    pub header_attempts: u32,
    /// Chunks sent again after a timeout or negative ack.
    pub retransmissions: u32,
}

#[derive(Debug, Clone, Copy)]
enum SendState {
    SendHeader { attempt: u32 },
    SendChunk { index: usize, attempt: u32 },
    Done,
}

/// Sending half of one stop-and-wait transfer.
pub struct ArqSender<'c, C: Channel + ?Sized> {
    channel: &'c C,
    config: ArqConfig,
}

impl<'c, C: Channel + ?Sized> ArqSender<'c, C> {
    pub fn new(channel: &'c C, config: ArqConfig) -> Self {
        Self { channel, config }
    }

    /// Deliver `payload`, returning once the receiver has acknowledged every
    /// chunk. The receiver committing the final chunk is not confirmed beyond
    /// its last ack.
    pub async fn send(&self, payload: &[u8]) -> Result<SendReport> {
        let chunk_size = self.config.chunk_size;
        let header = TransferHeader::plan(payload.len(), chunk_size)?;
        let mut report = SendReport {
            chunk_count: header.chunk_count(),
            bytes: payload.len(),
            ..Default::default()
        };
        debug!(bytes = payload.len(), chunks = header.chunk_count, last = header.last_chunk_len, "starting transfer");

        let mut state = SendState::SendHeader { attempt: 1 };
        loop {
            state = match state {
                SendState::SendHeader { attempt } => {
                    if attempt > self.config.max_header_attempts {
                        return Err(SwError::Timeout { phase: "header", attempts: attempt - 1 });
                    }
                    report.header_attempts = attempt;
                    self.transmit(&header.encode()).await?;
                    match self.await_ack(self.config.header_ack_timeout()).await? {
                        Some(HEADER_ACK) if header.chunk_count == 0 => SendState::Done,
                        Some(HEADER_ACK) => {
                            debug!(attempt, "header acknowledged");
                            SendState::SendChunk { index: 0, attempt: 1 }
                        }
                        other => {
                            warn!(attempt, ack = ?other, "no header ack, resending header");
                            SendState::SendHeader { attempt: attempt + 1 }
                        }
                    }
                }
                SendState::SendChunk { index, attempt } => {
                    if attempt > self.config.max_chunk_attempts {
                        return Err(SwError::Timeout { phase: "chunk", attempts: attempt - 1 });
                    }
                    if attempt > 1 {
                        report.retransmissions += 1;
                    }
                    self.transmit(header.chunk(payload, index, chunk_size)).await?;
                    match self.await_ack(self.config.chunk_ack_timeout()).await? {
                        Some(ack) if ack >= chunk_ack(index) => {
                            trace!(index, ack, "chunk acknowledged");
                            if index + 1 == header.chunk_count() {
                                SendState::Done
                            } else {
                                SendState::SendChunk { index: index + 1, attempt: 1 }
                            }
                        }
                        Some(ack) => {
                            warn!(index, ack, attempt, "negative ack, resending chunk");
                            SendState::SendChunk { index, attempt: attempt + 1 }
                        }
                        None => {
                            warn!(index, attempt, "chunk ack timed out, resending chunk");
                            SendState::SendChunk { index, attempt: attempt + 1 }
                        }
                    }
                }
                SendState::Done => break,
            };
        }

        info!(
            bytes = report.bytes,
            chunks = report.chunk_count,
            retransmissions = report.retransmissions,
            "transfer sent"
        );
        Ok(report)
    }

    async fn transmit(&self, frame: &[u8]) -> Result<()> {
        trace!(len = frame.len(), "-> {:?}", frame);
        send_frame(self.channel, frame).await
    }

    /// `None` when no readable ack arrived in time.
    async fn await_ack(&self, timeout: Duration) -> Result<Option<u8>> {
        match self.channel.receive_at_least(ACK_LEN, timeout).await {
            Ok(bytes) => {
                trace!(len = bytes.len(), "<- {:?}", bytes);
                let ack = decode_ack(&bytes);
                if ack.is_none() {
                    warn!(?bytes, "unreadable ack");
                }
                Ok(ack)
            }
            Err(ChannelError::Timeout) => Ok(None),
            Err(ChannelError::Failure(reason)) => Err(SwError::ChannelFailure(reason)),
        }
    }
}
