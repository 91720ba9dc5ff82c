use crate::channel::{send_frame, Channel, ChannelError};
use crate::frame::{chunk_ack, chunk_nack, encode_ack, TransferHeader, HEADER_ACK, HEADER_LEN};
use std::time::Duration;
use sw_core::{ArqConfig, Result, SwError};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveReport {
    pub chunk_count: usize,
    pub bytes: usize,
    /// Listen windows used before a valid header arrived.
    pub listen_attempts: u32,
    pub negative_acks: u32,
}

#[derive(Debug, Clone, Copy)]
enum ReceiveState {
    AwaitHeader { attempt: u32 },
    AwaitChunk { header: TransferHeader, index: usize, attempt: u32 },
    Done,
}

/// Receiving half of one stop-and-wait transfer.
pub struct ArqReceiver<'c, C: Channel + ?Sized> {
    channel: &'c C,
    config: ArqConfig,
}

impl<'c, C: Channel + ?Sized> ArqReceiver<'c, C> {
    pub fn new(channel: &'c C, config: ArqConfig) -> Self {
        Self { channel, config }
    }

    pub async fn receive(&self) -> Result<Vec<u8>> {
        self.receive_with_report().await.map(|(payload, _)| payload)
    }

    /// Listen for a header, then collect its chunks in order.
    pub async fn receive_with_report(&self) -> Result<(Vec<u8>, ReceiveReport)> {
        let chunk_size = self.config.chunk_size;
        let mut report = ReceiveReport::default();
        let mut payload = Vec::new();

        let mut state = ReceiveState::AwaitHeader { attempt: 1 };
        loop {
            state = match state {
                ReceiveState::AwaitHeader { attempt } => {
                    if attempt > self.config.max_listen_attempts {
                        return Err(SwError::Timeout { phase: "listen", attempts: attempt - 1 });
                    }
                    report.listen_attempts = attempt;
                    match self.read(HEADER_LEN, self.config.listen_timeout()).await? {
                        None => {
                            trace!(attempt, "no header yet");
                            ReceiveState::AwaitHeader { attempt: attempt + 1 }
                        }
                        Some(bytes) => match TransferHeader::decode(&bytes, chunk_size) {
                            Ok(header) => {
                                debug!(chunks = header.chunk_count, last = header.last_chunk_len, "header received");
                                self.ack(HEADER_ACK).await?;
                                report.chunk_count = header.chunk_count();
                                payload.reserve_exact(header.payload_len(chunk_size));
                                if header.chunk_count == 0 {
                                    ReceiveState::Done
                                } else {
                                    ReceiveState::AwaitChunk { header, index: 0, attempt: 1 }
                                }
                            }
                            Err(e) => {
                                warn!(attempt, "ignoring header: {e}");
                                ReceiveState::AwaitHeader { attempt: attempt + 1 }
                            }
                        },
                    }
                }
                ReceiveState::AwaitChunk { header, index, attempt } => {
                    if attempt > self.config.max_chunk_attempts {
                        return Err(SwError::Timeout { phase: "chunk", attempts: attempt - 1 });
                    }
                    let expected = header.chunk_len(index, chunk_size);
                    match self.read_chunk(&header, index, expected).await? {
                        Some(bytes) if bytes.len() == expected => {
                            payload.extend_from_slice(&bytes);
                            self.ack(chunk_ack(index)).await?;
                            if index + 1 == header.chunk_count() {
                                ReceiveState::Done
                            } else {
                                ReceiveState::AwaitChunk { header, index: index + 1, attempt: 1 }
                            }
                        }
                        other => {
                            match other {
                                Some(bytes) => warn!(index, expected, got = bytes.len(), "chunk has wrong length, requesting it again"),
                                None => warn!(index, attempt, "chunk timed out, requesting it again"),
                            }
                            report.negative_acks += 1;
                            self.ack(chunk_nack(index)).await?;
                            ReceiveState::AwaitChunk { header, index, attempt: attempt + 1 }
                        }
                    }
                }
                ReceiveState::Done => break,
            };
        }

        report.bytes = payload.len();
        info!(bytes = report.bytes, chunks = report.chunk_count, negative_acks = report.negative_acks, "transfer received");
        Ok((payload, report))
    }

    /// `None` on timeout.
    async fn read(&self, min_bytes: usize, timeout: Duration) -> Result<Option<Vec<u8>>> {
        match self.channel.receive_at_least(min_bytes, timeout).await {
            Ok(bytes) => {
                trace!(len = bytes.len(), "<- {:?}", bytes);
                Ok(Some(bytes))
            }
            Err(ChannelError::Timeout) => Ok(None),
            Err(ChannelError::Failure(reason)) => Err(SwError::ChannelFailure(reason)),
        }
    }

    /// Gather one chunk's bytes within a single receive window. `None` if
    /// the window closes first; the result may be longer than `expected`.
    ///
    /// Until chunk 0 is in, the sender may still be repeating the header.
    /// Whole leading copies of it are dropped, not taken as data.
    async fn read_chunk(&self, header: &TransferHeader, index: usize, expected: usize) -> Result<Option<Vec<u8>>> {
        let deadline = Instant::now() + self.config.chunk_receive_timeout();
        let repeated = header.encode();
        let mut bytes = Vec::with_capacity(expected);
        while bytes.len() < expected {
            let window = deadline.saturating_duration_since(Instant::now());
            let Some(more) = self.read(expected - bytes.len(), window).await? else {
                return Ok(None);
            };
            bytes.extend_from_slice(&more);
            if index == 0 {
                let copies = bytes.chunks_exact(HEADER_LEN).take_while(|c| **c == repeated[..]).count();
                if copies > 0 {
                    debug!(copies, "dropping repeated header");
                    bytes.drain(..copies * HEADER_LEN);
                }
            }
        }
        Ok(Some(bytes))
    }

    async fn ack(&self, value: u8) -> Result<()> {
        trace!(value, "-> ack");
        send_frame(self.channel, &encode_ack(value)).await
    }
}
