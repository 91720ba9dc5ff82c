//! In-process half-duplex medium with scriptable loss, for tests and demos.

use crate::channel::{Channel, ChannelError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::trace;

type FramePredicate = Box<dyn FnMut(usize, &[u8]) -> bool + Send>;
type FrameTamper = Box<dyn FnMut(&mut Vec<u8>) + Send>;

/// Faults applied to the frames one endpoint sends. Frames are numbered
/// from 0 in send order.
#[derive(Default)]
pub struct FaultPlan {
    drop_frames: HashSet<usize>,
    drop_when: Option<FramePredicate>,
    tamper: Vec<(usize, FrameTamper)>,
    fail_after: Option<usize>,
}

impl FaultPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lose frame `n` silently.
    pub fn drop_nth(mut self, n: usize) -> Self {
        self.drop_frames.insert(n);
        self
    }

    /// Lose every frame for which `pred(n, frame)` holds.
    pub fn drop_when(mut self, pred: impl FnMut(usize, &[u8]) -> bool + Send + 'static) -> Self {
        self.drop_when = Some(Box::new(pred));
        self
    }

    /// Rewrite frame `n` in flight.
    pub fn tamper_nth(mut self, n: usize, f: impl FnMut(&mut Vec<u8>) + Send + 'static) -> Self {
        self.tamper.push((n, Box::new(f)));
        self
    }

    /// Report a channel failure for every send after the first `n`.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    fn apply(&mut self, n: usize, frame: &[u8]) -> Result<Option<Vec<u8>>, ChannelError> {
        if self.fail_after.is_some_and(|limit| n >= limit) {
            return Err(ChannelError::Failure(format!("send {n} refused by fault plan")));
        }
        if self.drop_frames.contains(&n) || self.drop_when.as_mut().is_some_and(|pred| pred(n, frame)) {
            return Ok(None);
        }
        let mut frame = frame.to_vec();
        for (_, f) in self.tamper.iter_mut().filter(|(at, _)| *at == n) {
            f(&mut frame);
        }
        Ok(Some(frame))
    }
}

/// One endpoint of a [`MemoryChannel::pair`].
pub struct MemoryChannel {
    outgoing: mpsc::UnboundedSender<Vec<u8>>,
    incoming: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    faults: Mutex<FaultPlan>,
    sent: AtomicUsize,
}

impl MemoryChannel {
    pub fn pair() -> (Self, Self) {
        Self::pair_with_faults(FaultPlan::default(), FaultPlan::default())
    }

    /// `a_faults` applies to frames sent by the first endpoint, `b_faults` to
    /// frames sent by the second.
    pub fn pair_with_faults(a_faults: FaultPlan, b_faults: FaultPlan) -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        let a = Self {
            outgoing: a_tx,
            incoming: tokio::sync::Mutex::new(a_rx),
            faults: Mutex::new(a_faults),
            sent: AtomicUsize::new(0),
        };
        let b = Self {
            outgoing: b_tx,
            incoming: tokio::sync::Mutex::new(b_rx),
            faults: Mutex::new(b_faults),
            sent: AtomicUsize::new(0),
        };
        (a, b)
    }

    /// Frames this endpoint has sent, lost ones included.
    pub fn frames_sent(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn send(&self, bytes: &[u8]) -> Result<(), ChannelError> {
        let n = self.sent.fetch_add(1, Ordering::Relaxed);
        let outcome = self.faults.lock().apply(n, bytes)?;
        match outcome {
            // A vanished peer looks like loss from this side.
            Some(frame) => {
                if self.outgoing.send(frame).is_err() {
                    trace!(frame = n, "peer gone, frame lost");
                }
            }
            None => trace!(frame = n, "frame dropped"),
        }
        Ok(())
    }

    async fn receive_at_least(&self, min_bytes: usize, timeout: Duration) -> Result<Vec<u8>, ChannelError> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut incoming = self.incoming.lock().await;
        let mut buf = Vec::new();
        while buf.len() < min_bytes {
            match tokio::time::timeout_at(deadline, incoming.recv()).await {
                Ok(Some(frame)) => buf.extend_from_slice(&frame),
                Ok(None) => return Err(ChannelError::Failure("peer endpoint closed".into())),
                Err(_) => return Err(ChannelError::Timeout),
            }
        }
        Ok(buf)
    }
}
