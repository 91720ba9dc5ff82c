use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use sw_arq::{ArqReceiver, ArqSender, Channel, SendReport};
use sw_codec::Codec;
use sw_core::{Result, SignalConfig, SwError};
use tracing::{debug, info, warn};

/// Moves JSON values across one channel: serialize, compress, transfer, and
/// the reverse on the other side.
pub struct Signaler<C: Channel> {
    channel: C,
    config: SignalConfig,
    codec: Codec<'static>,
}

impl<C: Channel> Signaler<C> {
    pub fn new(channel: C, config: SignalConfig) -> Result<Self> {
        config.arq.validate()?;
        let codec = Codec::new(config.codec.clone());
        Ok(Self { channel, config, codec })
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub async fn transmit<T: Serialize + ?Sized>(&self, value: &T) -> Result<SendReport> {
        let json = serde_json::to_string(value)?;
        let stats = self.codec.compress_with_stats(&json);
        if !stats.is_lossless() {
            warn!(collisions = stats.collisions, "payload will not decompress exactly");
        }
        info!(
            json_len = stats.original_len,
            compressed_len = stats.compressed_len,
            "payload compressed {:.1}%",
            stats.reduction_pct
        );
        ArqSender::new(&self.channel, self.config.arq.clone()).send(&stats.output).await
    }

    pub async fn receive<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = ArqReceiver::new(&self.channel, self.config.arq.clone()).receive().await?;
        let json = self.codec.decompress(&bytes)?;
        debug!(compressed_len = bytes.len(), json_len = json.len(), "payload decompressed");
        serde_json::from_str(&json).map_err(|e| SwError::MalformedPayload(format!("payload is not the expected JSON: {e}")))
    }

    /// [`Signaler::transmit`] under a wall-clock deadline.
    pub async fn transmit_within<T: Serialize + ?Sized>(&self, value: &T, deadline: Duration) -> Result<SendReport> {
        within(deadline, self.transmit(value)).await
    }

    /// [`Signaler::receive`] under a wall-clock deadline.
    pub async fn receive_within<T: DeserializeOwned>(&self, deadline: Duration) -> Result<T> {
        within(deadline, self.receive()).await
    }
}

async fn within<T>(deadline: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(?deadline, "deadline elapsed");
            Err(SwError::Timeout { phase: "deadline", attempts: 1 })
        }
    }
}
