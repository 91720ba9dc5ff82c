use crate::signaler::Signaler;
use async_trait::async_trait;
use sw_arq::Channel;
use sw_core::{HandshakePayload, Result, SdpType, SwError};
use tracing::{debug, info};

/// The local peer connection, as far as the handshake needs it.
#[async_trait]
pub trait PeerNegotiator: Send + Sync {
    /// Create a local offer and gather its candidates.
    async fn create_offer(&self) -> anyhow::Result<HandshakePayload>;
    /// Apply the remote offer and its candidates; return the local answer.
    async fn accept_offer(&self, offer: &HandshakePayload) -> anyhow::Result<HandshakePayload>;
    async fn apply_answer(&self, answer: &HandshakePayload) -> anyhow::Result<()>;
}

/// Offering side: send our offer, wait for the answer and apply it.
/// Returns the remote answer.
pub async fn connect<C, N>(signaler: &Signaler<C>, negotiator: &N) -> Result<HandshakePayload>
where
    C: Channel,
    N: PeerNegotiator + ?Sized,
{
    let offer = negotiator.create_offer().await?;
    debug!(candidates = offer.candidates().len(), "sending offer");
    signaler.transmit(&offer).await?;

    let answer: HandshakePayload = signaler.receive().await?;
    expect_kind(&answer, SdpType::Answer)?;
    negotiator.apply_answer(&answer).await?;
    info!(candidates = answer.candidates().len(), "answer applied");
    Ok(answer)
}

/// Answering side: wait for an offer, answer it and send the answer back.
/// Returns the remote offer.
pub async fn accept<C, N>(signaler: &Signaler<C>, negotiator: &N) -> Result<HandshakePayload>
where
    C: Channel,
    N: PeerNegotiator + ?Sized,
{
    let offer: HandshakePayload = signaler.receive().await?;
    expect_kind(&offer, SdpType::Offer)?;
    debug!(candidates = offer.candidates().len(), "offer received");

    let answer = negotiator.accept_offer(&offer).await?;
    signaler.transmit(&answer).await?;
    info!(candidates = answer.candidates().len(), "answer sent");
    Ok(offer)
}

fn expect_kind(payload: &HandshakePayload, kind: SdpType) -> Result<()> {
    let got = payload.description().sdp_type;
    if got != kind {
        return Err(SwError::MalformedPayload(format!("expected {kind:?}, got {got:?}")));
    }
    Ok(())
}
