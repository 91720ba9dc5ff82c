//! Stop-and-wait ARQ over a lossy, half-duplex, chunk-oriented channel.
//!
//! One transfer is a 6-byte header (chunk count and last chunk length, each
//! written three times) followed by the data chunks in order. Every frame is
//! acknowledged with a 3-byte redundant ack before the next one goes out.

pub mod channel;
pub mod frame;
pub mod memory;
pub mod receiver;
pub mod sender;

pub use channel::{Channel, ChannelError};
pub use frame::{TransferHeader, ACK_LEN, HEADER_ACK, HEADER_LEN, MAX_CHUNKS, REDUNDANCY};
pub use memory::{FaultPlan, MemoryChannel};
pub use receiver::{ArqReceiver, ReceiveReport};
pub use sender::{ArqSender, SendReport};
