//! Host-provided data channel contract, and the `{type: "ec", data: {...}}`
//! external-controls wire format exchanged over it (SPEC_FULL.md §4.4,
//! "Data channel").

use async_trait::async_trait;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracerr::Traced;

/// Errors raised sending over a [`DataChannel`].
#[derive(Clone, Debug, Display, From)]
pub enum DataChannelError {
    #[display(fmt = "data channel is not open")]
    NotOpen,

    #[display(fmt = "failed to send over data channel: {}", _0)]
    #[from(ignore)]
    Send(String),
}

pub type Result<T> = std::result::Result<T, Traced<DataChannelError>>;

/// Events a [`DataChannel`] fires back to the orchestrator.
#[derive(Clone, Debug)]
pub enum DataChannelEvent {
    Open,
    Message(String),
    Close,
    Error(String),
}

/// A host-provided ordered data channel, created via
/// [`super::PeerConnection::create_data_channel`].
#[cfg_attr(feature = "mockable", mockall::automock)]
#[async_trait(?Send)]
pub trait DataChannel {
    /// Sends a UTF-8 payload. Errors (rather than silently dropping) when the
    /// channel is not open; callers implementing SPEC_FULL.md's `send()`
    /// consumer operation should treat that as a silent no-op.
    async fn send(&self, data: &str) -> Result<()>;

    /// Whether the channel is currently open and ready to send.
    fn is_open(&self) -> bool;
}

/// Peer-reported `{audio, video}` enabled state, exchanged over the data
/// channel as `{"type": "ec", "data": {...}}`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExternalControls {
    pub audio: bool,
    pub video: bool,
}

/// Tagged envelope for control-plane messages sent over the data channel.
///
/// Anything that doesn't parse as this envelope, or parses with a `type`
/// other than `"ec"`, is forwarded to the consumer as an application
/// `message` event instead (SPEC_FULL.md §4.4).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ControlMessage {
    #[serde(rename = "ec")]
    ExternalControls(ExternalControls),
}
