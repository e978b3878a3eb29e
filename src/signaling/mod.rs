//! Signaling Adapter: a bidirectional typed channel to the signaling server
//! (SPEC_FULL.md §2, §6 "Signaling contract").
//!
//! Grounded on `rpc/mod.rs`'s `RpcSession` trait, which exposes
//! `connect`/`send_command`/`subscribe`/`on_connection_loss` over a
//! WebSocket transport. This crate's [`SignalingTransport`] keeps
//! the same connected-bool-plus-typed-calls-plus-event-stream shape but is
//! implementation-agnostic: any carrier (WebSocket, GraphQL subscription,
//! an in-memory channel for tests) that can move [`protocol::Command`]s out
//! and [`protocol::Event`]s in qualifies.

pub mod graphql;
pub mod protocol;

use async_trait::async_trait;
use derive_more::{Display, From};
use futures::stream::LocalBoxStream;
use tracerr::Traced;

pub use protocol::{Command, Event};

/// Errors raised sending a [`Command`] or establishing the transport.
#[derive(Clone, Debug, Display, From)]
pub enum SignalingError {
    #[display(fmt = "signaling transport is not connected")]
    NotConnected,

    #[display(fmt = "signaling server rejected the request: {}", _0)]
    #[from(ignore)]
    Rejected(String),

    #[display(fmt = "signaling transport failed: {}", _0)]
    #[from(ignore)]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, Traced<SignalingError>>;

/// Host-implemented bidirectional signaling channel.
///
/// Calls acknowledge with at least a room id, per SPEC_FULL.md §6; events
/// are delivered as an async stream so the Call Orchestrator can
/// `select!`/poll it alongside peer-connection and data-channel events on
/// the same single-threaded executor (SPEC_FULL.md §5).
#[cfg_attr(feature = "mockable", mockall::automock)]
#[async_trait(?Send)]
pub trait SignalingTransport {
    /// Whether the transport currently reports itself connected.
    fn is_connected(&self) -> bool;

    /// Subscribes the room identified by `id`, acknowledging with the room id.
    async fn connect(&self, id: &str) -> Result<String>;

    /// Unsubscribes the room identified by `id`.
    async fn disconnect(&self, id: &str) -> Result<String>;

    /// Notifies the server this side is finishing the call for room `id`.
    async fn finish(&self, id: &str) -> Result<String>;

    /// Sends a locally generated SDP offer for `room_id`.
    async fn send_sdp_offer(&self, sdp: &str, room_id: &str) -> Result<String>;

    /// Sends a locally generated SDP answer for `room_id`.
    async fn send_sdp_answer(&self, sdp: &str, room_id: &str) -> Result<String>;

    /// Sends a locally discovered ICE candidate for `room_id`.
    async fn send_ice_candidate(&self, candidate: &str, room_id: &str) -> Result<String>;

    /// Returns a stream of inbound [`Event`]s. Implementations should be
    /// tolerant of being polled exactly once per transport instance; the
    /// Call Orchestrator keeps and drives a single stream per call.
    fn events(&self) -> LocalBoxStream<'static, Event>;
}
