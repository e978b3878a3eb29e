//! Adapter to a host-provided RTC peer connection primitive
//! (SPEC_FULL.md §6, "Peer connection contract").
//!
//! Grounded on `peer/mod.rs`'s `RtcPeerConnection` wrapper and `PeerEvent`
//! enum: there, `PeerEvent` is a `#[dispatchable]` macro-generated enum fed
//! by JS-side `web_sys` callbacks. This crate has no JS bridge to dispatch
//! from, so [`PeerEvent`] is a plain enum delivered over an
//! `mpsc::UnboundedSender`, and [`PeerConnection`] is a trait a host
//! implements over whatever concrete RTC stack it embeds (e.g. a
//! `webrtc-rs` `RTCPeerConnection`, or a wasm `web_sys::RtcPeerConnection`).

pub mod data_channel;

use std::fmt;

use async_trait::async_trait;
use derive_more::{Display, From};
use futures::channel::mpsc;
use tracerr::Traced;

use crate::{
    config::RtcConfiguration,
    media::{
        track::{LocalTrack, TrackHandle},
        MediaKind,
    },
};

pub use self::data_channel::{DataChannel, DataChannelEvent};

/// Mirrors the host RTC primitive's `signalingState`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SignalingState {
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
    HaveLocalPranswer,
    HaveRemotePranswer,
    Closed,
}

/// Mirrors the host RTC primitive's `iceConnectionState`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

/// Mirrors the host RTC primitive's `iceGatheringState`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IceGatheringState {
    New,
    Gathering,
    Complete,
}

/// Mirrors the host RTC primitive's `connectionState`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Which half of an SDP offer/answer exchange a [`SessionDescription`] plays.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SdpType {
    Offer,
    Answer,
    Pranswer,
    Rollback,
}

/// An SDP offer or answer, tagged with its [`SdpType`].
#[derive(Clone, Debug)]
pub struct SessionDescription {
    pub sdp_type: SdpType,
    pub sdp: String,
}

/// One ICE candidate, transmitted as JSON over the signaling layer and
/// reconstructed into a host RTC object on arrival (SPEC_FULL.md §6).
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_m_line_index: Option<u16>,
    pub sdp_mid: Option<String>,
}

/// Options for [`PeerConnection::create_offer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct OfferOptions {
    pub offer_to_receive_audio: bool,
    pub offer_to_receive_video: bool,
    pub ice_restart: bool,
}

/// Errors raised by the host [`PeerConnection`] primitive or this crate's
/// wrapping of it.
#[derive(Clone, Debug, Display, From)]
pub enum PeerError {
    #[display(fmt = "host peer connection does not support adding tracks")]
    AddTrackUnsupported,

    #[display(fmt = "failed to create SDP offer/answer: {}", _0)]
    #[from(ignore)]
    SdpCreation(String),

    #[display(fmt = "failed to set local/remote description: {}", _0)]
    #[from(ignore)]
    SetDescription(String),

    #[display(fmt = "failed to add ICE candidate: {}", _0)]
    #[from(ignore)]
    AddIceCandidate(String),

    #[display(fmt = "failed to create data channel: {}", _0)]
    #[from(ignore)]
    DataChannelCreation(String),
}

pub type Result<T> = std::result::Result<T, Traced<PeerError>>;

/// A frame of a remote track arriving on the peer connection.
#[derive(Clone)]
pub struct RemoteTrackEvent {
    pub track_id: String,
    pub kind: MediaKind,

    /// Handle to the arrived track, for peer-stream assembly
    /// (SPEC_FULL.md §4.4, "Peer-stream assembly").
    pub track: TrackHandle,
}

impl fmt::Debug for RemoteTrackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTrackEvent")
            .field("track_id", &self.track_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Events emitted from a [`PeerConnection`], fanned in to the Call
/// Orchestrator's single dispatcher (SPEC_FULL.md §9).
#[derive(Clone, Debug)]
pub enum PeerEvent {
    NegotiationNeeded,
    IceCandidate(IceCandidate),
    Track(RemoteTrackEvent),
    SignalingStateChange(SignalingState),
    IceConnectionStateChange(IceConnectionState),
    IceGatheringStateChange(IceGatheringState),
    ConnectionStateChange(ConnectionState),
    DataChannel(DataChannelEvent),

    /// A previously reported remote track fired `mute`, `unmute`, or `ended`.
    /// Collapsed into one variant since all three produce the same
    /// orchestrator reaction — emitting `track-change` (SPEC_FULL.md §4.4,
    /// "Peer-stream assembly") — and the host is best placed to distinguish
    /// them in its own logging if needed.
    TrackMuteChange(String),
}

/// High-level wrapper contract around a host-provided RTC peer connection.
///
/// Owned exclusively by the Call Orchestrator: at most one instance is live
/// per [`Call`](crate::orchestrator::Call), enforced by the orchestrator
/// always closing and dropping the previous one before creating a new one
/// (SPEC_FULL.md §3 invariant 3).
#[cfg_attr(feature = "mockable", mockall::automock)]
#[async_trait(?Send)]
pub trait PeerConnection {
    /// Current `signalingState`.
    fn signaling_state(&self) -> SignalingState;

    /// Current `iceConnectionState`.
    fn ice_connection_state(&self) -> IceConnectionState;

    /// Current `iceGatheringState`.
    fn ice_gathering_state(&self) -> IceGatheringState;

    /// Current `connectionState`.
    fn connection_state(&self) -> ConnectionState;

    /// Number of local tracks already added via [`Self::add_track`], used to
    /// enforce SPEC_FULL.md §3 invariant 6 (add at most once per lifetime).
    fn senders_count(&self) -> usize;

    /// Adds a local track to be sent to the remote peer.
    async fn add_track(&self, track: &LocalTrack) -> Result<()>;

    /// Attempts to replace the outbound payload of the existing `kind`
    /// sender in place, without renegotiating. Returns `Ok(false)` if the
    /// host RTC primitive has no matching sender to replace (e.g. this kind
    /// was never added) or doesn't support in-place replacement at all; the
    /// caller should then fall back to [`Self::add_track`] followed by a
    /// renegotiation with an ICE restart (SPEC_FULL.md §4.3 "Switch",
    /// §4.4 "device switch").
    async fn replace_track(&self, kind: MediaKind, track: &LocalTrack) -> Result<bool>;

    /// Creates a named data channel.
    async fn create_data_channel(
        &self,
        label: &str,
        ordered: bool,
    ) -> Result<Box<dyn DataChannel>>;

    /// Creates an SDP offer with the given `options`.
    async fn create_offer(&self, options: OfferOptions) -> Result<String>;

    /// Creates an SDP answer to a previously set remote offer.
    async fn create_answer(&self) -> Result<String>;

    /// Sets the local description.
    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    /// Sets the remote description.
    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    /// Returns whether a remote description is currently set (SPEC_FULL.md
    /// §3 invariant 1).
    fn has_remote_description(&self) -> bool;

    /// Applies a remote ICE candidate. Must only be called when
    /// [`Self::has_remote_description`] is `true`.
    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Attempts an in-place ICE restart. Returns `false` if the host RTC
    /// primitive doesn't support it, in which case the caller should fall
    /// back to renegotiating with [`OfferOptions::ice_restart`] set.
    async fn restart_ice(&self) -> bool;

    /// Closes the peer connection and releases host resources. Idempotent.
    fn close(&self);
}

/// Builds [`PeerConnection`]s and wires their [`PeerEvent`] stream, the
/// injection seam a host implements to plug in its RTC stack
/// (SPEC_FULL.md §6).
pub trait PeerConnectionFactory {
    /// Creates a new peer connection configured per `config`, whose events
    /// are sent on `events`.
    fn create(
        &self,
        config: &RtcConfiguration,
        events: mpsc::UnboundedSender<PeerEvent>,
    ) -> std::rc::Rc<dyn PeerConnection>;
}
