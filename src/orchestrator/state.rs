//! Explicit state machine encoding the `signalingState × iceConnectionState ×
//! connectionState` triple the original event-driven design left implicit
//! (SPEC_FULL.md §9, "Event-driven cooperative control vs. explicit state
//! machine").
//!
//! There is no equivalent type upstream — `Room`/`PeerComponent` read host
//! RTC states ad hoc wherever a handler needs them. This
//! module exists specifically to make SPEC_FULL.md §3's invariants (at most
//! one live peer connection, `finished` is terminal, negotiation only in
//! specific signaling states) checkable against one value instead of three.

/// High-level phase of a [`Call`](super::Call)'s lifecycle
/// (SPEC_FULL.md §4.4, "State machine summary").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallState {
    /// No peer connection exists yet; `start()` has not been called, or a
    /// prior call has been `clean()`ed without `finish()`.
    Idle,

    /// `start()` is acquiring local media before any peer connection exists.
    AcquiringMedia,

    /// Media acquired; signaling subscription is being established.
    SignalingConnected,

    /// A peer connection exists and an offer/answer exchange is underway,
    /// either as the offering or answering side.
    Negotiating(NegotiationRole),

    /// The data channel has opened: the peer connection's negotiation
    /// completed and both sides can exchange application data.
    Matched,

    /// Steady state after matching: media flowing, no negotiation pending.
    Sustaining,

    /// A reconnection trigger fired (ICE failure, connection failure, or
    /// bitrate collapse) and recovery is in progress.
    Reconnecting,

    /// Terminal: `finish()` was called. No further negotiation,
    /// reconnection, or bitrate-driven restart may occur
    /// (SPEC_FULL.md §3 invariant 4).
    Finished,
}

/// Which side of the offer/answer exchange a [`CallState::Negotiating`]
/// call is currently playing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NegotiationRole {
    Offerer,
    Answerer,
}

impl CallState {
    /// Whether this state is [`CallState::Finished`] (SPEC_FULL.md §3
    /// invariant 4: terminal, checked before every recovery/negotiation
    /// path).
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Whether a peer connection is expected to exist in this state.
    #[must_use]
    pub fn has_peer_connection(self) -> bool {
        !matches!(self, Self::Idle | Self::AcquiringMedia | Self::SignalingConnected)
    }
}
