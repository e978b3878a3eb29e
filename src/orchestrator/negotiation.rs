//! Offer/answer negotiation, ICE candidate routing, and peer/data-channel
//! event dispatch (SPEC_FULL.md §4.4 "Negotiation protocol", §8 invariant 1).
//!
//! Grounded on `room.rs`'s `Room::handle_peer_created`/`Room::on_signal`
//! dispatch pair and `peer/mod.rs`'s `PeerConnection::set_remote_answer`/
//! `add_ice_candidate` buffering. There, negotiation role and SDP handling
//! are driven by an RPC `Event` enum matched in `Room`; here the same shape
//! is split across this module's signaling-event and peer-event dispatchers,
//! both entered from [`super::Call`]'s two event-draining tasks.

use std::rc::Rc;

use tracerr::Traced;

use super::{device_call_error, Call, CallState, NegotiationRole};
use crate::{
    error::{CallError, ErrorKind},
    peer::{
        data_channel::DataChannelEvent, IceCandidate, OfferOptions, PeerConnection, PeerError,
        PeerEvent, SessionDescription, SdpType, SignalingState,
    },
    signaling,
};

/// Entry point for every event arriving on the [`signaling::SignalingTransport`]
/// stream (SPEC_FULL.md §6 "Signaling contract", inbound events).
pub(crate) async fn handle_signaling_event(call: &Call, event: signaling::Event) {
    if call.is_finished() {
        return;
    }

    match event {
        signaling::Event::NewPeer { .. } => start_offerer(call).await,
        signaling::Event::NewOffer { sdp, room_id } => start_answerer(call, sdp, room_id).await,
        signaling::Event::NewAnswer { sdp, .. } => handle_new_answer(call, sdp).await,
        signaling::Event::NewIceCandidate { candidate, .. } => {
            handle_new_ice_candidate(call, candidate).await;
        }
        signaling::Event::Disconnect { .. } | signaling::Event::Close => {
            call.mark_disconnected();
            call.emit_change();
        }
        signaling::Event::Finished { .. } => {
            if let Err(traced) = call.finish().await {
                log::warn!("remote side finished the call, but local finish() failed: {traced}");
            }
        }
        signaling::Event::Error { message } => {
            call.emit_error(CallError::raised(ErrorKind::Signaling, message));
        }
    }
}

/// Entry point for every event arriving on the active [`PeerConnection`]'s
/// event stream.
pub(crate) async fn handle_peer_event(call: &Call, event: PeerEvent) {
    if call.is_finished() {
        return;
    }

    match event {
        PeerEvent::NegotiationNeeded => handle_negotiation_needed(call).await,
        PeerEvent::IceCandidate(candidate) => forward_local_ice_candidate(call, candidate).await,
        PeerEvent::Track(track_event) => {
            call.push_remote_track(track_event.kind, track_event.track);
            call.emit_track_change();
        }
        PeerEvent::SignalingStateChange(_) => {
            if let Some(peer) = call.peer() {
                drain_ice_queue_if_ready(call, &peer).await;
            }
        }
        PeerEvent::IceConnectionStateChange(state) => {
            super::reconnection::handle_ice_connection_state_change(call, state).await;
        }
        PeerEvent::IceGatheringStateChange(state) => {
            super::reconnection::handle_ice_gathering_state_change(call, state).await;
        }
        PeerEvent::ConnectionStateChange(state) => {
            super::reconnection::handle_connection_state_change(call, state).await;
        }
        PeerEvent::DataChannel(event) => handle_data_channel_event(call, event),
        PeerEvent::TrackMuteChange(_) => call.emit_track_change(),
    }
}

fn handle_data_channel_event(call: &Call, event: DataChannelEvent) {
    match event {
        DataChannelEvent::Open => {
            // No distinguishing event separates `matched` from the steady
            // `sustaining` state (SPEC_FULL.md §4.4 "State machine summary"),
            // so the data channel opening carries the call straight through
            // to `Sustaining`.
            call.set_state(CallState::Sustaining);
            call.on_data_channel_open();
            call.emit_change();
        }
        DataChannelEvent::Message(raw) => call.on_data_channel_message(&raw),
        DataChannelEvent::Close => {
            call.on_data_channel_closed();
        }
        DataChannelEvent::Error(message) => {
            log::warn!("data channel error: {message}");
        }
    }
}

/// Offerer path (SPEC_FULL.md §4.4): creates a peer connection, adds local
/// tracks, and opens the `data-channel`. The offer itself is produced later,
/// when the host fires [`PeerEvent::NegotiationNeeded`].
pub(crate) async fn start_offerer(call: &Call) {
    if call.is_finished() {
        return;
    }
    call.set_state(CallState::Negotiating(NegotiationRole::Offerer));

    let peer = call.rebuild_peer_connection();
    if let Err(err) = add_local_tracks(call, &peer).await {
        call.emit_error(err);
        return;
    }

    match peer.create_data_channel("data-channel", true).await {
        Ok(channel) => call.set_data_channel(channel),
        Err(traced) => call.emit_error(CallError::new(ErrorKind::Support, traced)),
    }
}

/// Answerer path (SPEC_FULL.md §4.4): creates a peer connection (closing any
/// prior one), sets the inbound offer as the remote description, acquires
/// media if not already held, adds local tracks, and replies with an answer.
pub(crate) async fn start_answerer(call: &Call, sdp: String, incoming_room_id: String) {
    if call.is_finished() {
        return;
    }
    call.set_state(CallState::Negotiating(NegotiationRole::Answerer));

    let peer = call.rebuild_peer_connection();

    let remote_offer = SessionDescription { sdp_type: SdpType::Offer, sdp };
    if let Err(traced) = peer.set_remote_description(remote_offer).await {
        log::warn!("failed to set remote offer: {traced}");
        return;
    }
    drain_ice_queue_if_ready(call, &peer).await;

    if call.local_stream().tracks().next().is_none() {
        let Some(constraints) = call.constraints() else {
            log::warn!("answerer path entered with no constraints to acquire media with");
            return;
        };
        if let Err(traced) = call.acquire_media(&constraints).await {
            call.emit_error(device_call_error(traced));
            return;
        }
        call.emit_local_track_change();
    }

    if let Err(err) = add_local_tracks(call, &peer).await {
        call.emit_error(err);
        return;
    }

    let answer_sdp = match peer.create_answer().await {
        Ok(sdp) => sdp,
        Err(traced) => {
            log::warn!("failed to create SDP answer: {traced}");
            return;
        }
    };
    let rewritten = call.rewrite_sdp(&answer_sdp).await;
    let local_answer = SessionDescription { sdp_type: SdpType::Answer, sdp: rewritten.clone() };
    if let Err(traced) = peer.set_local_description(local_answer).await {
        log::warn!("failed to set local answer: {traced}");
        return;
    }

    let room_id = call.room_id().unwrap_or(incoming_room_id);
    if let Err(traced) = call.signaling().send_sdp_answer(&rewritten, &room_id).await {
        log::warn!("failed to send SDP answer: {traced}");
    }
}

/// Adds every local track to `peer`, skipping entirely if tracks have
/// already been added once this connection's lifetime (SPEC_FULL.md §3
/// invariant 6).
async fn add_local_tracks(call: &Call, peer: &Rc<dyn PeerConnection>) -> std::result::Result<(), CallError> {
    if peer.senders_count() > 0 {
        return Ok(());
    }
    for track in call.local_stream().tracks() {
        peer.add_track(track).await.map_err(|traced: Traced<PeerError>| {
            CallError::new(ErrorKind::Support, traced)
        })?;
    }
    Ok(())
}

/// On host-fired `negotiationneeded` while `signalingState = stable`:
/// produces and sends a fresh (non-restart) offer (SPEC_FULL.md §4.4).
async fn handle_negotiation_needed(call: &Call) {
    let Some(peer) = call.peer() else { return };
    if peer.signaling_state() != SignalingState::Stable {
        return;
    }
    create_and_send_offer(call, &peer, false).await;
}

/// Creates an SDP offer (optionally flagged for ICE restart), rewrites it,
/// sets it as the local description, and sends it via signaling. Shared by
/// the fresh-negotiation path and both ICE-restart paths (first ICE failure,
/// bitrate-driven disconnection).
pub(crate) async fn create_and_send_offer(call: &Call, peer: &Rc<dyn PeerConnection>, ice_restart: bool) {
    let Some(room_id) = call.room_id() else { return };

    let options = OfferOptions {
        offer_to_receive_audio: true,
        offer_to_receive_video: true,
        ice_restart,
    };
    let sdp = match peer.create_offer(options).await {
        Ok(sdp) => sdp,
        Err(traced) => {
            log::warn!("failed to create SDP offer: {traced}");
            return;
        }
    };

    let rewritten = call.rewrite_sdp(&sdp).await;
    let local_offer = SessionDescription { sdp_type: SdpType::Offer, sdp: rewritten.clone() };
    if let Err(traced) = peer.set_local_description(local_offer).await {
        log::warn!("failed to set local offer: {traced}");
        return;
    }

    if let Err(traced) = call.signaling().send_sdp_offer(&rewritten, &room_id).await {
        log::warn!("failed to send SDP offer: {traced}");
    }
}

/// On inbound `newAnswer`: accepted only in `have-local-offer` or
/// `have-remote-pranswer` (SPEC_FULL.md §3 invariant 2); otherwise dropped
/// with a warning.
async fn handle_new_answer(call: &Call, sdp: String) {
    let Some(peer) = call.peer() else { return };

    let state = peer.signaling_state();
    if !matches!(state, SignalingState::HaveLocalOffer | SignalingState::HaveRemotePranswer) {
        log::warn!("dropping newAnswer received in unexpected signalingState {state:?}");
        return;
    }

    let rewritten = call.rewrite_sdp(&sdp).await;
    let remote_answer = SessionDescription { sdp_type: SdpType::Answer, sdp: rewritten };
    if let Err(traced) = peer.set_remote_description(remote_answer).await {
        log::warn!("failed to set remote answer: {traced}");
    }
}

/// On inbound `newIceCandidate`: applies immediately if a remote description
/// exists, drops with a warning if the signaling state is `stable` with no
/// remote description (anomalous), otherwise enqueues (SPEC_FULL.md §4.4,
/// §8 invariant 1).
async fn handle_new_ice_candidate(call: &Call, candidate_json: String) {
    let candidate: IceCandidate = match serde_json::from_str(&candidate_json) {
        Ok(candidate) => candidate,
        Err(err) => {
            log::warn!("failed to parse inbound ICE candidate: {err}");
            return;
        }
    };

    let Some(peer) = call.peer() else {
        call.push_ice_candidate(candidate);
        return;
    };

    if peer.has_remote_description() {
        if let Err(traced) = peer.add_ice_candidate(candidate).await {
            log::warn!("failed to add ICE candidate: {traced}");
        }
    } else if peer.signaling_state() == SignalingState::Stable {
        log::warn!("dropping ICE candidate: no remote description and signalingState is stable");
    } else {
        call.push_ice_candidate(candidate);
    }
}

/// Drains the ICE candidate queue, in FIFO order, once `peer` has a remote
/// description (SPEC_FULL.md §4.4 "On signalingstatechange", §8 invariant 1).
pub(crate) async fn drain_ice_queue_if_ready(call: &Call, peer: &Rc<dyn PeerConnection>) {
    if !peer.has_remote_description() {
        return;
    }
    for candidate in call.drain_ice_queue() {
        if let Err(traced) = peer.add_ice_candidate(candidate).await {
            log::warn!("failed to add queued ICE candidate: {traced}");
        }
    }
}

/// Forwards a non-null local `icecandidate` event through signaling
/// (SPEC_FULL.md §4.4 "On outbound icecandidate").
async fn forward_local_ice_candidate(call: &Call, candidate: IceCandidate) {
    let Some(room_id) = call.room_id() else { return };
    let Ok(json) = serde_json::to_string(&candidate) else { return };
    if let Err(traced) = call.signaling().send_ice_candidate(&json, &room_id).await {
        log::warn!("failed to send local ICE candidate: {traced}");
    }
}
