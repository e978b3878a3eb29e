//! Wire schema for the default WebSocket signaling binding (SPEC_FULL.md §6,
//! "Wire schema (reference binding)").
//!
//! Grounded on `rpc/protocol.rs`'s `ClientMsg`/`ServerMsg`/`Command`/`Event`
//! tagged-envelope convention, renamed and reshaped to this crate's exact
//! operation set (`connect/disconnect/finish/sendSDPOffer/sendSDPAnswer/
//! sendICECandidate` outbound; `newPeer/newOffer/newAnswer/newIceCandidate/
//! finished/error/close` inbound) rather than a room/peer creation protocol.

use serde::{Deserialize, Serialize};

/// Outbound message a [`SignalingTransport`](super::SignalingTransport)
/// implementation sends to the signaling server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "command", content = "data")]
pub enum Command {
    Connect { id: String },
    Disconnect { id: String },
    Finish { id: String },
    SendSdpOffer { sdp: String, room_id: String },
    SendSdpAnswer { sdp: String, room_id: String },
    SendIceCandidate { candidate: String, room_id: String },
}

/// Inbound message the signaling server pushes to a connected client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum Event {
    NewPeer { id: String },
    Disconnect { id: String },
    Finished { id: String },
    NewOffer { sdp: String, room_id: String },
    NewAnswer { sdp: String, room_id: String },
    NewIceCandidate { candidate: String, room_id: String },
    Error { message: String },
    Close,
}
