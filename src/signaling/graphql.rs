//! Optional GraphQL-subscription reference binding for hosts that front
//! signaling with a GraphQL gateway (SPEC_FULL.md §6, "Wire schema
//! (reference binding)").
//!
//! This module only documents the shape of that binding as typed message
//! structs; it does not implement a GraphQL client (no GraphQL crate is part
//! of this crate's dependency stack). A host wiring this
//! binding implements [`super::SignalingTransport`] against its own GraphQL
//! client, translating to/from these types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Keepalive interval: the binding re-issues `joined({roomId})` on this
/// cadence to keep the gateway's subscription session alive.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

/// One payload of the `onRoomInteraction` subscription. Exactly which
/// optional field is populated determines which [`super::Event`] (or
/// `joined` acknowledgement) the binding should dispatch.
///
/// Fields are dispatched in declaration order when more than one is present
/// in a single payload, per SPEC_FULL.md §6.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoomInteraction {
    pub joined: Option<Joined>,
    pub new_peer: Option<NewPeer>,
    pub new_offer: Option<NewOffer>,
    pub new_answer: Option<NewAnswer>,
    pub new_ice_candidate: Option<NewIceCandidate>,
    pub finished: Option<Finished>,
    pub disconnected: Option<Disconnected>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Joined {
    pub room_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewPeer {
    pub id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewOffer {
    pub sdp: String,
    pub room_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewAnswer {
    pub sdp: String,
    pub room_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewIceCandidate {
    pub candidate: String,
    pub room_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Finished {
    pub id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Disconnected {
    pub id: String,
}

/// Translates one [`RoomInteraction`] payload into the ordered sequence of
/// [`super::Event`]s it should dispatch (SPEC_FULL.md §6: "dispatched in
/// that order per payload"). A `joined` field is not itself a
/// [`super::Event`] and is omitted here; callers should treat its presence
/// as an acknowledgement of `connect`/the keepalive re-issue.
#[must_use]
pub fn dispatch_order(interaction: &RoomInteraction) -> Vec<super::Event> {
    let mut events = Vec::new();

    if let Some(p) = &interaction.new_peer {
        events.push(super::Event::NewPeer { id: p.id.clone() });
    }
    if let Some(o) = &interaction.new_offer {
        events.push(super::Event::NewOffer { sdp: o.sdp.clone(), room_id: o.room_id.clone() });
    }
    if let Some(a) = &interaction.new_answer {
        events.push(super::Event::NewAnswer { sdp: a.sdp.clone(), room_id: a.room_id.clone() });
    }
    if let Some(c) = &interaction.new_ice_candidate {
        events.push(super::Event::NewIceCandidate {
            candidate: c.candidate.clone(),
            room_id: c.room_id.clone(),
        });
    }
    if let Some(f) = &interaction.finished {
        events.push(super::Event::Finished { id: f.id.clone() });
    }
    if let Some(d) = &interaction.disconnected {
        events.push(super::Event::Disconnect { id: d.id.clone() });
    }

    events
}
