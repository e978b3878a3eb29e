//! Client-side WebRTC call orchestrator: a state machine that drives a single
//! peer-to-peer audio/video session from device acquisition through SDP
//! negotiation, ICE candidate exchange, media streaming, and teardown, while
//! recovering from transient network loss, ICE gathering stalls, and
//! bitrate degradation (SPEC_FULL.md §1).
//!
//! The [`orchestrator`] module is the crate's core: [`orchestrator::Call`]
//! owns the state machine and wires together the signaling, media, and peer
//! connection collaborators defined as traits in [`signaling`], [`media`],
//! and [`peer`] respectively, so a host can plug in its own WebSocket/GraphQL
//! transport, capture backend, and RTC stack.

#![allow(clippy::module_name_repetitions)]
#![cfg_attr(not(feature = "mockable"), warn(missing_docs))]
#![cfg_attr(feature = "mockable", allow(missing_docs))]

pub mod bitrate;
pub mod config;
pub mod error;
pub mod events;
pub mod ice_buffer;
pub mod media;
pub mod network;
pub mod orchestrator;
pub mod peer;
pub mod sdp;
pub mod signaling;

#[doc(inline)]
pub use self::{
    config::CallConfig,
    error::{CallError, ErrorKind},
    events::CallEvent,
    orchestrator::Call,
};
