//! Reconnection strategy: ICE-restart-on-failure, network-aware restart-call,
//! and ICE-gathering-stall detection (SPEC_FULL.md §4.4 "Reconnection
//! strategy", "ICE-gathering stall detection").
//!
//! Grounded on `room.rs`'s `Room::handle_rpc_connection_lost`/
//! `handle_rpc_connection_recovered` pair (there, driven by the signaling
//! RPC client's own reconnect/backoff loop) and `peer/component/watchers.rs`'s
//! ICE-failure watcher that calls `PeerConnection::restart_ice`. This crate
//! has no RPC-level reconnect loop of its own (signaling reconnection is the
//! host transport's concern, per SPEC_FULL.md §1 scope); what's reproduced
//! here is the peer-connection-state-driven half: ICE failure, gathering
//! stalls, and `connectionState = failed` consulting the Network Supervisor.

use std::{cell::RefCell, rc::Rc, time::Duration};

use super::{negotiation, Call};
use crate::{
    error::{CallError, ErrorKind},
    network::{Connectivity, Subscription, INITIAL_PROBE_TIMEOUT, RETRY_PROBE_TIMEOUT},
    peer::{ConnectionState, IceConnectionState, IceGatheringState, PeerConnection},
};

const ICE_GATHERING_STALL_CHECK: Duration = Duration::from_secs(3);

/// Dispatches an `iceConnectionState` transition: `failed` triggers the
/// restart-ICE-or-surface-error path; `disconnected` triggers the
/// bitrate-driven disconnection strategy.
pub(crate) async fn handle_ice_connection_state_change(call: &Call, state: IceConnectionState) {
    if call.is_finished() {
        return;
    }
    match state {
        IceConnectionState::Failed => handle_ice_failed(call).await,
        IceConnectionState::Disconnected => {
            super::disconnection::handle_disconnected(call).await;
        }
        _ => {}
    }
}

/// On `iceConnectionState = failed`: restarts ICE on the first failure in
/// the session; surfaces [`ErrorKind::PoorConnection`] on the second
/// (SPEC_FULL.md §4.4, §7, §8 "Boundary behaviors").
async fn handle_ice_failed(call: &Call) {
    let Some(peer) = call.peer() else { return };

    let already_failed_once = call.mark_ice_failed_once();
    if already_failed_once {
        call.emit_error(CallError::raised(
            ErrorKind::PoorConnection,
            "ICE connection failed for the second time in this session",
        ));
        return;
    }

    call.set_state(super::CallState::Reconnecting);
    restart_ice(call, &peer).await;
    call.emit_change();
}

/// Restarts ICE in place: via the host's `restart_ice` if supported, else by
/// renegotiating with [`crate::peer::OfferOptions::ice_restart`] set.
pub(crate) async fn restart_ice(call: &Call, peer: &Rc<dyn PeerConnection>) {
    if !peer.restart_ice().await {
        negotiation::create_and_send_offer(call, peer, true).await;
    }
}

/// Dispatches a `connectionState` transition: `failed` triggers the
/// network-aware restart-call path.
pub(crate) async fn handle_connection_state_change(call: &Call, state: ConnectionState) {
    if call.is_finished() || state != ConnectionState::Failed {
        return;
    }
    handle_connection_lost(call).await;
}

/// On `connectionState = failed` (and, in a host binding where peer
/// creation can itself fail, on that failure too): consults the Network
/// Supervisor with a bounded timeout, restarting the call if online or
/// surfacing [`ErrorKind::NoInternetAccess`] and waiting for the next
/// online transition otherwise (SPEC_FULL.md §4.4, §7).
///
/// Guarded by [`super::Flags::listening_for_network_change`]: a recovery
/// already in flight (waiting on the network to come back) is not restarted.
pub(crate) async fn handle_connection_lost(call: &Call) {
    if call.flags().listening_for_network_change.get() {
        return;
    }

    let timeout =
        if call.mark_network_probed_once() { RETRY_PROBE_TIMEOUT } else { INITIAL_PROBE_TIMEOUT };
    let online = call.network().is_online(timeout).await;
    if call.is_finished() {
        return;
    }

    if online {
        restart_call(call).await;
    } else {
        call.emit_error(CallError::raised(
            ErrorKind::NoInternetAccess,
            "network probe reported offline during recovery",
        ));
        subscribe_to_network_change(call);
    }
}

/// Registers a one-shot listener for the next online transition, restarting
/// the call and unsubscribing itself when it fires (SPEC_FULL.md §4.4,
/// "Connection failed / peer creation failed").
fn subscribe_to_network_change(call: &Call) {
    call.flags().listening_for_network_change.set(true);

    // The subscription handle must be reachable from inside its own
    // callback (to unsubscribe itself on first fire), hence the `Rc<RefCell<..>>`
    // indirection rather than simply capturing it by value.
    let slot: Rc<RefCell<Option<Box<dyn Subscription>>>> = Rc::new(RefCell::new(None));
    let slot_in_callback = Rc::clone(&slot);
    let call_in_callback = call.clone();

    let subscription = call.network().on_change(Box::new(move |connectivity| {
        if connectivity != Connectivity::Online {
            return;
        }
        if let Some(subscription) = slot_in_callback.borrow_mut().take() {
            subscription.unsubscribe();
        }

        let call = call_in_callback.clone();
        tokio::task::spawn_local(async move {
            call.flags().listening_for_network_change.set(false);
            restart_call(&call).await;
        });
    }));

    *slot.borrow_mut() = Some(subscription);
}

/// The restart-call procedure (SPEC_FULL.md §4.4, "Restart-call"): tears
/// down the peer connection via `clean()`, re-runs `start()` with the
/// preserved room id and constraints, and synthesizes a local `newPeer` to
/// re-enter the offerer path.
pub(crate) async fn restart_call(call: &Call) {
    if call.is_finished() {
        return;
    }
    let (Some(room_id), Some(constraints)) = (call.room_id(), call.constraints()) else {
        log::warn!("restart-call attempted with no preserved room id/constraints");
        return;
    };

    call.clean();
    if let Err(traced) = call.start(room_id, constraints).await {
        log::error!("restart-call's start() failed: {traced}");
        return;
    }
    negotiation::start_offerer(call).await;
}

/// On `iceGatheringState = complete`, if "ice stalled checking" is enabled,
/// schedules a 3-second check: if the connection still looks stuck at that
/// point, runs the restart-call procedure (SPEC_FULL.md §4.4, "ICE-gathering
/// stall detection").
pub(crate) async fn handle_ice_gathering_state_change(call: &Call, state: IceGatheringState) {
    if state != IceGatheringState::Complete || !call.config().allow_ice_stalled_checking {
        return;
    }

    let call = call.clone();
    tokio::task::spawn_local(async move {
        Call::sleep(ICE_GATHERING_STALL_CHECK).await;
        if call.is_finished() {
            return;
        }
        let Some(peer) = call.peer() else { return };

        let stuck = peer.ice_connection_state() == IceConnectionState::Checking
            || peer.connection_state() == ConnectionState::Connecting;
        if stuck {
            restart_call(&call).await;
        }
    });
}
