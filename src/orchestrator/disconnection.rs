//! Bitrate-driven disconnection strategy (SPEC_FULL.md §4.4, "Disconnection
//! strategy").
//!
//! Grounded on `peer/component/watchers.rs`'s bitrate-drop watcher, which
//! samples `PeerConnection::get_stats` twice a few seconds apart and
//! restarts ICE on a sustained drop. Single-flight guard follows the same
//! `ObservableCell<bool>` pattern as the rest of `orchestrator/mod.rs`'s
//! [`super::Flags`].

use std::time::Duration;

use super::{reconnection, Call};
use crate::bitrate::Bitrate;

const SAMPLE_INTERVAL: Duration = Duration::from_secs(4);

/// Bitrate collapse large enough to treat as a real degradation rather than
/// measurement noise (SPEC_FULL.md §4.4, §9 decided open question).
const COLLAPSE_THRESHOLD_KBPS: u64 = 100;

/// Entry point for `iceConnectionState = disconnected`
/// ([`super::reconnection::handle_ice_connection_state_change`]).
///
/// Runs only when bitrate checking is enabled (SPEC_FULL.md §9 decided open
/// question: the distilled spec's source gates this on the flag being
/// *disabled*, which this implementation treats as a defect — a
/// disconnection strategy that only ever runs when the operator has turned
/// it off is not a meaningful feature; see DESIGN.md). Single-flight
/// guarded so overlapping `disconnected` events don't start concurrent
/// strategies.
pub(crate) async fn handle_disconnected(call: &Call) {
    if !call.config().allow_bitrate_checking || call.is_finished() {
        return;
    }
    if call.flags().running_disconnection_strategy.get() {
        return;
    }

    call.flags().running_disconnection_strategy.set(true);
    run_disconnection_strategy(call).await;
    call.flags().running_disconnection_strategy.set(false);
}

/// Samples bitrate, waits [`SAMPLE_INTERVAL`], samples again, and restarts
/// ICE in place if the relevant channel's throughput collapsed by more than
/// [`COLLAPSE_THRESHOLD_KBPS`] (SPEC_FULL.md §4.4, §9).
async fn run_disconnection_strategy(call: &Call) {
    let before = call.sample_bitrate().await;
    Call::sleep(SAMPLE_INTERVAL).await;
    if call.is_finished() {
        return;
    }
    let after = call.sample_bitrate().await;

    let before_kbps = relevant_channel(call, &before);
    let after_kbps = relevant_channel(call, &after);

    let delta = before_kbps.saturating_sub(after_kbps);
    if delta > COLLAPSE_THRESHOLD_KBPS {
        restart_ice_in_place(call).await;
    }
}

/// Picks which channel's bitrate is relevant to watch, preferring a locally
/// produced video stream, then the remote peer's video input, then local
/// audio output unconditionally, then the remote peer's audio input
/// (SPEC_FULL.md §4.4, "Disconnection strategy").
fn relevant_channel(call: &Call, bitrate: &Bitrate) -> u64 {
    if call.video() {
        bitrate.video.output
    } else if call.has_peer_video_enabled() {
        bitrate.video.input
    } else if call.audio() {
        bitrate.audio.output
    } else {
        bitrate.audio.input
    }
}

/// Restarts ICE in place: via the host's `restart_ice` if supported, else by
/// renegotiating with an ICE-restart offer.
async fn restart_ice_in_place(call: &Call) {
    let Some(peer) = call.peer() else { return };
    reconnection::restart_ice(call, &peer).await;
    call.emit_change();
}
