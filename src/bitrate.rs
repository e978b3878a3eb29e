//! Bitrate Sampler: converts raw RTC statistics into sampled per-direction
//! per-media bitrates (SPEC_FULL.md §4.2).
//!
//! Grounded on `peer/stats.rs`'s `RtcStats` deserialization: that module
//! turns a host stats report into a `Vec<RtcStat>`; this module is the piece
//! this crate adds on top — retaining the previous sample per channel and
//! differencing it against the next, layered over the raw stats parser
//! rather than folded into it.

use std::time::Duration;

use async_trait::async_trait;

/// One `{bytes, timestamp}` observation for a single RTP stream.
#[derive(Clone, Copy, Debug)]
pub struct StatSample {
    /// Cumulative bytes transferred as of `timestamp`.
    pub bytes: u64,

    /// Time the sample was taken, as a monotonic offset (e.g. since process
    /// start); only deltas between samples are meaningful.
    pub timestamp: Duration,
}

/// Raw statistics for the four channels the sampler tracks, as extracted
/// from a host stats report by a [`StatisticsProvider`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RawChannelStats {
    pub inbound_video: Option<StatSample>,
    pub outbound_video: Option<StatSample>,
    pub inbound_audio: Option<StatSample>,
    pub outbound_audio: Option<StatSample>,
}

/// Sampled bitrate, in kbps, for one media kind's two directions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DirectionalBitrate {
    pub input: u64,
    pub output: u64,
}

/// A fully populated bitrate snapshot across both media kinds.
///
/// Always complete: a channel with no prior sample, or missing from the raw
/// report, contributes `0` rather than being absent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Bitrate {
    pub video: DirectionalBitrate,
    pub audio: DirectionalBitrate,
}

/// Extracts [`RawChannelStats`] from a live peer connection.
///
/// The `Peer` type parameter is deliberately left abstract: the sampler only
/// needs *some* opaque handle to pass through to the provider, which is free
/// to downcast it to whatever concrete peer-connection type the host
/// actually uses.
#[cfg_attr(feature = "mockable", mockall::automock)]
#[async_trait(?Send)]
pub trait StatisticsProvider {
    /// Queries the current raw per-channel statistics.
    async fn sample(&self) -> RawChannelStats;
}

fn bitrate_kbps(prev: Option<StatSample>, next: Option<StatSample>) -> u64 {
    match (prev, next) {
        (Some(prev), Some(next)) if next.timestamp > prev.timestamp => {
            let delta_bytes = next.bytes.saturating_sub(prev.bytes);
            let delta_ms = (next.timestamp - prev.timestamp).as_millis().max(1) as u64;
            (8 * delta_bytes) / delta_ms
        }
        _ => 0,
    }
}

/// Retains the previous sample per channel and differences it against the
/// next call's sample to produce a [`Bitrate`].
///
/// Pure over successive calls except for this retained prior-sample state,
/// which lives in the instance (SPEC_FULL.md §4.2).
#[derive(Debug, Default)]
pub struct BitrateSampler {
    prev: RawChannelStats,
}

impl BitrateSampler {
    /// Creates a fresh sampler with no prior samples.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples the provider and returns the [`Bitrate`] since the previous
    /// call, or all-zero on the first call (no prior sample exists yet).
    pub async fn sample(&mut self, provider: &dyn StatisticsProvider) -> Bitrate {
        let next = provider.sample().await;
        self.update(next)
    }

    /// Differences `next` against the retained previous sample, returns the
    /// resulting [`Bitrate`], and retains `next` for the following call.
    ///
    /// Used by callers (e.g. the Call Orchestrator) that already hold a
    /// [`RawChannelStats`] obtained some other way and don't need this
    /// sampler to own the [`StatisticsProvider`] call itself.
    pub fn update(&mut self, next: RawChannelStats) -> Bitrate {
        let bitrate = self.diff(next);
        self.prev = next;
        bitrate
    }

    /// Computes the [`Bitrate`] between the retained previous sample and
    /// `next`, without mutating `self`. Exposed for testing the pure
    /// differencing law independent of the async provider.
    #[must_use]
    pub fn diff(&self, next: RawChannelStats) -> Bitrate {
        Bitrate {
            video: DirectionalBitrate {
                input: bitrate_kbps(self.prev.inbound_video, next.inbound_video),
                output: bitrate_kbps(self.prev.outbound_video, next.outbound_video),
            },
            audio: DirectionalBitrate {
                input: bitrate_kbps(self.prev.inbound_audio, next.inbound_audio),
                output: bitrate_kbps(self.prev.outbound_audio, next.outbound_audio),
            },
        }
    }
}
