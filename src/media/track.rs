//! Local/remote media track and composite stream types
//! (SPEC_FULL.md §3, "Local Media").
//!
//! `media/track/mod.rs` + `media/track/remote.rs` wrap concrete
//! `web_sys::MediaStreamTrack` handles. This crate's tracks are
//! trait objects instead, since the concrete capture/playback backend is a
//! [`MediaProvider`](super::MediaProvider) implementation detail the
//! orchestrator never needs to know.

use std::rc::Rc;

use super::MediaKind;

/// A single host-provided media track, shared by reference since both the
/// local stream and (after `add_track`) the peer connection hold it.
pub trait MediaStreamTrack {
    /// Stable identifier assigned by the host capture backend.
    fn id(&self) -> String;

    /// Whether this is a video or audio track.
    fn kind(&self) -> MediaKind;

    /// Whether the track is currently enabled (muted tracks still exist but
    /// carry silence/black frames).
    fn enabled(&self) -> bool;

    /// Enables or disables the track in place.
    fn set_enabled(&self, enabled: bool);

    /// Stops the track, releasing the underlying device. Idempotent.
    fn stop(&self);
}

/// Shared handle to a [`MediaStreamTrack`].
pub type TrackHandle = Rc<dyn MediaStreamTrack>;

/// Alias used at the [`PeerConnection`](crate::peer::PeerConnection) seam,
/// where a track is always local (outbound).
pub type LocalTrack = TrackHandle;

/// The local media captured by the Device Coordinator: a video track, an
/// audio track, both optional (SPEC_FULL.md §3).
#[derive(Clone, Default)]
pub struct LocalStream {
    pub video: Option<TrackHandle>,
    pub audio: Option<TrackHandle>,
}

impl LocalStream {
    /// Creates an empty stream (no tracks acquired).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over whichever of [`Self::video`]/[`Self::audio`] are
    /// present.
    pub fn tracks(&self) -> impl Iterator<Item = &TrackHandle> {
        self.video.iter().chain(self.audio.iter())
    }

    /// Flips `enabled` on every present track of the given `kind`
    /// (SPEC_FULL.md §4.4, `toggle_audio`/`toggle_video`).
    pub fn toggle(&self, kind: MediaKind) {
        let track = match kind {
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.audio,
        };
        if let Some(track) = track {
            track.set_enabled(!track.enabled());
        }
    }

    /// Whether the track of the given `kind` is present and enabled.
    #[must_use]
    pub fn is_enabled(&self, kind: MediaKind) -> bool {
        let track = match kind {
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.audio,
        };
        track.as_ref().is_some_and(|t| t.enabled())
    }

    /// Stops every present track before the stream handle is released
    /// (SPEC_FULL.md §3, "Local Media" destruction rule).
    pub fn stop_all(&self) {
        for track in self.tracks() {
            track.stop();
        }
    }
}

/// The remote peer's assembled inbound stream: every inbound video/audio
/// track seen so far, collected across possibly multiple `track` events
/// (SPEC_FULL.md §4.4, "Peer-stream assembly").
#[derive(Clone, Default)]
pub struct RemoteStream {
    pub video_tracks: Vec<TrackHandle>,
    pub audio_tracks: Vec<TrackHandle>,
}

impl RemoteStream {
    /// Creates an empty remote stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an inbound track of the given `kind` to the assembled stream.
    pub fn push(&mut self, kind: MediaKind, track: TrackHandle) {
        match kind {
            MediaKind::Video => self.video_tracks.push(track),
            MediaKind::Audio => self.audio_tracks.push(track),
        }
    }

    /// Whether any video track has been collected.
    #[must_use]
    pub fn has_video(&self) -> bool {
        !self.video_tracks.is_empty()
    }
}
