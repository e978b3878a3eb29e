//! Media stream constraints passed to [`MediaProvider::get_user_media`] /
//! [`MediaProvider::get_display_media`].
//!
//! `media/constraints.rs` models a rich, statically typed constraint builder
//! tied one-to-one to `web_sys`'s
//! `MediaTrackConstraints`. Since this crate's [`MediaProvider`] is an
//! injected trait rather than a fixed `web_sys` binding, constraints are kept
//! as an open `serde_json` bag here — the host-side provider implementation
//! is the one that knows how to turn `{"min-width": 720}` into whatever its
//! concrete capture backend expects.
//!
//! [`MediaProvider`]: super::provider::MediaProvider

use serde_json::{Map, Value};

/// An open bag of capture knobs for a single track (e.g. `min-width`,
/// `noise-suppression`), plus the device selection the Device Coordinator
/// injects before requesting the stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackConstraints(Map<String, Value>);

impl TrackConstraints {
    /// Creates an empty constraint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an arbitrary bag of constraint key/value pairs.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Injects the selected `device_id`, overwriting any existing
    /// `"deviceId"` key (SPEC_FULL.md §4.3, "Acquire").
    #[must_use]
    pub fn with_device_id(mut self, device_id: &str) -> Self {
        self.0.insert("deviceId".into(), Value::String(device_id.to_string()));
        self
    }

    /// Returns the `"deviceId"` constraint, if set.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        self.0.get("deviceId").and_then(Value::as_str)
    }

    /// Returns the underlying constraint map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Constraints for both tracks of a local stream request.
///
/// `video`/`audio` being `None` means that track kind is not requested at
/// all, distinct from `Some(TrackConstraints::new())` (requested with no
/// specific knobs).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaStreamConstraints {
    pub video: Option<TrackConstraints>,
    pub audio: Option<TrackConstraints>,
}

impl MediaStreamConstraints {
    /// Camera + microphone preset: both tracks requested, no extra knobs.
    #[must_use]
    pub fn camera_and_microphone() -> Self {
        Self { video: Some(TrackConstraints::new()), audio: Some(TrackConstraints::new()) }
    }

    /// Screen-share preset: a display video track, no audio.
    #[must_use]
    pub fn screen_share() -> Self {
        Self { video: Some(TrackConstraints::new()), audio: None }
    }
}
