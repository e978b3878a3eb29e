//! The Device Coordinator: remembers selected devices across re-acquisitions
//! and implements the default-camera and device-rotation heuristics
//! (SPEC_FULL.md §4.3, "Device Coordinator").
//!
//! Grounded on `media/manager.rs`'s `MediaManager`, which owns a
//! `HashMap<MediaKind, String>` of "last selected device id" and exposes
//! `set_output_audio_id`/`recount_tracks`-style bookkeeping. The default-
//! camera and next-device selection logic there lives inline in the
//! `MediaManagerHandle::get_media`/`on_device_change` call sites; this module
//! pulls it out into pure, independently testable functions.

use std::rc::Rc;

use super::{
    constraints::{MediaStreamConstraints, TrackConstraints},
    device::{DeviceInfo, DeviceKind, FacingMode},
    provider::{MediaProvider, Result, TaggedResult},
    track::LocalStream,
};
use crate::error::DeviceTag;

/// Picks the default camera from an enumerated device list, per
/// SPEC_FULL.md §4.3's heuristic: prefer a device explicitly reporting
/// [`FacingMode::Front`]; otherwise prefer a device whose label does not
/// suggest rear-facing; otherwise fall back to the first video input.
#[must_use]
pub fn select_default_video_device(devices: &[DeviceInfo]) -> Option<&DeviceInfo> {
    let video_inputs: Vec<&DeviceInfo> =
        devices.iter().filter(|d| d.kind == DeviceKind::VideoInput).collect();

    video_inputs
        .iter()
        .find(|d| d.facing == Some(FacingMode::Front))
        .or_else(|| video_inputs.iter().find(|d| !d.label_suggests_rear_facing()))
        .or_else(|| video_inputs.first())
        .copied()
}

/// Picks the default microphone: simply the first audio input device, since
/// SPEC_FULL.md §4.3 draws no facing-style distinction for audio.
#[must_use]
pub fn select_default_audio_device(devices: &[DeviceInfo]) -> Option<&DeviceInfo> {
    devices.iter().find(|d| d.kind == DeviceKind::AudioInput)
}

/// Given the currently active video device id and the full device list,
/// returns the id of the next video input in enumeration order, wrapping
/// around to the first (SPEC_FULL.md §4.3, `nextVideoDevice`/rotation).
///
/// Returns `None` if there is no video input at all, or only the current
/// one (rotating to itself is a no-op the caller should skip).
#[must_use]
pub fn next_video_device_id<'a>(devices: &'a [DeviceInfo], active: Option<&str>) -> Option<&'a str> {
    let video_inputs: Vec<&DeviceInfo> =
        devices.iter().filter(|d| d.kind == DeviceKind::VideoInput).collect();

    if video_inputs.len() < 2 {
        return None;
    }

    let next = match active.and_then(|id| video_inputs.iter().position(|d| d.device_id == id)) {
        Some(idx) => video_inputs[(idx + 1) % video_inputs.len()],
        None => video_inputs[0],
    };
    Some(next.device_id.as_str())
}

/// Remembers the active camera/microphone device ids across reacquisitions
/// and mediates every [`MediaProvider`] call the Call Orchestrator makes.
pub struct DeviceCoordinator {
    provider: Rc<dyn MediaProvider>,
    active_video_device: Option<String>,
    active_audio_device: Option<String>,
    active_audio_output_device: Option<String>,
}

impl DeviceCoordinator {
    /// Wraps a host [`MediaProvider`] with no device preference selected yet.
    #[must_use]
    pub fn new(provider: Rc<dyn MediaProvider>) -> Self {
        Self {
            provider,
            active_video_device: None,
            active_audio_device: None,
            active_audio_output_device: None,
        }
    }

    /// Lists available devices via the underlying provider.
    pub async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>> {
        self.provider.enumerate_devices().await
    }

    /// Acquires camera + microphone, applying the remembered (or, on first
    /// call, heuristically selected) device ids as constraints.
    ///
    /// Requested one kind at a time (two `get_user_media` calls rather than
    /// one combined request) so a failure can be classified against the
    /// specific device it concerns — `camera` or `microphone`
    /// (SPEC_FULL.md §4.3 "Acquire", §7 "per-device").
    pub async fn acquire(&mut self, screen_share: bool) -> TaggedResult<LocalStream> {
        if screen_share {
            return self
                .provider
                .get_display_media(&MediaStreamConstraints::screen_share())
                .await
                .map_err(|traced| (DeviceTag::Camera, traced));
        }

        if self.active_video_device.is_none() || self.active_audio_device.is_none() {
            let missing_video = self.active_video_device.is_none();
            let devices = self
                .provider
                .enumerate_devices()
                .await
                .map_err(|traced| (Self::tag_for_missing(missing_video), traced))?;
            if self.active_video_device.is_none() {
                self.active_video_device =
                    select_default_video_device(&devices).map(|d| d.device_id.clone());
            }
            if self.active_audio_device.is_none() {
                self.active_audio_device =
                    select_default_audio_device(&devices).map(|d| d.device_id.clone());
            }
        }

        let video = match self.active_video_device.clone() {
            Some(id) => {
                let constraints = MediaStreamConstraints {
                    video: Some(TrackConstraints::new().with_device_id(&id)),
                    audio: None,
                };
                let stream = self
                    .provider
                    .get_user_media(&constraints)
                    .await
                    .map_err(|traced| (DeviceTag::Camera, traced))?;
                stream.video
            }
            None => None,
        };

        let audio = match self.active_audio_device.clone() {
            Some(id) => {
                let constraints = MediaStreamConstraints {
                    video: None,
                    audio: Some(TrackConstraints::new().with_device_id(&id)),
                };
                let stream = self
                    .provider
                    .get_user_media(&constraints)
                    .await
                    .map_err(|traced| (DeviceTag::Microphone, traced))?;
                stream.audio
            }
            None => None,
        };

        Ok(LocalStream { video, audio })
    }

    /// Which [`DeviceTag`] an enumeration failure during [`Self::acquire`]
    /// should be classified under: whichever kind was actually missing a
    /// selection (the reason enumeration was needed at all).
    fn tag_for_missing(missing_video: bool) -> DeviceTag {
        if missing_video {
            DeviceTag::Camera
        } else {
            DeviceTag::Microphone
        }
    }

    /// Explicitly sets the active device for `kind`. [`DeviceKind::VideoInput`]
    /// and [`DeviceKind::AudioInput`] take effect on the next
    /// [`Self::acquire`] call; [`DeviceKind::AudioOutput`] names a playback
    /// sink that never feeds a captured track, and is simply remembered for
    /// [`Self::active_audio_output_device`].
    pub fn set_active_device(&mut self, kind: DeviceKind, device_id: String) {
        match kind {
            DeviceKind::VideoInput => self.active_video_device = Some(device_id),
            DeviceKind::AudioInput => self.active_audio_device = Some(device_id),
            DeviceKind::AudioOutput => self.active_audio_output_device = Some(device_id),
        }
    }

    /// Returns the remembered audio-output (playback) device id, if any, for
    /// the host to apply to its remote-audio render sink (SPEC_FULL.md §4.3).
    #[must_use]
    pub fn active_audio_output_device(&self) -> Option<&str> {
        self.active_audio_output_device.as_deref()
    }

    /// Rotates to the next available camera (SPEC_FULL.md §4.3). Returns
    /// `Ok(None)` without contacting the provider again if there is nothing
    /// to rotate to.
    pub async fn rotate_video_device(&mut self) -> TaggedResult<Option<LocalStream>> {
        let devices = self
            .provider
            .enumerate_devices()
            .await
            .map_err(|traced| (DeviceTag::Camera, traced))?;
        let next = next_video_device_id(&devices, self.active_video_device.as_deref())
            .map(str::to_owned);

        let Some(next) = next else { return Ok(None) };
        self.active_video_device = Some(next);
        Ok(Some(self.acquire(false).await?))
    }
}
