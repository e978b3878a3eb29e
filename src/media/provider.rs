//! Device-acquisition seam implemented by the embedding host
//! (SPEC_FULL.md §6, "Media provider contract").
//!
//! Grounded on `media/manager.rs`'s `MediaManager`, which wraps
//! `web_sys::MediaDevices::get_user_media`/`get_display_media`. Here the
//! acquisition calls themselves are pulled out into an injected trait, since
//! this crate has no `web_sys::MediaDevices` to call — the host supplies
//! whatever concrete capture backend it has (a `cpal`/`v4l`-based stack, a
//! wasm `web_sys` binding, a Dart FFI bridge, a mock for tests).

use async_trait::async_trait;
use derive_more::{Display, From};
use tracerr::Traced;

use super::{constraints::MediaStreamConstraints, device::DeviceInfo, track::LocalStream};
use crate::error::DeviceTag;

/// Errors raised acquiring devices or media, mapped directly onto
/// [`crate::error::ErrorKind::DeviceNotFound`] /
/// [`crate::error::ErrorKind::DevicePermission`] at the Call Orchestrator
/// boundary (SPEC_FULL.md §7).
#[derive(Clone, Debug, Display, From)]
pub enum DeviceError {
    #[display(fmt = "no device satisfies the requested constraints")]
    NotFound,

    #[display(fmt = "permission to access the device was denied")]
    PermissionDenied,

    #[display(fmt = "failed to enumerate devices: {}", _0)]
    #[from(ignore)]
    Enumeration(String),
}

pub type Result<T> = std::result::Result<T, Traced<DeviceError>>;

/// A [`DeviceError`] tagged with which device it concerns, so the Call
/// Orchestrator boundary can surface `DEVICE_NOT_FOUND_ERROR`/
/// `DEVICE_PERMISSION_ERROR` per-device as SPEC_FULL.md §7 requires.
pub type TaggedResult<T> = std::result::Result<T, (DeviceTag, Traced<DeviceError>)>;

/// Host-implemented seam for enumerating and acquiring media devices.
#[cfg_attr(feature = "mockable", mockall::automock)]
#[async_trait(?Send)]
pub trait MediaProvider {
    /// Lists every input/output device currently available. Labels may be
    /// blank until permission has been granted at least once, mirroring
    /// `MediaDevices.enumerateDevices()` semantics.
    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>>;

    /// Requests camera/microphone capture per `constraints`.
    async fn get_user_media(&self, constraints: &MediaStreamConstraints) -> Result<LocalStream>;

    /// Requests a screen/window/tab capture stream. `constraints.audio` is
    /// honored only if the host platform supports system-audio capture;
    /// hosts that don't should silently ignore it rather than erroring.
    async fn get_display_media(&self, constraints: &MediaStreamConstraints) -> Result<LocalStream>;
}
