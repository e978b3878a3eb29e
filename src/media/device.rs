//! Device descriptors returned by [`MediaProvider::enumerate_devices`]
//! (SPEC_FULL.md §6, "Media provider contract").
//!
//! Grounded on `media/device_info.rs`'s `InputDeviceInfo` wrapper, generalized
//! from a `web_sys::MediaDeviceInfo` wrapper to a plain owned struct since
//! this crate has no JS object to wrap.

use serde::{Deserialize, Serialize};

/// Which kind of device a [`DeviceInfo`] describes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// The direction a camera reports facing, when the host can determine it
/// (mobile runtimes typically can; desktop webcams typically cannot).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    Front,
    Back,
}

/// One device as reported by [`MediaProvider::enumerate_devices`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    pub label: String,
    pub facing: Option<FacingMode>,
}

impl DeviceInfo {
    /// Whether this device's `label` looks like a rear/back-facing camera
    /// (case-insensitive `back`/`rear` match), used as the fallback
    /// heuristic when [`DeviceInfo::facing`] is unavailable
    /// (SPEC_FULL.md §4.3).
    #[must_use]
    pub fn label_suggests_rear_facing(&self) -> bool {
        let label = self.label.to_lowercase();
        label.contains("back") || label.contains("rear")
    }
}
