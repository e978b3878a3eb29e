//! Local media capture and device selection (SPEC_FULL.md §3 "Local Media",
//! §4.3 "Device Coordinator").

pub mod constraints;
pub mod device;
pub mod manager;
pub mod provider;
pub mod track;

pub use constraints::{MediaStreamConstraints, TrackConstraints};
pub use device::{DeviceInfo, DeviceKind, FacingMode};
pub use manager::DeviceCoordinator;
pub use provider::{DeviceError, MediaProvider};
pub use track::{LocalStream, LocalTrack, MediaStreamTrack, RemoteStream, TrackHandle};

/// Whether a track/constraint/device concerns video or audio.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MediaKind {
    Video,
    Audio,
}

/// Whether local video originates from a camera or a screen/window capture,
/// carried alongside outbound tracks so the UI can distinguish the two
/// (SPEC_FULL.md §4.3, `shareScreen`/`shareVideo`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MediaSourceKind {
    Device,
    Display,
}
