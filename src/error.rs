//! Error kinds surfaced to consumers of a [`Call`](crate::orchestrator::Call),
//! and the traced wrapper used to propagate them.
//!
//! Modeled after `medea-jason`'s `JasonError`/`JsCaused` pair: every error
//! that can reach a consumer is tagged with a stable kind (the five error
//! codes from the call orchestrator's error design) and carries a
//! [`tracerr::Trace`] so a `RUST_LOG=trace` run shows where in the call graph
//! the failure originated.

use std::fmt;

use derive_more::Display;
use tracerr::{Trace, Traced};

/// Which of the five recognized error conditions a [`CallError`] represents.
///
/// See the call orchestrator's error-handling design for the exact
/// propagation policy of each kind.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorKind {
    /// Runtime lacks `add_track` entirely; the call cannot proceed.
    #[display(fmt = "SUPPORT_ERROR")]
    Support,

    /// ICE failed twice in one session.
    #[display(fmt = "POOR_CONNECTION_ERROR")]
    PoorConnection,

    /// Network probe returned offline during recovery.
    #[display(fmt = "NO_INTERNET_ACCESS_ERROR")]
    NoInternetAccess,

    /// Device enumeration/acquisition failed with `NotFound`/`NotReadable`/
    /// `Overconstrained`.
    #[display(fmt = "DEVICE_NOT_FOUND_ERROR")]
    DeviceNotFound,

    /// Device acquisition failed with `Abort`/`Security`/`NotAllowed`.
    #[display(fmt = "DEVICE_PERMISSION_ERROR")]
    DevicePermission,

    /// A signaling-server-originated error, forwarded verbatim per the
    /// propagation policy (not one of the five classified conditions above,
    /// which each carry a specific recovery action).
    #[display(fmt = "SIGNALING_ERROR")]
    Signaling,
}

/// Which local device a [`DEVICE_NOT_FOUND_ERROR`](ErrorKind::DeviceNotFound)
/// / [`DEVICE_PERMISSION_ERROR`](ErrorKind::DevicePermission) concerns.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum DeviceTag {
    #[display(fmt = "camera")]
    Camera,
    #[display(fmt = "microphone")]
    Microphone,
}

/// Abstract application error surfaced through the `error` event.
///
/// Carries an [`ErrorKind`] so consumers can branch on the error code without
/// string-matching the message, a human-readable `message`, an optional
/// [`DeviceTag`] for device errors, and a [`Trace`] of where it was raised.
#[derive(Clone, Debug)]
pub struct CallError {
    kind: ErrorKind,
    message: String,
    device: Option<DeviceTag>,
    trace: Trace,
}

impl CallError {
    /// Creates a new [`CallError`] of the given `kind` with the provided
    /// `message`, from a component error that carried a [`Trace`].
    pub fn new<E: fmt::Display>(kind: ErrorKind, traced: Traced<E>) -> Self {
        let (err, trace) = traced.into_parts();
        Self { kind, message: err.to_string(), device: None, trace }
    }

    /// Creates a new [`CallError`] without an upstream traced cause, tracing
    /// from this call site.
    pub fn raised(kind: ErrorKind, message: impl Into<String>) -> Self {
        let (_, trace) = tracerr::new!(RaisedHere).into_parts();
        Self { kind, message: message.into(), device: None, trace }
    }

    /// Attaches a [`DeviceTag`] identifying which device this error concerns.
    #[must_use]
    pub fn with_device(mut self, device: DeviceTag) -> Self {
        self.device = Some(device);
        self
    }

    /// Returns this error's [`ErrorKind`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the device this error concerns, if any.
    #[must_use]
    pub fn device(&self) -> Option<DeviceTag> {
        self.device
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the trace of where this error was raised and propagated.
    #[must_use]
    pub fn trace(&self) -> String {
        self.trace.to_string()
    }

    /// Logs this error at `error` level, including its trace.
    pub fn log(&self) {
        log::error!("{}: {}\n{}", self.kind, self.message, self.trace);
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CallError {}

#[derive(Debug, Display)]
struct RaisedHere;

/// Shorthand for a [`Result`] whose error is a traced component error `E`.
pub type Result<T, E> = std::result::Result<T, Traced<E>>;
