//! Typed, validated runtime configuration for a [`Call`](crate::orchestrator::Call).
//!
//! Generalizes a "dynamic config object" design note into a
//! `Deserialize`-able struct, exposing its knobs as a typed config rather
//! than an untyped map.

use serde::{Deserialize, Serialize};

/// Maximum bandwidth enforced on locally generated offers/answers by the
/// [SDP rewriter](crate::sdp).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bandwidth {
    /// No `b=AS`/`b=TIAS` lines are enforced; existing ones are stripped.
    Unlimited,

    /// Enforce `b=AS:<kbps>` and `b=TIAS:<kbps * 1000>` on every media
    /// section.
    Kbps(u32),
}

impl Default for Bandwidth {
    fn default() -> Self {
        Self::Kbps(600)
    }
}

/// Log verbosity, mapped onto [`log::LevelFilter`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Warn
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

/// Opaque passthrough of host ICE-server / transport-policy configuration.
///
/// The orchestrator never inspects this; it is handed verbatim to the
/// [`PeerConnection`](crate::peer::PeerConnectionFactory) factory on every
/// peer connection creation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RtcConfiguration {
    /// STUN/TURN server URLs, in host-specific syntax.
    pub ice_servers: Vec<String>,

    /// Username for TURN authentication, if any.
    pub ice_username: Option<String>,

    /// Credential for TURN authentication, if any.
    pub ice_credential: Option<String>,
}

/// Typed configuration accepted by a [`Call`](crate::orchestrator::Call).
///
/// Every key named in the distilled specification's "Dynamic config object"
/// design note is represented here; `signaling`/`network`/`media`/
/// `statistics` collaborators are constructor parameters rather than config
/// fields, since they are trait objects and cannot round-trip through
/// `Deserialize`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    /// Diagnostic log verbosity.
    pub log_level: LogLevel,

    /// Whether locally produced offers/answers are parsed and re-serialized
    /// before being set and sent (see [`crate::sdp`]).
    ///
    /// Modeled as a plain boolean read for truthiness; the distilled spec's
    /// source read "option key present at all", which this implementation
    /// treats as a defect rather than intended behavior (see DESIGN.md).
    pub allow_sdp_transform: bool,

    /// Whether a stuck ICE gathering completion schedules a restart-call
    /// check (see [`crate::orchestrator::reconnection`]).
    pub allow_ice_stalled_checking: bool,

    /// Whether a `disconnected` ICE state triggers the bitrate-driven
    /// disconnection strategy (see
    /// [`crate::orchestrator::disconnection`]).
    pub allow_bitrate_checking: bool,

    /// Bandwidth ceiling enforced on locally generated SDP.
    pub bandwidth: Bandwidth,

    /// Passthrough ICE/transport configuration for the host peer connection
    /// factory.
    pub rtc_configuration: RtcConfiguration,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            allow_sdp_transform: false,
            allow_ice_stalled_checking: false,
            allow_bitrate_checking: false,
            bandwidth: Bandwidth::default(),
            rtc_configuration: RtcConfiguration::default(),
        }
    }
}

impl CallConfig {
    /// Installs [`Self::log_level`] as the process-wide [`log`] max level.
    pub fn apply_log_level(&self) {
        log::set_max_level(self.log_level.into());
    }
}
