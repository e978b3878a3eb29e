//! Call Orchestrator: the reactive controller coordinating signaling, local
//! media, and the host peer connection (SPEC_FULL.md §2, §4.4).
//!
//! Grounded on `room.rs`'s `Room`/`InnerRoom` split — a `Room(Rc<InnerRoom>)`
//! handle wrapping shared state, `rpc: Rc<dyn RpcSession>` and
//! `media_manager: Rc<MediaManager>` collaborators held by `Rc<dyn Trait>`,
//! and a single event-fan-in dispatcher (there, `RoomHandle::on_*`
//! callbacks; here, [`PeerEvent`]s and [`signaling::Event`]s multiplexed
//! through [`Call::drive`]).
//!
//! The `Call`/`CallCtx` split mirrors that `Room`/`InnerRoom` shape: a thin
//! `Rc`-wrapped handle cloned freely by callers, backing a single shared
//! context struct.

pub mod disconnection;
pub mod negotiation;
pub mod reconnection;
pub mod state;

use std::{cell::RefCell, rc::Rc, time::Duration};

use derive_more::{Display, From};
use futures::{channel::mpsc, StreamExt as _};
use medea_reactive::ObservableCell;
use tracerr::Traced;

use crate::{
    bitrate::{Bitrate, BitrateSampler, StatisticsProvider},
    config::CallConfig,
    error::{CallError, DeviceTag, ErrorKind},
    events::{CallEvent, EventEmitter},
    ice_buffer::IceCandidateBuffer,
    media::{
        constraints::MediaStreamConstraints, device::DeviceKind, manager::DeviceCoordinator,
        provider::{DeviceError, MediaProvider},
        track::LocalStream, MediaKind, RemoteStream,
    },
    network::NetworkStatus,
    peer::{
        data_channel::{ControlMessage, DataChannel, ExternalControls},
        PeerConnection, PeerConnectionFactory, PeerEvent,
    },
    sdp,
    signaling::{self, SignalingTransport},
};

pub use state::{CallState, NegotiationRole};

/// Errors raised directly by orchestration logic, before being wrapped into
/// a [`CallError`] at the public boundary.
#[derive(Clone, Debug, Display, From)]
pub enum OrchestratorError {
    #[display(fmt = "finish() called with no active room")]
    NoActiveRoom,

    #[display(fmt = "host runtime does not support adding local tracks")]
    AddTrackUnsupported,
}

pub type Result<T> = std::result::Result<T, Traced<OrchestratorError>>;

/// Maps a [`DeviceError`] onto the `DEVICE_NOT_FOUND_ERROR` /
/// `DEVICE_PERMISSION_ERROR` distinction of SPEC_FULL.md §7, and wraps it
/// into a [`CallError`] tagged with the camera/microphone it concerns.
/// Enumeration failures carry no further classification from the host and
/// are treated as not-found, matching `enumerate_devices`'s own fallback.
fn device_call_error((device, traced): (DeviceTag, Traced<DeviceError>)) -> CallError {
    let (err, trace) = traced.into_parts();
    let kind = match err {
        DeviceError::PermissionDenied => ErrorKind::DevicePermission,
        DeviceError::NotFound | DeviceError::Enumeration(_) => ErrorKind::DeviceNotFound,
    };
    CallError::new(kind, Traced::from_parts(err, trace)).with_device(device)
}

/// Mutable state of a [`Call`], held behind a single `Rc<RefCell<_>>` since
/// the orchestrator runs entirely on one task (SPEC_FULL.md §5).
struct Inner {
    room_id: Option<String>,
    constraints: Option<MediaStreamConstraints>,
    screen_share: bool,

    finished: bool,
    matched: bool,
    connected: bool,
    state: CallState,

    local_stream: LocalStream,
    remote_stream: RemoteStream,
    external_controls: ExternalControls,

    ice_queue: IceCandidateBuffer,
    peer: Option<Rc<dyn PeerConnection>>,
    data_channel: Option<Box<dyn DataChannel>>,

    ice_failed_once: bool,
    network_probed_once: bool,
}

impl Inner {
    fn new() -> Self {
        Self {
            room_id: None,
            constraints: None,
            screen_share: false,
            finished: false,
            matched: false,
            connected: false,
            state: CallState::Idle,
            local_stream: LocalStream::new(),
            remote_stream: RemoteStream::new(),
            external_controls: ExternalControls::default(),
            ice_queue: IceCandidateBuffer::new(),
            peer: None,
            data_channel: None,
            ice_failed_once: false,
            network_probed_once: false,
        }
    }
}

/// Single-flight guards for the three reconnection/disconnection triggers
/// (SPEC_FULL.md §5, "Single-flight flags"). Modeled as
/// [`ObservableCell`]s, per SPEC_FULL.md §10, so diagnostics or tests can
/// subscribe to their transitions instead of polling a bare `bool`.
pub(crate) struct Flags {
    pub(crate) running_disconnection_strategy: ObservableCell<bool>,
    pub(crate) listening_for_network_change: ObservableCell<bool>,
}

impl Flags {
    fn new() -> Self {
        Self {
            running_disconnection_strategy: ObservableCell::new(false),
            listening_for_network_change: ObservableCell::new(false),
        }
    }
}

/// The singleton session owned by one [`Call`] instance (SPEC_FULL.md §3,
/// "Call").
///
/// Cheaply `Clone`-able: every clone shares the same underlying state, the
/// way `Room`/`RoomHandle` share an `Rc<InnerRoom>`.
/// Collaborators are injected at construction as `Rc<dyn Trait>`, mirroring
/// `Room::new`'s `rpc: Rc<dyn RpcSession>` parameter.
#[derive(Clone)]
pub struct Call(Rc<CallCtx>);

pub(crate) struct CallCtx {
    inner: RefCell<Inner>,
    flags: Flags,
    events: EventEmitter,
    config: CallConfig,
    signaling: Rc<dyn SignalingTransport>,
    peer_factory: Rc<dyn PeerConnectionFactory>,
    media: RefCell<DeviceCoordinator>,
    network: Rc<dyn NetworkStatus>,
    statistics: Rc<dyn StatisticsProvider>,
    bitrate_sampler: RefCell<BitrateSampler>,
}

impl Call {
    /// Constructs a new, idle [`Call`] wired to the given collaborators.
    ///
    /// No network activity happens until [`Call::start`] is invoked.
    #[must_use]
    pub fn new(
        config: CallConfig,
        signaling: Rc<dyn SignalingTransport>,
        peer_factory: Rc<dyn PeerConnectionFactory>,
        media_provider: Rc<dyn MediaProvider>,
        network: Rc<dyn NetworkStatus>,
        statistics: Rc<dyn StatisticsProvider>,
    ) -> Self {
        config.apply_log_level();
        Self(Rc::new(CallCtx {
            inner: RefCell::new(Inner::new()),
            flags: Flags::new(),
            events: EventEmitter::new(),
            config,
            signaling,
            peer_factory,
            media: RefCell::new(DeviceCoordinator::new(media_provider)),
            network,
            statistics,
            bitrate_sampler: RefCell::new(BitrateSampler::new()),
        }))
    }

    /// Registers a listener for the public [`CallEvent`] stream
    /// (SPEC_FULL.md §4.5).
    pub fn subscribe(&self, listener: impl FnMut(&CallEvent) + 'static) {
        self.0.events.subscribe(listener);
    }

    /// Whether the call has reached its terminal state.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.0.inner.borrow().finished
    }

    /// Whether the data channel is currently open.
    #[must_use]
    pub fn matched(&self) -> bool {
        self.0.inner.borrow().matched
    }

    /// Whether the signaling transport is currently subscribed.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.0.inner.borrow().connected
    }

    /// Whether the local video track, if any, is currently enabled.
    #[must_use]
    pub fn video(&self) -> bool {
        self.0.inner.borrow().local_stream.is_enabled(MediaKind::Video)
    }

    /// Whether the local audio track, if any, is currently enabled.
    #[must_use]
    pub fn audio(&self) -> bool {
        self.0.inner.borrow().local_stream.is_enabled(MediaKind::Audio)
    }

    /// Returns the most recently reported peer `{audio, video}` state.
    #[must_use]
    pub fn external_controls(&self) -> ExternalControls {
        self.0.inner.borrow().external_controls
    }

    /// Returns a clone of the local stream's current track handles.
    #[must_use]
    pub fn local_stream(&self) -> LocalStream {
        self.0.inner.borrow().local_stream.clone()
    }

    /// Returns a clone of the assembled remote stream's current track
    /// handles.
    #[must_use]
    pub fn remote_stream(&self) -> RemoteStream {
        self.0.inner.borrow().remote_stream.clone()
    }

    /// `start({roomId, constraints})` (SPEC_FULL.md §4.4).
    ///
    /// Acquires media, attaches signaling listeners once, connects signaling
    /// if not already connected, and enters the offerer/answerer path as
    /// inbound events arrive. No-ops (returning immediately) if `finished`.
    pub async fn start(&self, room_id: String, constraints: MediaStreamConstraints) -> Result<()> {
        if self.0.inner.borrow().finished {
            return Ok(());
        }

        {
            let mut inner = self.0.inner.borrow_mut();
            inner.room_id = Some(room_id.clone());
            inner.constraints = Some(constraints.clone());
            inner.state = CallState::AcquiringMedia;
        }
        // A fresh negotiation cycle (first `start()`, or a restart-call's
        // `clean()` + `start()`) gets its own single ICE-restart attempt
        // (SPEC_FULL.md §4.4 "Reconnection strategy": "first failure in the
        // session") and its own first-probe timeout (SPEC_FULL.md §5,
        // "3000 ms start, 2900 ms retry").
        self.reset_ice_failed();
        self.0.inner.borrow_mut().network_probed_once = false;

        if let Err(traced) = self.acquire_media(&constraints).await {
            self.emit_error(device_call_error(traced));
            return Ok(());
        }
        self.0.events.emit(CallEvent::LocalTrackChange);

        let already_connected = self.0.inner.borrow().connected;
        if !already_connected {
            self.spawn_signaling_loop();
            if let Err(traced) = self.0.signaling.connect(&room_id).await {
                self.emit_error(CallError::new(ErrorKind::Support, traced));
                return Ok(());
            }
            self.0.inner.borrow_mut().connected = true;
        }

        self.0.inner.borrow_mut().state = CallState::SignalingConnected;
        self.0.events.emit(CallEvent::Change);
        Ok(())
    }

    pub(crate) async fn acquire_media(
        &self,
        constraints: &MediaStreamConstraints,
    ) -> std::result::Result<(), (DeviceTag, Traced<crate::media::provider::DeviceError>)> {
        let screen_share = constraints.audio.is_none() && constraints.video.is_some();
        self.0.inner.borrow_mut().screen_share = screen_share;
        let stream = self.0.media.borrow_mut().acquire(screen_share).await?;
        self.0.inner.borrow_mut().local_stream = stream;
        Ok(())
    }

    /// Spawns the task draining the [`SignalingTransport`]'s event stream
    /// into [`negotiation::handle_signaling_event`]. Installed at most once
    /// per [`Call`] lifetime (SPEC_FULL.md §4.4: "attach signaling listeners
    /// once").
    fn spawn_signaling_loop(&self) {
        let call = self.clone();
        let mut events = self.0.signaling.events();
        tokio::task::spawn_local(async move {
            while let Some(event) = events.next().await {
                if call.0.inner.borrow().finished {
                    break;
                }
                negotiation::handle_signaling_event(&call, event).await;
            }
        });
    }

    /// Creates a fresh peer connection, wiring its [`PeerEvent`] stream into
    /// [`Self::drive_peer_events`], replacing (and closing) any existing one
    /// first (SPEC_FULL.md §3 invariant 3).
    pub(crate) fn rebuild_peer_connection(&self) -> Rc<dyn PeerConnection> {
        self.close_peer_connection();

        let (tx, rx) = mpsc::unbounded();
        let peer = self.0.peer_factory.create(&self.0.config.rtc_configuration, tx);
        self.0.inner.borrow_mut().peer = Some(Rc::clone(&peer));

        let call = self.clone();
        tokio::task::spawn_local(async move {
            call.drive_peer_events(rx).await;
        });

        peer
    }

    async fn drive_peer_events(&self, mut events: mpsc::UnboundedReceiver<PeerEvent>) {
        while let Some(event) = events.next().await {
            if self.0.inner.borrow().finished {
                break;
            }
            negotiation::handle_peer_event(self, event).await;
        }
    }

    /// Closes and clears the current peer connection and data channel, if
    /// any, without touching local media tracks (SPEC_FULL.md §3 invariant
    /// 3, §4.4 `clean()`).
    fn close_peer_connection(&self) {
        let mut inner = self.0.inner.borrow_mut();
        if let Some(peer) = inner.peer.take() {
            peer.close();
        }
        inner.data_channel = None;
    }

    /// `clean()` (SPEC_FULL.md §4.4): closes data channel and peer
    /// connection if not already closed, clears the ICE queue and external
    /// controls. Preserves local tracks so a subsequent `start()` can reuse
    /// them.
    pub fn clean(&self) {
        self.close_peer_connection();
        let mut inner = self.0.inner.borrow_mut();
        inner.ice_queue = IceCandidateBuffer::new();
        inner.external_controls = ExternalControls::default();
        inner.matched = false;
        inner.state = CallState::Idle;
    }

    /// `finish()` (SPEC_FULL.md §4.4): terminal teardown. Idempotent.
    pub async fn finish(&self) -> Result<()> {
        if self.0.inner.borrow().finished {
            return Ok(());
        }

        let room_id = self.0.inner.borrow().room_id.clone();
        let Some(room_id) = room_id else {
            return Err(tracerr::new!(OrchestratorError::NoActiveRoom));
        };

        {
            let mut inner = self.0.inner.borrow_mut();
            inner.finished = true;
            inner.room_id = None;
            inner.constraints = None;
            inner.state = CallState::Finished;
        }

        self.clean();
        self.0.inner.borrow_mut().local_stream.stop_all();
        self.0.inner.borrow_mut().local_stream = LocalStream::new();

        // Best-effort: signaling-layer errors on the way down are logged,
        // not propagated (SPEC_FULL.md §7 propagation policy).
        if let Err(traced) = self.0.signaling.finish(&room_id).await {
            log::warn!("finish(): signaling finish failed: {traced}");
        }
        if let Err(traced) = self.0.signaling.disconnect(&room_id).await {
            log::warn!("finish(): signaling disconnect failed: {traced}");
        }

        self.0.events.emit(CallEvent::Finish);
        self.0.events.emit(CallEvent::Change);
        Ok(())
    }

    /// `toggle_audio()` / `toggle_video()` (SPEC_FULL.md §4.4). Silent
    /// no-op if there is no local stream of the given kind.
    pub async fn toggle(&self, kind: MediaKind) {
        let call = self;
        call.0.inner.borrow().local_stream.toggle(kind);
        call.0.events.emit(CallEvent::Change);
        call.push_external_controls().await;
    }

    async fn push_external_controls(&self) {
        let controls = ExternalControls { audio: self.audio(), video: self.video() };
        let message = ControlMessage::ExternalControls(controls);
        let Ok(json) = serde_json::to_string(&message) else { return };
        self.send(&json).await;
    }

    /// `set_active_device(d)` (SPEC_FULL.md §4.3/§4.4). A
    /// [`DeviceKind::AudioOutput`] selection names a playback sink, not a
    /// captured track, so it is remembered without acquiring media or
    /// touching the peer connection.
    pub async fn set_active_device(&self, kind: DeviceKind, device_id: String) -> Result<()> {
        self.0.media.borrow_mut().set_active_device(kind, device_id);
        if kind == DeviceKind::AudioOutput {
            self.0.events.emit(CallEvent::Change);
            return Ok(());
        }
        self.renegotiate_with_new_devices().await
    }

    /// Returns the remembered audio-output (playback) device id, if any, for
    /// the host to apply to its remote-audio render sink.
    #[must_use]
    pub fn active_audio_output_device(&self) -> Option<String> {
        self.0.media.borrow().active_audio_output_device().map(str::to_owned)
    }

    /// `next_video_device()` (SPEC_FULL.md §4.3/§4.4): rotates the active
    /// camera, wrapping around the enumerated list.
    pub async fn next_video_device(&self) -> Result<()> {
        let rotated = self.0.media.borrow_mut().rotate_video_device().await;
        match rotated {
            Ok(Some(stream)) => {
                self.0.inner.borrow_mut().local_stream = stream.clone();
                self.0.events.emit(CallEvent::LocalTrackChange);
                self.switch_peer_tracks(&stream).await;
            }
            Ok(None) => {}
            Err(traced) => self.emit_error(device_call_error(traced)),
        }
        Ok(())
    }

    async fn renegotiate_with_new_devices(&self) -> Result<()> {
        let constraints = self.0.inner.borrow().constraints.clone();
        if let Some(constraints) = constraints {
            if let Err(traced) = self.acquire_media(&constraints).await {
                self.emit_error(device_call_error(traced));
                return Ok(());
            }
            self.0.events.emit(CallEvent::LocalTrackChange);
            let stream = self.local_stream();
            self.switch_peer_tracks(&stream).await;
        }
        Ok(())
    }

    /// Pushes every track of a freshly (re-)acquired `stream` to the active
    /// peer connection, if one exists: replaced in place via
    /// [`PeerConnection::replace_track`] where the host supports it, else
    /// added as a new sender and followed by a single ICE-restart
    /// renegotiation (SPEC_FULL.md §4.3 "Switch", §4.4 "device switch").
    async fn switch_peer_tracks(&self, stream: &LocalStream) {
        let Some(peer) = self.peer() else { return };
        let mut needs_reoffer = false;

        for (kind, track) in
            [(MediaKind::Video, stream.video.as_ref()), (MediaKind::Audio, stream.audio.as_ref())]
        {
            let Some(track) = track else { continue };
            let replaced = match peer.replace_track(kind, track).await {
                Ok(replaced) => replaced,
                Err(traced) => {
                    log::warn!("replace_track failed, falling back to add_track: {traced}");
                    false
                }
            };
            if replaced {
                continue;
            }
            if let Err(traced) = peer.add_track(track).await {
                self.emit_error(CallError::new(ErrorKind::Support, traced));
                continue;
            }
            needs_reoffer = true;
        }

        if needs_reoffer {
            negotiation::create_and_send_offer(self, &peer, true).await;
        }
    }

    /// `share_screen()` (SPEC_FULL.md §4.4): renegotiates by tearing down
    /// and re-starting the call with screen-share constraints.
    pub async fn share_screen(&self) -> Result<()> {
        self.restart_with_constraints(MediaStreamConstraints::screen_share()).await
    }

    /// `share_video()` (SPEC_FULL.md §4.4): renegotiates back to
    /// camera + microphone constraints.
    pub async fn share_video(&self) -> Result<()> {
        self.restart_with_constraints(MediaStreamConstraints::camera_and_microphone()).await
    }

    async fn restart_with_constraints(&self, constraints: MediaStreamConstraints) -> Result<()> {
        let Some(room_id) = self.0.inner.borrow().room_id.clone() else {
            return Err(tracerr::new!(OrchestratorError::NoActiveRoom));
        };
        self.clean();
        if let Err(traced) = self.start(room_id, constraints).await {
            log::error!("share_screen/share_video restart failed: {traced}");
            return Ok(());
        }
        negotiation::start_offerer(self).await;
        Ok(())
    }

    /// `send(data)` (SPEC_FULL.md §4.4): forwards `data` over the data
    /// channel. Silent no-op if the channel is not open.
    pub async fn send(&self, data: &str) {
        let is_open = self.0.inner.borrow().data_channel.as_ref().is_some_and(|dc| dc.is_open());
        if !is_open {
            return;
        }
        let inner = self.0.inner.borrow();
        if let Some(dc) = inner.data_channel.as_ref() {
            if let Err(traced) = dc.send(data).await {
                log::warn!("send(): data channel send failed: {traced}");
            }
        }
    }

    /// Emits a [`CallEvent::Error`] and logs it.
    pub(crate) fn emit_error(&self, error: CallError) {
        error.log();
        self.0.events.emit(CallEvent::Error(error));
    }

    pub(crate) fn config(&self) -> &CallConfig {
        &self.0.config
    }

    pub(crate) fn signaling(&self) -> &Rc<dyn SignalingTransport> {
        &self.0.signaling
    }

    pub(crate) fn network(&self) -> &Rc<dyn NetworkStatus> {
        &self.0.network
    }

    pub(crate) fn flags(&self) -> &Flags {
        &self.0.flags
    }

    pub(crate) fn peer(&self) -> Option<Rc<dyn PeerConnection>> {
        self.0.inner.borrow().peer.clone()
    }

    pub(crate) fn room_id(&self) -> Option<String> {
        self.0.inner.borrow().room_id.clone()
    }

    pub(crate) fn constraints(&self) -> Option<MediaStreamConstraints> {
        self.0.inner.borrow().constraints.clone()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.0.inner.borrow().finished
    }

    pub(crate) fn set_state(&self, state: CallState) {
        self.0.inner.borrow_mut().state = state;
    }

    pub(crate) fn state(&self) -> CallState {
        self.0.inner.borrow().state
    }

    pub(crate) fn set_data_channel(&self, channel: Box<dyn DataChannel>) {
        self.0.inner.borrow_mut().data_channel = Some(channel);
    }

    pub(crate) fn on_data_channel_open(&self) {
        self.0.inner.borrow_mut().matched = true;
        let call = self.clone();
        tokio::task::spawn_local(async move {
            call.push_external_controls().await;
        });
    }

    pub(crate) fn on_data_channel_closed(&self) {
        self.0.inner.borrow_mut().matched = false;
        self.0.events.emit(CallEvent::Change);
    }

    pub(crate) fn on_data_channel_message(&self, raw: &str) {
        match serde_json::from_str::<ControlMessage>(raw) {
            Ok(ControlMessage::ExternalControls(controls)) => {
                self.0.inner.borrow_mut().external_controls = controls;
                self.0.events.emit(CallEvent::Change);
            }
            Err(_) => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(value) => self.0.events.emit(CallEvent::Message(value)),
                Err(err) => log::warn!("data channel message failed to parse: {err}"),
            },
        }
    }

    pub(crate) fn emit_change(&self) {
        self.0.events.emit(CallEvent::Change);
    }

    pub(crate) fn emit_track_change(&self) {
        self.0.events.emit(CallEvent::TrackChange);
    }

    pub(crate) fn emit_local_track_change(&self) {
        self.0.events.emit(CallEvent::LocalTrackChange);
    }

    /// Marks the signaling subscription as no longer live, in response to a
    /// server-initiated `disconnect`/`close` (SPEC_FULL.md §6).
    pub(crate) fn mark_disconnected(&self) {
        self.0.inner.borrow_mut().connected = false;
    }

    pub(crate) fn push_ice_candidate(&self, candidate: crate::peer::IceCandidate) {
        self.0.inner.borrow_mut().ice_queue.push(candidate);
    }

    pub(crate) fn drain_ice_queue(&self) -> Vec<crate::peer::IceCandidate> {
        self.0.inner.borrow_mut().ice_queue.drain()
    }

    pub(crate) fn mark_ice_failed_once(&self) -> bool {
        let mut inner = self.0.inner.borrow_mut();
        let was_failed_before = inner.ice_failed_once;
        inner.ice_failed_once = true;
        was_failed_before
    }

    pub(crate) fn reset_ice_failed(&self) {
        self.0.inner.borrow_mut().ice_failed_once = false;
    }

    /// Returns whether the network-reachability probe has already run once
    /// this negotiation episode, and marks it as having run. The first probe
    /// uses [`crate::network::INITIAL_PROBE_TIMEOUT`]; every later one in the
    /// same episode uses [`crate::network::RETRY_PROBE_TIMEOUT`]
    /// (SPEC_FULL.md §5).
    pub(crate) fn mark_network_probed_once(&self) -> bool {
        let mut inner = self.0.inner.borrow_mut();
        let was_probed_before = inner.network_probed_once;
        inner.network_probed_once = true;
        was_probed_before
    }

    pub(crate) fn push_remote_track(&self, kind: MediaKind, track: crate::media::TrackHandle) {
        self.0.inner.borrow_mut().remote_stream.push(kind, track);
    }

    pub(crate) fn has_peer_video_enabled(&self) -> bool {
        !self.0.inner.borrow().remote_stream.video_tracks.is_empty()
    }

    pub(crate) async fn rewrite_sdp(&self, sdp: &str) -> String {
        sdp::rewrite(sdp, self.0.config.bandwidth, self.0.config.allow_sdp_transform)
    }

    /// Samples current per-channel bitrate via the injected
    /// [`StatisticsProvider`] (SPEC_FULL.md §4.2).
    pub(crate) async fn sample_bitrate(&self) -> Bitrate {
        let raw = self.0.statistics.sample().await;
        self.0.bitrate_sampler.borrow_mut().update(raw)
    }

    pub(crate) async fn sleep(duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
