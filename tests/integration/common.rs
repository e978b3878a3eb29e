//! Hand-rolled collaborator fakes driving the scenarios in `../integration/`.
//!
//! Plain struct implementations rather than `mockall` mocks: the scenarios
//! below need stateful, inspectable doubles (a signaling transport whose
//! sent SDP the test reads back, a network probe the test flips online/
//! offline mid-test, a peer connection whose `signalingState` tracks real
//! transitions) rather than one-shot call/return expectations, so a small
//! owned fake is a better fit here than a generated mock.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
    time::Duration,
};

use call_orchestrator::{
    bitrate::{RawChannelStats, StatisticsProvider},
    media::{
        provider::{self, MediaProvider},
        DeviceInfo, DeviceKind, LocalStream, LocalTrack, MediaKind, MediaStreamConstraints,
        MediaStreamTrack,
    },
    network::{Connectivity, NetworkStatus, Subscription},
    peer::{
        self, data_channel::DataChannel, ConnectionState, DataChannelEvent, IceCandidate,
        IceConnectionState, IceGatheringState, OfferOptions, PeerConnection,
        PeerConnectionFactory, PeerEvent, SdpType, SessionDescription, SignalingState,
    },
    signaling::{self, Event as SignalingEvent, SignalingTransport},
    CallConfig, CallEvent,
};
use call_orchestrator::orchestrator::Call;
use futures::channel::mpsc;

const DEFAULT_OFFER_SDP: &str = "v=0\no=- 0 0 IN IP4 127.0.0.1\ns=-\nt=0 0\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111\nc=IN IP4 0.0.0.0\na=sendrecv\n\
m=video 9 UDP/TLS/RTP/SAVPF 96\nc=IN IP4 0.0.0.0\na=sendrecv\n";

const DEFAULT_ANSWER_SDP: &str = "v=0\no=- 1 0 IN IP4 127.0.0.1\ns=-\nt=0 0\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111\nc=IN IP4 0.0.0.0\na=sendrecv\n\
m=video 9 UDP/TLS/RTP/SAVPF 96\nc=IN IP4 0.0.0.0\na=sendrecv\n";

/// Runs `fut` on a single-threaded [`tokio::task::LocalSet`], matching the
/// crate's `!Send`, single-threaded scheduling model (SPEC_FULL.md §5).
pub async fn local<F: std::future::Future<Output = ()>>(fut: F) {
    tokio::task::LocalSet::new().run_until(fut).await;
}

/// Yields repeatedly so every task the orchestrator spawned via
/// `tokio::task::spawn_local` in reaction to an event pushed by a test gets
/// a chance to run before the test asserts on the result.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// Subscribes a `Vec`-backed sink to every [`CallEvent`] a [`Call`] emits.
pub fn collect_events(call: &Call) -> Rc<RefCell<Vec<CallEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    call.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

pub fn fake_device(id: &str, kind: DeviceKind) -> DeviceInfo {
    DeviceInfo { device_id: id.into(), kind, label: id.into(), facing: None }
}

pub fn default_devices() -> Vec<DeviceInfo> {
    vec![fake_device("cam-1", DeviceKind::VideoInput), fake_device("mic-1", DeviceKind::AudioInput)]
}

/// A well-formed inbound offer, as if relayed by the signaling server from
/// a remote peer.
pub fn remote_offer_sdp() -> String {
    DEFAULT_OFFER_SDP.to_string()
}

/// A host-provided media track double: tracks `enabled`/`stop` calls but
/// never captures anything real.
pub struct FakeTrack {
    id: String,
    kind: MediaKind,
    enabled: Cell<bool>,
    stopped: Cell<bool>,
}

impl FakeTrack {
    pub fn new(id: &str, kind: MediaKind) -> LocalTrack {
        Rc::new(Self { id: id.into(), kind, enabled: Cell::new(true), stopped: Cell::new(false) })
    }
}

impl MediaStreamTrack for FakeTrack {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    fn stop(&self) {
        self.stopped.set(true);
    }
}

pub fn fake_local_stream() -> LocalStream {
    LocalStream {
        video: Some(FakeTrack::new("video-1", MediaKind::Video)),
        audio: Some(FakeTrack::new("audio-1", MediaKind::Audio)),
    }
}

/// Always succeeds, handing back a fresh [`fake_local_stream`] for every
/// acquisition and the devices it was built with for every enumeration.
pub struct FakeMediaProvider {
    devices: Vec<DeviceInfo>,
}

impl FakeMediaProvider {
    pub fn new(devices: Vec<DeviceInfo>) -> Rc<Self> {
        Rc::new(Self { devices })
    }
}

#[async_trait::async_trait(?Send)]
impl MediaProvider for FakeMediaProvider {
    async fn enumerate_devices(&self) -> provider::Result<Vec<DeviceInfo>> {
        Ok(self.devices.clone())
    }

    async fn get_user_media(&self, _constraints: &MediaStreamConstraints) -> provider::Result<LocalStream> {
        Ok(fake_local_stream())
    }

    async fn get_display_media(&self, _constraints: &MediaStreamConstraints) -> provider::Result<LocalStream> {
        Ok(LocalStream { video: Some(FakeTrack::new("screen-1", MediaKind::Video)), audio: None })
    }
}

/// Reachability probe the test can flip online/offline mid-scenario, and
/// whose registered `on_change` callback the test can fire by calling
/// [`Self::set_online`].
pub struct ControllableNetwork {
    online: Cell<bool>,
    listener: RefCell<Option<Box<dyn FnMut(Connectivity)>>>,
}

impl ControllableNetwork {
    pub fn new(online: bool) -> Rc<Self> {
        Rc::new(Self { online: Cell::new(online), listener: RefCell::new(None) })
    }

    /// Sets the probed connectivity and, if now online, fires any registered
    /// `on_change` listener as a real network stack would on the transition.
    pub fn set_online(&self, online: bool) {
        self.online.set(online);
        if online {
            if let Some(callback) = self.listener.borrow_mut().as_mut() {
                callback(Connectivity::Online);
            }
        }
    }

    pub fn has_listener(&self) -> bool {
        self.listener.borrow().is_some()
    }
}

struct NoopSubscription;

impl Subscription for NoopSubscription {
    fn unsubscribe(&self) {}
}

#[async_trait::async_trait(?Send)]
impl NetworkStatus for ControllableNetwork {
    async fn is_online(&self, _timeout: Duration) -> bool {
        self.online.get()
    }

    fn on_change(&self, callback: Box<dyn FnMut(Connectivity)>) -> Box<dyn Subscription> {
        *self.listener.borrow_mut() = Some(callback);
        Box::new(NoopSubscription)
    }
}

/// Reports an all-zero sample every time; no scenario below exercises the
/// bitrate-driven disconnection strategy (covered at the unit level in
/// `src/orchestrator/disconnection.rs`), so there is nothing to vary.
pub struct FakeStatistics;

#[async_trait::async_trait(?Send)]
impl StatisticsProvider for FakeStatistics {
    async fn sample(&self) -> RawChannelStats {
        RawChannelStats::default()
    }
}

/// A host-provided data channel double that accepts every send and reports
/// itself open.
pub struct FakeDataChannel {
    sent: RefCell<Vec<String>>,
}

impl FakeDataChannel {
    pub fn new() -> Self {
        Self { sent: RefCell::new(Vec::new()) }
    }
}

#[async_trait::async_trait(?Send)]
impl DataChannel for FakeDataChannel {
    async fn send(&self, data: &str) -> call_orchestrator::peer::data_channel::Result<()> {
        self.sent.borrow_mut().push(data.to_string());
        Ok(())
    }

    fn is_open(&self) -> bool {
        true
    }
}

/// A host-provided peer connection double whose `signalingState` advances
/// the way a real `RTCPeerConnection` would across `set_local_description`/
/// `set_remote_description`, and which records every outbound SDP and ICE
/// candidate so scenarios can assert on them.
pub struct FakePeer {
    signaling_state: Cell<SignalingState>,
    ice_connection_state: Cell<IceConnectionState>,
    ice_gathering_state: Cell<IceGatheringState>,
    connection_state: Cell<ConnectionState>,
    senders_count: Cell<usize>,
    has_remote_description: Cell<bool>,
    restart_ice_supported: Cell<bool>,
    restart_ice_calls: Cell<usize>,
    closed: Cell<bool>,
    offer_sdp: String,
    answer_sdp: String,
    local_offers: RefCell<Vec<String>>,
    local_answers: RefCell<Vec<String>>,
    added_candidates: RefCell<Vec<IceCandidate>>,
}

impl FakePeer {
    pub fn new() -> Self {
        Self {
            signaling_state: Cell::new(SignalingState::Stable),
            ice_connection_state: Cell::new(IceConnectionState::New),
            ice_gathering_state: Cell::new(IceGatheringState::New),
            connection_state: Cell::new(ConnectionState::New),
            senders_count: Cell::new(0),
            has_remote_description: Cell::new(false),
            restart_ice_supported: Cell::new(true),
            restart_ice_calls: Cell::new(0),
            closed: Cell::new(false),
            offer_sdp: DEFAULT_OFFER_SDP.to_string(),
            answer_sdp: DEFAULT_ANSWER_SDP.to_string(),
            local_offers: RefCell::new(Vec::new()),
            local_answers: RefCell::new(Vec::new()),
            added_candidates: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn without_ice_restart_support(self) -> Self {
        self.restart_ice_supported.set(false);
        self
    }

    pub fn restart_ice_call_count(&self) -> usize {
        self.restart_ice_calls.get()
    }

    pub fn sent_local_offers(&self) -> Vec<String> {
        self.local_offers.borrow().clone()
    }

    pub fn sent_local_answers(&self) -> Vec<String> {
        self.local_answers.borrow().clone()
    }

    pub fn added_candidate_count(&self) -> usize {
        self.added_candidates.borrow().len()
    }

    pub fn added_candidates(&self) -> Vec<IceCandidate> {
        self.added_candidates.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

#[async_trait::async_trait(?Send)]
impl PeerConnection for FakePeer {
    fn signaling_state(&self) -> SignalingState {
        self.signaling_state.get()
    }

    fn ice_connection_state(&self) -> IceConnectionState {
        self.ice_connection_state.get()
    }

    fn ice_gathering_state(&self) -> IceGatheringState {
        self.ice_gathering_state.get()
    }

    fn connection_state(&self) -> ConnectionState {
        self.connection_state.get()
    }

    fn senders_count(&self) -> usize {
        self.senders_count.get()
    }

    async fn add_track(&self, _track: &LocalTrack) -> peer::Result<()> {
        self.senders_count.set(self.senders_count.get() + 1);
        Ok(())
    }

    async fn replace_track(&self, _kind: MediaKind, _track: &LocalTrack) -> peer::Result<bool> {
        Ok(true)
    }

    async fn create_data_channel(
        &self,
        _label: &str,
        _ordered: bool,
    ) -> peer::Result<Box<dyn DataChannel>> {
        Ok(Box::new(FakeDataChannel::new()))
    }

    async fn create_offer(&self, _options: OfferOptions) -> peer::Result<String> {
        Ok(self.offer_sdp.clone())
    }

    async fn create_answer(&self) -> peer::Result<String> {
        Ok(self.answer_sdp.clone())
    }

    async fn set_local_description(&self, desc: SessionDescription) -> peer::Result<()> {
        match desc.sdp_type {
            SdpType::Offer => {
                self.signaling_state.set(SignalingState::HaveLocalOffer);
                self.local_offers.borrow_mut().push(desc.sdp);
            }
            SdpType::Answer => {
                self.signaling_state.set(SignalingState::Stable);
                self.local_answers.borrow_mut().push(desc.sdp);
            }
            SdpType::Pranswer | SdpType::Rollback => {}
        }
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> peer::Result<()> {
        match desc.sdp_type {
            SdpType::Offer => self.signaling_state.set(SignalingState::HaveRemoteOffer),
            SdpType::Answer => self.signaling_state.set(SignalingState::Stable),
            SdpType::Pranswer | SdpType::Rollback => {}
        }
        self.has_remote_description.set(true);
        Ok(())
    }

    fn has_remote_description(&self) -> bool {
        self.has_remote_description.get()
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> peer::Result<()> {
        self.added_candidates.borrow_mut().push(candidate);
        Ok(())
    }

    async fn restart_ice(&self) -> bool {
        self.restart_ice_calls.set(self.restart_ice_calls.get() + 1);
        self.restart_ice_supported.get()
    }

    fn close(&self) {
        self.closed.set(true);
    }
}

/// Hands out pre-queued [`FakePeer`]s (or a freshly default-built one if the
/// queue is empty) from [`PeerConnectionFactory::create`], and records each
/// connection's [`PeerEvent`] sender so a test can push events as if the
/// host RTC stack fired them.
pub struct TestPeerFactory {
    queue: RefCell<VecDeque<Rc<dyn PeerConnection>>>,
    senders: RefCell<Vec<mpsc::UnboundedSender<PeerEvent>>>,
}

impl TestPeerFactory {
    pub fn new() -> Rc<Self> {
        Rc::new(Self { queue: RefCell::new(VecDeque::new()), senders: RefCell::new(Vec::new()) })
    }

    pub fn push(&self, peer: Rc<dyn PeerConnection>) {
        self.queue.borrow_mut().push_back(peer);
    }

    /// The [`PeerEvent`] sender for the `n`th (0-indexed) connection created
    /// so far.
    pub fn events(&self, n: usize) -> mpsc::UnboundedSender<PeerEvent> {
        self.senders.borrow()[n].clone()
    }

    pub fn created_count(&self) -> usize {
        self.senders.borrow().len()
    }
}

impl PeerConnectionFactory for TestPeerFactory {
    fn create(
        &self,
        _config: &call_orchestrator::config::RtcConfiguration,
        events: mpsc::UnboundedSender<PeerEvent>,
    ) -> Rc<dyn PeerConnection> {
        self.senders.borrow_mut().push(events);
        self.queue.borrow_mut().pop_front().unwrap_or_else(|| Rc::new(FakePeer::new()))
    }
}

/// Drives the data channel straight to `open` for the `n`th peer connection,
/// the way a real host fires `PeerEvent::DataChannel(Open)` right after its
/// underlying RTC data channel reports `readyState = "open"`.
pub fn open_data_channel(factory: &TestPeerFactory, n: usize) {
    factory.events(n).unbounded_send(PeerEvent::DataChannel(DataChannelEvent::Open)).unwrap();
}

/// The signaling transport double: records every outbound call and exposes
/// the inbound event sender so a test can simulate server-pushed events.
pub struct TestSignaling {
    connected: Cell<bool>,
    sent_offers: RefCell<Vec<String>>,
    sent_answers: RefCell<Vec<String>>,
    sent_candidates: RefCell<Vec<String>>,
    finish_calls: Cell<usize>,
    disconnect_calls: Cell<usize>,
    events_rx: RefCell<Option<mpsc::UnboundedReceiver<SignalingEvent>>>,
}

impl TestSignaling {
    pub fn new() -> (Rc<Self>, mpsc::UnboundedSender<SignalingEvent>) {
        let (tx, rx) = mpsc::unbounded();
        let signaling = Rc::new(Self {
            connected: Cell::new(false),
            sent_offers: RefCell::new(Vec::new()),
            sent_answers: RefCell::new(Vec::new()),
            sent_candidates: RefCell::new(Vec::new()),
            finish_calls: Cell::new(0),
            disconnect_calls: Cell::new(0),
            events_rx: RefCell::new(Some(rx)),
        });
        (signaling, tx)
    }

    pub fn finish_call_count(&self) -> usize {
        self.finish_calls.get()
    }

    pub fn disconnect_call_count(&self) -> usize {
        self.disconnect_calls.get()
    }

    pub fn sent_offer_count(&self) -> usize {
        self.sent_offers.borrow().len()
    }

    pub fn last_offer(&self) -> Option<String> {
        self.sent_offers.borrow().last().cloned()
    }

    pub fn sent_answer_count(&self) -> usize {
        self.sent_answers.borrow().len()
    }

    pub fn last_answer(&self) -> Option<String> {
        self.sent_answers.borrow().last().cloned()
    }

    pub fn sent_candidate_count(&self) -> usize {
        self.sent_candidates.borrow().len()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }
}

#[async_trait::async_trait(?Send)]
impl SignalingTransport for TestSignaling {
    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    async fn connect(&self, id: &str) -> signaling::Result<String> {
        self.connected.set(true);
        Ok(id.to_string())
    }

    async fn disconnect(&self, id: &str) -> signaling::Result<String> {
        self.connected.set(false);
        self.disconnect_calls.set(self.disconnect_calls.get() + 1);
        Ok(id.to_string())
    }

    async fn finish(&self, id: &str) -> signaling::Result<String> {
        self.finish_calls.set(self.finish_calls.get() + 1);
        Ok(id.to_string())
    }

    async fn send_sdp_offer(&self, sdp: &str, room_id: &str) -> signaling::Result<String> {
        self.sent_offers.borrow_mut().push(sdp.to_string());
        Ok(room_id.to_string())
    }

    async fn send_sdp_answer(&self, sdp: &str, room_id: &str) -> signaling::Result<String> {
        self.sent_answers.borrow_mut().push(sdp.to_string());
        Ok(room_id.to_string())
    }

    async fn send_ice_candidate(&self, candidate: &str, room_id: &str) -> signaling::Result<String> {
        self.sent_candidates.borrow_mut().push(candidate.to_string());
        Ok(room_id.to_string())
    }

    fn events(&self) -> futures::stream::LocalBoxStream<'static, SignalingEvent> {
        let rx = self
            .events_rx
            .borrow_mut()
            .take()
            .expect("TestSignaling::events() polled more than once");
        Box::pin(rx)
    }
}

/// Everything one scenario needs: a wired-up [`Call`] plus handles to every
/// collaborator double so the test can drive events and assert on what the
/// orchestrator sent/did.
pub struct Rig {
    pub call: Call,
    pub signaling: Rc<TestSignaling>,
    pub signaling_events: mpsc::UnboundedSender<SignalingEvent>,
    pub factory: Rc<TestPeerFactory>,
    pub network: Rc<ControllableNetwork>,
}

pub fn build(config: CallConfig, online: bool, devices: Vec<DeviceInfo>) -> Rig {
    let (signaling, signaling_events) = TestSignaling::new();
    let factory = TestPeerFactory::new();
    let media = FakeMediaProvider::new(devices);
    let network = ControllableNetwork::new(online);
    let statistics = Rc::new(FakeStatistics);

    let call = Call::new(
        config,
        Rc::clone(&signaling),
        Rc::clone(&factory),
        media,
        Rc::clone(&network),
        statistics,
    );

    Rig { call, signaling, signaling_events, factory, network }
}
