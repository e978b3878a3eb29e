//! ICE-restart-on-failure and network-aware restart-call, driven end to end
//! through the public [`Call`] API (SPEC_FULL.md §4.4 "Reconnection
//! strategy").

use std::rc::Rc;

use call_orchestrator::{
    error::ErrorKind,
    media::MediaStreamConstraints,
    peer::{ConnectionState, IceConnectionState, PeerConnection, PeerEvent},
    signaling::Event as SignalingEvent,
    CallConfig, CallEvent,
};

use crate::common::{self, FakePeer};

#[tokio::test(flavor = "current_thread")]
async fn first_ice_failure_restarts_ice_second_raises_poor_connection() {
    common::local(async {
        let rig = common::build(CallConfig::default(), true, common::default_devices());
        rig.call
            .start("room-5".into(), MediaStreamConstraints::camera_and_microphone())
            .await
            .unwrap();

        let peer = Rc::new(FakePeer::new());
        rig.factory.push(Rc::clone(&peer) as Rc<dyn PeerConnection>);
        rig.signaling_events
            .unbounded_send(SignalingEvent::NewPeer { id: "peer-1".into() })
            .unwrap();
        common::settle().await;

        let events = common::collect_events(&rig.call);

        rig.factory
            .events(0)
            .unbounded_send(PeerEvent::IceConnectionStateChange(IceConnectionState::Failed))
            .unwrap();
        common::settle().await;

        assert_eq!(peer.restart_ice_call_count(), 1);
        assert!(!events.borrow().iter().any(|e| matches!(e, CallEvent::Error(_))));

        rig.factory
            .events(0)
            .unbounded_send(PeerEvent::IceConnectionStateChange(IceConnectionState::Failed))
            .unwrap();
        common::settle().await;

        assert_eq!(peer.restart_ice_call_count(), 1, "second failure must not retry ICE restart");
        assert!(events
            .borrow()
            .iter()
            .any(|e| matches!(e, CallEvent::Error(err) if err.kind() == ErrorKind::PoorConnection)));
    })
    .await;
}

#[tokio::test(flavor = "current_thread")]
async fn ice_restart_falls_back_to_renegotiation_when_unsupported() {
    common::local(async {
        let rig = common::build(CallConfig::default(), true, common::default_devices());
        rig.call
            .start("room-6".into(), MediaStreamConstraints::camera_and_microphone())
            .await
            .unwrap();

        let peer = Rc::new(FakePeer::new().without_ice_restart_support());
        rig.factory.push(Rc::clone(&peer) as Rc<dyn PeerConnection>);
        rig.signaling_events
            .unbounded_send(SignalingEvent::NewPeer { id: "peer-1".into() })
            .unwrap();
        common::settle().await;

        rig.factory
            .events(0)
            .unbounded_send(PeerEvent::IceConnectionStateChange(IceConnectionState::Failed))
            .unwrap();
        common::settle().await;

        assert_eq!(peer.restart_ice_call_count(), 1);
        assert_eq!(rig.signaling.sent_offer_count(), 1, "host lacks restartIce, so a fresh offer is sent instead");
    })
    .await;
}

#[tokio::test(flavor = "current_thread")]
async fn connection_lost_waits_offline_then_restarts_the_call_once_back_online() {
    common::local(async {
        let rig = common::build(CallConfig::default(), false, common::default_devices());
        rig.call
            .start("room-7".into(), MediaStreamConstraints::camera_and_microphone())
            .await
            .unwrap();

        let peer1 = Rc::new(FakePeer::new());
        rig.factory.push(Rc::clone(&peer1) as Rc<dyn PeerConnection>);
        rig.signaling_events
            .unbounded_send(SignalingEvent::NewPeer { id: "peer-1".into() })
            .unwrap();
        common::settle().await;
        assert_eq!(rig.factory.created_count(), 1);

        // Queued ahead of time: `restart_call` rebuilds the peer connection,
        // which pulls the next entry off the factory's queue.
        let peer2 = Rc::new(FakePeer::new());
        rig.factory.push(Rc::clone(&peer2) as Rc<dyn PeerConnection>);

        let events = common::collect_events(&rig.call);
        rig.factory
            .events(0)
            .unbounded_send(PeerEvent::ConnectionStateChange(ConnectionState::Failed))
            .unwrap();
        common::settle().await;

        assert!(rig.network.has_listener(), "must subscribe for the next online transition");
        assert!(events
            .borrow()
            .iter()
            .any(|e| matches!(e, CallEvent::Error(err) if err.kind() == ErrorKind::NoInternetAccess)));
        assert_eq!(rig.factory.created_count(), 1, "must not restart while still offline");

        rig.network.set_online(true);
        common::settle().await;

        assert_eq!(rig.factory.created_count(), 2, "restart-call rebuilds the peer connection");
        assert!(peer1.is_closed(), "the stale peer connection is closed by clean()");
    })
    .await;
}
