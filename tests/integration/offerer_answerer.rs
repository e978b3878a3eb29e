//! Happy-path offerer and answerer negotiation, driven end to end through
//! the public [`Call`] API against the fakes in `common`.

use call_orchestrator::{
    media::MediaStreamConstraints,
    peer::{DataChannelEvent, PeerEvent},
    signaling::Event as SignalingEvent,
    CallConfig, CallEvent,
};

use crate::common;

#[tokio::test(flavor = "current_thread")]
async fn offerer_sends_an_offer_once_negotiation_is_needed() {
    common::local(async {
        let rig = common::build(CallConfig::default(), true, common::default_devices());
        let events = common::collect_events(&rig.call);

        rig.call
            .start("room-1".into(), MediaStreamConstraints::camera_and_microphone())
            .await
            .unwrap();
        assert!(rig.call.connected());

        rig.signaling_events
            .unbounded_send(SignalingEvent::NewPeer { id: "peer-1".into() })
            .unwrap();
        common::settle().await;
        assert_eq!(rig.factory.created_count(), 1);
        // The offerer only adds tracks and opens the data channel up front;
        // it waits for the host's `negotiationneeded` before offering.
        assert_eq!(rig.signaling.sent_offer_count(), 0);

        rig.factory.events(0).unbounded_send(PeerEvent::NegotiationNeeded).unwrap();
        common::settle().await;

        assert_eq!(rig.signaling.sent_offer_count(), 1);
        let offer = rig.signaling.last_offer().unwrap();
        assert!(offer.contains("b=AS:600"), "default bandwidth ceiling was not enforced: {offer}");

        common::open_data_channel(&rig.factory, 0);
        common::settle().await;
        assert!(rig.call.matched());

        assert!(events.borrow().iter().any(|e| matches!(e, CallEvent::Change)));
    })
    .await;
}

#[tokio::test(flavor = "current_thread")]
async fn answerer_replies_to_an_inbound_offer() {
    common::local(async {
        let rig = common::build(CallConfig::default(), true, common::default_devices());

        rig.call
            .start("room-2".into(), MediaStreamConstraints::camera_and_microphone())
            .await
            .unwrap();

        rig.signaling_events
            .unbounded_send(SignalingEvent::NewOffer {
                sdp: common::remote_offer_sdp(),
                room_id: "room-2".into(),
            })
            .unwrap();
        common::settle().await;

        assert_eq!(rig.factory.created_count(), 1);
        assert_eq!(rig.signaling.sent_answer_count(), 1);
        let answer = rig.signaling.last_answer().unwrap();
        assert!(answer.contains("b=AS:600"));

        common::open_data_channel(&rig.factory, 0);
        common::settle().await;
        assert!(rig.call.matched());
    })
    .await;
}

#[tokio::test(flavor = "current_thread")]
async fn answerer_reuses_already_acquired_media() {
    common::local(async {
        let rig = common::build(CallConfig::default(), true, common::default_devices());
        rig.call
            .start("room-3".into(), MediaStreamConstraints::camera_and_microphone())
            .await
            .unwrap();
        let acquired_before = rig.call.local_stream();

        rig.signaling_events
            .unbounded_send(SignalingEvent::NewOffer {
                sdp: common::remote_offer_sdp(),
                room_id: "room-3".into(),
            })
            .unwrap();
        common::settle().await;

        // Media was already acquired by `start()`; the answerer path must
        // not re-acquire (no second `LocalTrackChange` track swap).
        assert_eq!(rig.call.local_stream().video.is_some(), acquired_before.video.is_some());
        assert_eq!(rig.call.local_stream().audio.is_some(), acquired_before.audio.is_some());
    })
    .await;
}

#[tokio::test(flavor = "current_thread")]
async fn data_channel_message_is_exposed_as_a_call_event() {
    common::local(async {
        let rig = common::build(CallConfig::default(), true, common::default_devices());
        rig.call
            .start("room-4".into(), MediaStreamConstraints::camera_and_microphone())
            .await
            .unwrap();
        rig.signaling_events
            .unbounded_send(SignalingEvent::NewPeer { id: "peer-1".into() })
            .unwrap();
        common::settle().await;
        common::open_data_channel(&rig.factory, 0);
        common::settle().await;

        let events = common::collect_events(&rig.call);
        rig.factory
            .events(0)
            .unbounded_send(PeerEvent::DataChannel(DataChannelEvent::Message(
                r#"{"type":"ec","data":{"audio":true,"video":false}}"#.into(),
            )))
            .unwrap();
        common::settle().await;

        assert!(events.borrow().iter().any(|e| matches!(e, CallEvent::Change)));
        assert!(!rig.call.external_controls().video);
    })
    .await;
}
