//! UE context release scenarios: both directions, idempotency, races.

use std::time::Duration;

use tokio::task::LocalSet;
use tokio::time;

use rancp_common::types::{AmfUeNgapId, UeId};
use rancp_ngap::messages::{
    DownlinkNasTransport, NgapPdu, UeContextReleaseCommand, UeNgapIds,
};
use rancp_ngap::{Cause, CauseNas, CauseRadioNetwork};
use rancp_node::engine::NgapTaskMessage;

use crate::harness::{settle, TestHarness};

#[tokio::test]
async fn node_initiated_release_completes_on_amf_command() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue = UeId(1);
            let ran_id = harness.establish_ue(ue, AmfUeNgapId(100)).await;

            harness.engine.handle_message(NgapTaskMessage::UeReleaseRequest {
                ue_id: ue,
                cause: Cause::RadioNetwork(CauseRadioNetwork::RadioConnectionWithUeLost),
            });
            settle().await;
            let Some(NgapPdu::UeContextReleaseRequest(request)) =
                harness.transport.last("UeContextReleaseRequest")
            else {
                panic!("no release request");
            };
            assert_eq!(request.ran_ue_ngap_id, ran_id);

            harness.deliver(NgapPdu::UeContextReleaseCommand(UeContextReleaseCommand {
                ue_ngap_ids: UeNgapIds::Pair {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                },
                cause: Cause::Nas(CauseNas::NormalRelease),
            }));
            settle().await;

            assert_eq!(harness.transport.count("UeContextReleaseComplete"), 1);
            assert_eq!(harness.sessions.released_ues.borrow().as_slice(), &[ue]);

            // The context is gone: a follow-up message gets an error
            // indication instead of being processed.
            harness.deliver(NgapPdu::DownlinkNasTransport(DownlinkNasTransport {
                amf_ue_ngap_id: AmfUeNgapId(100),
                ran_ue_ngap_id: ran_id,
                nas_pdu: vec![0x7E],
            }));
            settle().await;
            assert_eq!(harness.transport.count("ErrorIndication"), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn unanswered_release_request_falls_back_to_local_teardown() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue = UeId(1);
            harness.establish_ue(ue, AmfUeNgapId(100)).await;

            harness.engine.handle_message(NgapTaskMessage::UeReleaseRequest {
                ue_id: ue,
                cause: Cause::RadioNetwork(CauseRadioNetwork::RadioConnectionWithUeLost),
            });
            settle().await;
            assert_eq!(harness.transport.count("UeContextReleaseRequest"), 1);

            // Default transaction timeout is 5s.
            time::sleep(Duration::from_secs(6)).await;
            settle().await;
            assert_eq!(harness.sessions.released_ues.borrow().as_slice(), &[ue]);
            assert_eq!(harness.transport.count("UeContextReleaseComplete"), 0);
        })
        .await;
}

#[tokio::test]
async fn duplicate_release_commands_produce_one_side_effect() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue = UeId(1);
            let ran_id = harness.establish_ue(ue, AmfUeNgapId(100)).await;

            let command = NgapPdu::UeContextReleaseCommand(UeContextReleaseCommand {
                ue_ngap_ids: UeNgapIds::Pair {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                },
                cause: Cause::Nas(CauseNas::Deregister),
            });
            harness.deliver(command.clone());
            harness.deliver(command);
            settle().await;

            assert_eq!(harness.transport.count("UeContextReleaseComplete"), 1);
            assert_eq!(harness.sessions.released_ues.borrow().as_slice(), &[ue]);
        })
        .await;
}

#[tokio::test]
async fn messages_during_release_flush_as_error_indications_after_complete() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue = UeId(1);
            let ran_id = harness.establish_ue(ue, AmfUeNgapId(100)).await;

            harness.deliver(NgapPdu::UeContextReleaseCommand(UeContextReleaseCommand {
                ue_ngap_ids: UeNgapIds::Pair {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                },
                cause: Cause::Nas(CauseNas::NormalRelease),
            }));
            // Arrives while the release is scheduled but not yet complete.
            harness.deliver(NgapPdu::DownlinkNasTransport(DownlinkNasTransport {
                amf_ue_ngap_id: AmfUeNgapId(100),
                ran_ue_ngap_id: ran_id,
                nas_pdu: vec![0x7E],
            }));
            settle().await;

            // The NAS payload was absorbed, and the stored error indication
            // went out after the release complete.
            assert!(harness.sessions.delivered_nas.borrow().is_empty());
            let names = harness.transport.names();
            let complete_at = names
                .iter()
                .position(|name| *name == "UeContextReleaseComplete")
                .expect("no release complete");
            let indication_at = names
                .iter()
                .position(|name| *name == "ErrorIndication")
                .expect("no flushed error indication");
            assert!(indication_at > complete_at);
        })
        .await;
}

#[tokio::test]
async fn release_command_by_amf_id_alone_resolves_the_ue() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue = UeId(1);
            harness.establish_ue(ue, AmfUeNgapId(100)).await;

            harness.deliver(NgapPdu::UeContextReleaseCommand(UeContextReleaseCommand {
                ue_ngap_ids: UeNgapIds::AmfOnly(AmfUeNgapId(100)),
                cause: Cause::Nas(CauseNas::Deregister),
            }));
            settle().await;
            assert_eq!(harness.transport.count("UeContextReleaseComplete"), 1);
            assert_eq!(harness.sessions.released_ues.borrow().as_slice(), &[ue]);
        })
        .await;
}

#[tokio::test]
async fn inconsistent_id_pairing_releases_the_stale_context() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue_a = UeId(1);
            let ue_b = UeId(2);
            harness.establish_ue(ue_a, AmfUeNgapId(100)).await;
            let ran_b = harness.establish_ue(ue_b, AmfUeNgapId(200)).await;

            // AMF id of UE A arrives paired with UE B's RAN id.
            harness.deliver(NgapPdu::DownlinkNasTransport(DownlinkNasTransport {
                amf_ue_ngap_id: AmfUeNgapId(100),
                ran_ue_ngap_id: ran_b,
                nas_pdu: vec![0x7E],
            }));
            settle().await;

            // The message itself is dropped and answered with the received
            // ids, and the stale context (UE A) is being released.
            assert!(harness.sessions.delivered_nas.borrow().is_empty());
            let Some(NgapPdu::ErrorIndication(indication)) =
                harness.transport.last("ErrorIndication")
            else {
                panic!("no error indication");
            };
            assert_eq!(indication.amf_ue_ngap_id, Some(AmfUeNgapId(100)));
            assert_eq!(indication.ran_ue_ngap_id, Some(ran_b));
            let Some(NgapPdu::UeContextReleaseRequest(request)) =
                harness.transport.last("UeContextReleaseRequest")
            else {
                panic!("no release request for the stale context");
            };
            assert_eq!(request.amf_ue_ngap_id, AmfUeNgapId(100));
        })
        .await;
}

#[tokio::test]
async fn association_loss_drops_every_ue_without_signalling() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            harness.establish_ue(UeId(1), AmfUeNgapId(100)).await;
            harness.establish_ue(UeId(2), AmfUeNgapId(200)).await;
            let sent_before = harness.transport.sent.borrow().len();

            harness
                .engine
                .handle_message(NgapTaskMessage::AssociationLost);
            settle().await;

            let mut released = harness.sessions.released_ues.borrow().clone();
            released.sort();
            assert_eq!(released, vec![UeId(1), UeId(2)]);
            assert_eq!(harness.transport.sent.borrow().len(), sent_before);
        })
        .await;
}
