//! UE context setup and PDU session management scenarios.

use tokio::task::LocalSet;

use rancp_common::types::{AmfUeNgapId, PduSessionId, UeId};
use rancp_ngap::messages::{
    AggregateMaximumBitRate, DownlinkNasTransport, InitialContextSetupRequest, NgapPdu,
    PduSessionReleaseItem, PduSessionResourceReleaseCommand, PduSessionResourceSetupRequest,
    PduSessionSetupItem, QosFlowItem, Snssai,
};
use rancp_ngap::{Cause, CauseRadioNetwork};
use rancp_node::engine::NgapTaskMessage;

use crate::harness::{settle, TestHarness};

fn session_item(id: u8, gbr: bool) -> PduSessionSetupItem {
    PduSessionSetupItem {
        pdu_session_id: PduSessionId(id),
        snssai: Snssai { sst: 1, sd: None },
        qos_flows: vec![QosFlowItem { qfi: 1, gbr }],
        transfer: vec![0x01],
    }
}

fn ambr() -> AggregateMaximumBitRate {
    AggregateMaximumBitRate {
        downlink: 100_000_000,
        uplink: 50_000_000,
    }
}

#[tokio::test]
async fn context_setup_establishes_sessions_and_delivers_nas() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue = UeId(1);
            let ran_id = harness.admit_ue(ue).await;

            harness.deliver(NgapPdu::InitialContextSetupRequest(
                InitialContextSetupRequest {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                    ue_aggregate_maximum_bit_rate: Some(ambr()),
                    security_key: vec![0x22; 32],
                    pdu_session_list: vec![session_item(1, false)],
                    nas_pdu: Some(vec![0x7E, 0x02]),
                },
            ));
            settle().await;

            let Some(NgapPdu::InitialContextSetupResponse(resp)) =
                harness.transport.last("InitialContextSetupResponse")
            else {
                panic!("no context setup response");
            };
            assert_eq!(resp.setup_list.len(), 1);
            assert!(resp.failed_list.is_empty());
            assert_eq!(
                harness.sessions.delivered_nas.borrow().as_slice(),
                &[(ue, vec![0x7E, 0x02])]
            );

            let report = harness.engine.metrics_report();
            assert_eq!(report.context_setup.succeeded, 1);
            assert_eq!(report.session_setup.succeeded, 1);
        })
        .await;
}

#[tokio::test]
async fn security_failure_rejects_the_whole_context_setup() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ran_id = harness.admit_ue(UeId(1)).await;
            harness.sessions.fail_security.set(true);

            harness.deliver(NgapPdu::InitialContextSetupRequest(
                InitialContextSetupRequest {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                    ue_aggregate_maximum_bit_rate: Some(ambr()),
                    security_key: vec![0x22; 32],
                    pdu_session_list: vec![session_item(1, true), session_item(2, true)],
                    nas_pdu: None,
                },
            ));
            settle().await;

            let Some(NgapPdu::InitialContextSetupFailure(failure)) =
                harness.transport.last("InitialContextSetupFailure")
            else {
                panic!("no context setup failure");
            };
            // Total failure: one failed item per requested session.
            assert_eq!(failure.failed_list.len(), 2);
            assert_eq!(
                failure.cause,
                Cause::RadioNetwork(
                    CauseRadioNetwork::EncryptionAndIntegrityAlgorithmsNotSupported
                )
            );
            assert_eq!(harness.transport.count("InitialContextSetupResponse"), 0);
        })
        .await;
}

#[tokio::test]
async fn duplicate_session_ids_never_reach_the_session_layer() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue = UeId(1);
            let ran_id = harness.establish_ue(ue, AmfUeNgapId(100)).await;

            harness.deliver(NgapPdu::PduSessionResourceSetupRequest(
                PduSessionResourceSetupRequest {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                    ue_aggregate_maximum_bit_rate: Some(ambr()),
                    setup_list: vec![
                        session_item(1, true),
                        session_item(2, true),
                        session_item(2, true),
                    ],
                },
            ));
            settle().await;

            // Only session 1 was forwarded.
            let forwarded: Vec<PduSessionId> = harness
                .sessions
                .setup_calls
                .borrow()
                .last()
                .expect("session layer not called")
                .1
                .sessions
                .iter()
                .map(|item| item.pdu_session_id)
                .collect();
            assert_eq!(forwarded, vec![PduSessionId(1)]);

            let Some(NgapPdu::PduSessionResourceSetupResponse(resp)) =
                harness.transport.last("PduSessionResourceSetupResponse")
            else {
                panic!("no setup response");
            };
            assert_eq!(resp.setup_list.len(), 1);
            assert_eq!(resp.failed_list.len(), 1);
            assert_eq!(resp.failed_list[0].pdu_session_id, PduSessionId(2));
            assert_eq!(
                resp.failed_list[0].cause,
                Cause::RadioNetwork(CauseRadioNetwork::MultiplePduSessionIdInstances)
            );

            // A partial failure asks the AMF to release the UE.
            assert_eq!(harness.transport.count("UeContextReleaseRequest"), 1);
        })
        .await;
}

#[tokio::test]
async fn partial_collaborator_failure_triggers_release_request() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue = UeId(1);
            let ran_id = harness.establish_ue(ue, AmfUeNgapId(100)).await;
            harness
                .sessions
                .fail_session_ids
                .borrow_mut()
                .push(PduSessionId(2));

            harness.deliver(NgapPdu::PduSessionResourceSetupRequest(
                PduSessionResourceSetupRequest {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                    ue_aggregate_maximum_bit_rate: Some(ambr()),
                    setup_list: vec![session_item(1, true), session_item(2, true)],
                },
            ));
            settle().await;

            let Some(NgapPdu::PduSessionResourceSetupResponse(resp)) =
                harness.transport.last("PduSessionResourceSetupResponse")
            else {
                panic!("no setup response");
            };
            assert_eq!(resp.setup_list.len(), 1);
            assert_eq!(resp.failed_list.len(), 1);
            assert_eq!(harness.transport.count("UeContextReleaseRequest"), 1);

            let report = harness.engine.metrics_report();
            assert_eq!(report.session_setup.succeeded, 1);
            assert_eq!(report.session_setup.failed(), 1);
        })
        .await;
}

#[tokio::test]
async fn security_failure_during_plain_setup_fails_every_session() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ran_id = harness.establish_ue(UeId(1), AmfUeNgapId(100)).await;
            harness.sessions.fail_security.set(true);

            harness.deliver(NgapPdu::PduSessionResourceSetupRequest(
                PduSessionResourceSetupRequest {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                    ue_aggregate_maximum_bit_rate: Some(ambr()),
                    setup_list: vec![session_item(1, true), session_item(2, true)],
                },
            ));
            settle().await;

            let Some(NgapPdu::PduSessionResourceSetupResponse(resp)) =
                harness.transport.last("PduSessionResourceSetupResponse")
            else {
                panic!("no setup response");
            };
            // Every requested session is accounted for in the failed list.
            assert!(resp.setup_list.is_empty());
            let mut failed: Vec<PduSessionId> = resp
                .failed_list
                .iter()
                .map(|item| item.pdu_session_id)
                .collect();
            failed.sort();
            assert_eq!(failed, vec![PduSessionId(1), PduSessionId(2)]);
            assert!(resp.failed_list.iter().all(|item| item.cause
                == Cause::RadioNetwork(
                    CauseRadioNetwork::EncryptionAndIntegrityAlgorithmsNotSupported
                )));

            // A total failure still asks the AMF to release the UE.
            assert_eq!(harness.transport.count("UeContextReleaseRequest"), 1);
        })
        .await;
}

#[tokio::test]
async fn fully_successful_setup_does_not_release() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ran_id = harness.establish_ue(UeId(1), AmfUeNgapId(100)).await;

            harness.deliver(NgapPdu::PduSessionResourceSetupRequest(
                PduSessionResourceSetupRequest {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                    ue_aggregate_maximum_bit_rate: Some(ambr()),
                    setup_list: vec![session_item(1, false), session_item(2, true)],
                },
            ));
            settle().await;

            let Some(NgapPdu::PduSessionResourceSetupResponse(resp)) =
                harness.transport.last("PduSessionResourceSetupResponse")
            else {
                panic!("no setup response");
            };
            assert_eq!(resp.setup_list.len(), 2);
            assert!(resp.failed_list.is_empty());
            assert_eq!(harness.transport.count("UeContextReleaseRequest"), 0);
        })
        .await;
}

#[tokio::test]
async fn missing_ambr_rejects_non_gbr_sessions() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            // establish_ue leaves no AMBR in the context.
            let ran_id = harness.establish_ue(UeId(1), AmfUeNgapId(100)).await;

            harness.deliver(NgapPdu::PduSessionResourceSetupRequest(
                PduSessionResourceSetupRequest {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                    ue_aggregate_maximum_bit_rate: None,
                    setup_list: vec![session_item(1, false)],
                },
            ));
            settle().await;

            let Some(NgapPdu::PduSessionResourceSetupResponse(resp)) =
                harness.transport.last("PduSessionResourceSetupResponse")
            else {
                panic!("no setup response");
            };
            assert!(resp.setup_list.is_empty());
            assert_eq!(
                resp.failed_list[0].cause,
                Cause::RadioNetwork(CauseRadioNetwork::InvalidQosCombination)
            );
        })
        .await;
}

#[tokio::test]
async fn session_release_is_relayed_verbatim() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue = UeId(1);
            let ran_id = harness.establish_ue(ue, AmfUeNgapId(100)).await;

            harness.deliver(NgapPdu::PduSessionResourceSetupRequest(
                PduSessionResourceSetupRequest {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                    ue_aggregate_maximum_bit_rate: Some(ambr()),
                    setup_list: vec![session_item(1, true)],
                },
            ));
            settle().await;

            harness.deliver(NgapPdu::PduSessionResourceReleaseCommand(
                PduSessionResourceReleaseCommand {
                    amf_ue_ngap_id: AmfUeNgapId(100),
                    ran_ue_ngap_id: ran_id,
                    release_list: vec![PduSessionReleaseItem {
                        pdu_session_id: PduSessionId(1),
                        cause: Cause::RadioNetwork(CauseRadioNetwork::Unspecified),
                    }],
                },
            ));
            settle().await;

            let Some(NgapPdu::PduSessionResourceReleaseResponse(resp)) =
                harness.transport.last("PduSessionResourceReleaseResponse")
            else {
                panic!("no release response");
            };
            assert_eq!(resp.released_list, vec![PduSessionId(1)]);
            assert!(resp.failed_list.is_empty());
            assert_eq!(
                harness.sessions.release_calls.borrow().as_slice(),
                &[(ue, vec![PduSessionId(1)])]
            );
        })
        .await;
}

#[tokio::test]
async fn repeated_initial_access_trigger_sends_one_initial_ue_message() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            harness.admit_ue(UeId(1)).await;

            // The lower layer retransmits the same trigger.
            harness.engine.handle_message(NgapTaskMessage::InitialUeAccess {
                ue_id: UeId(1),
                nas_pdu: vec![0x01],
                establishment_cause:
                    rancp_ngap::messages::RrcEstablishmentCause::MoSignalling,
                nci: rancp_common::types::Nci(0x100),
                tac: rancp_common::types::Tac(7),
            });
            settle().await;

            assert_eq!(harness.transport.count("InitialUeMessage"), 1);
            assert!(harness.sessions.released_ues.borrow().is_empty());
        })
        .await;
}

#[tokio::test]
async fn downlink_nas_reaches_the_ue() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ue = UeId(1);
            let ran_id = harness.establish_ue(ue, AmfUeNgapId(100)).await;

            harness.deliver(NgapPdu::DownlinkNasTransport(DownlinkNasTransport {
                amf_ue_ngap_id: AmfUeNgapId(100),
                ran_ue_ngap_id: ran_id,
                nas_pdu: vec![0x7E, 0x42],
            }));
            settle().await;
            assert_eq!(
                harness.sessions.delivered_nas.borrow().as_slice(),
                &[(ue, vec![0x7E, 0x42])]
            );
        })
        .await;
}

#[tokio::test]
async fn unknown_ran_id_is_answered_with_error_indication() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;

            harness.deliver(NgapPdu::DownlinkNasTransport(DownlinkNasTransport {
                amf_ue_ngap_id: AmfUeNgapId(100),
                ran_ue_ngap_id: rancp_common::types::RanUeNgapId(999),
                nas_pdu: vec![0x7E],
            }));
            settle().await;

            let Some(NgapPdu::ErrorIndication(indication)) =
                harness.transport.last("ErrorIndication")
            else {
                panic!("no error indication");
            };
            assert_eq!(
                indication.cause,
                Cause::RadioNetwork(CauseRadioNetwork::UnknownLocalUeNgapId)
            );
            assert_eq!(indication.amf_ue_ngap_id, Some(AmfUeNgapId(100)));
            assert!(harness.sessions.delivered_nas.borrow().is_empty());
        })
        .await;
}
