//! NG Setup scenarios: handshake, retry policy, terminal failures.

use std::time::Duration;

use tokio::task::LocalSet;
use tokio::time;

use rancp_ngap::messages::{NgSetupFailure, NgSetupResponse, NgapPdu};
use rancp_ngap::{Cause, CauseMisc, TimeToWait};
use rancp_node::engine::{AmfState, NgapTaskMessage};

use crate::harness::{settle, TestHarness};

fn response() -> NgapPdu {
    NgapPdu::NgSetupResponse(NgSetupResponse {
        amf_name: "amf-1".into(),
        served_guami_list: Vec::new(),
        relative_amf_capacity: 50,
        plmn_support_list: Vec::new(),
    })
}

#[tokio::test]
async fn successful_setup_connects_and_stores_amf_capabilities() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.engine.handle_message(NgapTaskMessage::AssociationUp);
            settle().await;
            assert_eq!(harness.transport.count("NgSetupRequest"), 1);
            assert_eq!(harness.engine.amf_state(), AmfState::WaitingNgSetup);

            harness.deliver(response());
            settle().await;
            assert_eq!(harness.engine.amf_state(), AmfState::Connected);
        })
        .await;
}

#[tokio::test]
async fn stray_setup_answer_is_dropped() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let sent_before = harness.transport.sent.borrow().len();

            // A duplicate answer after the exchange already finished.
            harness.deliver(response());
            settle().await;

            assert_eq!(harness.engine.amf_state(), AmfState::Connected);
            assert_eq!(harness.transport.sent.borrow().len(), sent_before);
        })
        .await;
}

#[tokio::test]
async fn unrecoverable_failure_terminates_without_retry() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.engine.handle_message(NgapTaskMessage::AssociationUp);
            settle().await;

            harness.deliver(NgapPdu::NgSetupFailure(NgSetupFailure {
                cause: Cause::Misc(CauseMisc::UnknownPlmn),
                time_to_wait: Some(TimeToWait::V10s),
            }));
            settle().await;
            // Terminal despite the wait hint and the retry budget of 5.
            assert_eq!(harness.engine.amf_state(), AmfState::Failed);
            assert_eq!(harness.transport.count("NgSetupRequest"), 1);
        })
        .await;
}

#[tokio::test]
async fn failure_without_wait_hint_is_terminal() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.engine.handle_message(NgapTaskMessage::AssociationUp);
            settle().await;

            harness.deliver(NgapPdu::NgSetupFailure(NgSetupFailure {
                cause: Cause::Misc(CauseMisc::ControlProcessingOverload),
                time_to_wait: None,
            }));
            settle().await;
            assert_eq!(harness.engine.amf_state(), AmfState::Failed);
            assert_eq!(harness.transport.count("NgSetupRequest"), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn wait_hint_delays_the_retry() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.engine.handle_message(NgapTaskMessage::AssociationUp);
            settle().await;
            assert_eq!(harness.transport.count("NgSetupRequest"), 1);

            harness.deliver(NgapPdu::NgSetupFailure(NgSetupFailure {
                cause: Cause::Misc(CauseMisc::ControlProcessingOverload),
                time_to_wait: Some(TimeToWait::V10s),
            }));
            settle().await;
            assert_eq!(harness.transport.count("NgSetupRequest"), 1);

            // Just before the hint elapses nothing has been sent.
            time::sleep(Duration::from_secs(9)).await;
            settle().await;
            assert_eq!(harness.transport.count("NgSetupRequest"), 1);

            // After it elapses the retry goes out; a success ends the loop
            // with exactly two requests on the wire.
            time::sleep(Duration::from_secs(2)).await;
            settle().await;
            assert_eq!(harness.transport.count("NgSetupRequest"), 2);

            harness.deliver(response());
            settle().await;
            assert_eq!(harness.engine.amf_state(), AmfState::Connected);
            assert_eq!(harness.transport.count("NgSetupRequest"), 2);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn timed_out_attempts_retry_up_to_the_cap() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.engine.handle_message(NgapTaskMessage::AssociationUp);
            settle().await;

            // Default attempt timeout 10s, retry cap 5: six requests total.
            for _ in 0..6 {
                time::sleep(Duration::from_secs(11)).await;
                settle().await;
            }
            assert_eq!(harness.transport.count("NgSetupRequest"), 6);
            assert_eq!(harness.engine.amf_state(), AmfState::Failed);
        })
        .await;
}

#[tokio::test]
async fn association_loss_cancels_the_setup_exchange() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.engine.handle_message(NgapTaskMessage::AssociationUp);
            settle().await;
            assert_eq!(harness.engine.amf_state(), AmfState::WaitingNgSetup);

            harness
                .engine
                .handle_message(NgapTaskMessage::AssociationLost);
            settle().await;
            assert_eq!(harness.engine.amf_state(), AmfState::NotConnected);
            assert_eq!(harness.transport.count("NgSetupRequest"), 1);

            // A new association starts a fresh handshake.
            harness.engine.handle_message(NgapTaskMessage::AssociationUp);
            settle().await;
            assert_eq!(harness.transport.count("NgSetupRequest"), 2);
            harness.deliver(response());
            settle().await;
            assert_eq!(harness.engine.amf_state(), AmfState::Connected);
        })
        .await;
}
