//! Inbound (target-side) handover resource allocation.
//!
//! A new local UE identity is allocated before any resource is admitted;
//! if identity allocation or admission fails, the AMF gets a Handover
//! Failure and no half-created UE is left behind.

use tracing::{info, warn};

use rancp_common::types::{Nci, Tac};
use rancp_ngap::messages::{
    HandoverFailure, HandoverRequest, HandoverRequestAcknowledge, NgapPdu, PduSessionFailedItem,
    PduSessionResponseItem,
};
use rancp_ngap::{Cause, CauseProtocol, CauseRadioNetwork};

use crate::context::{PduSessionRecord, UeContext};
use crate::engine::NgapEngine;
use crate::notifier::{SessionSetupRequest, SessionSetupResponse};

pub async fn run_handover_request(engine: NgapEngine, request: HandoverRequest) {
    engine
        .inner
        .metrics
        .borrow_mut()
        .handover_preparations
        .record_request();

    let fail = |cause: Cause| {
        engine
            .inner
            .metrics
            .borrow_mut()
            .handover_preparations
            .record_failure(&cause);
        engine.send(NgapPdu::HandoverFailure(HandoverFailure {
            amf_ue_ngap_id: request.amf_ue_ngap_id,
            cause,
        }));
    };

    if engine
        .inner
        .registry
        .borrow()
        .find_by_amf_id(request.amf_ue_ngap_id)
        .is_some()
    {
        warn!(amf_id = %request.amf_ue_ngap_id, "handover for an AMF id already in use");
        fail(Cause::Protocol(
            CauseProtocol::MessageNotCompatibleWithReceiverState,
        ));
        return;
    }

    let Some(ue_id) = engine.inner.sessions.allocate_ue_index() else {
        warn!("no free UE index for handover target context");
        fail(Cause::RadioNetwork(
            CauseRadioNetwork::RadioResourcesNotAvailable,
        ));
        return;
    };
    if !engine.inner.sessions.new_ue(ue_id).await {
        warn!(%ue_id, "lower layers rejected handover target UE");
        fail(Cause::RadioNetwork(
            CauseRadioNetwork::RadioResourcesNotAvailable,
        ));
        return;
    }

    let outcome = engine
        .inner
        .sessions
        .setup_sessions(
            ue_id,
            SessionSetupRequest {
                ue_ambr: Some(request.ue_aggregate_maximum_bit_rate),
                security_key: Some(request.security_key.clone()),
                sessions: request.setup_list.clone(),
            },
        )
        .await;
    let (established, failed) = match outcome {
        SessionSetupResponse::SecurityContextFailure => {
            engine.inner.sessions.schedule_release(ue_id);
            fail(Cause::RadioNetwork(
                CauseRadioNetwork::EncryptionAndIntegrityAlgorithmsNotSupported,
            ));
            return;
        }
        SessionSetupResponse::Items { established, failed } => (established, failed),
    };
    if established.is_empty() {
        engine.inner.sessions.schedule_release(ue_id);
        let cause = failed
            .first()
            .map(|item| item.cause)
            .unwrap_or(Cause::RadioNetwork(
                CauseRadioNetwork::RadioResourcesNotAvailable,
            ));
        warn!(%ue_id, "no session admitted, rejecting handover");
        fail(cause);
        return;
    }

    // Identity and registry mutation happen after every suspension point,
    // so a failure above leaves no context behind.
    let (ran_id, target_nci, target_tac) = {
        let mut registry = engine.inner.registry.borrow_mut();
        let Some(ran_id) = registry.allocate_ran_ue_id() else {
            drop(registry);
            engine.inner.sessions.schedule_release(ue_id);
            warn!(%ue_id, "RAN UE NGAP id space exhausted, rejecting handover");
            fail(Cause::RadioNetwork(
                CauseRadioNetwork::RadioResourcesNotAvailable,
            ));
            return;
        };
        let (nci, tac) = target_cell(&engine);
        let mut ctx = UeContext::new(ue_id, ran_id, nci, tac);
        ctx.ue_ambr = Some(request.ue_aggregate_maximum_bit_rate);
        for session in &established {
            ctx.pdu_sessions.insert(
                session.id,
                PduSessionRecord {
                    id: session.id,
                    has_gbr_flows: session.has_gbr_flows,
                },
            );
        }
        registry.add(ctx);
        registry.bind_amf_ue_id(ue_id, request.amf_ue_ngap_id);
        (ran_id, nci, tac)
    };

    {
        let mut metrics = engine.inner.metrics.borrow_mut();
        metrics.handover_preparations.record_success();
        metrics.handover_executions.record_request();
        metrics.handover_executions.record_success();
    }
    info!(
        %ue_id, %ran_id, %target_nci, %target_tac,
        admitted = established.len(),
        "handover target context admitted"
    );
    engine.send(NgapPdu::HandoverRequestAcknowledge(
        HandoverRequestAcknowledge {
            amf_ue_ngap_id: request.amf_ue_ngap_id,
            ran_ue_ngap_id: ran_id,
            admitted_list: established
                .into_iter()
                .map(|session| PduSessionResponseItem {
                    pdu_session_id: session.id,
                    transfer: session.transfer,
                })
                .collect(),
            failed_list: failed
                .into_iter()
                .map(|item| PduSessionFailedItem {
                    pdu_session_id: item.id,
                    cause: item.cause,
                })
                .collect(),
            target_to_source_container: request.source_to_target_container,
        },
    ));
}

/// The cell the incoming UE lands on: the first configured cell, or the
/// node-level TA when no DU layout is configured.
fn target_cell(engine: &NgapEngine) -> (Nci, Tac) {
    engine
        .inner
        .config
        .served_dus
        .first()
        .and_then(|du| du.cells.first())
        .map(|cell| (cell.nci, cell.tac))
        .unwrap_or((Nci(0), engine.inner.config.tac))
}
