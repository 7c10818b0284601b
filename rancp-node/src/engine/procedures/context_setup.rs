//! Initial Context Setup and UE Context Modification.

use tracing::{info, warn};

use rancp_common::types::UeId;
use rancp_ngap::messages::{
    InitialContextSetupFailure, InitialContextSetupRequest, InitialContextSetupResponse, NgapPdu,
    PduSessionFailedItem, PduSessionResponseItem, UeContextModificationFailure,
    UeContextModificationRequest, UeContextModificationResponse,
};
use rancp_ngap::{Cause, CauseRadioNetwork};

use crate::context::PduSessionRecord;
use crate::engine::NgapEngine;
use crate::notifier::{SessionSetupRequest, SessionSetupResponse};

/// Runs the Initial Context Setup procedure for an admitted UE.
///
/// The session layer realizes the requested sessions together with the
/// security context. A security activation failure is total: the answer is
/// a Failure carrying one failed item per requested session. Anything else
/// is a (possibly partial) success carrying per-session outcomes.
pub async fn run_initial_context_setup(
    engine: NgapEngine,
    ue_id: UeId,
    request: InitialContextSetupRequest,
) {
    engine
        .inner
        .metrics
        .borrow_mut()
        .context_setup
        .record_request();
    for _ in &request.pdu_session_list {
        engine
            .inner
            .metrics
            .borrow_mut()
            .session_setup
            .record_request();
    }

    let outcome = engine
        .inner
        .sessions
        .setup_sessions(
            ue_id,
            SessionSetupRequest {
                ue_ambr: request.ue_aggregate_maximum_bit_rate,
                security_key: Some(request.security_key.clone()),
                sessions: request.pdu_session_list.clone(),
            },
        )
        .await;

    match outcome {
        SessionSetupResponse::SecurityContextFailure => {
            let cause = Cause::RadioNetwork(
                CauseRadioNetwork::EncryptionAndIntegrityAlgorithmsNotSupported,
            );
            warn!(%ue_id, "security context activation failed, context setup rejected");
            {
                let mut metrics = engine.inner.metrics.borrow_mut();
                metrics.context_setup.record_failure(&cause);
                for _ in &request.pdu_session_list {
                    metrics.session_setup.record_failure(&cause);
                }
            }
            engine.send(NgapPdu::InitialContextSetupFailure(
                InitialContextSetupFailure {
                    amf_ue_ngap_id: request.amf_ue_ngap_id,
                    ran_ue_ngap_id: request.ran_ue_ngap_id,
                    cause,
                    failed_list: request
                        .pdu_session_list
                        .iter()
                        .map(|item| PduSessionFailedItem {
                            pdu_session_id: item.pdu_session_id,
                            cause,
                        })
                        .collect(),
                },
            ));
        }
        SessionSetupResponse::Items { established, failed } => {
            {
                let mut registry = engine.inner.registry.borrow_mut();
                if let Some(ctx) = registry.get_mut(ue_id) {
                    if request.ue_aggregate_maximum_bit_rate.is_some() {
                        ctx.ue_ambr = request.ue_aggregate_maximum_bit_rate;
                    }
                    for session in &established {
                        ctx.pdu_sessions.insert(
                            session.id,
                            PduSessionRecord {
                                id: session.id,
                                has_gbr_flows: session.has_gbr_flows,
                            },
                        );
                    }
                }
            }
            {
                let mut metrics = engine.inner.metrics.borrow_mut();
                metrics.context_setup.record_success();
                for _ in &established {
                    metrics.session_setup.record_success();
                }
                for item in &failed {
                    metrics.session_setup.record_failure(&item.cause);
                }
            }
            info!(
                %ue_id,
                established = established.len(),
                failed = failed.len(),
                "initial context setup complete"
            );
            engine.send(NgapPdu::InitialContextSetupResponse(
                InitialContextSetupResponse {
                    amf_ue_ngap_id: request.amf_ue_ngap_id,
                    ran_ue_ngap_id: request.ran_ue_ngap_id,
                    setup_list: established
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
                },
            ));
            if let Some(nas_pdu) = request.nas_pdu {
                engine.inner.sessions.deliver_nas(ue_id, nas_pdu);
            }
        }
    }
}

/// Runs the UE Context Modification procedure.
///
/// A rekey request goes through the session layer so the security context
/// can be re-activated; an AMBR-only change is applied locally.
pub async fn run_ue_context_modification(
    engine: NgapEngine,
    ue_id: UeId,
    request: UeContextModificationRequest,
) {
    if let Some(security_key) = request.security_key.clone() {
        let outcome = engine
            .inner
            .sessions
            .setup_sessions(
                ue_id,
                SessionSetupRequest {
                    ue_ambr: request.ue_aggregate_maximum_bit_rate,
                    security_key: Some(security_key),
                    sessions: Vec::new(),
                },
            )
            .await;
        if matches!(outcome, SessionSetupResponse::SecurityContextFailure) {
            warn!(%ue_id, "rekey failed, context modification rejected");
            engine.send(NgapPdu::UeContextModificationFailure(
                UeContextModificationFailure {
                    amf_ue_ngap_id: request.amf_ue_ngap_id,
                    ran_ue_ngap_id: request.ran_ue_ngap_id,
                    cause: Cause::RadioNetwork(
                        CauseRadioNetwork::EncryptionAndIntegrityAlgorithmsNotSupported,
                    ),
                },
            ));
            return;
        }
    }
    if request.ue_aggregate_maximum_bit_rate.is_some() {
        let mut registry = engine.inner.registry.borrow_mut();
        if let Some(ctx) = registry.get_mut(ue_id) {
            ctx.ue_ambr = request.ue_aggregate_maximum_bit_rate;
        }
    }
    info!(%ue_id, "UE context modification complete");
    engine.send(NgapPdu::UeContextModificationResponse(
        UeContextModificationResponse {
            amf_ue_ngap_id: request.amf_ue_ngap_id,
            ran_ue_ngap_id: request.ran_ue_ngap_id,
        },
    ));
}
