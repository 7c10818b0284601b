//! PDU Session Resource Setup, Modify and Release.
//!
//! Setup and Modify run a verification pass before the session layer is
//! involved: every occurrence of a duplicated session id is rejected with a
//! single failed item per duplicated id, and sessions whose QoS flows need
//! the UE-AMBR are rejected when that parameter is unavailable. Release is
//! relayed verbatim; the AMF withdraws resources it already owns.

use std::collections::HashMap;

use tracing::{info, warn};

use rancp_common::types::{PduSessionId, UeId};
use rancp_ngap::messages::{
    NgapPdu, PduSessionFailedItem, PduSessionResourceModifyRequest,
    PduSessionResourceModifyResponse, PduSessionResourceReleaseCommand,
    PduSessionResourceReleaseResponse, PduSessionResourceSetupRequest,
    PduSessionResourceSetupResponse, PduSessionResponseItem,
};
use rancp_ngap::{Cause, CauseRadioNetwork};

use crate::context::PduSessionRecord;
use crate::engine::NgapEngine;
use crate::notifier::{
    SessionModifyRequest, SessionSetupRequest, SessionSetupResponse,
};

use super::ue_release;

/// Splits session items into a verified list and per-item rejections.
///
/// `session_id` and `needs_ambr` project the item type; `ambr_available`
/// reflects whether the UE-AMBR is present at request level or already in
/// force for the UE.
fn verify_session_items<T>(
    items: Vec<T>,
    ambr_available: bool,
    session_id: impl Fn(&T) -> PduSessionId,
    needs_ambr: impl Fn(&T) -> bool,
) -> (Vec<T>, Vec<PduSessionFailedItem>) {
    let mut counts: HashMap<PduSessionId, u32> = HashMap::new();
    for item in &items {
        *counts.entry(session_id(item)).or_insert(0) += 1;
    }

    let mut verified = Vec::new();
    let mut failed = Vec::new();
    let mut duplicate_reported: Vec<PduSessionId> = Vec::new();
    for item in items {
        let id = session_id(&item);
        if counts[&id] > 1 {
            if !duplicate_reported.contains(&id) {
                duplicate_reported.push(id);
                failed.push(PduSessionFailedItem {
                    pdu_session_id: id,
                    cause: Cause::RadioNetwork(CauseRadioNetwork::MultiplePduSessionIdInstances),
                });
            }
            continue;
        }
        if needs_ambr(&item) && !ambr_available {
            failed.push(PduSessionFailedItem {
                pdu_session_id: id,
                cause: Cause::RadioNetwork(CauseRadioNetwork::InvalidQosCombination),
            });
            continue;
        }
        verified.push(item);
    }
    (verified, failed)
}

pub async fn run_session_setup(
    engine: NgapEngine,
    ue_id: UeId,
    request: PduSessionResourceSetupRequest,
) {
    {
        let mut metrics = engine.inner.metrics.borrow_mut();
        for _ in &request.setup_list {
            metrics.session_setup.record_request();
        }
    }

    let ambr_available = request.ue_aggregate_maximum_bit_rate.is_some()
        || engine
            .inner
            .registry
            .borrow()
            .get(ue_id)
            .is_some_and(|ctx| ctx.ue_ambr.is_some());
    let (verified, mut failed_items) = verify_session_items(
        request.setup_list,
        ambr_available,
        |item| item.pdu_session_id,
        |item| item.requires_ue_ambr(),
    );
    let verified_ids: Vec<PduSessionId> =
        verified.iter().map(|item| item.pdu_session_id).collect();

    let outcome = engine
        .inner
        .sessions
        .setup_sessions(
            ue_id,
            SessionSetupRequest {
                ue_ambr: request.ue_aggregate_maximum_bit_rate,
                security_key: None,
                sessions: verified,
            },
        )
        .await;
    let (established, collaborator_failed) = match outcome {
        SessionSetupResponse::Items { established, failed } => (established, failed),
        SessionSetupResponse::SecurityContextFailure => {
            // No session was realized; every verified one still needs a
            // terminal per-session outcome in the response.
            warn!(%ue_id, "security failure from the session layer, failing every session");
            let cause = Cause::RadioNetwork(
                CauseRadioNetwork::EncryptionAndIntegrityAlgorithmsNotSupported,
            );
            failed_items.extend(verified_ids.iter().map(|id| PduSessionFailedItem {
                pdu_session_id: *id,
                cause,
            }));
            (Vec::new(), Vec::new())
        }
    };
    failed_items.extend(collaborator_failed.iter().map(|item| PduSessionFailedItem {
        pdu_session_id: item.id,
        cause: item.cause,
    }));

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
        for _ in &established {
            metrics.session_setup.record_success();
        }
        for item in &failed_items {
            metrics.session_setup.record_failure(&item.cause);
        }
    }

    let any_failed = !failed_items.is_empty();
    info!(
        %ue_id,
        established = established.len(),
        failed = failed_items.len(),
        "PDU session resource setup complete"
    );
    engine.send(NgapPdu::PduSessionResourceSetupResponse(
        PduSessionResourceSetupResponse {
            amf_ue_ngap_id: request.amf_ue_ngap_id,
            ran_ue_ngap_id: request.ran_ue_ngap_id,
            setup_list: established
                .into_iter()
                .map(|session| PduSessionResponseItem {
                    pdu_session_id: session.id,
                    transfer: session.transfer,
                })
                .collect(),
            failed_list: failed_items,
        },
    ));

    // A half-configured UE must not linger; ask the AMF to release it.
    if any_failed {
        ue_release::run_release_request(
            engine,
            ue_id,
            Cause::RadioNetwork(CauseRadioNetwork::ReleaseDueToNgranGeneratedReason),
        )
        .await;
    }
}

pub async fn run_session_modify(
    engine: NgapEngine,
    ue_id: UeId,
    request: PduSessionResourceModifyRequest,
) {
    {
        let mut metrics = engine.inner.metrics.borrow_mut();
        for _ in &request.modify_list {
            metrics.session_modify.record_request();
        }
    }

    let ambr_available = request.ue_aggregate_maximum_bit_rate.is_some()
        || engine
            .inner
            .registry
            .borrow()
            .get(ue_id)
            .is_some_and(|ctx| ctx.ue_ambr.is_some());
    let (verified, mut failed_items) = verify_session_items(
        request.modify_list,
        ambr_available,
        |item| item.pdu_session_id,
        |item| item.requires_ue_ambr(),
    );

    let outcome = engine
        .inner
        .sessions
        .modify_sessions(
            ue_id,
            SessionModifyRequest {
                ue_ambr: request.ue_aggregate_maximum_bit_rate,
                sessions: verified,
            },
        )
        .await;
    failed_items.extend(outcome.failed.iter().map(|item| PduSessionFailedItem {
        pdu_session_id: item.id,
        cause: item.cause,
    }));

    {
        let mut registry = engine.inner.registry.borrow_mut();
        if let Some(ctx) = registry.get_mut(ue_id) {
            if request.ue_aggregate_maximum_bit_rate.is_some() {
                ctx.ue_ambr = request.ue_aggregate_maximum_bit_rate;
            }
            for session in &outcome.modified {
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
        for _ in &outcome.modified {
            metrics.session_modify.record_success();
        }
        for item in &failed_items {
            metrics.session_modify.record_failure(&item.cause);
        }
    }

    let any_failed = !failed_items.is_empty();
    engine.send(NgapPdu::PduSessionResourceModifyResponse(
        PduSessionResourceModifyResponse {
            amf_ue_ngap_id: request.amf_ue_ngap_id,
            ran_ue_ngap_id: request.ran_ue_ngap_id,
            modify_list: outcome
                .modified
                .into_iter()
                .map(|session| PduSessionResponseItem {
                    pdu_session_id: session.id,
                    transfer: session.transfer,
                })
                .collect(),
            failed_list: failed_items,
        },
    ));

    if any_failed {
        ue_release::run_release_request(
            engine,
            ue_id,
            Cause::RadioNetwork(CauseRadioNetwork::ReleaseDueToNgranGeneratedReason),
        )
        .await;
    }
}

pub async fn run_session_release(
    engine: NgapEngine,
    ue_id: UeId,
    command: PduSessionResourceReleaseCommand,
) {
    {
        let mut metrics = engine.inner.metrics.borrow_mut();
        for _ in &command.release_list {
            metrics.session_release.record_request();
        }
    }

    let session_ids: Vec<PduSessionId> = command
        .release_list
        .iter()
        .map(|item| item.pdu_session_id)
        .collect();
    let outcome = engine
        .inner
        .sessions
        .release_sessions(ue_id, session_ids)
        .await;

    {
        let mut registry = engine.inner.registry.borrow_mut();
        if let Some(ctx) = registry.get_mut(ue_id) {
            for id in &outcome.released {
                ctx.pdu_sessions.remove(id);
            }
        }
    }
    {
        let mut metrics = engine.inner.metrics.borrow_mut();
        for _ in &outcome.released {
            metrics.session_release.record_success();
        }
        for item in &outcome.failed {
            metrics.session_release.record_failure(&item.cause);
        }
    }

    info!(
        %ue_id,
        released = outcome.released.len(),
        failed = outcome.failed.len(),
        "PDU session resource release complete"
    );
    engine.send(NgapPdu::PduSessionResourceReleaseResponse(
        PduSessionResourceReleaseResponse {
            amf_ue_ngap_id: command.amf_ue_ngap_id,
            ran_ue_ngap_id: command.ran_ue_ngap_id,
            released_list: outcome.released,
            failed_list: outcome
                .failed
                .into_iter()
                .map(|item| PduSessionFailedItem {
                    pdu_session_id: item.id,
                    cause: item.cause,
                })
                .collect(),
        },
    ));
}
