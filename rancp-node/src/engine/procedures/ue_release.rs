//! UE Context Release: the node-requested flavour and the shared
//! completion path.
//!
//! Release is idempotent. `release_requested` and `release_scheduled` are
//! one-way flags; once release is underway no second request is sent and
//! duplicate commands produce no second side effect. Messages that arrive
//! for a UE whose release is scheduled are absorbed as stored error
//! indications and flushed right after the Release Complete goes out.

use tracing::{debug, info, warn};

use rancp_common::types::{PduSessionId, UeId};
use rancp_ngap::messages::{
    NgapPdu, UeContextReleaseComplete, UeContextReleaseRequest,
};
use rancp_ngap::Cause;

use crate::engine::NgapEngine;
use crate::transaction::TransactionOutcome;

/// Node-initiated release: ask the AMF, await its command, then tear down.
///
/// Falls back to a purely local teardown when the AMF cannot be asked
/// (no bound AMF id, association down) or does not answer in time.
pub async fn run_release_request(engine: NgapEngine, ue_id: UeId, cause: Cause) {
    let (amf_id, ran_id, session_ids) = {
        let mut registry = engine.inner.registry.borrow_mut();
        let Some(ctx) = registry.get_mut(ue_id) else {
            debug!(%ue_id, "release request for UE already gone");
            return;
        };
        if ctx.release_requested || ctx.release_scheduled {
            debug!(%ue_id, "release already underway");
            return;
        }
        ctx.release_requested = true;
        ctx.release_cause = Some(cause);
        let session_ids: Vec<PduSessionId> = ctx.pdu_sessions.keys().copied().collect();
        (ctx.amf_ue_ngap_id, ctx.ran_ue_ngap_id, session_ids)
    };

    let Some(amf_id) = amf_id else {
        // The AMF never learned about this UE; nothing to signal.
        info!(%ue_id, "releasing UE without AMF involvement");
        finish_release(&engine, ue_id, false).await;
        return;
    };

    let transaction = engine.inner.transactions.create_transaction();
    let Some(mut transaction) = transaction else {
        warn!(%ue_id, "transaction ids exhausted, sending release request untracked");
        engine.send(NgapPdu::UeContextReleaseRequest(UeContextReleaseRequest {
            amf_ue_ngap_id: amf_id,
            ran_ue_ngap_id: ran_id,
            pdu_session_ids: session_ids,
            cause,
        }));
        return;
    };
    if let Some(transaction_id) = transaction.id() {
        let mut registry = engine.inner.registry.borrow_mut();
        if let Some(ctx) = registry.get_mut(ue_id) {
            ctx.pending_release_transaction = Some(transaction_id);
        }
    }

    if !engine.send(NgapPdu::UeContextReleaseRequest(UeContextReleaseRequest {
        amf_ue_ngap_id: amf_id,
        ran_ue_ngap_id: ran_id,
        pdu_session_ids: session_ids,
        cause,
    })) {
        clear_pending(&engine, ue_id);
        finish_release(&engine, ue_id, false).await;
        return;
    }

    let outcome = transaction.outcome().await.clone();
    clear_pending(&engine, ue_id);
    drop(transaction);
    match outcome {
        TransactionOutcome::Response(NgapPdu::UeContextReleaseCommand(command)) => {
            {
                let mut registry = engine.inner.registry.borrow_mut();
                if let Some(ctx) = registry.get_mut(ue_id) {
                    ctx.release_scheduled = true;
                    ctx.release_cause = Some(command.cause);
                }
            }
            finish_release(&engine, ue_id, true).await;
        }
        TransactionOutcome::Response(other) => {
            warn!(%ue_id, message = other.name(), "unexpected answer to release request");
            finish_release(&engine, ue_id, false).await;
        }
        TransactionOutcome::Timeout => {
            warn!(%ue_id, "release request unanswered, releasing locally");
            finish_release(&engine, ue_id, false).await;
        }
        TransactionOutcome::Cancelled => {
            // Association went down; lifecycle handling cleans the UE up.
            debug!(%ue_id, "release request cancelled");
        }
    }
}

fn clear_pending(engine: &NgapEngine, ue_id: UeId) {
    let mut registry = engine.inner.registry.borrow_mut();
    if let Some(ctx) = registry.get_mut(ue_id) {
        ctx.pending_release_transaction = None;
    }
}

/// Tears a UE down: releases its sessions, drops the lower-layer state,
/// removes the context, optionally confirms to the AMF, and finally flushes
/// any error indications absorbed while the release was pending.
pub async fn finish_release(engine: &NgapEngine, ue_id: UeId, send_complete: bool) {
    let session_ids: Vec<PduSessionId> = {
        let registry = engine.inner.registry.borrow();
        match registry.get(ue_id) {
            Some(ctx) => ctx.pdu_sessions.keys().copied().collect(),
            None => {
                debug!(%ue_id, "release completion for UE already gone");
                return;
            }
        }
    };
    if !session_ids.is_empty() {
        engine
            .inner
            .sessions
            .release_sessions(ue_id, session_ids)
            .await;
    }
    engine.inner.sessions.schedule_release(ue_id);

    let Some(ctx) = engine.inner.registry.borrow_mut().remove(ue_id) else {
        return;
    };
    if send_complete {
        if let Some(amf_id) = ctx.amf_ue_ngap_id {
            engine.send(NgapPdu::UeContextReleaseComplete(UeContextReleaseComplete {
                amf_ue_ngap_id: amf_id,
                ran_ue_ngap_id: ctx.ran_ue_ngap_id,
            }));
        }
    }
    for indication in ctx.stored_error_indications {
        engine.send_error_indication(indication);
    }
    info!(%ue_id, cause = ?ctx.release_cause, "UE context released");
}
