//! NG Setup: the handshake that brings the NG interface up.
//!
//! The retry policy here is the canonical one for the engine: an
//! unrecoverable failure cause stops immediately, a failure carrying a
//! TimeToWait hint sleeps that long and retries up to the configured cap,
//! a failure without a hint is terminal, and a timed-out attempt retries up
//! to the same cap.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time;
use tracing::{error, info, warn};

use rancp_common::config::NodeConfig;
use rancp_common::types::Tac;
use rancp_ngap::messages::{
    GlobalRanNodeId, NgSetupRequest, NgapPdu, PagingDrx, SupportedTaItem,
};

use crate::engine::{AmfState, NgapEngine};
use crate::procedure_event::{FrameworkCause, ProcedureOutcome, ProcedureOutcomeObserver};

/// Builds the NG Setup Request from the node configuration.
///
/// The supported TA list is the union of the node's primary TA and every
/// TA broadcast by a served cell, deduplicated and sorted.
pub fn build_ng_setup_request(config: &NodeConfig) -> NgSetupRequest {
    let mut tacs: BTreeMap<Tac, ()> = BTreeMap::new();
    tacs.insert(config.tac, ());
    for du in &config.served_dus {
        for cell in &du.cells {
            tacs.insert(cell.tac, ());
        }
    }
    NgSetupRequest {
        global_ran_node_id: GlobalRanNodeId {
            plmn: config.plmn,
            gnb_id: config.gnb_id,
            gnb_id_length: config.gnb_id_length,
        },
        ran_node_name: Some(config.ran_node_name.clone()),
        supported_ta_list: tacs
            .into_keys()
            .map(|tac| SupportedTaItem {
                tac,
                broadcast_plmn_list: vec![config.plmn],
            })
            .collect(),
        default_paging_drx: PagingDrx::V128,
    }
}

pub async fn run_ng_setup(engine: NgapEngine) {
    let attempt_timeout = Duration::from_millis(engine.inner.config.ngap.ng_setup_timeout_ms);
    let max_retries = engine.inner.config.ngap.ng_setup_max_retries;
    let mut retries = 0u32;

    loop {
        let request = build_ng_setup_request(&engine.inner.config);
        let mut observer = ProcedureOutcomeObserver::new();
        {
            let mut amf = engine.inner.amf.borrow_mut();
            amf.state = AmfState::WaitingNgSetup;
            amf.setup_attempts += 1;
            observer.subscribe(&mut amf.setup_event, attempt_timeout);
        }
        if !engine.send(NgapPdu::NgSetupRequest(request)) {
            engine.inner.amf.borrow_mut().state = AmfState::NotConnected;
            return;
        }

        let outcome = observer.wait().await.clone();
        match outcome {
            ProcedureOutcome::Success(response) => {
                let mut amf = engine.inner.amf.borrow_mut();
                amf.amf_name = Some(response.amf_name.clone());
                amf.relative_amf_capacity = response.relative_amf_capacity;
                amf.served_guami_list = response.served_guami_list;
                amf.plmn_support_list = response.plmn_support_list;
                amf.state = AmfState::Connected;
                info!(amf = %response.amf_name, "NG setup complete");
                return;
            }
            ProcedureOutcome::Failure(failure) => {
                if failure.cause.is_unrecoverable() {
                    error!(cause = %failure.cause, "NG setup rejected, not retrying");
                    engine.inner.amf.borrow_mut().state = AmfState::Failed;
                    return;
                }
                match failure.time_to_wait {
                    Some(time_to_wait) if retries < max_retries => {
                        retries += 1;
                        warn!(
                            cause = %failure.cause,
                            wait = ?time_to_wait.as_duration(),
                            retry = retries,
                            "NG setup failed, retrying after wait"
                        );
                        time::sleep(time_to_wait.as_duration()).await;
                    }
                    Some(_) => {
                        error!(cause = %failure.cause, "NG setup retry budget exhausted");
                        engine.inner.amf.borrow_mut().state = AmfState::Failed;
                        return;
                    }
                    None => {
                        error!(cause = %failure.cause, "NG setup failed with no wait hint");
                        engine.inner.amf.borrow_mut().state = AmfState::Failed;
                        return;
                    }
                }
            }
            ProcedureOutcome::FrameworkFailure(FrameworkCause::Timeout) => {
                if retries < max_retries {
                    retries += 1;
                    warn!(retry = retries, "NG setup attempt timed out, retrying");
                } else {
                    error!("NG setup got no answer, giving up");
                    engine.inner.amf.borrow_mut().state = AmfState::Failed;
                    return;
                }
            }
            ProcedureOutcome::FrameworkFailure(_) => {
                // Association torn down underneath us; lifecycle handling
                // owns the state now.
                return;
            }
        }
    }
}
