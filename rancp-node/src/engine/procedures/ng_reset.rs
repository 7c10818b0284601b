//! NG Reset: peer-commanded teardown of UE-associated logical connections.

use tracing::{info, warn};

use rancp_common::types::UeId;
use rancp_ngap::messages::{
    NgReset, NgResetAcknowledge, NgapPdu, ResetType, UeAssociatedConnectionItem,
};

use crate::engine::NgapEngine;

use super::ue_release;

pub async fn run_ng_reset(engine: NgapEngine, reset: NgReset) {
    info!(cause = %reset.cause, "NG reset from AMF");
    match reset.reset_type {
        ResetType::NgInterface => {
            engine.inner.transactions.cancel_all();
            let ue_ids = engine.inner.registry.borrow().ue_ids();
            for ue_id in ue_ids {
                ue_release::finish_release(&engine, ue_id, false).await;
            }
            engine.send(NgapPdu::NgResetAcknowledge(NgResetAcknowledge {
                ue_associated_connection_list: None,
            }));
        }
        ResetType::PartOfNgInterface(items) => {
            let mut acknowledged: Vec<UeAssociatedConnectionItem> = Vec::new();
            for item in items {
                let Some(ue_id) = resolve_reset_item(&engine, &item) else {
                    warn!(?item, "reset item matched no UE");
                    continue;
                };
                ue_release::finish_release(&engine, ue_id, false).await;
                acknowledged.push(item);
            }
            engine.send(NgapPdu::NgResetAcknowledge(NgResetAcknowledge {
                ue_associated_connection_list: Some(acknowledged),
            }));
        }
    }
}

fn resolve_reset_item(engine: &NgapEngine, item: &UeAssociatedConnectionItem) -> Option<UeId> {
    let registry = engine.inner.registry.borrow();
    if let Some(ran_id) = item.ran_ue_ngap_id {
        return registry.find_by_ran_id(ran_id).map(|ctx| ctx.ue_id);
    }
    if let Some(amf_id) = item.amf_ue_ngap_id {
        return registry.find_by_amf_id(amf_id).map(|ctx| ctx.ue_id);
    }
    None
}
