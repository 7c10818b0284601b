//! AMF association state and transport lifecycle handling.

use tokio::sync::mpsc;
use tokio::task::spawn_local;
use tracing::{info, warn};

use rancp_common::types::Plmn;
use rancp_ngap::messages::{Guami, NgSetupFailure, NgSetupResponse};

use crate::procedure_event::ProcedureEventSource;

use super::{procedures, NgapEngine, NgapTaskMessage};

/// State of the NG interface towards the AMF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmfState {
    /// No association, or association up but NG Setup not started.
    NotConnected,
    /// NG Setup Request sent, waiting for the answer.
    WaitingNgSetup,
    /// NG Setup succeeded; UE-associated signalling is allowed.
    Connected,
    /// NG Setup terminally failed; operator intervention needed.
    Failed,
}

/// Everything the node knows about its AMF peer.
pub struct AmfContext {
    pub state: AmfState,
    pub amf_name: Option<String>,
    pub relative_amf_capacity: u8,
    pub served_guami_list: Vec<Guami>,
    pub plmn_support_list: Vec<Plmn>,
    /// NG Setup attempts since the association last came up.
    pub setup_attempts: u32,
    /// Rendezvous for the one outstanding NG Setup exchange.
    pub setup_event: ProcedureEventSource<NgSetupResponse, NgSetupFailure>,
}

impl AmfContext {
    pub fn new() -> Self {
        AmfContext {
            state: AmfState::NotConnected,
            amf_name: None,
            relative_amf_capacity: 0,
            served_guami_list: Vec::new(),
            plmn_support_list: Vec::new(),
            setup_attempts: 0,
            setup_event: ProcedureEventSource::new(),
        }
    }
}

impl Default for AmfContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NgapEngine {
    pub(super) fn handle_association_up(&self) {
        info!("AMF association up, starting NG setup");
        {
            let mut amf = self.inner.amf.borrow_mut();
            amf.state = AmfState::NotConnected;
            amf.setup_attempts = 0;
            amf.setup_event.reset();
        }
        let engine = self.clone();
        spawn_local(async move {
            procedures::ng_setup::run_ng_setup(engine).await;
        });
    }

    /// Tears down all signalling state tied to the lost association.
    ///
    /// Every pending transaction and the NG Setup exchange resolve as
    /// cancelled, so no procedure is left awaiting forever. UE contexts are
    /// dropped locally; the AMF has lost them too.
    pub(super) fn handle_association_lost(&self) {
        warn!("AMF association lost, dropping signalling state");
        self.inner.transactions.cancel_all();
        {
            let mut amf = self.inner.amf.borrow_mut();
            amf.state = AmfState::NotConnected;
            amf.setup_event.stop();
        }
        let ue_ids = self.inner.registry.borrow().ue_ids();
        for ue_id in ue_ids {
            self.inner.sessions.schedule_release(ue_id);
            self.inner.registry.borrow_mut().remove(ue_id);
        }
    }
}

/// Transport-side hook that defers association lifecycle events onto the
/// engine's executor.
///
/// The transport layer may invoke this from a foreign execution context, so
/// the events are queued rather than handled in place. An association-lost
/// event must never be dropped; delivery is retried until the queue accepts
/// it.
pub struct AssociationEventHook {
    tx: mpsc::Sender<NgapTaskMessage>,
}

impl AssociationEventHook {
    pub fn new(tx: mpsc::Sender<NgapTaskMessage>) -> Self {
        AssociationEventHook { tx }
    }

    pub fn association_up(&self) {
        self.deliver(NgapTaskMessage::AssociationUp);
    }

    pub fn association_lost(&self) {
        self.deliver(NgapTaskMessage::AssociationLost);
    }

    fn deliver(&self, msg: NgapTaskMessage) {
        let mut msg = msg;
        loop {
            match self.tx.try_send(msg) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Full(back)) => {
                    msg = back;
                    std::thread::yield_now();
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!("engine queue closed, association event dropped");
                    return;
                }
            }
        }
    }
}
