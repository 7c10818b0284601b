//! The NGAP procedure engine.
//!
//! One engine instance serves one AMF association. Inbound PDUs and
//! node-internal triggers arrive as [`NgapTaskMessage`]s over an mpsc
//! channel and are dispatched on the engine's local executor; procedures
//! that suspend are spawned with `spawn_local` so dispatch keeps running.

mod association;
pub mod procedures;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::spawn_local;
use tracing::{debug, info, warn};

use rancp_common::config::NodeConfig;
use rancp_common::types::{AmfUeNgapId, Nci, RanUeNgapId, Tac, UeId};
use rancp_ngap::messages::{
    ErrorIndication, NgapPdu, RrcEstablishmentCause, UeContextReleaseCommand, UeNgapIds,
};
use rancp_ngap::{Cause, CauseProtocol, CauseRadioNetwork};

use crate::context::{UeContext, UeRegistry};
use crate::metrics::{MetricsReport, NgapMetrics};
use crate::notifier::{NgTransport, PagingSink, SessionControl};
use crate::transaction::TransactionManager;

pub use association::{AmfContext, AmfState, AssociationEventHook};

// ============================================================================
// Task messages
// ============================================================================

/// Everything the engine reacts to: decoded peer PDUs, association lifecycle
/// events deferred from the transport layer, and node-internal triggers from
/// the RRC/session layer.
#[derive(Debug)]
pub enum NgapTaskMessage {
    /// A decoded PDU from the AMF.
    ReceivedPdu(NgapPdu),
    /// The transport association came up.
    AssociationUp,
    /// The transport association went down.
    AssociationLost,
    /// A UE performed initial access; start its NGAP life.
    InitialUeAccess {
        ue_id: UeId,
        nas_pdu: Vec<u8>,
        establishment_cause: RrcEstablishmentCause,
        nci: Nci,
        tac: Tac,
    },
    /// Uplink NAS payload from an existing UE.
    UplinkNas { ue_id: UeId, nas_pdu: Vec<u8> },
    /// The node wants a UE released (e.g. radio link failure).
    UeReleaseRequest { ue_id: UeId, cause: Cause },
    /// Stop the engine.
    Shutdown,
}

// ============================================================================
// Engine
// ============================================================================

pub(crate) struct EngineInner {
    pub(crate) config: NodeConfig,
    pub(crate) transport: Rc<dyn NgTransport>,
    pub(crate) sessions: Rc<dyn SessionControl>,
    pub(crate) paging: Rc<dyn PagingSink>,
    pub(crate) registry: RefCell<UeRegistry>,
    pub(crate) amf: RefCell<AmfContext>,
    pub(crate) metrics: RefCell<NgapMetrics>,
    pub(crate) transactions: TransactionManager<NgapPdu>,
}

/// Cheap clonable handle to the engine; procedures capture one.
pub struct NgapEngine {
    pub(crate) inner: Rc<EngineInner>,
}

impl Clone for NgapEngine {
    fn clone(&self) -> Self {
        NgapEngine {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl NgapEngine {
    pub fn new(
        config: NodeConfig,
        transport: Rc<dyn NgTransport>,
        sessions: Rc<dyn SessionControl>,
        paging: Rc<dyn PagingSink>,
    ) -> Self {
        let transactions = TransactionManager::new(
            config.ngap.max_transactions as usize,
            Duration::from_millis(config.ngap.transaction_timeout_ms),
        );
        let registry = UeRegistry::new(config.ngap.max_ue_contexts as usize);
        NgapEngine {
            inner: Rc::new(EngineInner {
                config,
                transport,
                sessions,
                paging,
                registry: RefCell::new(registry),
                amf: RefCell::new(AmfContext::new()),
                metrics: RefCell::new(NgapMetrics::default()),
                transactions,
            }),
        }
    }

    /// Consumes task messages until `Shutdown` or channel closure.
    ///
    /// Must run inside a `LocalSet`; procedures are spawned locally.
    pub async fn run(&self, mut rx: mpsc::Receiver<NgapTaskMessage>) {
        info!(node = %self.inner.config.ran_node_name, "NGAP engine started");
        while let Some(msg) = rx.recv().await {
            if matches!(msg, NgapTaskMessage::Shutdown) {
                break;
            }
            self.handle_message(msg);
        }
        self.shutdown();
        info!("NGAP engine stopped");
    }

    /// Snapshot of the engine counters.
    pub fn metrics_report(&self) -> MetricsReport {
        self.inner.metrics.borrow().report()
    }

    pub fn amf_state(&self) -> AmfState {
        self.inner.amf.borrow().state
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Routes one task message. Long-running procedures are spawned; the
    /// dispatcher itself never suspends.
    pub fn handle_message(&self, msg: NgapTaskMessage) {
        match msg {
            NgapTaskMessage::ReceivedPdu(pdu) => self.handle_pdu(pdu),
            NgapTaskMessage::AssociationUp => self.handle_association_up(),
            NgapTaskMessage::AssociationLost => self.handle_association_lost(),
            NgapTaskMessage::InitialUeAccess {
                ue_id,
                nas_pdu,
                establishment_cause,
                nci,
                tac,
            } => self.handle_initial_ue_access(ue_id, nas_pdu, establishment_cause, nci, tac),
            NgapTaskMessage::UplinkNas { ue_id, nas_pdu } => self.handle_uplink_nas(ue_id, nas_pdu),
            NgapTaskMessage::UeReleaseRequest { ue_id, cause } => {
                let engine = self.clone();
                spawn_local(async move {
                    procedures::ue_release::run_release_request(engine, ue_id, cause).await;
                });
            }
            NgapTaskMessage::Shutdown => self.shutdown(),
        }
    }

    fn handle_pdu(&self, pdu: NgapPdu) {
        debug!(message = pdu.name(), "received PDU");
        match pdu {
            NgapPdu::NgSetupResponse(resp) => {
                if !self.inner.amf.borrow_mut().setup_event.notify_success(resp) {
                    warn!("NG Setup Response with no setup exchange waiting, dropped");
                }
            }
            NgapPdu::NgSetupFailure(failure) => {
                if !self.inner.amf.borrow_mut().setup_event.notify_failure(failure) {
                    warn!("NG Setup Failure with no setup exchange waiting, dropped");
                }
            }
            NgapPdu::DownlinkNasTransport(m) => {
                if let Some(ue_id) = self.resolve_ue(m.amf_ue_ngap_id, m.ran_ue_ngap_id) {
                    self.inner.sessions.deliver_nas(ue_id, m.nas_pdu);
                }
            }
            NgapPdu::InitialContextSetupRequest(m) => {
                if let Some(ue_id) = self.resolve_ue(m.amf_ue_ngap_id, m.ran_ue_ngap_id) {
                    let engine = self.clone();
                    spawn_local(async move {
                        procedures::context_setup::run_initial_context_setup(engine, ue_id, m)
                            .await;
                    });
                }
            }
            NgapPdu::UeContextModificationRequest(m) => {
                if let Some(ue_id) = self.resolve_ue(m.amf_ue_ngap_id, m.ran_ue_ngap_id) {
                    let engine = self.clone();
                    spawn_local(async move {
                        procedures::context_setup::run_ue_context_modification(engine, ue_id, m)
                            .await;
                    });
                }
            }
            NgapPdu::PduSessionResourceSetupRequest(m) => {
                if let Some(ue_id) = self.resolve_ue(m.amf_ue_ngap_id, m.ran_ue_ngap_id) {
                    let engine = self.clone();
                    spawn_local(async move {
                        procedures::pdu_session::run_session_setup(engine, ue_id, m).await;
                    });
                }
            }
            NgapPdu::PduSessionResourceModifyRequest(m) => {
                if let Some(ue_id) = self.resolve_ue(m.amf_ue_ngap_id, m.ran_ue_ngap_id) {
                    let engine = self.clone();
                    spawn_local(async move {
                        procedures::pdu_session::run_session_modify(engine, ue_id, m).await;
                    });
                }
            }
            NgapPdu::PduSessionResourceReleaseCommand(m) => {
                if let Some(ue_id) = self.resolve_ue(m.amf_ue_ngap_id, m.ran_ue_ngap_id) {
                    let engine = self.clone();
                    spawn_local(async move {
                        procedures::pdu_session::run_session_release(engine, ue_id, m).await;
                    });
                }
            }
            NgapPdu::UeContextReleaseCommand(m) => self.handle_release_command(m),
            NgapPdu::HandoverRequest(m) => {
                let engine = self.clone();
                spawn_local(async move {
                    procedures::handover::run_handover_request(engine, m).await;
                });
            }
            NgapPdu::Paging(m) => {
                procedures::paging::handle_paging(self, m);
            }
            NgapPdu::NgReset(m) => {
                let engine = self.clone();
                spawn_local(async move {
                    procedures::ng_reset::run_ng_reset(engine, m).await;
                });
            }
            NgapPdu::ErrorIndication(m) => {
                warn!(cause = %m.cause, "error indication from AMF");
            }
            other => {
                warn!(message = other.name(), "PDU not expected in this direction");
                let (amf_ue_ngap_id, ran_ue_ngap_id) = other.ue_ids().unwrap_or((None, None));
                self.send_error_indication(ErrorIndication {
                    amf_ue_ngap_id,
                    ran_ue_ngap_id,
                    cause: Cause::Protocol(CauseProtocol::MessageNotCompatibleWithReceiverState),
                });
            }
        }
    }

    // ========================================================================
    // Identity resolution
    // ========================================================================

    /// Resolves the id pair of a UE-associated downlink message to a local
    /// UE, enforcing identity consistency.
    ///
    /// Unknown RAN id: answered with an error indication carrying the ids as
    /// received. Conflicting pairing: the stale context is scheduled for
    /// release and the message is dropped. A context already scheduled for
    /// release absorbs the message as a stored error indication, flushed
    /// after the release completes.
    fn resolve_ue(&self, amf_id: AmfUeNgapId, ran_id: RanUeNgapId) -> Option<UeId> {
        let mut registry = self.inner.registry.borrow_mut();

        // The AMF id must not point at a context other than the one the RAN
        // id names.
        if let Some(existing) = registry.find_by_amf_id(amf_id) {
            if existing.ran_ue_ngap_id != ran_id {
                let stale_ue = existing.ue_id;
                drop(registry);
                warn!(
                    %amf_id, %ran_id, %stale_ue,
                    "inconsistent UE NGAP id pairing, releasing stale context"
                );
                self.send_error_indication(ErrorIndication {
                    amf_ue_ngap_id: Some(amf_id),
                    ran_ue_ngap_id: Some(ran_id),
                    cause: Cause::Protocol(CauseProtocol::MessageNotCompatibleWithReceiverState),
                });
                let engine = self.clone();
                spawn_local(async move {
                    procedures::ue_release::run_release_request(
                        engine,
                        stale_ue,
                        Cause::Protocol(CauseProtocol::MessageNotCompatibleWithReceiverState),
                    )
                    .await;
                });
                return None;
            }
        }

        let ctx = match registry.find_by_ran_id_mut(ran_id) {
            Some(ctx) => ctx,
            None => {
                drop(registry);
                warn!(%amf_id, %ran_id, "message for unknown RAN UE NGAP id");
                self.send_error_indication(ErrorIndication {
                    amf_ue_ngap_id: Some(amf_id),
                    ran_ue_ngap_id: Some(ran_id),
                    cause: Cause::RadioNetwork(CauseRadioNetwork::UnknownLocalUeNgapId),
                });
                return None;
            }
        };

        match ctx.amf_ue_ngap_id {
            Some(bound) if bound != amf_id => {
                let stale_ue = ctx.ue_id;
                drop(registry);
                warn!(
                    %amf_id, %ran_id, %bound,
                    "AMF UE NGAP id conflicts with bound id, releasing context"
                );
                self.send_error_indication(ErrorIndication {
                    amf_ue_ngap_id: Some(amf_id),
                    ran_ue_ngap_id: Some(ran_id),
                    cause: Cause::Protocol(CauseProtocol::MessageNotCompatibleWithReceiverState),
                });
                let engine = self.clone();
                spawn_local(async move {
                    procedures::ue_release::run_release_request(
                        engine,
                        stale_ue,
                        Cause::Protocol(CauseProtocol::MessageNotCompatibleWithReceiverState),
                    )
                    .await;
                });
                return None;
            }
            _ => {}
        }

        if ctx.release_scheduled {
            debug!(ue = %ctx.ue_id, "message for UE pending release, deferring error indication");
            ctx.stored_error_indications.push(ErrorIndication {
                amf_ue_ngap_id: Some(amf_id),
                ran_ue_ngap_id: Some(ran_id),
                cause: Cause::Protocol(CauseProtocol::MessageNotCompatibleWithReceiverState),
            });
            return None;
        }

        let ue_id = ctx.ue_id;
        if ctx.amf_ue_ngap_id.is_none() {
            registry.bind_amf_ue_id(ue_id, amf_id);
        }
        Some(ue_id)
    }

    // ========================================================================
    // UE context release command
    // ========================================================================

    fn handle_release_command(&self, command: UeContextReleaseCommand) {
        let registry = self.inner.registry.borrow();
        let ctx = match command.ue_ngap_ids {
            UeNgapIds::Pair { ran_ue_ngap_id, .. } => registry.find_by_ran_id(ran_ue_ngap_id),
            UeNgapIds::AmfOnly(amf_ue_ngap_id) => registry.find_by_amf_id(amf_ue_ngap_id),
        };
        let Some(ctx) = ctx else {
            drop(registry);
            let (amf_id, ran_id) = match command.ue_ngap_ids {
                UeNgapIds::Pair {
                    amf_ue_ngap_id,
                    ran_ue_ngap_id,
                } => (Some(amf_ue_ngap_id), Some(ran_ue_ngap_id)),
                UeNgapIds::AmfOnly(amf_ue_ngap_id) => (Some(amf_ue_ngap_id), None),
            };
            warn!("release command for unknown UE");
            self.send_error_indication(ErrorIndication {
                amf_ue_ngap_id: amf_id,
                ran_ue_ngap_id: ran_id,
                cause: Cause::RadioNetwork(CauseRadioNetwork::UnknownLocalUeNgapId),
            });
            return;
        };
        let ue_id = ctx.ue_id;
        let pending = ctx.pending_release_transaction;
        let already_scheduled = ctx.release_scheduled;
        drop(registry);

        if let Some(transaction_id) = pending {
            // Answer to our own release request; the waiting procedure
            // finishes the release.
            self.inner
                .transactions
                .set_response(transaction_id, NgapPdu::UeContextReleaseCommand(command));
            return;
        }
        if already_scheduled {
            debug!(ue = %ue_id, "duplicate release command ignored");
            return;
        }
        {
            let mut registry = self.inner.registry.borrow_mut();
            if let Some(ctx) = registry.get_mut(ue_id) {
                ctx.release_scheduled = true;
                ctx.release_cause = Some(command.cause);
            }
        }
        let engine = self.clone();
        spawn_local(async move {
            procedures::ue_release::finish_release(&engine, ue_id, true).await;
        });
    }

    // ========================================================================
    // Node-internal triggers
    // ========================================================================

    fn handle_initial_ue_access(
        &self,
        ue_id: UeId,
        nas_pdu: Vec<u8>,
        establishment_cause: RrcEstablishmentCause,
        nci: Nci,
        tac: Tac,
    ) {
        if self.amf_state() != AmfState::Connected {
            warn!(%ue_id, "initial access while AMF not connected, rejecting UE");
            self.inner.sessions.schedule_release(ue_id);
            return;
        }
        let mut registry = self.inner.registry.borrow_mut();
        if let Some(existing) = registry.get(ue_id) {
            if existing.initial_nas_pdu.as_deref() == Some(nas_pdu.as_slice()) {
                debug!(%ue_id, "duplicate initial access trigger ignored");
            } else {
                warn!(%ue_id, "initial access for UE with live context ignored");
            }
            return;
        }
        let Some(ran_id) = registry.allocate_ran_ue_id() else {
            drop(registry);
            warn!(%ue_id, "RAN UE NGAP id space exhausted, rejecting UE");
            self.inner.sessions.schedule_release(ue_id);
            return;
        };
        let mut ctx = UeContext::new(ue_id, ran_id, nci, tac);
        ctx.initial_nas_pdu = Some(nas_pdu.clone());
        registry.add(ctx);
        drop(registry);
        info!(%ue_id, %ran_id, "UE admitted, sending initial UE message");
        self.send(NgapPdu::InitialUeMessage(
            rancp_ngap::messages::InitialUeMessage {
                ran_ue_ngap_id: ran_id,
                nas_pdu,
                tac,
                nci,
                establishment_cause,
            },
        ));
    }

    fn handle_uplink_nas(&self, ue_id: UeId, nas_pdu: Vec<u8>) {
        let registry = self.inner.registry.borrow();
        let Some(ctx) = registry.get(ue_id) else {
            warn!(%ue_id, "uplink NAS for unknown UE dropped");
            return;
        };
        let Some(amf_id) = ctx.amf_ue_ngap_id else {
            warn!(%ue_id, "uplink NAS before AMF id assignment dropped");
            return;
        };
        let pdu = NgapPdu::UplinkNasTransport(rancp_ngap::messages::UplinkNasTransport {
            amf_ue_ngap_id: amf_id,
            ran_ue_ngap_id: ctx.ran_ue_ngap_id,
            nas_pdu,
            tac: ctx.serving_tac,
            nci: ctx.serving_nci,
        });
        drop(registry);
        self.send(pdu);
    }

    // ========================================================================
    // Outbound helpers
    // ========================================================================

    pub(crate) fn send(&self, pdu: NgapPdu) -> bool {
        let name = pdu.name();
        let sent = self.inner.transport.send(pdu);
        if !sent {
            warn!(message = name, "send failed, association down");
        }
        sent
    }

    pub(crate) fn send_error_indication(&self, indication: ErrorIndication) {
        self.send(NgapPdu::ErrorIndication(indication));
    }

    fn shutdown(&self) {
        self.inner.transactions.stop();
        self.inner.amf.borrow_mut().setup_event.stop();
    }
}
