//! Trait seams between the signaling engine and its collaborators.
//!
//! The engine never talks to SCTP, RRC or the user plane directly; it goes
//! through these traits so the surrounding node (and the test harness) can
//! plug in real or mock implementations.

use async_trait::async_trait;

use rancp_common::types::{DuId, Nci, PduSessionId, UeId};
use rancp_ngap::messages::{
    AggregateMaximumBitRate, NgapPdu, PagingDrx, PduSessionModifyItem, PduSessionSetupItem,
    UePagingIdentity,
};
use rancp_ngap::Cause;

/// Outbound NGAP transport towards the AMF.
///
/// `send` returns `false` when the association is down; the caller decides
/// whether that is fatal for the procedure in flight.
pub trait NgTransport {
    fn send(&self, pdu: NgapPdu) -> bool;
}

/// Session resources to establish, handed to the lower layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSetupRequest {
    pub ue_ambr: Option<AggregateMaximumBitRate>,
    pub security_key: Option<Vec<u8>>,
    pub sessions: Vec<PduSessionSetupItem>,
}

/// A session the lower layers established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstablishedSession {
    pub id: PduSessionId,
    pub has_gbr_flows: bool,
    /// Opaque SM response transfer to echo upstream.
    pub transfer: Vec<u8>,
}

/// A session the lower layers could not establish or modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedSession {
    pub id: PduSessionId,
    pub cause: Cause,
}

/// Outcome of a session setup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSetupResponse {
    /// The security context could not be activated; no session was touched.
    SecurityContextFailure,
    /// Per-session outcomes.
    Items {
        established: Vec<EstablishedSession>,
        failed: Vec<FailedSession>,
    },
}

/// Session resources to modify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionModifyRequest {
    pub ue_ambr: Option<AggregateMaximumBitRate>,
    pub sessions: Vec<PduSessionModifyItem>,
}

/// Outcome of a session modify run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionModifyResponse {
    pub modified: Vec<EstablishedSession>,
    pub failed: Vec<FailedSession>,
}

/// Outcome of a session release run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReleaseResponse {
    pub released: Vec<PduSessionId>,
    pub failed: Vec<FailedSession>,
}

/// The RRC/session layer of the node, seen from the signaling engine.
///
/// All methods run on the engine's local executor; implementations may
/// await freely but must not assume parallelism.
#[async_trait(?Send)]
pub trait SessionControl {
    /// Reserves an internal UE index, or `None` when the node is full.
    fn allocate_ue_index(&self) -> Option<UeId>;

    /// Creates lower-layer state for a new UE. `false` aborts admission.
    async fn new_ue(&self, ue_id: UeId) -> bool;

    async fn setup_sessions(&self, ue_id: UeId, request: SessionSetupRequest)
        -> SessionSetupResponse;

    async fn modify_sessions(
        &self,
        ue_id: UeId,
        request: SessionModifyRequest,
    ) -> SessionModifyResponse;

    async fn release_sessions(
        &self,
        ue_id: UeId,
        sessions: Vec<PduSessionId>,
    ) -> SessionReleaseResponse;

    /// Hands a downlink NAS payload to the UE.
    fn deliver_nas(&self, ue_id: UeId, nas_pdu: Vec<u8>);

    /// Asks the lower layers to tear a UE down. `false` means the UE was
    /// already gone, which the caller treats as success.
    fn schedule_release(&self, ue_id: UeId) -> bool;
}

/// A page fanned out to one DU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuPagingMessage {
    pub identity: UePagingIdentity,
    /// Cells of the DU to page on, recommended cells first.
    pub cells: Vec<Nci>,
    pub paging_drx: Option<PagingDrx>,
}

/// Fan-out path towards the served DUs for paging.
pub trait PagingSink {
    /// Forwards a page to one DU. `false` when the DU link is down.
    fn forward_paging(&self, du_id: DuId, message: DuPagingMessage) -> bool;
}
