//! UE context records and the indexed registry that owns them.

use std::collections::HashMap;

use tracing::warn;

use rancp_common::types::{AmfUeNgapId, Nci, PduSessionId, RanUeNgapId, Tac, UeId};
use rancp_ngap::messages::{AggregateMaximumBitRate, ErrorIndication};
use rancp_ngap::Cause;

use crate::transaction::TransactionId;

/// Minimal per-session record kept by the signaling layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduSessionRecord {
    pub id: PduSessionId,
    pub has_gbr_flows: bool,
}

/// Per-UE signaling state.
pub struct UeContext {
    pub ue_id: UeId,
    pub ran_ue_ngap_id: RanUeNgapId,
    pub amf_ue_ngap_id: Option<AmfUeNgapId>,
    /// Set when a node-initiated release request has been sent upstream.
    pub release_requested: bool,
    /// Set when a release command is accepted; the context only lingers
    /// until local resources are torn down.
    pub release_scheduled: bool,
    pub release_cause: Option<Cause>,
    /// Correlates an expected Release Command with our Release Request.
    pub pending_release_transaction: Option<TransactionId>,
    /// Error indications for messages that arrived after release was
    /// scheduled; sent to the peer once the Release Complete is out.
    pub stored_error_indications: Vec<ErrorIndication>,
    /// The NAS payload the UE first showed up with; a repeated trigger
    /// carrying the same payload is a duplicate, not a new UE.
    pub initial_nas_pdu: Option<Vec<u8>>,
    pub ue_ambr: Option<AggregateMaximumBitRate>,
    pub pdu_sessions: HashMap<PduSessionId, PduSessionRecord>,
    pub serving_nci: Nci,
    pub serving_tac: Tac,
}

impl UeContext {
    pub fn new(ue_id: UeId, ran_ue_ngap_id: RanUeNgapId, serving_nci: Nci, serving_tac: Tac) -> Self {
        UeContext {
            ue_id,
            ran_ue_ngap_id,
            amf_ue_ngap_id: None,
            release_requested: false,
            release_scheduled: false,
            release_cause: None,
            pending_release_transaction: None,
            stored_error_indications: Vec::new(),
            initial_nas_pdu: None,
            ue_ambr: None,
            pdu_sessions: HashMap::new(),
            serving_nci,
            serving_tac,
        }
    }
}

/// Registry of live UE contexts with O(1) lookup by every identifier.
///
/// The secondary indexes (RAN id, AMF id) are maintained strictly in step
/// with the primary map; a divergence is a programming error and panics.
pub struct UeRegistry {
    by_ue: HashMap<UeId, UeContext>,
    by_ran: HashMap<RanUeNgapId, UeId>,
    by_amf: HashMap<AmfUeNgapId, UeId>,
    ran_id_cursor: u32,
    capacity: usize,
}

impl UeRegistry {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        UeRegistry {
            by_ue: HashMap::new(),
            by_ran: HashMap::new(),
            by_amf: HashMap::new(),
            ran_id_cursor: 1,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.by_ue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ue.is_empty()
    }

    /// Allocates an unused RAN UE NGAP id, or `None` at capacity.
    pub fn allocate_ran_ue_id(&mut self) -> Option<RanUeNgapId> {
        if self.by_ue.len() >= self.capacity {
            return None;
        }
        for _ in 0..=u32::MAX as u64 {
            let candidate = RanUeNgapId(self.ran_id_cursor);
            self.ran_id_cursor = self.ran_id_cursor.wrapping_add(1).max(1);
            if !self.by_ran.contains_key(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Inserts a fresh context. Panics on any identifier collision.
    pub fn add(&mut self, ctx: UeContext) {
        assert!(
            !self.by_ue.contains_key(&ctx.ue_id),
            "duplicate UE id in registry"
        );
        assert!(
            !self.by_ran.contains_key(&ctx.ran_ue_ngap_id),
            "duplicate RAN UE NGAP id in registry"
        );
        self.by_ran.insert(ctx.ran_ue_ngap_id, ctx.ue_id);
        if let Some(amf_id) = ctx.amf_ue_ngap_id {
            assert!(
                !self.by_amf.contains_key(&amf_id),
                "duplicate AMF UE NGAP id in registry"
            );
            self.by_amf.insert(amf_id, ctx.ue_id);
        }
        self.by_ue.insert(ctx.ue_id, ctx);
    }

    /// Records the AMF-side id for a UE once the AMF reveals it.
    ///
    /// Binding the same pair twice is a no-op; binding a conflicting id for
    /// an already-bound UE panics.
    pub fn bind_amf_ue_id(&mut self, ue_id: UeId, amf_ue_ngap_id: AmfUeNgapId) {
        let ctx = self
            .by_ue
            .get_mut(&ue_id)
            .expect("bind_amf_ue_id on unknown UE");
        match ctx.amf_ue_ngap_id {
            Some(existing) if existing == amf_ue_ngap_id => {}
            Some(existing) => panic!(
                "UE {} already bound to AMF id {}, refusing rebind to {}",
                ue_id, existing, amf_ue_ngap_id
            ),
            None => {
                ctx.amf_ue_ngap_id = Some(amf_ue_ngap_id);
                self.by_amf.insert(amf_ue_ngap_id, ue_id);
            }
        }
    }

    pub fn get(&self, ue_id: UeId) -> Option<&UeContext> {
        self.by_ue.get(&ue_id)
    }

    pub fn get_mut(&mut self, ue_id: UeId) -> Option<&mut UeContext> {
        self.by_ue.get_mut(&ue_id)
    }

    pub fn find_by_ran_id(&self, id: RanUeNgapId) -> Option<&UeContext> {
        self.by_ran.get(&id).map(|ue| &self.by_ue[ue])
    }

    pub fn find_by_ran_id_mut(&mut self, id: RanUeNgapId) -> Option<&mut UeContext> {
        let ue = *self.by_ran.get(&id)?;
        self.by_ue.get_mut(&ue)
    }

    pub fn find_by_amf_id(&self, id: AmfUeNgapId) -> Option<&UeContext> {
        self.by_amf.get(&id).map(|ue| &self.by_ue[ue])
    }

    /// Re-points a context to a new local UE handle, keeping its RAN and
    /// AMF identifiers, e.g. after an intra-node cell or DU relocation.
    /// Returns `false` for an unknown UE. Panics if the new handle is taken.
    pub fn transfer(&mut self, new_ue_id: UeId, old_ue_id: UeId) -> bool {
        let Some(mut ctx) = self.by_ue.remove(&old_ue_id) else {
            warn!(%old_ue_id, "transfer for UE not in registry");
            return false;
        };
        assert!(
            !self.by_ue.contains_key(&new_ue_id),
            "duplicate UE id in registry"
        );
        ctx.ue_id = new_ue_id;
        self.by_ran.insert(ctx.ran_ue_ngap_id, new_ue_id);
        if let Some(amf_id) = ctx.amf_ue_ngap_id {
            self.by_amf.insert(amf_id, new_ue_id);
        }
        self.by_ue.insert(new_ue_id, ctx);
        true
    }

    /// Removes a context and all its index entries. Idempotent.
    pub fn remove(&mut self, ue_id: UeId) -> Option<UeContext> {
        match self.by_ue.remove(&ue_id) {
            Some(ctx) => {
                self.by_ran.remove(&ctx.ran_ue_ngap_id);
                if let Some(amf_id) = ctx.amf_ue_ngap_id {
                    self.by_amf.remove(&amf_id);
                }
                Some(ctx)
            }
            None => {
                warn!(%ue_id, "remove for UE not in registry");
                None
            }
        }
    }

    pub fn ue_ids(&self) -> Vec<UeId> {
        self.by_ue.keys().copied().collect()
    }
}
