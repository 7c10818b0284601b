//! Paging fan-out and NG Reset scenarios.

use tokio::task::LocalSet;

use rancp_common::types::{AmfUeNgapId, DuId, Nci, Tac, UeId};
use rancp_ngap::messages::{
    NgReset, NgapPdu, Paging, RecommendedCellItem, ResetType, UeAssociatedConnectionItem,
    UePagingIdentity,
};
use rancp_ngap::{Cause, CauseMisc};

use crate::harness::{settle, TestHarness};

fn paging(tacs: Vec<Tac>, recommended: Option<Vec<Nci>>) -> NgapPdu {
    NgapPdu::Paging(Paging {
        ue_paging_identity: UePagingIdentity {
            amf_set_id: 1,
            amf_pointer: 0,
            five_g_tmsi: 0xDEAD,
        },
        tai_list_for_paging: tacs,
        paging_drx: None,
        recommended_cells: recommended
            .map(|cells| cells.into_iter().map(|nci| RecommendedCellItem { nci }).collect()),
    })
}

// The harness layout: DU 1 serves NCI 0x100 (TAC 7) and 0x101 (TAC 9),
// DU 2 serves NCI 0x200 (TAC 9).

#[tokio::test]
async fn paging_is_filtered_by_tracking_area_per_du() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;

            harness.deliver(paging(vec![Tac(7)], None));
            settle().await;

            let pages = harness.paging.pages.borrow();
            assert_eq!(pages.len(), 1);
            let (du_id, message) = &pages[0];
            assert_eq!(*du_id, DuId(1));
            assert_eq!(message.cells, vec![Nci(0x100)]);
        })
        .await;
}

#[tokio::test]
async fn recommended_cells_lead_the_filtered_list() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;

            harness.deliver(paging(vec![Tac(7), Tac(9)], Some(vec![Nci(0x101)])));
            settle().await;

            let pages = harness.paging.pages.borrow();
            assert_eq!(pages.len(), 2);
            let du1 = pages.iter().find(|(du, _)| *du == DuId(1)).unwrap();
            assert_eq!(du1.1.cells, vec![Nci(0x101), Nci(0x100)]);
            let du2 = pages.iter().find(|(du, _)| *du == DuId(2)).unwrap();
            assert_eq!(du2.1.cells, vec![Nci(0x200)]);
        })
        .await;
}

#[tokio::test]
async fn full_ng_reset_drops_every_ue_then_acknowledges() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            harness.establish_ue(UeId(1), AmfUeNgapId(100)).await;
            harness.establish_ue(UeId(2), AmfUeNgapId(200)).await;

            harness.deliver(NgapPdu::NgReset(NgReset {
                cause: Cause::Misc(CauseMisc::OmIntervention),
                reset_type: ResetType::NgInterface,
            }));
            settle().await;

            let mut released = harness.sessions.released_ues.borrow().clone();
            released.sort();
            assert_eq!(released, vec![UeId(1), UeId(2)]);

            let Some(NgapPdu::NgResetAcknowledge(ack)) =
                harness.transport.last("NgResetAcknowledge")
            else {
                panic!("no reset acknowledge");
            };
            assert!(ack.ue_associated_connection_list.is_none());
            // No per-UE release signalling during a reset.
            assert_eq!(harness.transport.count("UeContextReleaseComplete"), 0);
        })
        .await;
}

#[tokio::test]
async fn partial_ng_reset_touches_only_the_listed_connections() {
    LocalSet::new()
        .run_until(async {
            let harness = TestHarness::new();
            harness.connect().await;
            let ran_a = harness.establish_ue(UeId(1), AmfUeNgapId(100)).await;
            harness.establish_ue(UeId(2), AmfUeNgapId(200)).await;

            harness.deliver(NgapPdu::NgReset(NgReset {
                cause: Cause::Misc(CauseMisc::OmIntervention),
                reset_type: ResetType::PartOfNgInterface(vec![UeAssociatedConnectionItem {
                    amf_ue_ngap_id: Some(AmfUeNgapId(100)),
                    ran_ue_ngap_id: Some(ran_a),
                }]),
            }));
            settle().await;

            assert_eq!(harness.sessions.released_ues.borrow().as_slice(), &[UeId(1)]);
            let Some(NgapPdu::NgResetAcknowledge(ack)) =
                harness.transport.last("NgResetAcknowledge")
            else {
                panic!("no reset acknowledge");
            };
            let list = ack.ue_associated_connection_list.expect("echoed list");
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].ran_ue_ngap_id, Some(ran_a));
        })
        .await;
}
