//! Paging fan-out to the served DUs.
//!
//! Each DU gets a page restricted to the cells it actually serves in one of
//! the allowed tracking areas. Cells the AMF recommended come first, in the
//! order the AMF listed them; remaining eligible served cells follow. A DU
//! with no eligible cell is skipped entirely.

use tracing::{debug, warn};

use rancp_common::config::DuConfig;
use rancp_common::types::{Nci, Tac};
use rancp_ngap::messages::{Paging, RecommendedCellItem};

use crate::engine::NgapEngine;
use crate::notifier::DuPagingMessage;

/// Computes the cell list for one DU: recommended cells served by the DU in
/// an allowed TA first, then the DU's remaining cells in allowed TAs.
fn cells_for_du(du: &DuConfig, allowed_tacs: &[Tac], recommended: &[RecommendedCellItem]) -> Vec<Nci> {
    let serves_eligible = |nci: Nci| {
        du.cells
            .iter()
            .any(|cell| cell.nci == nci && allowed_tacs.contains(&cell.tac))
    };
    let mut cells: Vec<Nci> = recommended
        .iter()
        .map(|item| item.nci)
        .filter(|nci| serves_eligible(*nci))
        .collect();
    for cell in &du.cells {
        if allowed_tacs.contains(&cell.tac) && !cells.contains(&cell.nci) {
            cells.push(cell.nci);
        }
    }
    cells
}

/// Forwards a page to every DU with at least one eligible cell.
///
/// Returns whether at least one DU received a non-empty page.
pub fn handle_paging(engine: &NgapEngine, paging: Paging) -> bool {
    let recommended = paging.recommended_cells.as_deref().unwrap_or(&[]);
    let mut handled = false;
    for du in &engine.inner.config.served_dus {
        let cells = cells_for_du(du, &paging.tai_list_for_paging, recommended);
        if cells.is_empty() {
            debug!(du = %du.du_id, "no eligible cell, page not forwarded");
            continue;
        }
        let forwarded = engine.inner.paging.forward_paging(
            du.du_id,
            DuPagingMessage {
                identity: paging.ue_paging_identity,
                cells,
                paging_drx: paging.paging_drx,
            },
        );
        handled |= forwarded;
        if !forwarded {
            warn!(du = %du.du_id, "DU link down, page dropped");
        }
    }
    if !handled {
        debug!("page matched no DU");
    }
    handled
}
