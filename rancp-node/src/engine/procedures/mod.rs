//! The asynchronous NGAP procedures.
//!
//! Each procedure follows the same shape: validate, ask a collaborator to
//! act (suspending until it answers), build and send the response, then run
//! any compensating cleanup. Procedure-local errors never escape; every
//! rejected request is answered with a failure message or error indication.

pub mod context_setup;
pub mod handover;
pub mod ng_reset;
pub mod ng_setup;
pub mod paging;
pub mod pdu_session;
pub mod ue_release;
