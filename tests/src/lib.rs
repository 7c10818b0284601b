//! Integration test framework for the rancp NGAP engine
#![allow(missing_docs)]
//!
//! Mocks stand in for the engine's collaborators: a recording transport
//! towards the AMF, a scripted RRC/session layer, and a recording paging
//! sink towards the DUs. Scenario tests drive the engine through whole
//! procedures and assert on the PDUs it emits and the state it keeps.
//!
//! # Test categories
//!
//! 1. **NG Setup** - handshake, retry/backoff policy, terminal failures
//! 2. **Session management** - context setup, session setup/modify/release
//! 3. **Release** - node- and peer-initiated release, idempotency, races
//! 4. **Handover** - target-side admission and rejection
//! 5. **Paging & Reset** - DU fan-out filtering, full and partial NG reset


#[cfg(test)]
mod ng_setup;
#[cfg(test)]
mod paging_reset;
#[cfg(test)]
mod release;
#[cfg(test)]
mod session_management;

pub use harness::{settle, TestHarness};
pub use mocks::{MockPagingSink, MockSessionControl, MockTransport};
