//! rancp-node: the NGAP procedure engine of the access node
//!
//! This crate implements the control-plane core: the event rendezvous and
//! transaction primitives, the UE context registry, and the asynchronous
//! NGAP procedures built on top of them.
//!
//! # Concurrency model
//!
//! The engine runs on a single logical executor: a current-thread tokio
//! runtime with a [`tokio::task::LocalSet`]. Engine state is shared through
//! `Rc`/`RefCell` and procedures are spawned with `spawn_local`, so several
//! procedures can be logically in flight (suspended at await points) while
//! never executing in parallel. No locks are needed anywhere, and messages
//! for a single UE are handled in arrival order.
//!
//! ```text
//! SCTP/codec boundary ---> NgapEngine::run ---> SessionControl (RRC/session layer)
//!        (NgapPdu)             |                      |
//!                              +--> PagingSink (served DUs)
//!                              +--> NgTransport (outbound NgapPdu)
//! ```

pub mod context;
pub mod engine;
pub mod event;
pub mod metrics;
pub mod notifier;
pub mod procedure_event;
pub mod transaction;

pub use context::{UeContext, UeRegistry};
pub use engine::{AssociationEventHook, NgapEngine, NgapTaskMessage};
pub use event::{EventSource, SingleObserver};
pub use metrics::{MetricsReport, NgapMetrics};
pub use procedure_event::{
    FrameworkCause, ProcedureEventSource, ProcedureOutcome, ProcedureOutcomeObserver,
};
pub use transaction::{Transaction, TransactionId, TransactionManager, TransactionOutcome};
