//! NGAP cause taxonomy
//!
//! A compact rendering of the TS 38.413 Cause IE, restricted to the values
//! the procedure engine actually produces or reacts to, plus the
//! `TimeToWait` IE used by the NG Setup retry policy.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Radio network layer causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CauseRadioNetwork {
    /// The RAN UE NGAP ID in the message is unknown to the receiver
    UnknownLocalUeNgapId,
    /// The AMF UE NGAP ID pairing conflicts with the receiver's state
    InconsistentRemoteUeNgapId,
    /// The same PDU session id appears more than once in one request
    MultiplePduSessionIdInstances,
    /// Requested QoS combination cannot be honoured (e.g. missing UE-AMBR)
    InvalidQosCombination,
    /// No radio resources available for the requested setup
    RadioResourcesNotAvailable,
    /// Release initiated by the NG-RAN node itself
    ReleaseDueToNgranGeneratedReason,
    /// Radio connection with the UE was lost
    RadioConnectionWithUeLost,
    /// Handover towards the indicated target is not allowed
    HandoverTargetNotAllowed,
    /// None of the offered security algorithms can be activated
    EncryptionAndIntegrityAlgorithmsNotSupported,
    /// Catch-all radio network cause
    Unspecified,
}

/// Transport layer causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CauseTransport {
    /// The transport resource towards the peer is unavailable
    TransportResourceUnavailable,
    /// Catch-all transport cause
    Unspecified,
}

/// NAS layer causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CauseNas {
    /// Normal release requested by NAS
    NormalRelease,
    /// UE deregistered
    Deregister,
    /// Catch-all NAS cause
    Unspecified,
}

/// Protocol layer causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CauseProtocol {
    /// Transfer syntax error in a received message
    TransferSyntaxError,
    /// Semantically invalid message content
    SemanticError,
    /// Message valid in itself but not compatible with receiver state
    MessageNotCompatibleWithReceiverState,
    /// Abstract syntax error, message rejected
    AbstractSyntaxErrorReject,
    /// Catch-all protocol cause
    Unspecified,
}

/// Miscellaneous causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CauseMisc {
    /// Control processing overload at the peer
    ControlProcessingOverload,
    /// The PLMN in the request is not served
    UnknownPlmn,
    /// Operations & maintenance intervention (node misconfigured)
    OmIntervention,
    /// Catch-all miscellaneous cause
    Unspecified,
}

/// NGAP Cause IE: a choice over the per-layer cause groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cause {
    /// Radio network layer cause
    RadioNetwork(CauseRadioNetwork),
    /// Transport layer cause
    Transport(CauseTransport),
    /// NAS cause
    Nas(CauseNas),
    /// Protocol cause
    Protocol(CauseProtocol),
    /// Miscellaneous cause
    Misc(CauseMisc),
}

impl Cause {
    /// True when the cause indicates a misconfiguration that no amount of
    /// retrying will fix. The NG Setup procedure stops immediately on these.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            Cause::Misc(CauseMisc::UnknownPlmn)
                | Cause::Misc(CauseMisc::OmIntervention)
                | Cause::Protocol(CauseProtocol::AbstractSyntaxErrorReject)
        )
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::RadioNetwork(c) => write!(f, "radio-network/{c:?}"),
            Cause::Transport(c) => write!(f, "transport/{c:?}"),
            Cause::Nas(c) => write!(f, "nas/{c:?}"),
            Cause::Protocol(c) => write!(f, "protocol/{c:?}"),
            Cause::Misc(c) => write!(f, "misc/{c:?}"),
        }
    }
}

/// TimeToWait IE: the minimum time the sender of a failure wants the
/// receiver to wait before re-initiating the failed procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeToWait {
    /// 1 second
    V1s,
    /// 2 seconds
    V2s,
    /// 5 seconds
    V5s,
    /// 10 seconds
    V10s,
    /// 20 seconds
    V20s,
    /// 60 seconds
    V60s,
}

impl TimeToWait {
    /// Converts the IE value to a concrete duration.
    pub fn as_duration(&self) -> Duration {
        match self {
            TimeToWait::V1s => Duration::from_secs(1),
            TimeToWait::V2s => Duration::from_secs(2),
            TimeToWait::V5s => Duration::from_secs(5),
            TimeToWait::V10s => Duration::from_secs(10),
            TimeToWait::V20s => Duration::from_secs(20),
            TimeToWait::V60s => Duration::from_secs(60),
        }
    }
}
