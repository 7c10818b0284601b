//! NGAP message model for rancp
//!
//! This crate defines the structured NGAP messages exchanged between the
//! node and its core-network peer, the cause taxonomy, and the codec
//! boundary. The engine in `rancp-node` treats [`messages::NgapPdu`] as an
//! opaque tagged union; the wire encoding (ASN.1 APER) lives behind the
//! [`codec::PduCodec`] trait and is supplied by the embedding application.

pub mod cause;
pub mod codec;
pub mod messages;

pub use cause::{
    Cause, CauseMisc, CauseNas, CauseProtocol, CauseRadioNetwork, CauseTransport, TimeToWait,
};
pub use codec::{NgapCodecError, PduCodec};
pub use messages::NgapPdu;
