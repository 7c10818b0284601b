//! NGAP codec boundary
//!
//! The wire encoding of NGAP (ASN.1 APER) is owned by the embedding
//! application; the engine only ever sees the structured [`NgapPdu`] union.
//! This module defines the boundary trait an encoder/decoder implements and
//! the error type it reports. All message types derive `serde` traits, so a
//! codec built on any serde format is enough for loopback deployments and
//! test harnesses.

use thiserror::Error;

use crate::messages::NgapPdu;

/// NGAP codec error types
#[derive(Debug, Error)]
pub enum NgapCodecError {
    /// Error during encoding
    #[error("NGAP encoding error: {0}")]
    EncodeError(String),

    /// Error during decoding
    #[error("NGAP decoding error: {0}")]
    DecodeError(String),
}

/// Boundary trait for NGAP PDU encoding and decoding.
///
/// Implementations convert between raw transport bytes and the structured
/// [`NgapPdu`] union. The procedure engine never inspects bytes itself.
pub trait PduCodec {
    /// Encodes a PDU to transport bytes.
    fn encode(&self, pdu: &NgapPdu) -> Result<Vec<u8>, NgapCodecError>;

    /// Decodes a PDU from transport bytes.
    fn decode(&self, bytes: &[u8]) -> Result<NgapPdu, NgapCodecError>;
}
