//! NGAP message model
//!
//! Structured renderings of the NGAP messages the engine sends and receives,
//! gathered under the [`NgapPdu`] tagged union. The union is what crosses the
//! codec and transport boundaries; the engine never inspects raw bytes.
//!
//! Field sets follow TS 38.413 but are restricted to the IEs the procedure
//! engine consumes. Transparent containers and SM transfers stay opaque
//! (`Vec<u8>`).

use serde::{Deserialize, Serialize};

use rancp_common::{AmfUeNgapId, Nci, PduSessionId, Plmn, RanUeNgapId, Tac};

use crate::cause::{Cause, TimeToWait};

// ============================================================================
// Common IEs
// ============================================================================

/// Global RAN Node ID: gNB id qualified by its PLMN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRanNodeId {
    /// PLMN the node belongs to
    pub plmn: Plmn,
    /// gNB ID value (22-32 bits)
    pub gnb_id: u32,
    /// gNB ID length in bits
    pub gnb_id_length: u8,
}

/// Supported TA item advertised in NG Setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedTaItem {
    /// Tracking Area Code
    pub tac: Tac,
    /// PLMNs broadcast in this TA
    pub broadcast_plmn_list: Vec<Plmn>,
}

/// GUAMI (Globally Unique AMF Identifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guami {
    /// PLMN of the AMF
    pub plmn: Plmn,
    /// AMF Region ID
    pub amf_region_id: u8,
    /// AMF Set ID (10 bits)
    pub amf_set_id: u16,
    /// AMF Pointer (6 bits)
    pub amf_pointer: u8,
}

/// Default paging DRX cycle length in radio frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PagingDrx {
    /// 32 radio frames
    V32,
    /// 64 radio frames
    V64,
    /// 128 radio frames
    V128,
    /// 256 radio frames
    V256,
}

/// UE Aggregate Maximum Bit Rate, bits per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateMaximumBitRate {
    /// Downlink AMBR
    pub downlink: u64,
    /// Uplink AMBR
    pub uplink: u64,
}

/// S-NSSAI (Single Network Slice Selection Assistance Information).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snssai {
    /// Slice/Service Type
    pub sst: u8,
    /// Slice Differentiator (24 bits), optional
    pub sd: Option<u32>,
}

/// One QoS flow within a PDU session item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosFlowItem {
    /// QoS Flow Identifier
    pub qfi: u8,
    /// True for GBR flows; non-GBR flows are bounded by the UE-AMBR and
    /// therefore require that parameter to be present at request level
    pub gbr: bool,
}

/// The NGAP id pair carried by a UE Context Release Command; the AMF may
/// identify the UE by the full pair or by its own id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UeNgapIds {
    /// Both ids present
    Pair {
        /// AMF-assigned id
        amf_ue_ngap_id: AmfUeNgapId,
        /// RAN-assigned id
        ran_ue_ngap_id: RanUeNgapId,
    },
    /// Only the AMF-assigned id present
    AmfOnly(AmfUeNgapId),
}

// ============================================================================
// NG Setup
// ============================================================================

/// NG Setup Request (node -> AMF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgSetupRequest {
    /// Global RAN node identity
    pub global_ran_node_id: GlobalRanNodeId,
    /// Human-readable node name
    pub ran_node_name: Option<String>,
    /// Supported tracking areas
    pub supported_ta_list: Vec<SupportedTaItem>,
    /// Default paging DRX
    pub default_paging_drx: PagingDrx,
}

/// NG Setup Response (AMF -> node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgSetupResponse {
    /// AMF name
    pub amf_name: String,
    /// GUAMIs served by the AMF
    pub served_guami_list: Vec<Guami>,
    /// Relative AMF capacity (0-255)
    pub relative_amf_capacity: u8,
    /// PLMNs supported by the AMF
    pub plmn_support_list: Vec<Plmn>,
}

/// NG Setup Failure (AMF -> node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgSetupFailure {
    /// Failure cause
    pub cause: Cause,
    /// Optional wait hint before the node may retry
    pub time_to_wait: Option<TimeToWait>,
}

// ============================================================================
// NAS transport
// ============================================================================

/// RRC establishment cause forwarded in the Initial UE Message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RrcEstablishmentCause {
    /// Emergency call
    Emergency,
    /// High priority access
    HighPriorityAccess,
    /// Mobile-terminated access
    MtAccess,
    /// Mobile-originated signalling
    MoSignalling,
    /// Mobile-originated data
    MoData,
}

/// Initial UE Message (node -> AMF): first uplink NAS message of a UE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialUeMessage {
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Opaque NAS payload
    pub nas_pdu: Vec<u8>,
    /// TAC of the cell the UE accessed on
    pub tac: Tac,
    /// NCI of the cell the UE accessed on
    pub nci: Nci,
    /// RRC establishment cause
    pub establishment_cause: RrcEstablishmentCause,
}

/// Downlink NAS Transport (AMF -> node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownlinkNasTransport {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Opaque NAS payload
    pub nas_pdu: Vec<u8>,
}

/// Uplink NAS Transport (node -> AMF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UplinkNasTransport {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Opaque NAS payload
    pub nas_pdu: Vec<u8>,
    /// TAC of the serving cell
    pub tac: Tac,
    /// NCI of the serving cell
    pub nci: Nci,
}

// ============================================================================
// Initial context setup / UE context modification
// ============================================================================

/// One PDU session to set up, as carried in setup-flavoured requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionSetupItem {
    /// PDU session identity
    pub pdu_session_id: PduSessionId,
    /// Slice the session belongs to
    pub snssai: Snssai,
    /// QoS flows requested for this session
    pub qos_flows: Vec<QosFlowItem>,
    /// Opaque SM request transfer
    pub transfer: Vec<u8>,
}

impl PduSessionSetupItem {
    /// True when any flow of this session is bounded by the UE-AMBR, which
    /// then must be present at request level.
    pub fn requires_ue_ambr(&self) -> bool {
        self.qos_flows.iter().any(|flow| !flow.gbr)
    }
}

/// A successfully set up PDU session in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionResponseItem {
    /// PDU session identity
    pub pdu_session_id: PduSessionId,
    /// Opaque SM response transfer
    pub transfer: Vec<u8>,
}

/// A failed PDU session in a response, with the failure cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionFailedItem {
    /// PDU session identity
    pub pdu_session_id: PduSessionId,
    /// Why this session failed
    pub cause: Cause,
}

/// Initial Context Setup Request (AMF -> node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialContextSetupRequest {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// UE-AMBR, required when any non-GBR session is requested
    pub ue_aggregate_maximum_bit_rate: Option<AggregateMaximumBitRate>,
    /// Security key for AS security activation
    pub security_key: Vec<u8>,
    /// PDU sessions to set up along with the context, possibly empty
    pub pdu_session_list: Vec<PduSessionSetupItem>,
    /// Optional piggybacked NAS payload
    pub nas_pdu: Option<Vec<u8>>,
}

/// Initial Context Setup Response (node -> AMF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialContextSetupResponse {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Sessions set up successfully
    pub setup_list: Vec<PduSessionResponseItem>,
    /// Sessions that failed
    pub failed_list: Vec<PduSessionFailedItem>,
}

/// Initial Context Setup Failure (node -> AMF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialContextSetupFailure {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Overall failure cause
    pub cause: Cause,
    /// One failed item per requested session
    pub failed_list: Vec<PduSessionFailedItem>,
}

/// UE Context Modification Request (AMF -> node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextModificationRequest {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// New UE-AMBR, if changed
    pub ue_aggregate_maximum_bit_rate: Option<AggregateMaximumBitRate>,
    /// New security key, if rekeying
    pub security_key: Option<Vec<u8>>,
}

/// UE Context Modification Response (node -> AMF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextModificationResponse {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
}

/// UE Context Modification Failure (node -> AMF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextModificationFailure {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Failure cause
    pub cause: Cause,
}

// ============================================================================
// PDU session resource management
// ============================================================================

/// PDU Session Resource Setup Request (AMF -> node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionResourceSetupRequest {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// UE-AMBR, required when any non-GBR session is requested
    pub ue_aggregate_maximum_bit_rate: Option<AggregateMaximumBitRate>,
    /// Sessions to set up
    pub setup_list: Vec<PduSessionSetupItem>,
}

/// PDU Session Resource Setup Response (node -> AMF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionResourceSetupResponse {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Sessions set up successfully
    pub setup_list: Vec<PduSessionResponseItem>,
    /// Sessions that failed (verification failures merged with collaborator
    /// failures)
    pub failed_list: Vec<PduSessionFailedItem>,
}

/// One session in a modify request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionModifyItem {
    /// PDU session identity
    pub pdu_session_id: PduSessionId,
    /// QoS flows after modification
    pub qos_flows: Vec<QosFlowItem>,
    /// Opaque SM request transfer
    pub transfer: Vec<u8>,
}

impl PduSessionModifyItem {
    /// True when any flow of this session is bounded by the UE-AMBR.
    pub fn requires_ue_ambr(&self) -> bool {
        self.qos_flows.iter().any(|flow| !flow.gbr)
    }
}

/// PDU Session Resource Modify Request (AMF -> node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionResourceModifyRequest {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// New UE-AMBR, if changed as part of the modification
    pub ue_aggregate_maximum_bit_rate: Option<AggregateMaximumBitRate>,
    /// Sessions to modify
    pub modify_list: Vec<PduSessionModifyItem>,
}

/// PDU Session Resource Modify Response (node -> AMF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionResourceModifyResponse {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Sessions modified successfully
    pub modify_list: Vec<PduSessionResponseItem>,
    /// Sessions that failed
    pub failed_list: Vec<PduSessionFailedItem>,
}

/// One session in a release command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionReleaseItem {
    /// PDU session identity
    pub pdu_session_id: PduSessionId,
    /// Why the AMF is withdrawing the session
    pub cause: Cause,
}

/// PDU Session Resource Release Command (AMF -> node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionResourceReleaseCommand {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Sessions to release
    pub release_list: Vec<PduSessionReleaseItem>,
}

/// PDU Session Resource Release Response (node -> AMF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PduSessionResourceReleaseResponse {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Sessions released
    pub released_list: Vec<PduSessionId>,
    /// Sessions that could not be released
    pub failed_list: Vec<PduSessionFailedItem>,
}

// ============================================================================
// UE context release
// ============================================================================

/// UE Context Release Request (node -> AMF): the node asks the AMF to
/// release a UE context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextReleaseRequest {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
    /// PDU sessions active at the time of the request
    pub pdu_session_ids: Vec<PduSessionId>,
    /// Why the node wants the release
    pub cause: Cause,
}

/// UE Context Release Command (AMF -> node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextReleaseCommand {
    /// UE identification (pair or AMF id only)
    pub ue_ngap_ids: UeNgapIds,
    /// Release cause
    pub cause: Cause,
}

/// UE Context Release Complete (node -> AMF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextReleaseComplete {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN-assigned UE id
    pub ran_ue_ngap_id: RanUeNgapId,
}

// ============================================================================
// Handover (target side)
// ============================================================================

/// Handover type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandoverType {
    /// Intra-5GS handover
    Intra5gs,
    /// 5GS to EPS handover
    FivegsToEps,
    /// EPS to 5GS handover
    EpsTo5gs,
}

/// Handover Request (AMF -> target node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverRequest {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// Handover type
    pub handover_type: HandoverType,
    /// Handover cause
    pub cause: Cause,
    /// UE-AMBR of the incoming UE
    pub ue_aggregate_maximum_bit_rate: AggregateMaximumBitRate,
    /// Security key for the target context
    pub security_key: Vec<u8>,
    /// Sessions to admit at the target
    pub setup_list: Vec<PduSessionSetupItem>,
    /// Opaque source-to-target transparent container
    pub source_to_target_container: Vec<u8>,
}

/// Handover Request Acknowledge (target node -> AMF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverRequestAcknowledge {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// RAN id allocated for the target context
    pub ran_ue_ngap_id: RanUeNgapId,
    /// Sessions admitted at the target
    pub admitted_list: Vec<PduSessionResponseItem>,
    /// Sessions the target could not admit
    pub failed_list: Vec<PduSessionFailedItem>,
    /// Opaque target-to-source transparent container
    pub target_to_source_container: Vec<u8>,
}

/// Handover Failure (target node -> AMF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverFailure {
    /// AMF-assigned UE id
    pub amf_ue_ngap_id: AmfUeNgapId,
    /// Why the target rejected the handover
    pub cause: Cause,
}

// ============================================================================
// Paging
// ============================================================================

/// Paging identity (5G-S-TMSI components).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UePagingIdentity {
    /// AMF Set ID
    pub amf_set_id: u16,
    /// AMF Pointer
    pub amf_pointer: u8,
    /// 5G-TMSI
    pub five_g_tmsi: u32,
}

/// A cell recommended for paging by the AMF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedCellItem {
    /// NR Cell Identity
    pub nci: Nci,
}

/// Paging (AMF -> node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Identity to page
    pub ue_paging_identity: UePagingIdentity,
    /// Tracking areas the UE may be paged in
    pub tai_list_for_paging: Vec<Tac>,
    /// Paging DRX override
    pub paging_drx: Option<PagingDrx>,
    /// Cells the AMF recommends paging first, if it has assistance data
    pub recommended_cells: Option<Vec<RecommendedCellItem>>,
}

// ============================================================================
// NG Reset
// ============================================================================

/// One UE-associated logical NG connection in a partial reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeAssociatedConnectionItem {
    /// AMF-assigned UE id, if known to the sender
    pub amf_ue_ngap_id: Option<AmfUeNgapId>,
    /// RAN-assigned UE id, if known to the sender
    pub ran_ue_ngap_id: Option<RanUeNgapId>,
}

/// Scope of an NG Reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetType {
    /// Reset every UE-associated logical connection
    NgInterface,
    /// Reset only the listed connections
    PartOfNgInterface(Vec<UeAssociatedConnectionItem>),
}

/// NG Reset (AMF -> node).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgReset {
    /// Why the peer resets
    pub cause: Cause,
    /// Reset scope
    pub reset_type: ResetType,
}

/// NG Reset Acknowledge (node -> AMF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgResetAcknowledge {
    /// The connections actually reset, echoed for a partial reset
    pub ue_associated_connection_list: Option<Vec<UeAssociatedConnectionItem>>,
}

// ============================================================================
// Error Indication
// ============================================================================

/// Error Indication: fire-and-forget report of a protocol-level problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorIndication {
    /// AMF-assigned UE id as received, if any
    pub amf_ue_ngap_id: Option<AmfUeNgapId>,
    /// RAN-assigned UE id as received, if any
    pub ran_ue_ngap_id: Option<RanUeNgapId>,
    /// What went wrong
    pub cause: Cause,
}

// ============================================================================
// The PDU union
// ============================================================================

/// The NGAP PDU tagged union exchanged over the codec and transport
/// boundaries. The procedure engine dispatches on the discriminant and
/// otherwise treats the union as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum NgapPdu {
    NgSetupRequest(NgSetupRequest),
    NgSetupResponse(NgSetupResponse),
    NgSetupFailure(NgSetupFailure),
    InitialUeMessage(InitialUeMessage),
    DownlinkNasTransport(DownlinkNasTransport),
    UplinkNasTransport(UplinkNasTransport),
    InitialContextSetupRequest(InitialContextSetupRequest),
    InitialContextSetupResponse(InitialContextSetupResponse),
    InitialContextSetupFailure(InitialContextSetupFailure),
    UeContextModificationRequest(UeContextModificationRequest),
    UeContextModificationResponse(UeContextModificationResponse),
    UeContextModificationFailure(UeContextModificationFailure),
    PduSessionResourceSetupRequest(PduSessionResourceSetupRequest),
    PduSessionResourceSetupResponse(PduSessionResourceSetupResponse),
    PduSessionResourceModifyRequest(PduSessionResourceModifyRequest),
    PduSessionResourceModifyResponse(PduSessionResourceModifyResponse),
    PduSessionResourceReleaseCommand(PduSessionResourceReleaseCommand),
    PduSessionResourceReleaseResponse(PduSessionResourceReleaseResponse),
    UeContextReleaseRequest(UeContextReleaseRequest),
    UeContextReleaseCommand(UeContextReleaseCommand),
    UeContextReleaseComplete(UeContextReleaseComplete),
    HandoverRequest(HandoverRequest),
    HandoverRequestAcknowledge(HandoverRequestAcknowledge),
    HandoverFailure(HandoverFailure),
    Paging(Paging),
    NgReset(NgReset),
    NgResetAcknowledge(NgResetAcknowledge),
    ErrorIndication(ErrorIndication),
}

impl NgapPdu {
    /// Message name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            NgapPdu::NgSetupRequest(_) => "NgSetupRequest",
            NgapPdu::NgSetupResponse(_) => "NgSetupResponse",
            NgapPdu::NgSetupFailure(_) => "NgSetupFailure",
            NgapPdu::InitialUeMessage(_) => "InitialUeMessage",
            NgapPdu::DownlinkNasTransport(_) => "DownlinkNasTransport",
            NgapPdu::UplinkNasTransport(_) => "UplinkNasTransport",
            NgapPdu::InitialContextSetupRequest(_) => "InitialContextSetupRequest",
            NgapPdu::InitialContextSetupResponse(_) => "InitialContextSetupResponse",
            NgapPdu::InitialContextSetupFailure(_) => "InitialContextSetupFailure",
            NgapPdu::UeContextModificationRequest(_) => "UeContextModificationRequest",
            NgapPdu::UeContextModificationResponse(_) => "UeContextModificationResponse",
            NgapPdu::UeContextModificationFailure(_) => "UeContextModificationFailure",
            NgapPdu::PduSessionResourceSetupRequest(_) => "PduSessionResourceSetupRequest",
            NgapPdu::PduSessionResourceSetupResponse(_) => "PduSessionResourceSetupResponse",
            NgapPdu::PduSessionResourceModifyRequest(_) => "PduSessionResourceModifyRequest",
            NgapPdu::PduSessionResourceModifyResponse(_) => "PduSessionResourceModifyResponse",
            NgapPdu::PduSessionResourceReleaseCommand(_) => "PduSessionResourceReleaseCommand",
            NgapPdu::PduSessionResourceReleaseResponse(_) => "PduSessionResourceReleaseResponse",
            NgapPdu::UeContextReleaseRequest(_) => "UeContextReleaseRequest",
            NgapPdu::UeContextReleaseCommand(_) => "UeContextReleaseCommand",
            NgapPdu::UeContextReleaseComplete(_) => "UeContextReleaseComplete",
            NgapPdu::HandoverRequest(_) => "HandoverRequest",
            NgapPdu::HandoverRequestAcknowledge(_) => "HandoverRequestAcknowledge",
            NgapPdu::HandoverFailure(_) => "HandoverFailure",
            NgapPdu::Paging(_) => "Paging",
            NgapPdu::NgReset(_) => "NgReset",
            NgapPdu::NgResetAcknowledge(_) => "NgResetAcknowledge",
            NgapPdu::ErrorIndication(_) => "ErrorIndication",
        }
    }

    /// The UE NGAP id pair carried by the message, for UE-associated
    /// messages. `None` for non-UE-associated signalling.
    pub fn ue_ids(&self) -> Option<(Option<AmfUeNgapId>, Option<RanUeNgapId>)> {
        match self {
            NgapPdu::DownlinkNasTransport(m) => {
                Some((Some(m.amf_ue_ngap_id), Some(m.ran_ue_ngap_id)))
            }
            NgapPdu::InitialContextSetupRequest(m) => {
                Some((Some(m.amf_ue_ngap_id), Some(m.ran_ue_ngap_id)))
            }
            NgapPdu::UeContextModificationRequest(m) => {
                Some((Some(m.amf_ue_ngap_id), Some(m.ran_ue_ngap_id)))
            }
            NgapPdu::PduSessionResourceSetupRequest(m) => {
                Some((Some(m.amf_ue_ngap_id), Some(m.ran_ue_ngap_id)))
            }
            NgapPdu::PduSessionResourceModifyRequest(m) => {
                Some((Some(m.amf_ue_ngap_id), Some(m.ran_ue_ngap_id)))
            }
            NgapPdu::PduSessionResourceReleaseCommand(m) => {
                Some((Some(m.amf_ue_ngap_id), Some(m.ran_ue_ngap_id)))
            }
            NgapPdu::UeContextReleaseCommand(m) => match m.ue_ngap_ids {
                UeNgapIds::Pair {
                    amf_ue_ngap_id,
                    ran_ue_ngap_id,
                } => Some((Some(amf_ue_ngap_id), Some(ran_ue_ngap_id))),
                UeNgapIds::AmfOnly(amf_ue_ngap_id) => Some((Some(amf_ue_ngap_id), None)),
            },
            _ => None,
        }
    }
}
