//! Configuration structures for the rancp node.
//!
//! The node is configured from a YAML document describing its identity
//! (PLMN, gNB id, TAC), the DU/cell layout it serves, and the tunables of
//! the NGAP engine (transaction table size, timeouts, setup retry policy).

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{DuId, Nci, Plmn, Tac};

/// A cell served by one of the node's DUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellConfig {
    /// NR Cell Identity of the cell
    pub nci: Nci,
    /// Tracking Area Code the cell belongs to
    pub tac: Tac,
}

/// A DU served by this node, with the cells it broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuConfig {
    /// DU identifier, unique within the node
    pub du_id: DuId,
    /// Cells served by this DU
    pub cells: Vec<CellConfig>,
}

/// Tunables of the NGAP engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgapConfig {
    /// Size of the transaction id ring; ids live in `[0, max_transactions)`
    #[serde(default = "default_max_transactions")]
    pub max_transactions: u16,
    /// Default per-transaction timeout in milliseconds
    #[serde(default = "default_transaction_timeout_ms")]
    pub transaction_timeout_ms: u64,
    /// Maximum number of NG Setup retries before giving up
    #[serde(default = "default_ng_setup_max_retries")]
    pub ng_setup_max_retries: u32,
    /// Timeout for a single NG Setup attempt in milliseconds
    #[serde(default = "default_ng_setup_timeout_ms")]
    pub ng_setup_timeout_ms: u64,
    /// Capacity of the RAN UE NGAP ID ring (maximum concurrent UE contexts)
    #[serde(default = "default_max_ue_contexts")]
    pub max_ue_contexts: u32,
}

fn default_max_transactions() -> u16 {
    256
}

fn default_transaction_timeout_ms() -> u64 {
    5000
}

fn default_ng_setup_max_retries() -> u32 {
    5
}

fn default_ng_setup_timeout_ms() -> u64 {
    10_000
}

fn default_max_ue_contexts() -> u32 {
    1024
}

impl Default for NgapConfig {
    fn default() -> Self {
        Self {
            max_transactions: default_max_transactions(),
            transaction_timeout_ms: default_transaction_timeout_ms(),
            ng_setup_max_retries: default_ng_setup_max_retries(),
            ng_setup_timeout_ms: default_ng_setup_timeout_ms(),
            max_ue_contexts: default_max_ue_contexts(),
        }
    }
}

/// Top-level node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Human-readable RAN node name advertised in NG Setup
    pub ran_node_name: String,
    /// Public Land Mobile Network identifier
    pub plmn: Plmn,
    /// gNB ID value (22-32 bits)
    pub gnb_id: u32,
    /// gNB ID length in bits (22-32)
    pub gnb_id_length: u8,
    /// Tracking Area Code of the node's primary TA
    pub tac: Tac,
    /// DUs served by this node, with their cell layout
    #[serde(default)]
    pub served_dus: Vec<DuConfig>,
    /// NGAP engine tunables
    #[serde(default)]
    pub ngap: NgapConfig,
}

impl NodeConfig {
    /// Parses a node configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        let config: NodeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        if !(22..=32).contains(&self.gnb_id_length) {
            return Err(Error::Config(format!(
                "gnb_id_length must be in 22..=32, got {}",
                self.gnb_id_length
            )));
        }
        if self.ngap.max_transactions == 0 {
            return Err(Error::Config("max_transactions must be non-zero".into()));
        }
        if self.ngap.max_ue_contexts == 0 {
            return Err(Error::Config("max_ue_contexts must be non-zero".into()));
        }
        Ok(())
    }
}
