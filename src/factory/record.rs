//! Factory-side creation records
//!
//! Unlike the coordinator's pending copy, a [`TxData`] record is permanent:
//! it stays after execution with `is_pending` cleared and the deployed
//! token's address filled in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to launch a memecoin behind multisig approval
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemecoinRequest {
    /// Account that receives the supply and owns the token
    pub owner: String,
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    pub total_supply: u128,
    /// Identities that must approve the launch (at least 2)
    pub signers: Vec<String>,
}

fn default_decimals() -> u8 {
    18
}

/// Persistent record of a creation transaction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxData {
    pub id: u64,
    pub owner: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u128,
    pub signers: Vec<String>,
    /// True until the coordinator's callback deploys the token
    pub is_pending: bool,
    pub token_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
}

impl TxData {
    pub fn new(id: u64, request: MemecoinRequest) -> Self {
        Self {
            id,
            owner: request.owner,
            name: request.name,
            symbol: request.symbol,
            decimals: request.decimals,
            total_supply: request.total_supply,
            signers: request.signers,
            is_pending: true,
            token_address: None,
            created_at: Utc::now(),
            executed_at: None,
        }
    }

    /// Record the deployment of the token
    pub fn mark_executed(&mut self, token_address: String) {
        self.is_pending = false;
        self.token_address = Some(token_address);
        self.executed_at = Some(Utc::now());
    }
}
