//! Memecoin factory
//!
//! Validates launch requests, assigns transaction ids, queues them with the
//! multisig coordinator and deploys the token once the coordinator calls
//! back with quorum.

use crate::factory::record::{MemecoinRequest, TxData};
use crate::multisig::{ExecutionCallback, MultisigCoordinator, MultisigError};
use crate::token::{validate_launch_params, Token, TokenError, TokenManager};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Minimum number of signers per launch
pub const MIN_SIGNERS: usize = 2;

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Need at least 2 signers, got {0}")]
    InsufficientSigners(usize),
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(u64),
    #[error("Transaction already executed: {0}")]
    AlreadyExecuted(u64),
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    #[error("Multisig error: {0}")]
    Multisig(#[from] MultisigError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemecoinFactory {
    /// Identity the factory queues transactions as
    address: String,
    /// Last assigned transaction id
    tx_counter: u64,
    /// Creation records by id
    records: BTreeMap<u64, TxData>,
    tokens: TokenManager,
}

impl MemecoinFactory {
    pub fn new(address: String) -> Self {
        Self {
            address,
            tx_counter: 0,
            records: BTreeMap::new(),
            tokens: TokenManager::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Validate `request`, queue it for approval and store its record.
    ///
    /// Nothing is recorded unless the coordinator accepts the queue call.
    pub fn create_memecoin(
        &mut self,
        request: MemecoinRequest,
        coordinator: &mut MultisigCoordinator,
    ) -> Result<TxData, FactoryError> {
        validate_launch_params(
            &request.name,
            &request.symbol,
            request.decimals,
            request.total_supply,
        )?;
        if request.signers.len() < MIN_SIGNERS {
            return Err(FactoryError::InsufficientSigners(request.signers.len()));
        }

        let id = self.tx_counter + 1;
        coordinator.queue_tx(&self.address, id, &request.owner, request.signers.clone())?;

        self.tx_counter = id;
        let data = TxData::new(id, request);
        self.records.insert(id, data.clone());

        log::info!(
            "Launch request {} for {} ({}) by {}",
            id,
            data.name,
            data.symbol,
            data.owner
        );
        Ok(data)
    }

    pub fn get_tx_data(&self, id: u64) -> Option<&TxData> {
        self.records.get(&id)
    }

    /// All creation records, ascending by id
    pub fn list_tx_data(&self) -> Vec<&TxData> {
        self.records.values().collect()
    }

    pub fn tx_count(&self) -> u64 {
        self.tx_counter
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut TokenManager {
        &mut self.tokens
    }

    /// Token deployed by transaction `id`, if it has executed
    pub fn token_for_tx(&self, id: u64) -> Option<&Token> {
        self.records
            .get(&id)
            .and_then(|data| data.token_address.as_deref())
            .and_then(|address| self.tokens.get(address))
    }
}

impl ExecutionCallback for MemecoinFactory {
    type Error = FactoryError;

    fn execute_create_memecoin(&mut self, id: u64) -> Result<(), FactoryError> {
        let data = self
            .records
            .get(&id)
            .ok_or(FactoryError::UnknownTransaction(id))?;
        if !data.is_pending {
            return Err(FactoryError::AlreadyExecuted(id));
        }

        let token = self.tokens.create_token(
            data.name.clone(),
            data.symbol.clone(),
            data.decimals,
            data.total_supply,
            &data.owner,
            id,
        )?;

        if let Some(data) = self.records.get_mut(&id) {
            data.mark_executed(token.address.clone());
        }

        log::info!("Launch {} executed, token at {}", id, token.address);
        Ok(())
    }
}
