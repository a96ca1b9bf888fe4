//! Keyed store of in-flight transactions
//!
//! Single source of truth for pending records. Ids of executed transactions
//! are kept as tombstones so lookups can tell "never queued" apart from
//! "already executed".

use crate::multisig::quorum::MultisigError;
use crate::multisig::transaction::{PendingTransaction, TxStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingTransactionStore {
    /// Pending transactions by id
    pending: BTreeMap<u64, PendingTransaction>,
    /// Ids whose execution callback succeeded
    executed: BTreeSet<u64>,
}

impl PendingTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh record, replacing whatever was stored at `id`
    pub fn put(&mut self, id: u64, owner: String, signers: Vec<String>) {
        self.executed.remove(&id);
        self.pending
            .insert(id, PendingTransaction::new(id, owner, signers));
    }

    pub fn get(&self, id: u64) -> Result<&PendingTransaction, MultisigError> {
        self.pending.get(&id).ok_or_else(|| self.missing(id))
    }

    /// Append an approval. Callers validate authorization and duplicates first.
    pub fn append_signature(&mut self, id: u64, identity: &str) -> Result<(), MultisigError> {
        let missing = self.missing(id);
        let tx = self.pending.get_mut(&id).ok_or(missing)?;
        tx.signatures.push(identity.to_string());
        Ok(())
    }

    /// Remove every approval by `identity`, compacting the list.
    ///
    /// Returns whether anything was removed.
    pub fn remove_signature(&mut self, id: u64, identity: &str) -> Result<bool, MultisigError> {
        let missing = self.missing(id);
        let tx = self.pending.get_mut(&id).ok_or(missing)?;
        let before = tx.signatures.len();
        tx.signatures.retain(|s| s != identity);
        Ok(tx.signatures.len() != before)
    }

    /// Delete the record at `id`
    pub fn clear(&mut self, id: u64) -> Option<PendingTransaction> {
        self.pending.remove(&id)
    }

    /// Remember that `id` executed
    pub fn record_executed(&mut self, id: u64) {
        self.executed.insert(id);
    }

    pub fn status(&self, id: u64) -> TxStatus {
        if self.pending.contains_key(&id) {
            TxStatus::Pending
        } else if self.executed.contains(&id) {
            TxStatus::Executed
        } else {
            TxStatus::Unknown
        }
    }

    /// Pending ids in ascending order
    pub fn ids(&self) -> Vec<u64> {
        self.pending.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingTransaction> {
        self.pending.values()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn executed_count(&self) -> usize {
        self.executed.len()
    }

    fn missing(&self, id: u64) -> MultisigError {
        if self.executed.contains(&id) {
            MultisigError::TransactionAlreadyExecuted(id)
        } else {
            MultisigError::TransactionNotFound(id)
        }
    }
}
